use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ScoringError {
    /// Accuracy over zero characters is undefined. Sentences are never
    /// empty under the corpus invariants, so hitting this is an internal
    /// fault rather than a user mistake.
    #[error("cannot compute accuracy for an empty sentence")]
    DivisionUndefined,
}

/// Derived metrics for one typing attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub accuracy_percentage: i64,
    pub words_per_minute: f64,
    pub time_taken_ms: i64,
}

/// Computes accuracy and gross WPM from the reconciled error count and the
/// attempt's timing bounds (integer millisecond timestamps,
/// `finished_at >= started_at`).
pub fn compute(
    total_chars: usize,
    errors: usize,
    started_at: i64,
    finished_at: i64,
) -> Result<Metrics, ScoringError> {
    let time_taken_ms = finished_at - started_at;
    Ok(Metrics {
        accuracy_percentage: accuracy_percentage(total_chars, errors)?,
        words_per_minute: gross_wpm(total_chars, time_taken_ms),
        time_taken_ms,
    })
}

/// Share of characters typed correctly, rounded half away from zero to an
/// integer percentage.
pub fn accuracy_percentage(total_chars: usize, errors: usize) -> Result<i64, ScoringError> {
    if total_chars == 0 {
        return Err(ScoringError::DivisionUndefined);
    }
    let correct = total_chars.saturating_sub(errors);
    Ok(((correct as f64 / total_chars as f64) * 100.0).round() as i64)
}

/// Gross words per minute over the elapsed time, using the conventional 5
/// characters per word, rounded to 2 decimal places. Zero or negative
/// elapsed time yields 0.
pub fn gross_wpm(total_chars: usize, time_taken_ms: i64) -> f64 {
    let minutes = time_taken_ms as f64 / 60_000.0;
    if minutes > 0.0 {
        round2((total_chars as f64 / 5.0) / minutes)
    } else {
        0.0
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
