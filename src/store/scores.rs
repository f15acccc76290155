use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result, Row};

/// One attempt's persisted result. `submitted` flips to true when the user
/// confirms a display name for leaderboard inclusion; at most one score per
/// session is submitted at any time.
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    pub id: i64,
    pub sentence_id: i64,
    pub session_id: String,
    pub name: String,
    pub words_per_minute: f64,
    pub accuracy_percentage: i64,
    pub time_taken: i64,
    pub submitted: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields the scoring step provides; everything else is filled in by
/// `create`.
#[derive(Debug, Clone)]
pub struct NewScore<'a> {
    pub sentence_id: i64,
    pub session_id: &'a str,
    pub words_per_minute: f64,
    pub accuracy_percentage: i64,
    pub time_taken: i64,
}

const COLUMNS: &str =
    "id, sentence_id, session_id, name, words_per_minute, accuracy_percentage, time_taken, submitted, created_at";

fn from_row(row: &Row) -> rusqlite::Result<Score> {
    let created_at_str: String = row.get(8)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map_err(|_| {
            rusqlite::Error::InvalidColumnType(
                8,
                "created_at".to_string(),
                rusqlite::types::Type::Text,
            )
        })?
        .with_timezone(&Utc);

    Ok(Score {
        id: row.get(0)?,
        sentence_id: row.get(1)?,
        session_id: row.get(2)?,
        name: row.get(3)?,
        words_per_minute: row.get(4)?,
        accuracy_percentage: row.get(5)?,
        time_taken: row.get(6)?,
        submitted: row.get(7)?,
        created_at,
    })
}

/// Appends a new unsubmitted score row.
pub fn create(conn: &Connection, new: &NewScore) -> Result<Score> {
    let created_at = Utc::now();
    conn.execute(
        r#"
        INSERT INTO scores
        (sentence_id, session_id, name, words_per_minute, accuracy_percentage, time_taken, submitted, created_at)
        VALUES (?1, ?2, '', ?3, ?4, ?5, 0, ?6)
        "#,
        params![
            new.sentence_id,
            new.session_id,
            new.words_per_minute,
            new.accuracy_percentage,
            new.time_taken,
            created_at.to_rfc3339(),
        ],
    )?;

    Ok(Score {
        id: conn.last_insert_rowid(),
        sentence_id: new.sentence_id,
        session_id: new.session_id.to_string(),
        name: String::new(),
        words_per_minute: new.words_per_minute,
        accuracy_percentage: new.accuracy_percentage,
        time_taken: new.time_taken,
        submitted: false,
        created_at,
    })
}

fn latest_with_flag(conn: &Connection, session_id: &str, submitted: bool) -> Result<Option<Score>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM scores
         WHERE session_id = ?1 AND submitted = ?2
         ORDER BY created_at DESC, id DESC
         LIMIT 1"
    );
    conn.query_row(&sql, params![session_id, submitted], from_row)
        .optional()
}

/// Most recent submitted score for the session, or none.
pub fn latest_submitted(conn: &Connection, session_id: &str) -> Result<Option<Score>> {
    latest_with_flag(conn, session_id, true)
}

/// Most recent score still awaiting submission for the session, or none.
pub fn latest_unsubmitted(conn: &Connection, session_id: &str) -> Result<Option<Score>> {
    latest_with_flag(conn, session_id, false)
}

/// Submitted scores ordered by WPM descending, ties broken by the faster
/// time, capped at 10 rows.
pub fn top_ten(conn: &Connection) -> Result<Vec<Score>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM scores
         WHERE submitted = 1
         ORDER BY words_per_minute DESC, time_taken ASC
         LIMIT 10"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], from_row)?;

    let mut scores = Vec::new();
    for score in rows {
        scores.push(score?);
    }
    Ok(scores)
}

/// The submission protocol: demote the session's current submitted score,
/// then promote its latest unsubmitted one under the given name. Runs in a
/// single transaction so two concurrent submissions for one session cannot
/// both end up submitted. Returns the promoted score, or none when the
/// session has nothing to submit.
pub fn submit(conn: &mut Connection, session_id: &str, name: &str) -> Result<Option<Score>> {
    let tx = conn.transaction()?;

    if let Some(previous) = latest_submitted(&tx, session_id)? {
        tx.execute("UPDATE scores SET submitted = 0 WHERE id = ?1", [previous.id])?;
    }

    let promoted = match latest_unsubmitted(&tx, session_id)? {
        Some(candidate) => {
            tx.execute(
                "UPDATE scores SET submitted = 1, name = ?1 WHERE id = ?2",
                params![name, candidate.id],
            )?;
            Some(Score {
                name: name.to_string(),
                submitted: true,
                ..candidate
            })
        }
        None => None,
    };

    tx.commit()?;
    Ok(promoted)
}
