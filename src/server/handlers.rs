//! Request handlers for the four endpoints.

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::leaderboard::LeaderboardEntry;
use crate::reconcile::{self, KeyEvent};
use crate::scoring;
use crate::server::error::{AppError, AppResult};
use crate::server::session::{self, SessionId};
use crate::server::state::ServerState;
use crate::store::scores::{self, NewScore, Score};
use crate::store::sentences;

#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    pub sentence_id: i64,
    pub events: Vec<KeyEvent>,
    pub started_at: i64,
    pub finished_at: i64,
    pub duration_ms: i64,
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub score: ScoreView,
    pub new_high_score: bool,
}

/// The subset of a score row the client gets back after processing.
#[derive(Debug, Serialize)]
pub struct ScoreView {
    pub id: i64,
    pub words_per_minute: f64,
    pub accuracy_percentage: i64,
    pub time_taken: i64,
}

impl From<&Score> for ScoreView {
    fn from(s: &Score) -> Self {
        Self {
            id: s.id,
            words_per_minute: s.words_per_minute,
            accuracy_percentage: s.accuracy_percentage,
            time_taken: s.time_taken,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub data: Vec<LeaderboardEntry>,
}

/// POST /process — reconcile a keystroke stream against its sentence,
/// persist the resulting (unsubmitted) score, and report whether it beats
/// the session's submitted best.
pub async fn process(
    State(state): State<ServerState>,
    session: SessionId,
    Json(req): Json<ProcessRequest>,
) -> AppResult<Response> {
    if req.events.is_empty() {
        return Err(AppError::Validation("events must not be empty".into()));
    }
    if req.finished_at < req.started_at {
        return Err(AppError::Validation(
            "finished_at must not precede started_at".into(),
        ));
    }
    if req.duration_ms < 0 {
        return Err(AppError::Validation(
            "duration_ms must be non-negative".into(),
        ));
    }

    // Requests without a session get one issued on the way out.
    let (issued, session_id) = match session.0 {
        Some(id) => (None, id),
        None => {
            let id = session::new_session_id();
            (Some(id.clone()), id)
        }
    };

    let db = state.db.lock().unwrap();

    let sentence = sentences::by_id(db.conn(), req.sentence_id)?
        .ok_or_else(|| AppError::NotFound(format!("sentence {} not found", req.sentence_id)))?;

    let errors = reconcile::reconcile(&sentence.text, &req.events)?;
    let total_chars = sentence.text.chars().count();
    let metrics = scoring::compute(total_chars, errors, req.started_at, req.finished_at)?;

    let score = scores::create(
        db.conn(),
        &NewScore {
            sentence_id: sentence.id,
            session_id: &session_id,
            words_per_minute: metrics.words_per_minute,
            accuracy_percentage: metrics.accuracy_percentage,
            time_taken: metrics.time_taken_ms,
        },
    )?;

    // Strictly greater than the submitted best counts; a tie does not.
    let new_high_score = match scores::latest_submitted(db.conn(), &session_id)? {
        Some(previous) => score.words_per_minute > previous.words_per_minute,
        None => true,
    };

    let mut response = Json(ProcessResponse {
        score: ScoreView::from(&score),
        new_high_score,
    })
    .into_response();

    if let Some(id) = issued {
        let value = HeaderValue::from_str(&session::set_cookie(&id))
            .map_err(|e| AppError::Internal(e.to_string()))?;
        response.headers_mut().insert(header::SET_COOKIE, value);
    }

    Ok(response)
}

/// POST /score — promote the session's latest pending score under the
/// provided display name, then let the leaderboard cache decide whether the
/// visible top 10 changed.
pub async fn submit_score(
    State(state): State<ServerState>,
    session: SessionId,
    Json(req): Json<SubmitRequest>,
) -> AppResult<Response> {
    let Some(session_id) = session.0 else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let mut db = state.db.lock().unwrap();
    if let Some(promoted) = scores::submit(db.conn_mut(), &session_id, &req.name)? {
        state
            .leaderboard
            .invalidate_if_affected(db.conn(), &promoted)?;
    }

    Ok("ok".into_response())
}

/// GET /api/leaderboard — the cached top-10 projection.
pub async fn leaderboard(
    State(state): State<ServerState>,
) -> AppResult<Json<LeaderboardResponse>> {
    let db = state.db.lock().unwrap();
    let data = state.leaderboard.get(db.conn())?;
    Ok(Json(LeaderboardResponse { data }))
}

/// GET /api/sentence — a random sentence to type.
pub async fn random_sentence(
    State(state): State<ServerState>,
) -> AppResult<Json<sentences::Sentence>> {
    let db = state.db.lock().unwrap();
    let sentence = sentences::random(db.conn())?
        .ok_or_else(|| AppError::NotFound("sentence corpus is empty".into()))?;
    Ok(Json(sentence))
}
