use std::sync::{Arc, Mutex};

use crate::leaderboard::LeaderboardCache;
use crate::store::Db;

/// Shared state handed to every handler.
///
/// The database connection sits behind a mutex; handlers hold it only for
/// the duration of their synchronous store calls. The leaderboard cache is
/// an explicitly injected service rather than ambient global state, so its
/// Empty/Populated lifecycle stays visible at the call sites.
#[derive(Clone)]
pub struct ServerState {
    pub db: Arc<Mutex<Db>>,
    pub leaderboard: Arc<LeaderboardCache>,
}

impl ServerState {
    pub fn new(db: Db) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            leaderboard: Arc::new(LeaderboardCache::new()),
        }
    }
}
