use rusqlite::Connection;
use serde::Serialize;
use std::sync::Mutex;
use tracing::info;

use crate::store::scores::{self, Score};

/// One row of the public leaderboard projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: f64,
}

/// Memoized top-10 view over submitted scores.
///
/// The cache has exactly two states: Empty until the first `get`, then
/// Populated until `invalidate_if_affected` decides the top-10 set changed.
/// There is no TTL.
#[derive(Debug, Default)]
pub struct LeaderboardCache {
    entries: Mutex<Option<Vec<LeaderboardEntry>>>,
}

impl LeaderboardCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(None),
        }
    }

    /// Returns the cached projection, computing and storing it on first
    /// access.
    pub fn get(&self, conn: &Connection) -> rusqlite::Result<Vec<LeaderboardEntry>> {
        let mut slot = self.entries.lock().unwrap();
        if let Some(cached) = slot.as_ref() {
            return Ok(cached.clone());
        }

        let computed = project(scores::top_ten(conn)?);
        *slot = Some(computed.clone());
        Ok(computed)
    }

    /// Drops the cached view only when the freshly promoted score changes
    /// the visible top 10: either the board is still filling up, or the
    /// candidate reaches the current lowest ranked WPM. Most submissions
    /// touch neither and keep the cache warm.
    pub fn invalidate_if_affected(
        &self,
        conn: &Connection,
        candidate: &Score,
    ) -> rusqlite::Result<()> {
        let top = scores::top_ten(conn)?;

        if top.len() < 10 {
            self.clear();
            return Ok(());
        }

        let lowest = top.last().map(|s| s.words_per_minute).unwrap_or(0.0);
        if candidate.words_per_minute >= lowest {
            info!(
                wpm = candidate.words_per_minute,
                "score reached the top 10, clearing leaderboard cache"
            );
            self.clear();
        }

        Ok(())
    }

    /// True while the cache holds a computed view.
    pub fn is_populated(&self) -> bool {
        self.entries.lock().unwrap().is_some()
    }

    fn clear(&self) {
        *self.entries.lock().unwrap() = None;
    }
}

fn project(rows: Vec<Score>) -> Vec<LeaderboardEntry> {
    rows.into_iter()
        .map(|s| LeaderboardEntry {
            name: if s.name.is_empty() {
                "Anonymous".to_string()
            } else {
                s.name
            },
            score: s.words_per_minute,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::scores::NewScore;
    use crate::store::Db;

    fn test_db() -> Db {
        let db = Db::open_in_memory().unwrap();
        crate::store::sentences::insert(db.conn(), "the quick brown fox.").unwrap();
        db
    }

    fn submit_score(db: &mut Db, session: &str, name: &str, wpm: f64) -> Score {
        scores::create(
            db.conn(),
            &NewScore {
                sentence_id: 1,
                session_id: session,
                words_per_minute: wpm,
                accuracy_percentage: 100,
                time_taken: 5000,
            },
        )
        .unwrap();
        scores::submit(db.conn_mut(), session, name).unwrap().unwrap()
    }

    /// Ten sessions submitted at WPM 10, 20, ... 100.
    fn seed_full_board(db: &mut Db) {
        for i in 1..=10 {
            let session = format!("seed{i}");
            submit_score(db, &session, &session, (i * 10) as f64);
        }
    }

    #[test]
    fn get_populates_on_first_access() {
        let mut db = test_db();
        submit_score(&mut db, "s1", "ada", 42.0);

        let cache = LeaderboardCache::new();
        assert!(!cache.is_populated());

        let entries = cache.get(db.conn()).unwrap();
        assert!(cache.is_populated());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "ada");
        assert_eq!(entries[0].score, 42.0);
    }

    #[test]
    fn get_serves_the_cached_view_until_invalidated() {
        let mut db = test_db();
        submit_score(&mut db, "s1", "ada", 42.0);

        let cache = LeaderboardCache::new();
        cache.get(db.conn()).unwrap();

        // A new submission the cache was never told about stays invisible.
        submit_score(&mut db, "s2", "grace", 55.0);
        let entries = cache.get(db.conn()).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn empty_names_render_as_anonymous() {
        let mut db = test_db();
        submit_score(&mut db, "s1", "", 42.0);

        let cache = LeaderboardCache::new();
        let entries = cache.get(db.conn()).unwrap();
        assert_eq!(entries[0].name, "Anonymous");
    }

    #[test]
    fn every_submission_invalidates_while_filling_up() {
        let mut db = test_db();
        let cache = LeaderboardCache::new();

        for i in 1..=9 {
            let session = format!("s{i}");
            cache.get(db.conn()).unwrap();
            let score = submit_score(&mut db, &session, &session, i as f64);
            cache.invalidate_if_affected(db.conn(), &score).unwrap();
            assert!(!cache.is_populated());
        }
    }

    #[test]
    fn entering_score_clears_a_full_board() {
        let mut db = test_db();
        seed_full_board(&mut db);

        let cache = LeaderboardCache::new();
        cache.get(db.conn()).unwrap();

        // 15 beats the current lowest ranked value of 10.
        let score = submit_score(&mut db, "newcomer", "newcomer", 15.0);
        cache.invalidate_if_affected(db.conn(), &score).unwrap();
        assert!(!cache.is_populated());

        let entries = cache.get(db.conn()).unwrap();
        assert!(entries.iter().any(|e| e.name == "newcomer"));
    }

    #[test]
    fn below_board_score_keeps_the_cache_warm() {
        let mut db = test_db();
        seed_full_board(&mut db);

        let cache = LeaderboardCache::new();
        let before = cache.get(db.conn()).unwrap();

        // 5 is below the lowest ranked value of 10.
        let score = submit_score(&mut db, "straggler", "straggler", 5.0);
        cache.invalidate_if_affected(db.conn(), &score).unwrap();
        assert!(cache.is_populated());
        assert_eq!(cache.get(db.conn()).unwrap(), before);
    }

    #[test]
    fn reranking_score_clears_a_full_board() {
        let mut db = test_db();
        seed_full_board(&mut db);

        let cache = LeaderboardCache::new();
        cache.get(db.conn()).unwrap();

        // Equal to the current lowest value still counts as affecting the
        // board.
        let score = submit_score(&mut db, "equalizer", "equalizer", 10.0);
        cache.invalidate_if_affected(db.conn(), &score).unwrap();
        assert!(!cache.is_populated());
    }
}
