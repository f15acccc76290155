//! Drives the scoring pipeline and leaderboard lifecycle through the
//! library, the way the handlers compose it, without the HTTP layer.

use klack::leaderboard::LeaderboardCache;
use klack::reconcile::{reconcile, KeyEvent};
use klack::scoring;
use klack::store::scores::{self, NewScore};
use klack::store::{sentences, Db};

/// Runs one attempt end to end: reconcile, score, persist.
fn process_attempt(
    db: &Db,
    sentence_id: i64,
    session: &str,
    events: &[KeyEvent],
    started_at: i64,
    finished_at: i64,
) -> scores::Score {
    let sentence = sentences::by_id(db.conn(), sentence_id).unwrap().unwrap();
    let errors = reconcile(&sentence.text, events).unwrap();
    let metrics = scoring::compute(
        sentence.text.chars().count(),
        errors,
        started_at,
        finished_at,
    )
    .unwrap();

    scores::create(
        db.conn(),
        &NewScore {
            sentence_id: sentence.id,
            session_id: session,
            words_per_minute: metrics.words_per_minute,
            accuracy_percentage: metrics.accuracy_percentage,
            time_taken: metrics.time_taken_ms,
        },
    )
    .unwrap()
}

fn transcription(text: &str) -> Vec<KeyEvent> {
    text.chars()
        .enumerate()
        .map(|(i, c)| KeyEvent::new(i as i64 * 150, Some(&c.to_string())))
        .collect()
}

#[test]
fn noisy_attempt_scores_and_persists() {
    let db = Db::open_in_memory().unwrap();
    let sentence = sentences::insert(db.conn(), "The fox ran.").unwrap();

    // A realistic stream: shift before the capital, one miss with a retry.
    let mut events = vec![KeyEvent::new(0, Some("Shift"))];
    events.extend(transcription("The fox "));
    events.push(KeyEvent::new(2_000, Some("t"))); // miss
    events.extend(transcription("ran."));

    let errors = reconcile(&sentence.text, &events).unwrap();
    assert_eq!(errors, 1);

    let metrics = scoring::compute(12, errors, 0, 6_000).unwrap();
    assert_eq!(metrics.accuracy_percentage, 92);
    // 12 chars in 6 s: (12/5) / 0.1 min = 24 WPM
    assert_eq!(metrics.words_per_minute, 24.0);

    let score = process_attempt(&db, sentence.id, "sess", &events, 0, 6_000);
    assert!(!score.submitted);
    assert_eq!(score.accuracy_percentage, 92);
}

#[test]
fn resubmission_moves_the_board_entry() {
    let mut db = Db::open_in_memory().unwrap();
    let sentence = sentences::insert(db.conn(), "abcde").unwrap();
    let cache = LeaderboardCache::new();

    // First run, submitted under one name.
    process_attempt(&db, sentence.id, "sess", &transcription("abcde"), 0, 3_000);
    let first = scores::submit(db.conn_mut(), "sess", "slowpoke")
        .unwrap()
        .unwrap();
    cache.invalidate_if_affected(db.conn(), &first).unwrap();

    let board = cache.get(db.conn()).unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].name, "slowpoke");

    // A faster run submitted later replaces the session's entry.
    process_attempt(&db, sentence.id, "sess", &transcription("abcde"), 0, 1_500);
    let second = scores::submit(db.conn_mut(), "sess", "speedy")
        .unwrap()
        .unwrap();
    cache.invalidate_if_affected(db.conn(), &second).unwrap();

    let board = cache.get(db.conn()).unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].name, "speedy");
    assert!(board[0].score > first.words_per_minute);
}

#[test]
fn cache_lifecycle_across_the_fill_up_phase() {
    let mut db = Db::open_in_memory().unwrap();
    let sentence = sentences::insert(db.conn(), "abcde").unwrap();
    let cache = LeaderboardCache::new();

    // While fewer than 10 scores are submitted, every submission clears
    // the cache.
    for i in 1..=5 {
        let session = format!("sess{i}");
        process_attempt(
            &db,
            sentence.id,
            &session,
            &transcription("abcde"),
            0,
            1_000 * i,
        );
        cache.get(db.conn()).unwrap();
        assert!(cache.is_populated());

        let promoted = scores::submit(db.conn_mut(), &session, &session)
            .unwrap()
            .unwrap();
        cache.invalidate_if_affected(db.conn(), &promoted).unwrap();
        assert!(!cache.is_populated());
    }

    let board = cache.get(db.conn()).unwrap();
    assert_eq!(board.len(), 5);
    // Fastest run first.
    assert_eq!(board[0].name, "sess1");
}

#[test]
fn seeding_flow_matches_startup() {
    let db = Db::open_in_memory().unwrap();
    let corpus = klack::corpus::Corpus::load("english").unwrap();

    assert_eq!(
        sentences::seed(db.conn(), &corpus.sentences).unwrap(),
        corpus.sentences.len()
    );
    assert_eq!(sentences::seed(db.conn(), &corpus.sentences).unwrap(), 0);

    let sentence = sentences::random(db.conn()).unwrap().unwrap();
    assert!(sentence.character_count > 0);
    assert!(sentence.word_count > 0);
}
