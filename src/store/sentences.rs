use rand::Rng;
use rusqlite::{params, Connection, OptionalExtension, Result};
use serde::Serialize;

/// Immutable reference text a typing attempt is scored against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sentence {
    pub id: i64,
    pub text: String,
    pub word_count: i64,
    pub character_count: i64,
}

pub fn insert(conn: &Connection, text: &str) -> Result<Sentence> {
    let word_count = text.split_whitespace().count() as i64;
    let character_count = text.chars().count() as i64;

    conn.execute(
        "INSERT INTO sentences (text, word_count, character_count) VALUES (?1, ?2, ?3)",
        params![text, word_count, character_count],
    )?;

    Ok(Sentence {
        id: conn.last_insert_rowid(),
        text: text.to_string(),
        word_count,
        character_count,
    })
}

pub fn by_id(conn: &Connection, id: i64) -> Result<Option<Sentence>> {
    conn.query_row(
        "SELECT id, text, word_count, character_count FROM sentences WHERE id = ?1",
        [id],
        |row| {
            Ok(Sentence {
                id: row.get(0)?,
                text: row.get(1)?,
                word_count: row.get(2)?,
                character_count: row.get(3)?,
            })
        },
    )
    .optional()
}

pub fn count(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM sentences", [], |row| row.get(0))
}

/// One sentence chosen uniformly at random, or None when the corpus is
/// empty.
pub fn random(conn: &Connection) -> Result<Option<Sentence>> {
    let total = count(conn)?;
    if total == 0 {
        return Ok(None);
    }

    let offset = rand::thread_rng().gen_range(0..total);
    conn.query_row(
        "SELECT id, text, word_count, character_count FROM sentences LIMIT 1 OFFSET ?1",
        [offset],
        |row| {
            Ok(Sentence {
                id: row.get(0)?,
                text: row.get(1)?,
                word_count: row.get(2)?,
                character_count: row.get(3)?,
            })
        },
    )
    .optional()
}

/// Inserts the corpus only when the table is empty; returns how many rows
/// were seeded.
pub fn seed(conn: &Connection, texts: &[String]) -> Result<usize> {
    if count(conn)? > 0 {
        return Ok(0);
    }
    for text in texts {
        insert(conn, text)?;
    }
    Ok(texts.len())
}
