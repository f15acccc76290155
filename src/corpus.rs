use include_dir::{include_dir, Dir};
use serde::Deserialize;
use thiserror::Error;

static CORPUS_DIR: Dir = include_dir!("src/corpus");

/// A named set of seed sentences compiled into the binary.
#[derive(Deserialize, Clone, Debug)]
pub struct Corpus {
    pub name: String,
    pub sentences: Vec<String>,
}

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("corpus file not found: {0}")]
    NotFound(String),
    #[error("corpus file is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl Corpus {
    /// Loads an embedded corpus by name ("english" -> src/corpus/english.json).
    pub fn load(name: &str) -> Result<Self, CorpusError> {
        let file_name = format!("{name}.json");
        let file = CORPUS_DIR
            .get_file(&file_name)
            .ok_or_else(|| CorpusError::NotFound(file_name.clone()))?;
        let contents = file
            .contents_utf8()
            .ok_or(CorpusError::NotFound(file_name))?;
        Ok(serde_json::from_str(contents)?)
    }
}
