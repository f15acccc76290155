use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use klack::app_dirs::AppDirs;
use klack::config::{Config, ConfigStore, FileConfigStore};
use klack::corpus::Corpus;
use klack::server::{self, ServerState};
use klack::store::{sentences, Db};

/// typing-speed practice service with a cached top-10 leaderboard
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Serves random sentences, scores streamed keystroke events into WPM and accuracy, and keeps a cached top-10 leaderboard of submitted scores."
)]
struct Cli {
    /// address to listen on
    #[clap(short, long)]
    bind: Option<String>,

    /// path to the sqlite database (defaults to the platform state dir)
    #[clap(short, long)]
    db: Option<PathBuf>,

    /// embedded corpus to seed an empty sentence table from
    #[clap(short, long)]
    corpus: Option<String>,
}

impl Cli {
    /// Applies CLI overrides on top of the stored configuration.
    fn merge_into(self, mut config: Config) -> Config {
        if let Some(bind) = self.bind {
            config.bind_addr = bind;
        }
        if let Some(db) = self.db {
            config.db_path = Some(db);
        }
        if let Some(corpus) = self.corpus {
            config.corpus = corpus;
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().merge_into(FileConfigStore::new().load());

    let db_path = config
        .db_path
        .clone()
        .or_else(AppDirs::db_path)
        .unwrap_or_else(|| PathBuf::from("klack.db"));
    let db = Db::open(&db_path)
        .with_context(|| format!("opening database at {}", db_path.display()))?;
    info!(path = %db_path.display(), "database ready");

    let corpus = Corpus::load(&config.corpus)
        .with_context(|| format!("loading corpus {:?}", config.corpus))?;
    let seeded = sentences::seed(db.conn(), &corpus.sentences)?;
    if seeded > 0 {
        info!(count = seeded, corpus = %corpus.name, "seeded sentence corpus");
    }

    server::serve(ServerState::new(db), &config.bind_addr).await
}
