//! `draftmatch`: drive a coordinator from a line-oriented stream.
//!
//! Reads one JSON object per line on stdin, for example
//!
//! ```text
//! {"lobby":"eu","type":"join-queue","identity":"alice"}
//! {"lobby":"eu","type":"ban-map","acting_captain":"alice","map":"Dune"}
//! ```
//!
//! and writes every broadcast and rejection as one JSON line on stdout.
//! Logs go to stderr.
//!
//! ## Environment
//!
//! - `RUST_LOG`: log filter (default `info`)
//! - `DRAFTMATCH_LOG_JSON=1`: JSON log lines
//! - `DRAFTMATCH_CONFIG`: lobby config path (or pass it as the first argument)
//! - `DRAFTMATCH_RATINGS`: JSON object mapping identities to ratings

use std::collections::HashMap;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use draftmatch_lobby::{Coordinator, Gateway};
use draftmatch_queue::InMemoryRatings;
use draftmatch_types::{
    Action, Broadcast, ConnectionId, DraftmatchError, Envelope, Identity, LobbyConfig, LobbyId,
    Rejection, Result, constants,
};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOBBY: &str = "main";

/// One input line: an action plus optional routing.
#[derive(Debug, Deserialize)]
struct InputLine {
    #[serde(default = "default_lobby")]
    lobby: LobbyId,
    #[serde(default)]
    connection: Option<ConnectionId>,
    #[serde(flatten)]
    action: Action,
}

fn default_lobby() -> LobbyId {
    LobbyId::from(DEFAULT_LOBBY)
}

fn parse_line(line: &str) -> Result<Envelope> {
    let input: InputLine = serde_json::from_str(line)?;
    Ok(Envelope::new(
        input.lobby,
        input.connection.unwrap_or_default(),
        input.action,
    ))
}

/// One output line.
#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum OutputLine<'a> {
    Broadcast(&'a Broadcast),
    Reply {
        connection: ConnectionId,
        rejection: &'a Rejection,
    },
}

/// Gateway that prints to stdout. Every viewer is the terminal.
struct StdoutGateway;

impl StdoutGateway {
    fn emit(line: &OutputLine<'_>) {
        let mut out = std::io::stdout().lock();
        let written = serde_json::to_writer(&mut out, line)
            .map_err(std::io::Error::from)
            .and_then(|()| writeln!(out));
        if let Err(err) = written {
            tracing::warn!(error = %err, "stdout write failed");
        }
    }
}

impl Gateway for StdoutGateway {
    fn broadcast(&self, message: &Broadcast) {
        Self::emit(&OutputLine::Broadcast(message));
    }

    fn reply(&self, connection: ConnectionId, rejection: &Rejection) {
        Self::emit(&OutputLine::Reply {
            connection,
            rejection,
        });
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if std::env::var("DRAFTMATCH_LOG_JSON").is_ok_and(|v| v == "1") {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config() -> Result<LobbyConfig> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("DRAFTMATCH_CONFIG").ok());
    match path {
        Some(path) => {
            tracing::info!(path = %path, "Loading lobby config");
            LobbyConfig::from_path(path)
        }
        None => Ok(LobbyConfig::default()),
    }
}

fn load_ratings(baseline: u32) -> Result<InMemoryRatings> {
    let mut directory = InMemoryRatings::new(baseline);
    if let Ok(path) = std::env::var("DRAFTMATCH_RATINGS") {
        let raw = std::fs::read_to_string(&path)?;
        let table: HashMap<String, u32> = serde_json::from_str(&raw)
            .map_err(|e| DraftmatchError::Configuration(format!("{path}: {e}")))?;
        for (name, rating) in table {
            directory.insert(Identity::from(name), rating);
        }
        tracing::info!(path = %path, players = directory.len(), "Ratings loaded");
    }
    Ok(directory)
}

async fn run() -> Result<()> {
    let config = load_config()?;
    let ratings = load_ratings(config.rating_baseline)?;
    tracing::info!(
        engine = constants::ENGINE_NAME,
        version = constants::VERSION,
        mode = %config.mode,
        maps = config.maps.len(),
        turn_policy = ?config.turn_policy,
        "draftmatch ready"
    );
    let coordinator = Coordinator::new(config, Arc::new(ratings), Arc::new(StdoutGateway))?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_line(line) {
            // Rejections were already replied through the gateway.
            Ok(envelope) => {
                let _ = coordinator.dispatch(envelope).await;
            }
            Err(err) => tracing::warn!(error = %err, line, "Unreadable input line"),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "draftmatch stopped");
            ExitCode::FAILURE
        }
    }
}
