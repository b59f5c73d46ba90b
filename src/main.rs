use std::path::PathBuf;
use std::sync::Arc;

use canvas::doc::{DocStore, ElementId, Platform, system_now_ms};
use canvas::engine::{Action, EngineConfig, EngineCore};
use canvas::ids::RandomIds;
use clap::{Parser, Subcommand};
use contentboard::api::HttpContentApi;
use contentboard::api::types::ApiError;
use contentboard::config::{ConfigError, ServiceConfig};
use contentboard::services::persistence::{self, JsonFileRepository, RepoError};
use contentboard::services::search::{CreatorSearch, SearchError};
use contentboard::services::{analysis, content, dispatch};
use contentboard::state::AppState;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("no element {0} on the board")]
    UnknownElement(ElementId),
    #[error("not a supported content URL: {0}")]
    NotIngestable(String),
}

#[derive(Parser, Debug)]
#[command(name = "contentboard", about = "Content board host: ingest, analyze, and lay out social content")]
struct Cli {
    /// Board file to load and save.
    #[arg(long, env = "CONTENTBOARD_FILE", default_value = "board.json")]
    board: PathBuf,

    /// Container width in CSS pixels, used for view-relative placement.
    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    #[arg(long, default_value_t = 800.0)]
    height: f64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a content URL to the board and ingest it.
    Ingest { url: String },
    /// Request analysis for an ingested card.
    Analyze { id: ElementId },
    /// Search a creator's recent content and place it on the board.
    Search {
        #[arg(long, value_parser = parse_platform, default_value = "instagram")]
        platform: Platform,
        handle: String,
        #[arg(long, default_value = "latest")]
        filter: String,
    },
    /// Delete elements and release their remote content.
    Delete {
        #[arg(required = true)]
        ids: Vec<ElementId>,
    },
    /// Fit the view to all elements and print the viewport.
    Fit,
    /// Print the ids of elements inside the current view.
    Visible,
}

fn parse_platform(raw: &str) -> Result<Platform, String> {
    match raw.to_ascii_lowercase().as_str() {
        "instagram" => Ok(Platform::Instagram),
        "youtube" => Ok(Platform::Youtube),
        "tiktok" => Ok(Platform::Tiktok),
        other => Err(format!("unsupported platform `{other}` (expected instagram, youtube, or tiktok)")),
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = ServiceConfig::from_env()?;
    let api = Arc::new(HttpContentApi::new(&config)?);

    let mut core = EngineCore::with_parts(DocStore::with_clock(system_now_ms), Box::new(RandomIds), EngineConfig::default());
    core.set_viewport(cli.width, cli.height, 1.0);
    let state = AppState::new(core, api, config);

    let repo = Arc::new(JsonFileRepository::new(cli.board));
    if !persistence::load_into(&state, repo.as_ref()).await? {
        info!(path = %repo.path().display(), "starting with an empty board");
    }

    match cli.command {
        Command::Ingest { url } => run_ingest(&state, repo, &url).await,
        Command::Analyze { id } => run_analyze(&state, repo.as_ref(), id).await,
        Command::Search { platform, handle, filter } => {
            let search = CreatorSearch { platform, handle, filter, user_id: None };
            let placed = contentboard::services::search::search_creator(&state, search).await?;
            persistence::save_now(&state, repo.as_ref()).await?;
            println!("placed {} elements", placed.iter().filter(|a| matches!(a, Action::ElementCreated(_))).count());
            Ok(())
        }
        Command::Delete { ids } => {
            for id in &ids {
                if state.board.read().await.element(id).is_none() {
                    return Err(CliError::UnknownElement(*id));
                }
            }
            content::delete_elements(&state, &ids).await;
            persistence::save_now(&state, repo.as_ref()).await?;
            println!("deleted {} elements", ids.len());
            Ok(())
        }
        Command::Fit => {
            state.board.write().await.fit_to_screen();
            persistence::save_now(&state, repo.as_ref()).await?;
            let viewport = state.board.read().await.viewport();
            println!("{}", serde_json::to_string_pretty(&viewport)?);
            Ok(())
        }
        Command::Visible => {
            for id in state.board.write().await.visible_elements() {
                println!("{id}");
            }
            Ok(())
        }
    }
}

async fn run_ingest(state: &AppState, repo: Arc<JsonFileRepository>, url: &str) -> Result<(), CliError> {
    state.config.require_project_id()?;
    let actions = state.board.write().await.on_paste(url);
    if actions.is_empty() {
        return Err(CliError::NotIngestable(url.to_owned()));
    }

    // Flush progress while the scrape is polled.
    let shutdown = CancellationToken::new();
    let flusher = persistence::spawn_persistence_task(state.clone(), repo, shutdown.clone());
    let handles = dispatch(state, &actions).await;
    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        outcomes.push(handle.await?);
    }
    shutdown.cancel();
    flusher.await?;

    for outcome in outcomes {
        println!("{outcome:?}");
    }
    Ok(())
}

async fn run_analyze(state: &AppState, repo: &JsonFileRepository, id: ElementId) -> Result<(), CliError> {
    if state.board.read().await.element(&id).is_none() {
        return Err(CliError::UnknownElement(id));
    }
    let outcome = analysis::analyze(state, id).await;
    persistence::save_now(state, repo).await?;
    println!("{outcome:?}");
    Ok(())
}
