//! Persistence service — debounced save of the board snapshot.
//!
//! DESIGN
//! ======
//! A background task wakes every `BOARD_FLUSH_INTERVAL_MS`, snapshots the
//! board under the read lock, releases it, and writes the snapshot through a
//! [`BoardRepository`]. A flush is skipped when neither the store revision
//! nor the viewport moved since the last successful write.
//!
//! ERROR HANDLING
//! ==============
//! The last-saved marker only advances after a successful write, so a failed
//! flush is retried on the next tick.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use canvas::camera::Viewport;
use canvas::doc::CanvasState;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("board file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("board JSON invalid: {0}")]
    Json(#[from] serde_json::Error),
}

/// Storage for the persisted board shape.
#[async_trait::async_trait]
pub trait BoardRepository: Send + Sync {
    /// Load the saved board, or `None` when nothing was saved yet.
    async fn load(&self) -> Result<Option<CanvasState>, RepoError>;

    async fn save(&self, state: &CanvasState) -> Result<(), RepoError>;
}

// =============================================================================
// JSON FILE REPOSITORY
// =============================================================================

/// One board per JSON file. Writes go to a sibling temp file first.
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait::async_trait]
impl BoardRepository for JsonFileRepository {
    async fn load(&self) -> Result<Option<CanvasState>, RepoError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, state: &CanvasState) -> Result<(), RepoError> {
        let json = serde_json::to_vec_pretty(state)?;
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

// =============================================================================
// FLUSH
// =============================================================================

/// What was last written: store revision plus viewport.
pub type SavedMarker = (u64, Viewport);

/// Load the saved board into the engine. Returns false when nothing was saved.
///
/// # Errors
///
/// Propagates repository errors.
pub async fn load_into(state: &AppState, repo: &dyn BoardRepository) -> Result<bool, RepoError> {
    let Some(saved) = repo.load().await? else {
        return Ok(false);
    };
    let mut core = state.board.write().await;
    core.load_snapshot(saved);
    info!(elements = core.doc.len(), connections = core.doc.connections().len(), "board loaded");
    Ok(true)
}

/// Write the board if it changed since `last`. Returns true when a write happened.
///
/// # Errors
///
/// Propagates repository errors; `last` is left untouched on failure.
pub async fn flush_if_changed(
    state: &AppState,
    repo: &dyn BoardRepository,
    last: &mut Option<SavedMarker>,
) -> Result<bool, RepoError> {
    // Snapshot under the lock, write without it.
    let (marker, snapshot) = {
        let core = state.board.read().await;
        let marker = (core.doc.revision(), core.viewport());
        if last.as_ref() == Some(&marker) {
            return Ok(false);
        }
        (marker, core.snapshot())
    };
    repo.save(&snapshot).await?;
    debug!(revision = marker.0, elements = snapshot.elements.len(), "board flushed");
    *last = Some(marker);
    Ok(true)
}

/// Write the board unconditionally.
///
/// # Errors
///
/// Propagates repository errors.
pub async fn save_now(state: &AppState, repo: &dyn BoardRepository) -> Result<(), RepoError> {
    let snapshot = state.board.read().await.snapshot();
    repo.save(&snapshot).await
}

/// Spawn the debounced flush loop. Cancelling `shutdown` performs one final
/// flush before the task exits.
pub fn spawn_persistence_task(
    state: AppState,
    repo: Arc<dyn BoardRepository>,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    let interval = state.config.flush_interval();
    info!(flush_interval_ms = state.config.flush_interval_ms, "board persistence flush configured");
    tokio::spawn(async move {
        let mut last = None;
        loop {
            let stopping = tokio::select! {
                () = shutdown.cancelled() => true,
                () = tokio::time::sleep(interval) => false,
            };
            if let Err(e) = flush_if_changed(&state, repo.as_ref(), &mut last).await {
                error!(error = %e, "board persistence flush failed");
            }
            if stopping {
                break;
            }
        }
    })
}

#[cfg(test)]
#[path = "persistence_test.rs"]
mod tests;
