//! Per-page preview state and background rendering.
//!
//! Renders run as blocking tasks and report back over a channel to the loop
//! that owns the board. A board hands each task its [`Liveness`] token; when the
//! board is replaced the token is revoked and late results are dropped on
//! arrival. Running renders are not cancelled, so every board also writes
//! under its own generation number and a late render can only touch files no
//! live board points at.

use crate::error::{Error, Result};
use crate::pdf::PageRasterizer;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Shared flag saying whether the board that scheduled a render still exists.
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    fn new() -> Self {
        Liveness(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn revoke(&self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailState {
    Loading,
    Ready(Thumbnail),
}

#[derive(Debug)]
pub struct RenderOutcome {
    pub page: u32,
    pub liveness: Liveness,
    pub result: Result<Thumbnail>,
}

#[derive(Debug)]
pub struct ThumbnailBoard {
    liveness: Liveness,
    generation: u64,
    states: Vec<ThumbnailState>,
}

impl ThumbnailBoard {
    pub fn new(page_count: u32) -> Self {
        ThumbnailBoard {
            liveness: Liveness::new(),
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
            states: vec![ThumbnailState::Loading; page_count as usize],
        }
    }

    /// Where this board writes the preview of `page` inside `dir`.
    pub fn file_path(&self, dir: &Path, page: u32) -> PathBuf {
        dir.join(format!("page-{:04}-{}.png", page, self.generation))
    }

    /// State of 1-based `page`.
    pub fn state(&self, page: u32) -> Option<&ThumbnailState> {
        page.checked_sub(1)
            .and_then(|index| self.states.get(index as usize))
    }

    pub fn ready_count(&self) -> usize {
        self.states
            .iter()
            .filter(|state| matches!(state, ThumbnailState::Ready(_)))
            .count()
    }

    /// Start one render per page; results arrive on `sender`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(
        &self,
        rasterizer: Arc<dyn PageRasterizer>,
        target_width: u32,
        dir: &Path,
        sender: UnboundedSender<RenderOutcome>,
    ) {
        for page in 1..=self.states.len() as u32 {
            let rasterizer = Arc::clone(&rasterizer);
            let liveness = self.liveness.clone();
            let path = self.file_path(dir, page);
            let sender = sender.clone();

            tokio::task::spawn_blocking(move || {
                if !liveness.is_alive() {
                    return;
                }
                let result = render_to_file(rasterizer.as_ref(), page, target_width, path);
                // The receiver is gone once the session ends
                let _ = sender.send(RenderOutcome {
                    page,
                    liveness,
                    result,
                });
            });
        }
        debug!(
            pages = self.states.len(),
            target_width,
            generation = self.generation,
            "scheduled thumbnail renders"
        );
    }

    /// Record a finished render. Returns `false` if it belonged to a replaced board.
    pub fn apply(&mut self, outcome: RenderOutcome) -> bool {
        if !outcome.liveness.is_alive() || !Arc::ptr_eq(&outcome.liveness.0, &self.liveness.0) {
            debug!(page = outcome.page, "discarding stale thumbnail");
            return false;
        }

        match outcome.result {
            Ok(thumbnail) => {
                if let Some(slot) = outcome
                    .page
                    .checked_sub(1)
                    .and_then(|index| self.states.get_mut(index as usize))
                {
                    *slot = ThumbnailState::Ready(thumbnail);
                }
            }
            Err(err) => {
                warn!(page = outcome.page, error = %err, "thumbnail render failed");
            }
        }
        true
    }
}

impl Drop for ThumbnailBoard {
    fn drop(&mut self) {
        self.liveness.revoke();
    }
}

fn render_to_file(
    rasterizer: &dyn PageRasterizer,
    page: u32,
    target_width: u32,
    path: PathBuf,
) -> Result<Thumbnail> {
    let image = rasterizer.render_page(page, target_width)?;
    image.save(&path).map_err(|err| Error::Render {
        page,
        reason: format!("failed to write {}: {}", path.display(), err),
    })?;
    Ok(Thumbnail {
        width: image.width(),
        height: image.height(),
        path,
    })
}
