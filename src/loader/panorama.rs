//! Cancellable, one-at-a-time panorama loading.
//!
//! `load` schedules a fetch+decode job on the injected executor and returns a
//! token. Starting another load cancels the previous token. Completions are
//! collected with `poll` on the caller's thread; anything belonging to a
//! cancelled or superseded token is dropped there without a trace.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use web_time::Instant;

use super::decoder::{DecoderRegistry, LoaderError};
use super::executor::Executor;
use super::source::MediaSource;
use super::texture::Texture;
use crate::error::GalleryError;
use crate::model::MediaKind;

/// Identifies one `load` call and carries its cancellation flag.
#[derive(Debug, Clone)]
pub struct LoadToken {
    id: u64,
    cancelled: Arc<AtomicBool>,
}

impl LoadToken {
    fn new(id: u64) -> Self {
        Self {
            id,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Sequence number of the load.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether the load has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

impl PartialEq for LoadToken {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Message sent back from a finished job.
struct LoadOutcome {
    id: u64,
    url: String,
    result: Result<Texture, LoaderError>,
}

/// A completed load for the active token.
#[derive(Debug)]
pub struct LoadCompletion {
    /// Token id the completion belongs to
    pub token_id: u64,
    /// URL that was loaded
    pub url: String,
    /// Decoded texture, or `MediaLoadFailed`
    pub result: Result<Arc<Texture>, GalleryError>,
}

/// Fetches and decodes panoramas on an executor, one in flight at a time.
pub struct PanoramaLoader {
    executor: Arc<dyn Executor>,
    source: Arc<dyn MediaSource>,
    decoders: Arc<DecoderRegistry>,
    /// Sender cloned into every job
    result_tx: Sender<LoadOutcome>,
    /// Receiver for finished jobs
    result_rx: Receiver<LoadOutcome>,
    /// Counter for generating unique token ids
    next_id: u64,
    /// Token of the outstanding load, if any
    active: Option<LoadToken>,
}

impl PanoramaLoader {
    /// Create a loader with the built-in decoders.
    pub fn new(executor: Arc<dyn Executor>, source: Arc<dyn MediaSource>) -> Self {
        Self::with_decoders(executor, source, DecoderRegistry::new())
    }

    /// Create a loader with a custom decoder registry.
    pub fn with_decoders(
        executor: Arc<dyn Executor>,
        source: Arc<dyn MediaSource>,
        decoders: DecoderRegistry,
    ) -> Self {
        let (result_tx, result_rx) = mpsc::channel();
        Self {
            executor,
            source,
            decoders: Arc::new(decoders),
            result_tx,
            result_rx,
            next_id: 0,
            active: None,
        }
    }

    /// Start loading `url`. Any outstanding load is cancelled first.
    pub fn load(&mut self, url: &str, kind: MediaKind) -> LoadToken {
        self.cancel();

        let token = LoadToken::new(self.next_id);
        self.next_id += 1;

        let job_token = token.clone();
        let job_url = url.to_string();
        let source = Arc::clone(&self.source);
        let decoders = Arc::clone(&self.decoders);
        let result_tx = self.result_tx.clone();

        self.executor.spawn(Box::new(move || {
            if job_token.is_cancelled() {
                log::debug!("Skipping cancelled load {} ({})", job_token.id, job_url);
                return;
            }

            let started = Instant::now();
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                source
                    .fetch(&job_url)
                    .and_then(|bytes| decoders.decode(&job_url, kind, bytes))
            }))
            .unwrap_or_else(|_| Err(LoaderError::new("fetch or decode panicked")));
            log::debug!(
                "Load {} of {} finished in {:?} (ok: {})",
                job_token.id,
                job_url,
                started.elapsed(),
                result.is_ok()
            );

            // The receiver only goes away with the loader itself
            let _ = result_tx.send(LoadOutcome {
                id: job_token.id,
                url: job_url,
                result,
            });
        }));

        log::debug!("Requested load {} of {} ({:?})", token.id, url, kind);
        self.active = Some(token.clone());
        token
    }

    /// Cancel the outstanding load, if any. Its completion will never be reported.
    pub fn cancel(&mut self) {
        if let Some(token) = self.active.take() {
            log::debug!("Cancelling load {}", token.id);
            token.cancel();
        }
    }

    /// Whether a load is outstanding.
    pub fn is_loading(&self) -> bool {
        self.active.is_some()
    }

    /// Token of the outstanding load.
    pub fn active_token(&self) -> Option<&LoadToken> {
        self.active.as_ref()
    }

    /// Take the completion of the active load, if it has finished.
    ///
    /// Non-blocking. Stale completions queued ahead of it are discarded.
    pub fn poll(&mut self) -> Option<LoadCompletion> {
        loop {
            let outcome = match self.result_rx.try_recv() {
                Ok(outcome) => outcome,
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => {
                    log::warn!("Loader result channel disconnected");
                    return None;
                }
            };

            let is_active = self
                .active
                .as_ref()
                .is_some_and(|t| t.id == outcome.id && !t.is_cancelled());
            if !is_active {
                log::debug!("Discarding stale load {} ({})", outcome.id, outcome.url);
                continue;
            }

            self.active = None;
            let url = outcome.url;
            return Some(LoadCompletion {
                token_id: outcome.id,
                result: outcome
                    .result
                    .map(Arc::new)
                    .map_err(|e| GalleryError::media_load_failed(url.clone(), e)),
                url,
            });
        }
    }
}
