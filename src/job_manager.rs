use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::info;

use crate::dedup::SessionState;
use crate::error::{Result, SwallowError};
use crate::scraper::{ProgressEvent, RunSummary, Scraper};

/// Runs a scrape on a worker thread. Pages are still fetched one at a time.
pub struct Job;

impl Job {
    pub fn spawn(scraper: Scraper, state: SessionState, urls: Vec<String>) -> JobHandle {
        Self::spawn_with_cancel(scraper, state, urls, Arc::new(AtomicBool::new(false)))
    }

    /// Like [`Job::spawn`], with a caller-owned cancellation flag.
    pub fn spawn_with_cancel(
        scraper: Scraper,
        mut state: SessionState,
        urls: Vec<String>,
        cancel: Arc<AtomicBool>,
    ) -> JobHandle {
        let (tx, rx) = mpsc::channel();
        let worker_cancel = cancel.clone();

        let worker = thread::spawn(move || {
            let summary = scraper.run_with(&mut state, &urls, &worker_cancel, |event| {
                // The receiver may be gone; the run carries on regardless.
                let _ = tx.send(event);
            });
            (state, summary)
        });

        JobHandle {
            cancel,
            events: rx,
            worker,
        }
    }
}

pub struct JobHandle {
    cancel: Arc<AtomicBool>,
    events: Receiver<ProgressEvent>,
    worker: JoinHandle<(SessionState, RunSummary)>,
}

impl JobHandle {
    /// Stops the job before its next URL.
    pub fn cancel(&self) {
        info!("Cancellation requested");
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Blocks for events until the job finishes.
    pub fn events(&self) -> impl Iterator<Item = ProgressEvent> + '_ {
        self.events.iter()
    }

    pub fn try_next_event(&self) -> Option<ProgressEvent> {
        self.events.try_recv().ok()
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    pub fn join(self) -> Result<(SessionState, RunSummary)> {
        self.worker.join().map_err(|_| SwallowError::JobPanicked)
    }
}
