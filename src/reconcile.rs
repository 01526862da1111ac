//! Background reconciliation.
//!
//! A [`Reconciler`] owns one worker thread that repeatedly drops catalog
//! entries whose file disappeared and adds newly discovered files, then
//! sleeps for the configured interval. Each reconciler belongs to one
//! library; there is no process-wide scanning state.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::ReconcileSettings;
use crate::library::{LibraryHandle, LibraryManager, ReconcileReport};

/// Lifecycle of the background worker.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum ReconcilerState {
    /// No worker thread.
    #[default]
    Idle,
    /// A pass is in progress.
    Running,
    /// Between passes, waiting for the interval or a stop request.
    Sleeping,
}

#[derive(Debug, Default)]
struct Status {
    state: ReconcilerState,
    passes: u64,
    last_report: Option<ReconcileReport>,
}

type StatusHandle = Arc<Mutex<Status>>;

fn lock(status: &StatusHandle) -> MutexGuard<'_, Status> {
    status.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Worker {
    stop_tx: Sender<()>,
    join: JoinHandle<()>,
}

pub struct Reconciler {
    library: LibraryHandle,
    root: PathBuf,
    recursive: bool,
    interval: Duration,
    status: StatusHandle,
    worker: Option<Worker>,
}

impl Reconciler {
    /// A stopped reconciler for `manager`'s catalog and root.
    pub fn new(manager: &LibraryManager, settings: &ReconcileSettings) -> Self {
        Self {
            library: manager.handle(),
            root: manager.root(),
            recursive: settings.recursive,
            interval: settings.interval(),
            status: StatusHandle::default(),
            worker: None,
        }
    }

    /// Watch `root` instead of the library root. Takes effect on the next
    /// [`start`](Self::start).
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> ReconcilerState {
        lock(&self.status).state
    }

    /// Whether a worker thread is alive.
    pub fn is_active(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|w| !w.join.is_finished())
    }

    /// Completed passes since creation.
    pub fn passes(&self) -> u64 {
        lock(&self.status).passes
    }

    pub fn last_report(&self) -> Option<ReconcileReport> {
        lock(&self.status).last_report.clone()
    }

    /// Spawn the worker. The first pass starts immediately. Does nothing if
    /// a worker is already running.
    pub fn start(&mut self) {
        if self.is_active() {
            debug!("reconciler already running");
            return;
        }
        // Reap a worker that exited on its own (it can only have panicked).
        self.join_worker();

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let job = Job {
            library: self.library.clone(),
            root: self.root.clone(),
            recursive: self.recursive,
            interval: self.interval,
            status: self.status.clone(),
        };

        lock(&self.status).state = ReconcilerState::Running;
        match thread::Builder::new()
            .name("tuneshelf-reconcile".into())
            .spawn(move || job.run(stop_rx))
        {
            Ok(join) => {
                info!(root = %self.root.display(), interval_secs = self.interval.as_secs(), "reconciler started");
                self.worker = Some(Worker { stop_tx, join });
            }
            Err(err) => {
                error!(error = %err, "failed to spawn reconciler thread");
                lock(&self.status).state = ReconcilerState::Idle;
            }
        }
    }

    /// Ask the worker to stop and wait for it. A pass in progress runs to
    /// completion first; a sleeping worker wakes up at once.
    pub fn stop(&mut self) {
        if let Some(worker) = &self.worker {
            let _ = worker.stop_tx.send(());
        }
        if self.join_worker() {
            info!("reconciler stopped");
        }
    }

    fn join_worker(&mut self) -> bool {
        let Some(worker) = self.worker.take() else {
            return false;
        };
        if worker.join.join().is_err() {
            warn!("reconciler thread panicked");
        }
        lock(&self.status).state = ReconcilerState::Idle;
        true
    }
}

impl Drop for Reconciler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Everything the worker thread owns.
struct Job {
    library: LibraryHandle,
    root: PathBuf,
    recursive: bool,
    interval: Duration,
    status: StatusHandle,
}

impl Job {
    fn run(self, stop_rx: Receiver<()>) {
        loop {
            lock(&self.status).state = ReconcilerState::Running;
            let report = self.library.reconcile_once(&self.root, self.recursive);
            debug!(
                added = report.added.len(),
                removed = report.removed.len(),
                "reconcile pass finished"
            );
            {
                let mut status = lock(&self.status);
                status.passes += 1;
                status.last_report = Some(report);
                status.state = ReconcilerState::Sleeping;
            }

            match stop_rx.recv_timeout(self.interval) {
                Err(RecvTimeoutError::Timeout) => continue,
                // Stop requested, or the owning reconciler is gone.
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        lock(&self.status).state = ReconcilerState::Idle;
    }
}
