//! SQLite access through a single worker thread.
//!
//! rusqlite connections are not `Sync`, so one thread owns the connection and
//! async callers hand it closures through [`Database::execute`].

use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc},
    thread::{self, JoinHandle},
    time::Duration,
};

use anyhow::{anyhow, Context, Result};
use log::{error, info, warn};
use rusqlite::Connection;
use tokio::sync::oneshot;

pub mod helpers;
mod migrations;
pub mod models;
pub mod repositories;

pub use models::{Account, NewAccount, StoredSession};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

type Job = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

/// Owns the connection thread. Dropping it closes the job channel, which ends
/// the thread's loop, then waits for the thread to exit.
struct Worker {
    jobs: Option<mpsc::Sender<Job>>,
    thread: Option<JoinHandle<()>>,
}

impl Drop for Worker {
    fn drop(&mut self) {
        drop(self.jobs.take());
        if let Some(thread) = self.thread.take() {
            if let Err(err) = thread.join() {
                error!("agriscan-db thread panicked: {err:?}");
            }
        }
    }
}

/// Handle to the account and session database. Clones share one worker; it
/// stops when the last clone is dropped.
#[derive(Clone)]
pub struct Database {
    worker: Arc<Worker>,
    path: Arc<PathBuf>,
}

impl Database {
    /// Opens (creating if needed) the database at `path` and brings its schema
    /// up to date before returning.
    pub fn new(path: PathBuf) -> Result<Self> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create database directory {}", dir.display()))?;
        }

        let (jobs_tx, jobs_rx) = mpsc::channel::<Job>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<()>>(1);
        let thread_path = path.clone();

        let thread = thread::Builder::new()
            .name("agriscan-db".into())
            .spawn(move || {
                let mut conn = match open_connection(&thread_path) {
                    Ok(conn) => {
                        let _ = ready_tx.send(Ok(()));
                        conn
                    }
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };

                for job in jobs_rx {
                    job(&mut conn);
                }
                info!("agriscan-db thread stopped");
            })
            .context("failed to spawn agriscan-db thread")?;

        ready_rx
            .recv()
            .context("agriscan-db thread exited during startup")??;
        info!("Opened account database at {}", path.display());

        Ok(Self {
            worker: Arc::new(Worker {
                jobs: Some(jobs_tx),
                thread: Some(thread),
            }),
            path: Arc::new(path),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs `task` against the connection and resolves with what it returns.
    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let jobs = self
            .worker
            .jobs
            .as_ref()
            .ok_or_else(|| anyhow!("database worker is shutting down"))?;

        let (reply_tx, reply_rx) = oneshot::channel();
        jobs.send(Box::new(move |conn| {
            // The caller may have stopped waiting; nothing to do then.
            let _ = reply_tx.send(task(conn));
        }))
        .map_err(|_| anyhow!("database worker is not running"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("database worker dropped a request"))?
    }
}

fn open_connection(path: &Path) -> Result<Connection> {
    let mut conn = Connection::open(path)
        .with_context(|| format!("failed to open SQLite database {}", path.display()))?;

    if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
        warn!("WAL journal unavailable, using the default journal: {err}");
    }
    conn.busy_timeout(BUSY_TIMEOUT)
        .context("failed to set SQLite busy timeout")?;

    migrations::run_migrations(&mut conn).context("failed to migrate database")?;
    Ok(conn)
}
