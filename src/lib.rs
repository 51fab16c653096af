pub mod analysis;
pub mod commands;
pub mod config;
pub mod db;
pub mod scan;
pub mod session;
pub mod settings;
pub mod utils;

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use log::info;

use config::AppConfig;
use db::Database;
use scan::{CaptureForm, LogEventSink, ScanController, ScanEventSink, Scheduler, TokioScheduler};
use session::SessionStore;
use settings::SettingsStore;

/// Everything the UI surfaces talk to, wired once at startup.
pub struct AppState {
    pub config: AppConfig,
    pub db: Database,
    pub sessions: SessionStore,
    pub scanner: ScanController,
    pub settings: SettingsStore,
    capture: Mutex<CaptureForm>,
}

impl AppState {
    /// Opens the app on the current Tokio runtime.
    pub fn open(config: AppConfig) -> Result<Self> {
        let scheduler = Arc::new(TokioScheduler::current()?);
        Self::open_with(config, scheduler, Arc::new(LogEventSink))
    }

    pub fn open_with(
        config: AppConfig,
        scheduler: Arc<dyn Scheduler>,
        events: Arc<dyn ScanEventSink>,
    ) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir).with_context(|| {
            format!("failed to create data directory {}", config.data_dir.display())
        })?;

        let db = Database::new(config.database_path())?;
        let sessions = SessionStore::new(db.clone());
        let scanner = ScanController::new(scheduler, sessions.result_slot(), events, config.timing);
        let settings = SettingsStore::new(config.settings_path())?;
        let capture = CaptureForm::new(&settings.scan_preferences());

        Ok(Self {
            config,
            db,
            sessions,
            scanner,
            settings,
            capture: Mutex::new(capture),
        })
    }

    pub(crate) fn capture(&self) -> MutexGuard<'_, CaptureForm> {
        match self.capture.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Reads configuration from the environment, installs logging and opens the
/// app. Must be called from inside a Tokio runtime.
pub fn run() -> Result<AppState> {
    let config = AppConfig::from_env()?;
    utils::init_logging(config.debug);

    info!("AgriScan starting up...");
    let state = AppState::open(config)?;
    info!("Data directory: {}", state.config.data_dir.display());

    Ok(state)
}
