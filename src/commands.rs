//! Entry points for the capture, results and account screens.
//!
//! Every command returns a serializable [`CommandError`] so the UI can show a
//! per-field message for validation failures and a single message otherwise.

use log::{error, warn};
use serde::Serialize;

use crate::{
    analysis::{build_snapshot, AnalysisResult, Category, CropKind, ImageUpload},
    db::Account,
    scan::ProgressSnapshot,
    session::{AccountError, FieldError, Registration, Session},
    settings::ScanPreferences,
    AppState,
};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Validation,
    Authentication,
    NotAuthenticated,
    MissingFile,
    Internal,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    pub kind: ErrorKind,
    pub message: String,
    pub fields: Vec<FieldError>,
}

impl CommandError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            fields: Vec::new(),
        }
    }
}

impl From<AccountError> for CommandError {
    fn from(err: AccountError) -> Self {
        let message = err.to_string();
        match err {
            AccountError::Validation(fields) => Self {
                kind: ErrorKind::Validation,
                message,
                fields,
            },
            AccountError::Authentication => Self::new(ErrorKind::Authentication, message),
            AccountError::NotAuthenticated => Self::new(ErrorKind::NotAuthenticated, message),
            AccountError::Storage(err) => {
                error!("Storage failure: {err:#}");
                Self::new(ErrorKind::Internal, "Something went wrong. Please try again.")
            }
        }
    }
}

pub async fn register(state: &AppState, form: Registration) -> Result<Account, CommandError> {
    Ok(state.sessions.register(form).await?)
}

pub async fn login(state: &AppState, email: &str, password: &str) -> Result<Session, CommandError> {
    Ok(state.sessions.login(email, password).await?)
}

/// Signs out, stops any scan in flight and drops the pending result.
pub async fn logout(state: &AppState) -> Result<(), CommandError> {
    state.scanner.reset();
    state.capture().reset();
    state.sessions.logout().await?;
    Ok(())
}

pub async fn current_session(state: &AppState) -> Result<Option<Session>, CommandError> {
    Ok(state.sessions.current_session().await?)
}

pub async fn list_accounts(state: &AppState) -> Result<Vec<Account>, CommandError> {
    Ok(state.sessions.accounts().await?)
}

pub fn get_preferences(state: &AppState) -> ScanPreferences {
    state.capture().preferences()
}

pub fn select_category(state: &AppState, category: Category) {
    state.capture().set_category(category);
}

pub fn select_crop_kind(state: &AppState, crop_kind: CropKind) {
    state.capture().set_crop_kind(crop_kind);
}

pub fn choose_file(state: &AppState, upload: ImageUpload) {
    state.capture().choose_file(upload);
}

/// Picks `upload` with the given selection and starts scanning it.
pub async fn submit_scan(
    state: &AppState,
    upload: ImageUpload,
    category: Category,
    crop_kind: Option<CropKind>,
) -> Result<ProgressSnapshot, CommandError> {
    state.sessions.require_session().await?;
    {
        let mut capture = state.capture();
        capture.set_category(category);
        if let Some(crop_kind) = crop_kind {
            capture.set_crop_kind(crop_kind);
        }
        capture.choose_file(upload);
    }
    start_capture(state).await
}

/// Starts scanning whatever the capture form currently holds.
pub async fn submit_capture(state: &AppState) -> Result<ProgressSnapshot, CommandError> {
    state.sessions.require_session().await?;
    start_capture(state).await
}

async fn start_capture(state: &AppState) -> Result<ProgressSnapshot, CommandError> {
    let (request, preferences) = {
        let capture = state.capture();
        let request = capture
            .build_request()
            .ok_or_else(|| CommandError::new(ErrorKind::MissingFile, "Choose an image to analyze"))?;
        (request, capture.preferences())
    };

    let filename = request.image.filename.clone();
    let bytes = request.image.bytes.clone();
    let progress = state.scanner.start(request);

    if let Err(err) = state.settings.update_scan_preferences(preferences) {
        warn!("Failed to save scan preferences: {err:#}");
    }

    // The scan is already ticking; the preview joins it if it is still current.
    match build_snapshot(bytes).await {
        Ok(preview) => {
            state.scanner.attach_snapshot(progress.generation, preview);
        }
        Err(err) => warn!("No preview for {filename}: {err:#}"),
    }

    Ok(progress)
}

pub fn reset_scan(state: &AppState) -> ProgressSnapshot {
    state.capture().reset();
    state.scanner.reset()
}

pub fn scan_progress(state: &AppState) -> ProgressSnapshot {
    state.scanner.progress()
}

/// Hands the finished result to the results screen. Returns `None` when there
/// is nothing waiting, including on a second call for the same scan.
pub async fn take_result(state: &AppState) -> Result<Option<AnalysisResult>, CommandError> {
    state.sessions.require_session().await?;
    Ok(state.sessions.take_pending_result())
}
