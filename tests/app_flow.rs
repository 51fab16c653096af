use std::{io::Cursor, sync::Arc, time::Duration};

use agriscan::{
    analysis::{AnalysisStatus, Category, CropKind, ImageUpload, MetricValue},
    commands::{self, ErrorKind},
    config::AppConfig,
    scan::{LogEventSink, ManualScheduler, ScanPhase, ScanTiming},
    session::{Field, Registration, DEMO_EMAIL, DEMO_PASSWORD},
    AppState,
};
use tempfile::TempDir;

const MAX_TASKS: usize = 60;

fn open_manual() -> (TempDir, ManualScheduler, AppState) {
    let dir = tempfile::tempdir().unwrap();
    let scheduler = ManualScheduler::new();
    let state = AppState::open_with(
        AppConfig::new(dir.path().join("data")),
        Arc::new(scheduler.clone()),
        Arc::new(LogEventSink),
    )
    .unwrap();
    (dir, scheduler, state)
}

fn leaf() -> ImageUpload {
    ImageUpload::new("leaf.png", vec![0u8; 500])
}

fn field_photo(width: u32, height: u32) -> ImageUpload {
    let image = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        width,
        height,
        image::Rgb([96, 130, 54]),
    ));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    ImageUpload::new("field.png", bytes)
}

#[tokio::test]
async fn scan_requires_login() {
    let (_dir, scheduler, state) = open_manual();

    let err = commands::submit_scan(&state, leaf(), Category::Crop, Some(CropKind::Rice))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotAuthenticated);
    assert_eq!(scheduler.pending(), 0);

    // A rejected submission leaves the capture form as it was.
    let preferences = commands::get_preferences(&state);
    assert_eq!(preferences.category, Category::Soil);
    assert_eq!(preferences.crop_kind, CropKind::Wheat);
    let err = commands::submit_capture(&state).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotAuthenticated);

    let err = commands::take_result(&state).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotAuthenticated);
}

#[tokio::test]
async fn login_scan_and_read_result_once() {
    let (_dir, scheduler, state) = open_manual();
    commands::login(&state, DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();

    let started = commands::submit_scan(&state, leaf(), Category::Soil, None)
        .await
        .unwrap();
    assert!(started.running);
    assert!(commands::take_result(&state).await.unwrap().is_none());

    scheduler.run_until_idle(MAX_TASKS);
    assert_eq!(commands::scan_progress(&state).phase, ScanPhase::Done);

    let result = commands::take_result(&state).await.unwrap().unwrap();
    assert_eq!(result.status, AnalysisStatus::Bad);
    assert_eq!(result.confidence, 95);
    assert_eq!(result.metrics.len(), 5);
    assert_eq!(result.metric("Nitrogen"), Some(&MetricValue::Number(63.0)));

    assert!(commands::take_result(&state).await.unwrap().is_none());
}

#[tokio::test]
async fn real_photo_result_carries_a_preview() {
    let (_dir, scheduler, state) = open_manual();
    commands::login(&state, DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();

    let started = commands::submit_scan(&state, field_photo(1200, 800), Category::Soil, None)
        .await
        .unwrap();
    assert_eq!(started.percent, 0.0);
    scheduler.run_until_idle(MAX_TASKS);

    let result = commands::take_result(&state).await.unwrap().unwrap();
    let preview = result.image_snapshot.unwrap();
    assert!(preview.starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn preview_of_a_reset_scan_is_not_kept() {
    let (_dir, scheduler, state) = open_manual();
    commands::login(&state, DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();

    let first = commands::submit_scan(&state, field_photo(64, 64), Category::Soil, None)
        .await
        .unwrap();
    commands::reset_scan(&state);
    assert!(!state.scanner.attach_snapshot(first.generation, "stale".into()));

    commands::submit_scan(&state, leaf(), Category::Soil, None)
        .await
        .unwrap();
    scheduler.run_until_idle(MAX_TASKS);
    assert!(commands::take_result(&state).await.unwrap().unwrap().image_snapshot.is_none());
}

#[tokio::test]
async fn wrong_credentials_are_rejected_with_one_message() {
    let (_dir, _scheduler, state) = open_manual();

    let err = commands::login(&state, "farmer@example.com", "whatever1")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);
    assert_eq!(err.message, "Invalid email or password");
    assert!(err.fields.is_empty());
    assert!(commands::current_session(&state).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_registration_reports_email_field() {
    let (_dir, _scheduler, state) = open_manual();
    let form = || Registration::new("Wendell", "wendell@example.com", "pasture-gate", "pasture-gate");

    let account = commands::register(&state, form()).await.unwrap();
    assert_eq!(account.display_name, "Wendell");
    let session = commands::current_session(&state).await.unwrap().unwrap();
    assert_eq!(session.email, "wendell@example.com");

    let err = commands::register(&state, form()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(err.fields.len(), 1);
    assert_eq!(err.fields[0].field, Field::Email);
    assert_eq!(commands::list_accounts(&state).await.unwrap().len(), 1);
}

#[tokio::test]
async fn logout_mid_scan_discards_everything() {
    let (_dir, scheduler, state) = open_manual();
    commands::login(&state, DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();
    commands::submit_scan(&state, leaf(), Category::Soil, None)
        .await
        .unwrap();
    scheduler.advance(Duration::from_millis(300));

    commands::logout(&state).await.unwrap();
    scheduler.run_until_idle(MAX_TASKS);

    assert_eq!(commands::scan_progress(&state).phase, ScanPhase::Idle);
    commands::login(&state, DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();
    assert!(commands::take_result(&state).await.unwrap().is_none());
}

#[tokio::test]
async fn capture_form_flow_and_preferences() {
    let (dir, scheduler, state) = open_manual();
    commands::login(&state, DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();

    let err = commands::submit_capture(&state).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::MissingFile);

    commands::select_category(&state, Category::Crop);
    commands::select_crop_kind(&state, CropKind::Potato);
    commands::choose_file(&state, ImageUpload::new("tuber.jpg", vec![9u8; 2048]));
    commands::submit_capture(&state).await.unwrap();

    // Changing the selection mid-scan does not leak into the result.
    commands::select_category(&state, Category::Soil);
    scheduler.run_until_idle(MAX_TASKS);

    let result = commands::take_result(&state).await.unwrap().unwrap();
    assert_eq!(result.category, Category::Crop);
    assert_eq!(result.crop_kind, Some(CropKind::Potato));
    assert_eq!(result.metric("Crop"), Some(&MetricValue::Text("Potato".into())));
    drop(state);

    let reopened = AppState::open_with(
        AppConfig::new(dir.path().join("data")),
        Arc::new(ManualScheduler::new()),
        Arc::new(LogEventSink),
    )
    .unwrap();
    let preferences = commands::get_preferences(&reopened);
    assert_eq!(preferences.category, Category::Crop);
    assert_eq!(preferences.crop_kind, CropKind::Potato);
    assert!(commands::current_session(&reopened).await.unwrap().is_some());
}

#[tokio::test]
async fn reset_scan_stops_the_clock() {
    let (_dir, scheduler, state) = open_manual();
    commands::login(&state, DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();
    commands::submit_scan(&state, leaf(), Category::Soil, None)
        .await
        .unwrap();

    let snapshot = commands::reset_scan(&state);
    assert_eq!(snapshot.phase, ScanPhase::Idle);
    assert_eq!(scheduler.pending(), 0);

    scheduler.advance(Duration::from_secs(60));
    assert!(commands::take_result(&state).await.unwrap().is_none());
}

#[tokio::test]
async fn tokio_runtime_completes_a_scan() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = AppConfig::new(dir.path().join("data"));
    config.timing = ScanTiming {
        tick_interval: Duration::from_millis(10),
        settle_delay: Duration::from_millis(50),
    };
    let state = AppState::open(config).unwrap();
    commands::login(&state, DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();

    tokio::time::pause();
    commands::submit_scan(&state, leaf(), Category::Soil, None)
        .await
        .unwrap();
    // Paused time auto-advances while this task sleeps.
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(commands::scan_progress(&state).phase, ScanPhase::Done);
    let result = commands::take_result(&state).await.unwrap().unwrap();
    assert_eq!(result.confidence, 95);
}
