pub mod generator;
pub mod models;
pub mod seed;
pub mod snapshot;

pub use generator::{generate, AnalysisInput, CROP_METRIC_LABELS, SOIL_METRIC_LABELS};
pub use models::{
    AnalysisRequest, AnalysisResult, AnalysisStatus, Category, CropKind, ImageUpload, Metric,
    MetricValue,
};
pub use seed::{scan_seed, seed_for_upload, seeded_value};
pub use snapshot::{build_snapshot, encode_snapshot, SnapshotError};
