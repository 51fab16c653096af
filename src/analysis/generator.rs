use chrono::Utc;

use super::{
    models::{AnalysisResult, AnalysisStatus, Category, CropKind, Metric},
    seed::{seeded_value, seeded_whole},
};

pub const SOIL_METRIC_LABELS: [&str; 5] = ["pH", "Moisture %", "Nitrogen", "Phosphorus", "Potassium"];
pub const CROP_METRIC_LABELS: [&str; 4] = ["Health Index", "Disease Risk", "Moisture %", "Crop"];

const MIN_CONFIDENCE: f64 = 62.0;
const MAX_CONFIDENCE: f64 = 99.0;

const SOIL_NOTES_GOOD: &str =
    "Soil looks well balanced. Keep the current irrigation and fertilization schedule.";
const SOIL_NOTES_BAD: &str =
    "Soil shows signs of nutrient imbalance. Consider amending the soil and re-testing in two weeks.";

/// Everything the scan captured at submission time. The result is computed from
/// this snapshot, never from the live form.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisInput {
    pub seed: u64,
    pub category: Category,
    pub crop_kind: Option<CropKind>,
}

pub fn status_for_seed(seed: u64) -> AnalysisStatus {
    if seed % 2 == 0 {
        AnalysisStatus::Good
    } else {
        AnalysisStatus::Bad
    }
}

pub fn confidence_for_seed(seed: u64) -> u8 {
    seeded_whole(seed, 68.0, 95.0).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE) as u8
}

pub fn generate(input: &AnalysisInput, image_snapshot: Option<String>) -> AnalysisResult {
    let status = status_for_seed(input.seed);
    let confidence = confidence_for_seed(input.seed);

    let (metrics, notes, crop_kind) = match input.category {
        Category::Soil => (soil_metrics(input.seed), soil_notes(status).to_string(), None),
        Category::Crop => {
            let crop = input.crop_kind.unwrap_or_default();
            (crop_metrics(input.seed, status, crop), crop_notes(status, crop), Some(crop))
        }
    };

    AnalysisResult {
        status,
        confidence,
        notes,
        metrics,
        category: input.category,
        crop_kind,
        image_snapshot,
        created_at: Utc::now(),
    }
}

fn soil_metrics(seed: u64) -> Vec<Metric> {
    let [ph, moisture, nitrogen, phosphorus, potassium] = SOIL_METRIC_LABELS;
    vec![
        Metric::number(ph, seeded_value(seed, 5.5, 7.8)),
        Metric::number(moisture, seeded_value(seed, 18.0, 62.0)),
        Metric::number(nitrogen, seeded_whole(seed, 15.0, 80.0)),
        Metric::number(phosphorus, seeded_whole(seed, 10.0, 60.0)),
        Metric::number(potassium, seeded_whole(seed, 20.0, 90.0)),
    ]
}

fn crop_metrics(seed: u64, status: AnalysisStatus, crop: CropKind) -> Vec<Metric> {
    let [health, risk, moisture, crop_label] = CROP_METRIC_LABELS;
    let health_index = seeded_value(seed, 35.0, 95.0);
    vec![
        Metric::number(health, health_index),
        Metric::text(risk, disease_risk(status, health_index)),
        Metric::number(moisture, seeded_value(seed, 30.0, 70.0)),
        Metric::text(crop_label, crop.label()),
    ]
}

pub fn disease_risk(status: AnalysisStatus, health_index: f64) -> &'static str {
    match status {
        AnalysisStatus::Good if health_index > 80.0 => "Low",
        AnalysisStatus::Good => "Moderate",
        AnalysisStatus::Bad if health_index < 55.0 => "High",
        AnalysisStatus::Bad => "Moderate",
    }
}

fn soil_notes(status: AnalysisStatus) -> &'static str {
    match status {
        AnalysisStatus::Good => SOIL_NOTES_GOOD,
        AnalysisStatus::Bad => SOIL_NOTES_BAD,
    }
}

fn crop_notes(status: AnalysisStatus, crop: CropKind) -> String {
    let label = crop.label();
    match status {
        AnalysisStatus::Good => {
            format!("{label} plants look healthy with no visible signs of stress or disease.")
        }
        AnalysisStatus::Bad => format!(
            "{label} plants show signs of stress. Inspect the leaves for spots or discoloration and consider treatment."
        ),
    }
}
