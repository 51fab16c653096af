//! Analysis request/result data models.
//!
//! Everything here is serialized camelCase because the results surface renders
//! it directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    #[default]
    Soil,
    Crop,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Soil => "soil",
            Category::Crop => "crop",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CropKind {
    #[default]
    Wheat,
    Rice,
    Maize,
    Tomato,
    Potato,
    Cotton,
}

impl CropKind {
    /// Capitalized label shown in metrics and notes.
    pub fn label(&self) -> &'static str {
        match self {
            CropKind::Wheat => "Wheat",
            CropKind::Rice => "Rice",
            CropKind::Maize => "Maize",
            CropKind::Tomato => "Tomato",
            CropKind::Potato => "Potato",
            CropKind::Cotton => "Cotton",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AnalysisStatus {
    Good,
    Bad,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStatus::Good => "Good",
            AnalysisStatus::Bad => "Bad",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl MetricValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            MetricValue::Number(value) => Some(*value),
            MetricValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetricValue::Number(_) => None,
            MetricValue::Text(value) => Some(value),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Metric {
    pub label: String,
    pub value: MetricValue,
}

impl Metric {
    pub fn number(label: &str, value: f64) -> Self {
        Self {
            label: label.to_string(),
            value: MetricValue::Number(value),
        }
    }

    pub fn text(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: MetricValue::Text(value.into()),
        }
    }
}

/// A file picked on the capture surface.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    pub fn byte_size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub category: Category,
    pub crop_kind: Option<CropKind>,
    pub image: ImageUpload,
}

impl AnalysisRequest {
    pub fn soil(image: ImageUpload) -> Self {
        Self {
            category: Category::Soil,
            crop_kind: None,
            image,
        }
    }

    pub fn crop(image: ImageUpload, crop_kind: CropKind) -> Self {
        Self {
            category: Category::Crop,
            crop_kind: Some(crop_kind),
            image,
        }
    }

    /// Crop kind that applies to this request; soil requests have none and
    /// crop requests fall back to the default kind.
    pub fn effective_crop_kind(&self) -> Option<CropKind> {
        match self.category {
            Category::Soil => None,
            Category::Crop => Some(self.crop_kind.unwrap_or_default()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub status: AnalysisStatus,
    pub confidence: u8,
    pub notes: String,
    pub metrics: Vec<Metric>,
    pub category: Category,
    pub crop_kind: Option<CropKind>,
    pub image_snapshot: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn metric(&self, label: &str) -> Option<&MetricValue> {
        self.metrics
            .iter()
            .find(|metric| metric.label == label)
            .map(|metric| &metric.value)
    }
}
