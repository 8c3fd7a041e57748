use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    #[serde(alias = "processing")]
    Pending,
    #[serde(alias = "completed")]
    Complete,
    Failed,
}

/// Job record as returned by `POST /api/tryon` and `GET /api/tryons`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescriptor {
    pub id: String,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub dress_url: String,
}

impl JobDescriptor {
    /// Backend timestamps are either RFC 3339 or naive ISO-8601 in UTC.
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }
}

/// Body of `GET /api/tryon/{id}/base64`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagePayload {
    pub generated_image_data: String,
    pub original_image_data: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageData {
    pub fn to_data_uri(&self) -> String {
        crate::services::photo_service::to_data_uri(&self.mime, &self.bytes)
    }

    pub fn extension(&self) -> &'static str {
        match self.mime.as_str() {
            "image/jpeg" => "jpg",
            "image/webp" => "webp",
            _ => "png",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobImages {
    pub original: ImageData,
    pub generated: ImageData,
}

/// A finished job with its images, treated as read-only display data.
#[derive(Debug, Clone, PartialEq)]
pub struct TryOnJob {
    pub descriptor: JobDescriptor,
    pub images: JobImages,
}

impl TryOnJob {
    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    pub fn generated_data_uri(&self) -> String {
        self.images.generated.to_data_uri()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryEntry {
    pub descriptor: JobDescriptor,
    /// `None` when the per-item image fetch failed.
    pub images: Option<JobImages>,
}

impl GalleryEntry {
    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    pub fn has_images(&self) -> bool {
        self.images.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WorkflowStep {
    Input = 1,
    Preview = 2,
    Result = 3,
}

/// Cosmetic progress shown while a job is being created. Not derived from
/// backend state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ProcessingProgress {
    pub step_label: String,
    pub percent: u8,
}

impl ProcessingProgress {
    pub fn new(step_label: &str, percent: u8) -> Self {
        Self {
            step_label: step_label.to_string(),
            percent: percent.min(100),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.percent == 0 && self.step_label.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ShareOutcome {
    Shared,
    CopiedToClipboard,
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Renders a backend timestamp for listings, e.g. `Jan 5, 2025, 02:30 PM`.
pub fn format_timestamp(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(dt) => dt.format("%b %-d, %Y, %I:%M %p").to_string(),
        None => raw.to_string(),
    }
}
