//! In-memory doubles for the backend, notifier and platform seams.

use crate::error::AppError;
use crate::models::draft_types::UserPhoto;
use crate::models::feedback_types::{FeedbackRecord, FeedbackRequest};
use crate::models::tryon_types::{ImagePayload, JobDescriptor, JobStatus, SharePayload};
use crate::services::api_client::TryOnBackend;
use crate::services::notifier::{Notification, NotificationLevel, Notifier};
use crate::services::photo_service;
use crate::services::platform::Platform;
use base64::Engine;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Submit { dress_url: String, file_name: String },
    FetchImages(String),
    ListJobs,
    Feedback(FeedbackRequest),
    ListFeedback(String),
}

#[derive(Default)]
struct BackendState {
    calls: Vec<Call>,
    jobs: Vec<JobDescriptor>,
    next_job_id: Option<String>,
    submit_status: Option<u16>,
    submit_delay: Option<Duration>,
    failing_images: HashSet<String>,
    fail_list: bool,
    fail_feedback: bool,
    feedback: Vec<FeedbackRecord>,
}

#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<BackendState>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut BackendState) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub fn add_job(&self, id: &str) {
        self.with(|s| s.jobs.push(descriptor(id)));
    }

    pub fn set_next_job_id(&self, id: &str) {
        self.with(|s| s.next_job_id = Some(id.to_string()));
    }

    pub fn fail_submit(&self, status: u16) {
        self.with(|s| s.submit_status = Some(status));
    }

    pub fn delay_submit(&self, delay: Duration) {
        self.with(|s| s.submit_delay = Some(delay));
    }

    pub fn fail_images_for(&self, id: &str) {
        self.with(|s| {
            s.failing_images.insert(id.to_string());
        });
    }

    pub fn fail_list(&self) {
        self.with(|s| s.fail_list = true);
    }

    pub fn fail_feedback(&self) {
        self.with(|s| s.fail_feedback = true);
    }

    pub fn add_feedback(&self, record: FeedbackRecord) {
        self.with(|s| s.feedback.push(record));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.with(|s| s.calls.clone())
    }

    pub fn image_fetches(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::FetchImages(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn feedback_posts(&self) -> Vec<FeedbackRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Feedback(req) => Some(req),
                _ => None,
            })
            .collect()
    }
}

fn descriptor(id: &str) -> JobDescriptor {
    JobDescriptor {
        id: id.to_string(),
        status: JobStatus::Complete,
        timestamp: "2025-01-05T14:30:00".to_string(),
        dress_url: format!("https://shop.example/{id}.jpg"),
    }
}

fn http_error(status: u16) -> AppError {
    AppError::transport(format!("HTTP error {} from fake backend", status))
}

impl TryOnBackend for FakeBackend {
    async fn submit_job(&self, dress_url: &str, photo: &UserPhoto) -> Result<JobDescriptor, AppError> {
        let (status, delay, id) = self.with(|s| {
            s.calls.push(Call::Submit {
                dress_url: dress_url.to_string(),
                file_name: photo.file_name.clone(),
            });
            (
                s.submit_status,
                s.submit_delay,
                s.next_job_id.clone().unwrap_or_else(|| "job-new".to_string()),
            )
        });

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(status) = status {
            return Err(http_error(status));
        }

        let mut job = descriptor(&id);
        job.dress_url = dress_url.to_string();
        self.with(|s| s.jobs.push(job.clone()));
        Ok(job)
    }

    async fn fetch_images(&self, job_id: &str) -> Result<ImagePayload, AppError> {
        let failing = self.with(|s| {
            s.calls.push(Call::FetchImages(job_id.to_string()));
            s.failing_images.contains(job_id)
        });
        if failing {
            return Err(http_error(500));
        }

        let b64 = base64::engine::general_purpose::STANDARD.encode(photo_service::tiny_png());
        Ok(ImagePayload {
            generated_image_data: b64.clone(),
            original_image_data: b64,
        })
    }

    async fn list_jobs(&self) -> Result<Vec<JobDescriptor>, AppError> {
        self.with(|s| {
            s.calls.push(Call::ListJobs);
            if s.fail_list {
                Err(http_error(500))
            } else {
                Ok(s.jobs.clone())
            }
        })
    }

    async fn submit_feedback(&self, feedback: &FeedbackRequest) -> Result<(), AppError> {
        self.with(|s| {
            s.calls.push(Call::Feedback(feedback.clone()));
            if s.fail_feedback {
                Err(http_error(500))
            } else {
                Ok(())
            }
        })
    }

    async fn list_feedback(&self, tryon_id: &str) -> Result<Vec<FeedbackRecord>, AppError> {
        self.with(|s| {
            s.calls.push(Call::ListFeedback(tryon_id.to_string()));
            Ok(s.feedback
                .iter()
                .filter(|f| f.tryon_id == tryon_id)
                .cloned()
                .collect())
        })
    }
}

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    log: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Notification> {
        self.log.lock().unwrap().clone()
    }

    pub fn messages(&self, level: NotificationLevel) -> Vec<String> {
        self.all()
            .into_iter()
            .filter(|n| n.level == level)
            .map(|n| n.message)
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages(NotificationLevel::Error)
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.log.lock().unwrap().push(notification);
    }
}

#[derive(Default)]
struct PlatformState {
    native_share: bool,
    share_fails: bool,
    clipboard_fails: bool,
    save_fails: bool,
    saved: Vec<(String, Vec<u8>)>,
    shared: Vec<SharePayload>,
    clipboard: Vec<String>,
}

#[derive(Clone, Default)]
pub struct FakePlatform {
    state: Arc<Mutex<PlatformState>>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_native_share(self, fails: bool) -> Self {
        {
            let mut s = self.state.lock().unwrap();
            s.native_share = true;
            s.share_fails = fails;
        }
        self
    }

    pub fn failing_clipboard(self) -> Self {
        self.state.lock().unwrap().clipboard_fails = true;
        self
    }

    pub fn failing_save(self) -> Self {
        self.state.lock().unwrap().save_fails = true;
        self
    }

    pub fn saved(&self) -> Vec<(String, Vec<u8>)> {
        self.state.lock().unwrap().saved.clone()
    }

    pub fn shared(&self) -> Vec<SharePayload> {
        self.state.lock().unwrap().shared.clone()
    }

    pub fn clipboard(&self) -> Vec<String> {
        self.state.lock().unwrap().clipboard.clone()
    }
}

impl Platform for FakePlatform {
    async fn save_file(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, AppError> {
        let mut s = self.state.lock().unwrap();
        if s.save_fails {
            return Err(AppError::platform("Permission denied"));
        }
        s.saved.push((file_name.to_string(), bytes.to_vec()));
        Ok(PathBuf::from("/downloads").join(file_name))
    }

    fn supports_native_share(&self) -> bool {
        self.state.lock().unwrap().native_share
    }

    async fn share_native(&self, payload: &SharePayload) -> Result<(), AppError> {
        let mut s = self.state.lock().unwrap();
        if s.share_fails {
            return Err(AppError::platform("Share sheet failed"));
        }
        s.shared.push(payload.clone());
        Ok(())
    }

    fn copy_to_clipboard(&self, text: &str) -> Result<(), AppError> {
        let mut s = self.state.lock().unwrap();
        if s.clipboard_fails {
            return Err(AppError::platform("Clipboard unavailable"));
        }
        s.clipboard.push(text.to_string());
        Ok(())
    }
}
