use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::draft_types::UserPhoto;
use crate::models::feedback_types::{FeedbackRecord, FeedbackRequest};
use crate::models::tryon_types::{ImagePayload, JobDescriptor};
use reqwest::multipart::{Form, Part};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use std::future::Future;
use tracing::debug;

/// The REST surface of the try-on backend.
pub trait TryOnBackend {
    /// `POST /api/tryon` as multipart (`dress_url`, `user_image`).
    fn submit_job(
        &self,
        dress_url: &str,
        photo: &UserPhoto,
    ) -> impl Future<Output = Result<JobDescriptor, AppError>> + Send;

    /// `GET /api/tryon/{id}/base64`
    fn fetch_images(
        &self,
        job_id: &str,
    ) -> impl Future<Output = Result<ImagePayload, AppError>> + Send;

    /// `GET /api/tryons`
    fn list_jobs(&self) -> impl Future<Output = Result<Vec<JobDescriptor>, AppError>> + Send;

    /// `POST /api/feedback`
    fn submit_feedback(
        &self,
        feedback: &FeedbackRequest,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// `GET /api/feedback/{tryon_id}`
    fn list_feedback(
        &self,
        tryon_id: &str,
    ) -> impl Future<Output = Result<Vec<FeedbackRecord>, AppError>> + Send;
}

#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    api_base: Url,
}

impl HttpBackend {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {}", e)))?;

        let api_base = Url::parse(&config.api_base())
            .map_err(|e| AppError::config(format!("Invalid backend URL: {}", e)))?;

        Ok(Self { client, api_base })
    }

    /// Appends percent-encoded path segments, so ids containing `/` or `?`
    /// stay inside their segment.
    fn url(&self, segments: &[&str]) -> Result<Url, AppError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::config(format!("Backend URL cannot take a path: {}", self.api_base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

impl TryOnBackend for HttpBackend {
    async fn submit_job(&self, dress_url: &str, photo: &UserPhoto) -> Result<JobDescriptor, AppError> {
        let part = Part::bytes(photo.bytes.clone())
            .file_name(photo.file_name.clone())
            .mime_str(&photo.mime)?;
        let form = Form::new()
            .text("dress_url", dress_url.to_string())
            .part("user_image", part);

        debug!(size = photo.size(), "submitting try-on job");
        let response = self.client.post(self.url(&["tryon"])?).multipart(form).send().await?;
        read_json(response).await
    }

    async fn fetch_images(&self, job_id: &str) -> Result<ImagePayload, AppError> {
        let response = self
            .client
            .get(self.url(&["tryon", job_id, "base64"])?)
            .send()
            .await?;
        read_json(response).await
    }

    async fn list_jobs(&self) -> Result<Vec<JobDescriptor>, AppError> {
        let response = self.client.get(self.url(&["tryons"])?).send().await?;
        read_json(response).await
    }

    async fn submit_feedback(&self, feedback: &FeedbackRequest) -> Result<(), AppError> {
        let response = self
            .client
            .post(self.url(&["feedback"])?)
            .json(feedback)
            .send()
            .await?;
        ensure_success(&response)?;
        Ok(())
    }

    async fn list_feedback(&self, tryon_id: &str) -> Result<Vec<FeedbackRecord>, AppError> {
        let response = self
            .client
            .get(self.url(&["feedback", tryon_id])?)
            .send()
            .await?;
        read_json(response).await
    }
}

fn ensure_success(response: &Response) -> Result<(), AppError> {
    let status = response.status();
    if !status.is_success() {
        return Err(AppError::transport(format!(
            "HTTP error {} from {}",
            status,
            response.url()
        )));
    }
    Ok(())
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    ensure_success(&response)?;
    response
        .json::<T>()
        .await
        .map_err(|e| AppError::transport(format!("Failed to parse response: {}", e)))
}
