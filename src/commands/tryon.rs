use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::draft_types::{SubmissionDraft, UserPhoto};
use crate::models::tryon_types::{
    ProcessingProgress, ShareOutcome, SharePayload, TryOnJob, WorkflowStep,
};
use crate::services::api_client::TryOnBackend;
use crate::services::cancel::CancelHandle;
use crate::services::notifier::Notifier;
use crate::services::photo_service;
use crate::services::platform::Platform;
use crate::services::progress::ProgressTicker;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

const MSG_MISSING_INPUT: &str = "Please provide both dress URL and your photo";
const MSG_SUBMIT_OK: &str = "Virtual try-on completed!";
const MSG_SUBMIT_FAILED: &str = "Failed to create virtual try-on. Please try again.";
const MSG_CANCELLED: &str = "Virtual try-on cancelled";
const MSG_DOWNLOAD_OK: &str = "Image downloaded!";
const MSG_DOWNLOAD_FAILED: &str = "Failed to save image";
const MSG_SHARED: &str = "Shared successfully!";
const MSG_COPIED: &str = "Link copied to clipboard!";
const MSG_SHARE_FAILED: &str = "Failed to share";

const SHARE_TITLE: &str = "My Virtual Try-On";
const SHARE_TEXT: &str = "Check out how I look in this dress!";

#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    pub progress_tick: Duration,
    pub share_url: String,
}

impl WorkflowSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            progress_tick: config.progress_tick,
            share_url: config.share_url.clone(),
        }
    }
}

/// Upload → preview → result wizard for a single try-on.
pub struct TryOnWorkflow<B, N, P> {
    backend: B,
    notifier: N,
    platform: P,
    settings: WorkflowSettings,
    step: WorkflowStep,
    draft: SubmissionDraft,
    job: Option<TryOnJob>,
    is_processing: bool,
    progress: ProgressTicker,
    cancel: CancelHandle,
}

impl<B, N, P> TryOnWorkflow<B, N, P>
where
    B: TryOnBackend,
    N: Notifier,
    P: Platform,
{
    pub fn new(backend: B, notifier: N, platform: P, settings: WorkflowSettings) -> Self {
        Self {
            backend,
            notifier,
            platform,
            settings,
            step: WorkflowStep::Input,
            draft: SubmissionDraft::default(),
            job: None,
            is_processing: false,
            progress: ProgressTicker::new(),
            cancel: CancelHandle::new(),
        }
    }

    pub fn step(&self) -> WorkflowStep {
        self.step
    }

    pub fn draft(&self) -> &SubmissionDraft {
        &self.draft
    }

    pub fn job(&self) -> Option<&TryOnJob> {
        self.job.as_ref()
    }

    pub fn is_processing(&self) -> bool {
        self.is_processing
    }

    /// Cosmetic progress; see [`ProgressTicker`].
    pub fn progress(&self) -> ProcessingProgress {
        self.progress.current()
    }

    pub fn subscribe_progress(&self) -> watch::Receiver<ProcessingProgress> {
        self.progress.subscribe()
    }

    pub fn progress_running(&self) -> bool {
        self.progress.is_running()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn set_dress_url(&mut self, url: &str) -> Result<(), AppError> {
        self.ensure_editable()?;
        self.draft.dress_url = url.trim().to_string();
        Ok(())
    }

    /// Validates and attaches a photo. Rejected photos never replace the
    /// current one.
    pub fn attach_photo(&mut self, file_name: &str, bytes: Vec<u8>) -> Result<&UserPhoto, AppError> {
        self.ensure_editable()?;
        match photo_service::accept_photo(file_name.to_string(), bytes) {
            Ok(photo) => Ok(&*self.draft.user_photo.insert(photo)),
            Err(e) => {
                self.notifier.error(&e.message);
                Err(e)
            }
        }
    }

    pub async fn attach_photo_file(&mut self, path: &Path) -> Result<&UserPhoto, AppError> {
        self.ensure_editable()?;
        match photo_service::load_photo(path).await {
            Ok(photo) => Ok(&*self.draft.user_photo.insert(photo)),
            Err(e) => {
                self.notifier.error(&e.message);
                Err(e)
            }
        }
    }

    pub fn can_continue(&self) -> bool {
        self.step == WorkflowStep::Input && self.draft.is_complete()
    }

    /// Input → Preview. No network call.
    pub fn continue_to_preview(&mut self) -> Result<(), AppError> {
        if self.step != WorkflowStep::Input {
            return Err("Details can only be confirmed from the input step".into());
        }
        if !self.draft.is_complete() {
            self.notifier.error(MSG_MISSING_INPUT);
            return Err(MSG_MISSING_INPUT.into());
        }
        self.step = WorkflowStep::Preview;
        Ok(())
    }

    /// Preview → Input.
    pub fn edit_details(&mut self) -> Result<(), AppError> {
        if self.step != WorkflowStep::Preview {
            return Err("Nothing to edit outside the preview step".into());
        }
        self.step = WorkflowStep::Input;
        Ok(())
    }

    pub fn can_submit(&self) -> bool {
        self.step == WorkflowStep::Preview && !self.is_processing && self.draft.is_complete()
    }

    /// Creates the job, then fetches its images. On success the workflow
    /// moves to `Result`; on any failure it stays in `Preview`.
    pub async fn submit(&mut self) -> Result<&TryOnJob, AppError> {
        if self.step != WorkflowStep::Preview {
            return Err("A try-on can only be submitted from the preview step".into());
        }
        if self.is_processing {
            return Err("A try-on is already being created".into());
        }
        let photo = match (&self.draft.user_photo, self.draft.has_dress_url()) {
            (Some(photo), true) => photo,
            _ => {
                self.notifier.error(MSG_MISSING_INPUT);
                return Err(MSG_MISSING_INPUT.into());
            }
        };

        self.is_processing = true;
        self.cancel.reset();
        self.progress.start(self.settings.progress_tick);

        let cancel = self.cancel.clone();
        let outcome = tokio::select! {
            result = create_job(&self.backend, &self.draft.dress_url, photo) => result,
            _ = cancel.cancelled() => Err(AppError::cancelled(MSG_CANCELLED)),
        };

        self.progress.stop();
        self.is_processing = false;

        match outcome {
            Ok(job) => {
                info!(job_id = %job.id(), "try-on completed");
                self.step = WorkflowStep::Result;
                self.notifier.success(MSG_SUBMIT_OK);
                Ok(&*self.job.insert(job))
            }
            Err(e) if e.is_cancelled() => {
                info!("try-on submission cancelled");
                self.notifier.info(MSG_CANCELLED);
                Err(e)
            }
            Err(e) => {
                error!(error = %e, "error creating try-on");
                self.notifier.error(MSG_SUBMIT_FAILED);
                Err(e)
            }
        }
    }

    /// Saves the generated image as `virtual-tryon-{id}.{ext}`.
    pub async fn download(&self) -> Result<PathBuf, AppError> {
        let job = self.result_job()?;
        let file_name = format!(
            "virtual-tryon-{}.{}",
            photo_service::sanitize_file_stem(job.id()),
            job.images.generated.extension()
        );

        match self.platform.save_file(&file_name, &job.images.generated.bytes).await {
            Ok(path) => {
                self.notifier.success(MSG_DOWNLOAD_OK);
                Ok(path)
            }
            Err(e) => {
                warn!(error = %e, file = %file_name, "download failed");
                self.notifier.error(MSG_DOWNLOAD_FAILED);
                Err(e)
            }
        }
    }

    /// Native share when available, clipboard otherwise. Only a failed
    /// clipboard write is reported as a failure.
    pub async fn share(&self) -> Result<ShareOutcome, AppError> {
        self.result_job()?;
        let payload = SharePayload {
            title: SHARE_TITLE.to_string(),
            text: SHARE_TEXT.to_string(),
            url: self.settings.share_url.clone(),
        };

        if self.platform.supports_native_share() {
            match self.platform.share_native(&payload).await {
                Ok(()) => {
                    self.notifier.success(MSG_SHARED);
                    return Ok(ShareOutcome::Shared);
                }
                Err(e) => warn!(error = %e, "native share failed, falling back to clipboard"),
            }
        }

        match self.platform.copy_to_clipboard(&payload.url) {
            Ok(()) => {
                self.notifier.success(MSG_COPIED);
                Ok(ShareOutcome::CopiedToClipboard)
            }
            Err(e) => {
                error!(error = %e, "error sharing");
                self.notifier.error(MSG_SHARE_FAILED);
                Err(e)
            }
        }
    }

    /// Back to an empty `Input` step. Trips the cancel handle so hosts
    /// sharing it abandon any in-flight submission.
    pub fn reset(&mut self) {
        self.cancel.cancel();
        self.progress.stop();
        self.step = WorkflowStep::Input;
        self.draft.clear();
        self.job = None;
        self.is_processing = false;
    }

    /// The draft stays editable until a job is displayed; a shown result
    /// always matches the draft it was created from.
    fn ensure_editable(&self) -> Result<(), AppError> {
        if self.step == WorkflowStep::Result || self.is_processing {
            return Err("Start a new try-on to change the dress or photo".into());
        }
        Ok(())
    }

    fn result_job(&self) -> Result<&TryOnJob, AppError> {
        match (&self.step, &self.job) {
            (WorkflowStep::Result, Some(job)) => Ok(job),
            _ => Err("No try-on result available".into()),
        }
    }
}

/// Submit, then fetch images for the returned id. Strictly sequential.
async fn create_job<B: TryOnBackend>(
    backend: &B,
    dress_url: &str,
    photo: &UserPhoto,
) -> Result<TryOnJob, AppError> {
    let descriptor = backend.submit_job(dress_url, photo).await?;
    info!(job_id = %descriptor.id, "try-on job accepted");

    let payload = backend.fetch_images(&descriptor.id).await?;
    let images = photo_service::decode_payload(&payload)?;
    Ok(TryOnJob { descriptor, images })
}
