use crate::error::AppError;
use crate::models::feedback_types::{FeedbackForm, FeedbackRecord, MAX_RATING, MIN_RATING};
use crate::models::tryon_types::GalleryEntry;
use crate::services::api_client::TryOnBackend;
use crate::services::gallery_loader;
use crate::services::notifier::Notifier;
use tracing::{error, info};

const MSG_LOAD_FAILED: &str = "Failed to load gallery";
const MSG_NEED_RATING: &str = "Please select a rating";
const MSG_FEEDBACK_OK: &str = "Thank you for your feedback!";
const MSG_FEEDBACK_FAILED: &str = "Failed to submit feedback";

/// Past results plus the detail view's star-rating form.
pub struct Gallery<B, N> {
    backend: B,
    notifier: N,
    entries: Vec<GalleryEntry>,
    loading: bool,
    selected: Option<String>,
    feedback: FeedbackForm,
}

impl<B, N> Gallery<B, N>
where
    B: TryOnBackend,
    N: Notifier,
{
    pub fn new(backend: B, notifier: N) -> Self {
        Self {
            backend,
            notifier,
            entries: Vec::new(),
            loading: false,
            selected: None,
            feedback: FeedbackForm::default(),
        }
    }

    pub fn entries(&self) -> &[GalleryEntry] {
        &self.entries
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn feedback(&self) -> &FeedbackForm {
        &self.feedback
    }

    pub async fn load(&mut self) -> Result<&[GalleryEntry], AppError> {
        self.loading = true;
        let result = gallery_loader::load_entries(&self.backend).await;
        self.loading = false;

        match result {
            Ok(entries) => {
                info!(count = entries.len(), "gallery loaded");
                self.entries = entries;
                Ok(self.entries.as_slice())
            }
            Err(e) => {
                error!(error = %e, "error fetching try-ons");
                self.entries.clear();
                self.notifier.error(MSG_LOAD_FAILED);
                Err(e)
            }
        }
    }

    pub fn select(&mut self, id: &str) -> Result<&GalleryEntry, AppError> {
        if !self.entries.iter().any(|e| e.id() == id) {
            return Err(format!("Unknown try-on: {}", id).into());
        }
        self.selected = Some(id.to_string());
        self.selected()
            .ok_or_else(|| AppError::validation(format!("Unknown try-on: {}", id)))
    }

    pub fn selected(&self) -> Option<&GalleryEntry> {
        let id = self.selected.as_deref()?;
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn close_details(&mut self) {
        self.selected = None;
    }

    pub fn set_rating(&mut self, rating: u8) -> Result<(), AppError> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(format!("Rating must be between {} and {}", MIN_RATING, MAX_RATING).into());
        }
        self.feedback.rating = rating;
        Ok(())
    }

    pub fn set_comment(&mut self, comment: &str) {
        self.feedback.comment = comment.to_string();
    }

    /// Posts the form for the selected entry. Without a rating nothing is
    /// sent.
    pub async fn submit_feedback(&mut self) -> Result<(), AppError> {
        let tryon_id = self
            .selected
            .clone()
            .ok_or_else(|| AppError::validation("No try-on selected"))?;

        if !self.feedback.has_rating() {
            self.notifier.error(MSG_NEED_RATING);
            return Err(MSG_NEED_RATING.into());
        }

        let request = self.feedback.to_request(&tryon_id);
        match self.backend.submit_feedback(&request).await {
            Ok(()) => {
                info!(tryon_id = %tryon_id, rating = request.rating, "feedback submitted");
                self.notifier.success(MSG_FEEDBACK_OK);
                self.feedback = FeedbackForm::default();
                self.selected = None;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "error submitting feedback");
                self.notifier.error(MSG_FEEDBACK_FAILED);
                Err(e)
            }
        }
    }

    pub async fn load_feedback(&self, tryon_id: &str) -> Result<Vec<FeedbackRecord>, AppError> {
        self.backend.list_feedback(tryon_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::services::notifier::NotificationLevel;
    use crate::testing::{FakeBackend, RecordingNotifier};

    fn gallery() -> (Gallery<FakeBackend, RecordingNotifier>, FakeBackend, RecordingNotifier) {
        let backend = FakeBackend::new();
        let notifier = RecordingNotifier::new();
        (Gallery::new(backend.clone(), notifier.clone()), backend, notifier)
    }

    #[tokio::test]
    async fn partial_enrichment_failure_keeps_all_entries() {
        let (mut gallery, backend, notifier) = gallery();
        for id in ["one", "two", "three"] {
            backend.add_job(id);
        }
        backend.fail_images_for("two");

        let entries = gallery.load().await.unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].has_images());
        assert!(entries[1].images.is_none());
        assert!(entries[2].has_images());
        assert!(notifier.all().is_empty());
        assert!(!gallery.is_loading());
    }

    #[tokio::test]
    async fn list_failure_notifies() {
        let (mut gallery, backend, notifier) = gallery();
        backend.fail_list();

        assert!(gallery.load().await.is_err());
        assert!(gallery.entries().is_empty());
        assert_eq!(notifier.errors(), vec![MSG_LOAD_FAILED]);
    }

    #[tokio::test]
    async fn zero_rating_never_posts() {
        let (mut gallery, backend, notifier) = gallery();
        backend.add_job("one");
        gallery.load().await.unwrap();
        gallery.select("one").unwrap();
        gallery.set_comment("lovely");

        let err = gallery.submit_feedback().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(backend.feedback_posts().is_empty());
        assert_eq!(notifier.errors(), vec![MSG_NEED_RATING]);
    }

    #[tokio::test]
    async fn valid_rating_posts_once_with_job_id() {
        for rating in MIN_RATING..=MAX_RATING {
            let (mut gallery, backend, notifier) = gallery();
            backend.add_job("one");
            backend.add_job("two");
            gallery.load().await.unwrap();
            gallery.select("two").unwrap();
            gallery.set_rating(rating).unwrap();

            gallery.submit_feedback().await.unwrap();

            let posts = backend.feedback_posts();
            assert_eq!(posts.len(), 1);
            assert_eq!(posts[0].tryon_id, "two");
            assert_eq!(posts[0].rating, rating);
            assert_eq!(posts[0].comment, "");
            assert_eq!(notifier.messages(NotificationLevel::Success), vec![MSG_FEEDBACK_OK]);
            assert_eq!(gallery.feedback(), &FeedbackForm::default());
            assert!(gallery.selected().is_none());
        }
    }

    #[tokio::test]
    async fn failed_feedback_keeps_form() {
        let (mut gallery, backend, notifier) = gallery();
        backend.add_job("one");
        backend.fail_feedback();
        gallery.load().await.unwrap();
        gallery.select("one").unwrap();
        gallery.set_rating(4).unwrap();
        gallery.set_comment("nice fit");

        assert!(gallery.submit_feedback().await.is_err());
        assert_eq!(backend.feedback_posts().len(), 1);
        assert_eq!(gallery.feedback().rating, 4);
        assert_eq!(gallery.selected().map(|e| e.id()), Some("one"));
        assert_eq!(notifier.errors(), vec![MSG_FEEDBACK_FAILED]);
    }

    #[test]
    fn rating_out_of_range_is_rejected() {
        let (mut gallery, _, _) = gallery();
        assert!(gallery.set_rating(0).is_err());
        assert!(gallery.set_rating(6).is_err());
        assert_eq!(gallery.feedback().rating, 0);
    }

    #[tokio::test]
    async fn select_unknown_entry_fails() {
        let (mut gallery, _, _) = gallery();
        assert!(gallery.select("missing").is_err());
    }

    #[tokio::test]
    async fn load_feedback_filters_by_tryon() {
        let (gallery, backend, _) = gallery();
        backend.add_feedback(FeedbackRecord {
            id: "f1".to_string(),
            tryon_id: "one".to_string(),
            rating: 5,
            comment: Some("great".to_string()),
            timestamp: "2025-01-05T14:30:00".to_string(),
        });
        backend.add_feedback(FeedbackRecord {
            id: "f2".to_string(),
            tryon_id: "two".to_string(),
            rating: 2,
            comment: None,
            timestamp: String::new(),
        });

        let records = gallery.load_feedback("one").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "f1");
    }
}
