use serde::{Deserialize, Serialize};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Body of `POST /api/feedback`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub tryon_id: String,
    pub rating: u8,
    pub comment: String,
}

/// Stored feedback as listed by `GET /api/feedback/{tryon_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: String,
    pub tryon_id: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub timestamp: String,
}

/// Star rating form. A rating of 0 means nothing has been selected yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeedbackForm {
    pub rating: u8,
    pub comment: String,
}

impl FeedbackForm {
    pub fn has_rating(&self) -> bool {
        (MIN_RATING..=MAX_RATING).contains(&self.rating)
    }

    pub fn to_request(&self, tryon_id: &str) -> FeedbackRequest {
        FeedbackRequest {
            tryon_id: tryon_id.to_string(),
            rating: self.rating,
            comment: self.comment.clone(),
        }
    }
}
