use serde::Serialize;

/// A photo that passed client-side acceptance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserPhoto {
    pub file_name: String,
    pub mime: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// `data:` URI used for the local preview.
    pub preview: String,
}

impl UserPhoto {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubmissionDraft {
    pub dress_url: String,
    pub user_photo: Option<UserPhoto>,
}

impl SubmissionDraft {
    pub fn has_dress_url(&self) -> bool {
        !self.dress_url.trim().is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.has_dress_url() && self.user_photo.is_some()
    }

    pub fn clear(&mut self) {
        self.dress_url.clear();
        self.user_photo = None;
    }
}
