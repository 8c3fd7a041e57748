pub mod draft_types;
pub mod feedback_types;
pub mod tryon_types;
