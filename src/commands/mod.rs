pub mod gallery;
pub mod tryon;
