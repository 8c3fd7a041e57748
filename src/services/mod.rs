pub mod api_client;
pub mod cancel;
pub mod gallery_loader;
pub mod notifier;
pub mod photo_service;
pub mod platform;
pub mod progress;
