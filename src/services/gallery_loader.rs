use crate::error::AppError;
use crate::models::tryon_types::{GalleryEntry, JobDescriptor};
use crate::services::api_client::TryOnBackend;
use crate::services::photo_service;
use futures::future::join_all;
use tracing::{debug, warn};

/// Lists past jobs and fetches images for each one concurrently. A failed
/// image fetch leaves that entry without images; only a failed list fetch
/// fails the whole load.
pub async fn load_entries<B: TryOnBackend>(backend: &B) -> Result<Vec<GalleryEntry>, AppError> {
    let jobs = backend.list_jobs().await?;
    debug!(count = jobs.len(), "listed try-ons");

    let entries = join_all(jobs.into_iter().map(|job| enrich(backend, job))).await;
    Ok(entries)
}

async fn enrich<B: TryOnBackend>(backend: &B, descriptor: JobDescriptor) -> GalleryEntry {
    let images = match backend.fetch_images(&descriptor.id).await {
        Ok(payload) => match photo_service::decode_payload(&payload) {
            Ok(images) => Some(images),
            Err(e) => {
                warn!(job_id = %descriptor.id, error = %e, "undecodable try-on images");
                None
            }
        },
        Err(e) => {
            warn!(job_id = %descriptor.id, error = %e, "failed to fetch try-on images");
            None
        }
    };

    GalleryEntry { descriptor, images }
}
