use crate::error::AppError;
use crate::models::draft_types::UserPhoto;
use crate::models::tryon_types::{ImageData, ImagePayload, JobImages};
use base64::Engine;
use image::{ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;

pub const MAX_PHOTO_BYTES: u64 = 10 * 1024 * 1024;

const ACCEPTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

pub fn has_accepted_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ACCEPTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn size_error() -> AppError {
    AppError::validation("File size must be less than 10MB")
}

/// Reads a photo from disk. The size cap is checked against file metadata
/// before anything is read.
pub async fn load_photo(path: &Path) -> Result<UserPhoto, AppError> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| AppError::validation(format!("Cannot read photo {}: {}", path.display(), e)))?;

    if !metadata.is_file() {
        return Err(format!("Not a file: {}", path.display()).into());
    }
    if metadata.len() > MAX_PHOTO_BYTES {
        return Err(size_error());
    }

    let file_name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let bytes = tokio::fs::read(path).await?;
    accept_photo(file_name, bytes)
}

/// Validates an in-memory photo: size cap, extension, sniffed format
/// (JPEG, PNG or WebP) and a readable header.
pub fn accept_photo(file_name: String, bytes: Vec<u8>) -> Result<UserPhoto, AppError> {
    if bytes.len() as u64 > MAX_PHOTO_BYTES {
        return Err(size_error());
    }
    if bytes.is_empty() {
        return Err("Photo is empty".into());
    }
    if !has_accepted_extension(&file_name) {
        return Err("Photo must be a JPG, PNG or WebP image".into());
    }

    let format = match image::guess_format(&bytes) {
        Ok(f @ (ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP)) => f,
        _ => return Err("Photo must be a JPG, PNG or WebP image".into()),
    };

    let (width, height) = ImageReader::with_format(Cursor::new(&bytes), format)
        .into_dimensions()
        .map_err(|e| AppError::validation(format!("Unreadable photo: {}", e)))?;

    let mime = format.to_mime_type().to_string();
    let preview = to_data_uri(&mime, &bytes);

    Ok(UserPhoto {
        file_name,
        mime,
        bytes,
        width,
        height,
        preview,
    })
}

pub fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{}", mime, b64)
}

/// Decodes one base64 image from the backend. The MIME type is sniffed,
/// falling back to PNG.
pub fn decode_image(b64: &str) -> Result<ImageData, AppError> {
    let bytes = base64::engine::general_purpose::STANDARD.decode(b64.trim())?;
    let mime = image::guess_format(&bytes)
        .map(|f| f.to_mime_type())
        .unwrap_or("image/png")
        .to_string();
    Ok(ImageData { mime, bytes })
}

pub fn decode_payload(payload: &ImagePayload) -> Result<JobImages, AppError> {
    Ok(JobImages {
        original: decode_image(&payload.original_image_data)?,
        generated: decode_image(&payload.generated_image_data)?,
    })
}

/// Keeps `[A-Za-z0-9_-]`, replacing everything else with `_`.
pub fn sanitize_file_stem(raw: &str) -> String {
    let stem: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "result".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
pub(crate) fn tiny_png() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(3, 2, image::Rgb([200, 40, 120]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .expect("encode png");
    buf.into_inner()
}
