//! Input validation for uploads, playlists and sign-in

use crate::backend::{LibraryError, LibraryResult};
use crate::models::{AudioUpload, TrackMetadata};

/// Largest accepted upload: 20 MiB
pub const MAX_FILE_SIZE: usize = 20 * 1024 * 1024;

/// Reject non-audio or oversized files
pub fn validate_audio_file(upload: &AudioUpload) -> LibraryResult<()> {
    if !upload.content_type.starts_with("audio/") {
        return Err(LibraryError::validation(
            "Invalid file type. Please upload an audio file (MP3, WAV, FLAC).",
        ));
    }
    check_file_size(upload.size())
}

/// Reject sizes over [`MAX_FILE_SIZE`]
pub fn check_file_size(size: usize) -> LibraryResult<()> {
    if size > MAX_FILE_SIZE {
        return Err(LibraryError::validation(format!(
            "File is too large ({:.2}MB). Max size is 20MB.",
            size as f64 / 1024.0 / 1024.0
        )));
    }
    Ok(())
}

/// Largest accepted text field of the upload form: 64 KiB
pub const MAX_FIELD_SIZE: usize = 64 * 1024;

/// Reject form fields over [`MAX_FIELD_SIZE`]
pub fn check_field_size(name: &str, size: usize) -> LibraryResult<()> {
    if size > MAX_FIELD_SIZE {
        return Err(LibraryError::validation(format!(
            "Field \"{}\" is too large. Max size is 64KB.",
            name
        )));
    }
    Ok(())
}

/// Require a non-blank value
pub fn require_field(label: &str, value: &str) -> LibraryResult<()> {
    if value.trim().is_empty() {
        return Err(LibraryError::validation(format!("{} is required", label)));
    }
    Ok(())
}

/// Every metadata text field is required
pub fn validate_metadata(metadata: &TrackMetadata) -> LibraryResult<()> {
    require_field("Title", &metadata.title)?;
    require_field("Artist", &metadata.artist)?;
    require_field("Genre", &metadata.genre)?;
    Ok(())
}

/// Leading integer of `raw`; anything unparsable or negative becomes 0
pub fn parse_bpm(raw: &str) -> u32 {
    let trimmed = raw.trim_start();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().unwrap_or(0)
}

/// Default track title: the file name without its last extension
pub fn title_from_file_name(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(idx) if idx + 1 < file_name.len() && !file_name[idx + 1..].contains('/') => {
            file_name[..idx].to_string()
        }
        _ => file_name.to_string(),
    }
}
