use rand::Rng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::UploadError;

pub const MAX_FILE_SIZE: usize = 20 * 1024 * 1024;

const IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];
const VIDEO_TYPES: &[&str] = &["video/mp4", "video/webm", "video/ogg", "video/quicktime"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Images,
    Videos,
}

impl Category {
    /// Anything that is not exactly a known category lands in `Images`.
    /// Silent coercion is observable behavior, kept on purpose.
    pub fn resolve(raw: Option<&str>) -> Self {
        match raw {
            Some("videos") => Category::Videos,
            _ => Category::Images,
        }
    }

    pub fn dir_name(self) -> &'static str {
        match self {
            Category::Images => "images",
            Category::Videos => "videos",
        }
    }

    pub fn allowed_types(self) -> &'static [&'static str] {
        match self {
            Category::Images => IMAGE_TYPES,
            Category::Videos => VIDEO_TYPES,
        }
    }
}

/// Constant-time key comparison over SHA-256 digests, so neither the key
/// length nor a prefix match leaks through timing.
pub fn verify_api_key(provided: Option<&str>, expected: &str) -> bool {
    let provided = Sha256::digest(provided.unwrap_or("").as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    provided.as_slice().ct_eq(expected.as_slice()).into()
}

/// Enforced on the collected bytes, independent of the transport body limit.
pub fn check_size(len: usize) -> Result<(), UploadError> {
    if len > MAX_FILE_SIZE {
        return Err(UploadError::FileTooLarge);
    }
    Ok(())
}

/// The declared content type is trusted as-is; there is no magic-byte
/// sniffing behind this check.
pub fn check_content_type(category: Category, declared: &str) -> Result<(), UploadError> {
    let declared = declared.trim();
    let allowed = category.allowed_types();
    if allowed.iter().any(|t| declared.eq_ignore_ascii_case(t)) {
        return Ok(());
    }
    Err(UploadError::InvalidContentType {
        allowed: allowed.join(", "),
    })
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Sanitized client name, or a generated one when the client sent none.
/// A later upload with the same resolved name overwrites the earlier file.
pub fn resolve_filename(client_name: Option<&str>, content_type: &str) -> String {
    match client_name {
        Some(name) if !name.trim().is_empty() => {
            let sanitized = sanitize_filename(name);
            // "." and ".." survive sanitization but cannot name a file.
            if matches!(sanitized.as_str(), "." | "..") {
                generated_name(content_type)
            } else {
                sanitized
            }
        }
        _ => generated_name(content_type),
    }
}

fn generated_name(content_type: &str) -> String {
    let timestamp = chrono::Utc::now().timestamp_millis();
    let suffix: u32 = rand::rng().random_range(100000..999999);
    format!(
        "upload-{}-{}.{}",
        timestamp,
        suffix,
        extension_for(content_type)
    )
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        "video/ogg" => "ogv",
        "video/quicktime" => "mov",
        _ => "bin",
    }
}
