use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::response::UploadResult;

/// Transport-level reasons the file part never made it to validation.
///
/// The named variants form a fixed message table; anything the transport
/// reports outside it falls back to a generic "Upload error" message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCode {
    ServerSizeLimit,
    FormSizeLimit,
    Partial,
    NoFile,
    NoTmpDir,
    CantWrite,
    ExtensionBlocked,
    Other(u16),
}

impl FailureCode {
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::PAYLOAD_TOO_LARGE => FailureCode::ServerSizeLimit,
            StatusCode::BAD_REQUEST => FailureCode::Partial,
            other => FailureCode::Other(other.as_u16()),
        }
    }

    pub fn code(self) -> String {
        match self {
            FailureCode::ServerSizeLimit => "server_size_limit".to_string(),
            FailureCode::FormSizeLimit => "form_size_limit".to_string(),
            FailureCode::Partial => "partial".to_string(),
            FailureCode::NoFile => "no_file".to_string(),
            FailureCode::NoTmpDir => "no_tmp_dir".to_string(),
            FailureCode::CantWrite => "cant_write".to_string(),
            FailureCode::ExtensionBlocked => "extension_blocked".to_string(),
            FailureCode::Other(code) => code.to_string(),
        }
    }

    pub fn message(self) -> String {
        match self {
            FailureCode::ServerSizeLimit => {
                "File exceeds the server upload size limit".to_string()
            }
            FailureCode::FormSizeLimit => "File exceeds the form-declared size limit".to_string(),
            FailureCode::Partial => "File was only partially uploaded".to_string(),
            FailureCode::NoFile => "No file was uploaded".to_string(),
            FailureCode::NoTmpDir => {
                "Server is missing a temporary upload directory".to_string()
            }
            FailureCode::CantWrite => {
                "Server failed to write the uploaded file to disk".to_string()
            }
            FailureCode::ExtensionBlocked => "Upload blocked by a server extension".to_string(),
            FailureCode::Other(code) => format!("Upload error: {}", code),
        }
    }
}

/// Everything that can terminate an upload request. Each variant carries its
/// HTTP status and renders as a JSON `UploadResult` body.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Unauthorized: Invalid API key")]
    Unauthorized,
    #[error("{}", code.message())]
    Transport {
        code: FailureCode,
        server_limit: Option<usize>,
        post_limit: Option<usize>,
    },
    #[error("File too large. Max size: 20MB")]
    FileTooLarge,
    #[error("Invalid file type. Allowed: {allowed}")]
    InvalidContentType { allowed: String },
    #[error("Failed to create upload directory")]
    DirectoryCreateFailed,
    #[error("Failed to save file")]
    PersistFailed,
}

impl UploadError {
    /// Transport failure, with size-limit diagnostics attached when the
    /// server body limit was the cause.
    pub fn transport(code: FailureCode, body_limit: usize) -> Self {
        let limit = matches!(code, FailureCode::ServerSizeLimit).then_some(body_limit);
        UploadError::Transport {
            code,
            server_limit: limit,
            post_limit: limit,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            UploadError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            UploadError::Unauthorized => StatusCode::UNAUTHORIZED,
            UploadError::Transport { .. }
            | UploadError::FileTooLarge
            | UploadError::InvalidContentType { .. } => StatusCode::BAD_REQUEST,
            UploadError::DirectoryCreateFailed | UploadError::PersistFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut result = UploadResult::failure(self.to_string());
        if let UploadError::Transport {
            code,
            server_limit,
            post_limit,
        } = &self
        {
            result.error_code = Some(code.code());
            result.server_limit = server_limit.map(format_size);
            result.post_limit = post_limit.map(format_size);
        }
        (status, Json(result)).into_response()
    }
}

fn format_size(bytes: usize) -> String {
    format!("{}MB", bytes / (1024 * 1024))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_taxonomy() {
        assert_eq!(
            UploadError::MethodNotAllowed.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(UploadError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(UploadError::FileTooLarge.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            UploadError::transport(FailureCode::NoFile, 0).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            UploadError::DirectoryCreateFailed.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            UploadError::PersistFailed.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unknown_code_falls_back_to_generic_message() {
        assert_eq!(FailureCode::Other(418).message(), "Upload error: 418");
        assert_eq!(FailureCode::Other(418).code(), "418");
    }

    #[test]
    fn server_size_limit_carries_diagnostics() {
        let err = UploadError::transport(FailureCode::ServerSizeLimit, 25 * 1024 * 1024);
        match err {
            UploadError::Transport {
                server_limit,
                post_limit,
                ..
            } => {
                assert_eq!(server_limit, Some(25 * 1024 * 1024));
                assert_eq!(post_limit, Some(25 * 1024 * 1024));
            }
            _ => panic!("expected transport error"),
        }

        let err = UploadError::transport(FailureCode::Partial, 25 * 1024 * 1024);
        match err {
            UploadError::Transport { server_limit, .. } => assert_eq!(server_limit, None),
            _ => panic!("expected transport error"),
        }
    }

    #[test]
    fn size_limit_maps_from_payload_too_large() {
        assert_eq!(
            FailureCode::from_status(StatusCode::PAYLOAD_TOO_LARGE),
            FailureCode::ServerSizeLimit
        );
        assert_eq!(
            FailureCode::from_status(StatusCode::BAD_REQUEST),
            FailureCode::Partial
        );
        assert_eq!(
            FailureCode::from_status(StatusCode::INTERNAL_SERVER_ERROR),
            FailureCode::Other(500)
        );
    }
}
