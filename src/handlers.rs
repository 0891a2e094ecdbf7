use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{error, info, warn};

use crate::error::{FailureCode, UploadError};
use crate::response::{UploadData, UploadResult};
use crate::state::AppState;
use crate::storage;
use crate::validate::{self, Category};

const API_KEY_HEADER: &str = "x-api-key";

struct FilePart {
    name: Option<String>,
    content_type: String,
    bytes: Bytes,
}

/// Request-scoped view of one upload attempt, collected from the header
/// channel and the multipart form before the validation chain runs.
struct UploadRequest {
    api_key: Option<String>,
    category: Category,
    file: Result<FilePart, FailureCode>,
}

pub async fn upload(State(state): State<AppState>, req: Request) -> Response {
    if req.method() == Method::OPTIONS {
        // Pre-flight negotiation: empty 200, CORS headers come from the layer.
        return StatusCode::OK.into_response();
    }
    if req.method() != Method::POST {
        return UploadError::MethodNotAllowed.into_response();
    }

    let headers = req.headers().clone();
    let multipart = Multipart::from_request(req, &()).await.ok();

    match process(&state, &headers, multipart).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => {
            warn!("Upload rejected: {}", err);
            err.into_response()
        }
    }
}

async fn process(
    state: &AppState,
    headers: &HeaderMap,
    multipart: Option<Multipart>,
) -> Result<UploadResult, UploadError> {
    let request = collect_request(headers, multipart).await;

    if !validate::verify_api_key(request.api_key.as_deref(), &state.config.api_key) {
        return Err(UploadError::Unauthorized);
    }

    let category = request.category;
    let part = request
        .file
        .map_err(|code| UploadError::transport(code, state.config.body_limit))?;

    let dir = storage::ensure_category_dir(&state.config.upload_root, category).map_err(|err| {
        error!(
            "Failed to create {} directory: {}",
            category.dir_name(),
            err
        );
        UploadError::DirectoryCreateFailed
    })?;

    validate::check_size(part.bytes.len())?;
    validate::check_content_type(category, &part.content_type)?;

    let filename = validate::resolve_filename(part.name.as_deref(), &part.content_type);
    storage::persist(&dir, &filename, &part.bytes).map_err(|err| {
        error!(
            "Failed to persist {}/{}: {}",
            category.dir_name(),
            filename,
            err
        );
        UploadError::PersistFailed
    })?;

    let url = public_url(headers, category, &filename);
    info!(
        "Stored {}/{} ({} bytes)",
        category.dir_name(),
        filename,
        part.bytes.len()
    );

    Ok(UploadResult::success(UploadData {
        url,
        filename,
        size: part.bytes.len() as u64,
        mimetype: part.content_type,
    }))
}

/// Walk the multipart stream once. A read failure on the file part is
/// recorded as a transport code rather than aborting, so authentication
/// still sees whatever credential arrived.
async fn collect_request(headers: &HeaderMap, multipart: Option<Multipart>) -> UploadRequest {
    let mut api_key = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let mut category_raw: Option<String> = None;
    let mut file: Result<FilePart, FailureCode> = Err(FailureCode::NoFile);

    if let Some(mut multipart) = multipart {
        loop {
            match multipart.next_field().await {
                Ok(Some(field)) => {
                    let field_name = field.name().unwrap_or_default().to_string();
                    match field_name.as_str() {
                        "file" => {
                            let name = field.file_name().map(str::to_string);
                            let content_type = field
                                .content_type()
                                .unwrap_or("application/octet-stream")
                                .to_string();
                            match field.bytes().await {
                                Ok(bytes) => {
                                    file = Ok(FilePart {
                                        name,
                                        content_type,
                                        bytes,
                                    });
                                }
                                Err(err) => {
                                    file = Err(FailureCode::from_status(err.status()));
                                    break;
                                }
                            }
                        }
                        "file_type" => category_raw = field.text().await.ok(),
                        "api_key" => {
                            // Header channel wins over the form field.
                            let form_key = field.text().await.ok();
                            if api_key.is_none() {
                                api_key = form_key;
                            }
                        }
                        _ => {
                            if field.bytes().await.is_err() {
                                break;
                            }
                        }
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    if file.is_err() {
                        file = Err(FailureCode::from_status(err.status()));
                    }
                    break;
                }
            }
        }
    }

    UploadRequest {
        api_key,
        category: Category::resolve(category_raw.as_deref()),
        file,
    }
}

/// `<scheme>://<host>/uploads/<category>/<name>`, trusting the proxy's
/// forwarded headers before the Host header, with localhost as last resort.
fn public_url(headers: &HeaderMap, category: Category, filename: &str) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or("http");
    let host = headers
        .get("x-forwarded-host")
        .or_else(|| headers.get(header::HOST))
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or("localhost");

    format!(
        "{}://{}/uploads/{}/{}",
        scheme,
        host,
        category.dir_name(),
        filename
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                axum::http::HeaderName::from_bytes(name.as_bytes()).expect("header name"),
                HeaderValue::from_str(value).expect("header value"),
            );
        }
        map
    }

    #[test]
    fn url_prefers_forwarded_headers() {
        let map = headers(&[
            ("x-forwarded-proto", "https"),
            ("x-forwarded-host", "cdn.example.com"),
            ("host", "10.0.0.5:8080"),
        ]);
        assert_eq!(
            public_url(&map, Category::Images, "a_b.png"),
            "https://cdn.example.com/uploads/images/a_b.png"
        );
    }

    #[test]
    fn url_falls_back_to_host_then_localhost() {
        let map = headers(&[("host", "media.local:9000")]);
        assert_eq!(
            public_url(&map, Category::Videos, "clip.mp4"),
            "http://media.local:9000/uploads/videos/clip.mp4"
        );

        let empty = HeaderMap::new();
        assert_eq!(
            public_url(&empty, Category::Images, "x.png"),
            "http://localhost/uploads/images/x.png"
        );
    }
}
