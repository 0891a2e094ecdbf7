use serde::{Deserialize, Serialize};

/// Body of every `/upload` response, success or failure.
#[derive(Clone, Serialize, Deserialize)]
pub struct UploadResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<UploadData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_limit: Option<String>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct UploadData {
    pub url: String,
    pub filename: String,
    pub size: u64,
    pub mimetype: String,
}

impl UploadResult {
    pub fn success(data: UploadData) -> Self {
        Self {
            success: true,
            message: "File uploaded successfully".to_string(),
            data: Some(data),
            error_code: None,
            server_limit: None,
            post_limit: None,
        }
    }

    pub fn failure(message: String) -> Self {
        Self {
            success: false,
            message,
            data: None,
            error_code: None,
            server_limit: None,
            post_limit: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_optional_fields_are_not_serialized() {
        let value =
            serde_json::to_value(UploadResult::failure("nope".to_string())).expect("to json");
        assert_eq!(
            value,
            serde_json::json!({"success": false, "message": "nope"})
        );

        let value = serde_json::to_value(UploadResult::success(UploadData {
            url: "http://localhost/uploads/images/a.png".to_string(),
            filename: "a.png".to_string(),
            size: 3,
            mimetype: "image/png".to_string(),
        }))
        .expect("to json");
        assert_eq!(
            value,
            serde_json::json!({
                "success": true,
                "message": "File uploaded successfully",
                "data": {
                    "url": "http://localhost/uploads/images/a.png",
                    "filename": "a.png",
                    "size": 3,
                    "mimetype": "image/png",
                },
            })
        );
    }
}
