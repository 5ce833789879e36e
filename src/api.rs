use crate::errors::{ConfidanteError, ConfidanteResult};
use crate::models::Message;
use reqwest::multipart;
use serde_json::{json, Value};

/// Reply payload for a successful text submission.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub reply: String,
    pub timestamp: String,
}

/// Reply payload for a successful image upload.
#[derive(Debug, Clone)]
pub struct UploadReply {
    pub filename: String,
    pub reply: String,
}

/// Thin client over the companion-chat backend. All persistence lives on
/// the server; this only shuttles requests and parses the `status`
/// envelope every endpoint wraps its payload in.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// Where an uploaded image is served from.
    pub fn upload_url(&self, filename: &str) -> String {
        format!("{}/uploads/{}", self.base_url, filename)
    }

    /// Sends one text message and returns the counterpart's reply.
    pub async fn send_message(&self, message: &str) -> ConfidanteResult<ChatReply> {
        let payload = json!({ "message": message });

        let response = self
            .http
            .post(format!("{}/api/chat", self.base_url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| ConfidanteError::api_error(format!("Request failed: {}", e)))?;

        let body = Self::parse_envelope(response).await?;

        let reply = body["reply"]
            .as_str()
            .ok_or_else(|| ConfidanteError::api_error("Response missing reply text"))?
            .to_string();
        let timestamp = body["timestamp"].as_str().unwrap_or_default().to_string();

        Ok(ChatReply { reply, timestamp })
    }

    /// Uploads an image as the multipart `file` field.
    pub async fn upload_image(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        mime: &str,
    ) -> ConfidanteResult<UploadReply> {
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .map_err(|e| ConfidanteError::api_error(format!("Invalid mime type: {}", e)))?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(format!("{}/api/upload", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ConfidanteError::api_error(format!("Upload failed: {}", e)))?;

        let body = Self::parse_envelope(response).await?;

        let filename = body["filename"]
            .as_str()
            .ok_or_else(|| ConfidanteError::api_error("Response missing stored filename"))?
            .to_string();
        let reply = body["reply"].as_str().unwrap_or_default().to_string();

        Ok(UploadReply { filename, reply })
    }

    /// Fetches the full server-side history, oldest first.
    pub async fn fetch_history(&self) -> ConfidanteResult<Vec<Message>> {
        let response = self
            .http
            .get(format!("{}/api/history", self.base_url))
            .send()
            .await
            .map_err(|e| ConfidanteError::api_error(format!("Request failed: {}", e)))?;

        let body = Self::parse_envelope(response).await?;

        serde_json::from_value::<Vec<Message>>(body["history"].clone())
            .map_err(|e| ConfidanteError::api_error(format!("Malformed history payload: {}", e)))
    }

    /// Deletes the server-side history.
    pub async fn clear_history(&self) -> ConfidanteResult<()> {
        let response = self
            .http
            .delete(format!("{}/api/history", self.base_url))
            .send()
            .await
            .map_err(|e| ConfidanteError::api_error(format!("Request failed: {}", e)))?;

        Self::parse_envelope(response).await?;
        Ok(())
    }

    /// Every endpoint answers `{status: "success", ...}` or
    /// `{status: "error", message}`, the latter also on non-2xx codes.
    /// Transport failures and declared failures collapse into one error.
    async fn parse_envelope(response: reqwest::Response) -> ConfidanteResult<Value> {
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if body["status"] == "success" {
            return Ok(body);
        }

        let message = body["message"].as_str().unwrap_or("unexpected reply");
        if status.is_success() {
            Err(ConfidanteError::api_error(message))
        } else {
            Err(ConfidanteError::api_error(format!(
                "Server returned {}: {}",
                status, message
            )))
        }
    }
}
