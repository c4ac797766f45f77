//! HTTP Client Wrapper
//!
//! Single point of outbound REST calls. Every backend interaction goes
//! through [`ApiClient`], which normalizes failures into the unified error
//! shape: a non-2xx response surfaces the body's `detail` or `message`
//! field verbatim, and a request that never produced a response becomes
//! [`BridgeError::NoResponse`].

pub mod wire;

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use tracing::debug;

use crate::config::BackendConfig;
use crate::types::{BridgeError, Result};
use wire::{
    AnalyzeRequest, AnalyzeResponse, ClearTarget, ConfigContent, ConfigEntry, DocumentationRecord,
    DocumentationSummary, FileListResponse, GenerateResultRequest, GenerateResultResponse,
    UploadResponse,
};

/// Client over the backend REST surface
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
}

impl ApiClient {
    pub fn new(backend: &BackendConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(backend.timeout_secs))
            .build()
            .map_err(|e| BridgeError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base: backend.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    // =========================================================================
    // Files
    // =========================================================================

    /// Upload zipped source repositories. Only `.zip` archives are
    /// accepted; the check happens client-side before any bytes move.
    pub async fn upload_files(&self, paths: &[impl AsRef<Path>]) -> Result<UploadResponse> {
        if paths.is_empty() {
            return Err(BridgeError::invalid_input("no files to upload"));
        }

        let mut form = Form::new();
        for path in paths {
            let path = path.as_ref();
            if path.extension().and_then(|e| e.to_str()) != Some("zip") {
                return Err(BridgeError::invalid_input(format!(
                    "only .zip archives can be uploaded: {}",
                    path.display()
                )));
            }
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| {
                    BridgeError::invalid_input(format!("invalid file name: {}", path.display()))
                })?
                .to_string();
            let bytes = tokio::fs::read(path).await?;
            let part = Part::bytes(bytes)
                .file_name(name)
                .mime_str("application/zip")
                .map_err(|e| BridgeError::invalid_input(e.to_string()))?;
            form = form.part("files[]", part);
        }

        let response = self
            .http
            .post(self.url("/api/files/upload"))
            .multipart(form)
            .send()
            .await
            .map_err(no_response)?;
        Self::json(response).await
    }

    pub async fn list_files(&self) -> Result<FileListResponse> {
        let response = self
            .http
            .get(self.url("/files/"))
            .send()
            .await
            .map_err(no_response)?;
        Self::json(response).await
    }

    pub async fn delete_file(&self, file_id: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.url(&format!("/files/{file_id}")))
            .send()
            .await
            .map_err(no_response)?;
        Self::check(response).await.map(|_| ())
    }

    // =========================================================================
    // Analysis
    // =========================================================================

    /// Start a backend analysis job for an uploaded archive. Returns the
    /// task id the status stream subscribes to.
    pub async fn start_analysis(
        &self,
        file_id: &str,
        request: &AnalyzeRequest,
    ) -> Result<AnalyzeResponse> {
        let response = self
            .http
            .post(self.url(&format!("/analyze/{file_id}")))
            .json(request)
            .send()
            .await
            .map_err(no_response)?;
        Self::json(response).await
    }

    /// Download a task's component result set as raw JSON bytes
    pub async fn download_components(&self, file_name: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(self.url(&format!("analyze/download_components/{file_name}")))
            .send()
            .await
            .map_err(no_response)?;
        let response = Self::check(response).await?;
        Ok(response.bytes().await.map_err(no_response)?.to_vec())
    }

    // =========================================================================
    // Configs
    // =========================================================================

    pub async fn list_configs(&self) -> Result<Vec<ConfigEntry>> {
        let response = self
            .http
            .get(self.url("/configs"))
            .send()
            .await
            .map_err(no_response)?;
        Self::json(response).await
    }

    /// Upload an analysis configuration (multipart: name + YAML file)
    pub async fn upload_config(&self, name: &str, path: &Path) -> Result<()> {
        let extension = path.extension().and_then(|e| e.to_str());
        if !matches!(extension, Some("yaml") | Some("yml")) {
            return Err(BridgeError::invalid_input(format!(
                "config must be a .yaml or .yml file: {}",
                path.display()
            )));
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("config.yaml")
            .to_string();
        let bytes = tokio::fs::read(path).await?;
        let form = Form::new().text("name", name.to_string()).part(
            "file",
            Part::bytes(bytes)
                .file_name(file_name)
                .mime_str("application/x-yaml")
                .map_err(|e| BridgeError::invalid_input(e.to_string()))?,
        );

        let response = self
            .http
            .post(self.url("/configs"))
            .multipart(form)
            .send()
            .await
            .map_err(no_response)?;
        Self::check(response).await.map(|_| ())
    }

    pub async fn get_config(&self, name: &str) -> Result<ConfigContent> {
        let response = self
            .http
            .get(self.url(&format!("/configs/{name}")))
            .send()
            .await
            .map_err(no_response)?;
        Self::json(response).await
    }

    pub async fn delete_config(&self, name: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.url(&format!("/configs/{name}")))
            .send()
            .await
            .map_err(no_response)?;
        Self::check(response).await.map(|_| ())
    }

    pub async fn download_config(&self, name: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(self.url(&format!("/configs/download/{name}")))
            .send()
            .await
            .map_err(no_response)?;
        let response = Self::check(response).await?;
        Ok(response.bytes().await.map_err(no_response)?.to_vec())
    }

    // =========================================================================
    // Documentations
    // =========================================================================

    pub async fn list_documentations(&self) -> Result<Vec<DocumentationSummary>> {
        let response = self
            .http
            .get(self.url("/documentations"))
            .send()
            .await
            .map_err(no_response)?;
        Self::json(response).await
    }

    pub async fn get_documentation(&self, id: &str) -> Result<DocumentationRecord> {
        let response = self
            .http
            .get(self.url(&format!("/documentations/{id}")))
            .send()
            .await
            .map_err(no_response)?;
        Self::json(response).await
    }

    pub async fn generate_result(
        &self,
        id: &str,
        request: &GenerateResultRequest,
    ) -> Result<GenerateResultResponse> {
        let response = self
            .http
            .post(self.url(&format!("/documentations/{id}/generate-result")))
            .json(request)
            .send()
            .await
            .map_err(no_response)?;
        Self::json(response).await
    }

    // =========================================================================
    // Data Manager
    // =========================================================================

    pub async fn clear_data(&self, target: ClearTarget) -> Result<()> {
        let response = self
            .http
            .delete(self.url(&format!("/data_manager/clear-{}", target.as_segment())))
            .send()
            .await
            .map_err(no_response)?;
        Self::check(response).await.map(|_| ())
    }

    // =========================================================================
    // Raw fetches
    // =========================================================================

    /// Fetch an absolute URL as raw bytes, returning the content type when
    /// the server names one. Used for dependency-graph images and generated
    /// PDF/DOCX artifacts.
    pub async fn fetch_bytes(&self, url: &str) -> Result<(Option<String>, Vec<u8>)> {
        debug!(%url, "fetching resource");
        let response = self.http.get(url).send().await.map_err(no_response)?;
        let response = Self::check(response).await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());
        let bytes = response.bytes().await.map_err(no_response)?.to_vec();
        Ok((content_type, bytes))
    }

    // =========================================================================
    // Response handling
    // =========================================================================

    async fn json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
        let response = Self::check(response).await?;
        let body = response.text().await.map_err(no_response)?;
        serde_json::from_str(&body).map_err(Into::into)
    }

    /// Map a non-2xx response to `BridgeError::Api`, surfacing the body's
    /// `detail`/`message` string when the server provided one.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(BridgeError::api(
            status.as_u16(),
            server_message(&body).unwrap_or_else(|| status_line(status)),
        ))
    }
}

fn no_response(err: reqwest::Error) -> BridgeError {
    BridgeError::NoResponse(err.to_string())
}

/// Extract the `detail` or `message` field of an error body
fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("detail")
        .or_else(|| value.get("message"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

fn status_line(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(|r| format!("{} {}", status.as_u16(), r))
        .unwrap_or_else(|| status.as_u16().to_string())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationMode;

    fn client_for(server: &mockito::ServerGuard) -> ApiClient {
        let backend = BackendConfig {
            api_base_url: server.url(),
            ..Default::default()
        };
        ApiClient::new(&backend).unwrap()
    }

    #[test]
    fn test_server_message_extraction() {
        assert_eq!(
            server_message(r#"{"detail":"file not found"}"#).as_deref(),
            Some("file not found")
        );
        assert_eq!(
            server_message(r#"{"message":"bad request"}"#).as_deref(),
            Some("bad request")
        );
        assert!(server_message("<html>oops</html>").is_none());
        assert!(server_message(r#"{"detail":42}"#).is_none());
    }

    #[tokio::test]
    async fn test_list_files() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/files/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"files":[{"id":"f1","name":"proj.zip","size":2048}]}"#)
            .create_async()
            .await;

        let files = client_for(&server).list_files().await.unwrap();
        assert_eq!(files.files.len(), 1);
        assert_eq!(files.files[0].name, "proj.zip");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_detail_surfaced_verbatim() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/files/missing")
            .with_status(404)
            .with_body(r#"{"detail":"File 'missing' does not exist"}"#)
            .create_async()
            .await;

        let err = client_for(&server).delete_file("missing").await.unwrap_err();
        match err {
            BridgeError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "File 'missing' does not exist");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_without_body_uses_status_line() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/configs")
            .with_status(500)
            .create_async()
            .await;

        let err = client_for(&server).list_configs().await.unwrap_err();
        match err {
            BridgeError::Api { status, message } => {
                assert_eq!(status, 500);
                assert!(message.contains("500"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_start_analysis_round_trip() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/analyze/f1")
            .match_body(mockito::Matcher::JsonString(
                r#"{"config_filename":"default.yaml","process_name":"demo"}"#.to_string(),
            ))
            .with_status(200)
            .with_body(r#"{"task_id":"abc123","queued":true}"#)
            .create_async()
            .await;

        let response = client_for(&server)
            .start_analysis(
                "f1",
                &AnalyzeRequest {
                    config_filename: "default.yaml".to_string(),
                    process_name: "demo".to_string(),
                    root_folder: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(response.task_id, "abc123");
        assert!(response.extra.contains_key("queued"));
    }

    #[tokio::test]
    async fn test_generate_result() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/documentations/651f/generate-result")
            .with_status(200)
            .with_body(r#"{"pdf_url":"651f/doc.pdf"}"#)
            .create_async()
            .await;

        let result = client_for(&server)
            .generate_result(
                "651f",
                &GenerateResultRequest {
                    mode: GenerationMode::Table,
                    include_overview: None,
                    source_code_mode: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(result.pdf_url.as_deref(), Some("651f/doc.pdf"));
        assert!(result.docx_url.is_none());
    }

    #[tokio::test]
    async fn test_upload_rejects_non_zip() {
        let server = mockito::Server::new_async().await;
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let err = client_for(&server)
            .upload_files(&[&path])
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_clear_data_target_path() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/data_manager/clear-dependency-graphs")
            .with_status(200)
            .create_async()
            .await;

        client_for(&server)
            .clear_data(ClearTarget::DependencyGraphs)
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_bytes_content_type() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/graphs/a.png")
            .with_status(200)
            .with_header("content-type", "image/png; charset=binary")
            .with_body([137u8, 80, 78, 71].as_slice())
            .create_async()
            .await;

        let (content_type, bytes) = client_for(&server)
            .fetch_bytes(&format!("{}/graphs/a.png", server.url()))
            .await
            .unwrap();
        assert_eq!(content_type.as_deref(), Some("image/png"));
        assert_eq!(bytes.len(), 4);
    }
}
