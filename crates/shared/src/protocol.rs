use crate::{domain::AnalysisResult, error::AnalysisError};

pub const ANALYZE_PATH: &str = "/analyze";
/// Multipart part name carrying the image bytes.
pub const UPLOAD_FIELD_NAME: &str = "file";
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Joins the configured base URL and the analyze path without doubling `/`.
pub fn analyze_url(base_url: &str) -> String {
    format!("{}{ANALYZE_PATH}", base_url.trim_end_matches('/'))
}

/// Decodes the body of a 2xx analyze response.
pub fn parse_analysis_body(body: &[u8]) -> Result<AnalysisResult, AnalysisError> {
    serde_json::from_slice(body).map_err(|e| AnalysisError::Decode {
        message: e.to_string(),
    })
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
