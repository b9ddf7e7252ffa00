use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use shared::{
    domain::AnalysisResult,
    error::AnalysisError,
    protocol::{parse_analysis_body, UPLOAD_FIELD_NAME},
};
use tracing::debug;

use crate::{selected_file::SelectedFile, settings::Settings};

/// The remote service that scores an uploaded photo.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn analyze(&self, file: &SelectedFile) -> Result<AnalysisResult, AnalysisError>;
}

/// Posts the photo as multipart form data to `{backend_url}/analyze`.
pub struct HttpAnalysisService {
    http: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpAnalysisService {
    pub fn new(settings: &Settings) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(settings.request_timeout).build()?;
        Ok(Self {
            http,
            endpoint: settings.analyze_url(),
            timeout: settings.request_timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn classify(&self, err: reqwest::Error) -> AnalysisError {
        if err.is_timeout() {
            AnalysisError::Timeout {
                after: self.timeout,
            }
        } else {
            AnalysisError::Transport {
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisService {
    async fn analyze(&self, file: &SelectedFile) -> Result<AnalysisResult, AnalysisError> {
        let part = Part::bytes(file.bytes().to_vec())
            .file_name(file.file_name().to_string())
            .mime_str(file.mime_type())
            .map_err(|e| self.classify(e))?;
        let form = Form::new().part(UPLOAD_FIELD_NAME, part);

        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        debug!(
            endpoint = %self.endpoint,
            status = status.as_u16(),
            "analysis: response received"
        );
        if !status.is_success() {
            let body = response.text().await.map_err(|e| self.classify(e))?;
            return Err(AnalysisError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        parse_analysis_body(&body)
    }
}
