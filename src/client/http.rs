//! HTTP implementation of [`SessionService`] using reqwest.

use crate::audio::buffer::AudioBlob;
use crate::client::SessionService;
use crate::client::protocol::{
    CvEvaluation, Endpoint, Evaluation, FinalReport, FullCvAnalysis, NextQuestion,
    ParsedCv, StartedInterview, Transcription, embedded_error, error_message,
};
use crate::config::ServiceConfig;
use crate::cv::CvFile;
use crate::error::{MockviewError, Result};
use async_trait::async_trait;
use reqwest::Url;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("mockview/", env!("CARGO_PKG_VERSION"));

/// Client for the evaluation service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSessionClient {
    http: reqwest::Client,
    base_url: Url,
}

/// A 2xx response body.
struct Body {
    text: String,
    json: Value,
}

impl HttpSessionClient {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(|e| MockviewError::ConfigParse {
            message: format!("Invalid service URL '{}': {}", config.base_url, e),
        })?;

        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| MockviewError::Other(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint, query: &[(&str, &str)]) -> Result<Url> {
        let mut url = self
            .base_url
            .join(endpoint.path())
            .map_err(|e| MockviewError::Other(format!("Invalid URL for {endpoint}: {e}")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn post(
        &self,
        endpoint: Endpoint,
        query: &[(&str, &str)],
        configure: impl FnOnce(reqwest::RequestBuilder) -> reqwest::RequestBuilder,
    ) -> Result<Body> {
        let url = self.url(endpoint, query)?;
        debug!("POST {}", endpoint);

        let response = configure(self.http.post(url))
            .send()
            .await
            .map_err(|e| network_error(endpoint, e))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| network_error(endpoint, e))?;

        if !status.is_success() {
            let message = error_message(&text)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "request failed".to_string());
            warn!("{} returned {}: {}", endpoint, status.as_u16(), message);
            return Err(MockviewError::Service {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let json: Value =
            serde_json::from_str(&text).map_err(|e| malformed(endpoint, status.as_u16(), e))?;
        if let Some(message) = embedded_error(&json) {
            warn!("{} reported an error: {}", endpoint, message);
            return Err(MockviewError::Service {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        Ok(Body { text, json })
    }

    async fn post_typed<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        query: &[(&str, &str)],
        configure: impl FnOnce(reqwest::RequestBuilder) -> reqwest::RequestBuilder,
    ) -> Result<T> {
        let body = self.post(endpoint, query, configure).await?;
        serde_json::from_value(body.json).map_err(|e| malformed(endpoint, 200, e))
    }
}

fn network_error(endpoint: Endpoint, e: reqwest::Error) -> MockviewError {
    let message = if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        format!("could not connect: {e}")
    } else {
        e.to_string()
    };
    MockviewError::Network {
        endpoint: endpoint.to_string(),
        message,
    }
}

fn malformed(endpoint: Endpoint, status: u16, e: serde_json::Error) -> MockviewError {
    MockviewError::Service {
        endpoint: endpoint.to_string(),
        status,
        message: format!("malformed response: {e}"),
    }
}

fn file_part(bytes: Vec<u8>, file_name: String, mime_type: &str) -> Result<Part> {
    Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(mime_type)
        .map_err(|e| MockviewError::Other(format!("Invalid media type '{mime_type}': {e}")))
}

fn cv_form(file: &CvFile) -> Result<Form> {
    let part = file_part(file.bytes.clone(), file.file_name.clone(), &file.mime_type)?;
    Ok(Form::new().part("cv", part))
}

#[async_trait]
impl SessionService for HttpSessionClient {
    async fn start_interview(&self, role: &str) -> Result<StartedInterview> {
        self.post_typed(Endpoint::StartInterview, &[("role", role)], |r| r)
            .await
    }

    async fn transcribe(&self, audio: &AudioBlob) -> Result<String> {
        let part = file_part(audio.bytes().to_vec(), audio.file_name(), audio.mime_type())?;
        let form = Form::new().part("audio", part);
        let transcription: Transcription = self
            .post_typed(Endpoint::Transcribe, &[], |r| r.multipart(form))
            .await?;
        Ok(transcription.transcript)
    }

    async fn submit_answer(&self, session_id: &str, answer: &str) -> Result<Evaluation> {
        let body = self
            .post(
                Endpoint::SubmitAnswer,
                &[("session_id", session_id), ("answer", answer)],
                |r| r,
            )
            .await?;
        Ok(Evaluation::new(body.json))
    }

    async fn next_question(&self, session_id: &str) -> Result<NextQuestion> {
        let body = self
            .post(Endpoint::NextQuestion, &[("session_id", session_id)], |r| r)
            .await?;
        NextQuestion::from_wire(&body.json).ok_or_else(|| MockviewError::Service {
            endpoint: Endpoint::NextQuestion.to_string(),
            status: 200,
            message: "malformed response: neither a question nor a completion message"
                .to_string(),
        })
    }

    async fn final_report(&self, session_id: &str) -> Result<FinalReport> {
        let body = self
            .post(Endpoint::FinalReport, &[("session_id", session_id)], |r| r)
            .await?;
        Ok(FinalReport::new(body.json))
    }

    async fn parse_cv(&self, file: &CvFile) -> Result<ParsedCv> {
        let form = cv_form(file)?;
        let body = self
            .post(Endpoint::CvParse, &[], |r| r.multipart(form))
            .await?;
        if !body.json.is_object() {
            return Err(MockviewError::Service {
                endpoint: Endpoint::CvParse.to_string(),
                status: 200,
                message: "malformed response: expected a JSON object".to_string(),
            });
        }
        ParsedCv::from_raw(body.text).map_err(|e| malformed(Endpoint::CvParse, 200, e))
    }

    async fn evaluate_cv(&self, role: &str, parsed: &ParsedCv) -> Result<CvEvaluation> {
        let payload = parsed.raw().to_string();
        let body = self
            .post(Endpoint::CvEvaluate, &[("role", role)], |r| {
                r.header(reqwest::header::CONTENT_TYPE, "application/json")
                    .body(payload)
            })
            .await?;
        Ok(CvEvaluation::new(body.json))
    }

    async fn full_cv_analysis(&self, role: &str, file: &CvFile) -> Result<FullCvAnalysis> {
        let form = cv_form(file)?;
        self.post_typed(Endpoint::CvFullAnalysis, &[("role", role)], |r| {
            r.multipart(form)
        })
        .await
    }
}
