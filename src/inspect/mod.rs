//! Client for the remote paragraph/run inspection service.
//!
//! This is a collaborator, not part of the normalization pipeline: an
//! ancillary API surface uploads the binary document to an external
//! words-processing service and extracts the text of every
//! superscript-flagged run. The pipeline's own citation detection is
//! consistent with, but independent of, this path.

pub mod types;

use tracing::{debug, info};
use url::Url;

use crate::error::{InspectError, InspectResult};
use types::{ParagraphLink, ParagraphsResponse, Run, RunsResponse, SuperscriptReport};

/// Environment variable holding the service base URL.
pub const SERVICE_URL_VAR: &str = "DOCPRESS_SERVICE_URL";
/// Environment variable holding the application SID credential.
pub const APP_SID_VAR: &str = "DOCPRESS_APP_SID";
/// Environment variable holding the application key credential.
pub const APP_KEY_VAR: &str = "DOCPRESS_APP_KEY";

/// Connection settings for the inspection service.
#[derive(Debug, Clone)]
pub struct InspectConfig {
    base_url: Url,
    app_sid: String,
    app_key: String,
}

impl InspectConfig {
    pub fn new(
        base_url: &str,
        app_sid: impl Into<String>,
        app_key: impl Into<String>,
    ) -> InspectResult<Self> {
        // A trailing slash keeps Url::join from clobbering the final
        // path segment of versioned base URLs like `.../v4.0`.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        Ok(Self {
            base_url: Url::parse(&normalized)?,
            app_sid: app_sid.into(),
            app_key: app_key.into(),
        })
    }

    /// Read service URL and credentials from the environment. Missing
    /// values surface before any network call is attempted.
    pub fn from_env() -> InspectResult<Self> {
        let base_url = std::env::var(SERVICE_URL_VAR)
            .map_err(|_| InspectError::MissingConfiguration(SERVICE_URL_VAR))?;
        let app_sid = std::env::var(APP_SID_VAR)
            .map_err(|_| InspectError::MissingConfiguration(APP_SID_VAR))?;
        let app_key = std::env::var(APP_KEY_VAR)
            .map_err(|_| InspectError::MissingConfiguration(APP_KEY_VAR))?;
        Self::new(&base_url, app_sid, app_key)
    }
}

/// Async client for the inspection service.
#[derive(Debug, Clone)]
pub struct InspectClient {
    http: reqwest::Client,
    config: InspectConfig,
}

impl InspectClient {
    #[must_use]
    pub fn new(config: InspectConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Upload a document under `uploads/<name>` in service storage.
    pub async fn upload_file(&self, name: &str, bytes: Vec<u8>) -> InspectResult<()> {
        let url = self.endpoint(&format!("words/storage/file/uploads/{name}"))?;
        debug!(%url, size = bytes.len(), "uploading document");
        let response = self
            .http
            .put(url)
            .header("x-app-sid", &self.config.app_sid)
            .header("x-app-key", &self.config.app_key)
            .body(bytes)
            .send()
            .await?;
        self.check(name, response).await?;
        Ok(())
    }

    /// Ordered paragraph list of an uploaded document.
    pub async fn get_paragraphs(&self, name: &str) -> InspectResult<Vec<ParagraphLink>> {
        let url = self.endpoint(&format!("words/{name}/paragraphs"))?;
        let response = self.get(url).await?;
        let body: ParagraphsResponse = self.check(name, response).await?.json().await?;
        Ok(body
            .paragraphs
            .map(|collection| collection.paragraph_link_list)
            .unwrap_or_default())
    }

    /// Runs of the paragraph at `index`, with font attributes.
    pub async fn get_runs(&self, name: &str, index: usize) -> InspectResult<Vec<Run>> {
        let url = self.endpoint(&format!("words/{name}/paragraphs/{index}/runs"))?;
        let response = self.get(url).await?;
        let body: RunsResponse = self.check(name, response).await?.json().await?;
        Ok(body
            .runs
            .map(|collection| collection.run_list)
            .unwrap_or_default())
    }

    /// Upload a document and return the flattened texts of every
    /// superscript-flagged run across every paragraph, in document
    /// order. An empty report is a valid outcome, not an error.
    pub async fn extract_superscripts(
        &self,
        name: &str,
        bytes: Vec<u8>,
    ) -> InspectResult<SuperscriptReport> {
        self.upload_file(name, bytes).await?;

        let paragraphs = self.get_paragraphs(name).await?;
        info!(document = name, paragraphs = paragraphs.len(), "inspecting runs");

        let mut superscripts = Vec::new();
        for index in 0..paragraphs.len() {
            let runs = self.get_runs(name, index).await?;
            superscripts.extend(
                runs.into_iter()
                    .filter(Run::is_superscript)
                    .filter_map(|run| run.text),
            );
        }

        debug!(document = name, found = superscripts.len(), "superscript extraction done");
        Ok(SuperscriptReport { superscripts })
    }

    fn endpoint(&self, path: &str) -> InspectResult<Url> {
        Ok(self.config.base_url.join(path)?)
    }

    async fn get(&self, url: Url) -> InspectResult<reqwest::Response> {
        Ok(self
            .http
            .get(url)
            .header("x-app-sid", &self.config.app_sid)
            .header("x-app-key", &self.config.app_key)
            .send()
            .await?)
    }

    /// Map non-success responses to the service failure classes.
    async fn check(
        &self,
        name: &str,
        response: reqwest::Response,
    ) -> InspectResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(InspectError::DocumentNotFound(name.to_string()));
        }
        let message = response.text().await.unwrap_or_default();
        Err(InspectError::Service {
            status: status.as_u16(),
            message,
        })
    }
}
