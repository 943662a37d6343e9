use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::{Cohort, CohortName},
    error::ApiError,
    protocol::CohortQuery,
};
use tracing::{debug, warn};
use url::Url;

pub mod error;

pub use error::CohortServiceError;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const COHORTS_PATH: &str = "cohorts";

/// Remote collaborator that owns the cohort records.
#[async_trait]
pub trait CohortService: Send + Sync {
    /// Lists cohorts. `None` asks for the unconstrained listing.
    async fn get_cohorts(
        &self,
        query: Option<&CohortQuery>,
    ) -> Result<Vec<Cohort>, CohortServiceError>;

    async fn remove_cohort(&self, name: &CohortName) -> Result<(), CohortServiceError>;
}

/// Stand-in used when no service endpoint is configured.
pub struct MissingCohortService;

#[async_trait]
impl CohortService for MissingCohortService {
    async fn get_cohorts(
        &self,
        _query: Option<&CohortQuery>,
    ) -> Result<Vec<Cohort>, CohortServiceError> {
        Err(CohortServiceError::Unavailable)
    }

    async fn remove_cohort(&self, _name: &CohortName) -> Result<(), CohortServiceError> {
        Err(CohortServiceError::Unavailable)
    }
}

pub struct HttpCohortService {
    http: Client,
    base_url: Url,
}

impl HttpCohortService {
    pub fn new(base_url: &str) -> Result<Self, CohortServiceError> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, CohortServiceError> {
        let parsed = Url::parse(base_url.trim()).map_err(|err| CohortServiceError::InvalidUrl {
            url: base_url.to_string(),
            reason: err.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(CohortServiceError::InvalidUrl {
                url: base_url.to_string(),
                reason: "url cannot carry a path".to_string(),
            });
        }

        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: parsed,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in the constructor, so the segments are always available.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(segments);
        }
        url
    }
}

#[async_trait]
impl CohortService for HttpCohortService {
    async fn get_cohorts(
        &self,
        query: Option<&CohortQuery>,
    ) -> Result<Vec<Cohort>, CohortServiceError> {
        let mut request = self.http.get(self.endpoint(&[COHORTS_PATH]));
        if let Some(query) = query {
            request = request.query(&query.to_pairs());
        }

        let response = check_status(request.send().await?).await?;
        let cohorts: Vec<Cohort> = response.json().await?;
        debug!(count = cohorts.len(), "cohorts: listing received");
        Ok(cohorts)
    }

    async fn remove_cohort(&self, name: &CohortName) -> Result<(), CohortServiceError> {
        let response = self
            .http
            .delete(self.endpoint(&[COHORTS_PATH, name.as_str()]))
            .send()
            .await?;
        check_status(response).await?;
        debug!(cohort = %name, "cohorts: removal acknowledged");
        Ok(())
    }
}

async fn check_status(response: Response) -> Result<Response, CohortServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    if let Ok(api_error) = serde_json::from_str::<ApiError>(&body) {
        warn!(status = status.as_u16(), code = ?api_error.code, "cohorts: service rejected request");
        return Err(api_error.into());
    }

    let message = if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unexpected response")
            .to_string()
    } else {
        body.trim().to_string()
    };
    warn!(status = status.as_u16(), "cohorts: service request failed");
    Err(CohortServiceError::Status {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
