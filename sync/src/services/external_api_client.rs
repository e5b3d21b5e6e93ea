use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use leadhub_models::{ExternalLeadRecord, LeadType, SourceConfig};

use crate::errors::SourceClientError;

/// Filters applied to a paginated lead fetch.
#[derive(Debug, Clone)]
pub struct LeadFilters {
    pub lead_type: LeadType,
    pub days: Option<String>,
    pub source: Option<String>,
    pub campaign: Option<String>,
}

impl LeadFilters {
    pub fn from_config(config: &SourceConfig) -> Self {
        Self {
            lead_type: config.lead_type,
            days: config.days_filter.clone(),
            source: config.source_filter.clone(),
            campaign: config.campaign_filter.clone(),
        }
    }
}

/// One page of leads from the external API.
#[derive(Debug, Clone)]
pub struct LeadPage {
    pub data: Vec<ExternalLeadRecord>,
    pub total: Option<usize>,
}

/// Result of probing the external API with a minimal fetch. Expected failure
/// classes come back as values so callers can report them to operators
/// without an error path.
#[derive(Debug, Clone)]
pub enum ConnectionCheck {
    Connected { total: Option<usize> },
    AuthenticationFailed { detail: String },
    Unreachable { detail: String },
    ApiError { detail: String },
}

impl ConnectionCheck {
    pub fn is_ok(&self) -> bool {
        matches!(self, ConnectionCheck::Connected { .. })
    }
}

/// Wire shape of the external API's lead listing response. `success` stays
/// optional so a response missing the flag can be classified instead of
/// failing deserialization.
#[derive(Debug, Deserialize)]
struct LeadListResponse {
    success: Option<bool>,
    #[serde(default)]
    data: Vec<ExternalLeadRecord>,
    total: Option<usize>,
    error: Option<String>,
}

/// Thin authenticated wrapper around one external lead API. All knowledge of
/// the upstream HTTP contract lives here.
#[derive(Clone)]
pub struct ExternalLeadApiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ExternalLeadApiClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Probe the API with a minimal fetch (limit=1) and classify the outcome:
    /// bad credentials, unreachable host, or a generic upstream error.
    pub async fn test_connection(&self) -> ConnectionCheck {
        let url = format!("{}/api/leads", self.base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .query(&[("limit", "1")])
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(err) if err.is_connect() || err.is_timeout() => {
                return ConnectionCheck::Unreachable {
                    detail: err.to_string(),
                }
            }
            Err(err) => {
                return ConnectionCheck::ApiError {
                    detail: err.to_string(),
                }
            }
        };

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return ConnectionCheck::AuthenticationFailed {
                detail: status_text(status),
            };
        }
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .ok()
                .filter(|body| !body.is_empty())
                .unwrap_or_else(|| status_text(status));
            return ConnectionCheck::ApiError { detail };
        }

        match response.json::<LeadListResponse>().await {
            Ok(body) => ConnectionCheck::Connected { total: body.total },
            Err(err) => ConnectionCheck::ApiError {
                detail: format!("unreadable response: {err}"),
            },
        }
    }

    /// Fetch one page of leads with the configured filters.
    pub async fn fetch_leads(
        &self,
        filters: &LeadFilters,
        limit: usize,
        offset: usize,
    ) -> Result<LeadPage, SourceClientError> {
        let url = format!("{}/api/leads", self.base_url);

        let mut query: Vec<(&str, String)> = vec![
            ("type", filters.lead_type.as_str().to_string()),
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
        ];
        if let Some(days) = &filters.days {
            query.push(("days", days.clone()));
        }
        if let Some(source) = &filters.source {
            query.push(("source", source.clone()));
        }
        if let Some(campaign) = &filters.campaign {
            query.push(("campaign", campaign.clone()));
        }

        debug!(%url, offset, limit, "fetching lead page");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .query(&query)
            .send()
            .await
            .map_err(|err| {
                if err.is_connect() || err.is_timeout() {
                    SourceClientError::Unreachable(err.to_string())
                } else {
                    SourceClientError::RequestFailed(err.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SourceClientError::AuthenticationFailed(status_text(status)));
        }
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .ok()
                .filter(|body| !body.is_empty())
                .unwrap_or_else(|| status_text(status));
            return Err(SourceClientError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        let body: LeadListResponse = response
            .json()
            .await
            .map_err(|err| SourceClientError::RequestFailed(format!("invalid JSON: {err}")))?;

        match body.success {
            None => Err(SourceClientError::MalformedResponse),
            Some(false) => Err(SourceClientError::Api {
                status: status.as_u16(),
                detail: body
                    .error
                    .unwrap_or_else(|| "external API reported failure".to_string()),
            }),
            Some(true) => Ok(LeadPage {
                data: body.data,
                total: body.total,
            }),
        }
    }
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(|reason| format!("{} {}", status.as_u16(), reason))
        .unwrap_or_else(|| status.as_u16().to_string())
}
