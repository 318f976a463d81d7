//! # Remote Catalog Client
//!
//! [`CatalogApi`] is the seam between the sync engine and the network. The
//! production implementation is [`PokeApiClient`]; tests substitute stubs.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use pokedex_core::SpeciesId;

use crate::config::CatalogConfig;
use crate::error::{SyncError, SyncResult};
use crate::protocol::{SpeciesDetailResponse, SpeciesListResponse};

/// Read access to the remote species catalog.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// One page of the species list.
    async fn list_species(&self, limit: u32, offset: u32) -> SyncResult<SpeciesListResponse>;

    /// Full record of a single species.
    async fn species_detail(&self, id: SpeciesId) -> SyncResult<SpeciesDetailResponse>;
}

/// HTTP client for the PokeAPI catalog.
#[derive(Debug, Clone)]
pub struct PokeApiClient {
    http: Client,
    config: CatalogConfig,
}

impl PokeApiClient {
    /// Builds a client with the configured connect and read timeouts.
    pub fn new(config: CatalogConfig) -> SyncResult<Self> {
        let http = Client::builder()
            .connect_timeout(config.request_timeout())
            .timeout(config.request_timeout())
            .user_agent(concat!("pokedex/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SyncError::InvalidConfig(format!("HTTP client: {}", e)))?;

        Ok(PokeApiClient { http, config })
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, u32)],
    ) -> SyncResult<T> {
        debug!(%url, ?query, "GET");

        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "Remote catalog returned an error status");
            return Err(SyncError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.json::<T>().await.map_err(|e| self.classify(e))
    }

    fn classify(&self, err: reqwest::Error) -> SyncError {
        if err.is_timeout() {
            SyncError::Timeout(self.config.api.request_timeout_secs)
        } else {
            err.into()
        }
    }
}

#[async_trait]
impl CatalogApi for PokeApiClient {
    async fn list_species(&self, limit: u32, offset: u32) -> SyncResult<SpeciesListResponse> {
        let url = self.config.endpoint("pokemon");
        self.get_json(&url, &[("limit", limit), ("offset", offset)])
            .await
    }

    async fn species_detail(&self, id: SpeciesId) -> SyncResult<SpeciesDetailResponse> {
        let url = self.config.endpoint(&format!("pokemon/{}", id));
        self.get_json(&url, &[]).await
    }
}
