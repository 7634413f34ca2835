//! HTTP client for the remote project metadata registry.
//!
//! Implements [`MetadataProvider`] against the registry's JSON API. The
//! client does not retry: transport failures surface as
//! [`ProviderError::Unavailable`] with the failing coordinate, and retry
//! policy stays with the caller.

use crate::coordinate::{ProjectId, ProjectVersion};
use crate::provider::{Entity, MetadataProvider, ProviderError};
use serde::Deserialize;
use std::collections::BTreeSet;

/// Environment variable holding an optional registry bearer token.
pub const REGISTRY_TOKEN_VAR: &str = "TERRANE_REGISTRY_TOKEN";

/// Configuration for the registry client.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Base URL of the registry service, without a trailing slash.
    pub base_url: String,
    /// Optional bearer token for authenticated registries.
    pub token: Option<String>,
    /// User agent for HTTP requests.
    pub user_agent: String,
}

impl RegistryConfig {
    /// Configuration for a registry at `base_url`, with the token taken from
    /// the environment if present.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            token: std::env::var(REGISTRY_TOKEN_VAR).ok(),
            user_agent: format!("terrane/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// A project version as the registry reports it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCoordinate {
    group: String,
    artifact: String,
    version: String,
}

impl From<WireCoordinate> for ProjectVersion {
    fn from(wire: WireCoordinate) -> Self {
        ProjectVersion::new(ProjectId::new(wire.group, wire.artifact), wire.version)
    }
}

/// An entity as the registry reports it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEntity {
    path: String,
    classifier_path: String,
    content: serde_json::Value,
}

impl From<WireEntity> for Entity {
    fn from(wire: WireEntity) -> Self {
        Entity::new(wire.path, wire.classifier_path, wire.content)
    }
}

/// Client for the remote metadata registry.
pub struct RegistryClient {
    config: RegistryConfig,
    http_client: reqwest::blocking::Client,
}

impl RegistryClient {
    /// Create a client for the registry at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Unavailable`] if the HTTP client cannot be
    /// constructed.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        Self::with_config(RegistryConfig::new(base_url))
    }

    /// Create a client with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Unavailable`] if the HTTP client cannot be
    /// constructed.
    pub fn with_config(config: RegistryConfig) -> Result<Self, ProviderError> {
        let http_client = reqwest::blocking::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| ProviderError::Unavailable {
                coordinate: config.base_url.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            config,
            http_client,
        })
    }

    /// URL for the declared dependencies of a project version.
    #[must_use]
    pub fn dependencies_url(&self, coordinate: &ProjectVersion) -> String {
        format!(
            "{}/api/projects/{}/{}/versions/{}/dependencies",
            self.config.base_url,
            coordinate.project.group,
            coordinate.project.artifact,
            coordinate.version
        )
    }

    /// URL for the entities of a project version.
    #[must_use]
    pub fn entities_url(&self, coordinate: &ProjectVersion) -> String {
        format!(
            "{}/api/projects/{}/{}/versions/{}/entities",
            self.config.base_url,
            coordinate.project.group,
            coordinate.project.artifact,
            coordinate.version
        )
    }

    /// URL for the registry's full project listing.
    #[must_use]
    pub fn projects_url(&self) -> String {
        format!("{}/api/projects", self.config.base_url)
    }

    fn build_request(&self, url: &str) -> reqwest::blocking::RequestBuilder {
        let mut req = self.http_client.get(url);
        req = req.header("Accept", "application/json");
        if let Some(ref token) = self.config.token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        req
    }

    /// GET `url` and decode the JSON body, mapping HTTP failures into the
    /// provider error taxonomy for `coordinate`.
    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        coordinate: &str,
    ) -> Result<T, ProviderError> {
        let response =
            self.build_request(url)
                .send()
                .map_err(|e| ProviderError::Unavailable {
                    coordinate: coordinate.to_string(),
                    reason: e.to_string(),
                })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound {
                coordinate: coordinate.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(ProviderError::Unavailable {
                coordinate: coordinate.to_string(),
                reason: format!("registry returned status {}", response.status()),
            });
        }

        response.json().map_err(|e| ProviderError::Unavailable {
            coordinate: coordinate.to_string(),
            reason: format!("invalid response body: {e}"),
        })
    }
}

impl MetadataProvider for RegistryClient {
    fn direct_dependencies(
        &self,
        coordinate: &ProjectVersion,
    ) -> Result<BTreeSet<ProjectVersion>, ProviderError> {
        let wire: Vec<WireCoordinate> =
            self.get_json(&self.dependencies_url(coordinate), &coordinate.to_string())?;
        Ok(wire.into_iter().map(ProjectVersion::from).collect())
    }

    fn entities(&self, coordinate: &ProjectVersion) -> Result<Vec<Entity>, ProviderError> {
        let wire: Vec<WireEntity> =
            self.get_json(&self.entities_url(coordinate), &coordinate.to_string())?;
        Ok(wire.into_iter().map(Entity::from).collect())
    }

    fn projects(&self) -> Result<Vec<ProjectVersion>, ProviderError> {
        let url = self.projects_url();
        let wire: Vec<WireCoordinate> = self.get_json(&url, &url)?;
        let mut all: Vec<ProjectVersion> = wire.into_iter().map(ProjectVersion::from).collect();
        all.sort();
        Ok(all)
    }
}
