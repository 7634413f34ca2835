//! Metadata provider boundary.
//!
//! The resolver never talks to the outside world directly; everything it
//! needs — dependency lists, model entities, in-flight workspace state — comes
//! through the traits in this module. Production code plugs in the HTTP
//! [`crate::RegistryClient`]; tests and embedded callers use
//! [`InMemoryMetadata`].

use crate::coordinate::{ProjectId, ProjectVersion};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// Errors surfaced by a metadata provider.
///
/// The resolver propagates these unchanged and never retries; retry policy,
/// if any, belongs to the provider implementation.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The requested project, version, or revision is unknown to the provider.
    #[error("'{coordinate}' not found")]
    NotFound { coordinate: String },

    /// The provider could not be reached or answered abnormally.
    #[error("metadata provider unavailable while fetching '{coordinate}': {reason}")]
    Unavailable { coordinate: String, reason: String },
}

/// A single model entity, identified by its path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Fully qualified entity path (unique within an assembled model).
    pub path: String,
    /// Classifier path naming the entity's metamodel type.
    pub classifier: String,
    /// The entity definition itself, kept opaque.
    pub content: serde_json::Value,
}

impl Entity {
    /// Convenience constructor, mostly for tests and embedded providers.
    #[must_use]
    pub fn new(
        path: impl Into<String>,
        classifier: impl Into<String>,
        content: serde_json::Value,
    ) -> Self {
        Self {
            path: path.into(),
            classifier: classifier.into(),
            content,
        }
    }
}

/// The in-flight state of a project at a workspace revision: its declared
/// dependencies and its entities, neither of which has been published yet.
#[derive(Debug, Clone)]
pub struct RevisionConfiguration {
    /// Version-pinned direct dependencies declared at this revision.
    pub dependencies: BTreeSet<ProjectVersion>,
    /// The project's own entities at this revision.
    pub entities: Vec<Entity>,
}

/// Read access to published project metadata.
///
/// Backed by the remote registry in production. All methods are on the hot
/// path of the closure walk, so implementations should be cheap to call
/// repeatedly for the same coordinate or memoize internally.
pub trait MetadataProvider {
    /// The declared direct dependencies of a published project version.
    ///
    /// # Errors
    ///
    /// [`ProviderError::NotFound`] if the coordinate is unknown,
    /// [`ProviderError::Unavailable`] on transport failure.
    fn direct_dependencies(
        &self,
        coordinate: &ProjectVersion,
    ) -> Result<BTreeSet<ProjectVersion>, ProviderError>;

    /// The model entities of a published project version.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`MetadataProvider::direct_dependencies`].
    fn entities(&self, coordinate: &ProjectVersion) -> Result<Vec<Entity>, ProviderError>;

    /// Every project version the provider knows about.
    ///
    /// Only used by downstream discovery, which scans this list linearly.
    ///
    /// # Errors
    ///
    /// [`ProviderError::Unavailable`] on transport failure.
    fn projects(&self) -> Result<Vec<ProjectVersion>, ProviderError>;
}

/// Read access to a project's live, unpublished configuration.
///
/// Backed by the version-control-backed project source in production.
pub trait RevisionProvider {
    /// The dependencies and entities of `project` at workspace revision
    /// `revision`.
    ///
    /// # Errors
    ///
    /// [`ProviderError::NotFound`] if the project or revision is unknown,
    /// [`ProviderError::Unavailable`] on transport failure.
    fn configuration(
        &self,
        project: &ProjectId,
        revision: &str,
    ) -> Result<RevisionConfiguration, ProviderError>;
}

/// An in-process metadata backend.
///
/// Serves resolution from maps populated up front, and counts every fetch so
/// tests can assert the caching contract (at most one fetch per coordinate
/// per resolution call) deterministically.
#[derive(Debug, Default)]
pub struct InMemoryMetadata {
    dependencies: HashMap<ProjectVersion, BTreeSet<ProjectVersion>>,
    entities: HashMap<ProjectVersion, Vec<Entity>>,
    dependency_fetches: RefCell<HashMap<ProjectVersion, usize>>,
    entity_fetches: RefCell<HashMap<ProjectVersion, usize>>,
}

impl InMemoryMetadata {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a project version with its direct dependencies.
    pub fn insert_project<I>(&mut self, coordinate: ProjectVersion, dependencies: I)
    where
        I: IntoIterator<Item = ProjectVersion>,
    {
        self.dependencies
            .insert(coordinate, dependencies.into_iter().collect());
    }

    /// Register the entities of a project version.
    ///
    /// The version must already be known via
    /// [`InMemoryMetadata::insert_project`]; entities without a dependency
    /// record would make the backend answer inconsistently.
    pub fn insert_entities(&mut self, coordinate: ProjectVersion, entities: Vec<Entity>) {
        self.entities.insert(coordinate, entities);
    }

    /// How many times the dependencies of `coordinate` were fetched.
    #[must_use]
    pub fn dependency_fetch_count(&self, coordinate: &ProjectVersion) -> usize {
        self.dependency_fetches
            .borrow()
            .get(coordinate)
            .copied()
            .unwrap_or(0)
    }

    /// How many times the entities of `coordinate` were fetched.
    #[must_use]
    pub fn entity_fetch_count(&self, coordinate: &ProjectVersion) -> usize {
        self.entity_fetches
            .borrow()
            .get(coordinate)
            .copied()
            .unwrap_or(0)
    }
}

impl MetadataProvider for InMemoryMetadata {
    fn direct_dependencies(
        &self,
        coordinate: &ProjectVersion,
    ) -> Result<BTreeSet<ProjectVersion>, ProviderError> {
        *self
            .dependency_fetches
            .borrow_mut()
            .entry(coordinate.clone())
            .or_insert(0) += 1;
        self.dependencies
            .get(coordinate)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound {
                coordinate: coordinate.to_string(),
            })
    }

    fn entities(&self, coordinate: &ProjectVersion) -> Result<Vec<Entity>, ProviderError> {
        *self
            .entity_fetches
            .borrow_mut()
            .entry(coordinate.clone())
            .or_insert(0) += 1;
        self.entities
            .get(coordinate)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound {
                coordinate: coordinate.to_string(),
            })
    }

    fn projects(&self) -> Result<Vec<ProjectVersion>, ProviderError> {
        let mut all: Vec<ProjectVersion> = self.dependencies.keys().cloned().collect();
        all.sort();
        Ok(all)
    }
}

/// An in-process revision backend keyed by `(project, revision)`.
#[derive(Debug, Default)]
pub struct InMemoryRevisions {
    configurations: HashMap<(ProjectId, String), RevisionConfiguration>,
}

impl InMemoryRevisions {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the configuration of `project` at `revision`.
    pub fn insert(
        &mut self,
        project: ProjectId,
        revision: impl Into<String>,
        configuration: RevisionConfiguration,
    ) {
        self.configurations
            .insert((project, revision.into()), configuration);
    }
}

impl RevisionProvider for InMemoryRevisions {
    fn configuration(
        &self,
        project: &ProjectId,
        revision: &str,
    ) -> Result<RevisionConfiguration, ProviderError> {
        self.configurations
            .get(&(project.clone(), revision.to_string()))
            .cloned()
            .ok_or_else(|| ProviderError::NotFound {
                coordinate: format!("{project}@{revision}"),
            })
    }
}
