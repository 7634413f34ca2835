//! Cross-project dependency resolution for the Terrane model platform.
//!
//! This crate provides:
//! - Project coordinate value types (`group:artifact` and
//!   `group:artifact:version`)
//! - Transitive closure of version-pinned dependency graphs
//! - Cross-project substitution: reconciling an in-flight upstream project
//!   against a downstream project's published dependency tree
//! - Entity aggregation with a request-scoped fetch cache
//! - Downstream discovery (who depends on a given project)
//! - An HTTP client for the remote metadata registry
//!
//! It is a pure computation library: all outside access goes through the
//! provider traits in [`provider`], and each resolution call owns its own
//! short-lived state.

mod assemble;
mod closure;
mod coordinate;
mod discovery;
mod provider;
mod registry;
mod substitute;

pub use assemble::{assemble_entities, EntityCache};
pub use closure::DependencyResolver;
pub use coordinate::{CoordinateError, ProjectId, ProjectVersion};
pub use discovery::downstream_projects;
pub use provider::{
    Entity, InMemoryMetadata, InMemoryRevisions, MetadataProvider, ProviderError,
    RevisionConfiguration, RevisionProvider,
};
pub use registry::{RegistryClient, RegistryConfig, REGISTRY_TOKEN_VAR};
pub use substitute::{entities_for_cross_project_test, SubstituteError, SubstitutionResolver};
