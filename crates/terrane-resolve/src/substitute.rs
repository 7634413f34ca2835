//! Cross-project substitution: reconciling an in-flight upstream dependency
//! tree with a downstream project's published tree.
//!
//! The goal is to test a downstream project as if it already depended on the
//! current, unpublished state of an upstream project. Its published pin on
//! the upstream (if any) is replaced by the in-flight state, and every
//! dependency the upstream tree already covers is dropped from the downstream
//! side so the assembled model never carries two versions of the same
//! project's entities.

use crate::assemble::{assemble_entities, EntityCache};
use crate::closure::DependencyResolver;
use crate::coordinate::{ProjectId, ProjectVersion};
use crate::provider::{Entity, MetadataProvider, ProviderError, RevisionProvider};
use std::collections::BTreeSet;
use thiserror::Error;

fn join_coordinates(coordinates: &[ProjectVersion]) -> String {
    coordinates
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors that can occur during cross-project substitution.
#[derive(Error, Debug)]
pub enum SubstituteError {
    /// The downstream project is the upstream project itself.
    #[error("downstream project '{downstream}' is the upstream project '{upstream}' under change; it cannot be substituted against itself")]
    DirectConflict {
        upstream: ProjectId,
        downstream: ProjectVersion,
    },

    /// The downstream project is reachable from the upstream's own
    /// dependency tree, so the substitution would make it depend on itself.
    #[error("downstream project '{downstream}' is a transitive dependency of upstream project '{upstream}'")]
    IndirectConflict {
        upstream: ProjectId,
        downstream: ProjectVersion,
    },

    /// The reconciled set contained a coordinate the filtering should have
    /// removed. This is a bug in the resolver, not a caller error.
    #[error("reconciled dependency set is inconsistent; offending coordinates: {}", join_coordinates(.offending))]
    Incomplete { offending: Vec<ProjectVersion> },

    /// A dependency or entity fetch failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Reconciles dependency trees for cross-project testing.
#[derive(Debug)]
pub struct SubstitutionResolver<'a, M: MetadataProvider> {
    metadata: &'a M,
}

impl<'a, M: MetadataProvider> SubstitutionResolver<'a, M> {
    /// Create a resolver over the given provider.
    #[must_use]
    pub fn new(metadata: &'a M) -> Self {
        Self { metadata }
    }

    /// Produce the dependency set for testing `downstream` against the
    /// in-flight state of `upstream`, whose declared direct dependencies are
    /// `upstream_direct`.
    ///
    /// The result never contains a coordinate for the upstream or downstream
    /// project themselves (their entities travel outside the dependency
    /// path), and contains at most one version per project, with ties broken
    /// in favor of the upstream's own transitive tree.
    ///
    /// # Errors
    ///
    /// - [`SubstituteError::DirectConflict`] if `downstream` *is* `upstream`.
    /// - [`SubstituteError::IndirectConflict`] if `downstream` is reachable
    ///   from the upstream tree.
    /// - [`SubstituteError::Provider`] on any fetch failure; no partial set
    ///   is returned.
    pub fn reconcile(
        &self,
        upstream: &ProjectId,
        upstream_direct: &BTreeSet<ProjectVersion>,
        downstream: &ProjectVersion,
    ) -> Result<BTreeSet<ProjectVersion>, SubstituteError> {
        if downstream.project == *upstream {
            return Err(SubstituteError::DirectConflict {
                upstream: upstream.clone(),
                downstream: downstream.clone(),
            });
        }

        let resolver = DependencyResolver::new(self.metadata);

        // The provider should never report an edge back to the project under
        // change, but the merge below relies on it, so re-check here.
        let upstream_transitive: BTreeSet<ProjectVersion> = resolver
            .transitive_closure(upstream_direct)?
            .into_iter()
            .filter(|coordinate| coordinate.project != *upstream)
            .collect();

        if upstream_transitive
            .iter()
            .any(|coordinate| coordinate.project == downstream.project)
        {
            return Err(SubstituteError::IndirectConflict {
                upstream: upstream.clone(),
                downstream: downstream.clone(),
            });
        }

        let upstream_projects: BTreeSet<&ProjectId> = upstream_transitive
            .iter()
            .map(|coordinate| &coordinate.project)
            .collect();

        // Downstream keeps only the dependencies the upstream tree does not
        // already cover, in any version. A version mismatch is resolved in
        // the upstream's favor: its view of its own dependencies wins over
        // the downstream's possibly stale pin.
        let downstream_direct = self.metadata.direct_dependencies(downstream)?;
        let retained: BTreeSet<ProjectVersion> = downstream_direct
            .into_iter()
            .filter(|dependency| {
                dependency.project != *upstream
                    && !upstream_direct.contains(dependency)
                    && !upstream_projects.contains(&dependency.project)
            })
            .collect();

        let mut result = resolver.transitive_closure(&retained)?;
        result.extend(upstream_transitive);

        // Nothing in the final set may name the upstream or downstream
        // project; if something does, the filtering above let it through.
        let offending: Vec<ProjectVersion> = result
            .iter()
            .filter(|coordinate| {
                coordinate.project == *upstream || coordinate.project == downstream.project
            })
            .cloned()
            .collect();
        if !offending.is_empty() {
            return Err(SubstituteError::Incomplete { offending });
        }

        Ok(result)
    }
}

/// Assemble the full entity list for testing `downstream` against the
/// in-flight state of `upstream` at workspace revision `revision`.
///
/// Composes the revision lookup, [`SubstitutionResolver::reconcile`], and
/// entity aggregation with a fresh per-call cache.
///
/// # Errors
///
/// Surfaces the validation errors of [`SubstitutionResolver::reconcile`]
/// verbatim, and [`SubstituteError::Provider`] on any fetch failure.
pub fn entities_for_cross_project_test<M, W>(
    metadata: &M,
    workspaces: &W,
    upstream: &ProjectId,
    revision: &str,
    downstream: &ProjectVersion,
) -> Result<Vec<Entity>, SubstituteError>
where
    M: MetadataProvider,
    W: RevisionProvider,
{
    let configuration = workspaces.configuration(upstream, revision)?;
    let resolver = SubstitutionResolver::new(metadata);
    let dependencies = resolver.reconcile(upstream, &configuration.dependencies, downstream)?;

    let mut cache = EntityCache::new();
    let entities = assemble_entities(
        metadata,
        downstream,
        &dependencies,
        configuration.entities,
        &mut cache,
    )?;
    Ok(entities)
}
