//! Transitive closure over the implicit dependency graph.
//!
//! The graph is never materialized: edges exist only as the dependency list
//! the provider returns for a coordinate, and the walk keeps a visited set to
//! avoid re-expanding nodes. That membership test is also what makes the walk
//! terminate if the provider's data ever contains a cycle, even though
//! publishing discipline is supposed to keep the graph a DAG.

use crate::coordinate::{ProjectId, ProjectVersion};
use crate::provider::{MetadataProvider, ProviderError, RevisionProvider};
use std::collections::{BTreeSet, VecDeque};

/// Expands dependency sets against a metadata provider.
#[derive(Debug)]
pub struct DependencyResolver<'a, M: MetadataProvider> {
    metadata: &'a M,
}

impl<'a, M: MetadataProvider> DependencyResolver<'a, M> {
    /// Create a resolver over the given provider.
    #[must_use]
    pub fn new(metadata: &'a M) -> Self {
        Self { metadata }
    }

    /// The full transitive closure of `seed`: every coordinate reachable by
    /// repeatedly following direct dependencies, including the seed itself.
    ///
    /// # Errors
    ///
    /// Propagates the first provider failure unchanged; no partial set is
    /// returned.
    pub fn transitive_closure(
        &self,
        seed: &BTreeSet<ProjectVersion>,
    ) -> Result<BTreeSet<ProjectVersion>, ProviderError> {
        let mut result = seed.clone();
        let mut queue: VecDeque<ProjectVersion> = seed.iter().cloned().collect();

        while let Some(current) = queue.pop_front() {
            for dependency in self.metadata.direct_dependencies(&current)? {
                if result.insert(dependency.clone()) {
                    queue.push_back(dependency);
                }
            }
        }

        Ok(result)
    }

    /// The upstream dependencies of a published project version.
    ///
    /// With `transitive = false` this is exactly the declared direct set;
    /// with `true` it is the closure of that set.
    ///
    /// # Errors
    ///
    /// Propagates provider failures unchanged.
    pub fn project_dependencies(
        &self,
        coordinate: &ProjectVersion,
        transitive: bool,
    ) -> Result<BTreeSet<ProjectVersion>, ProviderError> {
        let direct = self.metadata.direct_dependencies(coordinate)?;
        if transitive {
            self.transitive_closure(&direct)
        } else {
            Ok(direct)
        }
    }

    /// The upstream dependencies of a project at an unpublished workspace
    /// revision.
    ///
    /// The direct set comes from the revision's live configuration; transitive
    /// expansion still goes through published metadata, since everything below
    /// the first level is pinned to released versions.
    ///
    /// # Errors
    ///
    /// Propagates provider failures unchanged.
    pub fn revision_dependencies<W: RevisionProvider>(
        &self,
        workspaces: &W,
        project: &ProjectId,
        revision: &str,
        transitive: bool,
    ) -> Result<BTreeSet<ProjectVersion>, ProviderError> {
        let configuration = workspaces.configuration(project, revision)?;
        if transitive {
            self.transitive_closure(&configuration.dependencies)
        } else {
            Ok(configuration.dependencies)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{InMemoryMetadata, InMemoryRevisions, RevisionConfiguration};

    fn pv(s: &str) -> ProjectVersion {
        ProjectVersion::parse(s).unwrap()
    }

    fn set(coords: &[&str]) -> BTreeSet<ProjectVersion> {
        coords.iter().map(|s| pv(s)).collect()
    }

    /// A -> {B, C}, B -> {D}, C -> {D}, D -> {}
    fn diamond() -> InMemoryMetadata {
        let mut metadata = InMemoryMetadata::new();
        metadata.insert_project(pv("g:a:1"), [pv("g:b:1"), pv("g:c:1")]);
        metadata.insert_project(pv("g:b:1"), [pv("g:d:1")]);
        metadata.insert_project(pv("g:c:1"), [pv("g:d:1")]);
        metadata.insert_project(pv("g:d:1"), []);
        metadata
    }

    #[test]
    fn test_closure_contains_seed() {
        let metadata = diamond();
        let resolver = DependencyResolver::new(&metadata);
        let seed = set(&["g:a:1"]);
        let closure = resolver.transitive_closure(&seed).unwrap();
        assert!(closure.is_superset(&seed));
    }

    #[test]
    fn test_closure_of_diamond() {
        let metadata = diamond();
        let resolver = DependencyResolver::new(&metadata);
        let closure = resolver.transitive_closure(&set(&["g:a:1"])).unwrap();
        assert_eq!(closure, set(&["g:a:1", "g:b:1", "g:c:1", "g:d:1"]));
        // The shared node is expanded once, not once per path.
        assert_eq!(metadata.dependency_fetch_count(&pv("g:d:1")), 1);
    }

    #[test]
    fn test_closure_is_idempotent() {
        let metadata = diamond();
        let resolver = DependencyResolver::new(&metadata);
        let once = resolver.transitive_closure(&set(&["g:a:1"])).unwrap();
        let twice = resolver.transitive_closure(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_closure_terminates_on_cycle() {
        // Contrary to publishing discipline, but the walk must still stop.
        let mut metadata = InMemoryMetadata::new();
        metadata.insert_project(pv("g:a:1"), [pv("g:b:1")]);
        metadata.insert_project(pv("g:b:1"), [pv("g:a:1")]);

        let resolver = DependencyResolver::new(&metadata);
        let closure = resolver.transitive_closure(&set(&["g:a:1"])).unwrap();
        assert_eq!(closure, set(&["g:a:1", "g:b:1"]));
        assert_eq!(metadata.dependency_fetch_count(&pv("g:a:1")), 1);
        assert_eq!(metadata.dependency_fetch_count(&pv("g:b:1")), 1);
    }

    #[test]
    fn test_project_dependencies_direct_only() {
        let metadata = diamond();
        let resolver = DependencyResolver::new(&metadata);
        let direct = resolver.project_dependencies(&pv("g:a:1"), false).unwrap();
        assert_eq!(direct, set(&["g:b:1", "g:c:1"]));
    }

    #[test]
    fn test_project_dependencies_transitive() {
        let metadata = diamond();
        let resolver = DependencyResolver::new(&metadata);
        let all = resolver.project_dependencies(&pv("g:a:1"), true).unwrap();
        assert_eq!(all, set(&["g:b:1", "g:c:1", "g:d:1"]));
    }

    #[test]
    fn test_closure_propagates_missing_dependency() {
        let mut metadata = InMemoryMetadata::new();
        metadata.insert_project(pv("g:a:1"), [pv("g:missing:1")]);

        let resolver = DependencyResolver::new(&metadata);
        let err = resolver.transitive_closure(&set(&["g:a:1"])).unwrap_err();
        assert!(matches!(err, ProviderError::NotFound { .. }));
    }

    #[test]
    fn test_revision_dependencies() {
        let metadata = diamond();
        let mut revisions = InMemoryRevisions::new();
        let project = ProjectId::new("g", "inflight");
        revisions.insert(
            project.clone(),
            "r1",
            RevisionConfiguration {
                dependencies: set(&["g:b:1"]),
                entities: Vec::new(),
            },
        );

        let resolver = DependencyResolver::new(&metadata);
        let direct = resolver
            .revision_dependencies(&revisions, &project, "r1", false)
            .unwrap();
        assert_eq!(direct, set(&["g:b:1"]));

        let all = resolver
            .revision_dependencies(&revisions, &project, "r1", true)
            .unwrap();
        assert_eq!(all, set(&["g:b:1", "g:d:1"]));
    }
}
