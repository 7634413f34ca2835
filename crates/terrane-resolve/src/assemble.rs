//! Entity aggregation over a reconciled dependency set.
//!
//! Aggregation is all-or-nothing: the test engine downstream of this crate
//! needs a complete, consistent model graph, so any single fetch failure
//! fails the whole call rather than returning a partial list.

use crate::coordinate::ProjectVersion;
use crate::provider::{Entity, MetadataProvider, ProviderError};
use std::collections::{BTreeSet, HashMap};

/// A request-scoped memoizing entity fetch cache.
///
/// Constructed fresh for each resolution call and discarded with it; caches
/// are never shared across calls, so concurrent resolutions cannot observe
/// each other's state. Guarantees at most one provider fetch per distinct
/// coordinate for the lifetime of the cache.
#[derive(Debug, Default)]
pub struct EntityCache {
    entries: HashMap<ProjectVersion, Vec<Entity>>,
}

impl EntityCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The entities of `coordinate`, fetched through `metadata` on first use
    /// and served from the cache afterwards.
    ///
    /// # Errors
    ///
    /// Propagates the provider failure for `coordinate`; a failed fetch is
    /// not cached.
    pub fn entities<M: MetadataProvider>(
        &mut self,
        metadata: &M,
        coordinate: &ProjectVersion,
    ) -> Result<&[Entity], ProviderError> {
        if !self.entries.contains_key(coordinate) {
            let fetched = metadata.entities(coordinate)?;
            self.entries.insert(coordinate.clone(), fetched);
        }
        Ok(&self.entries[coordinate])
    }

    /// Number of coordinates resolved so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache has resolved anything yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Concatenate the entities for a cross-project test run.
///
/// Order: the caller-supplied upstream entities (in-flight, possibly
/// uncommitted), then the downstream project's own entities, then each
/// dependency's entities in coordinate order. The order only matters for
/// output reproducibility; entity identity is by path.
///
/// # Errors
///
/// Fails with the provider error of the first coordinate whose fetch fails;
/// partial results are discarded.
pub fn assemble_entities<M: MetadataProvider>(
    metadata: &M,
    downstream: &ProjectVersion,
    dependencies: &BTreeSet<ProjectVersion>,
    upstream_entities: Vec<Entity>,
    cache: &mut EntityCache,
) -> Result<Vec<Entity>, ProviderError> {
    let mut assembled = upstream_entities;
    assembled.extend(metadata.entities(downstream)?);
    for dependency in dependencies {
        assembled.extend_from_slice(cache.entities(metadata, dependency)?);
    }
    Ok(assembled)
}
