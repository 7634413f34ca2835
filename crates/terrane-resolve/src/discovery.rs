//! Reverse dependency lookup: which projects depend on a given one.

use crate::coordinate::{ProjectId, ProjectVersion};
use crate::provider::{MetadataProvider, ProviderError};

/// Every known project version that declares a **direct** dependency on any
/// version of `target`, in coordinate order.
///
/// This is a linear scan over the whole registry: each known project's direct
/// dependency list is fetched and checked. Acceptable at current registry
/// sizes, and kept behind [`MetadataProvider`] so the implementation can
/// change without touching the resolvers.
///
/// # Errors
///
/// Propagates the first provider failure unchanged.
pub fn downstream_projects<M: MetadataProvider>(
    metadata: &M,
    target: &ProjectId,
) -> Result<Vec<ProjectVersion>, ProviderError> {
    // TODO: replace the scan with a reverse dependency index once the
    // registry service exposes one.
    let mut dependents = Vec::new();
    for candidate in metadata.projects()? {
        if candidate.project == *target {
            continue;
        }
        let direct = metadata.direct_dependencies(&candidate)?;
        if direct.iter().any(|dependency| dependency.project == *target) {
            dependents.push(candidate);
        }
    }
    dependents.sort();
    Ok(dependents)
}
