//! Project coordinates: the identity value types the resolver works with.
//!
//! A [`ProjectId`] names a project (`group:artifact`); a [`ProjectVersion`]
//! pins it to a released version (`group:artifact:version`). Both are
//! immutable, hashable, and totally ordered so they can key maps and produce
//! deterministic output.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when parsing coordinates.
#[derive(Error, Debug)]
pub enum CoordinateError {
    /// The coordinate string does not have the expected shape.
    #[error("malformed coordinate '{input}': {reason}")]
    Malformed {
        input: String,
        reason: &'static str,
    },
}

/// The identity of a project, independent of any version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectId {
    /// Group the project belongs to (e.g. `com.acme`).
    pub group: String,
    /// Artifact name within the group.
    pub artifact: String,
}

impl ProjectId {
    /// Create a project id from its two components.
    #[must_use]
    pub fn new(group: impl Into<String>, artifact: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
        }
    }

    /// Parse a `group:artifact` coordinate.
    ///
    /// The split happens on the **first** `:`; group names never contain one.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError::Malformed`] if the delimiter is missing or
    /// either side is empty.
    pub fn parse(input: &str) -> Result<Self, CoordinateError> {
        let (group, artifact) = input.split_once(':').ok_or(CoordinateError::Malformed {
            input: input.to_string(),
            reason: "expected 'group:artifact'",
        })?;
        if group.is_empty() || artifact.is_empty() {
            return Err(CoordinateError::Malformed {
                input: input.to_string(),
                reason: "group and artifact must be non-empty",
            });
        }
        Ok(Self::new(group, artifact))
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.group, self.artifact)
    }
}

/// A project pinned to a specific released version.
///
/// The version string is opaque to the resolver: dependencies arrive fully
/// pinned, so no requirement matching or range logic ever applies to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectVersion {
    /// The project being pinned.
    pub project: ProjectId,
    /// The pinned version (e.g. `1.2.3`).
    pub version: String,
}

impl ProjectVersion {
    /// Create a pinned coordinate from a project id and a version string.
    #[must_use]
    pub fn new(project: ProjectId, version: impl Into<String>) -> Self {
        Self {
            project,
            version: version.into(),
        }
    }

    /// Parse a `group:artifact:version` coordinate.
    ///
    /// The version is split off on the **last** `:`, because the project id
    /// itself contains one.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError::Malformed`] if fewer than two delimiters are
    /// present or any component is empty.
    pub fn parse(input: &str) -> Result<Self, CoordinateError> {
        let (id_part, version) = input.rsplit_once(':').ok_or(CoordinateError::Malformed {
            input: input.to_string(),
            reason: "expected 'group:artifact:version'",
        })?;
        if version.is_empty() {
            return Err(CoordinateError::Malformed {
                input: input.to_string(),
                reason: "version must be non-empty",
            });
        }
        let project = ProjectId::parse(id_part).map_err(|_| CoordinateError::Malformed {
            input: input.to_string(),
            reason: "expected 'group:artifact:version'",
        })?;
        Ok(Self::new(project, version))
    }
}

impl std::fmt::Display for ProjectVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.project, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_project_id() {
        let id = ProjectId::parse("com.acme:core").unwrap();
        assert_eq!(id.group, "com.acme");
        assert_eq!(id.artifact, "core");
        assert_eq!(id.to_string(), "com.acme:core");
    }

    #[test]
    fn test_parse_project_id_no_delimiter() {
        assert!(ProjectId::parse("com.acme.core").is_err());
    }

    #[test]
    fn test_parse_project_id_empty_sides() {
        assert!(ProjectId::parse(":core").is_err());
        assert!(ProjectId::parse("com.acme:").is_err());
        assert!(ProjectId::parse(":").is_err());
    }

    #[test]
    fn test_parse_project_version() {
        let pv = ProjectVersion::parse("com.acme:core:1.2.3").unwrap();
        assert_eq!(pv.project, ProjectId::new("com.acme", "core"));
        assert_eq!(pv.version, "1.2.3");
        assert_eq!(pv.to_string(), "com.acme:core:1.2.3");
    }

    #[test]
    fn test_parse_project_version_splits_on_last_colon() {
        // The id keeps its own colon; only the trailing component is a version.
        let pv = ProjectVersion::parse("org.example:tools:0.1.0-rc1").unwrap();
        assert_eq!(pv.project.group, "org.example");
        assert_eq!(pv.project.artifact, "tools");
        assert_eq!(pv.version, "0.1.0-rc1");
    }

    #[test]
    fn test_parse_project_version_missing_parts() {
        assert!(ProjectVersion::parse("core:1.0").is_err());
        assert!(ProjectVersion::parse("com.acme:core:").is_err());
        assert!(ProjectVersion::parse("1.0").is_err());
    }

    #[test]
    fn test_ordering_is_total_and_structural() {
        let a = ProjectVersion::parse("com.acme:app:1.0").unwrap();
        let b = ProjectVersion::parse("com.acme:app:2.0").unwrap();
        let c = ProjectVersion::parse("com.acme:core:1.0").unwrap();
        assert!(a < b);
        assert!(b < c);
        assert_eq!(a, ProjectVersion::parse("com.acme:app:1.0").unwrap());
    }
}
