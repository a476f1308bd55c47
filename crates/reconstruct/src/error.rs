use std::fmt;

use serde::Serialize;
use tracing::warn;

use section_tree::TreeError;

/// Fatal errors: malformed input the passes cannot recover from.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReconstructError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Non-fatal geometric degeneracies. Each yields a well-defined fallback result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DegeneracyKind {
    /// No raw contour contains the node position; the node is transparent to ray casting.
    NoContour,
    /// Only one characteristic point; the branch contributes nothing.
    NoNormal,
    /// A boundary ray found no point on the ancestor contour.
    NoRayHit,
    /// The cutting plane crossed no surface segment.
    NoPlaneHit,
    /// The nearest normal has zero magnitude (or no normal exists).
    ZeroNormal,
    /// The whole subtree produced no surface segments.
    EmptySurface,
}

impl fmt::Display for DegeneracyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A single degeneracy finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Degeneracy {
    /// Object id of the node (or area tree for `EmptySurface`).
    pub oid: String,
    pub kind: DegeneracyKind,
    pub detail: String,
}

impl fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[WARN] {} {}: {}", self.kind, self.oid, self.detail)
    }
}

/// Collects degeneracies and logs each one as it is recorded.
#[derive(Debug, Clone, Default)]
pub struct Degeneracies {
    entries: Vec<Degeneracy>,
}

impl Degeneracies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, oid: &str, kind: DegeneracyKind, detail: impl Into<String>) {
        let detail = detail.into();
        warn!(oid, %kind, "{detail}");
        self.entries.push(Degeneracy {
            oid: oid.to_string(),
            kind,
            detail,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, kind: DegeneracyKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Degeneracy> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Degeneracy> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_count() {
        let mut log = Degeneracies::new();
        log.record("4", DegeneracyKind::NoRayHit, "ray from (0, 0, 0) missed");
        log.record("5", DegeneracyKind::NoRayHit, "ray from (1, 0, 0) missed");
        log.record("5", DegeneracyKind::ZeroNormal, "zero normal");
        assert_eq!(log.len(), 3);
        assert_eq!(log.count(DegeneracyKind::NoRayHit), 2);
        assert_eq!(log.count(DegeneracyKind::EmptySurface), 0);
    }

    #[test]
    fn test_display() {
        let d = Degeneracy {
            oid: "9".into(),
            kind: DegeneracyKind::NoPlaneHit,
            detail: "no segment crosses the cutting plane".into(),
        };
        assert_eq!(d.to_string(), "[WARN] NoPlaneHit 9: no segment crosses the cutting plane");
    }

    #[test]
    fn test_tree_error_converts() {
        let err: ReconstructError = TreeError::MissingCalibration.into();
        assert_eq!(err.to_string(), "document has no pixel calibration");
    }
}
