/// Errors raised by malformed tree or document data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TreeError {
    #[error("node {oid} references layer {lid} which has no depth")]
    MissingLayer { lid: String, oid: String },

    #[error("document has no pixel calibration")]
    MissingCalibration,

    #[error("pixel width must be positive and finite, got {value}")]
    InvalidCalibration { value: f64 },

    #[error("node not found in tree {tree}")]
    UnknownNode { tree: String },

    #[error("failed to parse document: {0}")]
    ParseError(String),
}
