//! Test harness for cross-section reconstruction scenarios.
//!
//! Provides programmatic tools for scripting traced documents, running the
//! reconstruction, and checking the written-back radii with diagnostics.
//!
//! # Key Components
//!
//! - [`DocumentBuilder`]: fluent API for building and reconstructing documents
//! - [`helpers`]: contour builders and radius math
//! - [`assertions`]: assertion helpers reporting the relevant warnings

pub mod assertions;
pub mod helpers;
pub mod workflow;

pub use helpers::HarnessError;
pub use workflow::DocumentBuilder;
