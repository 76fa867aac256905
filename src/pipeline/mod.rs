//! # Analysis Pipeline
//!
//! The analysis engine coordinates audio loading, feature extraction, fusion
//! and artifact emission for a single input file.

pub mod engine;

// Re-exports for convenience
pub use engine::{AnalysisEngine, AnalysisReport, ArtifactPaths};
