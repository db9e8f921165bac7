// DeployScribe - core/mod.rs
//
// Core business logic layer.
// Dependencies: util, plus the regex/serde/chrono/walkdir/glob/csv crates.
// Must NOT depend on: platform or app.

pub mod discovery;
pub mod export;
pub mod extractor;
pub mod model;
pub mod patterns;
pub mod report;
