// DeployScribe - app/mod.rs
//
// Application layer: pattern table selection and run orchestration.
// Dependencies: core, platform, util.

pub mod pattern_mgr;
pub mod pipeline;
