// DeployScribe - platform/mod.rs
//
// Platform abstraction layer: config files, filesystem reads, report output.
// Dependencies: util, core model types, directories crate.
// Must NOT depend on: app.

pub mod config;
pub mod fs;
pub mod sink;
