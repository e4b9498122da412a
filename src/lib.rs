//! Review Wizard: guided review collection with generated drafts.

pub mod cli;
pub mod config;
pub mod error;
pub mod handoff;
pub mod llm;
pub mod server;
pub mod synth;
pub mod wizard;
