//! Core domain types
//!
//! These types describe what the CLI knows about pipelines, runs and the
//! local git repository. None of them are persisted; each lives for a single
//! command invocation.

pub mod pipeline;
pub mod repo;
pub mod run;
pub mod validation;
