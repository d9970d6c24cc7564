//! Orchestra Core
//!
//! Core types shared by the Orchestra API client and CLI.
//!
//! This crate contains:
//! - Domain types: pipeline aliases, run handles and statuses, repository
//!   metadata and schema validation results
//! - DTOs: request and response bodies exchanged with the Orchestra API

pub mod domain;
pub mod dto;
