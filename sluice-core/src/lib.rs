//! Sluice Core
//!
//! Core types and abstractions for the Sluice ingestion job manager.
//!
//! This crate contains:
//! - Domain types: the declarative ingestion model (Job, Source, Store, FeatureSet)
//! - DTOs: the options object handed to an execution backend
//! - Schema: the canonical JSON schema-description serializer

pub mod domain;
pub mod dto;
pub mod error;
pub mod schema;

pub use error::ModelError;
