//! Core domain types
//!
//! This module contains the declarative ingestion model. A job binds one
//! event source to one or more destination stores for a set of feature sets;
//! the job manager turns it into a running job on an execution backend.

pub mod feature_set;
pub mod job;
pub mod runner;
pub mod source;
pub mod store;
pub mod streaming;
