//! Data Transfer Objects
//!
//! Objects handed from the job manager to an execution backend.

pub mod options;
