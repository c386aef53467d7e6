//! Shared integration test utilities

#![allow(dead_code)]

pub mod registry;
pub mod repo;

pub use registry::{RecordingFetcher, RecordingGit, create_test_registry};
pub use repo::create_test_repo;
