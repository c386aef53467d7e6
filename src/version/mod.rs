//! Version layer for upstream release checking
//!
//! This module provides the core functionality for fetching, caching, extracting
//! and comparing tool versions against upstream release feeds.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Fetcher   │◀────│    Cache    │◀────│   Source    │
//! │  (HTTP GET) │     │ (flat files)│     │ (fallbacks) │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                                                ▼
//!                     ┌─────────────┐     ┌─────────────┐
//!                     │   Checker   │◀────│  Extractor  │
//!                     │ (classify)  │     │ (json/regex)│
//!                     └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: TTL-based response cache keyed by the SHA-256 of the URL
//! - [`checker`]: Version normalization and status classification
//! - [`extract`]: Pulling a version string out of a response body
//! - [`fetcher`]: Fetcher trait and its HTTP implementation
//! - [`source`]: Endpoint plus extractor, resolved with fallbacks
//! - [`error`]: Error types for fetch and cache operations
//! - [`semver`]: Shared semver utilities

pub mod cache;
pub mod checker;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod semver;
pub mod source;
