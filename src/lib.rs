//! Version pin reconciliation for dev-container image repositories
//!
//! - [`check`]: runs every registered tool through fetch, cache and classify
//! - [`report`]: table and JSON rendering of a check run
//! - [`update`]: rewrites outdated pins and optionally commits them
//! - [`tools`]: tool registry and pin locations
//! - [`version`]: fetching, caching, extraction and comparison

pub mod check;
pub mod color;
pub mod config;
pub mod logging;
pub mod report;
pub mod tools;
pub mod update;
pub mod version;
