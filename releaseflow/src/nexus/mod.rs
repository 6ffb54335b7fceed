//! Nexus artifact repository access.
//!
//! This module provides:
//! - Search response models
//! - Query parameter sets for each search use case
//! - Client configuration
//! - The [`NexusClient`] trait and its reqwest implementation

mod client;
mod config;
mod models;
mod query;

pub use client::{HttpNexusClient, NexusClient};
pub use config::NexusConfig;
pub use models::{NexusAsset, NexusComponent, NexusSearchResult};
pub use query::{SearchQuery, DOCKER_REPOSITORY, MAVEN_RELEASES_REPOSITORY, MAVEN_SNAPSHOTS_REPOSITORY};
