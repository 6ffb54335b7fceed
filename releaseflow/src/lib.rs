//! # Releaseflow
//!
//! A release pipeline orchestrator for npm, Maven and Docker projects backed
//! by a Nexus artifact repository.
//!
//! Releaseflow decides whether a project version may be released and drives
//! the build, publish and deploy steps for it:
//!
//! - **Task runners**: async task bodies with skip predicates and lifecycle logging
//! - **Stages**: sequential, fail-fast composition that nests
//! - **Version resolution**: checks a candidate version against Nexus history
//! - **Pre-release numbering**: computes the next `-beta.N` Docker tag
//! - **Nexus client**: typed search queries over the Nexus REST API
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use releaseflow::prelude::*;
//!
//! let config = ReleaseConfig::from_env()?;
//! let pipeline = ReleasePipeline::new(config, collaborators, default_logger());
//!
//! let released = pipeline.identify_and_run().await?;
//! println!("released {}", released.docker_tag());
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod collaborators;
pub mod config;
pub mod core;
pub mod errors;
pub mod events;
pub mod nexus;
pub mod observability;
pub mod pipeline;
pub mod release;
pub mod tasks;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::collaborators::{
        CredentialSource, Credentials, EnvCredentialSource, GitTagLister, KubernetesDeployer,
        ProjectIdentifier, ShellExecutor, ShellOptions, TokioShellExecutor,
    };
    pub use crate::config::ReleaseConfig;
    pub use crate::core::{
        BuildMode, Dependency, LatestNexusVersions, ProjectDescriptor, ProjectType, TaskStatus,
        VersionCore,
    };
    pub use crate::errors::{BuildError, ConfigError, NexusError};
    pub use crate::events::{
        default_logger, CollectingTaskLogger, LogEntry, NoOpTaskLogger, TaskLogger,
        TracingTaskLogger,
    };
    pub use crate::nexus::{HttpNexusClient, NexusClient, NexusConfig, NexusSearchResult};
    pub use crate::observability::init_logging;
    pub use crate::pipeline::{Collaborators, ReleasePipeline, Stage};
    pub use crate::tasks::{skip_unless, skip_when, Step, TaskContext, TaskRunner};
}
