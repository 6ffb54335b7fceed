//! Pipeline composition and the assembled release pipeline.
//!
//! This module provides:
//! - [`Stage`], the sequential fail-fast composer
//! - [`ReleasePipeline`], which wires the release tasks into stages

mod release;
mod stage;

pub use release::{
    docker_image_ref, publish_command, Collaborators, ReleasePipeline, BUILD_DOCKER_IMAGE_TASK,
    CONFIG_VALIDATION_STAGE, CREATE_ARTIFACT_STAGE, DEPLOY_STAGE, DEPLOY_TO_KUBERNETES_TASK, IDENTIFY_PROJECT_TASK,
    PUBLISH_PACKAGE_TASK, PUSH_DOCKER_IMAGE_TASK, RELEASE_STAGE, SELF_VALIDATION_STAGE,
};
pub use stage::Stage;
