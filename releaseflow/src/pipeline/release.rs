//! The assembled release pipeline.

use crate::collaborators::{
    CredentialSource, GitTagLister, KubernetesDeployer, ProjectIdentifier, ShellExecutor, ShellOptions,
};
use crate::config::ReleaseConfig;
use crate::core::{ProjectDescriptor, ProjectType};
use crate::errors::BuildError;
use crate::events::TaskLogger;
use crate::nexus::NexusClient;
use crate::observability::RunSpanAttributes;
use crate::release::{
    docker_pre_release_task, fetch_nexus_versions_task, validate_credentials_task, validate_dependencies_task,
    validate_git_tag_task, validate_pre_release_flag_task, validate_version_task,
};
use crate::tasks::{skip_unless, skip_when, TaskContext, TaskRunner};

use super::stage::Stage;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, Instrument};

/// Name of the top-level stage.
pub const RELEASE_STAGE: &str = "release";
/// Name of the descriptor consistency stage.
pub const SELF_VALIDATION_STAGE: &str = "self-validation";
/// Name of the repository and environment checks stage.
pub const CONFIG_VALIDATION_STAGE: &str = "config-validation";
/// Name of the build and publish stage.
pub const CREATE_ARTIFACT_STAGE: &str = "create-artifact";
/// Name of the deployment stage.
pub const DEPLOY_STAGE: &str = "deploy";

/// Name of the project identification step.
pub const IDENTIFY_PROJECT_TASK: &str = "identify-project";
/// Name of the package publish task.
pub const PUBLISH_PACKAGE_TASK: &str = "publish-package";
/// Name of the image build task.
pub const BUILD_DOCKER_IMAGE_TASK: &str = "build-docker-image";
/// Name of the image push task.
pub const PUSH_DOCKER_IMAGE_TASK: &str = "push-docker-image";
/// Name of the deployment task.
pub const DEPLOY_TO_KUBERNETES_TASK: &str = "deploy-to-kubernetes";

/// The external systems a release talks to.
#[derive(Clone)]
pub struct Collaborators {
    /// Artifact repository.
    pub nexus: Arc<dyn NexusClient>,
    /// Finds the project in the working directory.
    pub identifier: Arc<dyn ProjectIdentifier>,
    /// Runs build and publish commands.
    pub shell: Arc<dyn ShellExecutor>,
    /// Rolls out applications.
    pub deployer: Arc<dyn KubernetesDeployer>,
    /// Lists existing git tags.
    pub git: Arc<dyn GitTagLister>,
    /// Supplies registry credentials.
    pub credentials: Arc<dyn CredentialSource>,
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

/// `<registry>/<name>:<tag>` for the descriptor's image.
#[must_use]
pub fn docker_image_ref(registry: &str, descriptor: &ProjectDescriptor) -> String {
    format!("{}/{}:{}", registry.trim_end_matches('/'), descriptor.name, descriptor.docker_tag())
}

/// The command publishing the package, or `None` for Docker projects.
#[must_use]
pub fn publish_command(descriptor: &ProjectDescriptor) -> Option<String> {
    match descriptor.project_type {
        ProjectType::NpmApplication | ProjectType::NpmLibrary if descriptor.is_pre_release => {
            Some("npm publish --tag beta".to_string())
        }
        ProjectType::NpmApplication | ProjectType::NpmLibrary => Some("npm publish".to_string()),
        ProjectType::MavenApplication | ProjectType::MavenLibrary => Some("mvn deploy".to_string()),
        ProjectType::DockerApplication | ProjectType::DockerImage => None,
    }
}

fn shell_task<F>(
    stage_name: &str,
    task_name: &str,
    shell: Arc<dyn ShellExecutor>,
    options: ShellOptions,
    command: F,
) -> TaskRunner<ProjectDescriptor, ProjectDescriptor>
where
    F: Fn(&ProjectDescriptor) -> Result<String, String> + Send + Sync + 'static,
{
    TaskRunner::new(stage_name, task_name, move |ctx: TaskContext<ProjectDescriptor>| {
        let rendered = command(ctx.input());
        let shell = Arc::clone(&shell);
        let options = options.clone();
        async move {
            let command = rendered.map_err(|message| ctx.create_build_error(message))?;
            ctx.log(format!("Running `{command}`"));
            shell
                .exec(&command, &options)
                .await
                .map_err(|err| ctx.wrap_error(format!("{err:#}")))?;
            Ok::<_, BuildError>(ctx.into_input())
        }
    })
}

/// A release pipeline bound to its configuration and collaborators.
pub struct ReleasePipeline {
    config: ReleaseConfig,
    collaborators: Collaborators,
    logger: Arc<dyn TaskLogger>,
    stage: Stage<ProjectDescriptor>,
}

impl ReleasePipeline {
    /// Assembles the pipeline.
    pub fn new(config: ReleaseConfig, collaborators: Collaborators, logger: Arc<dyn TaskLogger>) -> Self {
        let stage = Self::assemble(&config, &collaborators, &logger);
        Self {
            config,
            collaborators,
            logger,
            stage,
        }
    }

    fn assemble(
        config: &ReleaseConfig,
        collaborators: &Collaborators,
        logger: &Arc<dyn TaskLogger>,
    ) -> Stage<ProjectDescriptor> {
        let mode = config.build_mode;
        let log = |runner: TaskRunner<ProjectDescriptor, ProjectDescriptor>| runner.with_logger(Arc::clone(logger));
        let options = ShellOptions::new().in_dir(&config.working_dir);

        let self_validation = Stage::new(SELF_VALIDATION_STAGE)
            .step(log(validate_pre_release_flag_task(SELF_VALIDATION_STAGE)))
            .step(log(validate_dependencies_task(SELF_VALIDATION_STAGE)));

        let config_validation = Stage::new(CONFIG_VALIDATION_STAGE)
            .step(log(fetch_nexus_versions_task(
                CONFIG_VALIDATION_STAGE,
                mode,
                Arc::clone(&collaborators.nexus),
            )))
            .step(log(validate_version_task(CONFIG_VALIDATION_STAGE, mode)))
            .step(log(validate_git_tag_task(
                CONFIG_VALIDATION_STAGE,
                mode,
                Arc::clone(&collaborators.git),
            )))
            .step(log(validate_credentials_task(
                CONFIG_VALIDATION_STAGE,
                Arc::clone(&collaborators.credentials),
            )));

        let registry = config.docker_registry.clone();
        let push_registry = registry.clone();
        let create_artifact = Stage::new(CREATE_ARTIFACT_STAGE)
            .step(log(docker_pre_release_task(
                CREATE_ARTIFACT_STAGE,
                Arc::clone(&collaborators.nexus),
            )))
            .step(log(shell_task(
                CREATE_ARTIFACT_STAGE,
                PUBLISH_PACKAGE_TASK,
                Arc::clone(&collaborators.shell),
                options.clone(),
                |d| publish_command(d).ok_or_else(|| format!("Nothing to publish for project type {}", d.project_type)),
            )
            .skip_if(skip_when("Docker projects publish an image", |d: &ProjectDescriptor| {
                d.project_type.is_docker()
            }))))
            .step(log(shell_task(
                CREATE_ARTIFACT_STAGE,
                BUILD_DOCKER_IMAGE_TASK,
                Arc::clone(&collaborators.shell),
                options.clone(),
                move |d| Ok(format!("docker build -t {} .", docker_image_ref(&registry, d))),
            )
            .skip_if(skip_when("Libraries have no image", |d: &ProjectDescriptor| {
                d.project_type.is_library()
            }))))
            .step(log(shell_task(
                CREATE_ARTIFACT_STAGE,
                PUSH_DOCKER_IMAGE_TASK,
                Arc::clone(&collaborators.shell),
                options,
                move |d| Ok(format!("docker push {}", docker_image_ref(&push_registry, d))),
            )
            .skip_if(skip_when("Libraries have no image", |d: &ProjectDescriptor| {
                d.project_type.is_library()
            }))));

        // A stage has no skip predicates of its own, so deploy-only runs
        // bypass it through a wrapping task.
        let create_artifact = Arc::new(create_artifact);
        let create_artifact_step = TaskRunner::new(
            RELEASE_STAGE,
            CREATE_ARTIFACT_STAGE,
            move |ctx: TaskContext<ProjectDescriptor>| {
                let stage = Arc::clone(&create_artifact);
                async move { stage.run(ctx.into_input()).await }
            },
        )
        .skip_if(skip_when("Deploy only build", move |_: &ProjectDescriptor| mode.is_deploy_only()));

        let deployer = Arc::clone(&collaborators.deployer);
        let deploy = Stage::new(DEPLOY_STAGE).step(log(TaskRunner::new(
            DEPLOY_STAGE,
            DEPLOY_TO_KUBERNETES_TASK,
            move |ctx: TaskContext<ProjectDescriptor>| {
                let deployer = Arc::clone(&deployer);
                async move {
                    deployer
                        .deploy(ctx.input())
                        .await
                        .map_err(|err| ctx.wrap_error(format!("{err:#}")))?;
                    Ok::<_, BuildError>(ctx.into_input())
                }
            },
        )
        .skip_if(skip_unless("Only applications are deployed", |d: &ProjectDescriptor| {
            d.project_type.is_application()
        }))
        .with_summary(|d: &ProjectDescriptor| format!("Deployed {} {}", d.name, d.docker_tag()))));

        Stage::new(RELEASE_STAGE)
            .step(self_validation)
            .step(config_validation)
            .step(log(create_artifact_step))
            .step(deploy)
    }

    /// Gets the configuration.
    #[must_use]
    pub fn config(&self) -> &ReleaseConfig {
        &self.config
    }

    /// Gets the top-level stage.
    #[must_use]
    pub fn stage(&self) -> &Stage<ProjectDescriptor> {
        &self.stage
    }

    /// Gets the task logger.
    #[must_use]
    pub fn logger(&self) -> &Arc<dyn TaskLogger> {
        &self.logger
    }

    /// Runs the pipeline for `descriptor` inside a `release_run` span.
    pub async fn run(&self, descriptor: ProjectDescriptor) -> Result<ProjectDescriptor, BuildError> {
        let attributes = RunSpanAttributes::new(self.config.build_mode).with_project(&descriptor);
        let span = attributes.span();

        async {
            info!("Release started");
            match self.stage.run(descriptor).await {
                Ok(released) => {
                    info!(tag = %released.docker_tag(), "Release finished");
                    Ok(released)
                }
                Err(err) => {
                    error!(stage = %err.stage_name, task = %err.task_name, "Release failed: {}", err.message);
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Identifies the project in the configured working directory, then
    /// runs the pipeline for it.
    pub async fn identify_and_run(&self) -> Result<ProjectDescriptor, BuildError> {
        let descriptor = self
            .collaborators
            .identifier
            .identify(&self.config.working_dir)
            .await
            .map_err(|err| BuildError::new(format!("{err:#}"), RELEASE_STAGE, IDENTIFY_PROJECT_TASK))?;
        info!(project = %descriptor.coordinates(), version = %descriptor.version, "Project identified");
        self.run(descriptor).await
    }
}

impl fmt::Debug for ReleasePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleasePipeline")
            .field("config", &self.config)
            .field("stage", &self.stage)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{MockKubernetesDeployer, MockProjectIdentifier};
    use crate::core::{BuildMode, LatestNexusVersions};
    use crate::events::CollectingTaskLogger;
    use crate::testing::{
        assert_build_error, assert_task_not_run, assert_task_skipped, assert_task_succeeded, docker_application,
        maven_application, npm_application, search_result, DescriptorFixture, InMemoryNexusClient,
        RecordingDeployer, RecordingShellExecutor, StaticCredentials, StaticGitTags, StaticProjectIdentifier,
    };
    use pretty_assertions::assert_eq;

    struct Harness {
        nexus: InMemoryNexusClient,
        shell: Arc<RecordingShellExecutor>,
        deployer: Arc<RecordingDeployer>,
        logger: Arc<CollectingTaskLogger>,
    }

    impl Harness {
        fn new(nexus: InMemoryNexusClient) -> Self {
            Self {
                nexus,
                shell: Arc::new(RecordingShellExecutor::new()),
                deployer: Arc::new(RecordingDeployer::new()),
                logger: Arc::new(CollectingTaskLogger::new()),
            }
        }

        fn collaborators(&self, identified: ProjectDescriptor, tags: &[&str]) -> Collaborators {
            Collaborators {
                nexus: Arc::new(self.nexus.clone()),
                identifier: Arc::new(StaticProjectIdentifier::new(identified)),
                shell: self.shell.clone(),
                deployer: self.deployer.clone(),
                git: Arc::new(StaticGitTags::new(tags.iter().copied())),
                credentials: Arc::new(StaticCredentials::present("ci", "token")),
            }
        }

        fn pipeline(&self, mode: BuildMode, identified: ProjectDescriptor, tags: &[&str]) -> ReleasePipeline {
            let config = ReleaseConfig::new()
                .with_build_mode(mode)
                .with_docker_registry("registry.acme.io");
            ReleasePipeline::new(config, self.collaborators(identified, tags), self.logger.clone())
        }
    }

    #[test]
    fn test_stage_layout() {
        let harness = Harness::new(InMemoryNexusClient::new());
        let pipeline = harness.pipeline(BuildMode::Full, npm_application("1.0.0"), &[]);

        assert_eq!(
            pipeline.stage().step_names(),
            vec![SELF_VALIDATION_STAGE, CONFIG_VALIDATION_STAGE, CREATE_ARTIFACT_STAGE, DEPLOY_STAGE]
        );
    }

    #[test]
    fn test_command_helpers() {
        let beta = DescriptorFixture::new(ProjectType::NpmLibrary, "1.0.0-beta").build();
        assert_eq!(publish_command(&beta).as_deref(), Some("npm publish --tag beta"));
        assert_eq!(publish_command(&maven_application("1.0.0")).as_deref(), Some("mvn deploy"));
        assert_eq!(publish_command(&docker_application("1.0.0")), None);

        let tagged = docker_application("1.0.0-beta").with_docker_pre_release_version("1.0.0-beta.3");
        assert_eq!(docker_image_ref("registry.acme.io/", &tagged), "registry.acme.io/gateway:1.0.0-beta.3");
    }

    #[tokio::test]
    async fn test_npm_application_release() {
        let harness = Harness::new(InMemoryNexusClient::new().with_npm_releases(search_result("storefront", &["1.0.0"])));
        let pipeline = harness.pipeline(BuildMode::Full, npm_application("1.1.0"), &["v1.0.0"]);

        let released = pipeline.identify_and_run().await.unwrap();

        assert_eq!(
            released.latest_nexus_versions,
            Some(LatestNexusVersions::new().with_release("1.0.0"))
        );
        assert_eq!(
            harness.shell.commands(),
            vec![
                "npm publish",
                "docker build -t registry.acme.io/storefront:1.1.0 .",
                "docker push registry.acme.io/storefront:1.1.0",
            ]
        );
        assert_eq!(harness.deployer.deployed(), vec![released]);
        assert_task_skipped(&harness.logger, "compute-docker-pre-release-version");
        assert_task_succeeded(&harness.logger, DEPLOY_TO_KUBERNETES_TASK);
    }

    #[tokio::test]
    async fn test_docker_pre_release_gets_bumped_tag() {
        let harness =
            Harness::new(InMemoryNexusClient::new().with_docker_releases(search_result("gateway", &["1.0.0-beta.2"])));
        let pipeline = harness.pipeline(BuildMode::Full, docker_application("1.0.0-beta"), &[]);

        let released = pipeline.run(docker_application("1.0.0-beta")).await.unwrap();

        assert_eq!(released.docker_pre_release_version.as_deref(), Some("1.0.0-beta.3"));
        assert_eq!(
            harness.shell.commands(),
            vec![
                "docker build -t registry.acme.io/gateway:1.0.0-beta.3 .",
                "docker push registry.acme.io/gateway:1.0.0-beta.3",
            ]
        );
        assert_task_skipped(&harness.logger, PUBLISH_PACKAGE_TASK);
        assert_task_skipped(&harness.logger, "validate-git-tag");
    }

    #[tokio::test]
    async fn test_maven_library_is_published_not_deployed() {
        let harness = Harness::new(InMemoryNexusClient::new());
        let library = DescriptorFixture::new(ProjectType::MavenLibrary, "2.0.0").build();
        let pipeline = harness.pipeline(BuildMode::Full, library.clone(), &[]);

        pipeline.run(library).await.unwrap();

        assert_eq!(harness.shell.commands(), vec!["mvn deploy"]);
        assert_task_skipped(&harness.logger, BUILD_DOCKER_IMAGE_TASK);
        assert_task_skipped(&harness.logger, DEPLOY_TO_KUBERNETES_TASK);
        assert!(harness.deployer.deployed().is_empty());
    }

    #[tokio::test]
    async fn test_version_failure_stops_before_artifacts() {
        let harness = Harness::new(InMemoryNexusClient::new().with_npm_releases(search_result("storefront", &["2.0.0"])));
        let pipeline = harness.pipeline(BuildMode::Full, npm_application("1.5.0"), &[]);

        let err = pipeline.run(npm_application("1.5.0")).await.unwrap_err();

        assert_build_error(
            &err,
            CONFIG_VALIDATION_STAGE,
            "validate-version",
            "Project version is not higher than versions in Nexus",
        );
        assert_task_not_run(&harness.logger, "validate-git-tag");
        assert!(harness.shell.commands().is_empty());
        assert!(harness.deployer.deployed().is_empty());
    }

    #[tokio::test]
    async fn test_already_tagged_release_fails() {
        let harness = Harness::new(InMemoryNexusClient::new());
        let pipeline = harness.pipeline(BuildMode::Full, npm_application("1.0.0"), &["v0.9.0", "v1.0.0"]);

        let err = pipeline.run(npm_application("1.0.0")).await.unwrap_err();
        assert_build_error(&err, CONFIG_VALIDATION_STAGE, "validate-git-tag", "Version 1.0.0 is already tagged");
    }

    #[tokio::test]
    async fn test_deploy_only_skips_history_and_artifacts() {
        let harness = Harness::new(InMemoryNexusClient::new());
        let pipeline = harness.pipeline(BuildMode::DeployOnly, maven_application("1.0.0"), &["v1.0.0"]);

        pipeline.run(maven_application("1.0.0")).await.unwrap();

        assert!(harness.nexus.calls().is_empty());
        assert!(harness.shell.commands().is_empty());
        assert_task_skipped(&harness.logger, CREATE_ARTIFACT_STAGE);
        assert_task_not_run(&harness.logger, PUBLISH_PACKAGE_TASK);
        assert_eq!(harness.deployer.deployed().len(), 1);
    }

    #[tokio::test]
    async fn test_shell_failure_becomes_build_error() {
        let harness = Harness::new(InMemoryNexusClient::new());
        let shell = Arc::new(RecordingShellExecutor::new().failing_on("docker push"));
        let mut collaborators = harness.collaborators(npm_application("1.0.0"), &[]);
        collaborators.shell = shell;
        let pipeline = ReleasePipeline::new(ReleaseConfig::new(), collaborators, harness.logger.clone());

        let err = pipeline.run(npm_application("1.0.0")).await.unwrap_err();

        assert_eq!(err.stage_name, CREATE_ARTIFACT_STAGE);
        assert_eq!(err.task_name, PUSH_DOCKER_IMAGE_TASK);
        assert!(err.message.contains("exited with status 1"));
        assert!(harness.deployer.deployed().is_empty());
    }

    #[tokio::test]
    async fn test_deployer_failure_is_reported() {
        let harness = Harness::new(InMemoryNexusClient::new());
        let mut deployer = MockKubernetesDeployer::new();
        deployer
            .expect_deploy()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("rollout timed out")));
        let mut collaborators = harness.collaborators(npm_application("1.0.0"), &[]);
        collaborators.deployer = Arc::new(deployer);
        let pipeline = ReleasePipeline::new(ReleaseConfig::new(), collaborators, harness.logger.clone());

        let err = pipeline.run(npm_application("1.0.0")).await.unwrap_err();
        assert_build_error(&err, DEPLOY_STAGE, DEPLOY_TO_KUBERNETES_TASK, "rollout timed out");
    }

    #[tokio::test]
    async fn test_identification_failure() {
        let harness = Harness::new(InMemoryNexusClient::new());
        let mut identifier = MockProjectIdentifier::new();
        identifier
            .expect_identify()
            .returning(|_| Err(anyhow::anyhow!("no package.json or pom.xml found")));
        let mut collaborators = harness.collaborators(npm_application("1.0.0"), &[]);
        collaborators.identifier = Arc::new(identifier);
        let pipeline = ReleasePipeline::new(ReleaseConfig::new(), collaborators, harness.logger.clone());

        let err = pipeline.identify_and_run().await.unwrap_err();
        assert_build_error(&err, RELEASE_STAGE, IDENTIFY_PROJECT_TASK, "no package.json or pom.xml found");
        assert!(harness.logger.is_empty());
    }

    #[tokio::test]
    async fn test_release_with_pre_release_dependency_fails_first() {
        let harness = Harness::new(InMemoryNexusClient::new());
        let descriptor = DescriptorFixture::new(ProjectType::NpmApplication, "3.0.0")
            .with_dependency("@acme/ui-kit", "2.0.0-beta.1")
            .build();
        let pipeline = harness.pipeline(BuildMode::Full, descriptor.clone(), &[]);

        let err = pipeline.run(descriptor).await.unwrap_err();

        assert_eq!(err.stage_name, SELF_VALIDATION_STAGE);
        assert!(harness.nexus.calls().is_empty());
    }
}
