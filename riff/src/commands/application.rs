use crate::commands::format_empty;
use crate::commands::local_build::LocalBuild;
use crate::commands::local_build::APPLICATION_BUILDER_KEY;
use crate::commands::Delete;
use crate::commands::Describe;
use crate::commands::List;
use crate::commands::Logged;
use crate::commands::Status;
use crate::commands::TailLogs;
use crate::commands::TailOptions;
use crate::config::Config;
use crate::errors::Error;
use crate::field_error::FieldError;
use crate::options;
use crate::options::*;
use crate::submit::create_or_render;
use crate::tail::wait_and_tail;
use crate::tail::Tail;
use crate::validation;

use async_trait::async_trait;
use clap::Args;
use clap::Subcommand;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use riff_api::build::ApplicationSpec;
use riff_api::build::GitSource;
use riff_api::build::Source;
use riff_api::build::DEFAULT_IMAGE_PLACEHOLDER;
use riff_api::Application;
use std::collections::BTreeMap;

impl Describe for Application {
    const NOUN: &'static str = "application";
    const FAMILY: &'static str = "application";

    fn columns() -> Vec<&'static str> {
	vec!["LATEST IMAGE"]
    }

    fn row(&self) -> Vec<String> {
	let latest = self.status.as_ref().and_then(|s| s.latest_image.clone()).unwrap_or_default();
	vec![format_empty(&latest)]
    }
}

impl Logged for Application {
    const LOG_LABEL: &'static str = "build.projectriff.io/application";
}

/// applications built from source using application buildpacks
#[derive(Subcommand, Debug)]
pub enum ApplicationCommand {
    /// create an application from source
    Create(ApplicationCreateOptions),
    /// table listing of applications
    List(ListOptions),
    /// show application status
    Status(ResourceOptions),
    /// delete application(s)
    Delete(DeleteOptions),
    /// watch build logs
    Tail(TailOptions),
}

impl ApplicationCommand {
    pub async fn run(self, c: &Config) -> Result<(), Error> {
	match self {
	    ApplicationCommand::Create(opts) => options::run(c, opts).await,
	    ApplicationCommand::List(opts) => options::run(c, List::<Application>::from(opts)).await,
	    ApplicationCommand::Status(opts) => options::run(c, Status::<Application>::from(opts)).await,
	    ApplicationCommand::Delete(opts) => options::run(c, Delete::<Application>::from(opts)).await,
	    ApplicationCommand::Tail(opts) => options::run(c, TailLogs::<Application>::from(opts)).await,
	}
    }
}

/*
 * Source is either a git repository, built in the cluster, or a local
 * directory built on this machine and pushed to the image repository.
 */
#[derive(Args, Debug, Clone, Default)]
pub struct ApplicationCreateOptions {

    #[command(flatten)]
    pub resource: ResourceOptions,

    /// `repository` where the built images are pushed
    #[arg(long, default_value = DEFAULT_IMAGE_PLACEHOLDER)]
    pub image: String,

    /// `size` of persistent volume to cache resources between builds
    #[arg(long)]
    pub cache_size: Option<String>,

    /// path to `directory` containing source code on the local machine
    #[arg(long)]
    pub local_path: Option<String>,

    /// git `url` to remote source code
    #[arg(long)]
    pub git_repo: Option<String>,

    /// `refspec` within the git repo to checkout
    #[arg(long, default_value = "master")]
    pub git_revision: String,

    /// path to `directory` within the git repo to checkout
    #[arg(long)]
    pub sub_path: Option<String>,

    /// watch build logs
    #[arg(long)]
    pub tail: bool,

    /// `duration` to wait for the application to become ready when watching logs
    #[arg(long, default_value = WAIT_TIMEOUT_DEFAULT)]
    pub wait_timeout: String,

    /// print kubernetes resources to stdout rather than apply them to the cluster, messages normally on stdout will be sent to stderr
    #[arg(long)]
    pub dry_run: bool,
}

impl ApplicationCreateOptions {

    fn application(&self) -> Application {
	let mut application = Application::new(&self.resource.name, ApplicationSpec{
	    image: self.image.clone(),
	    cache_size: self.cache_size.clone().filter(|size| !size.is_empty()).map(Quantity),
	    source: None,
	});
	application.metadata.namespace = Some(self.resource.namespace().to_string());

	if let Some(url) = self.git_repo.clone().filter(|url| !url.is_empty()) {
	    application.spec.source = Some(Source{
		git: Some(GitSource{ url, revision: self.git_revision.clone() }),
		sub_path: self.sub_path.clone().unwrap_or_default(),
	    });
	}
	application
    }
}

#[async_trait]
impl Options for ApplicationCreateOptions {

    fn complete(&mut self, c: &Config) {
	self.resource.complete(c);
    }

    fn validate(&self) -> FieldError {
	let mut errs = self.resource.validate();
	let local_path = validation::is_set(&self.local_path);
	let git_repo = validation::is_set(&self.git_repo);

	errs = errs.also(validation::required(&self.image, IMAGE_FLAG_NAME));
	if let Some(size) = self.cache_size.as_deref().filter(|size| !size.is_empty()) {
	    errs = errs.also(validation::quantity(size, CACHE_SIZE_FLAG_NAME));
	}

	errs = errs.also(validation::exactly_one_of(&[
	    (GIT_REPO_FLAG_NAME, git_repo),
	    (LOCAL_PATH_FLAG_NAME, local_path),
	]));
	if git_repo {
	    errs = errs.also(validation::required(&self.git_revision, GIT_REVISION_FLAG_NAME));
	}
	errs = errs.also(validation::disallowed(local_path, validation::is_set(&self.sub_path), SUB_PATH_FLAG_NAME));
	errs = errs.also(validation::disallowed(local_path, validation::is_set(&self.cache_size), CACHE_SIZE_FLAG_NAME));

	errs = errs.also(validation::tail(self.tail, &self.wait_timeout, self.dry_run));
	errs.also(validation::unsupported_on(std::env::consts::OS, "windows", local_path, LOCAL_PATH_FLAG_NAME))
    }

    async fn exec(&self, c: &Config) -> Result<(), Error> {
	let application = self.application();

	if let Some(path) = self.local_path.as_deref().filter(|path| !path.is_empty()) {
	    LocalBuild{
		namespace: self.resource.namespace(),
		name: &self.resource.name,
		image: &self.image,
		path,
		builder_key: APPLICATION_BUILDER_KEY,
		env: BTreeMap::new(),
	    }.run(c).await?;
	}

	let application = create_or_render(c, Application::NOUN, application, self.dry_run).await?;
	if self.tail {
	    let tail = Tail::of(Application::FAMILY, Application::LOG_LABEL, &application, &self.wait_timeout);
	    wait_and_tail(c, tail).await?;
	}
	Ok(())
    }

    fn is_dry_run(&self) -> bool {
	self.dry_run
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::local_build::*;
    use crate::k8s::fake::FakeLogs;
    use crate::k8s::fake::FakeWaiter;
    use crate::testing::Harness;
    use crate::testing::TEST_NAMESPACE;

    use kube::api::ApiResource;
    use std::time::Duration;

    fn git_options() -> ApplicationCreateOptions {
	ApplicationCreateOptions{
	    resource: ResourceOptions::new(TEST_NAMESPACE, "my-application"),
	    image: String::from("example.com/repo:tag"),
	    git_repo: Some(String::from("https://example.com/repo.git")),
	    git_revision: String::from("master"),
	    wait_timeout: String::from(WAIT_TIMEOUT_DEFAULT),
	    ..Default::default()
	}
    }

    fn local_options() -> ApplicationCreateOptions {
	ApplicationCreateOptions{
	    image: String::from(DEFAULT_IMAGE_PLACEHOLDER),
	    git_repo: None,
	    local_path: Some(String::from("./src")),
	    ..git_options()
	}
    }

    fn applications(harness: &Harness) -> Vec<kube::api::DynamicObject> {
	harness.cluster.objects(&ApiResource::erase::<Application>(&()))
    }

    #[test]
    fn validate() {
	let cases: Vec<(&str, ApplicationCreateOptions, FieldError)> = vec![
	    ("git source", git_options(), FieldError::empty()),
	    ("local source", local_options(), FieldError::empty()),
	    ("git source with cache", ApplicationCreateOptions{ cache_size: Some(String::from("8Gi")), sub_path: Some(String::from("./app")), ..git_options() }, FieldError::empty()),
	    ("no source", ApplicationCreateOptions{ git_repo: None, ..git_options() },
		FieldError::missing_one_of(&[GIT_REPO_FLAG_NAME, LOCAL_PATH_FLAG_NAME])),
	    ("both sources", ApplicationCreateOptions{ local_path: Some(String::from("./src")), ..git_options() },
		FieldError::multiple_one_of(&[GIT_REPO_FLAG_NAME, LOCAL_PATH_FLAG_NAME])),
	    ("no image", ApplicationCreateOptions{ image: String::new(), ..git_options() },
		FieldError::missing_field(&[IMAGE_FLAG_NAME])),
	    ("git revision required", ApplicationCreateOptions{ git_revision: String::new(), ..git_options() },
		FieldError::missing_field(&[GIT_REVISION_FLAG_NAME])),
	    ("invalid cache size", ApplicationCreateOptions{ cache_size: Some(String::from("X")), ..git_options() },
		FieldError::invalid_value("X", CACHE_SIZE_FLAG_NAME)),
	    ("sub path with local source", ApplicationCreateOptions{ sub_path: Some(String::from("./app")), ..local_options() },
		FieldError::disallowed_fields(&[SUB_PATH_FLAG_NAME])),
	    ("cache size with local source", ApplicationCreateOptions{ cache_size: Some(String::from("8Gi")), ..local_options() },
		FieldError::disallowed_fields(&[CACHE_SIZE_FLAG_NAME])),
	    ("tail", ApplicationCreateOptions{ tail: true, ..git_options() }, FieldError::empty()),
	    ("tail without timeout", ApplicationCreateOptions{ tail: true, wait_timeout: String::new(), ..git_options() },
		FieldError::missing_field(&[WAIT_TIMEOUT_FLAG_NAME])),
	    ("tail with invalid timeout", ApplicationCreateOptions{ tail: true, wait_timeout: String::from("d"), ..git_options() },
		FieldError::invalid_value("d", WAIT_TIMEOUT_FLAG_NAME)),
	    ("dry run with tail", ApplicationCreateOptions{ tail: true, dry_run: true, ..git_options() },
		FieldError::multiple_one_of(&[DRY_RUN_FLAG_NAME, TAIL_FLAG_NAME])),
	];

	for (name, opts, expected) in cases {
	    assert_eq!(opts.validate(), expected, "{}", name);
	}
    }

    #[tokio::test]
    async fn create_from_git() {
	let harness = Harness::new();
	let opts = ApplicationCreateOptions{ cache_size: Some(String::from("8Gi")), sub_path: Some(String::from("./app")), ..git_options() };

	options::run(&harness.config, opts).await.unwrap();

	let created: Application = crate::k8s::from_dynamic(applications(&harness).remove(0)).unwrap();
	let source = created.spec.source.unwrap();
	assert_eq!(source.git, Some(GitSource{ url: String::from("https://example.com/repo.git"), revision: String::from("master") }));
	assert_eq!(source.sub_path, "./app");
	assert_eq!(created.spec.cache_size, Some(Quantity(String::from("8Gi"))));
	assert_eq!(harness.stdout(), "Created application \"my-application\"\n");
	assert!(harness.builder.builds().is_empty());
    }

    #[tokio::test]
    async fn create_from_local_path() {
	let harness = Harness::new();
	harness.cluster.add_config_map(TEST_NAMESPACE, RIFF_BUILD_CONFIG_MAP, &[(DEFAULT_IMAGE_PREFIX_KEY, "registry.example.com")]);
	harness.cluster.add_config_map(BUILDERS_NAMESPACE, BUILDERS_CONFIG_MAP, &[(APPLICATION_BUILDER_KEY, "projectriff/builder:0.2")]);

	options::run(&harness.config, local_options()).await.unwrap();

	let builds = harness.builder.builds();
	assert_eq!(builds.len(), 1);
	assert_eq!(builds[0].image, "registry.example.com/my-application");
	assert_eq!(builds[0].builder, "projectriff/builder:0.2");
	assert_eq!(builds[0].app_path.to_str(), Some("./src"));
	assert!(builds[0].publish);

	let created: Application = crate::k8s::from_dynamic(applications(&harness).remove(0)).unwrap();
	assert_eq!(created.spec.image, DEFAULT_IMAGE_PLACEHOLDER);
	assert!(created.spec.source.is_none());
    }

    #[tokio::test]
    async fn local_path_needs_a_builder() {
	let harness = Harness::new();
	harness.cluster.add_config_map(TEST_NAMESPACE, RIFF_BUILD_CONFIG_MAP, &[(DEFAULT_IMAGE_PREFIX_KEY, "registry.example.com")]);
	harness.cluster.add_config_map(BUILDERS_NAMESPACE, BUILDERS_CONFIG_MAP, &[]);

	let err = options::run(&harness.config, local_options()).await.unwrap_err();

	assert_eq!(err.to_string(), "unknown builder for \"riff-application\"");
	assert!(applications(&harness).is_empty());
	assert!(harness.builder.builds().is_empty());
	assert_eq!(harness.stdout(), "");
    }

    #[tokio::test]
    async fn local_path_needs_the_build_config() {
	let harness = Harness::new();

	let err = options::run(&harness.config, local_options()).await.unwrap_err();

	assert!(err.is_not_found());
	assert!(applications(&harness).is_empty());
    }

    #[tokio::test]
    async fn dry_run() {
	let harness = Harness::new();

	options::run(&harness.config, ApplicationCreateOptions{ dry_run: true, ..git_options() }).await.unwrap();

	assert!(applications(&harness).is_empty());
	assert!(harness.stdout().starts_with("---\napiVersion: build.projectriff.io/v1alpha1\nkind: Application\n"));
	assert_eq!(harness.stderr(), "Created application \"my-application\"\n");
    }

    #[tokio::test]
    async fn tail_until_ready() {
	let harness = Harness::with(FakeWaiter::Ready(Duration::from_millis(1)), FakeLogs::new(&["build started"]));

	options::run(&harness.config, ApplicationCreateOptions{ tail: true, ..git_options() }).await.unwrap();

	assert_eq!(harness.stdout(), "Created application \"my-application\"\nbuild started\n");
	let requests = harness.logs.requests();
	assert_eq!(requests[0].0.labels, "build.projectriff.io/application=my-application");
    }
}
