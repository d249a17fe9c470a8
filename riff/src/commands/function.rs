use crate::commands::format_empty;
use crate::commands::local_build::LocalBuild;
use crate::commands::local_build::FUNCTION_BUILDER_KEY;
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
use riff_api::build::FunctionSpec;
use riff_api::build::GitSource;
use riff_api::build::Source;
use riff_api::build::DEFAULT_IMAGE_PLACEHOLDER;
use riff_api::Function;
use std::collections::BTreeMap;

/* build time environment understood by the function buildpacks */
const RIFF_ARTIFACT: &str = "RIFF_ARTIFACT";
const RIFF_HANDLER: &str = "RIFF_HANDLER";
const RIFF_OVERRIDE: &str = "RIFF_OVERRIDE";

impl Describe for Function {
    const NOUN: &'static str = "function";
    const FAMILY: &'static str = "function";

    fn columns() -> Vec<&'static str> {
	vec!["LATEST IMAGE", "ARTIFACT", "HANDLER", "INVOKER"]
    }

    fn row(&self) -> Vec<String> {
	let latest = self.status.as_ref().and_then(|s| s.latest_image.clone()).unwrap_or_default();
	vec![
	    format_empty(&latest),
	    format_empty(&self.spec.artifact),
	    format_empty(&self.spec.handler),
	    format_empty(&self.spec.invoker),
	]
    }
}

impl Logged for Function {
    const LOG_LABEL: &'static str = "build.projectriff.io/function";
}

/// functions built from source using function buildpacks
#[derive(Subcommand, Debug)]
pub enum FunctionCommand {
    /// create a function from source
    Create(FunctionCreateOptions),
    /// table listing of functions
    List(ListOptions),
    /// show function status
    Status(ResourceOptions),
    /// delete function(s)
    Delete(DeleteOptions),
    /// watch build logs
    Tail(TailOptions),
}

impl FunctionCommand {
    pub async fn run(self, c: &Config) -> Result<(), Error> {
	match self {
	    FunctionCommand::Create(opts) => options::run(c, opts).await,
	    FunctionCommand::List(opts) => options::run(c, List::<Function>::from(opts)).await,
	    FunctionCommand::Status(opts) => options::run(c, Status::<Function>::from(opts)).await,
	    FunctionCommand::Delete(opts) => options::run(c, Delete::<Function>::from(opts)).await,
	    FunctionCommand::Tail(opts) => options::run(c, TailLogs::<Function>::from(opts)).await,
	}
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct FunctionCreateOptions {

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

    /// `file` containing the function within the build workspace (detected if not set)
    #[arg(long)]
    pub artifact: Option<String>,

    /// `name` of method or class to invoke, depends on the invoker (detected if not set)
    #[arg(long)]
    pub handler: Option<String>,

    /// language runtime invoker `name` (detected if not set)
    #[arg(long)]
    pub invoker: Option<String>,

    /// watch build logs
    #[arg(long)]
    pub tail: bool,

    /// `duration` to wait for the function to become ready when watching logs
    #[arg(long, default_value = WAIT_TIMEOUT_DEFAULT)]
    pub wait_timeout: String,

    /// print kubernetes resources to stdout rather than apply them to the cluster, messages normally on stdout will be sent to stderr
    #[arg(long)]
    pub dry_run: bool,
}

impl FunctionCreateOptions {

    fn function(&self) -> Function {
	let mut function = Function::new(&self.resource.name, FunctionSpec{
	    image: self.image.clone(),
	    cache_size: self.cache_size.clone().filter(|size| !size.is_empty()).map(Quantity),
	    source: None,
	    artifact: self.artifact.clone().unwrap_or_default(),
	    handler: self.handler.clone().unwrap_or_default(),
	    invoker: self.invoker.clone().unwrap_or_default(),
	});
	function.metadata.namespace = Some(self.resource.namespace().to_string());

	if let Some(url) = self.git_repo.clone().filter(|url| !url.is_empty()) {
	    function.spec.source = Some(Source{
		git: Some(GitSource{ url, revision: self.git_revision.clone() }),
		sub_path: self.sub_path.clone().unwrap_or_default(),
	    });
	}
	function
    }

    /* local builds get the function settings through the build environment */
    fn build_env(&self) -> BTreeMap<String, String> {
	[(RIFF_ARTIFACT, &self.artifact), (RIFF_HANDLER, &self.handler), (RIFF_OVERRIDE, &self.invoker)]
	    .into_iter()
	    .filter_map(|(key, value)| value.clone().filter(|v| !v.is_empty()).map(|v| (key.to_string(), v)))
	    .collect()
    }
}

#[async_trait]
impl Options for FunctionCreateOptions {

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
	let function = self.function();

	if let Some(path) = self.local_path.as_deref().filter(|path| !path.is_empty()) {
	    LocalBuild{
		namespace: self.resource.namespace(),
		name: &self.resource.name,
		image: &self.image,
		path,
		builder_key: FUNCTION_BUILDER_KEY,
		env: self.build_env(),
	    }.run(c).await?;
	}

	let function = create_or_render(c, Function::NOUN, function, self.dry_run).await?;
	if self.tail {
	    let tail = Tail::of(Function::FAMILY, Function::LOG_LABEL, &function, &self.wait_timeout);
	    wait_and_tail(c, tail).await?;
	}
	Ok(())
    }

    fn is_dry_run(&self) -> bool {
	self.dry_run
    }
}
