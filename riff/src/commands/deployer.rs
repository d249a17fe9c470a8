use crate::commands::format_empty;
use crate::commands::Delete;
use crate::commands::Describe;
use crate::commands::List;
use crate::commands::Logged;
use crate::commands::Status;
use crate::commands::TailLogs;
use crate::commands::TailOptions;
use crate::config::Config;
use crate::env::Environment;
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
use k8s_openapi::api::core::v1::Container as KubeContainer;
use k8s_openapi::api::core::v1::PodSpec;
use riff_api::runtime::Build;
use riff_api::runtime::Deployer;
use riff_api::runtime::DeployerSpec;

/*
 * What a deployer runs: a riff build, by reference, or an image, plus the
 * runtime environment of its container. Shared by the core and knative
 * runtimes.
 */
#[derive(Args, Debug, Clone, Default)]
pub struct WorkloadOptions {

    /// container `image` to deploy
    #[arg(long)]
    pub image: Option<String>,

    /// `name` of application to deploy
    #[arg(long)]
    pub application_ref: Option<String>,

    /// `name` of container to deploy
    #[arg(long)]
    pub container_ref: Option<String>,

    /// `name` of function to deploy
    #[arg(long)]
    pub function_ref: Option<String>,

    /// environment `variable` defined as a key value pair separated by an equals sign, example "--env MY_VAR=my-value" (may be set multiple times)
    #[arg(long)]
    pub env: Vec<String>,

    /// environment `variable` from a config map or secret, example "--env-from MY_SECRET_VALUE=secretKeyRef:my-secret-name:key-in-secret", "--env-from MY_CONFIG_MAP_VALUE=configMapKeyRef:my-config-map-name:key-in-config-map" (may be set multiple times)
    #[arg(long)]
    pub env_from: Vec<String>,
}

impl WorkloadOptions {

    pub fn validate(&self) -> FieldError {
	validation::exactly_one_of(&[
	    (APPLICATION_REF_FLAG_NAME, validation::is_set(&self.application_ref)),
	    (CONTAINER_REF_FLAG_NAME, validation::is_set(&self.container_ref)),
	    (FUNCTION_REF_FLAG_NAME, validation::is_set(&self.function_ref)),
	    (IMAGE_FLAG_NAME, validation::is_set(&self.image)),
	])
	.also(validation::env_vars(&self.env, ENV_FLAG_NAME))
	.also(validation::env_var_froms(&self.env_from, ENV_FROM_FLAG_NAME))
    }

    fn set(value: &Option<String>) -> Option<&str> {
	value.as_deref().filter(|v| !v.is_empty())
    }

    pub fn build(&self) -> Option<Build> {
	if let Some(name) = Self::set(&self.application_ref) {
	    return Some(Build::application(name));
	}
	if let Some(name) = Self::set(&self.container_ref) {
	    return Some(Build::container(name));
	}
	Self::set(&self.function_ref).map(Build::function)
    }

    /* a single container pod, running the image when one is given */
    pub fn template(&self, binding_type: &str, binding_secrets: &[String]) -> Result<PodSpec, Error> {
	let mut template = PodSpec{
	    containers: vec![KubeContainer{
		image: Self::set(&self.image).map(String::from),
		..Default::default()
	    }],
	    ..Default::default()
	};

	Environment{
	    env: &self.env,
	    env_from: &self.env_from,
	    binding_type,
	    binding_secrets,
	}.apply(&mut template)?;

	Ok(template)
    }
}

/* the TYPE and REF columns of a deployer listing */
pub fn build_columns(build: Option<&Build>, template: Option<&PodSpec>) -> Vec<String> {
    let (kind, reference) = match build {
	Some(build) if !build.application_ref.is_empty() => ("application", build.application_ref.clone()),
	Some(build) if !build.container_ref.is_empty() => ("container", build.container_ref.clone()),
	Some(build) if !build.function_ref.is_empty() => ("function", build.function_ref.clone()),
	_ => {
	    let image = template
		.and_then(|t| t.containers.first())
		.and_then(|c| c.image.clone())
		.unwrap_or_default();
	    ("image", image)
	},
    };
    vec![kind.to_string(), format_empty(&reference)]
}

/* "name" or "profile:name", the name must be a valid secret name */
fn binding_secrets(bindings: &[String]) -> FieldError {
    bindings.iter().enumerate().fold(FieldError::empty(), |errs, (i, binding)| {
	let name = binding.split_once(':').map_or(binding.as_str(), |(_, name)| name);
	errs.also(validation::k8s_name(name, BINDING_SECRET_FLAG_NAME).via_index(i))
    })
}

impl Describe for Deployer {
    const NOUN: &'static str = "deployer";
    const FAMILY: &'static str = "core deployer";

    fn columns() -> Vec<&'static str> {
	vec!["TYPE", "REF", "SERVICE"]
    }

    fn row(&self) -> Vec<String> {
	let service = self.status.as_ref().and_then(|s| s.service_name.clone()).unwrap_or_default();
	let mut row = build_columns(self.spec.build.as_ref(), self.spec.template.as_ref());
	row.push(format_empty(&service));
	row
    }
}

impl Logged for Deployer {
    const LOG_LABEL: &'static str = "core.projectriff.io/deployer";
}

/// core runtime resources
#[derive(Subcommand, Debug)]
pub enum CoreCommand {
    /// deployers map builds or images to a kubernetes deployment and service
    #[command(subcommand)]
    Deployer(DeployerCommand),
}

impl CoreCommand {
    pub async fn run(self, c: &Config) -> Result<(), Error> {
	match self {
	    CoreCommand::Deployer(command) => command.run(c).await,
	}
    }
}

#[derive(Subcommand, Debug)]
pub enum DeployerCommand {
    /// create a deployer to deploy a workload
    Create(DeployerCreateOptions),
    /// table listing of deployers
    List(ListOptions),
    /// show deployer status
    Status(ResourceOptions),
    /// delete deployer(s)
    Delete(DeleteOptions),
    /// watch deployer logs
    Tail(TailOptions),
}

impl DeployerCommand {
    pub async fn run(self, c: &Config) -> Result<(), Error> {
	match self {
	    DeployerCommand::Create(opts) => options::run(c, opts).await,
	    DeployerCommand::List(opts) => options::run(c, List::<Deployer>::from(opts)).await,
	    DeployerCommand::Status(opts) => options::run(c, Status::<Deployer>::from(opts)).await,
	    DeployerCommand::Delete(opts) => options::run(c, Delete::<Deployer>::from(opts)).await,
	    DeployerCommand::Tail(opts) => options::run(c, TailLogs::<Deployer>::from(opts)).await,
	}
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct DeployerCreateOptions {

    #[command(flatten)]
    pub resource: ResourceOptions,

    #[command(flatten)]
    pub workload: WorkloadOptions,

    /// `type` of binding like "spring-boot"
    #[arg(long, default_value = "")]
    pub binding_type: String,

    /// `name` of binding secret to be mounted, optionally prefixed by a profile "profile:name" (may be set multiple times)
    #[arg(long)]
    pub binding_secret: Vec<String>,

    /// watch deployer logs
    #[arg(long)]
    pub tail: bool,

    /// `duration` to wait for the deployer to become ready when watching logs
    #[arg(long, default_value = WAIT_TIMEOUT_DEFAULT)]
    pub wait_timeout: String,

    /// print kubernetes resources to stdout rather than apply them to the cluster, messages normally on stdout will be sent to stderr
    #[arg(long)]
    pub dry_run: bool,
}

#[async_trait]
impl Options for DeployerCreateOptions {

    fn complete(&mut self, c: &Config) {
	self.resource.complete(c);
    }

    fn validate(&self) -> FieldError {
	self.resource.validate()
	    .also(self.workload.validate())
	    .also(binding_secrets(&self.binding_secret))
	    .also(validation::tail(self.tail, &self.wait_timeout, self.dry_run))
    }

    async fn exec(&self, c: &Config) -> Result<(), Error> {
	let mut deployer = Deployer::new(&self.resource.name, DeployerSpec{
	    build: self.workload.build(),
	    template: Some(self.workload.template(&self.binding_type, &self.binding_secret)?),
	});
	deployer.metadata.namespace = Some(self.resource.namespace().to_string());

	let deployer = create_or_render(c, Deployer::NOUN, deployer, self.dry_run).await?;
	if self.tail {
	    let tail = Tail::of(Deployer::FAMILY, Deployer::LOG_LABEL, &deployer, &self.wait_timeout);
	    wait_and_tail(c, tail).await?;
	}
	Ok(())
    }

    fn is_dry_run(&self) -> bool {
	self.dry_run
    }
}
