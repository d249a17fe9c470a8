use crate::commands::deployer::build_columns;
use crate::commands::deployer::WorkloadOptions;
use crate::commands::format_empty;
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
use riff_api::knative::Adapter;
use riff_api::knative::AdapterSpec;
use riff_api::knative::AdapterTarget;
use riff_api::knative::Build;
use riff_api::knative::Deployer;
use riff_api::knative::DeployerSpec;

impl Describe for Deployer {
    const NOUN: &'static str = "deployer";
    const FAMILY: &'static str = "knative deployer";

    fn columns() -> Vec<&'static str> {
	vec!["TYPE", "REF", "URL"]
    }

    fn row(&self) -> Vec<String> {
	let url = self.status.as_ref().and_then(|s| s.url.clone()).unwrap_or_default();
	let mut row = build_columns(self.spec.build.as_ref(), self.spec.template.as_ref());
	row.push(format_empty(&url));
	row
    }
}

impl Logged for Deployer {
    const LOG_LABEL: &'static str = "knative.projectriff.io/deployer";
}

impl Describe for Adapter {
    const NOUN: &'static str = "adapter";
    const FAMILY: &'static str = "knative adapter";

    fn columns() -> Vec<&'static str> {
	vec!["TYPE", "REF", "TARGET"]
    }

    fn row(&self) -> Vec<String> {
	let mut row = build_columns(Some(&self.spec.build), None);
	let target = &self.spec.target;
	row.push(match (target.service_ref.as_str(), target.configuration_ref.as_str()) {
	    ("", "") => format_empty(""),
	    ("", configuration) => format!("configuration:{}", configuration),
	    (service, _) => format!("service:{}", service),
	});
	row
    }
}

/// knative runtime resources
#[derive(Subcommand, Debug)]
pub enum KnativeCommand {
    /// deployers map builds or images to a knative configuration and route
    #[command(subcommand)]
    Deployer(KnativeDeployerCommand),
    /// adapters push the latest built image into an existing knative service or configuration
    #[command(subcommand)]
    Adapter(AdapterCommand),
}

impl KnativeCommand {
    pub async fn run(self, c: &Config) -> Result<(), Error> {
	match self {
	    KnativeCommand::Deployer(command) => command.run(c).await,
	    KnativeCommand::Adapter(command) => command.run(c).await,
	}
    }
}

#[derive(Subcommand, Debug)]
pub enum KnativeDeployerCommand {
    /// create a deployer to deploy a workload on knative
    Create(KnativeDeployerCreateOptions),
    /// table listing of deployers
    List(ListOptions),
    /// show knative deployer status
    Status(ResourceOptions),
    /// delete deployer(s)
    Delete(DeleteOptions),
    /// watch deployer logs
    Tail(TailOptions),
}

impl KnativeDeployerCommand {
    pub async fn run(self, c: &Config) -> Result<(), Error> {
	match self {
	    KnativeDeployerCommand::Create(opts) => options::run(c, opts).await,
	    KnativeDeployerCommand::List(opts) => options::run(c, List::<Deployer>::from(opts)).await,
	    KnativeDeployerCommand::Status(opts) => options::run(c, Status::<Deployer>::from(opts)).await,
	    KnativeDeployerCommand::Delete(opts) => options::run(c, Delete::<Deployer>::from(opts)).await,
	    KnativeDeployerCommand::Tail(opts) => options::run(c, TailLogs::<Deployer>::from(opts)).await,
	}
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct KnativeDeployerCreateOptions {

    #[command(flatten)]
    pub resource: ResourceOptions,

    #[command(flatten)]
    pub workload: WorkloadOptions,

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
impl Options for KnativeDeployerCreateOptions {

    fn complete(&mut self, c: &Config) {
	self.resource.complete(c);
    }

    fn validate(&self) -> FieldError {
	self.resource.validate()
	    .also(self.workload.validate())
	    .also(validation::tail(self.tail, &self.wait_timeout, self.dry_run))
    }

    async fn exec(&self, c: &Config) -> Result<(), Error> {
	let mut deployer = Deployer::new(&self.resource.name, DeployerSpec{
	    build: self.workload.build(),
	    template: Some(self.workload.template("", &[])?),
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

#[derive(Subcommand, Debug)]
pub enum AdapterCommand {
    /// create an adapter to a knative service or configuration
    Create(AdapterCreateOptions),
    /// table listing of adapters
    List(ListOptions),
    /// show knative adapter status
    Status(ResourceOptions),
    /// delete adapter(s)
    Delete(DeleteOptions),
}

impl AdapterCommand {
    pub async fn run(self, c: &Config) -> Result<(), Error> {
	match self {
	    AdapterCommand::Create(opts) => options::run(c, opts).await,
	    AdapterCommand::List(opts) => options::run(c, List::<Adapter>::from(opts)).await,
	    AdapterCommand::Status(opts) => options::run(c, Status::<Adapter>::from(opts)).await,
	    AdapterCommand::Delete(opts) => options::run(c, Delete::<Adapter>::from(opts)).await,
	}
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct AdapterCreateOptions {

    #[command(flatten)]
    pub resource: ResourceOptions,

    /// `name` of application to deploy
    #[arg(long)]
    pub application_ref: Option<String>,

    /// `name` of container to deploy
    #[arg(long)]
    pub container_ref: Option<String>,

    /// `name` of function to deploy
    #[arg(long)]
    pub function_ref: Option<String>,

    /// `name` of knative service to update
    #[arg(long)]
    pub service_ref: Option<String>,

    /// `name` of knative configuration to update
    #[arg(long)]
    pub configuration_ref: Option<String>,

    /// print kubernetes resources to stdout rather than apply them to the cluster, messages normally on stdout will be sent to stderr
    #[arg(long)]
    pub dry_run: bool,
}

#[async_trait]
impl Options for AdapterCreateOptions {

    fn complete(&mut self, c: &Config) {
	self.resource.complete(c);
    }

    fn validate(&self) -> FieldError {
	self.resource.validate()
	    .also(validation::exactly_one_of(&[
		(APPLICATION_REF_FLAG_NAME, validation::is_set(&self.application_ref)),
		(CONTAINER_REF_FLAG_NAME, validation::is_set(&self.container_ref)),
		(FUNCTION_REF_FLAG_NAME, validation::is_set(&self.function_ref)),
	    ]))
	    .also(validation::exactly_one_of(&[
		(SERVICE_REF_FLAG_NAME, validation::is_set(&self.service_ref)),
		(CONFIGURATION_REF_FLAG_NAME, validation::is_set(&self.configuration_ref)),
	    ]))
    }

    async fn exec(&self, c: &Config) -> Result<(), Error> {
	let mut adapter = Adapter::new(&self.resource.name, AdapterSpec{
	    build: Build{
		application_ref: self.application_ref.clone().unwrap_or_default(),
		container_ref: self.container_ref.clone().unwrap_or_default(),
		function_ref: self.function_ref.clone().unwrap_or_default(),
	    },
	    target: AdapterTarget{
		service_ref: self.service_ref.clone().unwrap_or_default(),
		configuration_ref: self.configuration_ref.clone().unwrap_or_default(),
	    },
	});
	adapter.metadata.namespace = Some(self.resource.namespace().to_string());

	create_or_render(c, Adapter::NOUN, adapter, self.dry_run).await?;
	Ok(())
    }

    fn is_dry_run(&self) -> bool {
	self.dry_run
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::k8s::fake::FakeLogs;
    use crate::k8s::fake::FakeWaiter;
    use crate::testing::Harness;
    use crate::testing::TEST_NAMESPACE;

    use std::time::Duration;

    fn deployer_options() -> KnativeDeployerCreateOptions {
	KnativeDeployerCreateOptions{
	    resource: ResourceOptions::new(TEST_NAMESPACE, "my-deployer"),
	    workload: WorkloadOptions{
		function_ref: Some(String::from("square")),
		env: vec![String::from("SPRING_PROFILES_ACTIVE=prod")],
		..Default::default()
	    },
	    wait_timeout: String::from(WAIT_TIMEOUT_DEFAULT),
	    ..Default::default()
	}
    }

    fn adapter_options() -> AdapterCreateOptions {
	AdapterCreateOptions{
	    resource: ResourceOptions::new(TEST_NAMESPACE, "my-adapter"),
	    application_ref: Some(String::from("petclinic")),
	    service_ref: Some(String::from("petclinic-svc")),
	    ..Default::default()
	}
    }

    #[tokio::test]
    async fn create_deployer() {
	let harness = Harness::new();

	options::run(&harness.config, deployer_options()).await.unwrap();

	let deployer = harness.config.resources::<Deployer>().get(TEST_NAMESPACE, "my-deployer").await.unwrap();
	let env = deployer.spec.template.unwrap().containers[0].env.clone().unwrap();
	assert_eq!(deployer.spec.build, Some(Build::function("square")));
	assert_eq!(env[0].value.as_deref(), Some("prod"));
	assert_eq!(harness.stdout(), "Created deployer \"my-deployer\"\n");
    }

    #[tokio::test]
    async fn create_deployer_and_tail_until_ready() {
	let harness = Harness::with(FakeWaiter::Ready(Duration::from_millis(20)), FakeLogs::new(&[]));

	options::run(&harness.config, KnativeDeployerCreateOptions{ tail: true, ..deployer_options() }).await.unwrap();

	assert_eq!(harness.stdout(), "Created deployer \"my-deployer\"\n");
	assert_eq!(harness.logs.requests()[0].0.labels, "knative.projectriff.io/deployer=my-deployer");
    }

    #[test]
    fn validate_adapter() {
	assert!(adapter_options().validate().is_empty());

	let opts = AdapterCreateOptions{
	    function_ref: Some(String::from("square")),
	    configuration_ref: Some(String::from("square-config")),
	    ..adapter_options()
	};
	assert_eq!(opts.validate(), FieldError::multiple_one_of(&[APPLICATION_REF_FLAG_NAME, FUNCTION_REF_FLAG_NAME])
	    .also(FieldError::multiple_one_of(&[SERVICE_REF_FLAG_NAME, CONFIGURATION_REF_FLAG_NAME])));

	let opts = AdapterCreateOptions{
	    resource: ResourceOptions::new(TEST_NAMESPACE, "my-adapter"),
	    ..Default::default()
	};
	assert_eq!(opts.validate(), FieldError::missing_one_of(&[APPLICATION_REF_FLAG_NAME, CONTAINER_REF_FLAG_NAME, FUNCTION_REF_FLAG_NAME])
	    .also(FieldError::missing_one_of(&[SERVICE_REF_FLAG_NAME, CONFIGURATION_REF_FLAG_NAME])));

	/* an empty flag value counts as unset */
	let opts = AdapterCreateOptions{
	    container_ref: Some(String::new()),
	    ..adapter_options()
	};
	assert!(opts.validate().is_empty());
    }

    #[tokio::test]
    async fn create_adapter() {
	let harness = Harness::new();

	options::run(&harness.config, adapter_options()).await.unwrap();

	let adapter = harness.config.resources::<Adapter>().get(TEST_NAMESPACE, "my-adapter").await.unwrap();
	assert_eq!(adapter.spec.build, Build::application("petclinic"));
	assert_eq!(adapter.spec.target.service_ref, "petclinic-svc");
	assert_eq!(adapter.row(), vec!["application", "petclinic", "service:petclinic-svc"]);
	assert_eq!(harness.stdout(), "Created adapter \"my-adapter\"\n");
    }

    #[tokio::test]
    async fn dry_run_adapter() {
	let harness = Harness::new();

	options::run(&harness.config, AdapterCreateOptions{ dry_run: true, ..adapter_options() }).await.unwrap();

	assert!(harness.config.resources::<Adapter>().list(None).await.unwrap().is_empty());
	assert!(harness.stdout().contains("kind: Adapter\n"));
	assert_eq!(harness.stderr(), "Created adapter \"my-adapter\"\n");
    }
}
