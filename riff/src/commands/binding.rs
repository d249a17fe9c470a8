use crate::commands::format_empty;
use crate::commands::Delete;
use crate::commands::Describe;
use crate::commands::List;
use crate::commands::UNKNOWN;
use crate::config::Config;
use crate::errors::Error;
use crate::field_error::FieldError;
use crate::options;
use crate::options::*;
use crate::submit::create_or_render;
use crate::validation;

use async_trait::async_trait;
use clap::Args;
use clap::Subcommand;
use riff_api::bindings::BindingSpec;
use riff_api::Binding;

impl Describe for Binding {
    const NOUN: &'static str = "binding";
    const FAMILY: &'static str = "binding";

    fn columns() -> Vec<&'static str> {
	vec!["HOST", "PORT", "REF"]
    }

    fn row(&self) -> Vec<String> {
	let secret = match self.spec.secret_ref.as_str() {
	    "" => UNKNOWN,
	    name => name,
	};
	vec![
	    format_empty(&self.spec.host),
	    format_empty(&self.spec.port),
	    format!("secret:{}", secret),
	]
    }
}

/// bindings map the connection properties of a backing service to workloads
#[derive(Subcommand, Debug)]
pub enum BindingCommand {
    /// create a binding to map connection properties for a backing service to an application or function
    Create(BindingCreateOptions),
    /// table listing of bindings
    List(ListOptions),
    /// delete binding(s)
    Delete(DeleteOptions),
}

impl BindingCommand {
    pub async fn run(self, c: &Config) -> Result<(), Error> {
	match self {
	    BindingCommand::Create(opts) => options::run(c, opts).await,
	    BindingCommand::List(opts) => options::run(c, List::<Binding>::from(opts)).await,
	    BindingCommand::Delete(opts) => options::run(c, Delete::<Binding>::from(opts)).await,
	}
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct BindingCreateOptions {

    #[command(flatten)]
    pub resource: ResourceOptions,

    /// hostname of service to bind
    #[arg(long, default_value = "")]
    pub host: String,

    /// port of service to bind
    #[arg(long, default_value = "")]
    pub port: String,

    /// `name` of secret for the service
    #[arg(long)]
    pub secret_ref: Option<String>,

    /// print kubernetes resources to stdout rather than apply them to the cluster, messages normally on stdout will be sent to stderr
    #[arg(long)]
    pub dry_run: bool,
}

#[async_trait]
impl Options for BindingCreateOptions {

    fn complete(&mut self, c: &Config) {
	self.resource.complete(c);
    }

    fn validate(&self) -> FieldError {
	let mut errs = self.resource.validate();

	if !self.port.is_empty() && !matches!(self.port.parse::<u16>(), Ok(port) if port > 0) {
	    errs = errs.also(FieldError::invalid_value(&self.port, PORT_FLAG_NAME));
	}
	if let Some(secret_ref) = self.secret_ref.as_deref().filter(|s| !s.is_empty()) {
	    errs = errs.also(validation::k8s_name(secret_ref, SECRET_REF_FLAG_NAME));
	}

	errs
    }

    async fn exec(&self, c: &Config) -> Result<(), Error> {
	let mut binding = Binding::new(&self.resource.name, BindingSpec{
	    host: self.host.clone(),
	    port: self.port.clone(),
	    secret_ref: self.secret_ref.clone().unwrap_or_default(),
	});
	binding.metadata.namespace = Some(self.resource.namespace().to_string());

	create_or_render(c, Binding::NOUN, binding, self.dry_run).await?;
	Ok(())
    }

    fn is_dry_run(&self) -> bool {
	self.dry_run
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use crate::testing::TEST_NAMESPACE;

    fn create_options() -> BindingCreateOptions {
	BindingCreateOptions{
	    resource: ResourceOptions::new(TEST_NAMESPACE, "my-binding"),
	    host: String::from("my-service.default.svc.cluster.local"),
	    port: String::from("1234"),
	    secret_ref: Some(String::from("my-service-secret")),
	    dry_run: false,
	}
    }

    #[test]
    fn validate() {
	assert!(create_options().validate().is_empty());
	assert!(BindingCreateOptions{
	    resource: ResourceOptions::new(TEST_NAMESPACE, "my-binding"),
	    ..Default::default()
	}.validate().is_empty());

	let opts = BindingCreateOptions{
	    port: String::from("0"),
	    secret_ref: Some(String::from("My Secret")),
	    ..create_options()
	};
	assert_eq!(opts.validate(), FieldError::invalid_value("0", PORT_FLAG_NAME)
	    .also(FieldError::invalid_value("My Secret", SECRET_REF_FLAG_NAME)));
    }

    #[tokio::test]
    async fn create_then_list_then_delete() {
	let harness = Harness::new();

	options::run(&harness.config, create_options()).await.unwrap();
	let binding = harness.config.resources::<Binding>().get(TEST_NAMESPACE, "my-binding").await.unwrap();
	assert_eq!(binding.row(), vec!["my-service.default.svc.cluster.local", "1234", "secret:my-service-secret"]);

	options::run(&harness.config, List::<Binding>::from(ListOptions::default())).await.unwrap();
	options::run(&harness.config, Delete::<Binding>::from(DeleteOptions{
	    all: true,
	    ..Default::default()
	})).await.unwrap();

	let stdout = harness.stdout();
	let lines: Vec<&str> = stdout.lines().collect();
	assert_eq!(lines[0], "Created binding \"my-binding\"");
	assert!(lines[1].starts_with("NAME"));
	assert!(lines[2].starts_with("my-binding"));
	assert_eq!(lines[3], "Deleted binding \"my-binding\"");
	assert!(harness.config.resources::<Binding>().list(None).await.unwrap().is_empty());
    }
}
