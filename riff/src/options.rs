use crate::config::Config;
use crate::errors::Error;
use crate::field_error::FieldError;
use crate::validation;

use async_trait::async_trait;
use clap::Args;

pub const ALL_FLAG_NAME: &str = "--all";
pub const ALL_NAMESPACES_FLAG_NAME: &str = "--all-namespaces";
pub const APPLICATION_REF_FLAG_NAME: &str = "--application-ref";
pub const BINDING_SECRET_FLAG_NAME: &str = "--binding-secret";
pub const CACHE_SIZE_FLAG_NAME: &str = "--cache-size";
pub const CONFIGURATION_REF_FLAG_NAME: &str = "--configuration-ref";
pub const CONTAINER_REF_FLAG_NAME: &str = "--container-ref";
pub const CONTENT_TYPE_FLAG_NAME: &str = "--content-type";
pub const DRY_RUN_FLAG_NAME: &str = "--dry-run";
pub const ENV_FLAG_NAME: &str = "--env";
pub const ENV_FROM_FLAG_NAME: &str = "--env-from";
pub const FUNCTION_REF_FLAG_NAME: &str = "--function-ref";
pub const GIT_REPO_FLAG_NAME: &str = "--git-repo";
pub const GIT_REVISION_FLAG_NAME: &str = "--git-revision";
pub const IMAGE_FLAG_NAME: &str = "--image";
pub const INPUT_FLAG_NAME: &str = "--input";
pub const LOCAL_PATH_FLAG_NAME: &str = "--local-path";
pub const NAMESPACE_FLAG_NAME: &str = "--namespace";
pub const OUTPUT_FLAG_NAME: &str = "--output";
pub const PORT_FLAG_NAME: &str = "--port";
pub const PROVIDER_FLAG_NAME: &str = "--provider";
pub const SECRET_REF_FLAG_NAME: &str = "--secret-ref";
pub const SERVICE_REF_FLAG_NAME: &str = "--service-ref";
pub const SINCE_FLAG_NAME: &str = "--since";
pub const SUB_PATH_FLAG_NAME: &str = "--sub-path";
pub const TAIL_FLAG_NAME: &str = "--tail";
pub const WAIT_TIMEOUT_FLAG_NAME: &str = "--wait-timeout";

pub const NAME_ARGUMENT_NAME: &str = "<name>";
pub const NAMES_ARGUMENT_NAME: &str = "<name(s)>";

pub const WAIT_TIMEOUT_DEFAULT: &str = "10m";
pub const SINCE_DEFAULT: &str = "1m";

/*
 * Name and namespace of the single resource a command acts on.
 */
#[derive(Args, Debug, Clone, Default)]
pub struct ResourceOptions {

    /// name of the resource
    #[arg(value_name = "name")]
    pub name: String,

    /// kubernetes namespace (defaulted from kube config)
    #[arg(short = 'n', long)]
    pub namespace: Option<String>,
}

impl ResourceOptions {

    pub fn new(namespace: &str, name: &str) -> Self {
	Self{
	    name: name.to_string(),
	    namespace: Some(namespace.to_string()),
	}
    }

    pub fn namespace(&self) -> &str {
	self.namespace.as_deref().unwrap_or_default()
    }

    pub fn complete(&mut self, c: &Config) {
	if self.namespace.is_none() {
	    self.namespace = Some(c.default_namespace.clone());
	}
    }

    pub fn validate(&self) -> FieldError {
	let mut errs = validation::required(self.namespace(), NAMESPACE_FLAG_NAME);

	errs = match self.name.as_str() {
	    "" => errs.also(FieldError::missing_field(&[NAME_ARGUMENT_NAME])),
	    name => errs.also(validation::k8s_name(name, NAME_ARGUMENT_NAME)),
	};

	errs
    }
}

/*
 * Scope of a list: one namespace, or every namespace.
 */
#[derive(Args, Debug, Clone, Default)]
pub struct ListOptions {

    /// kubernetes namespace (defaulted from kube config)
    #[arg(short = 'n', long)]
    pub namespace: Option<String>,

    /// use all kubernetes namespaces
    #[arg(long)]
    pub all_namespaces: bool,
}

impl ListOptions {

    pub fn namespace(&self) -> Option<&str> {
	match self.all_namespaces {
	    true => None,
	    false => self.namespace.as_deref(),
	}
    }

    pub fn complete(&mut self, c: &Config) {
	if self.namespace.is_none() && !self.all_namespaces {
	    self.namespace = Some(c.default_namespace.clone());
	}
    }

    pub fn validate(&self) -> FieldError {
	validation::exactly_one_of(&[
	    (NAMESPACE_FLAG_NAME, validation::is_set(&self.namespace)),
	    (ALL_NAMESPACES_FLAG_NAME, self.all_namespaces),
	])
    }
}

/*
 * Targets of a delete: named resources, or all of a kind in the namespace.
 */
#[derive(Args, Debug, Clone, Default)]
pub struct DeleteOptions {

    /// names of the resources to delete
    #[arg(value_name = "name(s)")]
    pub names: Vec<String>,

    /// kubernetes namespace (defaulted from kube config)
    #[arg(short = 'n', long)]
    pub namespace: Option<String>,

    /// delete all of the kind within the namespace
    #[arg(long)]
    pub all: bool,
}

impl DeleteOptions {

    pub fn namespace(&self) -> &str {
	self.namespace.as_deref().unwrap_or_default()
    }

    pub fn complete(&mut self, c: &Config) {
	if self.namespace.is_none() {
	    self.namespace = Some(c.default_namespace.clone());
	}
    }

    pub fn validate(&self) -> FieldError {
	let mut errs = validation::required(self.namespace(), NAMESPACE_FLAG_NAME);

	errs = errs.also(validation::exactly_one_of(&[
	    (NAMES_ARGUMENT_NAME, !self.names.is_empty()),
	    (ALL_FLAG_NAME, self.all),
	]));
	errs.also(validation::k8s_names(&self.names, NAMES_ARGUMENT_NAME))
    }
}

/*
 * Every command is a set of options that is completed from the config,
 * validated as a whole and then executed.
 */
#[async_trait]
pub trait Options: Send + Sync {

    /* fill in defaults that depend on the environment, like the namespace */
    fn complete(&mut self, _c: &Config) {}

    fn validate(&self) -> FieldError;

    async fn exec(&self, c: &Config) -> Result<(), Error>;

    fn is_dry_run(&self) -> bool {
	false
    }
}

/*
 * Drives a command. Every validation failure is reported at once and
 * nothing is executed; dry runs execute against a config whose messages
 * are kept off stdout.
 */
pub async fn run<O: Options>(c: &Config, mut opts: O) -> Result<(), Error> {
    opts.complete(c);

    let errs = opts.validate();
    if !errs.is_empty() {
	log::debug!("invalid options: {:?}", errs);
	return Err(Error::Validation(errs));
    }

    if opts.is_dry_run() {
	return opts.exec(&c.for_dry_run()).await;
    }
    opts.exec(c).await
}
