use crate::commands::format_empty;
use crate::commands::Delete;
use crate::commands::Describe;
use crate::commands::List;
use crate::commands::Status;
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
use riff_api::build::ContainerSpec;
use riff_api::Container;

impl Describe for Container {
    const NOUN: &'static str = "container";
    const FAMILY: &'static str = "container";

    fn columns() -> Vec<&'static str> {
	vec!["LATEST IMAGE"]
    }

    fn row(&self) -> Vec<String> {
	let latest = self.status.as_ref().and_then(|s| s.latest_image.clone()).unwrap_or_default();
	vec![format_empty(&latest)]
    }
}

/// containers resolving the latest image from a repository
#[derive(Subcommand, Debug)]
pub enum ContainerCommand {
    /// watch for new images in a repository
    Create(ContainerCreateOptions),
    /// table listing of containers
    List(ListOptions),
    /// show container status
    Status(ResourceOptions),
    /// delete container(s)
    Delete(DeleteOptions),
}

impl ContainerCommand {
    pub async fn run(self, c: &Config) -> Result<(), Error> {
	match self {
	    ContainerCommand::Create(opts) => options::run(c, opts).await,
	    ContainerCommand::List(opts) => options::run(c, List::<Container>::from(opts)).await,
	    ContainerCommand::Status(opts) => options::run(c, Status::<Container>::from(opts)).await,
	    ContainerCommand::Delete(opts) => options::run(c, Delete::<Container>::from(opts)).await,
	}
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct ContainerCreateOptions {

    #[command(flatten)]
    pub resource: ResourceOptions,

    /// container `image` repository, optionally with a tag, to watch for new digests
    #[arg(long, default_value = "")]
    pub image: String,

    /// print kubernetes resources to stdout rather than apply them to the cluster, messages normally on stdout will be sent to stderr
    #[arg(long)]
    pub dry_run: bool,
}

#[async_trait]
impl Options for ContainerCreateOptions {

    fn complete(&mut self, c: &Config) {
	self.resource.complete(c);
    }

    fn validate(&self) -> FieldError {
	self.resource.validate()
	    .also(validation::required(&self.image, IMAGE_FLAG_NAME))
    }

    async fn exec(&self, c: &Config) -> Result<(), Error> {
	let mut container = Container::new(&self.resource.name, ContainerSpec{ image: self.image.clone() });
	container.metadata.namespace = Some(self.resource.namespace().to_string());

	create_or_render(c, Container::NOUN, container, self.dry_run).await?;
	Ok(())
    }

    fn is_dry_run(&self) -> bool {
	self.dry_run
    }
}
