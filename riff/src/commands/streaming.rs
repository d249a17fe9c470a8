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
use riff_api::streaming::ProcessorSpec;
use riff_api::streaming::StreamSpec;
use riff_api::Processor;
use riff_api::Stream;

impl Describe for Stream {
    const NOUN: &'static str = "stream";
    const FAMILY: &'static str = "streaming stream";

    fn columns() -> Vec<&'static str> {
	vec!["TOPIC", "GATEWAY", "CONTENT-TYPE"]
    }

    fn row(&self) -> Vec<String> {
	let address = self.status.as_ref().and_then(|s| s.address.clone()).unwrap_or_default();
	vec![
	    format_empty(&address.topic),
	    format_empty(&address.gateway),
	    format_empty(&self.spec.content_type),
	]
    }
}

impl Describe for Processor {
    const NOUN: &'static str = "processor";
    const FAMILY: &'static str = "streaming processor";

    fn columns() -> Vec<&'static str> {
	vec!["FUNCTION", "INPUTS", "OUTPUTS"]
    }

    fn row(&self) -> Vec<String> {
	vec![
	    format_empty(&self.spec.function_ref),
	    format_empty(&self.spec.inputs.join(",")),
	    format_empty(&self.spec.outputs.join(",")),
	]
    }
}

impl Logged for Processor {
    const LOG_LABEL: &'static str = "streaming.projectriff.io/processor";
}

/// streaming runtime resources
#[derive(Subcommand, Debug)]
pub enum StreamingCommand {
    /// streams of messages between processors
    #[command(subcommand)]
    Stream(StreamCommand),
    /// processors apply functions to messages on streams
    #[command(subcommand)]
    Processor(ProcessorCommand),
}

impl StreamingCommand {
    pub async fn run(self, c: &Config) -> Result<(), Error> {
	match self {
	    StreamingCommand::Stream(command) => command.run(c).await,
	    StreamingCommand::Processor(command) => command.run(c).await,
	}
    }
}

#[derive(Subcommand, Debug)]
pub enum StreamCommand {
    /// create a stream of messages
    Create(StreamCreateOptions),
    /// table listing of streams
    List(ListOptions),
    /// show stream status
    Status(ResourceOptions),
    /// delete stream(s)
    Delete(DeleteOptions),
}

impl StreamCommand {
    pub async fn run(self, c: &Config) -> Result<(), Error> {
	match self {
	    StreamCommand::Create(opts) => options::run(c, opts).await,
	    StreamCommand::List(opts) => options::run(c, List::<Stream>::from(opts)).await,
	    StreamCommand::Status(opts) => options::run(c, Status::<Stream>::from(opts)).await,
	    StreamCommand::Delete(opts) => options::run(c, Delete::<Stream>::from(opts)).await,
	}
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct StreamCreateOptions {

    #[command(flatten)]
    pub resource: ResourceOptions,

    /// `name` of stream provider
    #[arg(long, default_value = "")]
    pub provider: String,

    /// `MIME type` for message payloads accepted by the stream
    #[arg(long, default_value = "")]
    pub content_type: String,

    /// print kubernetes resources to stdout rather than apply them to the cluster, messages normally on stdout will be sent to stderr
    #[arg(long)]
    pub dry_run: bool,
}

#[async_trait]
impl Options for StreamCreateOptions {

    fn complete(&mut self, c: &Config) {
	self.resource.complete(c);
    }

    fn validate(&self) -> FieldError {
	let mut errs = self.resource.validate()
	    .also(validation::required(&self.provider, PROVIDER_FLAG_NAME));

	if !self.content_type.is_empty() {
	    errs = errs.also(validation::media_type(&self.content_type, CONTENT_TYPE_FLAG_NAME));
	}

	errs
    }

    async fn exec(&self, c: &Config) -> Result<(), Error> {
	let mut stream = Stream::new(&self.resource.name, StreamSpec{
	    provider: self.provider.clone(),
	    content_type: self.content_type.clone(),
	});
	stream.metadata.namespace = Some(self.resource.namespace().to_string());

	create_or_render(c, Stream::NOUN, stream, self.dry_run).await?;
	Ok(())
    }

    fn is_dry_run(&self) -> bool {
	self.dry_run
    }
}

#[derive(Subcommand, Debug)]
pub enum ProcessorCommand {
    /// create a processor to apply a function to messages on streams
    Create(ProcessorCreateOptions),
    /// table listing of processors
    List(ListOptions),
    /// show processor status
    Status(ResourceOptions),
    /// delete processor(s)
    Delete(DeleteOptions),
    /// watch processor logs
    Tail(TailOptions),
}

impl ProcessorCommand {
    pub async fn run(self, c: &Config) -> Result<(), Error> {
	match self {
	    ProcessorCommand::Create(opts) => options::run(c, opts).await,
	    ProcessorCommand::List(opts) => options::run(c, List::<Processor>::from(opts)).await,
	    ProcessorCommand::Status(opts) => options::run(c, Status::<Processor>::from(opts)).await,
	    ProcessorCommand::Delete(opts) => options::run(c, Delete::<Processor>::from(opts)).await,
	    ProcessorCommand::Tail(opts) => options::run(c, TailLogs::<Processor>::from(opts)).await,
	}
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct ProcessorCreateOptions {

    #[command(flatten)]
    pub resource: ResourceOptions,

    /// `name` of function build to deploy
    #[arg(long)]
    pub function_ref: Option<String>,

    /// `name` of stream to read messages from (may be set multiple times)
    #[arg(long = "input")]
    pub inputs: Vec<String>,

    /// `name` of stream to write messages to (may be set multiple times)
    #[arg(long = "output")]
    pub outputs: Vec<String>,

    /// watch processor logs
    #[arg(long)]
    pub tail: bool,

    /// `duration` to wait for the processor to become ready when watching logs
    #[arg(long, default_value = WAIT_TIMEOUT_DEFAULT)]
    pub wait_timeout: String,

    /// print kubernetes resources to stdout rather than apply them to the cluster, messages normally on stdout will be sent to stderr
    #[arg(long)]
    pub dry_run: bool,
}

#[async_trait]
impl Options for ProcessorCreateOptions {

    fn complete(&mut self, c: &Config) {
	self.resource.complete(c);
    }

    fn validate(&self) -> FieldError {
	let mut errs = self.resource.validate()
	    .also(validation::required(self.function_ref.as_deref().unwrap_or_default(), FUNCTION_REF_FLAG_NAME));

	if self.inputs.is_empty() {
	    errs = errs.also(FieldError::missing_field(&[INPUT_FLAG_NAME]));
	}
	errs = errs
	    .also(validation::k8s_names(&self.inputs, INPUT_FLAG_NAME))
	    .also(validation::k8s_names(&self.outputs, OUTPUT_FLAG_NAME));

	errs.also(validation::tail(self.tail, &self.wait_timeout, self.dry_run))
    }

    async fn exec(&self, c: &Config) -> Result<(), Error> {
	let mut processor = Processor::new(&self.resource.name, ProcessorSpec{
	    function_ref: self.function_ref.clone().unwrap_or_default(),
	    inputs: self.inputs.clone(),
	    outputs: self.outputs.clone(),
	});
	processor.metadata.namespace = Some(self.resource.namespace().to_string());

	let processor = create_or_render(c, Processor::NOUN, processor, self.dry_run).await?;
	if self.tail {
	    let tail = Tail::of(Processor::FAMILY, Processor::LOG_LABEL, &processor, &self.wait_timeout);
	    wait_and_tail(c, tail).await?;
	}
	Ok(())
    }

    fn is_dry_run(&self) -> bool {
	self.dry_run
    }
}
