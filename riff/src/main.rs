mod commands;
mod config;
mod env;
mod errors;
mod field_error;
mod k8s;
mod options;
mod output;
mod pack;
mod parsers;
mod race;
mod submit;
mod tail;
mod validation;

#[cfg(test)]
mod testing;

use commands::application::ApplicationCommand;
use commands::binding::BindingCommand;
use commands::container::ContainerCommand;
use commands::deployer::CoreCommand;
use commands::function::FunctionCommand;
use commands::knative::KnativeCommand;
use commands::streaming::StreamingCommand;
use config::Config;
use errors::Error;

use clap::Parser;
use clap::Subcommand;
use std::path::PathBuf;

/*
 * riff manages builds, runtimes and streams on Kubernetes. Every command
 * parses into an options value that is completed, validated and then run
 * against the cluster of the selected kube context.
 */
#[derive(Parser, Debug)]
#[command(name = "riff", version, about = "riff is for functions", long_about = None)]
struct Cli {

    /// kubeconfig `file` (default is $HOME/.kube/config)
    #[arg(long, global = true)]
    kubeconfig: Option<PathBuf>,

    /// kubeconfig context `name` (default is the current-context)
    #[arg(long, global = true)]
    context: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// applications built from source using application buildpacks
    #[command(subcommand)]
    Application(ApplicationCommand),

    /// containers resolving the latest image from a repository
    #[command(subcommand)]
    Container(ContainerCommand),

    /// functions built from source using function buildpacks
    #[command(subcommand)]
    Function(FunctionCommand),

    /// core runtime resources
    #[command(subcommand)]
    Core(CoreCommand),

    /// knative runtime resources
    #[command(subcommand)]
    Knative(KnativeCommand),

    /// streaming runtime resources
    #[command(subcommand)]
    Streaming(StreamingCommand),

    /// bindings to backing services
    #[command(subcommand)]
    Binding(BindingCommand),
}

impl Command {
    async fn run(self, c: &Config) -> Result<(), Error> {
	match self {
	    Command::Application(command) => command.run(c).await,
	    Command::Container(command) => command.run(c).await,
	    Command::Function(command) => command.run(c).await,
	    Command::Core(command) => command.run(c).await,
	    Command::Knative(command) => command.run(c).await,
	    Command::Streaming(command) => command.run(c).await,
	    Command::Binding(command) => command.run(c).await,
	}
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();
    log::debug!("running {:?}", cli.command);

    let c = Config::connect(cli.kubeconfig.as_deref(), cli.context.as_deref()).await;

    if let Err(err) = cli.command.run(&c).await {
	if !err.is_silent() {
	    c.output.error(format!("Error: {}", err));
	}
	std::process::exit(1);
    }
}
