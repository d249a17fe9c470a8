use crate::k8s::Cluster;
use crate::k8s::Connection;
use crate::k8s::KubeCluster;
use crate::k8s::KubeLogs;
use crate::k8s::KubeWaiter;
use crate::k8s::LogStreamer;
use crate::k8s::ReadyWaiter;
use crate::k8s::Resources;
use crate::output::Output;
use crate::pack::ImageBuilder;
use crate::pack::PackBuilder;

use kube::Resource as KubeResource;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

pub const CLI_NAME: &str = "riff";

/*
 * Everything a command needs to talk to the outside world: the cluster, the
 * readiness and log collaborators, the image builder and the output sink.
 * Cheap to clone, every collaborator is shared.
 */
#[derive(Clone)]
pub struct Config {
    pub name: String,
    pub default_namespace: String,
    pub cluster: Arc<dyn Cluster>,
    pub waiter: Arc<dyn ReadyWaiter>,
    pub logs: Arc<dyn LogStreamer>,
    pub builder: Arc<dyn ImageBuilder>,
    pub output: Output,
}

impl Config {

    /*
     * Nothing is contacted here: the client is created by the first API
     * call, so validation and dry runs work without any cluster.
     */
    pub async fn connect(kubeconfig: Option<&Path>, context: Option<&str>) -> Self {
	let connection = Connection::new(kubeconfig, context);
	let default_namespace = connection.default_namespace().await;
	log::debug!("default namespace {}", default_namespace);

	Self{
	    name: String::from(CLI_NAME),
	    default_namespace,
	    cluster: Arc::new(KubeCluster::new(connection.clone())),
	    waiter: Arc::new(KubeWaiter::new(connection.clone())),
	    logs: Arc::new(KubeLogs::new(connection)),
	    builder: Arc::new(PackBuilder::default()),
	    output: Output::stdio(),
	}
    }

    /* the same config, with messages moved off stdout */
    pub fn for_dry_run(&self) -> Self {
	Self{
	    output: self.output.for_dry_run(),
	    ..self.clone()
	}
    }

    pub fn resources<K>(&self) -> Resources<'_, K>
    where
	K: KubeResource<DynamicType = ()> + Serialize + DeserializeOwned,
    {
	Resources::new(self.cluster.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::container::ContainerCreateOptions;
    use crate::errors::Error;
    use crate::options;
    use crate::options::ResourceOptions;
    use crate::output::testing::buffered;
    use crate::output::testing::Buffer;

    async fn without_cluster() -> (Config, Buffer, Buffer) {
	let c = Config::connect(Some(Path::new("/nonexistent/riff/kubeconfig")), None).await;
	let (output, stdout, stderr) = buffered();
	(Config{ output, ..c }, stdout, stderr)
    }

    fn container_options(image: &str, dry_run: bool) -> ContainerCreateOptions {
	ContainerCreateOptions{
	    resource: ResourceOptions{ name: String::from("my-container"), namespace: None },
	    image: image.to_string(),
	    dry_run,
	}
    }

    #[tokio::test]
    async fn dry_run_needs_no_cluster() {
	let (c, stdout, stderr) = without_cluster().await;

	options::run(&c, container_options("example.com/repo", true)).await.unwrap();

	let rendered = stdout.contents();
	assert!(rendered.starts_with("---\napiVersion: build.projectriff.io/v1alpha1\nkind: Container\n"));
	assert!(rendered.contains("namespace: default\n"));
	assert_eq!(stderr.contents(), "Created container \"my-container\"\n");
    }

    #[tokio::test]
    async fn validation_needs_no_cluster() {
	let (c, _, _) = without_cluster().await;

	let err = options::run(&c, container_options("", false)).await.unwrap_err();

	assert!(matches!(err, Error::Validation(_)), "unexpected error {:?}", err);
    }

    #[tokio::test]
    async fn api_calls_report_the_configuration_error() {
	let (c, stdout, _) = without_cluster().await;

	let err = options::run(&c, container_options("example.com/repo", false)).await.unwrap_err();

	assert!(matches!(err, Error::Kubeconfig(_)), "unexpected error {:?}", err);
	assert_eq!(stdout.contents(), "");
    }
}
