use crate::errors::Error;

use kube::Client as KubeClient;
use kube::Config as KubeConfig;
use kube::config::KubeConfigOptions;
use kube::config::Kubeconfig;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;

pub const FALLBACK_NAMESPACE: &str = "default";

/*
 * Where the cluster is, resolved from an explicit kubeconfig file and/or
 * context when given, otherwise from the environment (KUBECONFIG, the
 * default kubeconfig or the in-cluster service account).
 *
 * The client is only created by the first API call, commands that stop at
 * validation or render a dry run never need a cluster.
 */
#[derive(Clone)]
pub struct Connection {
    kubeconfig: Option<PathBuf>,
    context: Option<String>,
    kube_client: Arc<OnceCell<KubeClient>>,
}

impl Connection {

    pub fn new(kubeconfig: Option<&Path>, context: Option<&str>) -> Self {
	Self{
	    kubeconfig: kubeconfig.map(Path::to_path_buf),
	    context: context.map(String::from),
	    kube_client: Arc::new(OnceCell::new()),
	}
    }

    async fn load(&self) -> Result<KubeConfig, Error> {
	let options = KubeConfigOptions{
	    context: self.context.clone(),
	    ..Default::default()
	};
	let kube_config = match (&self.kubeconfig, &self.context) {
	    (Some(path), _) => KubeConfig::from_custom_kubeconfig(Kubeconfig::read_from(path)?, &options).await?,
	    (None, Some(_)) => KubeConfig::from_kubeconfig(&options).await?,
	    (None, None) => KubeConfig::infer().await?,
	};
	Ok(kube_config)
    }

    /* namespace of the selected context, "default" without any configuration */
    pub async fn default_namespace(&self) -> String {
	match self.load().await {
	    Ok(kube_config) => kube_config.default_namespace,
	    Err(err) => {
		log::debug!("no kube configuration, using namespace {}: {}", FALLBACK_NAMESPACE, err);
		String::from(FALLBACK_NAMESPACE)
	    },
	}
    }

    pub async fn client(&self) -> Result<KubeClient, Error> {
	let kube_client = self.kube_client.get_or_try_init(|| async {
	    let kube_client = KubeClient::try_from(self.load().await?)?;
	    log::debug!("connected, default namespace {}", kube_client.default_namespace());
	    Ok::<KubeClient, Error>(kube_client)
	}).await?;
	Ok(kube_client.clone())
    }
}
