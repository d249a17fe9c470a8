use crate::errors::Error;
use crate::k8s::Connection;
use crate::output::Output;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use futures::AsyncBufReadExt;
use futures::TryStreamExt;
use k8s_openapi::api::core::v1::Pod as KubePod;
use kube::Api as KubeApi;
use kube::ResourceExt;
use kube::api::ListParams as KubeListParams;
use kube::api::LogParams as KubeLogParams;
use std::collections::BTreeSet;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

const POD_POLL_INTERVAL: Duration = Duration::from_secs(2);
const LOG_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/*
 * The pods whose logs belong to a riff resource: every pod in the
 * namespace carrying the resource's label.
 */
#[derive(Clone, Debug, PartialEq)]
pub struct LogSelector {
    pub namespace: String,
    pub labels: String,
}

impl LogSelector {
    pub fn new(namespace: &str, label: &str, name: &str) -> Self {
	Self{
	    namespace: namespace.to_string(),
	    labels: format!("{}={}", label, name),
	}
    }
}

#[async_trait]
pub trait LogStreamer: Send + Sync {

    /*
     * Writes every log line produced after `since` by the selected pods to
     * the output, one line at a time, until the token is cancelled.
     */
    async fn logs(&self, token: CancellationToken, selector: &LogSelector, since: DateTime<Utc>, output: Output) -> Result<(), Error>;
}

pub struct KubeLogs {
    connection: Connection,
}

impl KubeLogs {
    pub fn new(connection: Connection) -> Self {
	Self{ connection }
    }
}

fn container_names(pod: &KubePod) -> Vec<String> {
    let spec = match &pod.spec {
	Some(spec) => spec,
	None => return vec![],
    };
    spec.init_containers.iter()
	.flatten()
	.chain(spec.containers.iter())
	.map(|c| c.name.clone())
	.collect()
}

/*
 * Follows one container. A container that has not started yet refuses to
 * stream, so the stream is retried until it opens or the token is
 * cancelled.
 */
async fn follow(pods: KubeApi<KubePod>, namespace: String, pod: String, container: String, since: DateTime<Utc>, output: Output, token: CancellationToken) {
    let params = KubeLogParams{
	container: Some(container.clone()),
	follow: true,
	since_time: Some(since),
	..Default::default()
    };

    loop {
	let opened = tokio::select! {
	    _ = token.cancelled() => return,
	    opened = pods.log_stream(&pod, &params) => opened,
	};

	match opened {
	    Ok(stream) => {
		let mut lines = Box::pin(stream.lines());
		loop {
		    tokio::select! {
			_ = token.cancelled() => return,
			line = lines.try_next() => match line {
			    Ok(Some(line)) => output.line(format!("{}/{}[{}]: {}", namespace, pod, container, line)),
			    Ok(None) => return,
			    Err(err) => {
				log::debug!("log stream of {}/{}[{}] failed: {}", namespace, pod, container, err);
				return;
			    },
			},
		    }
		}
	    },
	    Err(err) => log::debug!("waiting for logs of {}/{}[{}]: {}", namespace, pod, container, err),
	}

	tokio::select! {
	    _ = token.cancelled() => return,
	    _ = tokio::time::sleep(LOG_RETRY_INTERVAL) => {},
	}
    }
}

#[async_trait]
impl LogStreamer for KubeLogs {

    async fn logs(&self, token: CancellationToken, selector: &LogSelector, since: DateTime<Utc>, output: Output) -> Result<(), Error> {
	let pods: KubeApi<KubePod> = KubeApi::namespaced(self.connection.client().await?, &selector.namespace);
	let params = KubeListParams::default().labels(&selector.labels);
	let mut followed: BTreeSet<(String, String)> = BTreeSet::new();
	let mut tasks = JoinSet::new();

	loop {
	    let listed = tokio::select! {
		_ = token.cancelled() => break,
		listed = pods.list(&params) => listed?,
	    };

	    for pod in listed.items {
		let pod_name = pod.name_any();
		for container in container_names(&pod) {
		    if !followed.insert((pod_name.clone(), container.clone())) {
			continue;
		    }
		    log::debug!("following logs of {}/{}[{}]", selector.namespace, pod_name, container);
		    tasks.spawn(follow(
			pods.clone(),
			selector.namespace.clone(),
			pod_name.clone(),
			container,
			since,
			output.clone(),
			token.clone(),
		    ));
		}
	    }

	    tokio::select! {
		_ = token.cancelled() => break,
		_ = tokio::time::sleep(POD_POLL_INTERVAL) => {},
	    }
	}

	while tasks.join_next().await.is_some() {}
	Err(Error::Cancelled)
    }
}
