use crate::errors::Error;
use crate::k8s::Connection;

use async_trait::async_trait;
use futures::TryStreamExt;
use kube::Api as KubeApi;
use kube::ResourceExt;
use kube::api::ApiResource;
use kube::api::DynamicObject;
use kube::runtime::WatchStreamExt;
use kube::runtime::watcher as kube_watcher;
use kube::runtime::watcher::Config as KubeWatcherConfig;
use riff_api::Status;
use tokio_util::sync::CancellationToken;

#[async_trait]
pub trait ReadyWaiter: Send + Sync {

    /*
     * Blocks until the named object reports Ready=True for its current
     * generation. Returns Error::NotReady when it reports Ready=False and
     * Error::Cancelled as soon as the token is cancelled.
     */
    async fn wait_until_ready(&self, token: CancellationToken, resource: &ApiResource, namespace: &str, name: &str) -> Result<(), Error>;
}

/*
 * Ok(true) once ready, Ok(false) while still reconciling, Err when the
 * controller reported a failure.
 */
pub fn check_ready(obj: &DynamicObject) -> Result<bool, Error> {
    let status: Status = match obj.data.get("status") {
	Some(status) => serde_json::from_value(status.clone())?,
	None => return Ok(false),
    };
    let generation = obj.metadata.generation;

    if status.is_ready(generation) {
	return Ok(true);
    }
    if status.is_failed(generation) {
	let message = status.ready()
	    .and_then(|cond| cond.message.clone().or_else(|| cond.reason.clone()))
	    .unwrap_or_default();
	return Err(Error::NotReady(obj.name_any(), message));
    }
    Ok(false)
}

pub struct KubeWaiter {
    connection: Connection,
}

impl KubeWaiter {
    pub fn new(connection: Connection) -> Self {
	Self{ connection }
    }
}

#[async_trait]
impl ReadyWaiter for KubeWaiter {

    async fn wait_until_ready(&self, token: CancellationToken, resource: &ApiResource, namespace: &str, name: &str) -> Result<(), Error> {
	let api: KubeApi<DynamicObject> = KubeApi::namespaced_with(self.connection.client().await?, namespace, resource);
	let config = KubeWatcherConfig::default().fields(&format!("metadata.name={}", name));
	let mut events = Box::pin(kube_watcher(api, config).default_backoff().applied_objects());

	loop {
	    tokio::select! {
		_ = token.cancelled() => {
		    log::debug!("stopped waiting on {} {}/{}", resource.kind, namespace, name);
		    return Err(Error::Cancelled);
		},
		event = events.try_next() => match event? {
		    Some(obj) => {
			log::debug!("{} {}/{} changed", resource.kind, namespace, name);
			if check_ready(&obj)? {
			    return Ok(());
			}
		    },
		    None => return Err(Error::Other(format!("watch of {} {}/{} ended", resource.kind, namespace, name))),
		},
	    }
	}
    }
}
