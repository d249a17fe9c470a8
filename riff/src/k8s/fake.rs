/*
 * In-memory stand-ins for the cluster, readiness waiter and log streamer.
 */

use crate::errors::Error;
use crate::k8s::Cluster;
use crate::k8s::LogSelector;
use crate::k8s::LogStreamer;
use crate::k8s::ReadyWaiter;
use crate::output::Output;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use k8s_openapi::api::core::v1::ConfigMap as KubeConfigMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::ResourceExt;
use kube::api::ApiResource;
use kube::api::DynamicObject;
use kube::core::ErrorResponse;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

type Key = (String, String, String);

fn api_error(code: u16, reason: &str, message: String) -> Error {
    Error::Kube(kube::Error::Api(ErrorResponse{
	status: String::from("Failure"),
	message,
	reason: reason.to_string(),
	code,
    }))
}

fn not_found(kind: &str, name: &str) -> Error {
    api_error(404, "NotFound", format!("{} {:?} not found", kind, name))
}

#[derive(Default)]
pub struct FakeCluster {
    objects: Mutex<BTreeMap<Key, DynamicObject>>,
    config_maps: Mutex<BTreeMap<(String, String), KubeConfigMap>>,
    create_error: Mutex<Option<ErrorResponse>>,
}

impl FakeCluster {

    pub fn add_config_map(&self, namespace: &str, name: &str, data: &[(&str, &str)]) {
	let mut config_map = KubeConfigMap::default();
	config_map.metadata.name = Some(name.to_string());
	config_map.metadata.namespace = Some(namespace.to_string());
	config_map.data = Some(data.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect());

	self.config_maps.lock().unwrap().insert((namespace.to_string(), name.to_string()), config_map);
    }

    /* makes the next create fail with the given API error */
    pub fn fail_create(&self, response: ErrorResponse) {
	*self.create_error.lock().unwrap() = Some(response);
    }

    pub fn objects(&self, resource: &ApiResource) -> Vec<DynamicObject> {
	self.objects.lock().unwrap()
	    .iter()
	    .filter(|((plural, _, _), _)| *plural == resource.plural)
	    .map(|(_, obj)| obj.clone())
	    .collect()
    }
}

#[async_trait]
impl Cluster for FakeCluster {

    async fn create(&self, resource: &ApiResource, namespace: &str, obj: &DynamicObject) -> Result<DynamicObject, Error> {
	if let Some(response) = self.create_error.lock().unwrap().take() {
	    return Err(Error::Kube(kube::Error::Api(response)));
	}

	let name = obj.name_any();
	let key = (resource.plural.clone(), namespace.to_string(), name.clone());
	let mut objects = self.objects.lock().unwrap();
	if objects.contains_key(&key) {
	    return Err(api_error(409, "AlreadyExists", format!("{} {:?} already exists", resource.plural, name)));
	}

	let mut created = obj.clone();
	created.metadata.namespace = Some(namespace.to_string());
	created.metadata.generation = Some(1);
	created.metadata.uid = Some(format!("uid-{}", objects.len() + 1));
	created.metadata.creation_timestamp = Some(Time(Utc::now()));
	objects.insert(key, created.clone());

	Ok(created)
    }

    async fn get(&self, resource: &ApiResource, namespace: &str, name: &str) -> Result<DynamicObject, Error> {
	let key = (resource.plural.clone(), namespace.to_string(), name.to_string());
	self.objects.lock().unwrap()
	    .get(&key)
	    .cloned()
	    .ok_or_else(|| not_found(&resource.plural, name))
    }

    async fn list(&self, resource: &ApiResource, namespace: Option<&str>) -> Result<Vec<DynamicObject>, Error> {
	Ok(self.objects(resource)
	    .into_iter()
	    .filter(|obj| namespace.map_or(true, |ns| obj.namespace().as_deref() == Some(ns)))
	    .collect())
    }

    async fn delete(&self, resource: &ApiResource, namespace: &str, name: &str) -> Result<(), Error> {
	let key = (resource.plural.clone(), namespace.to_string(), name.to_string());
	match self.objects.lock().unwrap().remove(&key) {
	    Some(_) => Ok(()),
	    None => Err(not_found(&resource.plural, name)),
	}
    }

    async fn config_map(&self, namespace: &str, name: &str) -> Result<KubeConfigMap, Error> {
	self.config_maps.lock().unwrap()
	    .get(&(namespace.to_string(), name.to_string()))
	    .cloned()
	    .ok_or_else(|| not_found("configmaps", name))
    }
}

pub enum FakeWaiter {
    /* ready after the delay */
    Ready(Duration),
    /* reports a failed Ready condition */
    Failed(String),
    /* never becomes ready */
    Never,
}

#[async_trait]
impl ReadyWaiter for FakeWaiter {

    async fn wait_until_ready(&self, token: CancellationToken, _resource: &ApiResource, _namespace: &str, name: &str) -> Result<(), Error> {
	let delay = match self {
	    FakeWaiter::Ready(delay) => *delay,
	    FakeWaiter::Failed(message) => return Err(Error::NotReady(name.to_string(), message.clone())),
	    FakeWaiter::Never => {
		token.cancelled().await;
		return Err(Error::Cancelled);
	    },
	};
	tokio::select! {
	    _ = token.cancelled() => Err(Error::Cancelled),
	    _ = tokio::time::sleep(delay) => Ok(()),
	}
    }
}

/* how the stream ends once its lines are written */
#[derive(Default)]
enum LogsEnd {
    #[default]
    Cancelled,
    Finished,
    Failed(String),
}

/*
 * Writes its lines straight away, then ends as configured. Records the
 * selector and since time it was asked for.
 */
#[derive(Default)]
pub struct FakeLogs {
    lines: Vec<String>,
    end: LogsEnd,
    requests: Mutex<Vec<(LogSelector, DateTime<Utc>)>>,
}

impl FakeLogs {

    /* writes the lines then streams until cancelled */
    pub fn new(lines: &[&str]) -> Self {
	Self::ending(lines, LogsEnd::Cancelled)
    }

    pub fn finished(lines: &[&str]) -> Self {
	Self::ending(lines, LogsEnd::Finished)
    }

    pub fn failing(lines: &[&str], message: &str) -> Self {
	Self::ending(lines, LogsEnd::Failed(message.to_string()))
    }

    fn ending(lines: &[&str], end: LogsEnd) -> Self {
	Self{
	    lines: lines.iter().map(|l| l.to_string()).collect(),
	    end,
	    ..Default::default()
	}
    }

    pub fn requests(&self) -> Vec<(LogSelector, DateTime<Utc>)> {
	self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LogStreamer for FakeLogs {

    async fn logs(&self, token: CancellationToken, selector: &LogSelector, since: DateTime<Utc>, output: Output) -> Result<(), Error> {
	self.requests.lock().unwrap().push((selector.clone(), since));
	for line in &self.lines {
	    output.line(line);
	}
	match &self.end {
	    LogsEnd::Cancelled => {
		token.cancelled().await;
		Err(Error::Cancelled)
	    },
	    LogsEnd::Finished => Ok(()),
	    LogsEnd::Failed(message) => Err(Error::Other(message.clone())),
	}
    }
}
