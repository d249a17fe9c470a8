use crate::config::Config;
use crate::errors::Error;
use crate::k8s::LogSelector;
use crate::options::NAMESPACE_FLAG_NAME;
use crate::race;
use crate::validation;

use chrono::DateTime;
use chrono::Utc;
use kube::Resource as KubeResource;
use kube::ResourceExt;
use kube::api::ApiResource;

/*
 * A freshly created resource to watch: readiness of the resource itself,
 * logs of the pods labelled with its name.
 */
#[derive(Clone, Debug)]
pub struct Tail {
    pub family: String,
    pub resource: ApiResource,
    pub namespace: String,
    pub name: String,
    pub wait_timeout: String,
    pub selector: LogSelector,
    pub since: DateTime<Utc>,
}

impl Tail {

    pub fn of<K>(family: &str, label: &str, obj: &K, wait_timeout: &str) -> Self
    where
	K: KubeResource<DynamicType = ()>,
    {
	let namespace = obj.namespace().unwrap_or_default();
	let name = obj.name_any();

	Self{
	    family: family.to_string(),
	    resource: ApiResource::erase::<K>(&()),
	    selector: LogSelector::new(&namespace, label, &name),
	    since: obj.meta().creation_timestamp.as_ref().map_or_else(Utc::now, |t| t.0),
	    wait_timeout: wait_timeout.to_string(),
	    namespace,
	    name,
	}
    }
}

/*
 * Waits for the resource to become ready while streaming its logs. When
 * the wait timeout elapses first the user is told how to follow up, and the
 * returned error is silenced since nothing more needs printing.
 */
pub async fn wait_and_tail(c: &Config, tail: Tail) -> Result<(), Error> {
    let timeout = validation::parse_duration(&tail.wait_timeout)
	.ok_or_else(|| Error::Other(format!("invalid wait timeout {:?}", tail.wait_timeout)))?;

    let waiter = c.waiter.clone();
    let logs = c.logs.clone();
    let output = c.output.clone();
    let (resource, namespace, name) = (tail.resource.clone(), tail.namespace.clone(), tail.name.clone());
    let (selector, since) = (tail.selector.clone(), tail.since);

    log::debug!("waiting up to {:?} for {} {}/{}", timeout, tail.resource.kind, tail.namespace, tail.name);
    let outcome = race::run(
	timeout,
	move |token| async move { waiter.wait_until_ready(token, &resource, &namespace, &name).await },
	move |token| async move { logs.logs(token, &selector, since, output).await },
    ).await;

    match outcome {
	race::Outcome::Succeeded => Ok(()),
	race::Outcome::Failed(err) => Err(err),
	race::Outcome::TimedOut => {
	    c.output.error(format!("Timeout after {:?} waiting for {:?} to become ready", tail.wait_timeout, tail.name));
	    c.output.info(format!("To view status run: {} {} list {} {}", c.name, tail.family, NAMESPACE_FLAG_NAME, tail.namespace));
	    c.output.info(format!("To continue watching logs run: {} {} tail {} {} {}", c.name, tail.family, tail.name, NAMESPACE_FLAG_NAME, tail.namespace));
	    Err(Error::DeadlineExceeded.silence())
	},
    }
}
