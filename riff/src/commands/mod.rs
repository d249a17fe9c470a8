/*
 * One module per command family. The list, status, delete and tail
 * commands are the same for every kind and live here, parameterised by
 * the kind's Describe impl.
 */

pub mod application;
pub mod binding;
pub mod container;
pub mod deployer;
pub mod function;
pub mod knative;
mod local_build;
pub mod streaming;

use crate::config::Config;
use crate::errors::Error;
use crate::field_error::FieldError;
use crate::k8s::LogSelector;
use crate::options::DeleteOptions;
use crate::options::ListOptions;
use crate::options::Options;
use crate::options::ResourceOptions;
use crate::options::SINCE_DEFAULT;
use crate::options::SINCE_FLAG_NAME;
use crate::validation;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use clap::Args;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::Resource as KubeResource;
use kube::ResourceExt;
use riff_api::Condition;
use riff_api::Conditioned;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use tokio_util::sync::CancellationToken;

pub const EMPTY: &str = "<empty>";
pub const UNKNOWN: &str = "<unknown>";

/*
 * What the generic commands need to know about a kind.
 */
pub trait Describe:
    KubeResource<DynamicType = ()> + Conditioned + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /* lower case name used in messages, "deployer" */
    const NOUN: &'static str;

    /* command path of the family, "core deployer" */
    const FAMILY: &'static str;

    /* kind specific columns, between NAME and STATUS */
    fn columns() -> Vec<&'static str>;

    fn row(&self) -> Vec<String>;
}

/* kinds whose workloads produce logs, found through this pod label */
pub trait Logged: Describe {
    const LOG_LABEL: &'static str;
}

pub fn format_empty(value: &str) -> String {
    match value {
	"" => String::from(EMPTY),
	value => value.to_string(),
    }
}

pub fn format_condition_status(cond: Option<&Condition>) -> String {
    match cond {
	None => String::from(UNKNOWN),
	Some(cond) if cond.is_true() => cond.type_.clone(),
	Some(cond) if cond.is_false() => cond.reason.clone().unwrap_or_else(|| format!("not-{}", cond.type_)),
	Some(cond) => format_empty(&cond.status),
    }
}

pub fn format_age(timestamp: Option<&Time>, now: DateTime<Utc>) -> String {
    let created = match timestamp {
	Some(created) => created.0,
	None => return String::from(UNKNOWN),
    };
    let seconds = (now - created).num_seconds().max(0);

    match seconds {
	s if s < 120 => format!("{}s", s),
	s if s < 120 * 60 => format!("{}m", s / 60),
	s if s < 48 * 60 * 60 => format!("{}h", s / 3600),
	s => format!("{}d", s / 86400),
    }
}

pub struct List<K> {
    opts: ListOptions,
    _kind: PhantomData<fn() -> K>,
}

impl<K> From<ListOptions> for List<K> {
    fn from(opts: ListOptions) -> Self {
	Self{ opts, _kind: PhantomData }
    }
}

#[async_trait]
impl<K: Describe> Options for List<K> {

    fn complete(&mut self, c: &Config) {
	self.opts.complete(c);
    }

    fn validate(&self) -> FieldError {
	self.opts.validate()
    }

    async fn exec(&self, c: &Config) -> Result<(), Error> {
	let mut items = c.resources::<K>().list(self.opts.namespace()).await?;
	if items.is_empty() {
	    c.output.info(format!("No {}s found.", K::NOUN));
	    return Ok(());
	}
	items.sort_by_key(|item| (item.namespace(), item.name_any()));

	let mut headers = vec![];
	if self.opts.all_namespaces {
	    headers.push("NAMESPACE");
	}
	headers.push("NAME");
	headers.extend(K::columns());
	headers.extend(["STATUS", "AGE"]);

	let now = Utc::now();
	let rows = items.iter().map(|item| {
	    let mut row = vec![];
	    if self.opts.all_namespaces {
		row.push(item.namespace().unwrap_or_default());
	    }
	    row.push(item.name_any());
	    row.extend(item.row());
	    row.push(format_condition_status(item.ready_condition()));
	    row.push(format_age(item.meta().creation_timestamp.as_ref(), now));
	    row
	}).collect();

	c.output.table(&headers, rows);
	Ok(())
    }
}

pub struct Status<K> {
    opts: ResourceOptions,
    _kind: PhantomData<fn() -> K>,
}

impl<K> From<ResourceOptions> for Status<K> {
    fn from(opts: ResourceOptions) -> Self {
	Self{ opts, _kind: PhantomData }
    }
}

#[async_trait]
impl<K: Describe> Options for Status<K> {

    fn complete(&mut self, c: &Config) {
	self.opts.complete(c);
    }

    fn validate(&self) -> FieldError {
	self.opts.validate()
    }

    async fn exec(&self, c: &Config) -> Result<(), Error> {
	let namespace = self.opts.namespace();
	let resource = match c.resources::<K>().get(namespace, &self.opts.name).await {
	    Ok(resource) => resource,
	    Err(err) if err.is_not_found() => {
		c.output.error(format!("{} {:?} not found", K::kind(&()), format!("{}/{}", namespace, self.opts.name)));
		return Err(err.silence());
	    },
	    Err(err) => return Err(err),
	};

	let ready = resource.ready_condition();
	c.output.line(format!("# {}: {}", resource.name_any(), format_condition_status(ready)));
	if let Some(cond) = ready {
	    c.output.document(cond)?;
	}
	Ok(())
    }
}

pub struct Delete<K> {
    opts: DeleteOptions,
    _kind: PhantomData<fn() -> K>,
}

impl<K> From<DeleteOptions> for Delete<K> {
    fn from(opts: DeleteOptions) -> Self {
	Self{ opts, _kind: PhantomData }
    }
}

#[async_trait]
impl<K: Describe> Options for Delete<K> {

    fn complete(&mut self, c: &Config) {
	self.opts.complete(c);
    }

    fn validate(&self) -> FieldError {
	self.opts.validate()
    }

    async fn exec(&self, c: &Config) -> Result<(), Error> {
	let namespace = self.opts.namespace();
	let resources = c.resources::<K>();

	let names = match self.opts.all {
	    true => resources.list(Some(namespace)).await?.iter().map(ResourceExt::name_any).collect(),
	    false => self.opts.names.clone(),
	};
	if names.is_empty() {
	    c.output.info(format!("No {}s found.", K::NOUN));
	    return Ok(());
	}

	for name in names {
	    resources.delete(namespace, &name).await?;
	    c.output.success(format!("Deleted {} {:?}", K::NOUN, name));
	}
	Ok(())
    }
}

#[derive(Args, Debug, Clone)]
pub struct TailOptions {

    #[command(flatten)]
    pub resource: ResourceOptions,

    /// time `duration` to start reading logs from
    #[arg(long, default_value = SINCE_DEFAULT)]
    pub since: String,
}

pub struct TailLogs<K> {
    opts: TailOptions,
    _kind: PhantomData<fn() -> K>,
}

impl<K> From<TailOptions> for TailLogs<K> {
    fn from(opts: TailOptions) -> Self {
	Self{ opts, _kind: PhantomData }
    }
}

#[async_trait]
impl<K: Logged> Options for TailLogs<K> {

    fn complete(&mut self, c: &Config) {
	self.opts.resource.complete(c);
    }

    fn validate(&self) -> FieldError {
	self.opts.resource.validate()
	    .also(validation::duration(&self.opts.since, SINCE_FLAG_NAME))
    }

    /* streams logs until interrupted */
    async fn exec(&self, c: &Config) -> Result<(), Error> {
	let namespace = self.opts.resource.namespace();
	let name = &self.opts.resource.name;
	if let Err(err) = c.resources::<K>().get(namespace, name).await {
	    if err.is_not_found() {
		c.output.error(format!("{} {:?} not found", K::kind(&()), format!("{}/{}", namespace, name)));
		return Err(err.silence());
	    }
	    return Err(err);
	}

	let since = validation::parse_duration(&self.opts.since)
	    .and_then(|since| chrono::Duration::from_std(since).ok())
	    .map_or_else(Utc::now, |since| Utc::now() - since);
	let selector = LogSelector::new(namespace, K::LOG_LABEL, name);
	let token = CancellationToken::new();

	let streaming = c.logs.logs(token.clone(), &selector, since, c.output.clone());
	tokio::pin!(streaming);
	tokio::select! {
	    result = &mut streaming => return result,
	    _ = tokio::signal::ctrl_c() => {
		log::debug!("interrupted, stopping log stream");
		token.cancel();
	    },
	}

	match streaming.await {
	    Ok(()) | Err(Error::Cancelled) => Ok(()),
	    Err(err) => Err(err),
	}
    }
}
