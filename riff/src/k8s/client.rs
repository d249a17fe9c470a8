use crate::errors::Error;
use crate::k8s::Connection;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::ConfigMap as KubeConfigMap;
use kube::Api as KubeApi;
use kube::Resource as KubeResource;
use kube::api::ApiResource;
use kube::api::DeleteParams as KubeDeleteParams;
use kube::api::DynamicObject;
use kube::api::ListParams as KubeListParams;
use kube::api::PostParams as KubePostParams;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

/*
 * Cluster is the seam between the commands and the Kubernetes API. It works
 * on dynamic objects so a single implementation serves every riff kind;
 * Resources<K> puts the typed face back on.
 */
#[async_trait]
pub trait Cluster: Send + Sync {

    async fn create(&self, resource: &ApiResource, namespace: &str, obj: &DynamicObject) -> Result<DynamicObject, Error>;

    async fn get(&self, resource: &ApiResource, namespace: &str, name: &str) -> Result<DynamicObject, Error>;

    /* all namespaces when `namespace` is None */
    async fn list(&self, resource: &ApiResource, namespace: Option<&str>) -> Result<Vec<DynamicObject>, Error>;

    async fn delete(&self, resource: &ApiResource, namespace: &str, name: &str) -> Result<(), Error>;

    async fn config_map(&self, namespace: &str, name: &str) -> Result<KubeConfigMap, Error>;
}

#[derive(Clone)]
pub struct KubeCluster {
    connection: Connection,
}

impl KubeCluster {

    pub fn new(connection: Connection) -> Self {
	Self{ connection }
    }

    async fn api(&self, resource: &ApiResource, namespace: &str) -> Result<KubeApi<DynamicObject>, Error> {
	Ok(KubeApi::namespaced_with(self.connection.client().await?, namespace, resource))
    }
}

#[async_trait]
impl Cluster for KubeCluster {

    async fn create(&self, resource: &ApiResource, namespace: &str, obj: &DynamicObject) -> Result<DynamicObject, Error> {
	log::debug!("creating {} in namespace {}", resource.kind, namespace);
	let created = self.api(resource, namespace).await?.create(&KubePostParams::default(), obj).await?;
	Ok(created)
    }

    async fn get(&self, resource: &ApiResource, namespace: &str, name: &str) -> Result<DynamicObject, Error> {
	log::debug!("getting {} {}/{}", resource.kind, namespace, name);
	Ok(self.api(resource, namespace).await?.get(name).await?)
    }

    async fn list(&self, resource: &ApiResource, namespace: Option<&str>) -> Result<Vec<DynamicObject>, Error> {
	let api = match namespace {
	    Some(namespace) => self.api(resource, namespace).await?,
	    None => KubeApi::all_with(self.connection.client().await?, resource),
	};
	log::debug!("listing {} in namespace {:?}", resource.plural, namespace);
	Ok(api.list(&KubeListParams::default()).await?.items)
    }

    async fn delete(&self, resource: &ApiResource, namespace: &str, name: &str) -> Result<(), Error> {
	log::debug!("deleting {} {}/{}", resource.kind, namespace, name);
	self.api(resource, namespace).await?.delete(name, &KubeDeleteParams::default()).await?;
	Ok(())
    }

    async fn config_map(&self, namespace: &str, name: &str) -> Result<KubeConfigMap, Error> {
	let configmaps: KubeApi<KubeConfigMap> = KubeApi::namespaced(self.connection.client().await?, namespace);
	log::debug!("reading configmap {}/{}", namespace, name);
	Ok(configmaps.get(name).await?)
    }
}

/*
 * Typed access to one riff kind on top of a Cluster.
 */
pub struct Resources<'a, K> {
    cluster: &'a dyn Cluster,
    resource: ApiResource,
    _kind: PhantomData<fn() -> K>,
}

impl<'a, K> Resources<'a, K>
where
    K: KubeResource<DynamicType = ()> + Serialize + DeserializeOwned,
{

    pub fn new(cluster: &'a dyn Cluster) -> Self {
	Self{
	    cluster,
	    resource: ApiResource::erase::<K>(&()),
	    _kind: PhantomData,
	}
    }

    pub async fn create(&self, namespace: &str, obj: &K) -> Result<K, Error> {
	let created = self.cluster.create(&self.resource, namespace, &to_dynamic(obj)?).await?;
	from_dynamic(created)
    }

    pub async fn get(&self, namespace: &str, name: &str) -> Result<K, Error> {
	from_dynamic(self.cluster.get(&self.resource, namespace, name).await?)
    }

    pub async fn list(&self, namespace: Option<&str>) -> Result<Vec<K>, Error> {
	self.cluster.list(&self.resource, namespace).await?
	    .into_iter()
	    .map(from_dynamic)
	    .collect()
    }

    pub async fn delete(&self, namespace: &str, name: &str) -> Result<(), Error> {
	self.cluster.delete(&self.resource, namespace, name).await
    }
}

pub fn to_dynamic<K: Serialize>(obj: &K) -> Result<DynamicObject, Error> {
    Ok(serde_json::from_value(serde_json::to_value(obj)?)?)
}

pub fn from_dynamic<K: DeserializeOwned>(obj: DynamicObject) -> Result<K, Error> {
    Ok(serde_json::from_value(serde_json::to_value(obj)?)?)
}
