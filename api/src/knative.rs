use crate::condition::{Conditioned, Status};
pub use crate::runtime::Build;

use k8s_openapi::api::core::v1::PodSpec;
use kube_derive::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeployerStatus {

    #[serde(flatten)]
    pub status: Status,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(CustomResource, Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(group = "knative.projectriff.io", version = "v1alpha1", kind = "Deployer", namespaced)]
#[kube(status = "DeployerStatus")]
#[serde(rename_all = "camelCase")]
pub struct DeployerSpec {

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<Build>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PodSpec>,
}

/*
 * The Knative workload an adapter keeps up to date with the latest built
 * image. Exactly one of the refs is set.
 */
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdapterTarget {

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub service_ref: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub configuration_ref: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdapterStatus {

    #[serde(flatten)]
    pub status: Status,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_image: Option<String>,
}

#[derive(CustomResource, Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(group = "knative.projectriff.io", version = "v1alpha1", kind = "Adapter", namespaced)]
#[kube(status = "AdapterStatus")]
#[serde(rename_all = "camelCase")]
pub struct AdapterSpec {

    pub build: Build,

    pub target: AdapterTarget,
}

impl Conditioned for Deployer {
    fn status(&self) -> Option<&Status> {
	self.status.as_ref().map(|s| &s.status)
    }
}

impl Conditioned for Adapter {
    fn status(&self) -> Option<&Status> {
	self.status.as_ref().map(|s| &s.status)
    }
}
