/*
 * The core runtime: deployers that run a workload as a plain Kubernetes
 * deployment and service.
 */

use crate::condition::{Conditioned, Status};

use k8s_openapi::api::core::v1::PodSpec;
use kube_derive::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/*
 * Reference to the riff build producing the image to run. At most one of the
 * refs is set; a deployer without a build runs the image of its template.
 */
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Build {

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub application_ref: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub container_ref: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub function_ref: String,
}

impl Build {

    pub fn application(name: &str) -> Self {
	Self{ application_ref: name.to_string(), ..Default::default() }
    }

    pub fn container(name: &str) -> Self {
	Self{ container_ref: name.to_string(), ..Default::default() }
    }

    pub fn function(name: &str) -> Self {
	Self{ function_ref: name.to_string(), ..Default::default() }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeployerStatus {

    #[serde(flatten)]
    pub status: Status,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
}

#[derive(CustomResource, Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(group = "core.projectriff.io", version = "v1alpha1", kind = "Deployer", namespaced)]
#[kube(status = "DeployerStatus")]
#[serde(rename_all = "camelCase")]
pub struct DeployerSpec {

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<Build>,

    /* pod template, the first container receives image, env and mounts */
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PodSpec>,
}

impl Conditioned for Deployer {
    fn status(&self) -> Option<&Status> {
	self.status.as_ref().map(|s| &s.status)
    }
}
