use crate::condition::{Conditioned, Status};

use kube_derive::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StreamStatus {

    #[serde(flatten)]
    pub status: Status,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<StreamAddress>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StreamAddress {

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub gateway: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub topic: String,
}

#[derive(CustomResource, Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(group = "streaming.projectriff.io", version = "v1alpha1", kind = "Stream", namespaced)]
#[kube(status = "StreamStatus")]
#[serde(rename_all = "camelCase")]
pub struct StreamSpec {

    /* name of the stream provider backing this stream */
    pub provider: String,

    /* media type of the messages, defaults to application/octet-stream */
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content_type: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorStatus {

    #[serde(flatten)]
    pub status: Status,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_name: Option<String>,
}

#[derive(CustomResource, Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(group = "streaming.projectriff.io", version = "v1alpha1", kind = "Processor", namespaced)]
#[kube(status = "ProcessorStatus")]
#[serde(rename_all = "camelCase")]
pub struct ProcessorSpec {

    pub function_ref: String,

    /* names of the streams consumed by the function */
    pub inputs: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<String>,
}

impl Conditioned for Stream {
    fn status(&self) -> Option<&Status> {
	self.status.as_ref().map(|s| &s.status)
    }
}

impl Conditioned for Processor {
    fn status(&self) -> Option<&Status> {
	self.status.as_ref().map(|s| &s.status)
    }
}
