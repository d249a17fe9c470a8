use crate::condition::{Conditioned, Status};

use kube_derive::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BindingStatus {

    #[serde(flatten)]
    pub status: Status,
}

/*
 * A Binding maps the connection properties of a backing service, stored in
 * a secret, onto the workloads that consume it.
 */
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(group = "bindings.projectriff.io", version = "v1alpha1", kind = "Binding", namespaced)]
#[kube(status = "BindingStatus")]
#[serde(rename_all = "camelCase")]
pub struct BindingSpec {

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub host: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub port: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub secret_ref: String,
}

impl Conditioned for Binding {
    fn status(&self) -> Option<&Status> {
	self.status.as_ref().map(|s| &s.status)
    }
}
