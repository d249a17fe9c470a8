use crate::condition::{Conditioned, Status};

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use kube_derive::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/* image value telling the build to derive the image from the default prefix */
pub const DEFAULT_IMAGE_PLACEHOLDER: &str = "_";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GitSource {

    pub url: String,

    /* branch, tag or commit to checkout */
    pub revision: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Source {

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<GitSource>,

    /* directory within the checkout holding the source to build */
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sub_path: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuildStatus {

    #[serde(flatten)]
    pub status: Status,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_cache_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_image: Option<String>,
}

#[derive(CustomResource, Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(group = "build.projectriff.io", version = "v1alpha1", kind = "Application", namespaced)]
#[kube(status = "BuildStatus")]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSpec {

    /* repository where built images are pushed */
    pub image: String,

    /* size of the persistent volume caching resources between builds */
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_size: Option<Quantity>,

    /* absent when the application is built from local source */
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
}

#[derive(CustomResource, Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(group = "build.projectriff.io", version = "v1alpha1", kind = "Container", namespaced)]
#[kube(status = "BuildStatus")]
#[serde(rename_all = "camelCase")]
pub struct ContainerSpec {

    /* image repository watched for new digests */
    pub image: String,
}

#[derive(CustomResource, Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(group = "build.projectriff.io", version = "v1alpha1", kind = "Function", namespaced)]
#[kube(status = "BuildStatus")]
#[serde(rename_all = "camelCase")]
pub struct FunctionSpec {

    pub image: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_size: Option<Quantity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,

    /* file containing the function within the build workspace */
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub artifact: String,

    /* name of the method or class to invoke */
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub handler: String,

    /* language runtime invoker, detected when empty */
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub invoker: String,
}

impl Conditioned for Application {
    fn status(&self) -> Option<&Status> {
	self.status.as_ref().map(|s| &s.status)
    }
}

impl Conditioned for Container {
    fn status(&self) -> Option<&Status> {
	self.status.as_ref().map(|s| &s.status)
    }
}

impl Conditioned for Function {
    fn status(&self) -> Option<&Status> {
	self.status.as_ref().map(|s| &s.status)
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ImageError {
    #[error("missing default image prefix, unable to resolve image {0:?}")]
    MissingDefaultPrefix(String),
}

/*
 * Expands the leading "_" placeholder of an image into
 * "<default-image-prefix>/<resource-name>", keeping any suffix such as a tag.
 * Images without the placeholder are returned untouched.
 */
pub fn resolve_default_image(image: &str, name: &str, default_image_prefix: &str) -> Result<String, ImageError> {
    let rest = match image.strip_prefix(DEFAULT_IMAGE_PLACEHOLDER) {
	Some(rest) => rest,
	None => return Ok(image.to_string()),
    };
    if default_image_prefix.is_empty() {
	return Err(ImageError::MissingDefaultPrefix(image.to_string()));
    }

    Ok(format!("{}/{}{}", default_image_prefix.trim_end_matches('/'), name, rest))
}
