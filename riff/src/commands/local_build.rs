/*
 * Builds from a local directory run on this machine through the image
 * builder, configured by two config maps maintained by the riff install.
 */

use crate::config::Config;
use crate::errors::Error;
use crate::pack::BuildOptions;

use k8s_openapi::api::core::v1::ConfigMap as KubeConfigMap;
use riff_api::build::resolve_default_image;
use riff_api::build::DEFAULT_IMAGE_PLACEHOLDER;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const RIFF_BUILD_CONFIG_MAP: &str = "riff-build";
pub const DEFAULT_IMAGE_PREFIX_KEY: &str = "default-image-prefix";
pub const BUILDERS_NAMESPACE: &str = "riff-system";
pub const BUILDERS_CONFIG_MAP: &str = "builders";
pub const APPLICATION_BUILDER_KEY: &str = "riff-application";
pub const FUNCTION_BUILDER_KEY: &str = "riff-function";

fn config_value(config_map: &KubeConfigMap, key: &str) -> String {
    config_map.data.as_ref()
	.and_then(|data| data.get(key))
	.cloned()
	.unwrap_or_default()
}

pub struct LocalBuild<'a> {
    pub namespace: &'a str,
    pub name: &'a str,
    pub image: &'a str,
    pub path: &'a str,
    /* key of the builder image in the builders config map */
    pub builder_key: &'a str,
    pub env: BTreeMap<String, String>,
}

impl<'a> LocalBuild<'a> {

    /*
     * Resolves the target image and the builder before anything is built.
     * A missing builder fails the build, and with it the command, before
     * any resource is created.
     */
    pub async fn run(self, c: &Config) -> Result<(), Error> {
	let mut image = self.image.to_string();
	if image.starts_with(DEFAULT_IMAGE_PLACEHOLDER) {
	    let riff_build = c.cluster.config_map(self.namespace, RIFF_BUILD_CONFIG_MAP).await?;
	    image = resolve_default_image(&image, self.name, &config_value(&riff_build, DEFAULT_IMAGE_PREFIX_KEY))?;
	}

	let builders = c.cluster.config_map(BUILDERS_NAMESPACE, BUILDERS_CONFIG_MAP).await?;
	let builder = config_value(&builders, self.builder_key);
	if builder.is_empty() {
	    return Err(Error::UnknownBuilder(self.builder_key.to_string()));
	}

	log::info!("building {} from {} with {}", image, self.path, builder);
	c.builder.build(&BuildOptions{
	    image,
	    app_path: PathBuf::from(self.path),
	    builder,
	    env: self.env,
	    publish: true,
	}).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use crate::testing::TEST_NAMESPACE;

    use riff_api::build::ImageError;

    fn local_build<'a>(image: &'a str, builder_key: &'a str) -> LocalBuild<'a> {
	LocalBuild{
	    namespace: TEST_NAMESPACE,
	    name: "square",
	    image,
	    path: "./square",
	    builder_key,
	    env: BTreeMap::new(),
	}
    }

    fn with_builders() -> Harness {
	let harness = Harness::new();
	harness.cluster.add_config_map(BUILDERS_NAMESPACE, BUILDERS_CONFIG_MAP, &[
	    (FUNCTION_BUILDER_KEY, "projectriff/builder:0.5"),
	]);
	harness
    }

    #[tokio::test]
    async fn placeholder_image_resolves_against_prefix() {
	let harness = with_builders();
	harness.cluster.add_config_map(TEST_NAMESPACE, RIFF_BUILD_CONFIG_MAP, &[
	    (DEFAULT_IMAGE_PREFIX_KEY, "registry.example.com/team"),
	]);

	local_build("_:v1", FUNCTION_BUILDER_KEY).run(&harness.config).await.unwrap();

	let builds = harness.builder.builds();
	assert_eq!(builds.len(), 1);
	assert_eq!(builds[0].image, "registry.example.com/team/square:v1");
	assert_eq!(builds[0].builder, "projectriff/builder:0.5");
	assert_eq!(builds[0].app_path, PathBuf::from("./square"));
	assert!(builds[0].publish);
    }

    #[tokio::test]
    async fn placeholder_image_without_prefix_fails() {
	let harness = with_builders();
	harness.cluster.add_config_map(TEST_NAMESPACE, RIFF_BUILD_CONFIG_MAP, &[]);

	let err = local_build("_", FUNCTION_BUILDER_KEY).run(&harness.config).await.unwrap_err();

	assert!(matches!(err, Error::Image(ImageError::MissingDefaultPrefix(_))), "unexpected error {:?}", err);
	assert!(harness.builder.builds().is_empty());
    }

    #[tokio::test]
    async fn explicit_image_skips_the_build_config() {
	let harness = with_builders();

	local_build("example.com/square", FUNCTION_BUILDER_KEY).run(&harness.config).await.unwrap();

	assert_eq!(harness.builder.builds()[0].image, "example.com/square");
    }

    #[tokio::test]
    async fn missing_builders_config_map() {
	let harness = Harness::new();

	let err = local_build("example.com/square", FUNCTION_BUILDER_KEY).run(&harness.config).await.unwrap_err();

	assert!(err.is_not_found(), "unexpected error {:?}", err);
	assert!(harness.builder.builds().is_empty());
    }

    #[tokio::test]
    async fn unknown_builder() {
	let harness = with_builders();

	let err = local_build("example.com/petclinic", APPLICATION_BUILDER_KEY).run(&harness.config).await.unwrap_err();

	assert!(matches!(err, Error::UnknownBuilder(ref key) if key == APPLICATION_BUILDER_KEY));
	assert!(harness.builder.builds().is_empty());
    }
}
