use crate::errors::Error;
use crate::parsers;

use k8s_openapi::api::core::v1::Container as KubeContainer;
use k8s_openapi::api::core::v1::EnvVar;
use k8s_openapi::api::core::v1::KeyToPath;
use k8s_openapi::api::core::v1::PodSpec;
use k8s_openapi::api::core::v1::SecretVolumeSource;
use k8s_openapi::api::core::v1::Volume;
use k8s_openapi::api::core::v1::VolumeMount;

pub const SPRING_PROFILES_ACTIVE: &str = "SPRING_PROFILES_ACTIVE";
pub const SPRING_BOOT_BINDING: &str = "spring-boot";
pub const BINDING_MOUNT_PATH: &str = "/workspace/config";
pub const BINDING_SECRET_KEY: &str = "config.yaml";
const BINDING_FILE_MODE: i32 = 0o644;

/*
 * A --binding-secret entry, either "secret-name" or "profile:secret-name".
 * Spring Boot bindings project the secret as the profile specific
 * application yaml so Boot picks it up for that profile.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct BindingSecret {
    pub name: String,
    pub config_file: String,
    pub profile: Option<String>,
}

impl BindingSecret {

    pub fn parse(binding: &str, boot: bool) -> Self {
	let (profile, name) = match binding.split_once(':') {
	    Some((profile, name)) => (Some(profile.to_string()), name.to_string()),
	    None => (None, binding.to_string()),
	};
	let config_file = match (&profile, boot) {
	    (Some(profile), true) => format!("application-{}.yaml", profile),
	    (None, true) => String::from("application.yaml"),
	    (_, false) => String::from(BINDING_SECRET_KEY),
	};

	Self{ name, config_file, profile }
    }

    fn volume(&self) -> Volume {
	Volume{
	    name: self.name.clone(),
	    secret: Some(SecretVolumeSource{
		default_mode: Some(BINDING_FILE_MODE),
		secret_name: Some(self.name.clone()),
		items: Some(vec![KeyToPath{
		    key: String::from(BINDING_SECRET_KEY),
		    path: self.config_file.clone(),
		    mode: None,
		}]),
		optional: None,
	    }),
	    ..Default::default()
	}
    }

    fn volume_mount(&self) -> VolumeMount {
	VolumeMount{
	    name: self.name.clone(),
	    mount_path: String::from(BINDING_MOUNT_PATH),
	    read_only: Some(true),
	    ..Default::default()
	}
    }
}

/*
 * The runtime environment requested on the command line for the workload's
 * container.
 */
#[derive(Debug, Default, Clone)]
pub struct Environment<'a> {
    pub env: &'a [String],
    pub env_from: &'a [String],
    pub binding_type: &'a str,
    pub binding_secrets: &'a [String],
}

impl<'a> Environment<'a> {

    /*
     * Applies the environment to the first container of the pod spec.
     *
     * Literal entries keep their order, followed by one aggregated
     * SPRING_PROFILES_ACTIVE entry (binding profiles first, then explicit
     * profiles), followed by the config map and secret references.
     */
    pub fn apply(&self, spec: &mut PodSpec) -> Result<(), Error> {
	if spec.containers.is_empty() {
	    spec.containers.push(KubeContainer::default());
	}
	let boot = self.binding_type == SPRING_BOOT_BINDING;
	let mut profiles: Vec<String> = vec![];
	let mut env: Vec<EnvVar> = vec![];
	let mut volumes: Vec<Volume> = vec![];
	let mut mounts: Vec<VolumeMount> = vec![];

	for binding in self.binding_secrets {
	    let secret = BindingSecret::parse(binding, boot);
	    if let Some(profile) = &secret.profile {
		profiles.push(profile.clone());
	    }
	    volumes.push(secret.volume());
	    mounts.push(secret.volume_mount());
	}

	for entry in self.env {
	    match entry.strip_prefix(SPRING_PROFILES_ACTIVE).and_then(|rest| rest.strip_prefix('=')) {
		Some(active) => profiles.extend(active.split(',').map(String::from)),
		None => {
		    let var = parsers::env_var(entry)
			.ok_or_else(|| Error::Other(format!("invalid environment variable {:?}", entry)))?;
		    env.push(var);
		},
	    }
	}
	if !profiles.is_empty() {
	    env.push(EnvVar{
		name: String::from(SPRING_PROFILES_ACTIVE),
		value: Some(profiles.join(",")),
		value_from: None,
	    });
	}

	for entry in self.env_from {
	    let var = parsers::env_var_from(entry)
		.ok_or_else(|| Error::Other(format!("invalid environment variable reference {:?}", entry)))?;
	    env.push(var);
	}

	if !volumes.is_empty() {
	    spec.volumes.get_or_insert_with(Vec::new).extend(volumes);
	}
	let container = &mut spec.containers[0];
	if !mounts.is_empty() {
	    container.volume_mounts.get_or_insert_with(Vec::new).extend(mounts);
	}
	if !env.is_empty() {
	    container.env.get_or_insert_with(Vec::new).extend(env);
	}

	Ok(())
    }
}
