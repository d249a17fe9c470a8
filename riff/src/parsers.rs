use k8s_openapi::api::core::v1::ConfigMapKeySelector;
use k8s_openapi::api::core::v1::EnvVar;
use k8s_openapi::api::core::v1::EnvVarSource;
use k8s_openapi::api::core::v1::SecretKeySelector;

pub const SECRET_KEY_REF: &str = "secretKeyRef";
pub const CONFIG_MAP_KEY_REF: &str = "configMapKeyRef";

#[derive(Debug, Clone, PartialEq)]
pub struct EnvFrom<'a> {
    pub name: &'a str,
    pub source: &'a str,
    pub source_name: &'a str,
    pub key: &'a str,
}

/* "KEY=VALUE", the value may be empty or contain further '=' */
pub fn split_env(env: &str) -> Option<(&str, &str)> {
    match env.split_once('=') {
	Some((name, value)) if !name.is_empty() => Some((name, value)),
	_ => None,
    }
}

/* "KEY=secretKeyRef:name:key" or "KEY=configMapKeyRef:name:key" */
pub fn split_env_from(env: &str) -> Option<EnvFrom<'_>> {
    let (name, value) = split_env(env)?;
    let mut parts = value.splitn(3, ':');

    let source = parts.next()?;
    let source_name = parts.next()?;
    let key = parts.next()?;

    if source != SECRET_KEY_REF && source != CONFIG_MAP_KEY_REF {
	return None;
    }
    if source_name.is_empty() || key.is_empty() {
	return None;
    }

    Some(EnvFrom{ name, source, source_name, key })
}

pub fn env_var(env: &str) -> Option<EnvVar> {
    let (name, value) = split_env(env)?;

    Some(EnvVar{
	name: name.to_string(),
	value: Some(value.to_string()),
	value_from: None,
    })
}

pub fn env_var_from(env: &str) -> Option<EnvVar> {
    let from = split_env_from(env)?;

    let source = if from.source == SECRET_KEY_REF {
	EnvVarSource{
	    secret_key_ref: Some(SecretKeySelector{
		name: from.source_name.to_string(),
		key: from.key.to_string(),
		optional: None,
	    }),
	    ..Default::default()
	}
    } else {
	EnvVarSource{
	    config_map_key_ref: Some(ConfigMapKeySelector{
		name: from.source_name.to_string(),
		key: from.key.to_string(),
		optional: None,
	    }),
	    ..Default::default()
	}
    };

    Some(EnvVar{
	name: from.name.to_string(),
	value: None,
	value_from: Some(source),
    })
}
