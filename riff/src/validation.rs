/*
 * Reusable validation rules. Each rule is a pure function returning a
 * FieldError, empty when the value is acceptable, so command validators can
 * merge the results of every rule they apply.
 */

use crate::field_error::FieldError;
use crate::options::{DRY_RUN_FLAG_NAME, TAIL_FLAG_NAME, WAIT_TIMEOUT_FLAG_NAME};
use crate::parsers;

use std::time::Duration;

const DNS1123_SUBDOMAIN_MAX_LENGTH: usize = 253;

pub fn is_set(value: &Option<String>) -> bool {
    value.as_deref().map_or(false, |v| !v.is_empty())
}

pub fn required(value: &str, field: &str) -> FieldError {
    if value.is_empty() {
	return FieldError::missing_field(&[field]);
    }
    FieldError::empty()
}

/*
 * At most one, and at least one, of the candidate fields may be set.
 * Candidates are (field name, is set) pairs; the order given is the order
 * fields are reported in.
 */
pub fn exactly_one_of(candidates: &[(&str, bool)]) -> FieldError {
    let used: Vec<&str> = candidates.iter().filter(|(_, set)| *set).map(|(name, _)| *name).collect();
    let unused: Vec<&str> = candidates.iter().filter(|(_, set)| !*set).map(|(name, _)| *name).collect();

    match used.len() {
	0 => FieldError::missing_one_of(&unused),
	1 => FieldError::empty(),
	_ => FieldError::multiple_one_of(&used),
    }
}

/* `field` may not be used while `when` holds */
pub fn disallowed(when: bool, set: bool, field: &str) -> FieldError {
    if when && set {
	return FieldError::disallowed_fields(&[field]);
    }
    FieldError::empty()
}

fn is_dns1123_label(label: &str) -> bool {
    let bytes = label.as_bytes();
    if bytes.is_empty() || bytes.len() > 63 {
	return false;
    }
    let alnum = |b: &u8| b.is_ascii_lowercase() || b.is_ascii_digit();

    alnum(&bytes[0])
	&& alnum(&bytes[bytes.len() - 1])
	&& bytes.iter().all(|b| alnum(b) || *b == b'-')
}

pub fn k8s_name(name: &str, field: &str) -> FieldError {
    let valid = !name.is_empty()
	&& name.len() <= DNS1123_SUBDOMAIN_MAX_LENGTH
	&& name.split('.').all(is_dns1123_label);

    if !valid {
	return FieldError::invalid_value(name, field);
    }
    FieldError::empty()
}

pub fn k8s_names(names: &[String], field: &str) -> FieldError {
    names.iter()
	.enumerate()
	.fold(FieldError::empty(), |errs, (i, name)| errs.also(k8s_name(name, field).via_index(i)))
}

pub fn env_var(env: &str, field: &str) -> FieldError {
    if parsers::split_env(env).is_none() {
	return FieldError::invalid_value(env, field);
    }
    FieldError::empty()
}

pub fn env_vars(envs: &[String], field: &str) -> FieldError {
    envs.iter()
	.enumerate()
	.fold(FieldError::empty(), |errs, (i, env)| errs.also(env_var(env, field).via_index(i)))
}

pub fn env_var_from(env: &str, field: &str) -> FieldError {
    if parsers::split_env_from(env).is_none() {
	return FieldError::invalid_value(env, field);
    }
    FieldError::empty()
}

pub fn env_var_froms(envs: &[String], field: &str) -> FieldError {
    envs.iter()
	.enumerate()
	.fold(FieldError::empty(), |errs, (i, env)| errs.also(env_var_from(env, field).via_index(i)))
}

pub fn parse_duration(value: &str) -> Option<Duration> {
    humantime::parse_duration(value.trim()).ok()
}

pub fn duration(value: &str, field: &str) -> FieldError {
    if parse_duration(value).is_none() {
	return FieldError::invalid_value(value, field);
    }
    FieldError::empty()
}

fn valid_quantity_suffix(suffix: &str) -> bool {
    const SUFFIXES: [&str; 16] = [
	"", "n", "u", "m", "k", "M", "G", "T", "P", "E",
	"Ki", "Mi", "Gi", "Ti", "Pi", "Ei",
    ];
    if SUFFIXES.contains(&suffix) {
	return true;
    }

    /* decimal exponent form, e.g. 1e3 or 5E-2 */
    match suffix.strip_prefix('e').or_else(|| suffix.strip_prefix('E')) {
	Some(exponent) => {
	    let digits = exponent.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(exponent);
	    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
	},
	None => false,
    }
}

/* a Kubernetes resource quantity such as "1Gi", "500M" or "0.5" */
pub fn is_quantity(value: &str) -> bool {
    let unsigned = value.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(value);
    let number_len = unsigned.bytes().take_while(|b| b.is_ascii_digit() || *b == b'.').count();
    let (number, suffix) = unsigned.split_at(number_len);

    let digits = number.bytes().filter(|b| b.is_ascii_digit()).count();
    let dots = number.len() - digits;

    digits > 0 && dots <= 1 && valid_quantity_suffix(suffix)
}

pub fn quantity(value: &str, field: &str) -> FieldError {
    if !is_quantity(value) {
	return FieldError::invalid_value(value, field);
    }
    FieldError::empty()
}

/* "type/subtype" with optional ";param=value" parameters */
pub fn media_type(value: &str, field: &str) -> FieldError {
    let token = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || "!#$&^_.+-*".contains(c));

    let mut parts = value.split(';');
    let essence = parts.next().unwrap_or_default().trim();
    let valid = match essence.split_once('/') {
	Some((type_, subtype)) => token(type_) && token(subtype),
	None => false,
    } && parts.all(|param| match param.trim().split_once('=') {
	Some((key, val)) => token(key) && !val.is_empty(),
	None => false,
    });

    if !valid {
	return FieldError::invalid_value(value, field);
    }
    FieldError::empty()
}

/*
 * Tailing needs a parseable wait timeout, and cannot be combined with a dry
 * run since nothing is created to wait on.
 */
pub fn tail(tail: bool, wait_timeout: &str, dry_run: bool) -> FieldError {
    let mut errs = FieldError::empty();

    if tail {
	if wait_timeout.is_empty() {
	    errs = errs.also(FieldError::missing_field(&[WAIT_TIMEOUT_FLAG_NAME]));
	} else {
	    errs = errs.also(duration(wait_timeout, WAIT_TIMEOUT_FLAG_NAME));
	}
    }

    if dry_run && tail {
	errs = errs.also(FieldError::multiple_one_of(&[DRY_RUN_FLAG_NAME, TAIL_FLAG_NAME]));
    }

    errs
}

/* reject a field that the named host platform cannot support */
pub fn unsupported_on(os: &str, unsupported: &str, set: bool, field: &str) -> FieldError {
    if set && os == unsupported {
	let platform = match unsupported {
	    "windows" => "Windows",
	    "macos" => "macOS",
	    other => other,
	};
	return FieldError::invalid_value(format!("{} is not available on {}", field, platform), field);
    }
    FieldError::empty()
}
