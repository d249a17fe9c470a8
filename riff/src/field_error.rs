use std::fmt;

pub const MSG_MISSING_FIELD: &str = "missing field(s)";
pub const MSG_MISSING_ONE_OF: &str = "expected exactly one, got neither";
pub const MSG_MULTIPLE_ONE_OF: &str = "expected exactly one, got both";
pub const MSG_DISALLOWED_FIELDS: &str = "must not set the field(s)";

/*
 * A single failed rule: what went wrong and which flags or arguments it is
 * about.
 */
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Violation {
    pub message: String,
    pub paths: Vec<String>,
}

/*
 * FieldError accumulates every violation found while validating an options
 * value. The empty value means "valid"; validators merge with also() instead
 * of returning early so all problems are reported at once.
 */
#[derive(Clone, Debug, Default)]
pub struct FieldError {
    violations: Vec<Violation>,
}

fn to_paths(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|field| field.to_string()).collect()
}

impl FieldError {

    pub fn empty() -> Self {
	Self::default()
    }

    pub fn new(message: impl Into<String>, fields: &[&str]) -> Self {
	Self{
	    violations: vec![Violation{
		message: message.into(),
		paths: to_paths(fields),
	    }],
	}
    }

    pub fn missing_field(fields: &[&str]) -> Self {
	Self::new(MSG_MISSING_FIELD, fields)
    }

    /* none of a mutually exclusive set was given, names every candidate */
    pub fn missing_one_of(fields: &[&str]) -> Self {
	Self::new(MSG_MISSING_ONE_OF, fields)
    }

    /* more than one of a mutually exclusive set was given, names those given */
    pub fn multiple_one_of(fields: &[&str]) -> Self {
	Self::new(MSG_MULTIPLE_ONE_OF, fields)
    }

    pub fn disallowed_fields(fields: &[&str]) -> Self {
	Self::new(MSG_DISALLOWED_FIELDS, fields)
    }

    pub fn invalid_value(value: impl fmt::Display, field: &str) -> Self {
	Self::new(format!("invalid value: {}", value), &[field])
    }

    pub fn invalid_array_value(value: impl fmt::Display, field: &str, index: usize) -> Self {
	Self::invalid_value(value, field).via_index(index)
    }

    /* attribute every violation to element `index` of its field */
    pub fn via_index(mut self, index: usize) -> Self {
	for violation in self.violations.iter_mut() {
	    for path in violation.paths.iter_mut() {
		*path = format!("{}[{}]", path, index);
	    }
	}
	self
    }

    pub fn also(mut self, other: FieldError) -> Self {
	self.violations.extend(other.violations);
	self
    }

    pub fn is_empty(&self) -> bool {
	self.violations.is_empty()
    }

    #[cfg(test)]
    pub fn violations(&self) -> &[Violation] {
	&self.violations
    }

    /*
     * Violations sharing a message are folded together so each
     * problem is reported on one line.
     */
    fn normalized(&self) -> Vec<Violation> {
	let mut merged: Vec<Violation> = vec![];

	for violation in &self.violations {
	    match merged.iter_mut().find(|m| m.message == violation.message) {
		Some(existing) => {
		    for path in &violation.paths {
			if !existing.paths.contains(path) {
			    existing.paths.push(path.clone());
			}
		    }
		},
		None => merged.push(violation.clone()),
	    }
	}
	for violation in merged.iter_mut() {
	    violation.paths.sort();
	}
	merged.sort();
	merged
    }
}

impl PartialEq for FieldError {
    fn eq(&self, other: &Self) -> bool {
	self.normalized() == other.normalized()
    }
}

impl Eq for FieldError {}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
	let lines: Vec<String> = self.normalized()
	    .into_iter()
	    .map(|violation| match violation.paths.is_empty() {
		true => violation.message,
		false => format!("{}: {}", violation.message, violation.paths.join(", ")),
	    })
	    .collect();

	write!(f, "{}", lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_valid() {
	assert!(FieldError::empty().is_empty());
	assert!(FieldError::empty().also(FieldError::empty()).is_empty());
	assert_eq!(FieldError::empty().to_string(), "");
    }

    #[test]
    fn also_keeps_every_violation_in_any_order() {
	let a = FieldError::missing_field(&["--image"]);
	let b = FieldError::invalid_value("d", "--wait-timeout");

	let ab = a.clone().also(b.clone());
	let ba = b.clone().also(a.clone());

	assert_eq!(ab.violations().len(), 2);
	assert_eq!(ab.is_empty(), ba.is_empty());
	assert_eq!(ab, ba);
	assert!(ab.violations().contains(&a.violations()[0]));
	assert!(ab.violations().contains(&b.violations()[0]));
    }

    #[test]
    fn empty_is_identity() {
	let err = FieldError::missing_one_of(&["--git-repo", "--local-path"]);

	assert_eq!(FieldError::empty().also(err.clone()), err);
	assert_eq!(err.clone().also(FieldError::empty()), err);
    }

    #[test]
    fn one_of_errors_keep_given_order() {
	let err = FieldError::missing_one_of(&["--application-ref", "--container-ref", "--function-ref", "--image"]);

	assert_eq!(err.violations()[0].paths, vec!["--application-ref", "--container-ref", "--function-ref", "--image"]);
	assert_eq!(err.violations()[0].message, MSG_MISSING_ONE_OF);
    }

    #[test]
    fn array_values_carry_index() {
	let err = FieldError::invalid_array_value("=foo", "--env", 0);

	assert_eq!(err.violations()[0].paths, vec!["--env[0]"]);
	assert_eq!(err.to_string(), "invalid value: =foo: --env[0]");
    }

    #[test]
    fn display_folds_same_message() {
	let err = FieldError::missing_field(&["<name>"])
	    .also(FieldError::missing_field(&["--namespace"]))
	    .also(FieldError::disallowed_fields(&["--sub-path"]));

	assert_eq!(err.to_string(), "missing field(s): --namespace, <name>\nmust not set the field(s): --sub-path");
    }
}
