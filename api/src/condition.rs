use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const CONDITION_READY: &str = "Ready";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl ConditionStatus {
    pub fn parse(status: &str) -> ConditionStatus {
	match status {
	    "True" => ConditionStatus::True,
	    "False" => ConditionStatus::False,
	    _ => ConditionStatus::Unknown,
	}
    }
}

impl ToString for ConditionStatus {
    fn to_string(&self) -> String {
	match self {
	    ConditionStatus::True => String::from("True"),
	    ConditionStatus::False => String::from("False"),
	    ConditionStatus::Unknown => String::from("Unknown"),
	}
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {

    /* the condition type, for example "Ready" */
    #[serde(rename = "type")]
    pub type_: String,

    /* one of "True", "False" or "Unknown" */
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Condition {

    pub fn new(type_: &str, status: ConditionStatus) -> Self {
	Self{
	    type_: type_.to_string(),
	    status: status.to_string(),
	    ..Default::default()
	}
    }

    pub fn status(&self) -> ConditionStatus {
	ConditionStatus::parse(&self.status)
    }

    pub fn is_true(&self) -> bool {
	self.status() == ConditionStatus::True
    }

    pub fn is_false(&self) -> bool {
	self.status() == ConditionStatus::False
    }
}

/*
 * The status block every riff resource shares. Kind specific status
 * structs flatten it in next to their own fields.
 */
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Status {

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

impl Status {

    pub fn get_condition(&self, type_: &str) -> Option<&Condition> {
	self.conditions.iter().find(|cond| cond.type_ == type_)
    }

    pub fn ready(&self) -> Option<&Condition> {
	self.get_condition(CONDITION_READY)
    }

    /*
     * A resource is ready once the controller has observed the current
     * generation and reported Ready=True for it.
     */
    pub fn is_ready(&self, generation: Option<i64>) -> bool {
	if let (Some(generation), Some(observed)) = (generation, self.observed_generation) {
	    if observed < generation {
		return false;
	    }
	}
	self.ready().map_or(false, Condition::is_true)
    }

    pub fn is_failed(&self, generation: Option<i64>) -> bool {
	if let (Some(generation), Some(observed)) = (generation, self.observed_generation) {
	    if observed < generation {
		return false;
	    }
	}
	self.ready().map_or(false, Condition::is_false)
    }
}

/*
 * Implemented by every riff custom resource so the generic status, list and
 * wait paths can find the Ready condition without knowing the kind.
 */
pub trait Conditioned {

    fn status(&self) -> Option<&Status>;

    fn ready_condition(&self) -> Option<&Condition> {
	self.status().and_then(Status::ready)
    }
}
