use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Statement effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyEffect {
    #[default]
    #[serde(alias = "Allow", alias = "ALLOW")]
    Allow,
    #[serde(alias = "Deny", alias = "DENY")]
    Deny,
}

impl std::str::FromStr for PolicyEffect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "allow" => Ok(PolicyEffect::Allow),
            "deny" => Ok(PolicyEffect::Deny),
            other => Err(format!("unrecognized policy effect: {}", other)),
        }
    }
}

/// Named shorthand for a fixed list of wire actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CannedAction {
    Read,
    ReadWrite,
    FullControl,
}

impl CannedAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CannedAction::Read => "Read",
            CannedAction::ReadWrite => "ReadWrite",
            CannedAction::FullControl => "FullControl",
        }
    }
}

impl std::fmt::Display for CannedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CannedAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Read" => Ok(CannedAction::Read),
            "ReadWrite" => Ok(CannedAction::ReadWrite),
            "FullControl" => Ok(CannedAction::FullControl),
            other => Err(format!("unrecognized canned action: {}", other)),
        }
    }
}

/// A condition value is either one string or a list of strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    One(String),
    Many(Vec<String>),
}

impl ConditionValue {
    pub fn values(&self) -> Vec<&str> {
        match self {
            ConditionValue::One(v) => vec![v.as_str()],
            ConditionValue::Many(vs) => vs.iter().map(String::as_str).collect(),
        }
    }
}

/// `operator -> (key -> value)`, e.g. `ip_equal -> qcs:ip -> [..]`
pub type PolicyConditions = BTreeMap<String, BTreeMap<String, ConditionValue>>;

/// A bucket policy statement as read back from the provider
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PolicyStatement {
    /// Positional index in the bucket's statement array
    pub id: String,
    pub effect: PolicyEffect,
    pub principal: BTreeMap<String, Vec<String>>,
    pub action: Vec<String>,
    pub resource: Vec<String>,
    pub condition: PolicyConditions,

    /// `owner:sub` identifiers extracted from `principal.qcs`
    pub principal_id: Vec<String>,
    /// Display names per principal id; empty without an identity directory
    pub principal_names: HashMap<String, String>,
    /// Bucket-relative paths extracted from `resource`
    pub resource_path: Vec<String>,
    pub canned_action: Option<CannedAction>,
}

/// Input for adding a statement to a bucket policy
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PolicyStatementInput {
    /// `owner:sub` or a single uin; an empty owner resolves to the account owner
    pub principal_id: Vec<String>,
    pub effect: PolicyEffect,
    /// Bucket-relative paths such as `/*` or `/images/*`
    pub resource_path: Vec<String>,
    pub canned_action: Option<CannedAction>,
    pub ip_equals: Vec<String>,
    pub ip_not_equals: Vec<String>,
}
