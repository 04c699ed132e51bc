use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::wire::{PolicyDocument, PolicyStatementEntry};
use crate::domain::{
    errors::CloudError,
    models::{CannedAction, ConditionValue, PolicyStatement, PolicyStatementInput},
};

pub const POLICY_VERSION: &str = "2.0";

pub const FULL_CONTROL_ACTION: &str = "name/cos:*";

pub const READ_ACTIONS: [&str; 8] = [
    "name/cos:GetBucket",
    "name/cos:GetBucketObjectVersions",
    "name/cos:HeadBucket",
    "name/cos:ListMultipartUploads",
    "name/cos:ListParts",
    "name/cos:GetObject",
    "name/cos:HeadObject",
    "name/cos:OptionsObject",
];

const WRITE_ACTIONS: [&str; 7] = [
    "name/cos:PutObject",
    "name/cos:PostObject",
    "name/cos:DeleteObject",
    "name/cos:InitiateMultipartUpload",
    "name/cos:UploadPart",
    "name/cos:CompleteMultipartUpload",
    "name/cos:AbortMultipartUpload",
];

/// Read bundle followed by the write actions
pub fn read_write_actions() -> Vec<String> {
    READ_ACTIONS
        .iter()
        .chain(WRITE_ACTIONS.iter())
        .map(|s| s.to_string())
        .collect()
}

/// Wire actions for a canned action
pub fn actions_for(canned: CannedAction) -> Vec<String> {
    match canned {
        CannedAction::FullControl => vec![FULL_CONTROL_ACTION.to_string()],
        CannedAction::Read => READ_ACTIONS.iter().map(|s| s.to_string()).collect(),
        CannedAction::ReadWrite => read_write_actions(),
    }
}

/// Name the canned bundle an action list covers, if any
pub fn canned_action(actions: &[String]) -> Option<CannedAction> {
    let set: BTreeSet<&str> = actions.iter().map(String::as_str).collect();
    if set.contains(FULL_CONTROL_ACTION) {
        return Some(CannedAction::FullControl);
    }
    let covers_read = READ_ACTIONS.iter().all(|a| set.contains(a));
    if covers_read && WRITE_ACTIONS.iter().all(|a| set.contains(a)) {
        return Some(CannedAction::ReadWrite);
    }
    covers_read.then_some(CannedAction::Read)
}

/// `qcs::cam::uin/1:uin/2` -> `1:2`; `qcs::cam::anyone:anyone` -> `anyone:anyone`
pub fn principal_ids(principals: &[String]) -> Vec<String> {
    principals
        .iter()
        .map(|p| {
            let tail = p.rsplit("::").next().unwrap_or(p);
            tail.replacen("uin/", "", 2)
        })
        .collect()
}

/// Bucket-relative path: whatever follows the resource's last `:`
pub fn resource_paths(resources: &[String]) -> Vec<String> {
    resources
        .iter()
        .map(|r| r.rsplit(':').next().unwrap_or(r).to_string())
        .collect()
}

/// True when some principal id leaves the owner out (`:sub`)
pub fn needs_owner(ids: &[String]) -> bool {
    ids.iter().any(|id| {
        let tokens: Vec<&str> = id.split(':').collect();
        tokens.len() == 2 && tokens[0].is_empty()
    })
}

/// Build `qcs::cam::uin/{o}:uin/{s}` principals.
///
/// A single token means owner and sub are the same account. An empty owner
/// takes `owner_name`; an empty sub copies the owner.
pub fn principal_arns(ids: &[String], owner_name: Option<&str>) -> Result<Vec<String>, CloudError> {
    let mut arns = Vec::with_capacity(ids.len());
    for id in ids {
        let tokens: Vec<&str> = id.split(':').collect();
        let (owner, sub) = match tokens.as_slice() {
            [single] if !single.is_empty() => (single.to_string(), single.to_string()),
            [owner, sub] => {
                let owner = if owner.is_empty() {
                    owner_name
                        .filter(|o| !o.is_empty())
                        .ok_or_else(|| {
                            CloudError::invalid_input("set_policy", "account owner is unknown")
                        })?
                        .to_string()
                } else {
                    owner.to_string()
                };
                let sub = if sub.is_empty() {
                    owner.clone()
                } else {
                    sub.to_string()
                };
                (owner, sub)
            }
            [_] => {
                return Err(CloudError::invalid_input(
                    "set_policy",
                    "empty principal id",
                ))
            }
            _ => {
                return Err(CloudError::unsupported(
                    "set_policy",
                    format!("invalid principal id {}", id),
                ))
            }
        };
        arns.push(format!("qcs::cam::uin/{}:uin/{}", owner, sub));
    }
    Ok(arns)
}

/// `qcs::cos:{region}:uid/{appId}:{bucket}{path}` for each path
pub fn resource_arns(region: &str, app_id: &str, full_name: &str, paths: &[String]) -> Vec<String> {
    paths
        .iter()
        .map(|p| format!("qcs::cos:{}:uid/{}:{}{}", region, app_id, full_name, p))
        .collect()
}

fn ip_condition(ips: &[String]) -> BTreeMap<String, ConditionValue> {
    BTreeMap::from([("qcs:ip".to_string(), ConditionValue::Many(ips.to_vec()))])
}

/// Wire statement for a new policy entry
pub fn statement_from_input(
    input: &PolicyStatementInput,
    principals: Vec<String>,
    resources: Vec<String>,
) -> PolicyStatementEntry {
    let mut condition = BTreeMap::new();
    if !input.ip_equals.is_empty() {
        condition.insert("ip_equal".to_string(), ip_condition(&input.ip_equals));
    }
    if !input.ip_not_equals.is_empty() {
        condition.insert("ip_not_equal".to_string(), ip_condition(&input.ip_not_equals));
    }
    PolicyStatementEntry {
        principal: BTreeMap::from([("qcs".to_string(), principals)]),
        effect: input.effect,
        action: input.canned_action.map(actions_for).unwrap_or_default(),
        resource: resources,
        condition,
    }
}

/// Domain view of the statement at `index`.
///
/// With no directory `principal_names` stays empty; otherwise every principal
/// gets an entry, blank when the directory does not know it.
pub fn statement_to_domain(
    index: usize,
    entry: &PolicyStatementEntry,
    names: Option<&HashMap<String, String>>,
) -> PolicyStatement {
    let principal_id = principal_ids(entry.principal.get("qcs").map(Vec::as_slice).unwrap_or(&[]));
    let principal_names = match names {
        Some(names) => principal_id
            .iter()
            .map(|id| (id.clone(), names.get(id).cloned().unwrap_or_default()))
            .collect(),
        None => HashMap::new(),
    };
    PolicyStatement {
        id: index.to_string(),
        effect: entry.effect,
        principal: entry.principal.clone(),
        action: entry.action.clone(),
        resource: entry.resource.clone(),
        condition: entry.condition.clone(),
        resource_path: resource_paths(&entry.resource),
        canned_action: canned_action(&entry.action),
        principal_id,
        principal_names,
    }
}

/// Split a document's statements into those kept and those named by `ids`.
///
/// Ids are positional indices; ones that do not parse or are out of range
/// are ignored.
pub fn remove_statements(
    doc: PolicyDocument,
    ids: &[String],
) -> (PolicyDocument, Vec<(usize, PolicyStatementEntry)>) {
    let exclude: BTreeSet<usize> = ids.iter().filter_map(|id| id.trim().parse().ok()).collect();
    let mut kept = Vec::new();
    let mut removed = Vec::new();
    for (i, stmt) in doc.statement.into_iter().enumerate() {
        if exclude.contains(&i) {
            removed.push((i, stmt));
        } else {
            kept.push(stmt);
        }
    }
    (
        PolicyDocument {
            version: doc.version,
            principal: doc.principal,
            statement: kept,
        },
        removed,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::PolicyEffect;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_canned_action_detection() {
        assert_eq!(canned_action(&read_write_actions()), Some(CannedAction::ReadWrite));
        assert_eq!(
            canned_action(&actions_for(CannedAction::Read)),
            Some(CannedAction::Read)
        );
        assert_eq!(
            canned_action(&strings(&["name/cos:GetObject", "name/cos:*"])),
            Some(CannedAction::FullControl)
        );
        assert_eq!(canned_action(&[]), None);
        assert_eq!(canned_action(&strings(&["name/cos:GetObject"])), None);

        let mut shuffled = read_write_actions();
        shuffled.reverse();
        assert_eq!(canned_action(&shuffled), Some(CannedAction::ReadWrite));
    }

    #[test]
    fn test_principal_ids() {
        let ids = principal_ids(&strings(&[
            "qcs::cam::uin/100008182714:uin/100008182715",
            "qcs::cam::uin/100008182714:service/cdn",
            "qcs::cam::anyone:anyone",
        ]));
        assert_eq!(
            ids,
            strings(&["100008182714:100008182715", "100008182714:service/cdn", "anyone:anyone"])
        );
    }

    #[test]
    fn test_resource_paths() {
        let paths = resource_paths(&strings(&[
            "qcs::cos:ap-beijing:uid/100001:logs-100001/*",
            "qcs::cos:ap-beijing:uid/100001:logs-100001/images/a.png",
        ]));
        assert_eq!(paths, strings(&["logs-100001/*", "logs-100001/images/a.png"]));
    }

    #[test]
    fn test_principal_arns() {
        let arns = principal_arns(&strings(&["100002:100003", "100004", "100005:"]), None).unwrap();
        assert_eq!(
            arns,
            strings(&[
                "qcs::cam::uin/100002:uin/100003",
                "qcs::cam::uin/100004:uin/100004",
                "qcs::cam::uin/100005:uin/100005",
            ])
        );

        assert!(needs_owner(&strings(&[":100003"])));
        let arns = principal_arns(&strings(&[":100003"]), Some("100001")).unwrap();
        assert_eq!(arns, strings(&["qcs::cam::uin/100001:uin/100003"]));

        let err = principal_arns(&strings(&["1:2:3"]), None).unwrap_err();
        assert!(matches!(err, CloudError::Unsupported { .. }));
    }

    #[test]
    fn test_statement_from_input() {
        let input = PolicyStatementInput {
            principal_id: strings(&["100002:100003"]),
            effect: PolicyEffect::Allow,
            resource_path: strings(&["/*"]),
            canned_action: Some(CannedAction::Read),
            ip_equals: strings(&["10.0.0.0/8"]),
            ip_not_equals: vec![],
        };
        let principals = principal_arns(&input.principal_id, None).unwrap();
        let resources = resource_arns("ap-beijing", "100001", "logs-100001", &input.resource_path);
        let stmt = statement_from_input(&input, principals, resources);

        assert_eq!(stmt.principal["qcs"], strings(&["qcs::cam::uin/100002:uin/100003"]));
        assert_eq!(
            stmt.resource,
            strings(&["qcs::cos:ap-beijing:uid/100001:logs-100001/*"])
        );
        assert_eq!(stmt.action, actions_for(CannedAction::Read));
        assert_eq!(
            stmt.condition["ip_equal"]["qcs:ip"].values(),
            vec!["10.0.0.0/8"]
        );
        assert!(!stmt.condition.contains_key("ip_not_equal"));
    }

    #[test]
    fn test_statement_to_domain_names() {
        let entry = PolicyStatementEntry {
            principal: BTreeMap::from([(
                "qcs".to_string(),
                strings(&["qcs::cam::uin/100001:uin/100003", "qcs::cam::uin/100001:uin/100004"]),
            )]),
            action: actions_for(CannedAction::FullControl),
            resource: strings(&["qcs::cos:ap-beijing:uid/100001:logs-100001/*"]),
            ..Default::default()
        };

        let stmt = statement_to_domain(2, &entry, None);
        assert_eq!(stmt.id, "2");
        assert_eq!(stmt.canned_action, Some(CannedAction::FullControl));
        assert_eq!(stmt.principal_id, strings(&["100001:100003", "100001:100004"]));
        assert!(stmt.principal_names.is_empty());

        let names = HashMap::from([("100001:100003".to_string(), "alice".to_string())]);
        let stmt = statement_to_domain(0, &entry, Some(&names));
        assert_eq!(stmt.principal_names["100001:100003"], "alice");
        assert_eq!(stmt.principal_names["100001:100004"], "");
    }

    #[test]
    fn test_remove_statements_preserves_order() {
        let doc = PolicyDocument {
            version: POLICY_VERSION.to_string(),
            principal: BTreeMap::new(),
            statement: (0..5)
                .map(|i| PolicyStatementEntry {
                    action: vec![format!("a{}", i)],
                    ..Default::default()
                })
                .collect(),
        };
        let (kept, removed) = remove_statements(doc, &strings(&["3", "1", "x", "9"]));
        let kept: Vec<_> = kept.statement.iter().map(|s| s.action[0].clone()).collect();
        assert_eq!(kept, strings(&["a0", "a2", "a4"]));
        let removed: Vec<_> = removed.iter().map(|(i, _)| *i).collect();
        assert_eq!(removed, vec![1, 3]);
    }
}
