// ─── Structural Differ ───
// Deep comparison of two JSON trees. Ignore rules mask volatile substrings
// (signed query parameters) at specific paths before values are compared.

pub mod path;
pub mod tree;

use serde_json::Value;

pub use path::{default_ignore_rules, IgnoreRule, PathPattern, Segment, AUTH_KEY_PATTERN};
pub use tree::DiffTree;

/// Compute the differences between `a` (old) and `b` (new).
///
/// The result is empty iff both trees are equal once every matching ignore
/// rule has been applied.
pub fn diff(a: &Value, b: &Value, rules: &[IgnoreRule]) -> DiffTree {
    let mut path = Vec::new();
    diff_at(Some(a), Some(b), rules, &mut path)
}

/// `diff(a, b, rules).is_empty()`.
pub fn equivalent(a: &Value, b: &Value, rules: &[IgnoreRule]) -> bool {
    diff(a, b, rules).is_empty()
}

fn diff_at(
    a: Option<&Value>,
    b: Option<&Value>,
    rules: &[IgnoreRule],
    path: &mut Vec<String>,
) -> DiffTree {
    if a == b {
        return DiffTree::empty();
    }

    if let (Some(Value::String(sa)), Some(Value::String(sb))) = (a, b) {
        if let Some(rule) = rules.iter().find(|r| r.path.matches(path.as_slice())) {
            if rule.normalize(sa) == rule.normalize(sb) {
                return DiffTree::empty();
            }
        }
    }

    match (a, b) {
        (Some(Value::Object(ma)), Some(Value::Object(mb))) => {
            let keys = ma
                .keys()
                .chain(mb.keys().filter(|k| !ma.contains_key(*k)))
                .cloned()
                .collect::<Vec<_>>();
            diff_children(keys, |k| ma.get(k), |k| mb.get(k), rules, path)
        }
        (Some(Value::Array(va)), Some(Value::Array(vb))) => {
            let keys = (0..va.len().max(vb.len()))
                .map(|i| i.to_string())
                .collect::<Vec<_>>();
            let index = |k: &str| k.parse::<usize>().ok();
            diff_children(
                keys,
                |k| index(k).and_then(|i| va.get(i)),
                |k| index(k).and_then(|i| vb.get(i)),
                rules,
                path,
            )
        }
        _ => DiffTree::Leaf {
            old: a.cloned(),
            new: b.cloned(),
        },
    }
}

fn diff_children<'v, FA, FB>(
    keys: Vec<String>,
    get_a: FA,
    get_b: FB,
    rules: &[IgnoreRule],
    path: &mut Vec<String>,
) -> DiffTree
where
    FA: Fn(&str) -> Option<&'v Value>,
    FB: Fn(&str) -> Option<&'v Value>,
{
    let mut children = Vec::new();
    for key in keys {
        path.push(key.clone());
        let child = diff_at(get_a(&key), get_b(&key), rules, path);
        path.pop();
        if !child.is_empty() {
            children.push((key, child));
        }
    }
    DiffTree::Node(children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn auth_rule(path: &str) -> IgnoreRule {
        IgnoreRule::new(path, AUTH_KEY_PATTERN).unwrap()
    }

    #[test]
    fn identical_trees_have_empty_diff() {
        let a = json!({"req": {"appCode": "x"}, "rsp": {"version": "1.0.0", "list": [1, 2]}});
        assert!(diff(&a, &a.clone(), &[]).is_empty());
    }

    #[test]
    fn key_order_does_not_matter() {
        let a: Value = serde_json::from_str(r#"{"a": 1, "b": {"c": 2, "d": 3}}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"b": {"d": 3, "c": 2}, "a": 1}"#).unwrap();
        assert!(equivalent(&a, &b, &[]));
    }

    #[test]
    fn changed_leaf_is_recorded_with_old_and_new() {
        let a = json!({"rsp": {"version": "1.0.0", "state": 1}});
        let b = json!({"rsp": {"version": "1.1.0", "state": 1}});
        let d = diff(&a, &b, &[]);
        assert_eq!(
            serde_json::to_value(&d).unwrap(),
            json!({"rsp": {"version": {"old": "1.0.0", "new": "1.1.0"}}})
        );
    }

    #[test]
    fn added_and_removed_keys_are_reported() {
        let a = json!({"gone": 1, "kept": true});
        let b = json!({"kept": true, "fresh": "x"});
        let d = diff(&a, &b, &[]);
        assert_eq!(
            serde_json::to_value(&d).unwrap(),
            json!({"gone": {"old": 1}, "fresh": {"new": "x"}})
        );
    }

    #[test]
    fn ignore_rule_masks_signed_url() {
        let a = json!({"rsp": {"pkg": {"url": "https://x/f?auth_key=A"}}});
        let b = json!({"rsp": {"pkg": {"url": "https://x/f?auth_key=B"}}});
        assert!(!equivalent(&a, &b, &[]));
        assert!(diff(&a, &b, &[auth_rule("rsp.pkg.url")]).is_empty());
    }

    #[test]
    fn ignore_rule_does_not_hide_real_changes() {
        let a = json!({"rsp": {"pkg": {"url": "https://x/f1?auth_key=A"}}});
        let b = json!({"rsp": {"pkg": {"url": "https://x/f2?auth_key=B"}}});
        let d = diff(&a, &b, &[auth_rule("rsp.pkg.url")]);
        assert!(d.at(&["rsp", "pkg", "url"]).is_some());
    }

    #[test]
    fn ignore_rule_only_applies_at_its_path() {
        let a = json!({"rsp": {"other": "https://x/f?auth_key=A"}});
        let b = json!({"rsp": {"other": "https://x/f?auth_key=B"}});
        assert!(!diff(&a, &b, &[auth_rule("rsp.pkg.url")]).is_empty());
    }

    #[test]
    fn wildcard_rule_applies_to_every_array_element() {
        let a = json!({"rsp": {"pkg": {"packs": [
            {"url": "https://x/0?auth_key=A", "md5": "m0"},
            {"url": "https://x/1?auth_key=A", "md5": "m1"}
        ]}}});
        let b = json!({"rsp": {"pkg": {"packs": [
            {"url": "https://x/0?auth_key=B", "md5": "m0"},
            {"url": "https://x/1?auth_key=C", "md5": "m1"}
        ]}}});
        assert!(equivalent(&a, &b, &[auth_rule("rsp.pkg.packs.*.url")]));
    }

    #[test]
    fn array_length_change_is_reported_by_index() {
        let a = json!({"list": [1, 2]});
        let b = json!({"list": [1, 2, 3]});
        let d = diff(&a, &b, &[]);
        assert_eq!(
            serde_json::to_value(&d).unwrap(),
            json!({"list": {"2": {"new": 3}}})
        );
    }

    #[test]
    fn empty_array_and_empty_object_differ() {
        let a = json!({"v": []});
        let b = json!({"v": {}});
        assert!(!equivalent(&a, &b, &[]));
    }

    #[test]
    fn null_against_object_is_a_leaf_change() {
        let a = json!({"rsp": {"patch": null}});
        let b = json!({"rsp": {"patch": {"url": "u"}}});
        let d = diff(&a, &b, &[]);
        assert_eq!(
            d.at(&["rsp", "patch"]),
            Some(&DiffTree::Leaf {
                old: Some(Value::Null),
                new: Some(json!({"url": "u"}))
            })
        );
    }

    #[test]
    fn scalar_roots_compare_as_leaf() {
        assert!(equivalent(&json!("a"), &json!("a"), &[]));
        assert!(!diff(&json!(1), &json!(2), &[]).is_empty());
    }
}
