use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// Differences between two JSON trees.
///
/// A `Node` mirrors the shape of the inputs and only holds differing
/// children; a `Leaf` records a value that changed, appeared or vanished.
#[derive(Debug, Clone, PartialEq)]
pub enum DiffTree {
    Leaf {
        old: Option<Value>,
        new: Option<Value>,
    },
    Node(Vec<(String, DiffTree)>),
}

impl DiffTree {
    pub fn empty() -> Self {
        DiffTree::Node(Vec::new())
    }

    /// True iff no difference was recorded anywhere in the tree.
    pub fn is_empty(&self) -> bool {
        matches!(self, DiffTree::Node(children) if children.is_empty())
    }

    /// Child subtree for `key`, if that key differs.
    pub fn get(&self, key: &str) -> Option<&DiffTree> {
        match self {
            DiffTree::Node(children) => children.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            DiffTree::Leaf { .. } => None,
        }
    }

    /// Follow a path of keys down the tree.
    pub fn at(&self, path: &[&str]) -> Option<&DiffTree> {
        path.iter().try_fold(self, |node, key| node.get(key))
    }

    /// Number of changed leaves.
    pub fn change_count(&self) -> usize {
        match self {
            DiffTree::Leaf { .. } => 1,
            DiffTree::Node(children) => children.iter().map(|(_, c)| c.change_count()).sum(),
        }
    }

    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

impl Serialize for DiffTree {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            DiffTree::Leaf { old, new } => {
                let len = usize::from(old.is_some()) + usize::from(new.is_some());
                let mut map = serializer.serialize_map(Some(len))?;
                if let Some(old) = old {
                    map.serialize_entry("old", old)?;
                }
                if let Some(new) = new {
                    map.serialize_entry("new", new)?;
                }
                map.end()
            }
            DiffTree::Node(children) => {
                let mut map = serializer.serialize_map(Some(children.len()))?;
                for (key, child) in children {
                    map.serialize_entry(key, child)?;
                }
                map.end()
            }
        }
    }
}
