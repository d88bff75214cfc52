use prosetyped_model::{Attrs, Node};

use crate::options::IgnoreAttribute;

/// Attribute keys excluded from comparison for one node type: the global
/// keys plus any scoped to that type.
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet<'a> {
    keys: Vec<&'a str>,
}

impl<'a> IgnoreSet<'a> {
    pub fn for_node_type(entries: &'a [IgnoreAttribute], node_type: &str) -> Self {
        let mut keys = Vec::new();
        for entry in entries {
            match entry {
                IgnoreAttribute::Key(key) => keys.push(key.as_str()),
                IgnoreAttribute::Scoped {
                    node_type: scoped,
                    attributes,
                } if scoped == node_type => {
                    keys.extend(attributes.iter().map(String::as_str));
                }
                IgnoreAttribute::Scoped { .. } => {}
            }
        }
        Self { keys }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(&key)
    }
}

/// Compare two attribute maps outside the ignored keys.
///
/// Only primitive values are compared. A nested (list or map) value on
/// either side counts as equal, it is never compared recursively. A
/// primitive present on one side only is a difference.
pub fn attrs_equal(a: &Attrs, b: &Attrs, ignored: &IgnoreSet<'_>) -> bool {
    a.keys()
        .chain(b.keys())
        .filter(|key| !ignored.contains(key))
        .all(|key| match (a.get(key), b.get(key)) {
            (Some(left), Some(right)) => {
                !left.is_primitive() || !right.is_primitive() || left == right
            }
            (Some(only), None) | (None, Some(only)) => !only.is_primitive(),
            (None, None) => true,
        })
}

/// Whether two nodes' attributes match under the ignore list that applies
/// to `a`'s node type.
pub fn nodes_equivalent(a: &Node, b: &Node, ignore: &[IgnoreAttribute]) -> bool {
    let ignored = IgnoreSet::for_node_type(ignore, a.type_name());
    attrs_equal(a.attrs(), b.attrs(), &ignored)
}
