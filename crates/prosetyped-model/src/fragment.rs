use std::sync::Arc;

use crate::node::Node;

/// An ordered, shared sequence of child nodes.
///
/// Construction normalizes inline content: empty text nodes are dropped and
/// neighbouring text nodes carrying the same marks are joined.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fragment {
    nodes: Arc<Vec<Node>>,
    size: usize,
}

impl Fragment {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Self {
        let mut joined: Vec<Node> = Vec::new();
        for node in nodes {
            if let Some(text) = node.text_str() {
                if text.is_empty() {
                    continue;
                }
                if let Some(last) = joined.last_mut()
                    && let Some(prev) = last.text_str()
                    && last.marks() == node.marks()
                {
                    *last = Node::text(format!("{prev}{text}"), node.marks().to_vec());
                    continue;
                }
            }
            joined.push(node);
        }
        let size = joined.iter().map(Node::node_size).sum();
        Self {
            nodes: Arc::new(joined),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn child_count(&self) -> usize {
        self.nodes.len()
    }

    /// # Panics
    /// Panics when `index` is out of range.
    pub fn child(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn maybe_child(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn first_child(&self) -> Option<&Node> {
        self.nodes.first()
    }

    pub fn last_child(&self) -> Option<&Node> {
        self.nodes.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn text_content(&self) -> String {
        self.nodes.iter().map(Node::text_content).collect()
    }

    pub fn has_text(&self) -> bool {
        self.nodes.iter().any(Node::has_text)
    }

    /// Children covering `from..to`; children only partly inside the range
    /// are cut down to it.
    pub fn cut(&self, from: usize, to: usize) -> Fragment {
        if from == 0 && to >= self.size {
            return self.clone();
        }
        let mut result = Vec::new();
        let mut pos = 0;
        if to > from {
            for child in self.nodes.iter() {
                if pos >= to {
                    break;
                }
                let end = pos + child.node_size();
                if end > from {
                    if pos < from || end > to {
                        let cut = if child.is_text() {
                            child.cut(from.saturating_sub(pos), child.node_size().min(to - pos))
                        } else {
                            child.cut(
                                from.saturating_sub(pos + 1),
                                child.content_size().min(to - pos - 1),
                            )
                        };
                        result.push(cut);
                    } else {
                        result.push(child.clone());
                    }
                }
                pos = end;
            }
        }
        Fragment::from_nodes(result)
    }

    pub fn append(&self, other: &Fragment) -> Fragment {
        Fragment::from_nodes(self.iter().chain(other.iter()).cloned())
    }

    /// Index of the child at `pos` and the offset where that child starts.
    /// A position on a boundary resolves to the child after it.
    pub fn find_index(&self, pos: usize) -> Option<(usize, usize)> {
        if pos == 0 {
            return Some((0, 0));
        }
        if pos == self.size {
            return Some((self.nodes.len(), pos));
        }
        if pos > self.size {
            return None;
        }
        let mut offset = 0;
        for (index, child) in self.nodes.iter().enumerate() {
            let end = offset + child.node_size();
            if end >= pos {
                if end == pos {
                    return Some((index + 1, end));
                }
                return Some((index, offset));
            }
            offset = end;
        }
        None
    }

    pub(crate) fn replace_child(&self, index: usize, node: Node) -> Fragment {
        let mut nodes = self.nodes.as_ref().clone();
        nodes[index] = node;
        Fragment::from_nodes(nodes)
    }
}

impl<'a> IntoIterator for &'a Fragment {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Mark, NodeType};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_adjacent_text_with_same_marks_is_joined() {
        let fragment = Fragment::from_nodes([
            Node::text("ab", Vec::new()),
            Node::text("", Vec::new()),
            Node::text("cd", Vec::new()),
            Node::text("ef", vec![Mark::new("em")]),
        ]);

        assert_eq!(fragment.child_count(), 2);
        assert_eq!(fragment.child(0).text_str(), Some("abcd"));
        assert_eq!(fragment.size(), 6);
    }

    #[test]
    fn test_find_index_prefers_following_child_on_boundaries() {
        let fragment = Fragment::from_nodes([
            Node::block(NodeType::Paragraph, vec![Node::text("ab", Vec::new())]),
            Node::block(NodeType::Paragraph, vec![Node::text("cd", Vec::new())]),
        ]);

        assert_eq!(fragment.find_index(0), Some((0, 0)));
        assert_eq!(fragment.find_index(2), Some((0, 0)));
        assert_eq!(fragment.find_index(4), Some((1, 4)));
        assert_eq!(fragment.find_index(8), Some((2, 8)));
        assert_eq!(fragment.find_index(9), None);
    }

    #[test]
    fn test_cut_trims_text_at_both_ends() {
        let fragment = Fragment::from_nodes([
            Node::text("abc", Vec::new()),
            Node::text("def", vec![Mark::new("strong")]),
        ]);

        let cut = fragment.cut(1, 5);

        assert_eq!(cut.text_content(), "bcde");
        assert_eq!(cut.child_count(), 2);
    }
}
