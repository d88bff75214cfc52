use crate::node::{Mark, NodeType};

/// The set of names a document may use.
///
/// Node kinds are fixed by [`NodeType`]; marks are open-ended so hosts can
/// register extra ones (a styled cursor, highlights) next to the markdown
/// marks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    marks: Vec<String>,
}

impl Schema {
    pub const MARKDOWN_MARKS: [&'static str; 5] = ["em", "strong", "code", "link", "strike"];

    pub fn markdown() -> Self {
        Self {
            marks: Self::MARKDOWN_MARKS.iter().map(|m| m.to_string()).collect(),
        }
    }

    pub fn with_mark(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.has_mark(&name) {
            self.marks.push(name);
        }
        self
    }

    pub fn has_mark(&self, name: &str) -> bool {
        self.marks.iter().any(|m| m == name)
    }

    /// An attribute-less mark, if `name` is known to this schema.
    pub fn mark(&self, name: &str) -> Option<Mark> {
        self.has_mark(name).then(|| Mark::new(name))
    }

    pub fn marks(&self) -> impl Iterator<Item = &str> {
        self.marks.iter().map(String::as_str)
    }

    pub fn node_type(&self, name: &str) -> Option<NodeType> {
        NodeType::from_name(name)
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::markdown()
    }
}
