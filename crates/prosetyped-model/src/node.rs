use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::ModelError;
use crate::fragment::Fragment;

/// Node kinds of the markdown schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Doc,
    Paragraph,
    Heading,
    Blockquote,
    CodeBlock,
    HorizontalRule,
    BulletList,
    OrderedList,
    ListItem,
    Image,
    HardBreak,
    Text,
}

impl NodeType {
    pub const ALL: [NodeType; 12] = [
        NodeType::Doc,
        NodeType::Paragraph,
        NodeType::Heading,
        NodeType::Blockquote,
        NodeType::CodeBlock,
        NodeType::HorizontalRule,
        NodeType::BulletList,
        NodeType::OrderedList,
        NodeType::ListItem,
        NodeType::Image,
        NodeType::HardBreak,
        NodeType::Text,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NodeType::Doc => "doc",
            NodeType::Paragraph => "paragraph",
            NodeType::Heading => "heading",
            NodeType::Blockquote => "blockquote",
            NodeType::CodeBlock => "code_block",
            NodeType::HorizontalRule => "horizontal_rule",
            NodeType::BulletList => "bullet_list",
            NodeType::OrderedList => "ordered_list",
            NodeType::ListItem => "list_item",
            NodeType::Image => "image",
            NodeType::HardBreak => "hard_break",
            NodeType::Text => "text",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|node_type| node_type.name() == name)
    }

    /// Blocks whose children are inline content.
    pub fn is_textblock(self) -> bool {
        matches!(
            self,
            NodeType::Paragraph | NodeType::Heading | NodeType::CodeBlock
        )
    }

    pub fn is_inline(self) -> bool {
        matches!(
            self,
            NodeType::Text | NodeType::Image | NodeType::HardBreak
        )
    }

    /// Leaves that occupy a single position.
    pub fn is_atom(self) -> bool {
        matches!(
            self,
            NodeType::HorizontalRule | NodeType::Image | NodeType::HardBreak
        )
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Attribute value attached to a node or mark.
///
/// `List` and `Map` are the only non-primitive variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<AttrValue>),
    Map(BTreeMap<String, AttrValue>),
}

impl AttrValue {
    pub fn is_primitive(&self) -> bool {
        !matches!(self, AttrValue::List(_) | AttrValue::Map(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

pub type Attrs = BTreeMap<String, AttrValue>;

/// Inline formatting applied to a text or inline node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attrs: Attrs,
}

impl Mark {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Attrs::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }
}

/// An immutable tree node.
///
/// Clones share their children, so replacing a whole tree is cheap and a
/// node handed out is never mutated afterwards. Every edit returns a new
/// value.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    node_type: NodeType,
    attrs: Attrs,
    content: Fragment,
    text: Option<Arc<str>>,
    marks: Vec<Mark>,
    size: usize,
}

impl Node {
    /// Create a non-text node. Atoms ignore `content`; use [`Node::text`]
    /// for text.
    pub fn new(node_type: NodeType, attrs: Attrs, content: Fragment) -> Self {
        if node_type == NodeType::Text {
            return Self::text("", Vec::new());
        }
        let (content, size) = if node_type.is_atom() {
            (Fragment::empty(), 1)
        } else {
            let size = content.size() + 2;
            (content, size)
        };
        Self {
            node_type,
            attrs,
            content,
            text: None,
            marks: Vec::new(),
            size,
        }
    }

    pub fn text(text: impl Into<Arc<str>>, marks: Vec<Mark>) -> Self {
        let text: Arc<str> = text.into();
        let size = text.chars().count();
        Self {
            node_type: NodeType::Text,
            attrs: Attrs::new(),
            content: Fragment::empty(),
            text: Some(text),
            marks,
            size,
        }
    }

    /// Shorthand for an attribute-less node with the given children.
    pub fn block(node_type: NodeType, children: Vec<Node>) -> Self {
        Self::new(node_type, Attrs::new(), Fragment::from_nodes(children))
    }

    pub fn leaf(node_type: NodeType, attrs: Attrs) -> Self {
        Self::new(node_type, attrs, Fragment::empty())
    }

    pub fn doc(content: Fragment) -> Self {
        Self::new(NodeType::Doc, Attrs::new(), content)
    }

    /// Create a document from `content`, adding the empty paragraph a
    /// document needs when there is nothing else to hold.
    pub fn fill_doc(content: Fragment) -> Self {
        if content.is_empty() {
            Self::doc(Fragment::from_nodes([Node::block(
                NodeType::Paragraph,
                Vec::new(),
            )]))
        } else {
            Self::doc(content)
        }
    }

    /// Same node type, attributes and marks with different children.
    pub fn with_content(&self, content: Fragment) -> Self {
        let mut node = Self::new(self.node_type, self.attrs.clone(), content);
        node.marks = self.marks.clone();
        node
    }

    pub fn with_marks(mut self, marks: Vec<Mark>) -> Self {
        self.marks = marks;
        self
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn type_name(&self) -> &'static str {
        self.node_type.name()
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    pub fn content(&self) -> &Fragment {
        &self.content
    }

    pub fn text_str(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    pub fn is_text(&self) -> bool {
        self.text.is_some()
    }

    pub fn is_textblock(&self) -> bool {
        self.node_type.is_textblock()
    }

    pub fn is_inline(&self) -> bool {
        self.node_type.is_inline()
    }

    pub fn is_atom(&self) -> bool {
        self.node_type.is_atom()
    }

    /// Size of this node in its parent's position space.
    pub fn node_size(&self) -> usize {
        self.size
    }

    pub fn content_size(&self) -> usize {
        self.content.size()
    }

    pub fn child_count(&self) -> usize {
        self.content.child_count()
    }

    /// # Panics
    /// Panics when `index` is out of range, see [`Node::maybe_child`].
    pub fn child(&self, index: usize) -> &Node {
        self.content.child(index)
    }

    pub fn maybe_child(&self, index: usize) -> Option<&Node> {
        self.content.maybe_child(index)
    }

    /// All text in the subtree, concatenated in document order.
    pub fn text_content(&self) -> String {
        match &self.text {
            Some(text) => text.to_string(),
            None => self.content.text_content(),
        }
    }

    /// Whether any non-empty text exists in the subtree.
    pub fn has_text(&self) -> bool {
        match &self.text {
            Some(text) => !text.is_empty(),
            None => self.content.has_text(),
        }
    }

    /// The part of this node between `from` and `to`, closing any node the
    /// range opens. For text nodes the range counts characters.
    pub fn cut(&self, from: usize, to: usize) -> Node {
        if let Some(text) = &self.text {
            let to = to.min(self.size);
            if from == 0 && to == self.size {
                return self.clone();
            }
            let cut: String = text
                .chars()
                .skip(from)
                .take(to.saturating_sub(from))
                .collect();
            return Node::text(cut, self.marks.clone());
        }
        if from == 0 && to >= self.content.size() {
            return self.clone();
        }
        self.with_content(self.content.cut(from, to))
    }

    /// Replace `from..to` with `content`. Both ends must sit in the same
    /// parent; text nodes are split as needed.
    pub fn replace(&self, from: usize, to: usize, content: Fragment) -> Result<Node, ModelError> {
        let size = self.content_size();
        if from > to || to > size {
            return Err(ModelError::PositionOutOfRange { pos: to, size });
        }
        self.replace_within(from, to, content)
    }

    fn replace_within(&self, from: usize, to: usize, content: Fragment) -> Result<Node, ModelError> {
        let mut offset = 0;
        for (index, child) in self.content.iter().enumerate() {
            let end = offset + child.node_size();
            if !child.is_text() && !child.is_atom() && from > offset && to < end {
                let inner = child.replace_within(from - offset - 1, to - offset - 1, content)?;
                return Ok(self.with_content(self.content.replace_child(index, inner)));
            }
            let splits = |pos: usize| offset < pos && pos < end;
            if !child.is_text() && (splits(from) || splits(to)) {
                return Err(ModelError::InvalidReplace { from, to });
            }
            offset = end;
        }

        let before = self.content.cut(0, from);
        let after = self.content.cut(to, self.content.size());
        let nodes = before
            .iter()
            .chain(content.iter())
            .chain(after.iter())
            .cloned();
        Ok(self.with_content(Fragment::from_nodes(nodes)))
    }
}
