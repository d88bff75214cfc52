//! Markdown source to document tree, using pulldown-cmark's event stream.
//!
//! Node and mark names follow the markdown schema: `heading{level}`,
//! `code_block{params}`, `ordered_list{order,tight}`, `bullet_list{tight}`,
//! `image{src,alt,title}`, marks `em`, `strong`, `code`, `strike` and
//! `link{href,title}`.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};

use crate::fragment::Fragment;
use crate::node::{AttrValue, Attrs, Mark, Node, NodeType};

/// Parse markdown into a `doc` node. Never fails: anything the schema has
/// no node for is either flattened to text or dropped.
pub fn parse(source: &str) -> Node {
    let mut builder = TreeBuilder::new();
    for event in Parser::new_ext(source, Options::ENABLE_STRIKETHROUGH) {
        builder.event(event);
    }
    builder.finish()
}

#[derive(Debug)]
struct OpenBlock {
    node_type: NodeType,
    attrs: Attrs,
    children: Vec<Node>,
    /// Paragraph opened for inline content of a tight list item.
    implicit: bool,
}

impl OpenBlock {
    fn new(node_type: NodeType, attrs: Attrs) -> Self {
        Self {
            node_type,
            attrs,
            children: Vec::new(),
            implicit: false,
        }
    }

    fn into_node(self) -> Node {
        if self.node_type == NodeType::CodeBlock {
            let text: String = self.children.iter().map(Node::text_content).collect();
            let code = text.strip_suffix('\n').unwrap_or(&text).to_string();
            return Node::new(
                NodeType::CodeBlock,
                self.attrs,
                Fragment::from_nodes([Node::text(code, Vec::new())]),
            );
        }
        Node::new(self.node_type, self.attrs, Fragment::from_nodes(self.children))
    }
}

/// What a start tag pushed, so the matching end tag knows what to pop.
#[derive(Debug)]
enum Frame {
    Block,
    Mark,
    Image,
    Skip,
}

#[derive(Debug)]
struct PendingImage {
    attrs: Attrs,
    alt: String,
}

#[derive(Debug)]
struct TreeBuilder {
    blocks: Vec<OpenBlock>,
    frames: Vec<Frame>,
    marks: Vec<Mark>,
    image: Option<PendingImage>,
}

fn attrs<const N: usize>(pairs: [(&str, AttrValue); N]) -> Attrs {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            blocks: vec![OpenBlock::new(NodeType::Doc, Attrs::new())],
            frames: Vec::new(),
            marks: Vec::new(),
            image: None,
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(_) => self.end(),
            Event::Text(text) => self.text(&text, None),
            Event::Code(code) => self.text(&code, Some(Mark::new("code"))),
            Event::Html(html) | Event::InlineHtml(html) => self.text(&html, None),
            Event::SoftBreak => self.text("\n", None),
            Event::HardBreak => self.inline(Node::leaf(NodeType::HardBreak, Attrs::new())),
            Event::Rule => {
                self.close_implicit();
                self.push_child(Node::leaf(NodeType::HorizontalRule, Attrs::new()));
            }
            Event::TaskListMarker(checked) => {
                self.text(if checked { "[x] " } else { "[ ] " }, None)
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph | Tag::HtmlBlock => self.open(NodeType::Paragraph, Attrs::new()),
            Tag::Heading { level, .. } => self.open(
                NodeType::Heading,
                attrs([("level", AttrValue::Int(level as i64))]),
            ),
            Tag::BlockQuote(_) => self.open(NodeType::Blockquote, Attrs::new()),
            Tag::CodeBlock(kind) => {
                let params = match kind {
                    CodeBlockKind::Fenced(info) => info.to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                self.open(NodeType::CodeBlock, attrs([("params", params.into())]));
            }
            Tag::List(Some(order)) => self.open(
                NodeType::OrderedList,
                attrs([
                    ("order", AttrValue::Int(order as i64)),
                    ("tight", false.into()),
                ]),
            ),
            Tag::List(None) => {
                self.open(NodeType::BulletList, attrs([("tight", false.into())]))
            }
            Tag::Item => self.open(NodeType::ListItem, Attrs::new()),
            Tag::Emphasis => self.mark(Mark::new("em")),
            Tag::Strong => self.mark(Mark::new("strong")),
            Tag::Strikethrough => self.mark(Mark::new("strike")),
            Tag::Link {
                dest_url, title, ..
            } => {
                let mut link = Mark::new("link").with_attr("href", dest_url.to_string());
                if !title.is_empty() {
                    link = link.with_attr("title", title.to_string());
                }
                self.mark(link);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                let mut image_attrs = attrs([("src", dest_url.to_string().into())]);
                if !title.is_empty() {
                    image_attrs.insert("title".to_string(), title.to_string().into());
                }
                self.image = Some(PendingImage {
                    attrs: image_attrs,
                    alt: String::new(),
                });
                self.frames.push(Frame::Image);
            }
            _ => self.frames.push(Frame::Skip),
        }
    }

    fn end(&mut self) {
        match self.frames.pop() {
            Some(Frame::Block) => {
                self.close_implicit();
                if self.blocks.len() > 1
                    && let Some(block) = self.blocks.pop()
                {
                    self.push_child(block.into_node());
                }
            }
            Some(Frame::Mark) => {
                self.marks.pop();
            }
            Some(Frame::Image) => {
                if let Some(image) = self.image.take() {
                    let mut attrs = image.attrs;
                    attrs.insert("alt".to_string(), image.alt.into());
                    let node = Node::leaf(NodeType::Image, attrs).with_marks(self.marks.clone());
                    self.inline(node);
                }
            }
            Some(Frame::Skip) | None => {}
        }
    }

    fn open(&mut self, node_type: NodeType, attrs: Attrs) {
        self.close_implicit();
        self.blocks.push(OpenBlock::new(node_type, attrs));
        self.frames.push(Frame::Block);
    }

    fn mark(&mut self, mark: Mark) {
        self.marks.push(mark);
        self.frames.push(Frame::Mark);
    }

    fn text(&mut self, text: &str, extra: Option<Mark>) {
        if text.is_empty() {
            return;
        }
        if let Some(image) = &mut self.image {
            image.alt.push_str(text);
            return;
        }
        let mut marks = self.marks.clone();
        marks.extend(extra);
        self.inline(Node::text(text, marks));
    }

    fn inline(&mut self, node: Node) {
        self.ensure_textblock();
        self.push_child(node);
    }

    fn push_child(&mut self, node: Node) {
        if let Some(parent) = self.blocks.last_mut() {
            parent.children.push(node);
        }
    }

    fn ensure_textblock(&mut self) {
        if self
            .blocks
            .last()
            .is_some_and(|block| block.node_type.is_textblock())
        {
            return;
        }
        // Inline content straight inside a list item means the list is tight.
        let len = self.blocks.len();
        if len >= 2
            && self.blocks[len - 1].node_type == NodeType::ListItem
            && let Some(list) = self.blocks.get_mut(len - 2)
            && matches!(list.node_type, NodeType::BulletList | NodeType::OrderedList)
        {
            list.attrs.insert("tight".to_string(), true.into());
        }
        let mut paragraph = OpenBlock::new(NodeType::Paragraph, Attrs::new());
        paragraph.implicit = true;
        self.blocks.push(paragraph);
    }

    fn close_implicit(&mut self) {
        if self.blocks.last().is_some_and(|block| block.implicit)
            && let Some(paragraph) = self.blocks.pop()
        {
            self.push_child(paragraph.into_node());
        }
    }

    fn finish(mut self) -> Node {
        self.close_implicit();
        while self.blocks.len() > 1 {
            if let Some(block) = self.blocks.pop() {
                self.push_child(block.into_node());
            }
        }
        let children = self
            .blocks
            .pop()
            .map(|doc| doc.children)
            .unwrap_or_default();
        Node::fill_doc(Fragment::from_nodes(children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn child_types(node: &Node) -> Vec<&'static str> {
        node.content().iter().map(Node::type_name).collect()
    }

    #[test]
    fn test_heading_and_marked_paragraph() {
        let doc = parse("# Title\n\nHello *world*");

        assert_eq!(child_types(&doc), vec!["heading", "paragraph"]);
        assert_eq!(doc.child(0).attr("level"), Some(&AttrValue::Int(1)));
        let paragraph = doc.child(1);
        assert_eq!(paragraph.child_count(), 2);
        assert_eq!(paragraph.child(1).text_str(), Some("world"));
        assert_eq!(paragraph.child(1).marks(), &[Mark::new("em")]);
    }

    #[test]
    fn test_tight_list_items_get_paragraphs() {
        let doc = parse("- a\n- b");

        let list = doc.child(0);
        assert_eq!(list.node_type(), NodeType::BulletList);
        assert_eq!(list.attr("tight"), Some(&AttrValue::Bool(true)));
        assert_eq!(child_types(list), vec!["list_item", "list_item"]);
        assert_eq!(child_types(list.child(0)), vec!["paragraph"]);
        assert_eq!(list.child(1).text_content(), "b");
    }

    #[test]
    fn test_loose_list_is_not_tight() {
        let doc = parse("- a\n\n- b");

        assert_eq!(doc.child(0).attr("tight"), Some(&AttrValue::Bool(false)));
    }

    #[test]
    fn test_nested_list_inside_tight_item() {
        let doc = parse("- parent\n  - child");

        let item = doc.child(0).child(0);
        assert_eq!(child_types(item), vec!["paragraph", "bullet_list"]);
        assert_eq!(item.child(1).text_content(), "child");
    }

    #[test]
    fn test_ordered_list_keeps_start_number() {
        let doc = parse("3. x\n4. y");

        assert_eq!(doc.child(0).attr("order"), Some(&AttrValue::Int(3)));
    }

    #[test]
    fn test_fenced_code_drops_trailing_newline() {
        let doc = parse("```rust\nfn main() {}\n```");

        let code = doc.child(0);
        assert_eq!(code.node_type(), NodeType::CodeBlock);
        assert_eq!(code.attr("params"), Some(&AttrValue::from("rust")));
        assert_eq!(code.text_content(), "fn main() {}");
    }

    #[test]
    fn test_image_collects_alt_text() {
        let doc = parse("![alt *text*](a.png \"T\")");

        let image = doc.child(0).child(0);
        assert_eq!(image.node_type(), NodeType::Image);
        assert_eq!(image.attr("src"), Some(&AttrValue::from("a.png")));
        assert_eq!(image.attr("alt"), Some(&AttrValue::from("alt text")));
        assert_eq!(image.attr("title"), Some(&AttrValue::from("T")));
        assert_eq!(image.node_size(), 1);
    }

    #[test]
    fn test_link_mark_carries_href() {
        let doc = parse("[site](https://example.com)");

        let text = doc.child(0).child(0);
        assert_eq!(text.marks()[0].name(), "link");
        assert_eq!(
            text.marks()[0].attr("href"),
            Some(&AttrValue::from("https://example.com"))
        );
    }

    #[rstest]
    #[case("", vec!["paragraph"])]
    #[case("> quoted", vec!["blockquote"])]
    #[case("above\n\n---\n\nbelow", vec!["paragraph", "horizontal_rule", "paragraph"])]
    #[case("line one  \nline two", vec!["paragraph"])]
    #[case("## Sub\n- item", vec!["heading", "bullet_list"])]
    fn test_top_level_structure(#[case] source: &str, #[case] expected: Vec<&str>) {
        assert_eq!(child_types(&parse(source)), expected);
    }

    #[test]
    fn test_hard_break_is_an_inline_atom() {
        let doc = parse("line one  \nline two");

        let paragraph = doc.child(0);
        assert_eq!(child_types(paragraph), vec!["text", "hard_break", "text"]);
    }

    #[test]
    fn test_inline_code_and_strikethrough_become_marks() {
        let doc = parse("a `b` ~~c~~");

        let paragraph = doc.child(0);
        let marks: Vec<Vec<&str>> = paragraph
            .content()
            .iter()
            .map(|n| n.marks().iter().map(Mark::name).collect())
            .collect();
        assert_eq!(marks, vec![vec![], vec!["code"], vec![], vec!["strike"]]);
    }
}
