//! Turns a tree and a reveal position into the snapshot listeners receive.

use prosetyped_model::{Fragment, Mark, Node, NodeType, Schema};

use crate::options::Options;
use crate::position::{has_text, last_textblock_end, slice};

/// Keeps an empty line at its full height in the rendered snapshot.
pub const EMPTY_LINE_PLACEHOLDER: char = '\u{200B}';

/// Stands in for the cursor glyph during the hidden blink phase when the
/// glyph carries a mark, so the marked box does not collapse.
pub const BLINK_PLACEHOLDER: char = '\u{00A0}';

/// How the cursor is drawn: its glyph and the mark wrapping it.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorStyle {
    pub glyph: String,
    pub mark: Option<Mark>,
}

impl CursorStyle {
    pub fn resolve(options: &Options, schema: &Schema) -> Self {
        let mark = options.cursor_mark.as_deref().and_then(|name| {
            let mark = schema.mark(name);
            if mark.is_none() {
                log::debug!("cursor mark {name:?} is not in the schema, drawing an unmarked cursor");
            }
            mark
        });
        Self {
            glyph: options.cursor_glyph.clone(),
            mark,
        }
    }

    fn marks(&self) -> Vec<Mark> {
        self.mark.iter().cloned().collect()
    }

    fn glyph_node(&self) -> Node {
        Node::text(self.glyph.as_str(), self.marks())
    }

    fn blink_node(&self) -> Node {
        Node::text(BLINK_PLACEHOLDER.to_string(), self.marks())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// Snapshot to show now.
    pub visible: Fragment,
    /// Snapshot for the hidden blink phase, present when a cursor is drawn.
    pub blink: Option<Fragment>,
}

pub fn project(node: &Node, pos: usize, cursor: Option<&CursorStyle>) -> Projection {
    let mut view = Node::fill_doc(slice(node, 0, pos));
    if !has_text(&view) {
        view = with_empty_line_placeholder(view);
    }

    let Some(cursor) = cursor else {
        return Projection {
            visible: view.content().clone(),
            blink: None,
        };
    };

    let visible = insert_at_cursor(&view, cursor.glyph_node());
    let blink = if cursor.mark.is_some() {
        insert_at_cursor(&view, cursor.blink_node())
    } else {
        view
    };
    Projection {
        visible: visible.content().clone(),
        blink: Some(blink.content().clone()),
    }
}

fn with_empty_line_placeholder(view: Node) -> Node {
    let placeholder = Node::text(EMPTY_LINE_PLACEHOLDER.to_string(), Vec::new());
    let replaced = match last_textblock_end(&view) {
        Some(at) => view.replace(at, at, Fragment::from_nodes([placeholder])),
        None => {
            let end = view.content_size();
            let paragraph = Node::block(NodeType::Paragraph, vec![placeholder]);
            view.replace(end, end, Fragment::from_nodes([paragraph]))
        }
    };
    replaced.unwrap_or_else(|err| {
        log::warn!("could not insert empty line placeholder: {err}");
        view
    })
}

/// Insert an inline node at the end of the last textblock, or in a fresh
/// paragraph at the start when the view has no textblock.
fn insert_at_cursor(view: &Node, inline: Node) -> Node {
    let replaced = match last_textblock_end(view) {
        Some(at) => view.replace(at, at, Fragment::from_nodes([inline])),
        None => {
            let paragraph = Node::block(NodeType::Paragraph, vec![inline]);
            view.replace(0, 0, Fragment::from_nodes([paragraph]))
        }
    };
    replaced.unwrap_or_else(|err| {
        log::warn!("could not place cursor: {err}");
        view.clone()
    })
}
