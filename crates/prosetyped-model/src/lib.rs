//! Immutable document trees addressed through a flat position space.
//!
//! Every node boundary and every character of text maps to exactly one
//! integer position, the same scheme ProseMirror uses:
//!
//! - a text node is as large as its character count
//! - an atom (`image`, `hard_break`, `horizontal_rule`) has size 1
//! - any other node has size `content + 2`, one token for opening and one
//!   for closing it
//!
//! Positions passed to [`Node`] methods are offsets into that node's content,
//! so a document's positions run from `0` to [`Node::content_size`].
//!
//! ```rust
//! use prosetyped_model::markdown;
//!
//! let doc = markdown::parse("Hello *world*");
//! assert_eq!(doc.content_size(), 13);
//! assert_eq!(doc.cut(0, 6).text_content(), "Hello");
//! ```

pub mod fragment;
pub mod html;
pub mod markdown;
pub mod node;
pub mod position;
pub mod schema;

pub use fragment::Fragment;
pub use node::{AttrValue, Attrs, Mark, Node, NodeType};
pub use position::{Descendants, ResolvedPos, Slice, Visit};
pub use schema::Schema;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("position {pos} is outside the document (content size {size})")]
    PositionOutOfRange { pos: usize, size: usize },
    #[error("cannot replace {from}..{to}: the range crosses a node boundary")]
    InvalidReplace { from: usize, to: usize },
}
