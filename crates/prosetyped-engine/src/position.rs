//! The position arithmetic the reveal logic needs, named for what it is used
//! for rather than for how the model computes it.

use prosetyped_model::{Descendants, Fragment, Node, ResolvedPos};

/// Number of positions a reveal of `node` walks through.
pub fn reveal_size(node: &Node) -> usize {
    node.content_size()
}

/// Content covering `[from, to)`. Out-of-range requests are clamped to the
/// document.
pub fn slice(node: &Node, from: usize, to: usize) -> Fragment {
    let size = reveal_size(node);
    let to = to.min(size);
    match node.slice(from.min(to), to) {
        Ok(slice) => slice.content,
        Err(err) => {
            log::warn!("slice {from}..{to} failed: {err}");
            Fragment::empty()
        }
    }
}

pub fn descendants(node: &Node) -> Descendants<'_> {
    node.descendants()
}

pub fn resolve(node: &Node, pos: usize) -> Option<ResolvedPos<'_>> {
    node.resolve(pos)
}

pub fn has_text(node: &Node) -> bool {
    node.has_text()
}

/// Length in characters of the longest common prefix of two strings.
pub fn shared_prefix_len(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}

/// Position just inside the closing token of the last textblock, where a
/// cursor belongs.
pub fn last_textblock_end(node: &Node) -> Option<usize> {
    descendants(node)
        .filter(|visit| visit.node.is_textblock())
        .last()
        .map(|visit| visit.pos + visit.node.node_size() - 1)
}
