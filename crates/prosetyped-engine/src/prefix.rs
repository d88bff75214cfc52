use prosetyped_model::{Node, Visit};

use crate::attrs::nodes_equivalent;
use crate::options::IgnoreAttribute;
use crate::position::{descendants, resolve, reveal_size, shared_prefix_len};

/// The largest position in `prev` up to which a partial reveal renders the
/// same against `next`.
///
/// A running reveal may keep everything before this position on screen when
/// `next` replaces `prev`, and must rewind to it otherwise.
pub fn common_prefix(prev: &Node, next: &Node, ignore: &[IgnoreAttribute]) -> usize {
    let next_size = reveal_size(next);
    let mut common = 0;

    for visit in descendants(prev) {
        let Some(candidate) = counterpart(&visit, next, next_size, ignore) else {
            common = common.min(visit.pos);
            break;
        };

        if let (Some(old), Some(new)) = (visit.node.text_str(), candidate.text_str()) {
            let shared = shared_prefix_len(old, new);
            let old_len = visit.node.node_size();
            if shared == old_len && shared == candidate.node_size() {
                common = common.max(visit.pos + old_len);
            } else {
                common = visit.pos + shared;
                break;
            }
        } else if candidate.node_size() == visit.node.node_size() {
            common = common.max(visit.pos + visit.node.node_size());
        } else {
            // Only the opening token is known to match; keep descending.
            common = visit.pos + 1;
        }
    }

    common.min(reveal_size(prev)).min(next_size)
}

/// The node in `next` occupying the same place as `visit`, if it is
/// interchangeable with the visited node.
fn counterpart<'n>(
    visit: &Visit<'_>,
    next: &'n Node,
    next_size: usize,
    ignore: &[IgnoreAttribute],
) -> Option<&'n Node> {
    if visit.pos > next_size {
        return None;
    }
    let resolved = resolve(next, visit.pos)?;
    let parent = resolved.parent();
    if parent.node_type() != visit.parent.node_type() {
        return None;
    }
    let candidate = parent.maybe_child(visit.index)?;
    if candidate.node_type() != visit.node.node_type() {
        return None;
    }
    if !nodes_equivalent(visit.node, candidate, ignore) {
        return None;
    }
    if visit.node.is_text() && visit.node.marks() != candidate.marks() {
        return None;
    }
    Some(candidate)
}
