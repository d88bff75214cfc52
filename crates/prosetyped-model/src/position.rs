use crate::ModelError;
use crate::fragment::Fragment;
use crate::node::Node;

#[derive(Debug, Clone, Copy)]
struct PathStep<'a> {
    node: &'a Node,
    index: usize,
    /// Absolute position where the child at `index` starts.
    offset: usize,
}

/// A position resolved against a tree: the chain of ancestors around it.
///
/// Depth 0 is the top node. At each depth the path records which child
/// the position points into (or sits directly before).
#[derive(Debug, Clone)]
pub struct ResolvedPos<'a> {
    pos: usize,
    path: Vec<PathStep<'a>>,
    parent_offset: usize,
}

impl<'a> ResolvedPos<'a> {
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn depth(&self) -> usize {
        self.path.len() - 1
    }

    /// Offset of the position inside its parent's content.
    pub fn parent_offset(&self) -> usize {
        self.parent_offset
    }

    /// The innermost node whose content holds the position.
    pub fn parent(&self) -> &'a Node {
        self.node(self.depth())
    }

    pub fn node(&self, depth: usize) -> &'a Node {
        self.path[depth].node
    }

    /// Index into the parent's children.
    pub fn index(&self) -> usize {
        self.index_at(self.depth())
    }

    pub fn index_at(&self, depth: usize) -> usize {
        self.path[depth].index
    }

    /// Position where the content of the ancestor at `depth` starts.
    pub fn start(&self, depth: usize) -> usize {
        if depth == 0 {
            0
        } else {
            self.path[depth - 1].offset + 1
        }
    }

    pub fn end(&self, depth: usize) -> usize {
        self.start(depth) + self.node(depth).content_size()
    }

    /// Deepest depth whose content contains both this position and `pos`.
    pub fn shared_depth(&self, pos: usize) -> usize {
        (0..=self.depth())
            .rev()
            .find(|&depth| self.start(depth) <= pos && self.end(depth) >= pos)
            .unwrap_or(0)
    }
}

/// A cut-out piece of a document and how many nodes are left open on each
/// side of it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Slice {
    pub content: Fragment,
    pub open_start: usize,
    pub open_end: usize,
}

/// One step of a [`Descendants`] walk.
#[derive(Debug, Clone, Copy)]
pub struct Visit<'a> {
    pub node: &'a Node,
    /// Position of the node's start in the walked tree.
    pub pos: usize,
    pub parent: &'a Node,
    /// Index of the node among its parent's children.
    pub index: usize,
}

#[derive(Debug)]
struct Frame<'a> {
    parent: &'a Node,
    index: usize,
    pos: usize,
}

/// Pre-order walk over every node below a tree's root.
#[derive(Debug)]
pub struct Descendants<'a> {
    stack: Vec<Frame<'a>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = Visit<'a>;

    fn next(&mut self) -> Option<Visit<'a>> {
        loop {
            let frame = self.stack.last_mut()?;
            let parent = frame.parent;
            let Some(node) = parent.maybe_child(frame.index) else {
                self.stack.pop();
                continue;
            };
            let visit = Visit {
                node,
                pos: frame.pos,
                parent,
                index: frame.index,
            };
            frame.index += 1;
            frame.pos += node.node_size();
            if node.child_count() > 0 {
                self.stack.push(Frame {
                    parent: node,
                    index: 0,
                    pos: visit.pos + 1,
                });
            }
            return Some(visit);
        }
    }
}

impl Node {
    pub fn resolve(&self, pos: usize) -> Option<ResolvedPos<'_>> {
        if pos > self.content_size() {
            return None;
        }
        let mut path = Vec::new();
        let mut node = self;
        let mut start = 0;
        let mut parent_offset = pos;
        loop {
            let (index, offset) = node.content().find_index(parent_offset)?;
            let rem = parent_offset - offset;
            path.push(PathStep {
                node,
                index,
                offset: start + offset,
            });
            if rem == 0 {
                break;
            }
            node = node.child(index);
            if node.is_text() {
                break;
            }
            parent_offset = rem - 1;
            start += offset + 1;
        }
        Some(ResolvedPos {
            pos,
            path,
            parent_offset,
        })
    }

    pub fn slice(&self, from: usize, to: usize) -> Result<Slice, ModelError> {
        let size = self.content_size();
        if from > to || to > size {
            return Err(ModelError::PositionOutOfRange { pos: to, size });
        }
        if from == to {
            return Ok(Slice::default());
        }
        let start_pos = self
            .resolve(from)
            .ok_or(ModelError::PositionOutOfRange { pos: from, size })?;
        let end_pos = self
            .resolve(to)
            .ok_or(ModelError::PositionOutOfRange { pos: to, size })?;
        let depth = start_pos.shared_depth(to);
        let start = start_pos.start(depth);
        let content = start_pos
            .node(depth)
            .content()
            .cut(from - start, to - start);
        Ok(Slice {
            content,
            open_start: start_pos.depth() - depth,
            open_end: end_pos.depth() - depth,
        })
    }

    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![Frame {
                parent: self,
                index: 0,
                pos: 0,
            }],
        }
    }
}
