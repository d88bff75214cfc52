/// A markdown source cut into blank-line separated chunks, handed out as an
/// ever longer prefix the way a streaming writer would produce it.
#[derive(Debug, Clone)]
pub struct ChunkFeed {
    chunks: Vec<String>,
    revealed: usize,
}

impl ChunkFeed {
    pub fn new(source: &str) -> Self {
        Self {
            chunks: split_chunks(source),
            revealed: 0,
        }
    }

    /// Add one more chunk and return the source revealed so far, or `None`
    /// once every chunk has been handed out.
    pub fn advance(&mut self) -> Option<String> {
        if self.revealed == self.chunks.len() {
            return None;
        }
        self.revealed += 1;
        Some(self.chunks[..self.revealed].join("\n\n"))
    }

    pub fn remaining(&self) -> usize {
        self.chunks.len() - self.revealed
    }

    pub fn revealed(&self) -> usize {
        self.revealed
    }

    pub fn total(&self) -> usize {
        self.chunks.len()
    }
}

/// Split on blank lines, except inside fenced code blocks.
pub fn split_chunks(source: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut in_fence = false;

    for line in source.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
        }
        if line.trim().is_empty() && !in_fence {
            if !current.is_empty() {
                chunks.push(current.join("\n"));
                current.clear();
            }
            continue;
        }
        current.push(line);
    }
    if !current.is_empty() {
        chunks.push(current.join("\n"));
    }
    chunks
}
