//! Draws revealed snapshots as styled terminal lines.

use prosetyped_model::{Fragment, Mark, Node, NodeType};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

pub fn fragment_to_lines(fragment: &Fragment) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (index, block) in fragment.iter().enumerate() {
        if index > 0 {
            lines.push(Line::default());
        }
        block_lines(block, &mut lines);
    }
    lines
}

fn block_lines(node: &Node, out: &mut Vec<Line<'static>>) {
    match node.node_type() {
        NodeType::Heading => {
            let level = node.attr("level").and_then(|v| v.as_int()).unwrap_or(1);
            let marker = format!("{} ", "#".repeat(level.clamp(1, 6) as usize));
            let heading = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
            for (index, mut line) in inline_lines(node).into_iter().enumerate() {
                if index == 0 {
                    line.spans.insert(0, Span::styled(marker.clone(), heading));
                }
                out.push(line.patch_style(heading));
            }
        }
        NodeType::CodeBlock => {
            let code = Style::default().fg(Color::Yellow);
            for text in node.text_content().split('\n') {
                out.push(Line::from(Span::styled(format!("    {text}"), code)));
            }
        }
        NodeType::Blockquote => {
            let mut inner = Vec::new();
            for child in node.content() {
                block_lines(child, &mut inner);
            }
            out.extend(prefixed(inner, "│ ", "│ ", Style::default().fg(Color::DarkGray)));
        }
        NodeType::BulletList | NodeType::OrderedList => list_lines(node, out),
        NodeType::HorizontalRule => {
            out.push(Line::from(Span::styled("─".repeat(20), Style::default().fg(Color::DarkGray))));
        }
        NodeType::Paragraph => out.extend(inline_lines(node)),
        _ => {
            for child in node.content() {
                block_lines(child, out);
            }
        }
    }
}

fn list_lines(list: &Node, out: &mut Vec<Line<'static>>) {
    let ordered = list.node_type() == NodeType::OrderedList;
    let start = list.attr("order").and_then(|v| v.as_int()).unwrap_or(1);
    for (index, item) in list.content().iter().enumerate() {
        let marker = if ordered {
            format!("{}. ", start + index as i64)
        } else {
            "• ".to_string()
        };
        let indent = " ".repeat(marker.chars().count());
        let mut inner = Vec::new();
        for child in item.content() {
            block_lines(child, &mut inner);
        }
        if inner.is_empty() {
            inner.push(Line::default());
        }
        out.extend(prefixed(inner, &marker, &indent, Style::default()));
    }
}

fn prefixed(lines: Vec<Line<'static>>, first: &str, rest: &str, style: Style) -> Vec<Line<'static>> {
    lines
        .into_iter()
        .enumerate()
        .map(|(index, mut line)| {
            let prefix = if index == 0 { first } else { rest };
            line.spans.insert(0, Span::styled(prefix.to_string(), style));
            line
        })
        .collect()
}

/// Inline content of a textblock, broken into lines at hard breaks and
/// newlines in text.
fn inline_lines(node: &Node) -> Vec<Line<'static>> {
    let mut lines = vec![Line::default()];
    for child in node.content() {
        match child.node_type() {
            NodeType::HardBreak => lines.push(Line::default()),
            NodeType::Image => {
                let alt = child.attr("alt").and_then(|v| v.as_str()).unwrap_or("image");
                push_span(&mut lines, Span::styled(format!("[{alt}]"), Style::default().fg(Color::Magenta)));
            }
            _ => {
                let style = marks_style(child.marks());
                let text = child.text_str().unwrap_or_default();
                for (index, segment) in text.split('\n').enumerate() {
                    if index > 0 {
                        lines.push(Line::default());
                    }
                    if !segment.is_empty() {
                        push_span(&mut lines, Span::styled(segment.to_string(), style));
                    }
                }
            }
        }
    }
    lines
}

fn push_span(lines: &mut Vec<Line<'static>>, span: Span<'static>) {
    if let Some(line) = lines.last_mut() {
        line.spans.push(span);
    }
}

fn marks_style(marks: &[Mark]) -> Style {
    marks.iter().fold(Style::default(), |style, mark| match mark.name() {
        "strong" => style.add_modifier(Modifier::BOLD),
        "em" => style.add_modifier(Modifier::ITALIC),
        "code" => style.fg(Color::Yellow),
        "link" => style.fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
        "strike" => style.add_modifier(Modifier::CROSSED_OUT),
        "cursor" => style.add_modifier(Modifier::REVERSED),
        _ => style,
    })
}
