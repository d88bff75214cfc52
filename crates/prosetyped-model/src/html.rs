//! Document tree to HTML markup.
//!
//! Marks shared by neighbouring inline nodes stay open across them, so
//! `**a *b***` serializes as `<strong>a <em>b</em></strong>`.

use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write;

use crate::fragment::Fragment;
use crate::node::{AttrValue, Mark, Node, NodeType};

/// Serialize a sequence of block nodes.
pub fn to_html(fragment: &Fragment) -> String {
    let mut out = String::new();
    write_blocks(&mut out, fragment);
    out
}

pub fn node_to_html(node: &Node) -> String {
    let mut out = String::new();
    write_block(&mut out, node);
    out
}

fn write_blocks(out: &mut String, fragment: &Fragment) {
    for node in fragment {
        write_block(out, node);
    }
}

fn write_block(out: &mut String, node: &Node) {
    match node.node_type() {
        NodeType::Doc => write_blocks(out, node.content()),
        NodeType::Paragraph => wrap_inline(out, "p", node),
        NodeType::Heading => {
            let level = node
                .attr("level")
                .and_then(AttrValue::as_int)
                .unwrap_or(1)
                .clamp(1, 6);
            wrap_inline(out, &format!("h{level}"), node);
        }
        NodeType::Blockquote => {
            out.push_str("<blockquote>");
            write_blocks(out, node.content());
            out.push_str("</blockquote>");
        }
        NodeType::CodeBlock => {
            out.push_str("<pre");
            if let Some(params) = node.attr("params").and_then(AttrValue::as_str)
                && !params.is_empty()
            {
                push_attr(out, "data-params", params);
            }
            out.push_str("><code>");
            write_inline(out, node.content());
            out.push_str("</code></pre>");
        }
        NodeType::HorizontalRule => out.push_str("<hr>"),
        NodeType::BulletList => {
            out.push_str("<ul>");
            write_blocks(out, node.content());
            out.push_str("</ul>");
        }
        NodeType::OrderedList => {
            out.push_str("<ol");
            if let Some(order) = node.attr("order").and_then(AttrValue::as_int)
                && order != 1
            {
                let _ = write!(out, " start=\"{order}\"");
            }
            out.push('>');
            write_blocks(out, node.content());
            out.push_str("</ol>");
        }
        NodeType::ListItem => {
            out.push_str("<li>");
            write_blocks(out, node.content());
            out.push_str("</li>");
        }
        // Inline nodes only reach here when a caller serializes them bare.
        NodeType::Image | NodeType::HardBreak | NodeType::Text => {
            write_inline(out, &Fragment::from_nodes([node.clone()]))
        }
    }
}

fn wrap_inline(out: &mut String, tag: &str, node: &Node) {
    let _ = write!(out, "<{tag}>");
    write_inline(out, node.content());
    let _ = write!(out, "</{tag}>");
}

fn write_inline(out: &mut String, fragment: &Fragment) {
    let mut open: Vec<&Mark> = Vec::new();
    for node in fragment {
        let marks = node.marks();
        let keep = open
            .iter()
            .zip(marks)
            .take_while(|&(active, wanted)| *active == wanted)
            .count();
        while open.len() > keep {
            if let Some(mark) = open.pop() {
                close_mark(out, mark);
            }
        }
        for mark in &marks[keep..] {
            open_mark(out, mark);
            open.push(mark);
        }
        match node.node_type() {
            NodeType::Text => out.push_str(&encode_text(node.text_str().unwrap_or_default())),
            NodeType::HardBreak => out.push_str("<br>"),
            NodeType::Image => {
                out.push_str("<img");
                for key in ["src", "alt", "title"] {
                    if let Some(value) = node.attr(key).and_then(AttrValue::as_str) {
                        push_attr(out, key, value);
                    }
                }
                out.push('>');
            }
            _ => write_block(out, node),
        }
    }
    while let Some(mark) = open.pop() {
        close_mark(out, mark);
    }
}

fn open_mark(out: &mut String, mark: &Mark) {
    match mark.name() {
        "em" => out.push_str("<em>"),
        "strong" => out.push_str("<strong>"),
        "code" => out.push_str("<code>"),
        "strike" => out.push_str("<s>"),
        "link" => {
            out.push_str("<a");
            for key in ["href", "title"] {
                if let Some(value) = mark.attr(key).and_then(AttrValue::as_str) {
                    push_attr(out, key, value);
                }
            }
            out.push('>');
        }
        other => {
            out.push_str("<span");
            push_attr(out, "class", other);
            out.push('>');
        }
    }
}

fn close_mark(out: &mut String, mark: &Mark) {
    out.push_str(match mark.name() {
        "em" => "</em>",
        "strong" => "</strong>",
        "code" => "</code>",
        "strike" => "</s>",
        "link" => "</a>",
        _ => "</span>",
    });
}

fn push_attr(out: &mut String, key: &str, value: &str) {
    let _ = write!(out, " {key}=\"{}\"", encode_double_quoted_attribute(value));
}
