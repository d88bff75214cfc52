use prosetyped_model::{Fragment, Mark, Node, NodeType, html, markdown};

fn render(source: &str) -> String {
    html::to_html(markdown::parse(source).content())
}

#[test]
fn test_heading_and_paragraph() {
    insta::assert_snapshot!(
        render("# Title\n\nHello **world**"),
        @"<h1>Title</h1><p>Hello <strong>world</strong></p>"
    );
}

#[test]
fn test_shared_marks_stay_open_across_text_nodes() {
    insta::assert_snapshot!(render("**a *b***"), @"<p><strong>a <em>b</em></strong></p>");
}

#[test]
fn test_tight_bullet_list() {
    insta::assert_snapshot!(
        render("- one\n- two"),
        @"<ul><li><p>one</p></li><li><p>two</p></li></ul>"
    );
}

#[test]
fn test_ordered_list_start() {
    insta::assert_snapshot!(render("3. x"), @r#"<ol start="3"><li><p>x</p></li></ol>"#);
}

#[test]
fn test_code_block_is_escaped() {
    insta::assert_snapshot!(
        render("```rust\nlet a = 1 < 2;\n```"),
        @r#"<pre data-params="rust"><code>let a = 1 &lt; 2;</code></pre>"#
    );
}

#[test]
fn test_link_attributes() {
    insta::assert_snapshot!(
        render("[a](u \"t\")"),
        @r#"<p><a href="u" title="t">a</a></p>"#
    );
}

#[test]
fn test_unknown_marks_become_classed_spans() {
    let paragraph = Node::block(
        NodeType::Paragraph,
        vec![
            Node::text("ab", Vec::new()),
            Node::text("|", vec![Mark::new("cursor")]),
        ],
    );

    insta::assert_snapshot!(
        html::to_html(&Fragment::from_nodes([paragraph])),
        @r#"<p>ab<span class="cursor">|</span></p>"#
    );
}
