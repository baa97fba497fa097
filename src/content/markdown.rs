//! Markdown to HTML rendering.
//!
//! Uses pulldown-cmark with the "extra" syntax set: tables, footnotes,
//! strikethrough, task lists and heading attributes.

use pulldown_cmark::{Options, Parser, html::push_html};

/// Render a markdown body to HTML.
pub fn render_markdown(content: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES;

    let parser = Parser::new_ext(content, options);
    let mut html = String::with_capacity(content.len() * 2);
    push_html(&mut html, parser);
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings_and_paragraphs() {
        let html = render_markdown("# Demo\n\nHello *world*\n\n## End");
        assert!(html.contains("<h1>Demo</h1>"));
        assert!(html.contains("<p>Hello <em>world</em></p>"));
        assert!(html.contains("<h2>End</h2>"));
    }

    #[test]
    fn test_fenced_code_gets_language_class() {
        let html = render_markdown("```python\nprint(s)\n```");
        assert!(html.contains(r#"<pre><code class="language-python">print(s)"#));
    }

    #[test]
    fn test_tables_enabled() {
        let html = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn test_raw_pre_block_passes_through() {
        let html = render_markdown(
            "<pre class=\"highlight\"><code class=\"language-rust\">\nlet x = 1;\n</code></pre>",
        );
        assert!(html.contains(r#"<pre class="highlight"><code class="language-rust">"#));
        assert!(html.contains("let x = 1;"));
    }
}
