//! Fenced code block normalization.
//!
//! Rewrites triple-backtick fences into `<pre><code>` markup that
//! highlight.js picks up, leaving every other line byte-for-byte intact.

use thiserror::Error;

/// Fence marker opening and closing a code block.
pub const CODE_FENCE: &str = "```";

#[derive(Debug, Error)]
pub enum CodeBlockError {
    #[error("unterminated code block: found {fences} fence markers")]
    Unbalanced { fences: usize },
}

/// Replace fence markers with highlight.js-friendly markup.
///
/// An opening fence followed by a language (```` ```rust ````) becomes
/// `<pre class="highlight"><code class="language-rust">`, a bare one
/// `<pre><code>`. Text before the opening marker is kept; the closing
/// marker becomes `</code></pre>` with the rest of its line kept.
pub fn format_codeblocks(text: &str) -> Result<String, CodeBlockError> {
    let mut lines: Vec<String> = text.split('\n').map(str::to_owned).collect();

    let fences: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.trim().starts_with(CODE_FENCE))
        .map(|(idx, _)| idx)
        .collect();

    if fences.len() % 2 != 0 {
        return Err(CodeBlockError::Unbalanced {
            fences: fences.len(),
        });
    }

    for pair in fences.chunks_exact(2) {
        let (open, close) = (pair[0], pair[1]);
        lines[open] = open_tag(&lines[open]);
        lines[close] = lines[close].replacen(CODE_FENCE, "</code></pre>", 1);
    }

    Ok(lines.join("\n"))
}

/// Rewrite an opening fence line, keeping whatever precedes the marker.
fn open_tag(line: &str) -> String {
    let Some(pos) = line.find(CODE_FENCE) else {
        return line.to_owned();
    };
    let prefix = &line[..pos];
    let lang = line[pos + CODE_FENCE.len()..].trim();

    if lang.is_empty() {
        format!("{prefix}<pre><code>")
    } else {
        format!(r#"{prefix}<pre class="highlight"><code class="language-{lang}">"#)
    }
}
