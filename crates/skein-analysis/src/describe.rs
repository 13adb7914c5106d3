//! Node description extraction.
//!
//! Scans a module's source for `/** … */` doc blocks carrying one of the
//! configured tags (`@module`, `@packageDocumentation` by default) and
//! produces a single-line, prefix-limited description. Doc blocks inside
//! string and template literals are skipped.

/// Extract a description from `source`.
///
/// Returns `None` when `limit` is 0, no tagged block exists, or the tagged
/// block has no usable text. The result is trimmed, whitespace-collapsed,
/// and truncated to `limit` characters followed by a literal `...`.
pub fn extract_description(source: &str, limit: usize, tags: &[String]) -> Option<String> {
    if limit == 0 || tags.is_empty() {
        return None;
    }
    for block in doc_blocks(source) {
        if let Some(description) = description_from_block(&block, tags) {
            return Some(ellipsize(&description, limit));
        }
    }
    None
}

/// Enumerate `/** … */` blocks, skipping occurrences inside string and
/// template literals and inside ordinary comments.
fn doc_blocks(source: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let bytes = source.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' | b'`' => {
                let quote = bytes[i];
                i += 1;
                while i < bytes.len() {
                    if bytes[i] == b'\\' {
                        i += 2;
                        continue;
                    }
                    if bytes[i] == quote {
                        i += 1;
                        break;
                    }
                    i += 1;
                }
            }
            b'/' if i + 1 < bytes.len() && bytes[i + 1] == b'/' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if i + 1 < bytes.len() && bytes[i + 1] == b'*' => {
                let start = i;
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                let end = (i + 2).min(bytes.len());
                i = end;
                let block = &source[start..end];
                if block.starts_with("/**") && block.len() > 4 {
                    blocks.push(block.to_string());
                }
            }
            _ => i += 1,
        }
    }
    blocks
}

/// Pull the description out of one doc block if it carries a tag.
fn description_from_block(block: &str, tags: &[String]) -> Option<String> {
    let inner = block
        .trim_start_matches("/**")
        .trim_end_matches("*/");
    let lines: Vec<String> = inner
        .lines()
        .map(|line| {
            let line = line.trim();
            let line = line.strip_prefix('*').unwrap_or(line);
            line.trim().to_string()
        })
        .collect();

    let tag_line = lines
        .iter()
        .position(|line| tags.iter().any(|tag| has_tag(line, tag)))?;

    // Prefer text following the tag on its own line.
    for tag in tags {
        if let Some(rest) = text_after_tag(&lines[tag_line], tag) {
            if !rest.is_empty() {
                return Some(collapse_whitespace(rest));
            }
        }
    }

    // Otherwise the first non-empty, non-tag line of the block.
    lines
        .iter()
        .find(|line| !line.is_empty() && !line.starts_with('@'))
        .map(|line| collapse_whitespace(line))
}

fn has_tag(line: &str, tag: &str) -> bool {
    text_after_tag(line, tag).is_some()
}

/// The text after `tag` when the line contains it as a standalone word.
fn text_after_tag<'a>(line: &'a str, tag: &str) -> Option<&'a str> {
    let pos = line.find(tag)?;
    let before_ok = pos == 0
        || line[..pos]
            .chars()
            .next_back()
            .is_some_and(char::is_whitespace);
    let after = &line[pos + tag.len()..];
    let after_ok = after.is_empty() || after.starts_with(char::is_whitespace);
    (before_ok && after_ok).then(|| after.trim())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn ellipsize(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let prefix: String = text.chars().take(limit).collect();
    format!("{}...", prefix.trim_end())
}
