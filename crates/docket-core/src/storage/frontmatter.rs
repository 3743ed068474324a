//! Splitting and rendering `---` delimited YAML frontmatter.

/// Split a markdown document into its YAML frontmatter and body.
///
/// The first line must be `---` (a leading BOM is tolerated). The block ends
/// at the next line consisting of `---` or `...`. A single blank line after
/// the closing delimiter is treated as a separator and is not part of the
/// body. Returns `None` when there is no well-formed block.
#[must_use]
pub fn split_frontmatter(input: &str) -> Option<(&str, &str)> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let rest = input
        .strip_prefix("---\n")
        .or_else(|| input.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            let body = body
                .strip_prefix("\r\n")
                .or_else(|| body.strip_prefix('\n'))
                .unwrap_or(body);
            return Some((yaml, body));
        }
        offset += line.len();
    }
    None
}

/// Join rendered YAML and a markdown body into one document.
#[must_use]
pub fn render_document(yaml: &str, body: &str) -> String {
    let mut out = String::with_capacity(yaml.len() + body.len() + 10);
    out.push_str("---\n");
    out.push_str(yaml);
    if !yaml.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("---\n\n");
    out.push_str(body);
    out
}
