//! Frontmatter splitting for markdown-style artifacts.
//!
//! A frontmatter block is a first line of exactly `---`, a run of `key: value`
//! lines, and a closing `---` line. Keys split on the first colon. Values are flat
//! strings; list-valued keys are comma-separated (`a, b`) or bracketed
//! (`["a", "b"]`). Anything richer is out of scope.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    fields: Vec<(String, String)>,
}

impl Frontmatter {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// True when the key is present with a non-empty value.
    pub fn has_value(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Split<'a> {
    /// Well-formed block followed by the body.
    Present(Frontmatter, &'a str),
    /// No opening delimiter; the whole text is body.
    Absent(&'a str),
    /// Opening delimiter without a closing one.
    Unterminated,
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end_matches(['\r', '\n']) == "---"
}

pub fn split(content: &str) -> Split<'_> {
    let text = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = text.split_inclusive('\n');
    match lines.next() {
        Some(first) if is_delimiter(first) => {}
        _ => return Split::Absent(text),
    }

    let mut offset = text.find('\n').map(|i| i + 1).unwrap_or(text.len());
    let mut fields = Vec::new();
    for line in lines {
        let end = offset + line.len();
        if is_delimiter(line) {
            return Split::Present(Frontmatter { fields }, &text[end..]);
        }
        if let Some((key, value)) = parse_field(line) {
            fields.push((key, value));
        }
        offset = end;
    }
    Split::Unterminated
}

fn parse_field(line: &str) -> Option<(String, String)> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let (key, value) = trimmed.split_once(':')?;
    let key = key.trim();
    if key.is_empty() || key.contains(' ') {
        return None;
    }
    Some((key.to_string(), unquote(value.trim()).to_string()))
}

fn unquote(value: &str) -> &str {
    for q in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(q) && value.ends_with(q) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Frontmatter, if a complete block is present.
pub fn parse(content: &str) -> Option<Frontmatter> {
    match split(content) {
        Split::Present(fm, _) => Some(fm),
        _ => None,
    }
}

/// Body text with any complete frontmatter block removed.
pub fn strip(content: &str) -> &str {
    match split(content) {
        Split::Present(_, body) | Split::Absent(body) => body,
        Split::Unterminated => content,
    }
}

/// Split a flat list value: `a, b`, `[a, b]` or `["a", 'b']`.
pub fn split_list(value: &str) -> Vec<String> {
    let inner = value.trim();
    let inner = inner
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .unwrap_or(inner);
    split_top_level(inner)
        .into_iter()
        .map(|item| unquote(item.trim()).trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Split on commas outside `{...}` so brace alternation stays one item.
fn split_top_level(value: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in value.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                items.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(&value[start..]);
    items
}

/// Render a frontmatter block from ordered pairs, closing delimiter included.
pub fn render(fields: &[(&str, String)]) -> String {
    let mut out = String::from("---\n");
    for (key, value) in fields {
        out.push_str(key);
        out.push_str(": ");
        out.push_str(value);
        out.push('\n');
    }
    out.push_str("---\n");
    out
}
