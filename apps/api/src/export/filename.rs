/// Fallback stem when the title has nothing usable left.
pub const FALLBACK_STEM: &str = "resume";

/// Download filename for a document title: path separators, control characters and
/// characters reserved by common filesystems are dropped, whitespace runs collapse to a
/// single space, and the result always ends in `.pdf`.
pub fn artifact_filename(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter_map(|c| match c {
            c if c.is_whitespace() => Some(' '),
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => None,
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    let stem = collapsed.trim_matches('.');

    let stem = if stem.is_empty() { FALLBACK_STEM } else { stem };
    if stem.to_ascii_lowercase().ends_with(".pdf") {
        stem.to_string()
    } else {
        format!("{stem}.pdf")
    }
}
