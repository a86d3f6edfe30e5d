//! Leading-indentation normalization for embedded markdown source.
//!
//! Markdown written inline inside indented markup arrives with a uniform
//! leading prefix on every line, which the parser would read as an indented
//! code block. [`strip_indent`] removes the largest whitespace prefix
//! shared by all non-blank lines so the source parses as authored.

/// Strip the common leading whitespace prefix from every line.
///
/// The minimum indent is computed over lines that contain non-whitespace
/// content; blank lines neither contribute to the minimum nor are required
/// to carry the prefix. Each line loses at most that many leading
/// whitespace characters.
///
/// # Examples
///
/// ```
/// use mb_render::strip_indent;
///
/// assert_eq!(strip_indent("    # Title\n    body"), "# Title\nbody");
/// assert_eq!(strip_indent("no indent"), "no indent");
/// ```
#[must_use]
pub fn strip_indent(text: &str) -> String {
    let min_indent = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    if min_indent == 0 {
        return text.to_owned();
    }

    let mut out = String::with_capacity(text.len());
    let mut first = true;
    for line in text.lines() {
        if !first {
            out.push('\n');
        }
        first = false;

        let strip = line
            .char_indices()
            .take(min_indent)
            .take_while(|(_, ch)| *ch == ' ' || *ch == '\t')
            .count();
        out.push_str(&line[strip..]);
    }
    if text.ends_with('\n') {
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strip_indent_uniform_spaces() {
        assert_eq!(strip_indent("    a\n    b"), "a\nb");
    }

    #[test]
    fn test_strip_indent_mixed_depth_keeps_relative() {
        assert_eq!(strip_indent("  a\n    b"), "a\n  b");
    }

    #[test]
    fn test_strip_indent_no_common_prefix() {
        assert_eq!(strip_indent("a\n    b"), "a\n    b");
    }

    #[test]
    fn test_strip_indent_blank_lines_ignored_for_minimum() {
        assert_eq!(strip_indent("    a\n\n    b"), "a\n\nb");
    }

    #[test]
    fn test_strip_indent_tabs() {
        assert_eq!(strip_indent("\ta\n\tb"), "a\nb");
    }

    #[test]
    fn test_strip_indent_preserves_trailing_newline() {
        assert_eq!(strip_indent("  a\n"), "a\n");
    }

    #[test]
    fn test_strip_indent_empty() {
        assert_eq!(strip_indent(""), "");
    }

    #[test]
    fn test_strip_indent_whitespace_only_lines() {
        assert_eq!(strip_indent("   \n  "), "   \n  ");
    }
}
