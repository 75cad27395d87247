//! Line-oriented text helpers used by the line-based formats.

/// Expands tabs to spaces so that columns line up at multiples of `width`.
///
/// # Examples
///
/// ```rust
/// use semidoc::text::expand_tabs;
///
/// assert_eq!(expand_tabs("a\tb", 4), "a   b");
/// assert_eq!(expand_tabs("\tx", 2), "  x");
/// ```
#[must_use]
pub fn expand_tabs(line: &str, width: usize) -> String {
    let width = width.max(1);
    let mut out = String::with_capacity(line.len());
    let mut column = 0;
    for ch in line.chars() {
        if ch == '\t' {
            let pad = width - column % width;
            out.extend(std::iter::repeat(' ').take(pad));
            column += pad;
        } else {
            out.push(ch);
            column += 1;
        }
    }
    out
}

/// Joins physical lines that end in a single `\` with the following line.
///
/// Yields each logical line with the 1-based number of its first physical
/// line. Leading whitespace of continuation lines is dropped.
///
/// # Examples
///
/// ```rust
/// use semidoc::text::logical_lines;
///
/// let lines: Vec<_> = logical_lines("a = 1 \\\n    2\nb = 3").collect();
/// assert_eq!(lines, vec![(1, "a = 1 2".to_string()), (3, "b = 3".to_string())]);
/// ```
pub fn logical_lines(input: &str) -> impl Iterator<Item = (usize, String)> + '_ {
    let mut physical = input.lines().enumerate().peekable();
    std::iter::from_fn(move || {
        let (index, first) = physical.next()?;
        let mut line = String::new();
        let mut current = first;
        loop {
            match continued(current) {
                Some(head) => {
                    line.push_str(head);
                    match physical.next() {
                        Some((_, next)) => current = next.trim_start(),
                        None => break,
                    }
                }
                None => {
                    line.push_str(current);
                    break;
                }
            }
        }
        Some((index + 1, line))
    })
}

/// Returns the line without its continuation backslash, if it has one.
/// An escaped backslash (`\\`) at the end does not continue the line.
fn continued(line: &str) -> Option<&str> {
    let trailing = line.chars().rev().take_while(|&c| c == '\\').count();
    (trailing % 2 == 1).then(|| &line[..line.len() - 1])
}

/// Splits `key = value` at the first `=`, trimming both sides.
///
/// # Examples
///
/// ```rust
/// use semidoc::text::split_assignment;
///
/// assert_eq!(split_assignment(" a.b = x = y "), Some(("a.b", "x = y")));
/// assert_eq!(split_assignment("no assignment"), None);
/// ```
#[must_use]
pub fn split_assignment(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    Some((key.trim(), value.trim()))
}

/// Returns `true` for a line whose first non-blank character is `#`.
#[must_use]
pub fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}
