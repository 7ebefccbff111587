//! List parsing and formatting.
//!
//! Jacl lists use the standard TCL list syntax: elements are separated by whitespace, and
//! an element containing whitespace or special characters is enclosed in braces or
//! double quotes, or has its special characters escaped with backslashes.

use crate::tcl_err;
use crate::types::*;
use crate::value::Value;
use alloc::string::String;
use alloc::vec::Vec;

/// Parses a string into a list of values.
///
/// # Example
///
/// ```
/// use rejacl::list::get_list;
///
/// let list = get_list("a {b c} \"d e\" {}").unwrap();
/// assert_eq!(list.len(), 4);
/// assert_eq!(list[1].as_str(), "b c");
/// assert_eq!(list[3].as_str(), "");
/// ```
pub fn get_list(text: &str) -> Result<TclList, Exception> {
    let chars: Vec<char> = text.chars().collect();
    let mut list = Vec::new();
    let mut i = 0;

    loop {
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }

        if i >= chars.len() {
            break;
        }

        let (item, next) = match chars[i] {
            '{' => parse_braced(&chars, i)?,
            '"' => parse_quoted(&chars, i)?,
            _ => parse_bare(&chars, i),
        };

        list.push(Value::from(item));
        i = next;
    }

    Ok(list)
}

fn parse_braced(chars: &[char], start: usize) -> Result<(String, usize), Exception> {
    let mut depth = 1;
    let mut i = start + 1;
    let mut item = String::new();

    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => {
                item.push('\\');
                item.push(chars[i + 1]);
                i += 2;
                continue;
            }
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let next = i + 1;
                    if next < chars.len() && !chars[next].is_whitespace() {
                        let rest: String = chars[next..].iter().take(5).collect();
                        return tcl_err!(
                            "list element in braces followed by \"{}\" instead of space",
                            rest
                        );
                    }
                    return Ok((item, next));
                }
            }
            _ => (),
        }

        item.push(chars[i]);
        i += 1;
    }

    tcl_err!("unmatched open brace in list")
}

fn parse_quoted(chars: &[char], start: usize) -> Result<(String, usize), Exception> {
    let mut i = start + 1;
    let mut item = String::new();

    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => {
                item.push(backslash(chars[i + 1]));
                i += 2;
            }
            '"' => {
                let next = i + 1;
                if next < chars.len() && !chars[next].is_whitespace() {
                    let rest: String = chars[next..].iter().take(5).collect();
                    return tcl_err!(
                        "list element in quotes followed by \"{}\" instead of space",
                        rest
                    );
                }
                return Ok((item, next));
            }
            c => {
                item.push(c);
                i += 1;
            }
        }
    }

    tcl_err!("unmatched open quote in list")
}

fn parse_bare(chars: &[char], start: usize) -> (String, usize) {
    let mut i = start;
    let mut item = String::new();

    while i < chars.len() && !chars[i].is_whitespace() {
        if chars[i] == '\\' && i + 1 < chars.len() {
            item.push(backslash(chars[i + 1]));
            i += 2;
        } else {
            item.push(chars[i]);
            i += 1;
        }
    }

    (item, i)
}

fn backslash(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        'a' => '\x07',
        'b' => '\x08',
        'f' => '\x0c',
        'v' => '\x0b',
        other => other,
    }
}

/// Formats a slice of values as a list string, quoting elements as needed so that
/// [`get_list`](fn.get_list.html) recovers them exactly.
pub fn list_to_string(list: &[Value]) -> String {
    let items: Vec<String> = list.iter().map(|v| quote(v.as_str())).collect();
    items.join(" ")
}

fn quote(item: &str) -> String {
    if item.is_empty() {
        return "{}".into();
    }

    let needs_quoting = item.starts_with('#')
        || item.chars().any(|c| {
            c.is_whitespace() || matches!(c, '{' | '}' | '[' | ']' | '$' | '\\' | '"' | ';')
        });

    if !needs_quoting {
        return item.into();
    }

    if braces_balanced(item) && !item.ends_with('\\') {
        let mut out = String::with_capacity(item.len() + 2);
        out.push('{');
        out.push_str(item);
        out.push('}');
        return out;
    }

    let mut out = String::with_capacity(item.len() * 2);
    for c in item.chars() {
        match c {
            '{' | '}' | '[' | ']' | '$' | '\\' | '"' | ';' | ' ' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    if out.starts_with('#') {
        out.insert(0, '\\');
    }
    out
}

fn braces_balanced(item: &str) -> bool {
    let mut depth: i64 = 0;
    let mut escaped = false;

    for c in item.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => (),
        }
    }

    depth == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn strs(list: &[Value]) -> Vec<&str> {
        list.iter().map(|v| v.as_str()).collect()
    }

    #[test]
    fn test_get_list() {
        let list = get_list("  a  {b {c d}} \"e\\tf\" g\\ h ").unwrap();
        assert_eq!(strs(&list), vec!["a", "b {c d}", "e\tf", "g h"]);

        assert!(get_list("").unwrap().is_empty());
        assert_eq!(strs(&get_list("{} x").unwrap()), vec!["", "x"]);
    }

    #[test]
    fn test_get_list_errors() {
        assert_eq!(get_list("a {b"), tcl_err!("unmatched open brace in list"));
        assert_eq!(get_list("a \"b"), tcl_err!("unmatched open quote in list"));
        assert_eq!(
            get_list("{a}b"),
            tcl_err!("list element in braces followed by \"b\" instead of space")
        );
    }

    #[test]
    fn test_list_to_string_quoting() {
        let list = vec![
            Value::from("plain"),
            Value::from("two words"),
            Value::from(""),
            Value::from("un}balanced"),
            Value::from("#hash"),
        ];
        let text = list_to_string(&list);
        assert_eq!(text, "plain {two words} {} un\\}balanced {#hash}");
        assert_eq!(get_list(&text).unwrap(), list);
    }
}
