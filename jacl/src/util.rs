//! Internal utilities: argument checking and glob-style matching.

use crate::list::list_to_string;
use crate::tcl_err;
use crate::types::*;
use crate::value::Value;

/// Checks the argument count of a command, returning the standard `wrong # args` error
/// if it is out of range.
///
/// * `namec` is the number of leading words that name the command (e.g., 2 for
///   `interp alias`); they are echoed in the error message.
/// * `min` and `max` bound `argv.len()`; a `max` of 0 means "no limit".
/// * `argsig` describes the expected arguments.
///
/// # Example
///
/// ```
/// use rejacl::check_args;
/// use rejacl::Value;
///
/// let argv = [Value::from("rename"), Value::from("a")];
/// let err = check_args(1, &argv, 3, 3, "oldName newName").unwrap_err();
/// assert_eq!(err.value().as_str(), "wrong # args: should be \"rename oldName newName\"");
/// ```
pub fn check_args(
    namec: usize,
    argv: &[Value],
    min: usize,
    max: usize,
    argsig: &str,
) -> Result<(), Exception> {
    assert!(namec >= 1);
    assert!(min >= 1);
    assert!(!argv.is_empty());

    if argv.len() < min || (max > 0 && argv.len() > max) {
        let names = list_to_string(&argv[0..namec.min(argv.len())]);
        if argsig.is_empty() {
            tcl_err!("wrong # args: should be \"{}\"", names)
        } else {
            tcl_err!("wrong # args: should be \"{} {}\"", names, argsig)
        }
    } else {
        Ok(())
    }
}

/// Matches a string against a glob pattern: `*` matches any sequence, `?` any single
/// character, `[...]` a character set or range, and `\x` the literal `x`.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pat: Vec<char> = pattern.chars().collect();
    let txt: Vec<char> = text.chars().collect();
    match_from(&pat, &txt)
}

fn match_from(pat: &[char], txt: &[char]) -> bool {
    let mut p = 0;
    let mut t = 0;

    while p < pat.len() {
        match pat[p] {
            '*' => {
                // Collapse runs of stars, then try every suffix.
                while p < pat.len() && pat[p] == '*' {
                    p += 1;
                }
                if p == pat.len() {
                    return true;
                }
                return (t..=txt.len()).any(|start| match_from(&pat[p..], &txt[start..]));
            }
            '?' => {
                if t >= txt.len() {
                    return false;
                }
            }
            '[' => {
                if t >= txt.len() {
                    return false;
                }
                match match_set(&pat[p + 1..], txt[t]) {
                    Some((true, used)) => p += used,
                    _ => return false,
                }
            }
            '\\' if p + 1 < pat.len() => {
                p += 1;
                if t >= txt.len() || pat[p] != txt[t] {
                    return false;
                }
            }
            c => {
                if t >= txt.len() || c != txt[t] {
                    return false;
                }
            }
        }
        p += 1;
        t += 1;
    }

    t == txt.len()
}

// Matches one character against a bracketed set; returns whether it matched and how many
// pattern characters the set consumed, including the closing bracket.
fn match_set(set: &[char], c: char) -> Option<(bool, usize)> {
    let mut i = 0;
    let mut matched = false;

    while i < set.len() {
        if set[i] == ']' {
            return Some((matched, i + 1));
        }
        if i + 2 < set.len() && set[i + 1] == '-' && set[i + 2] != ']' {
            let (lo, hi) = if set[i] <= set[i + 2] {
                (set[i], set[i + 2])
            } else {
                (set[i + 2], set[i])
            };
            if lo <= c && c <= hi {
                matched = true;
            }
            i += 3;
        } else {
            if set[i] == c {
                matched = true;
            }
            i += 1;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_args() {
        let argv = [Value::from("interp"), Value::from("alias")];
        assert!(check_args(2, &argv, 2, 0, "").is_ok());
        assert_eq!(
            check_args(2, &argv, 3, 0, "srcPath srcCmd"),
            tcl_err!("wrong # args: should be \"interp alias srcPath srcCmd\"")
        );
    }

    #[test]
    fn test_glob_match() {
        assert!(glob_match("*", ""));
        assert!(glob_match("f*", "foo"));
        assert!(glob_match("f?o", "foo"));
        assert!(glob_match("*o*r", "forbar"));
        assert!(glob_match("[a-c]x", "bx"));
        assert!(glob_match("a\\*", "a*"));
        assert!(!glob_match("a\\*", "ab"));
        assert!(!glob_match("f*x", "foo"));
        assert!(!glob_match("[a-c]x", "dx"));
        assert!(!glob_match("foo", "fo"));
    }
}
