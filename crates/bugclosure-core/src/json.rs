//! Indentation of compact JSON for human reading.

const INDENT: &str = "    ";

/// Re-indent a compact JSON string.
///
/// Purely lexical: opens a level after `{` and `[`, closes one before
/// `}` and `]`, breaks the line after `,`. Characters inside string
/// literals are not special-cased. Returns `None` for empty input.
pub fn pretty_print(json: &str) -> Option<String> {
    if json.is_empty() {
        return None;
    }

    let mut out = String::with_capacity(json.len() * 2);
    let mut depth: usize = 0;

    for c in json.chars() {
        match c {
            '{' | '[' => {
                depth += 1;
                out.push(c);
                push_newline(&mut out, depth);
            }
            '}' | ']' => {
                depth = depth.saturating_sub(1);
                push_newline(&mut out, depth);
                out.push(c);
            }
            ',' => {
                out.push(c);
                push_newline(&mut out, depth);
            }
            _ => out.push(c),
        }
    }

    Some(out)
}

fn push_newline(out: &mut String, depth: usize) {
    out.push('\n');
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object() {
        let pretty = pretty_print(r#"{"a":1,"b":[true,false]}"#).unwrap();
        let expected = "{\n    \"a\":1,\n    \"b\":[\n        true,\n        false\n    ]\n}";
        assert_eq!(pretty, expected);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(pretty_print(""), None);
    }

    #[test]
    fn test_unbalanced_closer_does_not_underflow() {
        let pretty = pretty_print("]]").unwrap();
        assert_eq!(pretty, "\n]\n]");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(pretty_print("hello").unwrap(), "hello");
    }
}
