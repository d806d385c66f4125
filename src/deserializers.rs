//! Parsers for string-encoded fields in the anime dataset.
//!
//! The `genres` column is stored as a list literal such as `['Action', 'Comedy']`.
//! These helpers turn that text back into a list of names, strictly: anything
//! that is not a flat list of quoted strings is rejected instead of coerced.

/// Parses a genre list literal into its item strings.
///
/// # Accepted Formats
///
/// * `""` or whitespace only → empty list (missing value)
/// * `[]` → empty list
/// * `['Action', "Girls' Love"]` → single or double quoted items
/// * Backslash escapes inside quotes (`\'`, `\"`, `\\`, `\n`, `\t`)
/// * An optional trailing comma (`['Action',]`)
///
/// # Errors
///
/// Returns a description of the first problem when the text is not a list
/// literal of strings (bare words, numbers, nested lists, unterminated quotes).
pub fn parse_list_literal(raw: &str) -> Result<Vec<String>, String> {
    let text = raw.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let mut chars = text.chars().peekable();
    if chars.next() != Some('[') {
        return Err(format!("expected '[' at start of list literal, got {:?}", text));
    }

    let mut items = Vec::new();
    // true right after '[' or ',' when another item (or ']') may follow
    let mut expecting_item = true;

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        match chars.next() {
            None => return Err("unterminated list literal, missing ']'".to_string()),
            Some(']') => break,
            Some(',') if !expecting_item => {
                expecting_item = true;
            }
            Some(',') => return Err("unexpected ',' in list literal".to_string()),
            Some(quote @ ('\'' | '"')) if expecting_item => {
                items.push(parse_quoted(&mut chars, quote)?);
                expecting_item = false;
            }
            Some(other) if expecting_item => {
                return Err(format!("expected quoted string, found {:?}", other));
            }
            Some(other) => {
                return Err(format!("expected ',' or ']', found {:?}", other));
            }
        }
    }

    if chars.any(|c| !c.is_whitespace()) {
        return Err("trailing characters after ']'".to_string());
    }
    Ok(items)
}

fn parse_quoted(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    quote: char,
) -> Result<String, String> {
    let mut out = String::new();
    loop {
        match chars.next() {
            None => return Err("unterminated string in list literal".to_string()),
            Some('\\') => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(c @ ('\\' | '\'' | '"')) => out.push(c),
                Some(c) => {
                    out.push('\\');
                    out.push(c);
                }
                None => return Err("dangling escape in list literal".to_string()),
            },
            Some(c) if c == quote => return Ok(out),
            Some(c) => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_quoted_items() {
        assert_eq!(
            parse_list_literal("['Action', 'Comedy']").unwrap(),
            vec!["Action".to_string(), "Comedy".to_string()]
        );
    }

    #[test]
    fn empty_forms_parse_to_empty_list() {
        assert!(parse_list_literal("[]").unwrap().is_empty());
        assert!(parse_list_literal("").unwrap().is_empty());
        assert!(parse_list_literal("  [ ]  ").unwrap().is_empty());
    }

    #[test]
    fn handles_double_quotes_and_escapes() {
        assert_eq!(
            parse_list_literal(r#"["Girls' Love", 'It\'s', 'a\\b']"#).unwrap(),
            vec!["Girls' Love", "It's", "a\\b"]
        );
    }

    #[test]
    fn trailing_comma_is_accepted() {
        assert_eq!(parse_list_literal("['Drama',]").unwrap(), vec!["Drama"]);
    }

    #[test]
    fn rejects_non_list_values() {
        assert!(parse_list_literal("Action, Comedy").is_err());
        assert!(parse_list_literal("[Action]").is_err());
        assert!(parse_list_literal("['Action' 'Comedy']").is_err());
        assert!(parse_list_literal("['Action'").is_err());
        assert!(parse_list_literal("['Action'] x").is_err());
        assert!(parse_list_literal("[,]").is_err());
        assert!(parse_list_literal("[1, 2]").is_err());
    }
}
