//! Writers for string-encoded dataset fields.

/// Encodes genre names as a list literal, e.g. `['Action', 'Comedy']`.
///
/// Items use single quotes unless they contain a single quote and no double
/// quote, matching how such lists are usually written in the source dumps.
/// The output always round-trips through [`crate::deserializers::parse_list_literal`].
pub fn format_list_literal<S: AsRef<str>>(items: &[S]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| quote_item(s.as_ref())).collect();
    format!("[{}]", quoted.join(", "))
}

fn quote_item(item: &str) -> String {
    let quote = if item.contains('\'') && !item.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(item.len() + 2);
    out.push(quote);
    for c in item.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deserializers::parse_list_literal;

    #[test]
    fn formats_plain_names() {
        assert_eq!(
            format_list_literal(&["Action", "Slice of Life"]),
            "['Action', 'Slice of Life']"
        );
        assert_eq!(format_list_literal::<&str>(&[]), "[]");
    }

    #[test]
    fn quotes_survive_parsing() {
        let names = ["Girls' Love", "say \"hi\"", "both ' and \""];
        let literal = format_list_literal(&names);
        assert_eq!(parse_list_literal(&literal).unwrap(), names);
    }
}
