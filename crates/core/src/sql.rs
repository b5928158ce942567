//! Every caller-controlled value that reaches query text goes through one of
//! these two functions. Nothing else may interpolate into SQL.

/// Wraps a stream or table name in double quotes, doubling embedded quotes.
#[must_use]
pub fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// Escapes a value for use inside a single-quoted string literal.
///
/// Backslashes are doubled before quotes so that an escaped quote can never be
/// re-opened by a trailing backslash.
#[must_use]
pub fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{escape_literal, quote_identifier};

    /// Reads a single-quoted literal the way the backend does and returns the
    /// decoded value plus whatever trailed the closing quote.
    fn read_literal(text: &str) -> Option<(String, String)> {
        let mut chars = text.strip_prefix('\'')?.chars().peekable();
        let mut decoded = String::new();

        while let Some(current) = chars.next() {
            match current {
                '\\' => decoded.push(chars.next()?),
                '\'' if chars.peek() == Some(&'\'') => {
                    chars.next();
                    decoded.push('\'');
                }
                '\'' => return Some((decoded, chars.collect())),
                other => decoded.push(other),
            }
        }

        None
    }

    #[test]
    fn escape_literal_doubles_backslash_then_quote() {
        assert_eq!(escape_literal("a'b\\c"), "a''b\\\\c");
    }

    #[test]
    fn escape_literal_neutralises_trailing_backslash_before_quote() {
        let escaped = escape_literal("x\\' OR 1=1 --");
        let decoded = read_literal(format!("'{escaped}'").as_str());
        assert_eq!(
            decoded,
            Some(("x\\' OR 1=1 --".to_owned(), String::new()))
        );
    }

    #[test]
    fn quote_identifier_doubles_embedded_quotes() {
        assert_eq!(quote_identifier("default"), "\"default\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }

    proptest! {
        #[test]
        fn escaped_literal_round_trips(value in any::<String>()) {
            let embedded = format!("'{}'", escape_literal(value.as_str()));
            prop_assert_eq!(read_literal(embedded.as_str()), Some((value, String::new())));
        }

        #[test]
        fn quoted_identifier_never_closes_early(value in any::<String>()) {
            let quoted = quote_identifier(value.as_str());
            let inner = &quoted[1..quoted.len() - 1];
            prop_assert_eq!(inner.replace("\"\"", ""), value.replace('"', ""));
        }
    }
}
