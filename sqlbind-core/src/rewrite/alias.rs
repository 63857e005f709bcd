//! Alias-hint quoting.
//!
//! A column alias ending in `!` (force NOT NULL) or `?` (force nullable) has
//! to reach the server quoted, otherwise the parser rejects the bang. This
//! pass turns `SELECT COUNT(*) AS total!` into `SELECT COUNT(*) AS "total!"`
//! so RowDescription echoes the alias verbatim and the introspector can read
//! the hint back off the column name.

use crate::scanner::{ident_end, is_ident_start, skip_region};

/// Quote every bare identifier immediately followed by `!` or `?`.
///
/// Returns the input unchanged (modulo allocation) when no hint occurs.
/// `a != b` is a comparison, not a hint: a `!` directly followed by `=` never
/// triggers quoting.
pub fn quote_alias_hints(sql: &str) -> String {
    let bytes = sql.as_bytes();
    let mut out = String::with_capacity(sql.len());
    let mut copied = 0;
    let mut i = 0;
    while i < bytes.len() {
        if let Some(end) = skip_region(bytes, i) {
            i = end;
            continue;
        }
        if is_ident_start(bytes[i]) {
            let end = ident_end(bytes, i);
            let is_hint = match bytes.get(end).copied() {
                Some(b'!') => bytes.get(end + 1) != Some(&b'='),
                Some(b'?') => true,
                _ => false,
            };
            if is_hint {
                out.push_str(&sql[copied..i]);
                out.push('"');
                out.push_str(&sql[i..=end]);
                out.push('"');
                copied = end + 1;
                i = end + 1;
            } else {
                i = end;
            }
            continue;
        }
        i += 1;
    }
    out.push_str(&sql[copied..]);
    out
}

/// Split a trailing nullability hint off a column name as it came back in
/// RowDescription. Returns the bare name and `Some(true)` for `!` (NOT NULL),
/// `Some(false)` for `?` (nullable), `None` when no hint is present.
pub fn split_nullability_hint(name: &str) -> (&str, Option<bool>) {
    if let Some(stripped) = name.strip_suffix('!') {
        (stripped, Some(true))
    } else if let Some(stripped) = name.strip_suffix('?') {
        (stripped, Some(false))
    } else {
        (name, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bang_alias_quoted() {
        assert_eq!(
            quote_alias_hints("SELECT COUNT(*) AS total! FROM posts"),
            "SELECT COUNT(*) AS \"total!\" FROM posts"
        );
    }

    #[test]
    fn test_question_alias_quoted() {
        assert_eq!(
            quote_alias_hints("SELECT u.nickname AS display_name? FROM users u"),
            "SELECT u.nickname AS \"display_name?\" FROM users u"
        );
    }

    #[test]
    fn test_not_equal_is_not_a_hint() {
        let sql = "SELECT id FROM t WHERE status != 'done'";
        assert_eq!(quote_alias_hints(sql), sql);
    }

    #[test]
    fn test_hint_inside_string_untouched() {
        let sql = "SELECT 'really!' AS msg FROM t";
        assert_eq!(quote_alias_hints(sql), sql);
    }

    #[test]
    fn test_hint_inside_quoted_ident_untouched() {
        let sql = "SELECT \"weird!\" FROM t";
        assert_eq!(quote_alias_hints(sql), sql);
    }

    #[test]
    fn test_plain_sql_unchanged() {
        let sql = "SELECT id, name FROM users WHERE id = $1";
        assert_eq!(quote_alias_hints(sql), sql);
    }

    #[test]
    fn test_split_hint() {
        assert_eq!(split_nullability_hint("total!"), ("total", Some(true)));
        assert_eq!(split_nullability_hint("bio?"), ("bio", Some(false)));
        assert_eq!(split_nullability_hint("name"), ("name", None));
    }
}
