//! Annotated `.sql` file parser.
//!
//! Queries are separated by `;` and each one is preceded by an annotation
//! comment line, optionally followed by free-form doc comment lines:
//!
//! ```text
//! -- name: GetUser :one
//! -- Fetch a single user by primary key.
//! SELECT id, name FROM users WHERE id = $1;
//! ```
//!
//! Statement splitting honors the shared scanner rules, so a `;` inside a
//! string literal or comment never ends a query.

use nom::{
    bytes::complete::{tag, take_while1},
    character::complete::{char, space0, space1},
    combinator::opt,
    sequence::preceded,
    IResult, Parser,
};
use serde::{Deserialize, Serialize};

use crate::error::SqlbindError;
use crate::scanner::skip_region;
use crate::typed::QueryKind;

/// A query as written in the source file, before introspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UntypedQuery {
    /// CamelCase name from the `-- name:` line.
    pub name: String,
    pub file_path: String,
    /// The SQL body exactly as written (no trailing `;`).
    pub sql: String,
    /// Doc comment lines following the name line, if any.
    pub comment: Option<String>,
    /// Kind from the annotation; `None` lets the introspector decide.
    pub kind: Option<QueryKind>,
}

/// Parse one annotated `.sql` file into its queries, in file order.
pub fn parse_query_file(file_path: &str, content: &str) -> Result<Vec<UntypedQuery>, SqlbindError> {
    let mut queries = Vec::new();
    for span in statement_spans(content) {
        let text = &content[span.clone()];
        if text.trim().is_empty() {
            continue;
        }
        let base_line = 1 + content[..span.start].matches('\n').count();
        queries.push(parse_statement(file_path, text, base_line)?);
    }
    Ok(queries)
}

/// Byte ranges of the `;`-separated statements, annotation comments included.
fn statement_spans(content: &str) -> Vec<std::ops::Range<usize>> {
    let bytes = content.as_bytes();
    let mut spans = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if let Some(end) = skip_region(bytes, i) {
            i = end;
            continue;
        }
        if bytes[i] == b';' {
            spans.push(start..i);
            i += 1;
            start = i;
        } else {
            i += 1;
        }
    }
    if start < bytes.len() {
        spans.push(start..bytes.len());
    }
    spans
}

fn parse_statement(
    file_path: &str,
    text: &str,
    base_line: usize,
) -> Result<UntypedQuery, SqlbindError> {
    // Line starts, so errors can point at the right line and the body can be
    // cut at a byte offset.
    let mut lines: Vec<(usize, &str)> = Vec::new();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        lines.push((offset, line));
        offset += line.len();
    }

    let mut idx = 0;
    while idx < lines.len() && lines[idx].1.trim().is_empty() {
        idx += 1;
    }

    let header = lines
        .get(idx)
        .map(|(_, l)| l.trim())
        .filter(|l| l.starts_with("--"))
        .ok_or_else(|| {
            SqlbindError::annotation(
                file_path,
                base_line + idx.min(lines.len().saturating_sub(1)),
                "statement has no `-- name:` annotation",
            )
        })?;

    let (name, kind_str) = match annotation_line(header) {
        Ok(("", parsed)) => parsed,
        _ => {
            return Err(SqlbindError::annotation(
                file_path,
                base_line + idx,
                format!("malformed annotation line: `{}`", header),
            ))
        }
    };
    let kind = match kind_str {
        Some(k) => Some(k.parse::<QueryKind>().map_err(|_| {
            SqlbindError::annotation(
                file_path,
                base_line + idx,
                format!("unknown query kind `:{}`", k),
            )
        })?),
        None => None,
    };
    idx += 1;

    // The run of `--` lines directly under the name line is the doc comment.
    let mut comment_lines: Vec<&str> = Vec::new();
    while idx < lines.len() {
        let trimmed = lines[idx].1.trim_start();
        let Some(rest) = trimmed.strip_prefix("--") else {
            break;
        };
        comment_lines.push(rest.strip_prefix(' ').unwrap_or(rest).trim_end());
        idx += 1;
    }

    let body_offset = lines.get(idx).map(|(o, _)| *o).unwrap_or(text.len());
    let sql = text[body_offset..].trim();
    if sql.is_empty() {
        return Err(SqlbindError::annotation(
            file_path,
            base_line + idx.saturating_sub(1),
            format!("query `{}` has no SQL body", name),
        ));
    }

    Ok(UntypedQuery {
        name: name.to_string(),
        file_path: file_path.to_string(),
        sql: sql.to_string(),
        comment: if comment_lines.is_empty() {
            None
        } else {
            Some(comment_lines.join("\n"))
        },
        kind,
    })
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_').parse(input)
}

/// Parse `-- name: <Name>` with an optional ` :<kind>` tail.
fn annotation_line(input: &str) -> IResult<&str, (&str, Option<&str>)> {
    let (input, _) = (tag("--"), space0, tag("name:"), space1).parse(input)?;
    let (input, name) = identifier(input)?;
    let (input, kind) = opt(preceded((space1, char(':')), identifier)).parse(input)?;
    let (input, _) = space0(input)?;
    Ok((input, (name, kind)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_query() {
        let src = "-- name: GetUser :one\nSELECT id, name FROM users WHERE id = $1;\n";
        let queries = parse_query_file("users.sql", src).expect("parse failed");
        assert_eq!(queries.len(), 1);

        let q = &queries[0];
        assert_eq!(q.name, "GetUser");
        assert_eq!(q.kind, Some(QueryKind::One));
        assert_eq!(q.sql, "SELECT id, name FROM users WHERE id = $1");
        assert!(q.comment.is_none());
    }

    #[test]
    fn test_parse_doc_comment() {
        let src = "\
-- name: ListUsers :many
-- All users, newest first.
-- Paged by the caller.
SELECT * FROM users ORDER BY created_at DESC;
";
        let queries = parse_query_file("users.sql", src).unwrap();
        assert_eq!(
            queries[0].comment.as_deref(),
            Some("All users, newest first.\nPaged by the caller.")
        );
    }

    #[test]
    fn test_parse_multiple_queries() {
        let src = "\
-- name: GetUser :one
SELECT * FROM users WHERE id = $1;

-- name: DeleteUser :exec
DELETE FROM users WHERE id = $1;

-- name: CountUsers
SELECT COUNT(*) AS total! FROM users;
";
        let queries = parse_query_file("users.sql", src).unwrap();
        assert_eq!(queries.len(), 3);
        assert_eq!(queries[0].name, "GetUser");
        assert_eq!(queries[1].kind, Some(QueryKind::Exec));
        assert_eq!(queries[2].name, "CountUsers");
        assert_eq!(queries[2].kind, None);
    }

    #[test]
    fn test_semicolon_inside_string_does_not_split() {
        let src = "-- name: Weird :one\nSELECT 'a;b' AS x;\n";
        let queries = parse_query_file("w.sql", src).unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].sql, "SELECT 'a;b' AS x");
    }

    #[test]
    fn test_missing_annotation_is_an_error() {
        let src = "SELECT 1;";
        let err = parse_query_file("bad.sql", src).unwrap_err();
        assert!(matches!(err, SqlbindError::InvalidAnnotation { .. }));
    }

    #[test]
    fn test_unknown_kind_is_an_error() {
        let src = "-- name: Foo :three\nSELECT 1;";
        let err = parse_query_file("bad.sql", src).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains(":three"), "got: {}", msg);
    }

    #[test]
    fn test_execrows_kind() {
        let src = "-- name: PruneSessions :execrows\nDELETE FROM sessions WHERE expires_at < now();\n";
        let queries = parse_query_file("s.sql", src).unwrap();
        assert_eq!(queries[0].kind, Some(QueryKind::ExecRows));
    }
}
