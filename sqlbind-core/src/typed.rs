//! The typed-query data model.
//!
//! A [`TypedQuery`] is the canonical artifact of a generation run: the query
//! as the user wrote it (post named-parameter rewrite), plus the parameter
//! and column shapes the server vouched for. Code emission consumes nothing
//! else.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Return-shape annotation from the `-- name:` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    /// Exactly one row.
    One,
    /// Zero or more rows.
    Many,
    /// No result rows.
    Exec,
    /// No result rows; the caller wants the affected-row count.
    ExecRows,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::One => "one",
            QueryKind::Many => "many",
            QueryKind::Exec => "exec",
            QueryKind::ExecRows => "execrows",
        }
    }

    /// Whether emitted bindings include a row struct for this kind.
    pub fn returns_rows(&self) -> bool {
        matches!(self, QueryKind::One | QueryKind::Many)
    }
}

impl FromStr for QueryKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "one" => Ok(QueryKind::One),
            "many" => Ok(QueryKind::Many),
            "exec" => Ok(QueryKind::Exec),
            "execrows" => Ok(QueryKind::ExecRows),
            _ => Err(()),
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of built-in scalar types the catalog knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Bool,
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
    Text,
    Varchar,
    Bpchar,
    Name,
    Bytea,
    Uuid,
    Json,
    Jsonb,
    Date,
    Time,
    Timestamp,
    Timestamptz,
    Interval,
    Numeric,
    Oid,
}

impl ScalarType {
    /// The PostgreSQL name of the type, as it appears in `pg_type.typname`.
    pub fn pg_name(&self) -> &'static str {
        match self {
            ScalarType::Bool => "bool",
            ScalarType::Int2 => "int2",
            ScalarType::Int4 => "int4",
            ScalarType::Int8 => "int8",
            ScalarType::Float4 => "float4",
            ScalarType::Float8 => "float8",
            ScalarType::Text => "text",
            ScalarType::Varchar => "varchar",
            ScalarType::Bpchar => "bpchar",
            ScalarType::Name => "name",
            ScalarType::Bytea => "bytea",
            ScalarType::Uuid => "uuid",
            ScalarType::Json => "json",
            ScalarType::Jsonb => "jsonb",
            ScalarType::Date => "date",
            ScalarType::Time => "time",
            ScalarType::Timestamp => "timestamp",
            ScalarType::Timestamptz => "timestamptz",
            ScalarType::Interval => "interval",
            ScalarType::Numeric => "numeric",
            ScalarType::Oid => "oid",
        }
    }
}

/// A language-neutral type descriptor resolved from a PostgreSQL OID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeRef {
    Scalar(ScalarType),
    Array(Box<TypeRef>),
    /// A user-defined enum resolved from `pg_type`/`pg_enum`.
    Enum { name: String, variants: Vec<String> },
    /// An OID the catalog could not resolve.
    Unknown(u32),
}

/// One positional parameter of a typed query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    /// Dense index, `0..N-1`.
    pub index: u16,
    /// Non-empty, unique within the query.
    pub name: String,
    pub ty: TypeRef,
}

/// One result column of a typed query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name with any trailing `!`/`?` hint stripped.
    pub name: String,
    pub ty: TypeRef,
    pub nullable: bool,
    /// Originating table OID, zero for computed expressions.
    pub table_oid: u32,
    /// Attribute number within the table, zero for computed expressions.
    pub column_attr: i16,
}

/// A fully introspected query, ready for code emission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypedQuery {
    pub name: String,
    pub file_path: String,
    /// SQL after named-parameter rewriting (this is what the user ships;
    /// alias-hint quoting is applied only to the copy sent to the server).
    pub sql: String,
    pub comment: Option<String>,
    pub kind: QueryKind,
    pub params: Vec<Param>,
    pub columns: Vec<Column>,
}

impl TypedQuery {
    /// Export as pretty JSON, for tooling and debugging.
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| format!("JSON serialization failed: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            QueryKind::One,
            QueryKind::Many,
            QueryKind::Exec,
            QueryKind::ExecRows,
        ] {
            assert_eq!(kind.as_str().parse::<QueryKind>(), Ok(kind));
        }
        assert!("three".parse::<QueryKind>().is_err());
    }

    #[test]
    fn test_returns_rows() {
        assert!(QueryKind::One.returns_rows());
        assert!(QueryKind::Many.returns_rows());
        assert!(!QueryKind::Exec.returns_rows());
        assert!(!QueryKind::ExecRows.returns_rows());
    }

    #[test]
    fn test_typed_query_json() {
        let q = TypedQuery {
            name: "GetUser".into(),
            file_path: "users.sql".into(),
            sql: "SELECT id FROM users WHERE id = $1".into(),
            comment: None,
            kind: QueryKind::One,
            params: vec![Param {
                index: 0,
                name: "id".into(),
                ty: TypeRef::Scalar(ScalarType::Int4),
            }],
            columns: vec![Column {
                name: "id".into(),
                ty: TypeRef::Scalar(ScalarType::Int4),
                nullable: false,
                table_oid: 16385,
                column_attr: 1,
            }],
        };
        let json = q.to_json().unwrap();
        assert!(json.contains("\"GetUser\""));
        assert!(json.contains("\"int4\""));
    }
}
