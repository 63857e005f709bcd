//! Rust code emission.
//!
//! Renders one self-contained module from a list of typed queries: an enum
//! type per resolved PostgreSQL enum, then per query a SQL constant, a
//! params struct (when the query takes parameters), and a row struct (when
//! the kind returns rows). The SQL constants carry the post-rewrite text, so
//! named parameters appear as the `$N` the server will actually see.

use sqlbind_core::typed::{Column, TypeRef, TypedQuery};

/// Render the complete generated module.
pub fn render_module(queries: &[TypedQuery]) -> String {
    let mut out = String::new();
    out.push_str("// Code generated by sqlbind. DO NOT EDIT.\n");
    out.push_str("#![allow(dead_code)]\n");

    for (name, variants) in collect_enums(queries) {
        out.push('\n');
        render_enum(&mut out, &name, &variants);
    }

    for query in queries {
        out.push('\n');
        render_query(&mut out, query);
    }

    out
}

/// Every distinct enum type mentioned anywhere in the queries, in order of
/// first appearance.
fn collect_enums(queries: &[TypedQuery]) -> Vec<(String, Vec<String>)> {
    let mut enums: Vec<(String, Vec<String>)> = Vec::new();
    let mut visit = |ty: &TypeRef| {
        let mut ty = ty;
        while let TypeRef::Array(inner) = ty {
            ty = inner.as_ref();
        }
        if let TypeRef::Enum { name, variants } = ty {
            if !enums.iter().any(|(n, _)| n == name) {
                enums.push((name.clone(), variants.clone()));
            }
        }
    };
    for query in queries {
        for param in &query.params {
            visit(&param.ty);
        }
        for column in &query.columns {
            visit(&column.ty);
        }
    }
    enums
}

fn render_enum(out: &mut String, name: &str, variants: &[String]) {
    out.push_str(&format!("/// PostgreSQL enum `{}`.\n", name));
    out.push_str("#[derive(Debug, Clone, Copy, PartialEq, Eq)]\n");
    out.push_str(&format!("pub enum {} {{\n", camel_case(name)));
    for variant in variants {
        out.push_str(&format!("    {},\n", camel_case(variant)));
    }
    out.push_str("}\n\n");

    out.push_str(&format!("impl {} {{\n", camel_case(name)));
    out.push_str("    pub fn as_str(&self) -> &'static str {\n");
    out.push_str("        match self {\n");
    for variant in variants {
        out.push_str(&format!(
            "            {}::{} => \"{}\",\n",
            camel_case(name),
            camel_case(variant),
            variant
        ));
    }
    out.push_str("        }\n    }\n}\n");
}

fn render_query(out: &mut String, query: &TypedQuery) {
    if let Some(comment) = &query.comment {
        for line in comment.lines() {
            out.push_str(&format!("/// {}\n", line));
        }
    }
    out.push_str(&format!(
        "pub const {}: &str = {};\n",
        const_name(&query.name),
        rust_string_literal(&query.sql)
    ));

    if !query.params.is_empty() {
        out.push_str(&format!(
            "\n#[derive(Debug, Clone)]\npub struct {}Params {{\n",
            query.name
        ));
        for param in &query.params {
            out.push_str(&format!(
                "    pub {}: {},\n",
                field_ident(&param.name),
                rust_type(&param.ty)
            ));
        }
        out.push_str("}\n");
    }

    if query.kind.returns_rows() {
        out.push_str(&format!(
            "\n#[derive(Debug, Clone)]\npub struct {}Row {{\n",
            query.name
        ));
        for column in &query.columns {
            out.push_str(&format!(
                "    pub {}: {},\n",
                field_ident(&column.name),
                column_type(column)
            ));
        }
        out.push_str("}\n");
    }
}

fn column_type(column: &Column) -> String {
    let base = rust_type(&column.ty);
    if column.nullable {
        format!("Option<{}>", base)
    } else {
        base
    }
}

fn rust_type(ty: &TypeRef) -> String {
    use sqlbind_core::typed::ScalarType::*;
    match ty {
        TypeRef::Scalar(scalar) => match scalar {
            Bool => "bool",
            Int2 => "i16",
            Int4 => "i32",
            Int8 => "i64",
            Float4 => "f32",
            Float8 => "f64",
            Text | Varchar | Bpchar | Name => "String",
            Bytea => "Vec<u8>",
            Oid => "u32",
            // text form; decoding binary formats is out of scope
            Uuid | Json | Jsonb | Date | Time | Timestamp | Timestamptz | Interval | Numeric => {
                "String"
            }
        }
        .to_string(),
        TypeRef::Array(inner) => format!("Vec<{}>", rust_type(inner)),
        TypeRef::Enum { name, .. } => camel_case(name),
        TypeRef::Unknown(oid) => format!("String /* oid {} */", oid),
    }
}

/// `GetUser` → `GET_USER`.
fn const_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() && prev_lower {
            out.push('_');
        }
        prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        out.push(c.to_ascii_uppercase());
    }
    out
}

/// `order_status` → `OrderStatus`.
fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for part in name.split(|c: char| c == '_' || c == '-' || c == ' ') {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    if out.is_empty() {
        out.push('_');
    }
    out
}

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut",
    "pub", "ref", "return", "static", "struct", "trait", "true", "type", "unsafe", "use",
    "where", "while",
];

/// Turn an arbitrary SQL identifier into a valid Rust field name.
fn field_ident(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    // `self`/`super`/`crate` cannot be raw identifiers
    if matches!(out.as_str(), "self" | "super" | "crate") {
        out.push('_');
    } else if RUST_KEYWORDS.contains(&out.as_str()) {
        out = format!("r#{}", out);
    }
    out
}

fn rust_string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlbind_core::typed::{Column, Param, QueryKind, ScalarType, TypeRef, TypedQuery};

    fn scalar(s: ScalarType) -> TypeRef {
        TypeRef::Scalar(s)
    }

    fn query_fixture() -> TypedQuery {
        TypedQuery {
            name: "GetUser".into(),
            file_path: "users.sql".into(),
            sql: "SELECT id, name FROM users WHERE id = $1".into(),
            comment: Some("Fetch a single user by primary key.".into()),
            kind: QueryKind::One,
            params: vec![Param {
                index: 0,
                name: "id".into(),
                ty: scalar(ScalarType::Int4),
            }],
            columns: vec![
                Column {
                    name: "id".into(),
                    ty: scalar(ScalarType::Int4),
                    nullable: false,
                    table_oid: 16385,
                    column_attr: 1,
                },
                Column {
                    name: "name".into(),
                    ty: scalar(ScalarType::Text),
                    nullable: true,
                    table_oid: 16385,
                    column_attr: 2,
                },
            ],
        }
    }

    #[test]
    fn test_render_query_module() {
        let module = render_module(&[query_fixture()]);
        assert!(module.starts_with("// Code generated by sqlbind. DO NOT EDIT.\n"));
        assert!(module.contains("/// Fetch a single user by primary key."));
        assert!(module.contains(
            "pub const GET_USER: &str = \"SELECT id, name FROM users WHERE id = $1\";"
        ));
        assert!(module.contains("pub struct GetUserParams {\n    pub id: i32,\n}"));
        assert!(module.contains("pub struct GetUserRow {"));
        assert!(module.contains("    pub name: Option<String>,"));
    }

    #[test]
    fn test_exec_query_has_no_row_struct() {
        let mut query = query_fixture();
        query.name = "TouchUser".into();
        query.kind = QueryKind::Exec;
        let module = render_module(&[query]);
        assert!(!module.contains("TouchUserRow"));
        assert!(module.contains("TouchUserParams"));
    }

    #[test]
    fn test_enum_rendered_once() {
        let status = TypeRef::Enum {
            name: "order_status".into(),
            variants: vec!["pending".into(), "shipped".into()],
        };
        let mut first = query_fixture();
        first.columns[0].ty = status.clone();
        let mut second = query_fixture();
        second.name = "ListOrders".into();
        second.kind = QueryKind::Many;
        second.columns[1].ty = TypeRef::Array(Box::new(status));

        let module = render_module(&[first, second]);
        assert_eq!(module.matches("pub enum OrderStatus").count(), 1);
        assert!(module.contains("OrderStatus::Pending => \"pending\""));
        assert!(module.contains("pub name: Option<Vec<OrderStatus>>,"));
    }

    #[test]
    fn test_unknown_oid_marker() {
        let mut query = query_fixture();
        query.columns[0].ty = TypeRef::Unknown(54321);
        let module = render_module(&[query]);
        assert!(module.contains("String /* oid 54321 */"));
    }

    #[test]
    fn test_const_name() {
        assert_eq!(const_name("GetUser"), "GET_USER");
        assert_eq!(const_name("ListOrderItems2"), "LIST_ORDER_ITEMS2");
        assert_eq!(const_name("Ping"), "PING");
    }

    #[test]
    fn test_field_ident_handles_keywords_and_junk() {
        assert_eq!(field_ident("type"), "r#type");
        assert_eq!(field_ident("self"), "self_");
        assert_eq!(field_ident("?column?"), "_column_");
        assert_eq!(field_ident("2fast"), "_2fast");
        assert_eq!(field_ident("name"), "name");
    }

    #[test]
    fn test_string_literal_escaping() {
        assert_eq!(
            rust_string_literal("SELECT \"a\"\nFROM t"),
            "\"SELECT \\\"a\\\"\\nFROM t\""
        );
    }
}
