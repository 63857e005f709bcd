//! Type catalog and nullability cache.
//!
//! OIDs reported by the server are resolved locally when they are built-ins
//! and through catalog queries otherwise. Both caches live for one
//! generation run, so a user enum or a column's NOT NULL flag is fetched at
//! most once no matter how many queries mention it.

use std::collections::HashMap;

use sqlbind_core::typed::{ScalarType, TypeRef};

use crate::driver::{PgConnection, PgResult};
use crate::protocol::types::{element_oid, oid};

const BUILTIN_SCALARS: &[(u32, ScalarType)] = &[
    (oid::BOOL, ScalarType::Bool),
    (oid::INT2, ScalarType::Int2),
    (oid::INT4, ScalarType::Int4),
    (oid::INT8, ScalarType::Int8),
    (oid::FLOAT4, ScalarType::Float4),
    (oid::FLOAT8, ScalarType::Float8),
    (oid::TEXT, ScalarType::Text),
    (oid::VARCHAR, ScalarType::Varchar),
    (oid::BPCHAR, ScalarType::Bpchar),
    (oid::NAME, ScalarType::Name),
    (oid::BYTEA, ScalarType::Bytea),
    (oid::UUID, ScalarType::Uuid),
    (oid::JSON, ScalarType::Json),
    (oid::JSONB, ScalarType::Jsonb),
    (oid::DATE, ScalarType::Date),
    (oid::TIME, ScalarType::Time),
    (oid::TIMESTAMP, ScalarType::Timestamp),
    (oid::TIMESTAMPTZ, ScalarType::Timestamptz),
    (oid::INTERVAL, ScalarType::Interval),
    (oid::NUMERIC, ScalarType::Numeric),
    (oid::OID, ScalarType::Oid),
];

const BUILTIN_ARRAYS: &[u32] = &[
    oid::BOOL_ARRAY,
    oid::BYTEA_ARRAY,
    oid::NAME_ARRAY,
    oid::INT2_ARRAY,
    oid::INT4_ARRAY,
    oid::INT8_ARRAY,
    oid::TEXT_ARRAY,
    oid::BPCHAR_ARRAY,
    oid::VARCHAR_ARRAY,
    oid::FLOAT4_ARRAY,
    oid::FLOAT8_ARRAY,
    oid::DATE_ARRAY,
    oid::TIME_ARRAY,
    oid::TIMESTAMP_ARRAY,
    oid::TIMESTAMPTZ_ARRAY,
    oid::INTERVAL_ARRAY,
    oid::NUMERIC_ARRAY,
    oid::JSON_ARRAY,
    oid::JSONB_ARRAY,
    oid::UUID_ARRAY,
    oid::OID_ARRAY,
];

/// Maps type OIDs to [`TypeRef`] descriptors. Built-ins are preloaded; user
/// enums are resolved through `pg_type`/`pg_enum` and cached.
pub struct TypeCatalog {
    cache: HashMap<u32, TypeRef>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        let mut cache = HashMap::new();
        for &(o, scalar) in BUILTIN_SCALARS {
            cache.insert(o, TypeRef::Scalar(scalar));
        }
        for &array in BUILTIN_ARRAYS {
            let element = element_oid(array).and_then(|e| cache.get(&e).cloned());
            if let Some(element) = element {
                cache.insert(array, TypeRef::Array(Box::new(element)));
            }
        }
        Self { cache }
    }

    /// Already-cached descriptor for `o`, if any.
    pub fn get(&self, o: u32) -> Option<&TypeRef> {
        self.cache.get(&o)
    }

    /// Resolve `o` to a descriptor, querying the server's catalog on a miss.
    /// OIDs that are neither built-in nor enums resolve to
    /// [`TypeRef::Unknown`] (uncached, so a later run of the same process
    /// would see a newly created type).
    pub fn resolve(&mut self, conn: &mut PgConnection, o: u32) -> PgResult<TypeRef> {
        if let Some(ty) = self.cache.get(&o) {
            return Ok(ty.clone());
        }
        if let Some(ty) = lookup_enum(conn, o)? {
            self.cache.insert(o, ty.clone());
            return Ok(ty);
        }
        Ok(TypeRef::Unknown(o))
    }
}

impl Default for TypeCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn lookup_enum(conn: &mut PgConnection, type_oid: u32) -> PgResult<Option<TypeRef>> {
    let sql = format!(
        "SELECT t.typname, e.enumlabel FROM pg_type t \
         JOIN pg_enum e ON e.enumtypid = t.oid \
         WHERE t.oid = {} ORDER BY e.enumsortorder",
        type_oid
    );
    let rows = conn.simple_query(&sql)?;
    Ok(parse_enum_rows(&rows))
}

/// Fold the `(typname, enumlabel)` rows into an enum descriptor.
fn parse_enum_rows(rows: &[Vec<Option<Vec<u8>>>]) -> Option<TypeRef> {
    let name = text_cell(rows.first()?, 0)?;
    let variants: Vec<String> = rows.iter().filter_map(|r| text_cell(r, 1)).collect();
    Some(TypeRef::Enum { name, variants })
}

/// Memoizes `pg_attribute.attnotnull` per `(table_oid, column_attr)`.
pub struct NullabilityCache {
    cache: HashMap<(u32, i16), bool>,
}

impl NullabilityCache {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// Whether the column carries NOT NULL in the catalog. A column the
    /// catalog does not know (e.g. dropped concurrently) counts as nullable.
    pub fn is_not_null(
        &mut self,
        conn: &mut PgConnection,
        table_oid: u32,
        column_attr: i16,
    ) -> PgResult<bool> {
        if let Some(&cached) = self.cache.get(&(table_oid, column_attr)) {
            return Ok(cached);
        }
        let sql = format!(
            "SELECT attnotnull FROM pg_attribute WHERE attrelid = {} AND attnum = {}",
            table_oid, column_attr
        );
        let rows = conn.simple_query(&sql)?;
        let not_null = rows
            .first()
            .and_then(|r| text_cell(r, 0))
            .map(|v| v == "t")
            .unwrap_or(false);
        self.cache.insert((table_oid, column_attr), not_null);
        Ok(not_null)
    }
}

impl Default for NullabilityCache {
    fn default() -> Self {
        Self::new()
    }
}

fn text_cell(row: &[Option<Vec<u8>>], idx: usize) -> Option<String> {
    row.get(idx)?
        .as_ref()
        .map(|b| String::from_utf8_lossy(b).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_preloaded() {
        let catalog = TypeCatalog::new();
        assert_eq!(
            catalog.get(oid::INT4),
            Some(&TypeRef::Scalar(ScalarType::Int4))
        );
        assert_eq!(
            catalog.get(oid::TIMESTAMPTZ),
            Some(&TypeRef::Scalar(ScalarType::Timestamptz))
        );
        assert_eq!(
            catalog.get(oid::TEXT_ARRAY),
            Some(&TypeRef::Array(Box::new(TypeRef::Scalar(ScalarType::Text))))
        );
        assert_eq!(catalog.get(99999), None);
    }

    #[test]
    fn test_parse_enum_rows() {
        let rows = vec![
            vec![Some(b"status".to_vec()), Some(b"active".to_vec())],
            vec![Some(b"status".to_vec()), Some(b"disabled".to_vec())],
        ];
        assert_eq!(
            parse_enum_rows(&rows),
            Some(TypeRef::Enum {
                name: "status".into(),
                variants: vec!["active".into(), "disabled".into()],
            })
        );
        assert_eq!(parse_enum_rows(&[]), None);
    }
}
