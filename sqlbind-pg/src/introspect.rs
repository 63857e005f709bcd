//! Query introspection.
//!
//! For every annotated query the introspector asks the server itself what
//! the parameter and column types are: Parse with no declared parameter
//! types, Describe the unnamed statement, Sync, then read everything up to
//! ReadyForQuery. Catalog follow-ups (enum variants, NOT NULL flags) run
//! afterwards over the simple query protocol, never interleaved with the
//! extended-protocol exchange.

use sqlbind_core::infer::{dedupe_names, infer_param_names};
use sqlbind_core::query_file::UntypedQuery;
use sqlbind_core::rewrite::{
    quote_alias_hints, rewrite_named_params, split_nullability_hint, NamedRewrite,
};
use sqlbind_core::typed::{Column, Param, QueryKind, TypedQuery};

use crate::catalog::{NullabilityCache, TypeCatalog};
use crate::driver::{PgConnection, PgError, PgResult};
use crate::protocol::{BackendMessage, DescribeTarget, FieldDescription, FrontendMessage};

/// Drives Parse/Describe/Sync per query and assembles [`TypedQuery`] records.
pub struct Introspector {
    conn: PgConnection,
    types: TypeCatalog,
    nullability: NullabilityCache,
}

impl Introspector {
    pub fn new(conn: PgConnection) -> Self {
        Self {
            conn,
            types: TypeCatalog::new(),
            nullability: NullabilityCache::new(),
        }
    }

    /// Hand the connection back, e.g. to close it cleanly.
    pub fn into_connection(self) -> PgConnection {
        self.conn
    }

    /// Introspect one query. A server error fails the query (and, by policy,
    /// the whole run); there are no retries, the SQL itself is at fault.
    pub fn introspect(&mut self, query: &UntypedQuery) -> PgResult<TypedQuery> {
        let rewrite = rewrite_named_params(&query.sql);
        let effective_sql = match &rewrite {
            Some(r) => r.sql.clone(),
            None => query.sql.clone(),
        };
        // The server sees the quoted aliases; the emitted bindings keep the
        // user's spelling.
        let wire_sql = quote_alias_hints(&effective_sql);

        self.conn.send(&FrontendMessage::Parse {
            name: String::new(),
            query: wire_sql,
        })?;
        self.conn.send(&FrontendMessage::Describe {
            target: DescribeTarget::Statement,
            name: String::new(),
        })?;
        self.conn.send(&FrontendMessage::Sync)?;

        let mut param_oids: Vec<u32> = Vec::new();
        let mut fields: Vec<FieldDescription> = Vec::new();
        for msg in self.conn.recv_until_ready()? {
            match msg {
                BackendMessage::ParameterDescription(oids) => param_oids = oids,
                BackendMessage::RowDescription(f) => fields = f,
                BackendMessage::ErrorResponse(e) => {
                    return Err(PgError::Introspection {
                        query: query.name.clone(),
                        message: e.message,
                    });
                }
                // ParseComplete, NoData, NoticeResponse, ReadyForQuery
                _ => {}
            }
        }

        if let Some(kind @ (QueryKind::One | QueryKind::Many)) = query.kind {
            if fields.is_empty() {
                return Err(PgError::Introspection {
                    query: query.name.clone(),
                    message: format!("annotated :{} but the statement returns no columns", kind),
                });
            }
        }

        let names = assemble_param_names(&query.sql, rewrite.as_ref(), param_oids.len());
        let mut params = Vec::with_capacity(param_oids.len());
        for (i, &o) in param_oids.iter().enumerate() {
            params.push(Param {
                index: i as u16,
                name: names[i].clone(),
                ty: self.types.resolve(&mut self.conn, o)?,
            });
        }

        let mut columns = Vec::with_capacity(fields.len());
        for f in &fields {
            let (base, hint) = split_nullability_hint(&f.name);
            let not_null = match hint {
                Some(forced) => forced,
                None if f.table_oid != 0 && f.column_attr > 0 => {
                    self.nullability
                        .is_not_null(&mut self.conn, f.table_oid, f.column_attr)?
                }
                // A computed expression the catalog cannot vouch for.
                None => false,
            };
            columns.push(Column {
                name: base.to_string(),
                ty: self.types.resolve(&mut self.conn, f.type_oid)?,
                nullable: !not_null,
                table_oid: f.table_oid,
                column_attr: f.column_attr,
            });
        }

        let kind = query.kind.unwrap_or(if columns.is_empty() {
            QueryKind::Exec
        } else {
            QueryKind::Many
        });

        Ok(TypedQuery {
            name: query.name.clone(),
            file_path: query.file_path.clone(),
            sql: effective_sql,
            comment: query.comment.clone(),
            kind,
            params,
            columns,
        })
    }
}

/// Build the final parameter name list for a query.
///
/// With a named rewrite, the first `positional_count` slots are inferred
/// from the *original* SQL and the rest carry the recorded `@name`s, in slot
/// order. Without one, every slot is inferred. The server's parameter count
/// is authoritative: short lists are padded with `param_<K>`, long ones
/// truncated, and the result deduplicated.
pub fn assemble_param_names(
    original_sql: &str,
    rewrite: Option<&NamedRewrite>,
    server_count: usize,
) -> Vec<String> {
    let mut names = match rewrite {
        Some(r) => {
            let positional = (r.positional_count as usize).min(server_count);
            let mut names = infer_param_names(original_sql, positional);
            names.extend(r.names.iter().cloned());
            names
        }
        None => infer_param_names(original_sql, server_count),
    };
    while names.len() < server_count {
        names.push(format!("param_{}", names.len() + 1));
    }
    names.truncate(server_count);
    dedupe_names(&mut names);
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlbind_core::rewrite::rewrite_named_params;

    #[test]
    fn test_names_without_rewrite() {
        let sql = "SELECT id, name FROM users WHERE id = $1";
        assert_eq!(assemble_param_names(sql, None, 1), vec!["id"]);
    }

    #[test]
    fn test_names_merge_positional_and_named() {
        let sql = "UPDATE accounts SET locked_until_at = @locked_until_at WHERE id = $1";
        let rewrite = rewrite_named_params(sql).unwrap();
        assert_eq!(
            assemble_param_names(sql, Some(&rewrite), 2),
            vec!["id", "locked_until_at"]
        );
    }

    #[test]
    fn test_repeated_named_param_is_one_slot() {
        let sql = "SELECT * FROM p WHERE (@author_id::int IS NULL OR p.user_id = @author_id)";
        let rewrite = rewrite_named_params(sql).unwrap();
        assert_eq!(
            assemble_param_names(sql, Some(&rewrite), 1),
            vec!["author_id"]
        );
    }

    #[test]
    fn test_collision_between_inferred_and_named_dedupes() {
        let sql = "SELECT * FROM t WHERE id = $1 AND id = @id";
        let rewrite = rewrite_named_params(sql).unwrap();
        assert_eq!(
            assemble_param_names(sql, Some(&rewrite), 2),
            vec!["id", "id_1"]
        );
    }

    #[test]
    fn test_server_count_pads_and_truncates() {
        let sql = "SELECT $1";
        assert_eq!(
            assemble_param_names(sql, None, 3),
            vec!["param_1", "param_2", "param_3"]
        );
        assert_eq!(assemble_param_names(sql, None, 0), Vec::<String>::new());
    }
}
