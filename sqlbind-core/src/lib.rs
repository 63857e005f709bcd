//! SQL-side core for sqlbind.
//!
//! Everything in this crate is pure text processing: splitting annotated
//! `.sql` files into named queries, rewriting `@name` parameters into
//! positional `$N` form, quoting `!`/`?` nullability hints on column aliases,
//! and deriving human-readable parameter names from SQL context. The wire
//! protocol and database introspection live in `sqlbind-pg`.

pub mod error;
pub mod infer;
pub mod query_file;
pub mod rewrite;
pub mod scanner;
pub mod typed;

pub use error::SqlbindError;
pub use query_file::{parse_query_file, UntypedQuery};
pub use typed::{Column, Param, QueryKind, ScalarType, TypeRef, TypedQuery};

pub mod prelude {
    pub use crate::error::SqlbindError;
    pub use crate::infer::{dedupe_names, infer_param_names};
    pub use crate::query_file::{parse_query_file, UntypedQuery};
    pub use crate::rewrite::{quote_alias_hints, rewrite_named_params, NamedRewrite};
    pub use crate::typed::{Column, Param, QueryKind, ScalarType, TypeRef, TypedQuery};
}
