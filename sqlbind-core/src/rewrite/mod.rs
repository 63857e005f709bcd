//! SQL rewriting passes applied before a query is sent to the server.
//!
//! Two passes run in order: named-parameter substitution (`@name` → `$N`)
//! and alias-hint quoting (`total!` → `"total!"`). Both honor the shared
//! scanner rules, so text inside strings and comments is never touched.

mod alias;
mod named;

pub use alias::{quote_alias_hints, split_nullability_hint};
pub use named::{rewrite_named_params, NamedRewrite};
