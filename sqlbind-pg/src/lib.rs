//! Minimal blocking PostgreSQL client for sqlbind.
//!
//! This crate speaks just enough of the v3.0 wire protocol to introspect
//! queries: startup and authentication (cleartext, MD5, SCRAM-SHA-256), the
//! Parse/Describe/Sync leg of the extended query protocol, and the simple
//! query protocol for catalog lookups.
//!
//! ## Architecture
//!
//! ```text
//! UntypedQuery → rewrite → Parse/Describe/Sync → OIDs → TypedQuery
//! ```
//!
//! ### Protocol layer (pure, no I/O)
//! - `protocol::wire` - message encoding/decoding over byte buffers
//! - `protocol::auth` - SCRAM-SHA-256 and MD5 password math
//!
//! ### Driver layer (blocking I/O)
//! - `driver::PgConnection` - TCP session, framing loop, startup
//! - `catalog` - OID resolution and nullability, memoized per run
//! - `introspect::Introspector` - per-query Parse/Describe/Sync driver

pub mod catalog;
pub mod driver;
pub mod introspect;
pub mod protocol;

pub use catalog::{NullabilityCache, TypeCatalog};
pub use driver::{PgConnection, PgError, PgResult};
pub use introspect::Introspector;
pub use protocol::{BackendMessage, FrontendMessage};
