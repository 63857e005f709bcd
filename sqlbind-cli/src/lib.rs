//! CLI-side plumbing for sqlbind: file discovery, the generate/verify
//! drivers, and Rust code emission.

pub mod codegen;
pub mod generate;
