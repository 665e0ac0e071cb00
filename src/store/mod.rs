//! Store layer: the document-store contract and its in-process implementation.
//!
//! The core treats the remote document store as an external collaborator; this
//! module pins down exactly what it requires of one ([`RankStore`]) and ships
//! an in-process implementation ([`MemoryStore`]) that honors the contract,
//! including live feed synthesis and all-or-nothing batch writes.
//!
//! # Organization
//!
//! - [`backend`]: The `RankStore` trait
//! - [`models`]: Field-update and write-batch types for the atomic write
//!   primitive
//! - [`memory`]: In-memory store with snapshot diffing and optional JSON
//!   persistence

pub mod backend;
pub mod memory;
pub mod models;

pub use backend::RankStore;
pub use memory::MemoryStore;
pub use models::{Field, FieldUpdate, FieldValue, WriteBatch};
