//! Query model understood by every storage backend.

pub mod collation;
pub mod document;
pub mod filter;
pub mod pipeline;
pub mod update;

pub use collation::Collation;
pub use document::{document_id, get_field, Document};
pub use filter::Filter;
pub use pipeline::{Lookup, Pipeline, SortDirection, Stage};
pub use update::{Update, UpdateOp};
