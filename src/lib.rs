//! genlog — a read-only browser for image-generation history databases.
//!
//! The history file is a SQLite database whose rows carry their metadata as
//! hand-rolled table/vtable blobs and their previews as tensor dumps with a
//! JPEG embedded somewhere inside. This crate decodes both, pages through
//! the history newest-first, and never writes a byte back.

pub mod blob;
pub mod state;

pub use state::data::{GenerationRecord, Lora, Sampler, SeedMode};
pub use state::pager::{fetch_page, PageRequest, PageResult, Pager};
pub use state::store::{RecordStore, StoreError};
