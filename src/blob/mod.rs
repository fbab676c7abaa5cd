//! Binary-blob decoding layer
//!
//! This module turns the opaque BLOB columns of a history database into
//! usable data:
//! - Bounds-checked scalar extraction (reader.rs)
//! - Table/vtable record navigation (record.rs)
//! - Embedded JPEG extraction by marker scan (jpeg.rs)

pub mod jpeg;
pub mod reader;
pub mod record;
