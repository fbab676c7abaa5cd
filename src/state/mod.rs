//! Catalog state layer
//!
//! This module handles everything between the database file and the caller:
//! - Read-only queries over the history database (store.rs)
//! - Decoded record structures (data.rs)
//! - Pagination state and background fetches (pager.rs)

pub mod data;
pub mod pager;
pub mod store;
