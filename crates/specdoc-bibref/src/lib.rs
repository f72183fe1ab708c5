//! Bibliographic record model and remote reference-database access.
//!
//! This crate provides the data layer of the Specdoc bibliography stack:
//!
//! - [`BiblioRecord`] — the record shape shared by document-local override
//!   tables and the remote reference database (terminal entries with a
//!   title, or alias entries pointing at another key).
//! - [`BibrefClient`] — a batched HTTP client for the remote database,
//!   with an advisory reachability probe and a dns-prefetch hint.
//! - [`RemoteLookup`] — the injectable lookup boundary. Production code
//!   uses [`BibrefClient`]; tests and offline runs use [`StaticLookup`].
//! - [`RemoteCache`] / [`CachedLookup`] — an optional process-wide cache
//!   for fetched records with explicit invalidation.
//!
//! The resolution engine itself lives in `specdoc-biblio`, which consumes
//! this crate the same way it consumes a caller-supplied override table:
//! as a completed key-to-record mapping.

pub mod cache;
pub mod client;
pub mod error;
pub mod record;

pub use cache::{CachedLookup, RemoteCache};
pub use client::{BibrefClient, BibrefConfig, NetworkHint, RemoteLookup, StaticLookup};
pub use error::{Error, Result};
pub use record::{BiblioRecord, RefMap};
