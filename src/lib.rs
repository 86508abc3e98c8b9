//! Movie analytics pipeline.
//!
//! A movie table is loaded once ([`data::loader`]), narrowed by declarative
//! filters ([`data::filter`]) and summarised by pure aggregate helpers
//! ([`data::aggregate`]). The dashboard binary and the `movie-report` tool
//! are thin callers of this library.

pub mod config;
pub mod data;
pub mod report;
