//! Input/output: dataset ingest, archive extraction, and exports.

pub mod archive;
pub mod export;
pub mod ingest;
pub mod summary;
