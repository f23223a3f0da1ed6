//! PubChem PUG client library
//!
//! This library retrieves chemistry records from PubChem through the Power
//! User Gateway (PUG): it renders request documents, submits them, polls the
//! server-issued ticket until a result is ready, and fetches the payload.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`query`] - Typed request builders rendering PUG XML documents
//! - [`pug`] - Query lifecycle (submit, poll, cancel, fetch) and HTTP transport
//! - [`pubchem`] - High-level operations and result post-processing

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod pubchem;
pub mod pug;
pub mod query;
mod user_agent;

// Re-export commonly used types
pub use pubchem::{IdMapping, MappedId, PubChem};
pub use pug::{
    Endpoints, HttpClient, Payload, PugConfig, PugError, PugQuery, QueryState, RetryPolicy,
    Sleeper, Ticket, TokioSleeper,
};
pub use query::{
    AssayDataQuery, Compression, DownloadFormat, ExchangeOperation, ExchangeOutput, IdDatabase,
    IdExchangeQuery, QueryError, RecordsQuery, StructureFormat,
};
