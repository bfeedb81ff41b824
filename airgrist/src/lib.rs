//! airgrist is a library for copying tabular data (schemas and records)
//! from [Airtable](https://airtable.com/) bases into
//! [Grist](https://www.getgrist.com/) documents.

// Make sure all our public APIs have docs.
#![deny(missing_docs)]

mod error;
pub use error::Error;
pub use error::ErrorKind;
pub use error::Result;

pub mod client;
pub mod config;
pub mod import;
pub mod translate;
pub mod types;
