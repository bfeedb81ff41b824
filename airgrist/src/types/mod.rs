//! Types will provide the definition of the in-memory source (Airtable)
//! and destination (Grist) schema models and functions to parse them from
//! wire payloads.

mod in_memory;
pub use in_memory::*;

mod wire;
pub use wire::*;
