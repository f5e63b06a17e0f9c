//! Built-in taxonomy tables
//!
//! Generated at compile time by build.rs from `taxonomy/<generation>.toml`.

include!(concat!(env!("OUT_DIR"), "/taxonomy_tables.rs"));
