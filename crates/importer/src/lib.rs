//! Runner support for the `wxr-importer` binary.

pub mod config;
