//! Command line front end for `rulematch` keyword rules.
//!
//! The `rulematch` binary evaluates a single query against documents,
//! classifies documents with a JSON rule set, or checks rules for authoring
//! problems. Results go to stdout as JSON lines or plain text; logs go to
//! stderr.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
mod output;
