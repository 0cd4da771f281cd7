//! End-to-end tests for the metadata codec.
//!
//! Each module drives the public API only: build or parse a document,
//! encode it, and check the wire form or the resulting error.

mod invariants;
mod registry;
mod round_trip;
mod signing;
