//! Infrastructure layer
//!
//! Contains the concrete corpus backends.

pub mod corpus;
