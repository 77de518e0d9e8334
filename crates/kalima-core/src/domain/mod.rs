//! Domain layer
//!
//! Contains the corpus model and the pure logic built on top of it.

pub mod corpus;
pub mod enrichment;
pub mod graph;
pub mod recommend;
