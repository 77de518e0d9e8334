//! Corpus repository implementations
//!
//! - `sqlite`: the persistent store, populated with `import_snapshot`
//! - `memory`: a read-only view over a JSON snapshot

mod memory;
mod sqlite;

pub use memory::InMemoryCorpusRepository;
pub use sqlite::{ImportReport, SqliteCorpusRepository};
