//! Vocabulary corpus domain module
//!
//! The corpus is a fixed set of words organized in a two-level taxonomy
//! (units → sub-themes) and connected by typed relationship edges.
//!
//! ## Data Model
//!
//! - **Word**: a vocabulary entry, optionally enriched with a root and a difficulty
//! - **Unit / SubTheme**: thematic grouping; a sub-theme belongs to exactly one unit
//! - **WordTheme**: many-to-many membership between words and sub-themes
//! - **WordRelationship**: typed, weighted pair of words
//!
//! Everything here is read-only from the point of view of the graph and
//! recommendation code; rows are fetched through [`CorpusRepository`].

mod relationship;
mod repository;
mod snapshot;
mod taxonomy;
mod word;

pub use relationship::{RelationshipType, WordRelationship};
pub use repository::{CorpusRepository, CorpusStats};
pub use snapshot::CorpusSnapshot;
pub use taxonomy::{
    SubTheme, SubThemeId, ThemeMember, ThemeSibling, Unit, UnitBridge, UnitId, WordTheme,
};
pub use word::{RootId, Word, WordId};
