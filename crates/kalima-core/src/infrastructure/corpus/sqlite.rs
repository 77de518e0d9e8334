//! SQLite implementation of the CorpusRepository

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info, warn};

use crate::domain::corpus::{
    CorpusRepository, CorpusSnapshot, CorpusStats, RelationshipType, RootId, SubTheme, SubThemeId,
    ThemeMember, ThemeSibling, Unit, UnitBridge, UnitId, Word, WordId, WordRelationship,
};
use crate::domain::enrichment::strip_diacritics;
use crate::error::{Error, Result};

/// SQLite implementation of the corpus repository
#[derive(Clone)]
pub struct SqliteCorpusRepository {
    pool: SqlitePool,
}

/// Row counts written by [`SqliteCorpusRepository::import_snapshot`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub units: u64,
    pub sub_themes: u64,
    pub words: u64,
    pub word_themes: u64,
    pub relationships: u64,
    /// Self-referencing relationship rows that were dropped
    pub skipped_relationships: u64,
}

const WORD_COLUMNS: &str =
    "w.id, w.arabic, w.transliteration, w.gloss, w.surah_ayah, w.root_id, w.difficulty, w.is_advanced, w.part_2";

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

impl SqliteCorpusRepository {
    /// Create a new SQLite corpus repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Load a snapshot into the store in one transaction
    ///
    /// Rows are upserted by id; memberships and relationships already present
    /// are left alone apart from the relationship weight.
    pub async fn import_snapshot(&self, snapshot: &CorpusSnapshot) -> Result<ImportReport> {
        let mut report = ImportReport::default();
        let mut tx = self.pool.begin().await?;

        for unit in &snapshot.units {
            sqlx::query(
                r#"
                INSERT INTO units (id, code, name, color, sort_order) VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    code = excluded.code,
                    name = excluded.name,
                    color = excluded.color,
                    sort_order = excluded.sort_order
                "#,
            )
            .bind(unit.id)
            .bind(&unit.code)
            .bind(&unit.name)
            .bind(&unit.color)
            .bind(unit.sort_order)
            .execute(&mut *tx)
            .await?;
            report.units += 1;
        }

        for sub_theme in &snapshot.sub_themes {
            sqlx::query(
                r#"
                INSERT INTO sub_themes (id, unit_id, label, sort_order) VALUES (?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    unit_id = excluded.unit_id,
                    label = excluded.label,
                    sort_order = excluded.sort_order
                "#,
            )
            .bind(sub_theme.id)
            .bind(sub_theme.unit_id)
            .bind(&sub_theme.label)
            .bind(sub_theme.sort_order)
            .execute(&mut *tx)
            .await?;
            report.sub_themes += 1;
        }

        for word in &snapshot.words {
            sqlx::query(
                r#"
                INSERT INTO words (
                    id, arabic, transliteration, gloss, surah_ayah,
                    root_id, difficulty, is_advanced, part_2, arabic_bare
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    arabic = excluded.arabic,
                    arabic_bare = excluded.arabic_bare,
                    transliteration = excluded.transliteration,
                    gloss = excluded.gloss,
                    surah_ayah = excluded.surah_ayah,
                    root_id = excluded.root_id,
                    difficulty = excluded.difficulty,
                    is_advanced = excluded.is_advanced,
                    part_2 = excluded.part_2
                "#,
            )
            .bind(word.id)
            .bind(&word.arabic)
            .bind(&word.transliteration)
            .bind(&word.gloss)
            .bind(&word.surah_ayah)
            .bind(word.root_id)
            .bind(word.difficulty.map(i64::from))
            .bind(word.is_advanced)
            .bind(word.part_2)
            .bind(word.bare_arabic())
            .execute(&mut *tx)
            .await?;
            report.words += 1;
        }

        for membership in &snapshot.word_themes {
            let result = sqlx::query(
                "INSERT OR IGNORE INTO word_themes (word_id, sub_theme_id) VALUES (?, ?)",
            )
            .bind(membership.word_id)
            .bind(membership.sub_theme_id)
            .execute(&mut *tx)
            .await?;
            report.word_themes += result.rows_affected();
        }

        for rel in &snapshot.relationships {
            if rel.word_id_1 == rel.word_id_2 {
                warn!(word_id = rel.word_id_1, "Skipping self-referencing relationship");
                report.skipped_relationships += 1;
                continue;
            }
            sqlx::query(
                r#"
                INSERT INTO word_relationships (word_id_1, word_id_2, relationship_type, weight)
                VALUES (?, ?, ?, ?)
                ON CONFLICT(word_id_1, word_id_2, relationship_type) DO UPDATE SET
                    weight = excluded.weight
                "#,
            )
            .bind(rel.word_id_1)
            .bind(rel.word_id_2)
            .bind(rel.relationship_type.as_str())
            .bind(rel.weight)
            .execute(&mut *tx)
            .await?;
            report.relationships += 1;
        }

        tx.commit().await?;

        info!(
            units = report.units,
            words = report.words,
            relationships = report.relationships,
            "Snapshot imported"
        );
        Ok(report)
    }

    async fn count(&self, table: &str) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

#[async_trait]
impl CorpusRepository for SqliteCorpusRepository {
    // ========== Taxonomy ==========

    async fn list_units(&self) -> Result<Vec<Unit>> {
        let rows: Vec<UnitRow> = sqlx::query_as("SELECT * FROM units ORDER BY sort_order, id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(UnitRow::into_unit).collect())
    }

    async fn get_unit_by_code(&self, code: &str) -> Result<Option<Unit>> {
        let row: Option<UnitRow> =
            sqlx::query_as("SELECT * FROM units WHERE UPPER(code) = UPPER(?)")
                .bind(code.trim())
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(UnitRow::into_unit))
    }

    async fn unit_word_counts(&self) -> Result<HashMap<UnitId, usize>> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT st.unit_id, COUNT(DISTINCT wt.word_id)
            FROM word_themes wt
            JOIN sub_themes st ON st.id = wt.sub_theme_id
            GROUP BY st.unit_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(unit_id, count)| (unit_id, count as usize))
            .collect())
    }

    async fn unit_bridges(&self) -> Result<Vec<UnitBridge>> {
        let rows: Vec<(i64, i64, i64)> = sqlx::query_as(
            r#"
            WITH unit_words AS (
                SELECT DISTINCT st.unit_id, wt.word_id
                FROM word_themes wt
                JOIN sub_themes st ON st.id = wt.sub_theme_id
            )
            SELECT a.unit_id, b.unit_id, COUNT(*)
            FROM unit_words a
            JOIN unit_words b ON a.word_id = b.word_id AND a.unit_id < b.unit_id
            GROUP BY a.unit_id, b.unit_id
            ORDER BY a.unit_id, b.unit_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(unit_a, unit_b, shared)| UnitBridge {
                unit_a,
                unit_b,
                shared_words: shared as usize,
            })
            .collect())
    }

    async fn list_sub_themes(&self, unit_id: UnitId) -> Result<Vec<SubTheme>> {
        let rows: Vec<SubThemeRow> =
            sqlx::query_as("SELECT * FROM sub_themes WHERE unit_id = ? ORDER BY sort_order, id")
                .bind(unit_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(SubThemeRow::into_sub_theme).collect())
    }

    async fn theme_members(&self, sub_theme_ids: &[SubThemeId]) -> Result<Vec<ThemeMember>> {
        if sub_theme_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            r#"
            SELECT wt.sub_theme_id, {}
            FROM word_themes wt
            JOIN words w ON w.id = wt.word_id
            WHERE wt.sub_theme_id IN ({})
            ORDER BY wt.sub_theme_id, wt.id
            "#,
            WORD_COLUMNS,
            placeholders(sub_theme_ids.len())
        );
        let mut query = sqlx::query_as::<_, ThemeMemberRow>(&sql);
        for id in sub_theme_ids {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&self.pool).await?;

        rows.into_iter()
            .map(|row| {
                Ok(ThemeMember {
                    sub_theme_id: row.sub_theme_id,
                    word: row.word.into_word()?,
                })
            })
            .collect()
    }

    // ========== Words ==========

    async fn get_word(&self, id: WordId) -> Result<Option<Word>> {
        let row: Option<WordRow> =
            sqlx::query_as(&format!("SELECT {} FROM words w WHERE w.id = ?", WORD_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(WordRow::into_word).transpose()
    }

    async fn get_words(&self, ids: &[WordId]) -> Result<Vec<Word>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {} FROM words w WHERE w.id IN ({}) ORDER BY w.id",
            WORD_COLUMNS,
            placeholders(ids.len())
        );
        let mut query = sqlx::query_as::<_, WordRow>(&sql);
        for id in ids {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&self.pool).await?;

        debug!(requested = ids.len(), found = rows.len(), "Batch word lookup");
        rows.into_iter().map(WordRow::into_word).collect()
    }

    async fn words_with_root(&self, root_id: RootId) -> Result<Vec<Word>> {
        let rows: Vec<WordRow> = sqlx::query_as(&format!(
            "SELECT {} FROM words w WHERE w.root_id = ? ORDER BY w.id",
            WORD_COLUMNS
        ))
        .bind(root_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(WordRow::into_word).collect()
    }

    async fn words_with_difficulty_between(&self, low: u8, high: u8) -> Result<Vec<Word>> {
        let rows: Vec<WordRow> = sqlx::query_as(&format!(
            "SELECT {} FROM words w WHERE w.difficulty BETWEEN ? AND ? ORDER BY w.id",
            WORD_COLUMNS
        ))
        .bind(i64::from(low))
        .bind(i64::from(high))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(WordRow::into_word).collect()
    }

    async fn theme_siblings(&self, word_id: WordId) -> Result<Vec<ThemeSibling>> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT other.word_id, other.sub_theme_id
            FROM word_themes mine
            JOIN word_themes other
                ON other.sub_theme_id = mine.sub_theme_id AND other.word_id != mine.word_id
            WHERE mine.word_id = ?
            ORDER BY other.sub_theme_id, other.id
            "#,
        )
        .bind(word_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(word_id, sub_theme_id)| ThemeSibling {
                word_id,
                sub_theme_id,
            })
            .collect())
    }

    async fn search_words(&self, query: &str, limit: usize) -> Result<Vec<Word>> {
        let query = query.trim();
        if query.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let pattern = format!("%{}%", query);
        let bare = strip_diacritics(query);
        // A query made only of vowel marks has no bare form to match
        let bare_pattern = if bare.is_empty() { None } else { Some(format!("%{}%", bare)) };
        let rows: Vec<WordRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM words w
            WHERE w.arabic LIKE ?1 OR w.transliteration LIKE ?1 OR w.gloss LIKE ?1
               OR w.arabic_bare LIKE ?3
            ORDER BY w.id
            LIMIT ?2
            "#,
            WORD_COLUMNS
        ))
        .bind(&pattern)
        .bind(limit as i64)
        .bind(bare_pattern)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(WordRow::into_word).collect()
    }

    // ========== Relationships ==========

    async fn relationships_for_word(&self, word_id: WordId) -> Result<Vec<WordRelationship>> {
        let rows: Vec<RelationshipRow> = sqlx::query_as(
            r#"
            SELECT word_id_1, word_id_2, relationship_type, weight
            FROM word_relationships
            WHERE word_id_1 = ?1 OR word_id_2 = ?1
            ORDER BY weight DESC, id
            "#,
        )
        .bind(word_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().filter_map(RelationshipRow::into_relationship).collect())
    }

    async fn relationships_among(&self, word_ids: &[WordId]) -> Result<Vec<WordRelationship>> {
        if word_ids.is_empty() {
            return Ok(Vec::new());
        }

        let list = placeholders(word_ids.len());
        let sql = format!(
            r#"
            SELECT word_id_1, word_id_2, relationship_type, weight
            FROM word_relationships
            WHERE word_id_1 IN ({list}) AND word_id_2 IN ({list})
            ORDER BY id
            "#
        );
        let mut query = sqlx::query_as::<_, RelationshipRow>(&sql);
        for id in word_ids.iter().chain(word_ids.iter()) {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&self.pool).await?;

        Ok(rows.into_iter().filter_map(RelationshipRow::into_relationship).collect())
    }

    // ========== Statistics ==========

    async fn stats(&self) -> Result<CorpusStats> {
        let by_type: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT relationship_type, COUNT(*)
            FROM word_relationships
            GROUP BY relationship_type
            ORDER BY relationship_type
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let relationships_by_type = by_type
            .into_iter()
            .filter_map(|(t, count)| RelationshipType::parse(&t).map(|t| (t, count as u64)))
            .collect();

        let (words_with_root,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM words WHERE root_id IS NOT NULL")
                .fetch_one(&self.pool)
                .await?;
        let (words_with_difficulty,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM words WHERE difficulty IS NOT NULL")
                .fetch_one(&self.pool)
                .await?;

        Ok(CorpusStats {
            units: self.count("units").await?,
            sub_themes: self.count("sub_themes").await?,
            words: self.count("words").await?,
            word_themes: self.count("word_themes").await?,
            relationships: self.count("word_relationships").await?,
            relationships_by_type,
            words_with_root: words_with_root as u64,
            words_with_difficulty: words_with_difficulty as u64,
        })
    }
}

// ========== Database Row Types ==========

#[derive(Debug, FromRow)]
struct UnitRow {
    id: i64,
    code: String,
    name: String,
    color: String,
    sort_order: i32,
}

impl UnitRow {
    fn into_unit(self) -> Unit {
        Unit::new(self.id, self.code, self.name, self.color).with_sort_order(self.sort_order)
    }
}

#[derive(Debug, FromRow)]
struct SubThemeRow {
    id: i64,
    unit_id: i64,
    label: String,
    sort_order: i32,
}

impl SubThemeRow {
    fn into_sub_theme(self) -> SubTheme {
        SubTheme::new(self.id, self.unit_id, self.label).with_sort_order(self.sort_order)
    }
}

#[derive(Debug, FromRow)]
struct WordRow {
    id: i64,
    arabic: String,
    transliteration: Option<String>,
    gloss: Option<String>,
    surah_ayah: Option<String>,
    root_id: Option<i64>,
    difficulty: Option<i64>,
    is_advanced: bool,
    part_2: bool,
}

impl WordRow {
    fn into_word(self) -> Result<Word> {
        let difficulty = self
            .difficulty
            .map(u8::try_from)
            .transpose()
            .map_err(|_| Error::Other(format!("Invalid difficulty for word {}", self.id)))?;

        Ok(Word {
            id: self.id,
            arabic: self.arabic,
            transliteration: self.transliteration,
            gloss: self.gloss,
            surah_ayah: self.surah_ayah,
            root_id: self.root_id,
            difficulty,
            is_advanced: self.is_advanced,
            part_2: self.part_2,
        })
    }
}

#[derive(Debug, FromRow)]
struct ThemeMemberRow {
    sub_theme_id: i64,
    #[sqlx(flatten)]
    word: WordRow,
}

#[derive(Debug, FromRow)]
struct RelationshipRow {
    word_id_1: i64,
    word_id_2: i64,
    relationship_type: String,
    weight: f32,
}

impl RelationshipRow {
    /// Rows with an unrecognized type are dropped with a warning
    fn into_relationship(self) -> Option<WordRelationship> {
        let Some(relationship_type) = RelationshipType::parse(&self.relationship_type) else {
            warn!(
                word_id_1 = self.word_id_1,
                word_id_2 = self.word_id_2,
                relationship_type = %self.relationship_type,
                "Dropping relationship with unknown type"
            );
            return None;
        };

        Some(WordRelationship::new(
            self.word_id_1,
            self.word_id_2,
            relationship_type,
            self.weight,
        ))
    }
}
