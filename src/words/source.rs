//! Sqlite-backed word source

use rand::seq::SliceRandom;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

use super::DbPool;
use crate::collab::WordSource;
use crate::word::{FilterMetadata, Filters, Word, WordOrder};
use crate::{Error, Result};

/// One row of the word list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    pub word: String,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub list: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
}

impl WordEntry {
    /// Untagged entry
    #[must_use]
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            ..Self::default()
        }
    }
}

/// Reads the `bee_words` table
#[derive(Clone)]
pub struct SqliteWordSource {
    pool: DbPool,
}

impl SqliteWordSource {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Add a word to the list
    ///
    /// # Errors
    ///
    /// Returns error if the word is blank or the insert fails
    pub fn insert(&self, entry: &WordEntry) -> Result<()> {
        if Word::parse(&entry.word).is_none() {
            return Err(Error::WordSource(format!("blank word: {:?}", entry.word)));
        }

        let conn = self.pool.get().map_err(|e| Error::Database(e.to_string()))?;
        conn.execute(
            "INSERT INTO bee_words (word, year, list, difficulty) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![entry.word, entry.year, entry.list, entry.difficulty],
        )?;

        tracing::debug!(word = %entry.word, "word added");
        Ok(())
    }

    /// Total rows in the word list
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn count(&self) -> Result<usize> {
        let conn = self.pool.get().map_err(|e| Error::Database(e.to_string()))?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM bee_words", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Distinct non-blank values of one tag column
    fn distinct(&self, column: &str) -> Result<Vec<String>> {
        let conn = self.pool.get().map_err(|e| Error::Database(e.to_string()))?;

        // Tags may have been imported as numbers; compare them as text
        let mut stmt = conn.prepare(&format!(
            r"
            SELECT DISTINCT TRIM(CAST({column} AS TEXT)) AS value
            FROM bee_words
            WHERE {column} IS NOT NULL AND TRIM(CAST({column} AS TEXT)) != ''
            ORDER BY value
            "
        ))?;

        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut values = Vec::new();
        for row in rows {
            values.push(row?);
        }
        Ok(values)
    }
}

impl WordSource for SqliteWordSource {
    fn load_words(&self, filters: &Filters, order: WordOrder) -> Result<Vec<Word>> {
        let conn = self.pool.get().map_err(|e| Error::Database(e.to_string()))?;

        let constraints = [
            ("year", filters.year.as_deref()),
            ("list", filters.list.as_deref()),
            ("difficulty", filters.difficulty.as_deref()),
        ];

        let mut sql = String::from("SELECT word FROM bee_words WHERE word IS NOT NULL");
        let mut params: Vec<Value> = Vec::new();
        for (column, value) in constraints {
            if let Some(value) = value {
                params.push(Value::Text(value.to_string()));
                sql.push_str(&format!(
                    " AND TRIM(CAST({column} AS TEXT)) = ?{}",
                    params.len()
                ));
            }
        }
        if order == WordOrder::Alphabetical {
            sql.push_str(" ORDER BY word COLLATE NOCASE");
        }

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params.iter()), |row| {
            row.get::<_, Value>(0)
        })?;

        let mut words = Vec::new();
        for row in rows {
            let raw = match row? {
                Value::Text(text) => text,
                Value::Integer(n) => n.to_string(),
                Value::Real(r) => r.to_string(),
                Value::Null | Value::Blob(_) => continue,
            };
            match Word::parse(&raw) {
                Some(word) => words.push(word),
                None => tracing::trace!(raw = %raw, "skipping blank word"),
            }
        }

        if order == WordOrder::Random {
            words.shuffle(&mut rand::thread_rng());
        } else {
            // Markup stripping can change the order slightly
            words.sort_by_cached_key(|w| w.as_str().to_lowercase());
        }

        tracing::info!(
            count = words.len(),
            filters = ?filters,
            order = order.as_str(),
            "words loaded"
        );
        Ok(words)
    }

    fn filter_metadata(&self) -> Result<FilterMetadata> {
        Ok(FilterMetadata {
            years: self.distinct("year")?,
            lists: self.distinct("list")?,
            difficulties: self.distinct("difficulty")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::words::init_memory;

    fn entry(word: &str, year: &str, list: &str, difficulty: &str) -> WordEntry {
        WordEntry {
            word: word.to_string(),
            year: Some(year.to_string()),
            list: Some(list.to_string()),
            difficulty: Some(difficulty.to_string()),
        }
    }

    fn setup() -> SqliteWordSource {
        let source = SqliteWordSource::new(init_memory().unwrap());
        for e in [
            entry("**banana**", "2024", "1B", "Easy"),
            entry("apple", "2024", "2B", "Easy"),
            entry("Cherry", "2025", "1B", "Hard"),
            entry("date  palm", "2025", "3B", "Hard"),
        ] {
            source.insert(&e).unwrap();
        }
        source.insert(&WordEntry::new("elderberry")).unwrap();
        source
    }

    fn names(words: &[Word]) -> Vec<&str> {
        words.iter().map(Word::as_str).collect()
    }

    #[test]
    fn alphabetical_without_filters() {
        let source = setup();
        let words = source
            .load_words(&Filters::default(), WordOrder::Alphabetical)
            .unwrap();
        assert_eq!(
            names(&words),
            ["apple", "banana", "Cherry", "date palm", "elderberry"]
        );
    }

    #[test]
    fn random_order_keeps_every_word() {
        let source = setup();
        let mut words = names(&source.load_words(&Filters::default(), WordOrder::Random).unwrap())
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        words.sort();
        assert_eq!(words, ["Cherry", "apple", "banana", "date palm", "elderberry"]);
    }

    #[test]
    fn filters_combine() {
        let source = setup();
        let filters = Filters::new(Some("2025".to_string()), None, Some("Hard".to_string()));
        let words = source.load_words(&filters, WordOrder::Alphabetical).unwrap();
        assert_eq!(names(&words), ["Cherry", "date palm"]);

        let filters = Filters::new(None, Some("1B".to_string()), None);
        let words = source.load_words(&filters, WordOrder::Alphabetical).unwrap();
        assert_eq!(names(&words), ["banana", "Cherry"]);

        let filters = Filters::new(None, Some("9Z".to_string()), None);
        assert!(source.load_words(&filters, WordOrder::Random).unwrap().is_empty());
    }

    #[test]
    fn metadata_is_distinct_and_sorted() {
        let source = setup();
        let meta = source.filter_metadata().unwrap();
        assert_eq!(meta.years, ["2024", "2025"]);
        assert_eq!(meta.lists, ["1B", "2B", "3B"]);
        assert_eq!(meta.difficulties, ["Easy", "Hard"]);
    }

    #[test]
    fn numeric_tags_compare_as_text() {
        let pool = init_memory().unwrap();
        pool.get()
            .unwrap()
            .execute(
                "INSERT INTO bee_words (word, year) VALUES ('fig', 2023)",
                [],
            )
            .unwrap();
        let source = SqliteWordSource::new(pool);

        let filters = Filters::new(Some("2023".to_string()), None, None);
        let words = source.load_words(&filters, WordOrder::Random).unwrap();
        assert_eq!(names(&words), ["fig"]);
        assert_eq!(source.filter_metadata().unwrap().years, ["2023"]);
    }

    #[test]
    fn blank_words_rejected_and_counted() {
        let source = setup();
        assert!(source.insert(&WordEntry::new("  ** ")).is_err());
        assert_eq!(source.count().unwrap(), 5);
    }
}
