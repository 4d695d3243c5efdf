//! Full-text search implementation.
//!
//! Wraps PostgreSQL `tsvector`/`tsquery` matching with `ts_rank` ordering.
//! The raw user query is rewritten into a conjunctive, prefix-matching
//! tsquery expression (`term:* & term2:*`) before being handed to
//! `to_tsquery('english', $1)`. That expression syntax is the wire format
//! the GIN indexes in the schema are built for; changing one side means
//! changing both.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use tracing::{debug, instrument};
use uuid::Uuid;

use scrib_core::{Card, Error, Note, Result, SearchResults, SearchRepository};

/// Rewrite a raw search string into a sanitized tsquery expression.
///
/// Each whitespace-separated term has embedded single quotes doubled
/// (neutralizing string-literal injection through the expression) and a
/// `:*` prefix-match marker appended, so partially typed words still hit
/// indexed tokens. Terms are joined with `&`: every term must match.
///
/// Whitespace-only input produces an empty string; callers short-circuit
/// on that rather than sending an empty pattern to the database.
pub fn format_tsquery(raw: &str) -> String {
    raw.split_whitespace()
        .map(|term| format!("{}:*", term.replace('\'', "''")))
        .collect::<Vec<_>>()
        .join(" & ")
}

/// Full-text search over notes and cards using PostgreSQL tsvector.
pub struct PgSearchRepository {
    pool: Pool<Postgres>,
}

impl PgSearchRepository {
    /// Create a new PgSearchRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Ranked note matches for an already-formatted tsquery expression.
    async fn search_notes(&self, expression: &str, user_id: Uuid) -> Result<Vec<Note>> {
        sqlx::query_as::<_, Note>(
            r#"
            SELECT id, title, content, user_id, created_at, updated_at
            FROM notes
            WHERE user_id = $2
              AND (to_tsvector('english', title) @@ to_tsquery('english', $1)
                   OR to_tsvector('english', content) @@ to_tsquery('english', $1))
            ORDER BY ts_rank(
                to_tsvector('english', title || ' ' || content),
                to_tsquery('english', $1)
            ) DESC
            "#,
        )
        .bind(expression)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)
    }

    /// Ranked card matches for an already-formatted tsquery expression.
    async fn search_cards(&self, expression: &str, user_id: Uuid) -> Result<Vec<Card>> {
        sqlx::query_as::<_, Card>(
            r#"
            SELECT id, title, description, status, user_id, created_at, updated_at
            FROM cards
            WHERE user_id = $2
              AND (to_tsvector('english', title) @@ to_tsquery('english', $1)
                   OR to_tsvector('english', description) @@ to_tsquery('english', $1))
            ORDER BY ts_rank(
                to_tsvector('english', title || ' ' || description),
                to_tsquery('english', $1)
            ) DESC
            "#,
        )
        .bind(expression)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)
    }
}

#[async_trait]
impl SearchRepository for PgSearchRepository {
    /// Run both ranked queries, notes first, scoped to the owner.
    ///
    /// The two result lists are ranked independently; there is no
    /// cross-type merge. A store failure in the notes query surfaces
    /// before the cards query is attempted, so the caller never sees
    /// partial results.
    #[instrument(skip(self), fields(subsystem = "database", component = "search", op = "search"))]
    async fn search(&self, query: &str, user_id: Uuid) -> Result<SearchResults> {
        let expression = format_tsquery(query);

        // A zero-term expression matches nothing; skip the round trips.
        if expression.is_empty() {
            debug!("Empty search expression, short-circuiting to empty results");
            return Ok(SearchResults::default());
        }

        let notes = self.search_notes(&expression, user_id).await?;
        let cards = self.search_cards(&expression, user_id).await?;

        debug!(
            note_hits = notes.len(),
            card_hits = cards.len(),
            "Search complete"
        );

        Ok(SearchResults { notes, cards })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_term_gets_prefix_marker() {
        assert_eq!(format_tsquery("proj"), "proj:*");
    }

    #[test]
    fn test_terms_joined_with_and() {
        assert_eq!(format_tsquery("project plan"), "project:* & plan:*");
    }

    #[test]
    fn test_term_count_matches_input() {
        let formatted = format_tsquery("alpha beta gamma delta");
        assert_eq!(formatted.matches(":*").count(), 4);
        assert_eq!(formatted.matches(" & ").count(), 3);
    }

    #[test]
    fn test_empty_input_yields_empty_expression() {
        assert_eq!(format_tsquery(""), "");
    }

    #[test]
    fn test_whitespace_only_yields_empty_expression() {
        assert_eq!(format_tsquery("   \t  \n "), "");
    }

    #[test]
    fn test_excess_whitespace_collapses() {
        assert_eq!(format_tsquery("  foo   bar  "), "foo:* & bar:*");
    }

    #[test]
    fn test_single_quotes_are_doubled() {
        assert_eq!(format_tsquery("O'Brien"), "O''Brien:*");
    }

    #[test]
    fn test_quote_escaping_preserves_structure() {
        // An embedded quote must not add or remove terms.
        let formatted = format_tsquery("O'Brien meeting");
        assert_eq!(formatted, "O''Brien:* & meeting:*");
        assert_eq!(formatted.matches(" & ").count(), 1);
    }

    #[test]
    fn test_multiple_quotes_in_one_term() {
        assert_eq!(format_tsquery("it's'"), "it''s'':*");
    }

    #[test]
    fn test_queries_are_owner_scoped() {
        // Both SQL statements must bind the owner; a search is never
        // allowed to cross user boundaries.
        let source = include_str!("search.rs");
        let owner_clause = format!("WHERE user_id = ${}", 2);
        assert_eq!(source.matches(&owner_clause).count(), 2);
    }
}
