//! Core data models for scrib.
//!
//! These types are shared across all scrib crates and represent the
//! persisted domain entities plus the transient search aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// USER
// =============================================================================

/// A registered account.
///
/// The password hash travels with the row for credential checks but is
/// never serialized into responses.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// NOTE
// =============================================================================

/// A free-form note owned by exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// CARD
// =============================================================================

/// Card status codes stored in the `status` column.
pub mod card_status {
    /// The card is done.
    pub const DONE: i16 = 0;
    /// The card is still pending. New cards default to this.
    pub const PENDING: i16 = 1;
}

/// A task card owned by exactly one user.
///
/// `status` is a small integer code (see [`card_status`]); values outside
/// the known set are stored verbatim, only `PENDING` satisfies the
/// pending-cards filter.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Card {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: i16,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    /// True if the card has not been completed yet.
    pub fn is_pending(&self) -> bool {
        self.status == card_status::PENDING
    }
}

// =============================================================================
// SEARCH
// =============================================================================

/// Combined search results across both record types.
///
/// Built fresh per request and discarded after serialization. The two
/// sequences are ranked independently; there is no cross-type merge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    pub notes: Vec<Note>,
    pub cards: Vec<Card>,
}

impl SearchResults {
    /// True if neither record type matched.
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty() && self.cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_note() -> Note {
        Note {
            id: Uuid::new_v4(),
            title: "Project Plan".to_string(),
            content: "Outline the Q3 roadmap".to_string(),
            user_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_password_hash_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "ada@example.com");
    }

    #[test]
    fn test_note_timestamps_serialize_rfc3339() {
        let note = sample_note();
        let json = serde_json::to_value(&note).unwrap();
        let created = json["created_at"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(created).is_ok());
    }

    #[test]
    fn test_card_status_codes() {
        assert_eq!(card_status::DONE, 0);
        assert_eq!(card_status::PENDING, 1);
    }

    #[test]
    fn test_card_is_pending() {
        let mut card = Card {
            id: Uuid::new_v4(),
            title: "Ship release".to_string(),
            description: "Cut the 0.4 tag".to_string(),
            status: card_status::PENDING,
            user_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(card.is_pending());

        card.status = card_status::DONE;
        assert!(!card.is_pending());
    }

    #[test]
    fn test_card_status_serializes_as_integer() {
        let card = Card {
            id: Uuid::new_v4(),
            title: "t".to_string(),
            description: "d".to_string(),
            status: card_status::PENDING,
            user_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["status"], 1);
    }

    #[test]
    fn test_search_results_default_is_empty() {
        let results = SearchResults::default();
        assert!(results.is_empty());
        assert!(results.notes.is_empty());
        assert!(results.cards.is_empty());
    }

    #[test]
    fn test_search_results_serialize_shape() {
        let results = SearchResults {
            notes: vec![sample_note()],
            cards: Vec::new(),
        };
        let json = serde_json::to_value(&results).unwrap();
        assert!(json["notes"].is_array());
        assert!(json["cards"].is_array());
        assert_eq!(json["notes"].as_array().unwrap().len(), 1);
        assert_eq!(json["cards"].as_array().unwrap().len(), 0);
    }
}
