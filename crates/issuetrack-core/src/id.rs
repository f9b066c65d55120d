//! ID generation for issues
//!
//! IDs are random v4 UUIDs rendered as lowercase hyphenated strings, so
//! they are unique across every project in the store.

use uuid::Uuid;

/// Generate a new issue ID
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
