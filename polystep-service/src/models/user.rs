use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A learner account. Usernames are unique and compared case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
}

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
}
