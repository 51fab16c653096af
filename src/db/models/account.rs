//! Account and persisted-session records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account. The password is kept as entered; this is a demo store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub email: String,
    pub display_name: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub created_at: DateTime<Utc>,
}

/// Input for inserting an account; id and timestamp are assigned on insert.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub display_name: String,
    pub password: String,
}

/// Raw session keys as they sit in `app_state`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredSession {
    pub authenticated: bool,
    pub email: Option<String>,
    pub display_name: Option<String>,
}
