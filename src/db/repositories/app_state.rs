//! Durable key/value slots for the signed-in user.

use std::collections::HashMap;

use anyhow::Result;
use chrono::Utc;
use rusqlite::params;

use crate::db::{
    helpers::{flag_to_str, parse_flag},
    models::StoredSession,
    Database,
};

pub const KEY_AUTHENTICATED: &str = "authenticated";
pub const KEY_USER_EMAIL: &str = "current_user_email";
pub const KEY_USER_NAME: &str = "current_user_name";

const SESSION_KEYS: [&str; 3] = [KEY_AUTHENTICATED, KEY_USER_EMAIL, KEY_USER_NAME];

impl Database {
    pub async fn load_session(&self) -> Result<StoredSession> {
        self.execute(|conn| {
            let mut stmt = conn.prepare("SELECT key, value FROM app_state WHERE key IN (?1, ?2, ?3)")?;
            let mut rows = stmt.query(params![KEY_AUTHENTICATED, KEY_USER_EMAIL, KEY_USER_NAME])?;

            let mut values = HashMap::new();
            while let Some(row) = rows.next()? {
                let key: String = row.get(0)?;
                let value: String = row.get(1)?;
                values.insert(key, value);
            }

            Ok(StoredSession {
                authenticated: parse_flag(values.get(KEY_AUTHENTICATED).map(String::as_str)),
                email: values.remove(KEY_USER_EMAIL),
                display_name: values.remove(KEY_USER_NAME),
            })
        })
        .await
    }

    /// Write all three session keys in one transaction.
    pub async fn save_session(&self, email: &str, display_name: &str) -> Result<()> {
        let email = email.to_string();
        let display_name = display_name.to_string();
        self.execute(move |conn| {
            let now = Utc::now().to_rfc3339();
            let tx = conn.transaction()?;
            for (key, value) in [
                (KEY_AUTHENTICATED, flag_to_str(true)),
                (KEY_USER_EMAIL, email.as_str()),
                (KEY_USER_NAME, display_name.as_str()),
            ] {
                tx.execute(
                    "INSERT INTO app_state (key, value, updated_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                    params![key, value, now],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }

    pub async fn clear_session(&self) -> Result<()> {
        self.execute(|conn| {
            let tx = conn.transaction()?;
            for key in SESSION_KEYS {
                tx.execute("DELETE FROM app_state WHERE key = ?1", params![key])?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }
}
