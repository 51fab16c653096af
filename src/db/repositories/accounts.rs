use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Row};
use uuid::Uuid;

use crate::db::{
    helpers::parse_datetime,
    models::{Account, NewAccount},
    Database,
};

fn row_to_account(row: &Row) -> Result<Account> {
    let created_at: String = row.get("created_at")?;

    Ok(Account {
        id: row.get("id")?,
        email: row.get("email")?,
        display_name: row.get("display_name")?,
        password: row.get("password")?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

impl Database {
    /// Insert an account unless the email is already taken.
    /// Returns `None` on a duplicate email.
    pub async fn insert_account(&self, account: NewAccount) -> Result<Option<Account>> {
        self.execute(move |conn| {
            // Check and insert within the same DB task so two registrations
            // cannot both pass the uniqueness check.
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM accounts WHERE email = ?1)",
                params![account.email],
                |row| row.get(0),
            )?;
            if exists {
                return Ok(None);
            }

            let record = Account {
                id: Uuid::new_v4().to_string(),
                email: account.email,
                display_name: account.display_name,
                password: account.password,
                created_at: Utc::now(),
            };

            conn.execute(
                "INSERT INTO accounts (id, email, display_name, password, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.id,
                    record.email,
                    record.display_name,
                    record.password,
                    record.created_at.to_rfc3339(),
                ],
            )?;

            Ok(Some(record))
        })
        .await
    }

    /// All accounts, oldest first.
    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, email, display_name, password, created_at
                 FROM accounts
                 ORDER BY created_at ASC, rowid ASC",
            )?;

            let mut rows = stmt.query([])?;
            let mut accounts = Vec::new();
            while let Some(row) = rows.next()? {
                accounts.push(row_to_account(row)?);
            }

            Ok(accounts)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            email: email.to_string(),
            display_name: "Field Tester".to_string(),
            password: "tilling-season".to_string(),
        }
    }

    #[tokio::test]
    async fn inserted_account_is_listed() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let db = Database::new(dir.path().join("db.sqlite3"))?;

        let inserted = db
            .insert_account(new_account("grower@example.com"))
            .await?
            .expect("first insert succeeds");

        assert_eq!(db.list_accounts().await?, vec![inserted]);
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_email_is_not_inserted() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let db = Database::new(dir.path().join("db.sqlite3"))?;

        assert!(db.insert_account(new_account("a@example.com")).await?.is_some());
        assert!(db.insert_account(new_account("a@example.com")).await?.is_none());
        assert_eq!(db.list_accounts().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn list_keeps_insertion_order() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let db = Database::new(dir.path().join("db.sqlite3"))?;

        for email in ["one@example.com", "two@example.com", "three@example.com"] {
            db.insert_account(new_account(email)).await?;
        }

        let emails: Vec<String> = db
            .list_accounts()
            .await?
            .into_iter()
            .map(|account| account.email)
            .collect();
        assert_eq!(emails, ["one@example.com", "two@example.com", "three@example.com"]);
        Ok(())
    }
}
