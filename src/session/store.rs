use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    analysis::AnalysisResult,
    db::{Account, Database, NewAccount},
};

use super::{
    errors::{AccountError, Field, FieldError},
    handoff::ResultSlot,
    validation::{normalize_email, validate_registration, Registration},
};

pub const DEMO_EMAIL: &str = "demo@agriscan.app";
pub const DEMO_PASSWORD: &str = "agriscan123";
pub const DEMO_DISPLAY_NAME: &str = "Demo Farmer";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub authenticated: bool,
    pub email: String,
    pub display_name: String,
}

impl Session {
    fn signed_in(email: &str, display_name: &str) -> Self {
        Self {
            authenticated: true,
            email: email.to_string(),
            display_name: display_name.to_string(),
        }
    }
}

/// Durable sign-in state plus the in-memory result handoff slot.
///
/// Clones share the same database handle and the same slot.
#[derive(Clone)]
pub struct SessionStore {
    db: Database,
    pending: ResultSlot,
}

impl SessionStore {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            pending: ResultSlot::new(),
        }
    }

    /// The slot the scan controller deposits finished results into.
    pub fn result_slot(&self) -> ResultSlot {
        self.pending.clone()
    }

    pub async fn register(&self, form: Registration) -> Result<Account, AccountError> {
        let mut errors = validate_registration(&form);
        if !errors.is_empty() {
            return Err(AccountError::Validation(errors));
        }

        let inserted = self
            .db
            .insert_account(NewAccount {
                email: normalize_email(&form.email),
                display_name: form.display_name.trim().to_string(),
                password: form.password,
            })
            .await?;

        let Some(account) = inserted else {
            errors.push(FieldError::new(
                Field::Email,
                "An account with this email already exists",
            ));
            return Err(AccountError::Validation(errors));
        };

        self.db.save_session(&account.email, &account.display_name).await?;
        info!("Registered account {} and signed it in", account.email);

        Ok(account)
    }

    /// Only the built-in demo credentials are accepted. Registered accounts are
    /// not consulted here.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AccountError> {
        if normalize_email(email) != DEMO_EMAIL || password != DEMO_PASSWORD {
            warn!("Rejected login attempt");
            return Err(AccountError::Authentication);
        }

        self.db.save_session(DEMO_EMAIL, DEMO_DISPLAY_NAME).await?;
        info!("Demo user signed in");

        Ok(Session::signed_in(DEMO_EMAIL, DEMO_DISPLAY_NAME))
    }

    pub async fn current_session(&self) -> Result<Option<Session>, AccountError> {
        let stored = self.db.load_session().await?;
        if !stored.authenticated {
            return Ok(None);
        }

        match stored.email.filter(|email| !email.is_empty()) {
            Some(email) => {
                let display_name = stored.display_name.unwrap_or_default();
                Ok(Some(Session::signed_in(&email, &display_name)))
            }
            None => {
                warn!("Stored session is flagged authenticated but has no email; ignoring it");
                Ok(None)
            }
        }
    }

    pub async fn require_session(&self) -> Result<Session, AccountError> {
        self.current_session()
            .await?
            .ok_or(AccountError::NotAuthenticated)
    }

    /// Clears the session and any result still waiting in the handoff slot.
    pub async fn logout(&self) -> Result<(), AccountError> {
        self.pending.clear();
        self.db.clear_session().await?;
        info!("Signed out");
        Ok(())
    }

    pub async fn accounts(&self) -> Result<Vec<Account>, AccountError> {
        Ok(self.db.list_accounts().await?)
    }

    pub fn put_pending_result(&self, result: AnalysisResult) {
        self.pending.put(result);
    }

    pub fn take_pending_result(&self) -> Option<AnalysisResult> {
        self.pending.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{generate, AnalysisInput, Category};
    use tempfile::TempDir;

    fn store() -> (TempDir, SessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("agriscan.sqlite3")).unwrap();
        (dir, SessionStore::new(db))
    }

    fn registration(email: &str) -> Registration {
        Registration::new("Grace", email, "harvest-moon", "harvest-moon")
    }

    fn sample_result() -> AnalysisResult {
        generate(
            &AnalysisInput {
                seed: 10,
                category: Category::Soil,
                crop_kind: None,
            },
            None,
        )
    }

    #[tokio::test]
    async fn demo_login_creates_session() {
        let (_dir, store) = store();

        let session = store.login(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();
        assert_eq!(session.display_name, DEMO_DISPLAY_NAME);
        assert_eq!(store.current_session().await.unwrap(), Some(session));
    }

    #[tokio::test]
    async fn other_credentials_are_rejected() {
        let (_dir, store) = store();

        for (email, password) in [
            (DEMO_EMAIL, "wrong-password"),
            ("someone@example.com", DEMO_PASSWORD),
            ("", ""),
        ] {
            let err = store.login(email, password).await.unwrap_err();
            assert!(matches!(err, AccountError::Authentication));
            assert_eq!(err.to_string(), "Invalid email or password");
        }
        assert_eq!(store.current_session().await.unwrap(), None);
    }

    #[tokio::test]
    async fn registered_accounts_cannot_log_in() {
        let (_dir, store) = store();
        store.register(registration("grace@example.com")).await.unwrap();
        store.logout().await.unwrap();

        let err = store
            .login("grace@example.com", "harvest-moon")
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::Authentication));
    }

    #[tokio::test]
    async fn register_signs_the_new_account_in() {
        let (_dir, store) = store();

        let account = store.register(registration(" Grace@Example.com ")).await.unwrap();
        assert_eq!(account.email, "grace@example.com");

        let session = store.require_session().await.unwrap();
        assert_eq!(session.email, "grace@example.com");
        assert_eq!(session.display_name, "Grace");
    }

    #[tokio::test]
    async fn duplicate_email_fails_on_email_field() {
        let (_dir, store) = store();
        store.register(registration("grace@example.com")).await.unwrap();

        let err = store
            .register(registration("GRACE@example.com"))
            .await
            .unwrap_err();
        assert!(err.has_field_error(Field::Email));
        assert_eq!(store.accounts().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_form_is_not_stored() {
        let (_dir, store) = store();

        let err = store
            .register(Registration::new("G", "grace@example.com", "harvest-moon", "harvest-moon"))
            .await
            .unwrap_err();
        assert!(err.has_field_error(Field::DisplayName));
        assert!(store.accounts().await.unwrap().is_empty());
        assert!(store.current_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn logout_clears_session_and_pending_result() {
        let (_dir, store) = store();
        store.login(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();
        store.put_pending_result(sample_result());

        store.logout().await.unwrap();
        store.logout().await.unwrap();

        assert!(store.current_session().await.unwrap().is_none());
        assert!(store.take_pending_result().is_none());
        assert!(matches!(
            store.require_session().await.unwrap_err(),
            AccountError::NotAuthenticated
        ));
    }

    #[tokio::test]
    async fn pending_result_is_read_once() {
        let (_dir, store) = store();
        store.put_pending_result(sample_result());

        assert!(store.take_pending_result().is_some());
        assert!(store.take_pending_result().is_none());
    }

    #[tokio::test]
    async fn session_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agriscan.sqlite3");
        {
            let store = SessionStore::new(Database::new(path.clone()).unwrap());
            store.login(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();
        }

        let reopened = SessionStore::new(Database::new(path).unwrap());
        let session = reopened.current_session().await.unwrap().unwrap();
        assert_eq!(session.email, DEMO_EMAIL);
    }
}
