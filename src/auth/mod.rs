pub mod password;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::store::{keys, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Admin,
}

/// Stored user record. Hash and salt never leave this module; callers see
/// [`PublicUser`] only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub password_salt: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Derived view of a user, safe to hand to the UI.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        PublicUser {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Singleton session record. `expires_at` is always `login_at + TTL`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub role: Role,
    pub login_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

pub struct AuthService {
    store: Arc<Store>,
    ttl: chrono::Duration,
}

impl AuthService {
    pub fn new(store: Arc<Store>, config: &Config) -> Self {
        Self {
            store,
            ttl: config.session_ttl(),
        }
    }

    fn users(&self) -> Vec<User> {
        self.store.get_or(keys::USERS, Vec::new())
    }

    /// Register a new student account.
    pub fn register(&self, name: &str, email: &str, password: &str) -> Result<PublicUser, AppError> {
        let name = name.trim();
        let email = email.trim().to_lowercase();

        if name.len() < 2 {
            return Err(AppError::Validation("Name must be at least 2 characters.".to_string()));
        }
        if !email.contains('@') {
            return Err(AppError::Validation("Please enter a valid email address.".to_string()));
        }
        if password.len() < 6 {
            return Err(AppError::Validation("Password must be at least 6 characters.".to_string()));
        }

        let mut users = self.users();
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(&email)) {
            return Err(AppError::DuplicateEmail("Email already registered.".to_string()));
        }

        let (password_hash, password_salt) = password::hash_for_storage(password)?;
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email,
            password_hash,
            password_salt,
            role: Role::Student,
            created_at: Utc::now(),
        };

        let public = PublicUser::from(&user);
        users.push(user);
        self.store.set(keys::USERS, &users)?;

        tracing::info!(user_id = %public.id, "registered new student");
        Ok(public)
    }

    /// Authenticate and open a session, overwriting any prior one.
    pub fn login(&self, email: &str, password: &str) -> Result<(PublicUser, Session), AppError> {
        let email = email.trim().to_lowercase();

        let users = self.users();
        let user = users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(&email))
            .ok_or(AppError::InvalidCredentials)?;

        if !password::verify_password(password, &user.password_hash, &user.password_salt)? {
            return Err(AppError::InvalidCredentials);
        }

        let login_at = Utc::now();
        let session = Session {
            user_id: user.id.clone(),
            role: user.role,
            login_at,
            expires_at: login_at + self.ttl,
        };
        self.store.set(keys::SESSION, &session)?;

        tracing::info!(user_id = %user.id, role = ?user.role, "session opened");
        Ok((PublicUser::from(user), session))
    }

    /// Resolve the current session. Expired or dangling sessions are
    /// cleared as a side effect.
    pub fn current_user(&self) -> Option<PublicUser> {
        let session: Session = self.store.get(keys::SESSION)?;

        if Utc::now() > session.expires_at {
            self.clear_session();
            return None;
        }

        let users = self.users();
        match users.iter().find(|u| u.id == session.user_id) {
            Some(user) => Some(PublicUser::from(user)),
            None => {
                self.clear_session();
                None
            }
        }
    }

    /// Delete the session unconditionally.
    pub fn logout(&self) -> Result<(), AppError> {
        self.store.remove(keys::SESSION)
    }

    /// Extend the current session by one TTL. Returns false when there is
    /// no session to refresh.
    pub fn refresh_session(&self) -> bool {
        let Some(mut session) = self.store.get::<Session>(keys::SESSION) else {
            return false;
        };
        session.expires_at = Utc::now() + self.ttl;
        match self.store.set(keys::SESSION, &session) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "failed to refresh session");
                false
            }
        }
    }

    /// Time left before the current session expires, if any.
    pub fn session_remaining(&self) -> Option<chrono::Duration> {
        let session: Session = self.store.get(keys::SESSION)?;
        let remaining = session.expires_at - Utc::now();
        (remaining > chrono::Duration::zero()).then_some(remaining)
    }

    /// Drop the session record if it has expired. Periodic polls reach the
    /// same state as lazy resolution; returns true when a record was
    /// removed.
    pub fn sweep_expired(&self) -> bool {
        let Some(session) = self.store.get::<Session>(keys::SESSION) else {
            return false;
        };
        if Utc::now() > session.expires_at {
            self.clear_session();
            return true;
        }
        false
    }

    /// Seed the admin account once if absent.
    pub fn ensure_admin(&self, config: &Config) -> Result<(), AppError> {
        let mut users = self.users();
        let has_admin = users
            .iter()
            .any(|u| u.role == Role::Admin && u.email.eq_ignore_ascii_case(&config.admin_email));
        if has_admin {
            return Ok(());
        }

        let (password_hash, password_salt) = password::hash_for_storage(&config.admin_password)?;
        users.push(User {
            id: Uuid::new_v4().to_string(),
            name: config.admin_name.clone(),
            email: config.admin_email.to_lowercase(),
            password_hash,
            password_salt,
            role: Role::Admin,
            created_at: Utc::now(),
        });
        self.store.set(keys::USERS, &users)?;

        tracing::info!(email = %config.admin_email, "seeded admin account");
        Ok(())
    }

    fn clear_session(&self) {
        if let Err(e) = self.store.remove(keys::SESSION) {
            tracing::warn!(error = %e, "failed to clear session");
        }
    }
}
