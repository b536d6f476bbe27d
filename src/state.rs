use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::api::dto::user::UserResponse;
use crate::catalog::Catalog;
use crate::validation::ValidationEngine;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub validation: Arc<ValidationEngine>,
    pub users: Arc<UserDirectory>,
}

impl AppState {
    pub fn new(catalog: Catalog, validation: Arc<ValidationEngine>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            validation,
            users: Arc::new(UserDirectory::default()),
        }
    }
}

/// In-memory user store keyed by email.
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: RwLock<HashMap<String, UserResponse>>,
}

impl UserDirectory {
    /// Inserts a user unless the email is taken. Returns `None` on conflict.
    pub fn insert(&self, name: String, email: String, phone: String) -> Option<UserResponse> {
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);

        if users.contains_key(&email) {
            return None;
        }

        let user = UserResponse {
            id: users.len() as u64 + 1,
            name,
            email: email.clone(),
            phone,
        };
        users.insert(email, user.clone());
        Some(user)
    }

    pub fn len(&self) -> usize {
        self.users.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
