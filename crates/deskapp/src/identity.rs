//! # Identity
//!
//! Who is acting. Desk does not authenticate anyone: an [`IdentityProvider`] says
//! who is signed in, and that name is what the activity log records. Nobody signed
//! in means [`ANONYMOUS`].
//!
//! [`LocalIdentity`] keeps the session in memory. Clients that outlive one
//! process persist the [`User`] themselves and hand it back on startup.

use crate::error::{DeskError, Result};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};

/// Attribution used when nobody is signed in.
pub const ANONYMOUS: &str = "Anonymous";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub uid: String,
}

pub type AuthCallback = Box<dyn FnMut(Option<&User>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuthListener(u64);

pub trait IdentityProvider {
    fn current_user(&self) -> Option<User>;

    /// Registers `callback`. It fires once right away and after each sign in or out.
    fn on_auth_change(&self, callback: AuthCallback) -> AuthListener;

    fn remove_listener(&self, listener: AuthListener);

    fn sign_in(&self, display_name: &str, email: Option<&str>) -> Result<User>;

    /// Signs out, returning who was signed in.
    fn sign_out(&self) -> Result<Option<User>>;
}

/// Name recorded for actions by `user`.
pub fn attribution(user: Option<&User>) -> String {
    user.map(|u| u.display_name.clone())
        .unwrap_or_else(|| ANONYMOUS.to_string())
}

#[derive(Default)]
pub struct LocalIdentity {
    user: RefCell<Option<User>>,
    listeners: RefCell<Vec<(AuthListener, AuthCallback)>>,
    next_listener: Cell<u64>,
    /// Nesting depth of `notify`, and listeners removed while it runs.
    notifying: Cell<u32>,
    removed: RefCell<Vec<AuthListener>>,
}

impl LocalIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with a restored session.
    pub fn with_user(user: Option<User>) -> Self {
        Self {
            user: RefCell::new(user),
            ..Self::default()
        }
    }

    fn notify(&self) {
        let user = self.user.borrow().clone();
        // Callbacks run with the registry released so they may register more.
        let mut running = std::mem::take(&mut *self.listeners.borrow_mut());
        self.notifying.set(self.notifying.get() + 1);
        for (id, callback) in running.iter_mut() {
            if !self.removed.borrow().contains(id) {
                callback(user.as_ref());
            }
        }
        self.notifying.set(self.notifying.get() - 1);

        {
            let removed = self.removed.borrow();
            running.retain(|(id, _)| !removed.contains(id));
        }
        if self.notifying.get() == 0 {
            self.removed.borrow_mut().clear();
        }
        let mut listeners = self.listeners.borrow_mut();
        running.append(&mut listeners);
        *listeners = running;
    }
}

impl IdentityProvider for LocalIdentity {
    fn current_user(&self) -> Option<User> {
        self.user.borrow().clone()
    }

    fn on_auth_change(&self, mut callback: AuthCallback) -> AuthListener {
        let id = AuthListener(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        let user = self.user.borrow().clone();
        callback(user.as_ref());
        self.listeners.borrow_mut().push((id, callback));
        id
    }

    fn remove_listener(&self, listener: AuthListener) {
        self.listeners.borrow_mut().retain(|(id, _)| *id != listener);
        if self.notifying.get() > 0 {
            self.removed.borrow_mut().push(listener);
        }
    }

    fn sign_in(&self, display_name: &str, email: Option<&str>) -> Result<User> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(DeskError::Validation(
                "Display name cannot be empty".to_string(),
            ));
        }
        let user = User {
            display_name: display_name.to_string(),
            email: email.map(str::trim).filter(|e| !e.is_empty()).map(str::to_string),
            uid: uuid::Uuid::new_v4().simple().to_string(),
        };
        *self.user.borrow_mut() = Some(user.clone());
        tracing::info!(user = %user.display_name, "signed in");
        self.notify();
        Ok(user)
    }

    fn sign_out(&self) -> Result<Option<User>> {
        let previous = self.user.borrow_mut().take();
        if previous.is_some() {
            tracing::info!("signed out");
            self.notify();
        }
        Ok(previous)
    }
}
