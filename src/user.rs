//! The active user's display name, injected into every panel.
//!
//! Backed by a `watch` channel: whoever owns the [`UserHandle`] may switch
//! users, and mounted panels notice on their next
//! `refresh_if_user_changed` call.

use tokio::sync::watch;

#[derive(Debug)]
pub struct UserHandle {
    tx: watch::Sender<String>,
}

#[derive(Debug, Clone)]
pub struct UserContext {
    rx: watch::Receiver<String>,
}

impl UserHandle {
    pub fn new(owner: &str) -> Self {
        let (tx, _) = watch::channel(owner.to_string());
        Self { tx }
    }

    pub fn set(&self, owner: &str) {
        self.tx.send_replace(owner.to_string());
    }

    pub fn subscribe(&self) -> UserContext {
        UserContext {
            rx: self.tx.subscribe(),
        }
    }
}

impl UserContext {
    /// Context whose user never changes
    pub fn fixed(owner: &str) -> Self {
        let (_tx, rx) = watch::channel(owner.to_string());
        Self { rx }
    }

    pub fn owner_name(&self) -> String {
        self.rx.borrow().clone()
    }

    /// True once per change of user since the last call
    pub fn take_change(&mut self) -> bool {
        match self.rx.has_changed() {
            Ok(true) => {
                let _ = self.rx.borrow_and_update();
                true
            }
            _ => false,
        }
    }
}
