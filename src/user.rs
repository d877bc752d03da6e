use serde::{Deserialize, Serialize};

/// A user record: credentials plus the basket, adopted set, and
/// notification log the basket engine maintains.
///
/// `basket_pets` and `adopted_pets` are ordered id lists with no duplicates
/// by contract, and are disjoint per user. `notifications` is append-only,
/// insertion order is chronological, and duplicates are allowed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password: String,
    pub basket_pets: Vec<u32>,
    pub adopted_pets: Vec<u32>,
    pub notifications: Vec<String>,
}

impl User {
    /// A fresh user with empty basket, adopted set, and notification log.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        User {
            username: username.into(),
            password: password.into(),
            basket_pets: Vec::new(),
            adopted_pets: Vec::new(),
            notifications: Vec::new(),
        }
    }

    pub fn basket_contains(&self, id: u32) -> bool {
        self.basket_pets.contains(&id)
    }

    /// Removes `id` from the basket; returns whether it was present.
    pub fn remove_from_basket(&mut self, id: u32) -> bool {
        let before = self.basket_pets.len();
        self.basket_pets.retain(|&p| p != id);
        self.basket_pets.len() != before
    }

    pub fn push_notification(&mut self, message: impl Into<String>) {
        self.notifications.push(message.into());
    }

    /// Removes the first exact-match occurrence of `message`; returns
    /// whether a match was found.
    pub fn remove_notification(&mut self, message: &str) -> bool {
        match self.notifications.iter().position(|n| n == message) {
            Some(index) => {
                self.notifications.remove(index);
                true
            }
            None => false,
        }
    }
}
