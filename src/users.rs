//! UserStore - user records keyed by username.
//!
//! Serves single-record CRUD, verbatim credential checks, and notification
//! append/remove. Every mutating operation persists the entire user
//! collection; there is no write batching.

use std::collections::BTreeMap;
use std::sync::Mutex;

use log::debug;

use crate::error::StorageError;
use crate::storage::Storage;
use crate::user::User;

/// Owns the user collection under one coarse lock.
pub struct UserStore {
    users: Mutex<BTreeMap<String, User>>,
    storage: Box<dyn Storage<User>>,
}

impl UserStore {
    /// Load the user collection from storage.
    pub fn open(storage: impl Storage<User> + 'static) -> Result<Self, StorageError> {
        let mut users = BTreeMap::new();
        for user in storage.load()? {
            users.insert(user.username.clone(), user);
        }
        debug!("user store loaded: {} users", users.len());

        Ok(UserStore {
            users: Mutex::new(users),
            storage: Box::new(storage),
        })
    }

    fn persist(&self, users: &BTreeMap<String, User>) -> Result<(), StorageError> {
        let records: Vec<User> = users.values().cloned().collect();
        self.storage.save(&records)
    }

    /// All users, in username order.
    pub fn list(&self) -> Result<Vec<User>, StorageError> {
        let users = self
            .users
            .lock()
            .map_err(|_| StorageError::LockPoisoned("user list"))?;
        Ok(users.values().cloned().collect())
    }

    pub fn get(&self, username: &str) -> Result<Option<User>, StorageError> {
        let users = self
            .users
            .lock()
            .map_err(|_| StorageError::LockPoisoned("user get"))?;
        Ok(users.get(username).cloned())
    }

    /// Verbatim password comparison. `None` when the username is unknown or
    /// the password does not match; no distinction between the two.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>, StorageError> {
        let users = self
            .users
            .lock()
            .map_err(|_| StorageError::LockPoisoned("user authenticate"))?;
        Ok(users
            .get(username)
            .filter(|user| user.password == password)
            .cloned())
    }

    /// Insert a user keyed by username and persist. Overwrites silently if
    /// the username is already present; duplicate checking is the caller's
    /// responsibility.
    pub fn create(&self, user: User) -> Result<User, StorageError> {
        let mut users = self
            .users
            .lock()
            .map_err(|_| StorageError::LockPoisoned("user create"))?;
        users.insert(user.username.clone(), user.clone());
        self.persist(&users)?;
        Ok(user)
    }

    /// Upsert a full user record and persist. This is the write-back path
    /// the basket engine uses for basket/adopted/notification changes.
    pub fn put(&self, user: User) -> Result<(), StorageError> {
        let mut users = self
            .users
            .lock()
            .map_err(|_| StorageError::LockPoisoned("user put"))?;
        users.insert(user.username.clone(), user);
        self.persist(&users)
    }

    /// The named user's notification log, oldest first. `None` if the
    /// username is unknown.
    pub fn notifications(&self, username: &str) -> Result<Option<Vec<String>>, StorageError> {
        let users = self
            .users
            .lock()
            .map_err(|_| StorageError::LockPoisoned("user notifications"))?;
        Ok(users.get(username).map(|user| user.notifications.clone()))
    }

    /// Append a notification to the named user's log and persist. Works for
    /// the admin user and ordinary users alike. Returns `false` if the
    /// username is unknown.
    pub fn append_notification(
        &self,
        username: &str,
        message: impl Into<String>,
    ) -> Result<bool, StorageError> {
        let mut users = self
            .users
            .lock()
            .map_err(|_| StorageError::LockPoisoned("notification append"))?;
        match users.get_mut(username) {
            Some(user) => {
                user.push_notification(message);
                self.persist(&users)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove the first exact-match occurrence of `message` from the named
    /// user's log and persist. Returns `false` if no match was found.
    pub fn remove_notification(
        &self,
        username: &str,
        message: &str,
    ) -> Result<bool, StorageError> {
        let mut users = self
            .users
            .lock()
            .map_err(|_| StorageError::LockPoisoned("notification remove"))?;
        let removed = match users.get_mut(username) {
            Some(user) => user.remove_notification(message),
            None => false,
        };
        if removed {
            self.persist(&users)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStorage;

    fn store_with(users: Vec<User>) -> UserStore {
        UserStore::open(InMemoryStorage::seeded(users)).unwrap()
    }

    #[test]
    fn create_then_get() {
        let store = store_with(vec![]);
        store.create(User::new("alice", "pw")).unwrap();

        let user = store.get("alice").unwrap().unwrap();
        assert_eq!(user.username, "alice");
        assert!(user.basket_pets.is_empty());
        assert!(store.get("bob").unwrap().is_none());
    }

    #[test]
    fn create_overwrites_existing_username_silently() {
        let store = store_with(vec![User::new("alice", "old")]);
        store.create(User::new("alice", "new")).unwrap();

        assert_eq!(store.get("alice").unwrap().unwrap().password, "new");
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn authenticate_compares_passwords_verbatim() {
        let store = store_with(vec![User::new("alice", "hunter2")]);

        assert!(store.authenticate("alice", "hunter2").unwrap().is_some());
        assert!(store.authenticate("alice", "Hunter2").unwrap().is_none());
        assert!(store.authenticate("nobody", "hunter2").unwrap().is_none());
    }

    #[test]
    fn usernames_are_case_sensitive() {
        let store = store_with(vec![User::new("alice", "pw")]);
        assert!(store.get("Alice").unwrap().is_none());
    }

    #[test]
    fn append_notification_for_any_user() {
        let store = store_with(vec![User::new("admin", "pw"), User::new("alice", "pw")]);

        assert!(store.append_notification("admin", "first").unwrap());
        assert!(store.append_notification("alice", "second").unwrap());
        assert!(!store.append_notification("nobody", "lost").unwrap());

        assert_eq!(
            store.notifications("admin").unwrap().unwrap(),
            vec!["first"]
        );
        assert_eq!(
            store.notifications("alice").unwrap().unwrap(),
            vec!["second"]
        );
        assert!(store.notifications("nobody").unwrap().is_none());
    }

    #[test]
    fn remove_notification_first_match_only() {
        let store = store_with(vec![User::new("alice", "pw")]);
        store.append_notification("alice", "dup").unwrap();
        store.append_notification("alice", "keep").unwrap();
        store.append_notification("alice", "dup").unwrap();

        assert!(store.remove_notification("alice", "dup").unwrap());
        assert_eq!(
            store.notifications("alice").unwrap().unwrap(),
            vec!["keep", "dup"]
        );

        assert!(!store.remove_notification("alice", "missing").unwrap());
        assert!(!store.remove_notification("nobody", "dup").unwrap());
    }

    #[test]
    fn mutations_persist_whole_collection() {
        let storage = InMemoryStorage::new();
        let store = UserStore::open(storage.clone()).unwrap();

        store.create(User::new("alice", "pw")).unwrap();
        store.create(User::new("bob", "pw")).unwrap();
        store.append_notification("alice", "hi").unwrap();

        let persisted = storage.load().unwrap();
        assert_eq!(persisted.len(), 2);
        let alice = persisted.iter().find(|u| u.username == "alice").unwrap();
        assert_eq!(alice.notifications, vec!["hi"]);
    }

    #[test]
    fn persist_failure_propagates() {
        let storage = InMemoryStorage::new();
        let store = UserStore::open(storage.clone()).unwrap();

        storage.fail_next_save();
        let err = store.create(User::new("alice", "pw")).unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
    }
}
