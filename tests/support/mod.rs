use std::sync::Arc;

use petbasket::{BasketEngine, CatalogStore, InMemoryStorage, User, UserStore};

/// An engine over in-memory storage, with handles kept so tests can inspect
/// persisted state and inject write failures.
pub struct Fixture {
    pub engine: BasketEngine,
    pub user_storage: InMemoryStorage<User>,
}

pub fn engine_with_users(users: Vec<User>) -> Fixture {
    let user_storage = InMemoryStorage::seeded(users);
    let catalog = CatalogStore::open(InMemoryStorage::new(), InMemoryStorage::new())
        .expect("open catalog store");
    let user_store = UserStore::open(user_storage.clone()).expect("open user store");

    Fixture {
        engine: BasketEngine::new(Arc::new(catalog), Arc::new(user_store)),
        user_storage,
    }
}

/// The standard cast: an admin plus two ordinary users.
pub fn standard_users() -> Vec<User> {
    vec![
        User::new("admin", "root"),
        User::new("alice", "pw"),
        User::new("bob", "pw"),
    ]
}
