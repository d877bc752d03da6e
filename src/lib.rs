mod basket;
mod catalog;
mod config;
mod error;
mod events;
mod pet;
mod storage;
mod user;
mod users;

pub use basket::{BasketContext, BasketEngine, ReserveOutcome};
pub use catalog::CatalogStore;
pub use config::EngineConfig;
pub use error::StorageError;
pub use events::{EngineEvents, PetEvent, PET_ADOPTED, PET_RELEASED, PET_RESERVED};
pub use pet::Pet;
pub use storage::{InMemoryStorage, JsonFileStorage, Storage};
pub use user::User;
pub use users::UserStore;
