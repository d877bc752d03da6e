//! BasketEngine - the reserve/release/adopt transaction protocol.
//!
//! For one selected user the engine keeps a reconciled working view of the
//! pets that user holds reserved and has adopted, and writes transitions
//! through [`CatalogStore`](crate::CatalogStore) and
//! [`UserStore`](crate::UserStore) with notification side effects.
//!
//! There is no shared "current user" field: `select_user` hands back an
//! owned [`BasketContext`] and every operation takes it explicitly, so
//! notifying the admin during `adopt` never swaps anyone's context.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{info, warn};

use crate::catalog::CatalogStore;
use crate::error::StorageError;
use crate::events::{EngineEvents, PetEvent, PET_ADOPTED, PET_RELEASED, PET_RESERVED};
use crate::pet::Pet;
use crate::user::User;
use crate::users::UserStore;

/// Result of a reservation attempt. Conflict is an ordinary outcome, not an
/// error: the external layer maps it to its own conflict status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReserveOutcome {
    Reserved(Pet),
    /// The pet id was already in this user's basket; nothing was mutated.
    AlreadyReserved,
}

/// The working context for one selected user: the loaded user record plus
/// caches of the reserved and adopted pets, reconciled against the catalog.
///
/// Rebuilt from scratch by [`BasketEngine::select_user`]; re-selecting a
/// user discards the previous context.
pub struct BasketContext {
    user: User,
    basket: BTreeMap<u32, Pet>,
    adopted: BTreeMap<u32, Pet>,
}

impl BasketContext {
    pub fn username(&self) -> &str {
        &self.user.username
    }

    /// The user record as this context last wrote it.
    pub fn user(&self) -> &User {
        &self.user
    }
}

/// Coordinates the catalog and user stores for basket operations.
///
/// The stores and event emitter hold non-`Debug` internals (trait objects,
/// listener callbacks), so `Debug` is implemented manually and elides them.
pub struct BasketEngine {
    catalog: Arc<CatalogStore>,
    users: Arc<UserStore>,
    admin: String,
    events: EngineEvents,
}

impl std::fmt::Debug for BasketEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasketEngine")
            .field("admin", &self.admin)
            .finish_non_exhaustive()
    }
}

impl BasketEngine {
    /// Admin notifications go to the `"admin"` user unless overridden with
    /// [`with_admin`](Self::with_admin).
    pub fn new(catalog: Arc<CatalogStore>, users: Arc<UserStore>) -> Self {
        BasketEngine {
            catalog,
            users,
            admin: "admin".to_string(),
            events: EngineEvents::new(),
        }
    }

    pub fn with_admin(mut self, username: impl Into<String>) -> Self {
        self.admin = username.into();
        self
    }

    pub fn catalog(&self) -> &Arc<CatalogStore> {
        &self.catalog
    }

    pub fn users(&self) -> &Arc<UserStore> {
        &self.users
    }

    /// In-process observers of `pet.*` transition events.
    pub fn events(&self) -> &EngineEvents {
        &self.events
    }

    /// Load a user's record and reconcile it against the catalog.
    ///
    /// Basket ids that no longer resolve in `available` were adopted by
    /// another party first: they are dropped from the persisted basket and
    /// one `"<pet name> has been adopted"` notification is appended to the
    /// user's own log. Adopted ids resolve their display attributes from
    /// `master`, so adopted pets keep their name even after the catalog
    /// entry is deleted. Returns `None` for an unknown username.
    pub fn select_user(&self, username: &str) -> Result<Option<BasketContext>, StorageError> {
        let Some(mut user) = self.users.get(username)? else {
            return Ok(None);
        };

        let mut basket = BTreeMap::new();
        let mut dropped = Vec::new();
        for id in user.basket_pets.clone() {
            match self.catalog.get(id)? {
                Some(pet) => {
                    basket.insert(id, pet);
                }
                None => dropped.push(id),
            }
        }

        if !dropped.is_empty() {
            for id in &dropped {
                user.remove_from_basket(*id);
                let name = match self.catalog.get_any_known(*id)? {
                    Some(pet) => pet.name,
                    None => format!("pet {}", id),
                };
                user.push_notification(format!("{} has been adopted", name));
                info!(
                    "reconciled basket of {}: pet {} ({}) no longer available",
                    user.username, id, name
                );
            }
            self.users.put(user.clone())?;
        }

        let mut adopted = BTreeMap::new();
        for id in &user.adopted_pets {
            if let Some(pet) = self.catalog.get_any_known(*id)? {
                adopted.insert(*id, pet);
            }
        }

        Ok(Some(BasketContext {
            user,
            basket,
            adopted,
        }))
    }

    /// Reserve a pet into the user's basket.
    ///
    /// A duplicate id is rejected without mutating anything. Availability is
    /// not checked here: baskets are independent wishlists, and exclusivity
    /// is enforced by adoption plus reconciliation on the next
    /// `select_user`.
    pub fn reserve(
        &self,
        ctx: &mut BasketContext,
        pet: &Pet,
    ) -> Result<ReserveOutcome, StorageError> {
        if ctx.basket.contains_key(&pet.id) {
            return Ok(ReserveOutcome::AlreadyReserved);
        }

        ctx.user.basket_pets.push(pet.id);
        ctx.basket.insert(pet.id, pet.clone());
        self.users.put(ctx.user.clone())?;

        self.events.emit(PET_RESERVED, &self.payload(ctx, pet));
        Ok(ReserveOutcome::Reserved(pet.clone()))
    }

    /// Release a reserved pet back out of the basket. Returns `false`
    /// without persisting if the id is not in the working basket.
    pub fn release(&self, ctx: &mut BasketContext, id: u32) -> Result<bool, StorageError> {
        let Some(pet) = ctx.basket.remove(&id) else {
            return Ok(false);
        };

        ctx.user.remove_from_basket(id);
        self.users.put(ctx.user.clone())?;

        self.events.emit(PET_RELEASED, &self.payload(ctx, &pet));
        Ok(true)
    }

    /// Adopt a reserved pet: move its id from the basket field to the
    /// adopted field, persist the user, then notify the admin user.
    ///
    /// The two writes are independent; there is no cross-store transaction.
    /// If the admin write fails after the user write succeeded, the adoption
    /// stands and the admin notification is lost with the error — a
    /// recoverable inconsistency, not invisible corruption. Adoption does
    /// not remove the pet from the catalog's `available` collection.
    pub fn adopt(&self, ctx: &mut BasketContext, id: u32) -> Result<bool, StorageError> {
        let Some(pet) = ctx.basket.remove(&id) else {
            return Ok(false);
        };

        ctx.user.remove_from_basket(id);
        ctx.user.adopted_pets.push(id);
        ctx.adopted.insert(id, pet.clone());
        self.users.put(ctx.user.clone())?;

        info!("{} adopted pet {} ({})", ctx.user.username, id, pet.name);

        let message = format!("{} has adopted {}", ctx.user.username, pet.name);
        match self.users.append_notification(&self.admin, message) {
            Ok(true) => {}
            Ok(false) => warn!(
                "admin user {} not found; adoption of pet {} went unannounced",
                self.admin, id
            ),
            Err(err) => {
                warn!(
                    "adoption of pet {} by {} persisted, but the admin notification did not: {}",
                    id, ctx.user.username, err
                );
                return Err(err);
            }
        }

        self.events.emit(PET_ADOPTED, &self.payload(ctx, &pet));
        Ok(true)
    }

    /// The working basket, in id order.
    pub fn basket(&self, ctx: &BasketContext) -> Vec<Pet> {
        ctx.basket.values().cloned().collect()
    }

    /// The working adopted set, in id order.
    pub fn adopted(&self, ctx: &BasketContext) -> Vec<Pet> {
        ctx.adopted.values().cloned().collect()
    }

    /// Resolve an id against the working basket only.
    pub fn get(&self, ctx: &BasketContext, id: u32) -> Option<Pet> {
        ctx.basket.get(&id).cloned()
    }

    fn payload(&self, ctx: &BasketContext, pet: &Pet) -> PetEvent {
        PetEvent {
            username: ctx.user.username.clone(),
            pet_id: pet.id,
            pet_name: pet.name.clone(),
        }
    }
}
