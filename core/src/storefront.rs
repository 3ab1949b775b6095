//! Shared host for concurrent shopping sessions.
//!
//! One [`Storefront`] owns the catalog and the checkout coordinator behind
//! locks; each [`Session`] owns its cart. Cart mutations hold the catalog
//! read lock for their whole duration, and a commit holds the catalog write
//! lock across validation and inventory decrement, so no cart operation or
//! other commit can interleave with it.

use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::cart::{CartCommand, CartStore};
use crate::catalog::{CatalogData, CatalogIndex};
use crate::checkout::CheckoutCoordinator;
use crate::environment::{Clock, SystemClock};
use crate::error::Result;
use crate::filter::{FilterEngine, FilterQuery};
use crate::ledger::OrderLedger;
use crate::types::{Concert, CustomerInfo, Money, Order, TicketCategoryId};

/// Catalog and checkout shared by every session.
pub struct Storefront<C: Clock = SystemClock> {
    catalog: Arc<RwLock<CatalogIndex>>,
    checkout: Arc<Mutex<CheckoutCoordinator<C>>>,
}

impl<C: Clock> Clone for Storefront<C> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            checkout: Arc::clone(&self.checkout),
        }
    }
}

impl Storefront<SystemClock> {
    /// Builds the catalog from `data` and stamps orders with the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StorefrontError::Config`] if the data fails
    /// referential integrity checks.
    pub fn open(data: CatalogData) -> Result<Self> {
        Self::with_clock(data, SystemClock)
    }
}

impl<C: Clock> Storefront<C> {
    /// Builds the catalog from `data` with an injected clock.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StorefrontError::Config`] if the data fails
    /// referential integrity checks.
    pub fn with_clock(data: CatalogData, clock: C) -> Result<Self> {
        Ok(Self::from_index(CatalogIndex::build(data)?, clock))
    }

    /// Hosts an already-built index.
    #[must_use]
    pub fn from_index(index: CatalogIndex, clock: C) -> Self {
        Self {
            catalog: Arc::new(RwLock::new(index)),
            checkout: Arc::new(Mutex::new(CheckoutCoordinator::new(clock))),
        }
    }

    /// Starts a session with an empty cart.
    #[must_use]
    pub fn session(&self) -> Session<C> {
        Session {
            storefront: self.clone(),
            cart: CartStore::new(),
        }
    }

    /// Runs `f` with shared access to the catalog.
    pub fn read_catalog<R>(&self, f: impl FnOnce(&CatalogIndex) -> R) -> R {
        f(&self.catalog_read())
    }

    /// Runs `f` with exclusive access to the catalog (administrative edits).
    pub fn write_catalog<R>(&self, f: impl FnOnce(&mut CatalogIndex) -> R) -> R {
        f(&mut self.catalog_write())
    }

    /// Filters the catalog's concerts, returning owned copies.
    #[must_use]
    pub fn browse(&self, query: &FilterQuery) -> Vec<Concert> {
        self.read_catalog(|index| {
            FilterEngine::evaluate_all(index, query)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    /// Snapshot of the order ledger.
    #[must_use]
    pub fn ledger(&self) -> OrderLedger {
        self.checkout
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .ledger()
            .clone()
    }

    fn catalog_read(&self) -> RwLockReadGuard<'_, CatalogIndex> {
        self.catalog.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn catalog_write(&self) -> RwLockWriteGuard<'_, CatalogIndex> {
        self.catalog.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One shopper's cart against a shared [`Storefront`].
pub struct Session<C: Clock = SystemClock> {
    storefront: Storefront<C>,
    cart: CartStore,
}

impl<C: Clock> Session<C> {
    /// See [`CartStore::add_line`].
    ///
    /// # Errors
    ///
    /// Propagates [`CartStore::add_line`] errors.
    pub fn add_line(&mut self, category_id: &TicketCategoryId, delta: i64) -> Result<u32> {
        let index = self.storefront.catalog_read();
        self.cart.add_line(&index, category_id, delta)
    }

    /// See [`CartStore::set_quantity`].
    ///
    /// # Errors
    ///
    /// Propagates [`CartStore::set_quantity`] errors.
    pub fn set_quantity(&mut self, category_id: &TicketCategoryId, quantity: i64) -> Result<u32> {
        let index = self.storefront.catalog_read();
        self.cart.set_quantity(&index, category_id, quantity)
    }

    /// See [`CartStore::remove_line`].
    pub fn remove_line(&mut self, category_id: &TicketCategoryId) -> bool {
        let _index = self.storefront.catalog_read();
        self.cart.remove_line(category_id)
    }

    /// See [`CartStore::apply`].
    ///
    /// # Errors
    ///
    /// Propagates [`CartStore::apply`] errors.
    pub fn apply(&mut self, command: CartCommand) -> Result<()> {
        let index = self.storefront.catalog_read();
        self.cart.apply(command, &index)
    }

    /// See [`CartStore::reclamp`].
    pub fn reclamp(&mut self) -> Vec<TicketCategoryId> {
        let index = self.storefront.catalog_read();
        self.cart.reclamp(&index)
    }

    /// Live total of one line.
    ///
    /// # Errors
    ///
    /// Propagates [`CartStore::line_total`] errors.
    pub fn line_total(&self, category_id: &TicketCategoryId) -> Result<Money> {
        let index = self.storefront.catalog_read();
        self.cart.line_total(&index, category_id)
    }

    /// Live total of the cart.
    ///
    /// # Errors
    ///
    /// Propagates [`CartStore::cart_total`] errors.
    pub fn cart_total(&self) -> Result<Money> {
        let index = self.storefront.catalog_read();
        self.cart.cart_total(&index)
    }

    /// Commits the cart atomically with respect to every other session.
    ///
    /// # Errors
    ///
    /// Propagates [`CheckoutCoordinator::commit`] errors; nothing changes on
    /// failure.
    pub fn checkout(&mut self, customer: &CustomerInfo) -> Result<Order> {
        let mut checkout = self
            .storefront
            .checkout
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut index = self.storefront.catalog_write();
        checkout.commit(&mut index, &mut self.cart, customer)
    }

    /// Discards the cart without touching the catalog.
    pub fn cancel(&mut self) {
        self.storefront
            .checkout
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel(&mut self.cart);
    }

    /// Read access to the cart
    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }
}
