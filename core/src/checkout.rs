//! Checkout: validates a cart and commits it into an [`Order`].
//!
//! This is the single place that decrements catalog inventory. A commit is
//! all-or-nothing: every precondition is checked before anything changes, so
//! a rejected attempt leaves the cart and the catalog exactly as they were.
//!
//! ```text
//! Idle ─► Validating ─┬─► Committed ─► Idle
//!                     └─► Rejected ──► Idle
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::cart::CartStore;
use crate::catalog::CatalogIndex;
use crate::environment::{Clock, SystemClock};
use crate::error::{Result, StorefrontError};
use crate::ledger::OrderLedger;
use crate::types::{CustomerInfo, Money, Order, OrderId, OrderItem, TicketCategoryId};

/// Per-attempt checkout state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckoutPhase {
    /// No attempt in progress
    #[default]
    Idle,
    /// Preconditions are being checked
    Validating,
    /// The attempt produced an order
    Committed,
    /// The attempt failed; nothing changed
    Rejected,
}

/// Commits carts into orders and keeps the order ledger.
#[derive(Debug)]
pub struct CheckoutCoordinator<C: Clock = SystemClock> {
    clock: C,
    ledger: OrderLedger,
    phase: CheckoutPhase,
    last_outcome: Option<CheckoutPhase>,
}

impl Default for CheckoutCoordinator<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> CheckoutCoordinator<C> {
    /// Creates a coordinator stamping orders with `clock`
    #[must_use]
    pub const fn new(clock: C) -> Self {
        Self {
            clock,
            ledger: OrderLedger::new(),
            phase: CheckoutPhase::Idle,
            last_outcome: None,
        }
    }

    /// Commits `cart` for `customer`.
    ///
    /// On success, inventory of every referenced category is decremented by
    /// the line quantity, the order (with unit prices captured now) is
    /// recorded in the ledger, and the cart is cleared.
    ///
    /// # Errors
    ///
    /// - [`StorefrontError::Validation`] for an empty cart, a blank name, or
    ///   an email without `@`.
    /// - [`StorefrontError::NotFound`] if a line references an unknown
    ///   category.
    /// - [`StorefrontError::InventoryExceeded`] naming the first category
    ///   whose requested units, summed over the cart, exceed its current
    ///   inventory.
    ///
    /// On any error neither `cart` nor `index` is modified.
    pub fn commit(
        &mut self,
        index: &mut CatalogIndex,
        cart: &mut CartStore,
        customer: &CustomerInfo,
    ) -> Result<Order> {
        self.transition(CheckoutPhase::Validating);

        let outcome = Self::validate(index, cart, customer);
        let (customer, items, total) = match outcome {
            Ok(validated) => validated,
            Err(err) => {
                tracing::warn!(error = %err, code = err.code(), "Checkout rejected");
                self.finish(CheckoutPhase::Rejected);
                return Err(err);
            }
        };

        if let Err(err) = index.decrement_inventory(&items) {
            tracing::error!(error = %err, "Inventory changed after validation");
            self.finish(CheckoutPhase::Rejected);
            return Err(err);
        }

        let customer_id = self.ledger.register_customer(&customer);
        let order = Order {
            id: OrderId::generate(),
            customer_id,
            customer,
            created_at: self.clock.now(),
            items,
            total,
        };
        self.ledger.record(order.clone());
        cart.clear();

        tracing::info!(
            order_id = %order.id,
            customer_id = %order.customer_id,
            items = order.items.len(),
            tickets = order.ticket_count(),
            total = %order.total,
            "Order committed"
        );

        self.finish(CheckoutPhase::Committed);
        Ok(order)
    }

    /// Discards the cart without touching the catalog.
    pub fn cancel(&mut self, cart: &mut CartStore) {
        tracing::debug!(lines = cart.len(), "Checkout cancelled");
        cart.clear();
        self.phase = CheckoutPhase::Idle;
    }

    /// Current phase; `Idle` between attempts
    #[must_use]
    pub const fn phase(&self) -> CheckoutPhase {
        self.phase
    }

    /// Outcome of the most recent attempt (`Committed` or `Rejected`)
    #[must_use]
    pub const fn last_outcome(&self) -> Option<CheckoutPhase> {
        self.last_outcome
    }

    /// Orders and customers recorded so far
    #[must_use]
    pub const fn ledger(&self) -> &OrderLedger {
        &self.ledger
    }

    /// Checks every precondition and prices every line, without mutating.
    fn validate(
        index: &CatalogIndex,
        cart: &CartStore,
        customer: &CustomerInfo,
    ) -> Result<(CustomerInfo, Vec<OrderItem>, Money)> {
        if cart.is_empty() {
            return Err(StorefrontError::validation("empty cart"));
        }

        let customer = validate_customer(customer)?;

        let mut requested: HashMap<&TicketCategoryId, u32> = HashMap::with_capacity(cart.len());
        let mut items = Vec::with_capacity(cart.len());
        for line in cart.lines() {
            let category = index.ticket_category(&line.category_id)?;
            let total = requested.entry(&line.category_id).or_default();
            *total = total.saturating_add(line.quantity);
            if *total > category.inventory {
                return Err(StorefrontError::InventoryExceeded {
                    category: line.category_id.clone(),
                    requested: *total,
                    available: category.inventory,
                });
            }
            items.push(OrderItem {
                category_id: line.category_id.clone(),
                quantity: line.quantity,
                unit_price: category.price,
            });
        }

        let total = cart.cart_total(index)?;
        Ok((customer, items, total))
    }

    fn transition(&mut self, next: CheckoutPhase) {
        tracing::debug!(from = ?self.phase, to = ?next, "Checkout phase");
        self.phase = next;
    }

    fn finish(&mut self, outcome: CheckoutPhase) {
        self.transition(outcome);
        self.last_outcome = Some(outcome);
        self.transition(CheckoutPhase::Idle);
    }
}

fn validate_customer(customer: &CustomerInfo) -> Result<CustomerInfo> {
    let name = customer.name.trim();
    let email = customer.email.trim();

    if name.is_empty() {
        return Err(StorefrontError::validation("name is required"));
    }
    if email.is_empty() {
        return Err(StorefrontError::validation("email is required"));
    }
    if !email.contains('@') {
        return Err(StorefrontError::validation(format!("email {email:?} is not valid")));
    }

    Ok(CustomerInfo::new(name, email))
}
