//! Committed orders and the customers who placed them.

use serde::{Deserialize, Serialize};

use crate::error::{EntityKind, Result, StorefrontError};
use crate::types::{Customer, CustomerId, CustomerInfo, Money, Order, OrderId};

/// Append-only record of committed orders plus a customer registry keyed by
/// email (case-insensitive).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLedger {
    orders: Vec<Order>,
    customers: Vec<Customer>,
}

impl OrderLedger {
    /// Creates an empty ledger
    #[must_use]
    pub const fn new() -> Self {
        Self {
            orders: Vec::new(),
            customers: Vec::new(),
        }
    }

    /// Returns the id of the customer with this email, registering a new
    /// customer if none exists. A returning customer keeps their first name
    /// on record.
    pub fn register_customer(&mut self, info: &CustomerInfo) -> CustomerId {
        if let Some(existing) = self
            .customers
            .iter()
            .find(|customer| customer.email.eq_ignore_ascii_case(&info.email))
        {
            return existing.id.clone();
        }

        let customer = Customer {
            id: CustomerId::generate(),
            name: info.name.clone(),
            email: info.email.clone(),
        };
        tracing::info!(customer_id = %customer.id, "Customer registered");
        let id = customer.id.clone();
        self.customers.push(customer);
        id
    }

    /// Appends a committed order.
    pub fn record(&mut self, order: Order) {
        self.orders.push(order);
    }

    /// Orders in commit order
    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Registered customers in registration order
    #[must_use]
    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    /// Looks up an order.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::NotFound`] for an unknown id.
    pub fn order(&self, id: &OrderId) -> Result<&Order> {
        self.orders
            .iter()
            .find(|order| &order.id == id)
            .ok_or_else(|| StorefrontError::not_found(EntityKind::Order, id))
    }

    /// Looks up a customer.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::NotFound`] for an unknown id.
    pub fn customer(&self, id: &CustomerId) -> Result<&Customer> {
        self.customers
            .iter()
            .find(|customer| &customer.id == id)
            .ok_or_else(|| StorefrontError::not_found(EntityKind::Customer, id))
    }

    /// Orders placed by one customer, oldest first
    #[must_use]
    pub fn orders_for(&self, customer_id: &CustomerId) -> Vec<&Order> {
        self.orders
            .iter()
            .filter(|order| &order.customer_id == customer_id)
            .collect()
    }

    /// Sum of every order total (saturating)
    #[must_use]
    pub fn revenue(&self) -> Money {
        let cents = self
            .orders
            .iter()
            .fold(0u64, |sum, order| sum.saturating_add(order.total.cents()));
        Money::from_cents(cents)
    }
}
