//! Cart reservation store.
//!
//! Holds at most one line per ticket category, in insertion order. Every
//! line's quantity stays within `1..=inventory` of its category:
//!
//! - [`CartStore::add_line`] clamps silently to the inventory ceiling.
//! - [`CartStore::set_quantity`] clamps to the ceiling but rejects a
//!   quantity below 1 instead of treating it as removal.
//!
//! Prices are never cached; totals read the catalog at call time.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::catalog::CatalogIndex;
use crate::error::{EntityKind, Result, StorefrontError};
use crate::types::{Money, TicketCategoryId};

/// A pending reservation of `quantity` units of one ticket category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Reserved category
    pub category_id: TicketCategoryId,
    /// Units reserved
    pub quantity: u32,
}

/// User actions on a cart, dispatched through [`CartStore::apply`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartCommand {
    /// Add `delta` units, clamping to inventory
    AddLine {
        /// Category to add
        category_id: TicketCategoryId,
        /// Units to add (may be negative for an existing line)
        delta: i64,
    },
    /// Set an existing line's quantity
    SetQuantity {
        /// Category to update
        category_id: TicketCategoryId,
        /// Requested quantity
        quantity: i64,
    },
    /// Drop a line (no-op if absent)
    RemoveLine {
        /// Category to remove
        category_id: TicketCategoryId,
    },
    /// Drop every line
    Clear,
}

/// Mutable reservation state for one session.
///
/// Deserializing rejects a cart with two lines for one category or a line
/// of zero units.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CartLines")]
pub struct CartStore {
    lines: Vec<CartLine>,
}

#[derive(Deserialize)]
struct CartLines {
    lines: Vec<CartLine>,
}

impl TryFrom<CartLines> for CartStore {
    type Error = StorefrontError;

    fn try_from(CartLines { lines }: CartLines) -> Result<Self> {
        let mut seen = HashSet::with_capacity(lines.len());
        for line in &lines {
            if !seen.insert(&line.category_id) {
                return Err(StorefrontError::validation(format!(
                    "{}: duplicate cart line",
                    line.category_id
                )));
            }
            if line.quantity == 0 {
                return Err(StorefrontError::validation(format!("{}: empty cart line", line.category_id)));
            }
        }
        Ok(Self { lines })
    }
}

impl CartStore {
    /// Creates an empty cart
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Adds `delta` units of a category.
    ///
    /// An absent line is inserted with `delta` clamped to the inventory
    /// ceiling; a present line becomes `min(current + delta, inventory)`.
    /// Returns the resulting quantity.
    ///
    /// # Errors
    ///
    /// - [`StorefrontError::NotFound`] for an unknown category.
    /// - [`StorefrontError::Validation`] if the result would be below 1
    ///   (sold out, a non-positive `delta` for a new line, or a negative
    ///   `delta` that empties an existing line).
    pub fn add_line(&mut self, index: &CatalogIndex, category_id: &TicketCategoryId, delta: i64) -> Result<u32> {
        let inventory = index.inventory(category_id)?;

        let quantity = match self.position(category_id) {
            Some(position) => {
                let current = i64::from(self.lines[position].quantity);
                let next = current.saturating_add(delta).min(i64::from(inventory));
                let quantity = positive_quantity(category_id, next, inventory)?;
                self.lines[position].quantity = quantity;
                quantity
            }
            None => {
                if delta < 1 {
                    return Err(reject(category_id, format!("cannot add {delta} tickets")));
                }
                let quantity = positive_quantity(category_id, delta.min(i64::from(inventory)), inventory)?;
                self.lines.push(CartLine {
                    category_id: category_id.clone(),
                    quantity,
                });
                quantity
            }
        };

        tracing::debug!(category = %category_id, delta, quantity, inventory, "Cart line added");
        self.check_line(index, category_id);
        Ok(quantity)
    }

    /// Sets an existing line's quantity, clamped to the inventory ceiling.
    /// Returns the resulting quantity.
    ///
    /// # Errors
    ///
    /// - [`StorefrontError::NotFound`] for an unknown category or a category
    ///   with no line in this cart.
    /// - [`StorefrontError::Validation`] if `quantity < 1` or the category
    ///   is sold out.
    pub fn set_quantity(&mut self, index: &CatalogIndex, category_id: &TicketCategoryId, quantity: i64) -> Result<u32> {
        let inventory = index.inventory(category_id)?;
        let position = self
            .position(category_id)
            .ok_or_else(|| StorefrontError::not_found(EntityKind::TicketCategory, format!("{category_id} (not in cart)")))?;

        if quantity < 1 {
            return Err(reject(category_id, format!("quantity must be at least 1, got {quantity}")));
        }
        let clamped = positive_quantity(category_id, quantity.min(i64::from(inventory)), inventory)?;
        self.lines[position].quantity = clamped;

        tracing::debug!(category = %category_id, requested = quantity, quantity = clamped, inventory, "Cart quantity set");
        self.check_line(index, category_id);
        Ok(clamped)
    }

    /// Removes a line. Returns whether a line was present; absence is not an
    /// error.
    pub fn remove_line(&mut self, category_id: &TicketCategoryId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| &line.category_id != category_id);
        let removed = self.lines.len() != before;
        if removed {
            tracing::debug!(category = %category_id, "Cart line removed");
        }
        removed
    }

    /// Drops every line.
    pub fn clear(&mut self) {
        if !self.lines.is_empty() {
            tracing::debug!(lines = self.lines.len(), "Cart cleared");
        }
        self.lines.clear();
    }

    /// Applies a user command.
    ///
    /// # Errors
    ///
    /// Propagates the error of the underlying operation; the cart is left
    /// unchanged on failure.
    pub fn apply(&mut self, command: CartCommand, index: &CatalogIndex) -> Result<()> {
        match command {
            CartCommand::AddLine { category_id, delta } => {
                self.add_line(index, &category_id, delta)?;
            }
            CartCommand::SetQuantity { category_id, quantity } => {
                self.set_quantity(index, &category_id, quantity)?;
            }
            CartCommand::RemoveLine { category_id } => {
                self.remove_line(&category_id);
            }
            CartCommand::Clear => self.clear(),
        }
        Ok(())
    }

    /// Lowers every line to its category's current inventory, dropping lines
    /// that sold out. Returns the categories whose lines changed.
    pub fn reclamp(&mut self, index: &CatalogIndex) -> Vec<TicketCategoryId> {
        let mut changed = Vec::new();
        self.lines.retain_mut(|line| {
            let inventory = index.inventory(&line.category_id).unwrap_or(0);
            if line.quantity <= inventory {
                return true;
            }
            changed.push(line.category_id.clone());
            line.quantity = inventory;
            inventory > 0
        });
        if !changed.is_empty() {
            tracing::info!(categories = ?changed, "Cart reclamped to current inventory");
        }
        changed
    }

    /// Current price × quantity for one line, read live from the catalog.
    ///
    /// # Errors
    ///
    /// - [`StorefrontError::NotFound`] if the category has no line or is
    ///   unknown to the catalog.
    /// - [`StorefrontError::Validation`] on arithmetic overflow.
    pub fn line_total(&self, index: &CatalogIndex, category_id: &TicketCategoryId) -> Result<Money> {
        let quantity = self
            .quantity(category_id)
            .ok_or_else(|| StorefrontError::not_found(EntityKind::TicketCategory, format!("{category_id} (not in cart)")))?;
        let price = index.price(category_id)?;
        price
            .checked_multiply(quantity)
            .ok_or_else(|| StorefrontError::validation(format!("line total for {category_id} overflows")))
    }

    /// Sum of every line total; zero for an empty cart.
    ///
    /// # Errors
    ///
    /// Same as [`CartStore::line_total`].
    pub fn cart_total(&self, index: &CatalogIndex) -> Result<Money> {
        self.lines.iter().try_fold(Money::ZERO, |total, line| {
            let line_total = self.line_total(index, &line.category_id)?;
            total
                .checked_add(line_total)
                .ok_or_else(|| StorefrontError::validation("cart total overflows"))
        })
    }

    /// Lines in insertion order
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Quantity held for a category, if any
    #[must_use]
    pub fn quantity(&self, category_id: &TicketCategoryId) -> Option<u32> {
        self.position(category_id).map(|position| self.lines[position].quantity)
    }

    /// Number of lines
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns true if the cart has no lines
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Units across all lines
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Returns true if every line satisfies `1 ≤ quantity ≤ inventory`
    /// against the catalog as it is now.
    #[must_use]
    pub fn within_inventory(&self, index: &CatalogIndex) -> bool {
        self.lines.iter().all(|line| {
            index
                .inventory(&line.category_id)
                .is_ok_and(|inventory| (1..=inventory).contains(&line.quantity))
        })
    }

    /// Builds a cart without the one-line-per-category check.
    #[cfg(test)]
    pub(crate) const fn with_lines(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }

    fn position(&self, category_id: &TicketCategoryId) -> Option<usize> {
        self.lines.iter().position(|line| &line.category_id == category_id)
    }

    /// Post-condition for the line a mutation touched. Other lines may be
    /// stale if the catalog changed underneath them; `reclamp` repairs those.
    fn check_line(&self, index: &CatalogIndex, category_id: &TicketCategoryId) {
        let within = self.line_within_inventory(index, category_id);
        if !within {
            tracing::warn!(category = %category_id, "Cart line out of inventory bounds");
        }
        debug_assert!(within, "cart line {category_id} out of inventory bounds");
    }

    fn line_within_inventory(&self, index: &CatalogIndex, category_id: &TicketCategoryId) -> bool {
        self.quantity(category_id).is_some_and(|quantity| {
            index
                .inventory(category_id)
                .is_ok_and(|inventory| (1..=inventory).contains(&quantity))
        })
    }
}

fn positive_quantity(category_id: &TicketCategoryId, quantity: i64, inventory: u32) -> Result<u32> {
    if inventory == 0 {
        return Err(reject(category_id, "sold out".to_string()));
    }
    match u32::try_from(quantity) {
        Ok(quantity) if quantity >= 1 => Ok(quantity),
        _ => Err(reject(category_id, format!("quantity would drop to {quantity}"))),
    }
}

fn reject(category_id: &TicketCategoryId, reason: String) -> StorefrontError {
    tracing::warn!(category = %category_id, %reason, "Cart change rejected");
    StorefrontError::validation(format!("{category_id}: {reason}"))
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::seed::seed_data;
    use proptest::prelude::*;

    fn index() -> CatalogIndex {
        CatalogIndex::build(seed_data()).expect("seed catalog should build")
    }

    fn tc(id: &str) -> TicketCategoryId {
        id.into()
    }

    #[test]
    fn test_add_then_clamp_to_inventory() {
        let index = index();
        let mut cart = CartStore::new();
        assert_eq!(cart.add_line(&index, &tc("tc1"), 1), Ok(1));
        assert_eq!(cart.add_line(&index, &tc("tc1"), 30), Ok(25));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_add_new_line_clamps_large_delta() {
        let index = index();
        let mut cart = CartStore::new();
        assert_eq!(cart.add_line(&index, &tc("tc1"), 100), Ok(25));
    }

    #[test]
    fn test_add_rejects_results_below_one() {
        let index = index();
        let mut cart = CartStore::new();
        assert!(matches!(cart.add_line(&index, &tc("tc1"), 0), Err(StorefrontError::Validation(_))));
        assert!(cart.is_empty());

        cart.add_line(&index, &tc("tc1"), 2).expect("add");
        assert!(matches!(cart.add_line(&index, &tc("tc1"), -2), Err(StorefrontError::Validation(_))));
        assert_eq!(cart.quantity(&tc("tc1")), Some(2));
        assert_eq!(cart.add_line(&index, &tc("tc1"), -1), Ok(1));
    }

    #[test]
    fn test_add_sold_out_is_rejected() {
        let mut index = index();
        index.set_inventory(&tc("tc3"), 0).expect("restock");
        let mut cart = CartStore::new();
        assert!(matches!(cart.add_line(&index, &tc("tc3"), 1), Err(StorefrontError::Validation(_))));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_unknown_category_is_not_found() {
        let index = index();
        let mut cart = CartStore::new();
        assert!(matches!(cart.add_line(&index, &tc("tc99"), 1), Err(StorefrontError::NotFound { .. })));
        assert!(matches!(cart.set_quantity(&index, &tc("tc99"), 1), Err(StorefrontError::NotFound { .. })));
    }

    #[test]
    fn test_set_quantity_requires_line_and_positive_quantity() {
        let index = index();
        let mut cart = CartStore::new();
        assert!(matches!(cart.set_quantity(&index, &tc("tc2"), 3), Err(StorefrontError::NotFound { .. })));

        cart.add_line(&index, &tc("tc2"), 1).expect("add");
        assert_eq!(cart.set_quantity(&index, &tc("tc2"), 3), Ok(3));
        assert_eq!(cart.set_quantity(&index, &tc("tc2"), 1_000), Ok(260));
        assert!(matches!(cart.set_quantity(&index, &tc("tc2"), 0), Err(StorefrontError::Validation(_))));
        assert_eq!(cart.quantity(&tc("tc2")), Some(260));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let index = index();
        let mut cart = CartStore::new();
        assert!(!cart.remove_line(&tc("tc4")));
        cart.add_line(&index, &tc("tc4"), 2).expect("add");
        assert!(cart.remove_line(&tc("tc4")));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let index = index();
        let mut cart = CartStore::new();
        for id in ["tc5", "tc1", "tc3"] {
            cart.add_line(&index, &tc(id), 1).expect("add");
        }
        cart.add_line(&index, &tc("tc1"), 1).expect("add");
        let order: Vec<_> = cart.lines().iter().map(|l| l.category_id.as_str()).collect();
        assert_eq!(order, vec!["tc5", "tc1", "tc3"]);
    }

    #[test]
    fn test_totals_read_live_prices() {
        let mut index = index();
        let mut cart = CartStore::new();
        assert_eq!(cart.cart_total(&index), Ok(Money::ZERO));

        cart.add_line(&index, &tc("tc2"), 2).expect("add");
        cart.add_line(&index, &tc("tc3"), 1).expect("add");
        assert_eq!(cart.line_total(&index, &tc("tc2")), Ok(Money::from_dollars(190)));
        assert_eq!(cart.cart_total(&index), Ok(Money::from_dollars(255)));

        index.set_price(&tc("tc2"), Money::from_dollars(100)).expect("reprice");
        assert_eq!(cart.cart_total(&index), Ok(Money::from_dollars(265)));
        assert!(matches!(cart.line_total(&index, &tc("tc1")), Err(StorefrontError::NotFound { .. })));
    }

    #[test]
    fn test_reclamp_after_inventory_drop() {
        let mut index = index();
        let mut cart = CartStore::new();
        cart.add_line(&index, &tc("tc2"), 5).expect("add");
        cart.add_line(&index, &tc("tc3"), 2).expect("add");
        cart.add_line(&index, &tc("tc4"), 1).expect("add");

        index.set_inventory(&tc("tc2"), 3).expect("reduce");
        index.set_inventory(&tc("tc4"), 0).expect("reduce");
        assert!(!cart.within_inventory(&index));

        let changed = cart.reclamp(&index);
        assert_eq!(changed, vec![tc("tc2"), tc("tc4")]);
        assert_eq!(cart.quantity(&tc("tc2")), Some(3));
        assert_eq!(cart.quantity(&tc("tc4")), None);
        assert!(cart.within_inventory(&index));
    }

    #[test]
    fn test_apply_commands() {
        let index = index();
        let mut cart = CartStore::new();
        cart.apply(CartCommand::AddLine { category_id: tc("tc6"), delta: 2 }, &index).expect("add");
        cart.apply(CartCommand::SetQuantity { category_id: tc("tc6"), quantity: 4 }, &index).expect("set");
        assert_eq!(cart.total_quantity(), 4);
        cart.apply(CartCommand::RemoveLine { category_id: tc("tc7") }, &index).expect("remove");
        cart.apply(CartCommand::Clear, &index).expect("clear");
        assert!(cart.is_empty());
    }

    #[test]
    fn test_line_bound_check_sees_stale_lines() {
        let mut index = index();
        let mut cart = CartStore::new();
        cart.add_line(&index, &tc("tc1"), 5).expect("add");
        assert!(cart.line_within_inventory(&index, &tc("tc1")));

        index.set_inventory(&tc("tc1"), 2).expect("reduce");
        assert!(!cart.line_within_inventory(&index, &tc("tc1")));
        assert!(!cart.line_within_inventory(&index, &tc("tc2")));

        cart.reclamp(&index);
        assert!(cart.line_within_inventory(&index, &tc("tc1")));
    }

    #[test]
    fn test_deserialize_rejects_duplicate_lines() {
        let json = r#"{"lines":[{"categoryId":"tc1","quantity":1},{"categoryId":"tc2","quantity":2},{"categoryId":"tc2","quantity":2}]}"#;
        assert!(serde_json::from_str::<CartStore>(json).is_err());

        let empty_line = r#"{"lines":[{"categoryId":"tc1","quantity":0}]}"#;
        assert!(serde_json::from_str::<CartStore>(empty_line).is_err());

        let index = index();
        let mut cart = CartStore::new();
        cart.add_line(&index, &tc("tc1"), 1).expect("add");
        cart.add_line(&index, &tc("tc2"), 2).expect("add");
        let json = serde_json::to_string(&cart).expect("serialize");
        let restored: CartStore = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, cart);
    }

    fn command() -> impl Strategy<Value = CartCommand> {
        let category = prop::sample::select(vec!["tc1", "tc2", "tc3"]).prop_map(|id: &str| TicketCategoryId::new(id));
        prop_oneof![
            (category.clone(), -40i64..40).prop_map(|(category_id, delta)| CartCommand::AddLine { category_id, delta }),
            (category.clone(), -5i64..400).prop_map(|(category_id, quantity)| CartCommand::SetQuantity { category_id, quantity }),
            category.prop_map(|category_id| CartCommand::RemoveLine { category_id }),
        ]
    }

    proptest! {
        #[test]
        fn prop_lines_stay_within_inventory(commands in prop::collection::vec(command(), 0..40)) {
            let index = index();
            let mut cart = CartStore::new();
            for command in commands {
                let before = cart.clone();
                if cart.apply(command, &index).is_err() {
                    prop_assert_eq!(&cart, &before);
                }
                prop_assert!(cart.within_inventory(&index));
                let line_sum = cart
                    .lines()
                    .iter()
                    .map(|line| cart.line_total(&index, &line.category_id))
                    .try_fold(Money::ZERO, |acc, total| total.map(|t| Money::from_cents(acc.cents() + t.cents())));
                prop_assert_eq!(cart.cart_total(&index), line_sum);
            }
        }
    }
}
