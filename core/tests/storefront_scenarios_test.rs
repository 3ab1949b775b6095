//! End-to-end storefront scenarios.
//!
//! Browse → cart → checkout against the seed catalog, including the
//! oversell and price-change edge cases.
//!
//! Run with: `cargo test -p marquee-core --test storefront_scenarios_test`

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

use marquee_core::{
    CartCommand, CartStore, CatalogData, CatalogIndex, CheckoutCoordinator, CheckoutPhase,
    CustomerInfo, FilterEngine, FilterQuery, Money, StorefrontError, TicketCategoryId,
};
use marquee_testing::{
    CartTest, assertions, properties::cart_command, seed_index, seed_storefront, test_clock,
};
use proptest::prelude::*;

fn tc(id: &str) -> TicketCategoryId {
    id.into()
}

fn ada() -> CustomerInfo {
    CustomerInfo::new("Ada Lovelace", "ada@example.com")
}

/// Test 1: Successful Commit
///
/// tc2 = $95 × 260. Two units commit to a $190 order, inventory drops to 258,
/// the cart empties.
#[test]
fn test_commit_two_floor_tickets() {
    let mut index = seed_index();
    let mut cart = CartStore::new();
    let mut checkout = CheckoutCoordinator::new(test_clock());

    cart.add_line(&index, &tc("tc2"), 2).unwrap();
    let order = checkout.commit(&mut index, &mut cart, &ada()).unwrap();

    assert_eq!(order.total, Money::from_dollars(190));
    assert_eq!(index.inventory(&tc("tc2")), Ok(258));
    assert!(cart.is_empty());
    assert_eq!(checkout.phase(), CheckoutPhase::Idle);
}

/// Test 2: Oversell After External Reduction
///
/// Inventory drops to 1 while the cart holds 2; commit fails and nothing
/// changes. After reclamping, the retry succeeds.
#[test]
fn test_commit_rejects_oversell_then_retry_after_reclamp() {
    let mut index = seed_index();
    let mut cart = CartStore::new();
    let mut checkout = CheckoutCoordinator::new(test_clock());

    cart.add_line(&index, &tc("tc2"), 2).unwrap();
    index.set_inventory(&tc("tc2"), 1).unwrap();

    let snapshot = cart.clone();
    let result = checkout.commit(&mut index, &mut cart, &ada());
    assert!(matches!(
        result,
        Err(StorefrontError::InventoryExceeded { ref category, requested: 2, available: 1 }) if category == &tc("tc2")
    ));
    assert_eq!(cart, snapshot);
    assert_eq!(index.inventory(&tc("tc2")), Ok(1));
    assert_eq!(checkout.last_outcome(), Some(CheckoutPhase::Rejected));

    cart.reclamp(&index);
    let order = checkout.commit(&mut index, &mut cart, &ada()).unwrap();
    assert_eq!(order.total, Money::from_dollars(95));
    assert_eq!(index.inventory(&tc("tc2")), Ok(0));
}

/// Test 3: Add Clamps to Inventory Ceiling
#[test]
fn test_add_line_clamps_vip_pit() {
    CartTest::new(seed_index())
        .given_commands(vec![CartCommand::AddLine { category_id: tc("tc1"), delta: 1 }])
        .when_command(CartCommand::AddLine { category_id: tc("tc1"), delta: 30 })
        .then_cart(|cart, _| assert_eq!(cart.quantity(&"tc1".into()), Some(25)))
        .then_outcome(|outcome| assert!(outcome.is_ok()))
        .run();
}

/// Test 4: Removing an Absent Line is a No-op
#[test]
fn test_remove_absent_line() {
    CartTest::new(seed_index())
        .given_commands(vec![CartCommand::AddLine { category_id: tc("tc3"), delta: 2 }])
        .when_command(CartCommand::RemoveLine { category_id: tc("tc5") })
        .then_cart(|cart, _| assert_eq!(cart.len(), 1))
        .then_outcome(|outcome| assert!(outcome.is_ok()))
        .run();
}

/// Test 5: Setting Quantity Zero is Rejected, not a Removal
#[test]
fn test_set_quantity_zero_rejected() {
    CartTest::new(seed_index())
        .given_commands(vec![CartCommand::AddLine { category_id: tc("tc6"), delta: 3 }])
        .when_command(CartCommand::SetQuantity { category_id: tc("tc6"), quantity: 0 })
        .then_cart(|cart, _| assert_eq!(cart.quantity(&"tc6".into()), Some(3)))
        .then_outcome(assertions::assert_validation_error)
        .run();
}

/// Test 6: Setting Quantity on a Missing Line
#[test]
fn test_set_quantity_missing_line() {
    CartTest::new(seed_index())
        .when_command(CartCommand::SetQuantity { category_id: tc("tc6"), quantity: 2 })
        .then_outcome(assertions::assert_not_found)
        .run();
}

/// Test 7: Sold-out Category Cannot Be Added
#[test]
fn test_sold_out_category() {
    CartTest::new(seed_index())
        .given_catalog(|index| index.set_inventory(&"tc7".into(), 0).unwrap())
        .when_command(CartCommand::AddLine { category_id: tc("tc7"), delta: 1 })
        .then_cart(|cart, _| assert!(cart.is_empty()))
        .then_outcome(assertions::assert_validation_error)
        .run();
}

/// Test 8: Genre Filter
///
/// Metro Echo (g3) plays c1 and c2; nobody in the lineup plays Hip-Hop (g5).
#[test]
fn test_genre_filter_includes_and_excludes() {
    let index = seed_index();
    let electronic = FilterEngine::evaluate_all(&index, &FilterQuery::from_form("", "g3", "all"));
    let ids: Vec<_> = electronic.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["c1", "c2"]);

    let hip_hop = FilterEngine::evaluate_all(&index, &FilterQuery::from_form("", "g5", "all"));
    assert!(hip_hop.is_empty());
}

/// Test 9: Empty Query Returns Input Unchanged
#[test]
fn test_empty_query_identity_on_reversed_input() {
    let index = seed_index();
    let mut reversed = index.concerts().to_vec();
    reversed.reverse();

    let result = FilterEngine::evaluate(&index, &reversed, &FilterQuery::from_form("", "all", "all"));
    let expected: Vec<_> = reversed.iter().collect();
    assert_eq!(result, expected);
}

/// Test 10: Captured Price Survives a Price Change
#[test]
fn test_order_price_frozen() {
    let storefront = seed_storefront();
    let mut session = storefront.session();
    session.add_line(&tc("tc4"), 2).unwrap();
    let order = session.checkout(&ada()).unwrap();

    storefront.write_catalog(|index| index.set_price(&tc("tc4"), Money::from_dollars(1)).unwrap());

    let ledger = storefront.ledger();
    let recorded = ledger.order(&order.id).unwrap();
    assert_eq!(recorded.items[0].unit_price, Money::from_dollars(145));
    assert_eq!(recorded.total, Money::from_dollars(290));
    assert_eq!(recorded.created_at_iso(), "2025-01-01T00:00:00+00:00");
}

/// Test 11: Cancel Discards Without Side Effects
#[test]
fn test_session_cancel() {
    let storefront = seed_storefront();
    let mut session = storefront.session();
    session.add_line(&tc("tc5"), 10).unwrap();
    session.cancel();

    assert!(session.cart().is_empty());
    assert_eq!(storefront.read_catalog(|index| index.inventory(&tc("tc5"))), Ok(350));
    assert!(storefront.ledger().orders().is_empty());
}

/// Catalog as a loader supplies it: camelCase keys, prices in whole dollars.
const LOADED_CATALOG: &str = r#"{
    "genres": [{ "id": "g3", "name": "Electronic" }],
    "roles": [{ "id": "r1", "name": "Headliner" }],
    "artists": [{ "id": "a3", "name": "Metro Echo", "genres": ["g3"] }],
    "venues": [{ "id": "v1", "name": "Harbor Pavilion", "city": "Brooklyn, NY", "capacity": 8500 }],
    "groups": [{ "id": "cg1", "name": "Summer Nights Series" }],
    "concerts": [{
        "id": "c1",
        "title": "Metro Echo: Live at the Harbor",
        "date": "2025-01-08T00:00:00.000Z",
        "venueId": "v1",
        "groupId": "cg1",
        "lineup": [{ "artistId": "a3", "roleId": "r1" }],
        "ticketCategoryIds": ["tc1", "tc2"]
    }],
    "ticketCategories": [
        { "id": "tc1", "concertId": "c1", "name": "VIP Pit", "price": 169, "inventory": 25 },
        { "id": "tc2", "concertId": "c1", "name": "Floor GA", "price": 95, "inventory": 260 }
    ]
}"#;

fn loaded_index() -> CatalogIndex {
    CatalogData::from_json_str(LOADED_CATALOG)
        .and_then(CatalogIndex::build)
        .expect("loaded catalog should build")
}

/// Test 12: Loaded Catalog Prices in Currency Units
///
/// `"price": 95` is $95, so two Floor GA tickets total $190.
#[test]
fn test_loaded_catalog_totals() {
    let mut index = loaded_index();
    let mut cart = CartStore::new();
    cart.add_line(&index, &tc("tc2"), 2).unwrap();
    assert_eq!(cart.cart_total(&index), Ok(Money::from_dollars(190)));

    let order = CheckoutCoordinator::new(test_clock())
        .commit(&mut index, &mut cart, &ada())
        .unwrap();
    assert_eq!(order.total, Money::from_dollars(190));
    assert_eq!(index.inventory(&tc("tc2")), Ok(258));
}

/// Test 13: Restored Cart Commits Like a Built One
#[test]
fn test_deserialized_cart_commits() {
    let mut index = seed_index();
    let mut cart: CartStore = serde_json::from_str(
        r#"{"lines":[{"categoryId":"tc1","quantity":1},{"categoryId":"tc2","quantity":2}]}"#,
    )
    .unwrap();

    let order = CheckoutCoordinator::new(test_clock())
        .commit(&mut index, &mut cart, &ada())
        .unwrap();
    assert_eq!(order.total, Money::from_dollars(169 + 190));
    assert_eq!(index.inventory(&tc("tc1")), Ok(24));
    assert_eq!(index.inventory(&tc("tc2")), Ok(258));
}

/// Test 14: Restored Cart With a Repeated Category is Refused
///
/// The refusal happens at the boundary, so no commit ever sees the cart.
#[test]
fn test_deserialized_cart_with_duplicate_lines() {
    let restored = serde_json::from_str::<CartStore>(
        r#"{"lines":[{"categoryId":"tc1","quantity":1},{"categoryId":"tc2","quantity":2},{"categoryId":"tc2","quantity":2}]}"#,
    );
    assert!(restored.is_err());
}

proptest! {
    /// Any command sequence keeps every line within `1..=inventory`, and the
    /// cart total always equals the sum of line totals.
    #[test]
    fn prop_cart_bounds_hold(commands in prop::collection::vec(cart_command(), 0..60)) {
        let index = seed_index();
        let mut cart = CartStore::new();
        for command in commands {
            let _ = cart.apply(command, &index);
            prop_assert!(cart.within_inventory(&index));

            let mut sum = Money::ZERO;
            for line in cart.lines() {
                sum = sum.checked_add(cart.line_total(&index, &line.category_id).unwrap()).unwrap();
            }
            prop_assert_eq!(cart.cart_total(&index), Ok(sum));
        }
    }

    /// A rejected commit leaves cart and inventory untouched.
    #[test]
    fn prop_rejected_commit_is_atomic(
        commands in prop::collection::vec(cart_command(), 1..20),
        reduce_to in 0u32..5,
    ) {
        let mut index = seed_index();
        let mut cart = CartStore::new();
        for command in commands {
            let _ = cart.apply(command, &index);
        }
        let json = serde_json::to_string(&cart).unwrap();
        let mut cart: CartStore = serde_json::from_str(&json).unwrap();
        if let Some(first) = cart.lines().first().cloned() {
            index.set_inventory(&first.category_id, reduce_to).unwrap();
        }

        let cart_before = cart.clone();
        let inventory_before: Vec<_> = index.ticket_categories().iter().map(|c| c.inventory).collect();

        let mut checkout = CheckoutCoordinator::new(test_clock());
        if checkout.commit(&mut index, &mut cart, &ada()).is_err() {
            prop_assert_eq!(&cart, &cart_before);
            let inventory_after: Vec<_> = index.ticket_categories().iter().map(|c| c.inventory).collect();
            prop_assert_eq!(inventory_after, inventory_before);
        } else {
            prop_assert!(cart.is_empty());
        }
    }
}
