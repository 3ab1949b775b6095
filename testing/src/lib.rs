//! # Marquee Testing
//!
//! Testing utilities and helpers for the Marquee storefront.
//!
//! This crate provides:
//! - A fixed clock for deterministic order timestamps
//! - Seed catalog fixtures
//! - A Given-When-Then harness for cart commands
//! - Assertion helpers for carts and errors
//!
//! ## Example
//!
//! ```
//! use marquee_testing::{seed_index, test_clock};
//! use marquee_core::{CartStore, CheckoutCoordinator, CustomerInfo};
//!
//! let mut index = seed_index();
//! let mut cart = CartStore::new();
//! let mut checkout = CheckoutCoordinator::new(test_clock());
//!
//! cart.add_line(&index, &"tc2".into(), 2).unwrap();
//! let order = checkout
//!     .commit(&mut index, &mut cart, &CustomerInfo::new("Ada", "ada@example.com"))
//!     .unwrap();
//! assert_eq!(order.created_at_iso(), "2025-01-01T00:00:00+00:00");
//! ```

use chrono::{DateTime, Utc};
use marquee_core::environment::Clock;


/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use marquee_testing::mocks::FixedClock;
    /// use marquee_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Catalog fixtures
pub mod fixtures {
    use marquee_core::environment::Clock;
    use marquee_core::seed::seed_data_at;
    use marquee_core::{CatalogData, CatalogIndex, Storefront};

    use super::mocks::{test_clock, FixedClock};

    /// Seed dataset with dates anchored at [`test_clock`]
    #[must_use]
    pub fn seed() -> CatalogData {
        seed_data_at(test_clock().now())
    }

    /// Seed catalog index
    ///
    /// # Panics
    ///
    /// Panics if the bundled seed fails to build, which would be a bug in
    /// the seed itself.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn seed_index() -> CatalogIndex {
        CatalogIndex::build(seed()).expect("bundled seed should build")
    }

    /// Storefront over the seed catalog with a fixed clock
    #[must_use]
    pub fn seed_storefront() -> Storefront<FixedClock> {
        Storefront::from_index(seed_index(), test_clock())
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use marquee_core::{CartCommand, TicketCategoryId};
    use proptest::prelude::*;

    /// Ticket category ids present in the seed catalog
    pub const SEED_CATEGORIES: [&str; 7] = ["tc1", "tc2", "tc3", "tc4", "tc5", "tc6", "tc7"];

    /// Strategy over seed ticket category ids
    pub fn seed_category() -> impl Strategy<Value = TicketCategoryId> {
        prop::sample::select(SEED_CATEGORIES.to_vec()).prop_map(|id: &str| TicketCategoryId::new(id))
    }

    /// Strategy over cart commands on seed categories, including
    /// out-of-range quantities and deltas
    pub fn cart_command() -> impl Strategy<Value = CartCommand> {
        prop_oneof![
            4 => (seed_category(), -50i64..60)
                .prop_map(|(category_id, delta)| CartCommand::AddLine { category_id, delta }),
            3 => (seed_category(), -10i64..500)
                .prop_map(|(category_id, quantity)| CartCommand::SetQuantity { category_id, quantity }),
            2 => seed_category().prop_map(|category_id| CartCommand::RemoveLine { category_id }),
            1 => Just(CartCommand::Clear),
        ]
    }
}

// Re-export commonly used items
pub use cart_test::{CartTest, assertions};
pub use fixtures::{seed, seed_index, seed_storefront};
pub use mocks::{FixedClock, test_clock};
