//! # Marquee Core
//!
//! The logic behind a concert storefront: browse concerts, reserve tickets in
//! a cart, and check out into an order.
//!
//! ```text
//! loader ──► CatalogIndex::build ──┬──► FilterEngine::evaluate   (read-only)
//!                                  │
//!                                  ├──► CartStore mutations      (per session)
//!                                  │
//!                                  └──► CheckoutCoordinator::commit
//!                                         └─► Order | rejection
//! ```
//!
//! ## Components
//!
//! - **[`CatalogIndex`]**: id-keyed lookup tables, referential integrity
//!   validated once at build time.
//! - **[`FilterEngine`]**: pure text / genre / venue filter over concerts.
//! - **[`CartStore`]**: per-session reservation lines bounded by inventory.
//! - **[`CheckoutCoordinator`]**: all-or-nothing commit into an [`Order`];
//!   the only writer of catalog inventory.
//! - **[`Storefront`]**: shares one catalog across concurrent sessions.
//!
//! ## Example
//!
//! ```
//! use marquee_core::{seed::seed_data, CustomerInfo, FilterQuery, Storefront};
//!
//! # fn main() -> Result<(), marquee_core::StorefrontError> {
//! let storefront = Storefront::open(seed_data())?;
//! let concerts = storefront.browse(&FilterQuery::all().with_genre("g3"));
//! assert_eq!(concerts.len(), 2);
//!
//! let mut session = storefront.session();
//! session.add_line(&"tc2".into(), 2)?;
//! let order = session.checkout(&CustomerInfo::new("Ada Lovelace", "ada@example.com"))?;
//! assert_eq!(order.total.dollars(), 190);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod environment;
pub mod error;
pub mod filter;
pub mod ledger;
pub mod seed;
pub mod storefront;
pub mod types;

pub use cart::{CartCommand, CartLine, CartStore};
pub use catalog::{CatalogData, CatalogIndex, EntityRef};
pub use checkout::{CheckoutCoordinator, CheckoutPhase};
pub use config::StorefrontConfig;
pub use environment::{Clock, SystemClock};
pub use error::{EntityKind, Result, StorefrontError};
pub use filter::{FilterEngine, FilterQuery, Selection};
pub use ledger::OrderLedger;
pub use storefront::{Session, Storefront};
pub use types::*;
