//! Domain types for the concert storefront.
//!
//! Identifiers, the `Money` value object, catalog entities, and the order
//! records produced by checkout.

use chrono::{DateTime, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Declares a string-backed identifier newtype.
///
/// Catalog ids come from the loader (`"g1"`, `"tc2"`, ...), so they are kept
/// as opaque strings rather than UUIDs.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates the identifier from any string-like value
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Unique identifier for a genre
    GenreId
);
string_id!(
    /// Unique identifier for a lineup role (headliner, opener, ...)
    RoleId
);
string_id!(
    /// Unique identifier for an artist
    ArtistId
);
string_id!(
    /// Unique identifier for a venue
    VenueId
);
string_id!(
    /// Unique identifier for a concert group (series)
    ConcertGroupId
);
string_id!(
    /// Unique identifier for a concert
    ConcertId
);
string_id!(
    /// Unique identifier for a ticket category
    TicketCategoryId
);
string_id!(
    /// Unique identifier for a registered customer
    CustomerId
);
string_id!(
    /// Unique identifier for a committed order
    OrderId
);

impl OrderId {
    /// Mints a fresh random order id
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl CustomerId {
    /// Mints a fresh random customer id
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

// ============================================================================
// Money Value Object (cents-based to avoid floating point errors)
// ============================================================================

/// Represents money in cents to avoid floating-point arithmetic errors
///
/// Serialized as a plain number of whole currency units (`95`, `12.34`), the
/// shape loaders supply prices in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(u64);

impl Money {
    /// Zero amount
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Creates a `Money` value from whole dollars with overflow checking
    #[must_use]
    pub const fn checked_from_dollars(dollars: u64) -> Option<Self> {
        match dollars.checked_mul(100) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    /// Creates a `Money` value from whole dollars, saturating on overflow
    #[must_use]
    pub const fn from_dollars(dollars: u64) -> Self {
        Self(dollars.saturating_mul(100))
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Returns the amount in dollars (rounded down)
    #[must_use]
    pub const fn dollars(&self) -> u64 {
        self.0 / 100
    }

    /// Adds two money amounts with overflow checking
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }

    /// Multiplies money by a quantity with overflow checking
    #[must_use]
    pub const fn checked_multiply(self, quantity: u32) -> Option<Self> {
        match self.0.checked_mul(quantity as u64) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.dollars(), self.0 % 100)
    }
}

impl Serialize for Money {
    #[allow(clippy::cast_precision_loss)]
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.0 % 100 == 0 {
            serializer.serialize_u64(self.dollars())
        } else {
            serializer.serialize_f64(self.0 as f64 / 100.0)
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

struct MoneyVisitor;

impl Visitor<'_> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative amount in currency units")
    }

    fn visit_u64<E: de::Error>(self, dollars: u64) -> std::result::Result<Money, E> {
        Money::checked_from_dollars(dollars).ok_or_else(|| E::custom("amount out of range"))
    }

    fn visit_i64<E: de::Error>(self, dollars: i64) -> std::result::Result<Money, E> {
        let dollars = u64::try_from(dollars).map_err(|_| E::custom("amount must not be negative"))?;
        self.visit_u64(dollars)
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    fn visit_f64<E: de::Error>(self, amount: f64) -> std::result::Result<Money, E> {
        let cents = (amount * 100.0).round();
        if !cents.is_finite() || cents < 0.0 || cents >= u64::MAX as f64 {
            return Err(E::custom("amount out of range"));
        }
        Ok(Money::from_cents(cents as u64))
    }
}

// ============================================================================
// Catalog Entities
// ============================================================================

/// Musical genre
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    /// Genre id
    pub id: GenreId,
    /// Display name
    pub name: String,
}

/// Role an artist plays in a lineup
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role id
    pub id: RoleId,
    /// Display name
    pub name: String,
}

/// Performing artist
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    /// Artist id
    pub id: ArtistId,
    /// Display name
    pub name: String,
    /// Genres this artist is associated with
    pub genres: Vec<GenreId>,
}

impl Artist {
    /// Returns true if the artist belongs to `genre`
    #[must_use]
    pub fn has_genre(&self, genre: &GenreId) -> bool {
        self.genres.contains(genre)
    }
}

/// Venue information
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    /// Venue id
    pub id: VenueId,
    /// Venue name
    pub name: String,
    /// City, region
    pub city: String,
    /// Total capacity
    pub capacity: u32,
}

/// A named series of concerts
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcertGroup {
    /// Group id
    pub id: ConcertGroupId,
    /// Display name
    pub name: String,
}

/// One lineup slot: who performs and in what capacity
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineupSlot {
    /// Performing artist
    pub artist_id: ArtistId,
    /// Role in the lineup
    pub role_id: RoleId,
}

/// Concert entity
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concert {
    /// Concert id
    pub id: ConcertId,
    /// Title shown on listings
    pub title: String,
    /// Start time
    pub date: DateTime<Utc>,
    /// Venue hosting the concert
    pub venue_id: VenueId,
    /// Series the concert belongs to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<ConcertGroupId>,
    /// Ordered lineup
    pub lineup: Vec<LineupSlot>,
    /// Ticket categories on sale, in display order
    pub ticket_category_ids: Vec<TicketCategoryId>,
}

/// A priced, inventory-bounded admission class for one concert
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketCategory {
    /// Category id
    pub id: TicketCategoryId,
    /// Concert this category admits to
    pub concert_id: ConcertId,
    /// Display name
    pub name: String,
    /// Unit price
    pub price: Money,
    /// Units still sellable
    pub inventory: u32,
    /// Optional seating row label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<String>,
}

// ============================================================================
// Customers and Orders
// ============================================================================

/// Customer details entered at checkout
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    /// Full name
    pub name: String,
    /// Contact email
    pub email: String,
}

impl CustomerInfo {
    /// Creates customer info
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Registered customer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Customer id
    pub id: CustomerId,
    /// Full name
    pub name: String,
    /// Contact email
    pub email: String,
}

/// A committed line item with the price captured at commit time
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Category purchased
    pub category_id: TicketCategoryId,
    /// Units purchased
    pub quantity: u32,
    /// Price per unit at commit time
    pub unit_price: Money,
}

impl OrderItem {
    /// Returns `quantity × unit_price`, or `None` on overflow
    #[must_use]
    pub const fn line_total(&self) -> Option<Money> {
        self.unit_price.checked_multiply(self.quantity)
    }
}

/// Immutable record of a successful checkout
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order id
    pub id: OrderId,
    /// Customer who placed the order
    pub customer_id: CustomerId,
    /// Customer details as entered
    pub customer: CustomerInfo,
    /// Commit time
    pub created_at: DateTime<Utc>,
    /// Committed items in cart order
    pub items: Vec<OrderItem>,
    /// Sum of line totals at commit time
    pub total: Money,
}

impl Order {
    /// Returns the commit timestamp in ISO-8601 (RFC 3339) form
    #[must_use]
    pub fn created_at_iso(&self) -> String {
        self.created_at.to_rfc3339()
    }

    /// Total units across all items
    #[must_use]
    pub fn ticket_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}
