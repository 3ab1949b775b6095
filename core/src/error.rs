//! Error types for the storefront core.

use std::fmt;
use thiserror::Error;

use crate::types::TicketCategoryId;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Entity kinds held by the catalog index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Genre
    Genre,
    /// Lineup role
    Role,
    /// Artist
    Artist,
    /// Venue
    Venue,
    /// Concert group (series)
    ConcertGroup,
    /// Concert
    Concert,
    /// Ticket category
    TicketCategory,
    /// Order
    Order,
    /// Customer
    Customer,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Genre => "genre",
            Self::Role => "role",
            Self::Artist => "artist",
            Self::Venue => "venue",
            Self::ConcertGroup => "concert group",
            Self::Concert => "concert",
            Self::TicketCategory => "ticket category",
            Self::Order => "order",
            Self::Customer => "customer",
        };
        f.write_str(name)
    }
}

/// Storefront errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorefrontError {
    /// Referential integrity failure while building the catalog index.
    /// Fatal: startup should abort.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The dataset could not be read or parsed.
    #[error("Load error: {0}")]
    Load(String),

    /// Unknown id passed to a lookup or cart operation
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Kind of entity looked up
        kind: EntityKind,
        /// The unresolved id
        id: String,
    },

    /// Malformed input (non-positive quantity, missing checkout fields, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A cart line asks for more units than the category has left
    #[error("{category} is no longer available in the requested quantity ({requested} requested, {available} left)")]
    InventoryExceeded {
        /// Offending category
        category: TicketCategoryId,
        /// Quantity held in the cart
        requested: u32,
        /// Current inventory ceiling
        available: u32,
    },
}

impl StorefrontError {
    /// Creates a not-found error
    #[must_use]
    pub fn not_found(kind: EntityKind, id: impl fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Creates a validation error
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns true if a session can continue after this error.
    ///
    /// Configuration and load failures happen at startup and are fatal.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Config(_) | Self::Load(_))
    }

    /// Stable machine-readable code for the presentation layer
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "config_error",
            Self::Load(_) => "load_error",
            Self::NotFound { .. } => "not_found",
            Self::Validation(_) => "validation_error",
            Self::InventoryExceeded { .. } => "inventory_exceeded",
        }
    }
}

impl From<serde_json::Error> for StorefrontError {
    fn from(err: serde_json::Error) -> Self {
        Self::Load(format!("invalid catalog JSON: {err}"))
    }
}

impl From<std::io::Error> for StorefrontError {
    fn from(err: std::io::Error) -> Self {
        Self::Load(format!("could not read catalog: {err}"))
    }
}
