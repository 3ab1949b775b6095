//! Catalog index: id-keyed lookup tables over the loaded dataset.
//!
//! The index is built once per session from the loader's entity lists. Every
//! cross-reference is validated eagerly during [`CatalogIndex::build`], so the
//! filter engine, the cart and checkout may assume referential integrity.
//!
//! After the build the index is read-only, except for inventory changes:
//! checkout decrements inventory on commit, and the administrative
//! [`CatalogIndex::set_inventory`] / [`CatalogIndex::set_price`] operations
//! model external catalog edits.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::path::Path;

use crate::error::{EntityKind, Result, StorefrontError};
use crate::types::{
    Artist, ArtistId, Concert, ConcertGroup, ConcertGroupId, ConcertId, Genre, GenreId, Money,
    OrderItem, Role, RoleId, TicketCategory, TicketCategoryId, Venue, VenueId,
};

/// Group name shown for concerts that do not belong to a series.
pub const STANDALONE_GROUP: &str = "Standalone";

// ============================================================================
// Loader input
// ============================================================================

/// Raw entity lists supplied by a loader.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogData {
    /// Genres
    #[serde(default)]
    pub genres: Vec<Genre>,
    /// Lineup roles
    #[serde(default)]
    pub roles: Vec<Role>,
    /// Artists
    #[serde(default)]
    pub artists: Vec<Artist>,
    /// Venues
    #[serde(default)]
    pub venues: Vec<Venue>,
    /// Concert groups
    #[serde(default)]
    pub groups: Vec<ConcertGroup>,
    /// Concerts, in listing order
    #[serde(default)]
    pub concerts: Vec<Concert>,
    /// Ticket categories
    #[serde(default)]
    pub ticket_categories: Vec<TicketCategory>,
}

impl CatalogData {
    /// Parses entity lists from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Load`] if the document is not valid JSON
    /// of the expected shape.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses entity lists from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Load`] if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

// ============================================================================
// Table
// ============================================================================

/// Insertion-ordered table with an id → position map.
#[derive(Clone, Debug)]
struct Table<K, V> {
    rows: Vec<V>,
    positions: HashMap<K, usize>,
}

impl<K, V> Table<K, V>
where
    K: Clone + Eq + Hash + std::fmt::Display,
{
    fn build(kind: EntityKind, rows: Vec<V>, key: impl Fn(&V) -> &K) -> Result<Self> {
        let mut positions = HashMap::with_capacity(rows.len());
        for (position, row) in rows.iter().enumerate() {
            let id = key(row);
            if positions.insert(id.clone(), position).is_some() {
                return Err(StorefrontError::config(format!("duplicate {kind} id {id}")));
            }
        }
        Ok(Self { rows, positions })
    }

    fn get(&self, id: &K) -> Option<&V> {
        self.positions.get(id).and_then(|&position| self.rows.get(position))
    }

    fn get_mut(&mut self, id: &K) -> Option<&mut V> {
        let position = *self.positions.get(id)?;
        self.rows.get_mut(position)
    }

    fn contains(&self, id: &K) -> bool {
        self.positions.contains_key(id)
    }
}

// ============================================================================
// Entity references
// ============================================================================

/// A borrowed entity of any kind, returned by [`CatalogIndex::by_id`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityRef<'a> {
    /// Genre
    Genre(&'a Genre),
    /// Role
    Role(&'a Role),
    /// Artist
    Artist(&'a Artist),
    /// Venue
    Venue(&'a Venue),
    /// Concert group
    ConcertGroup(&'a ConcertGroup),
    /// Concert
    Concert(&'a Concert),
    /// Ticket category
    TicketCategory(&'a TicketCategory),
}

impl EntityRef<'_> {
    /// Kind of the referenced entity
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Genre(_) => EntityKind::Genre,
            Self::Role(_) => EntityKind::Role,
            Self::Artist(_) => EntityKind::Artist,
            Self::Venue(_) => EntityKind::Venue,
            Self::ConcertGroup(_) => EntityKind::ConcertGroup,
            Self::Concert(_) => EntityKind::Concert,
            Self::TicketCategory(_) => EntityKind::TicketCategory,
        }
    }
}

// ============================================================================
// Catalog index
// ============================================================================

/// Id-keyed lookup tables for every catalog entity kind.
#[derive(Clone, Debug)]
pub struct CatalogIndex {
    genres: Table<GenreId, Genre>,
    roles: Table<RoleId, Role>,
    artists: Table<ArtistId, Artist>,
    venues: Table<VenueId, Venue>,
    groups: Table<ConcertGroupId, ConcertGroup>,
    concerts: Table<ConcertId, Concert>,
    categories: Table<TicketCategoryId, TicketCategory>,
    version: u64,
}

impl CatalogIndex {
    /// Builds the index and validates every cross-reference.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Config`] on a duplicate id or any
    /// unresolved reference (venue, group, artist, role, genre, ticket
    /// category, or a category listed under the wrong concert).
    pub fn build(data: CatalogData) -> Result<Self> {
        let index = Self {
            genres: Table::build(EntityKind::Genre, data.genres, |g| &g.id)?,
            roles: Table::build(EntityKind::Role, data.roles, |r| &r.id)?,
            artists: Table::build(EntityKind::Artist, data.artists, |a| &a.id)?,
            venues: Table::build(EntityKind::Venue, data.venues, |v| &v.id)?,
            groups: Table::build(EntityKind::ConcertGroup, data.groups, |g| &g.id)?,
            concerts: Table::build(EntityKind::Concert, data.concerts, |c| &c.id)?,
            categories: Table::build(EntityKind::TicketCategory, data.ticket_categories, |t| &t.id)?,
            version: 0,
        };

        index.validate_references()?;

        tracing::info!(
            concerts = index.concerts.rows.len(),
            ticket_categories = index.categories.rows.len(),
            artists = index.artists.rows.len(),
            venues = index.venues.rows.len(),
            "Catalog index built"
        );

        Ok(index)
    }

    fn validate_references(&self) -> Result<()> {
        for artist in &self.artists.rows {
            if let Some(genre) = artist.genres.iter().find(|g| !self.genres.contains(g)) {
                return Err(dangling(EntityKind::Artist, &artist.id, EntityKind::Genre, genre));
            }
        }

        for concert in &self.concerts.rows {
            if !self.venues.contains(&concert.venue_id) {
                return Err(dangling(EntityKind::Concert, &concert.id, EntityKind::Venue, &concert.venue_id));
            }
            if let Some(group) = concert.group_id.as_ref().filter(|g| !self.groups.contains(g)) {
                return Err(dangling(EntityKind::Concert, &concert.id, EntityKind::ConcertGroup, group));
            }
            for slot in &concert.lineup {
                if !self.artists.contains(&slot.artist_id) {
                    return Err(dangling(EntityKind::Concert, &concert.id, EntityKind::Artist, &slot.artist_id));
                }
                if !self.roles.contains(&slot.role_id) {
                    return Err(dangling(EntityKind::Concert, &concert.id, EntityKind::Role, &slot.role_id));
                }
            }

            let mut listed = HashSet::with_capacity(concert.ticket_category_ids.len());
            for category_id in &concert.ticket_category_ids {
                let Some(category) = self.categories.get(category_id) else {
                    return Err(dangling(EntityKind::Concert, &concert.id, EntityKind::TicketCategory, category_id));
                };
                if category.concert_id != concert.id {
                    return Err(StorefrontError::config(format!(
                        "concert {} lists ticket category {} which belongs to concert {}",
                        concert.id, category_id, category.concert_id
                    )));
                }
                if !listed.insert(category_id) {
                    return Err(StorefrontError::config(format!(
                        "concert {} lists ticket category {} twice",
                        concert.id, category_id
                    )));
                }
            }
        }

        for category in &self.categories.rows {
            let Some(concert) = self.concerts.get(&category.concert_id) else {
                return Err(dangling(
                    EntityKind::TicketCategory,
                    &category.id,
                    EntityKind::Concert,
                    &category.concert_id,
                ));
            };
            if !concert.ticket_category_ids.contains(&category.id) {
                return Err(StorefrontError::config(format!(
                    "ticket category {} is not listed by its concert {}",
                    category.id, concert.id
                )));
            }
        }

        Ok(())
    }

    // ------------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------------

    /// Looks up an entity of any kind.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::NotFound`] for an unknown id, or for a kind
    /// the catalog does not hold (orders, customers).
    pub fn by_id(&self, kind: EntityKind, id: &str) -> Result<EntityRef<'_>> {
        let found = match kind {
            EntityKind::Genre => self.genres.get(&id.into()).map(EntityRef::Genre),
            EntityKind::Role => self.roles.get(&id.into()).map(EntityRef::Role),
            EntityKind::Artist => self.artists.get(&id.into()).map(EntityRef::Artist),
            EntityKind::Venue => self.venues.get(&id.into()).map(EntityRef::Venue),
            EntityKind::ConcertGroup => self.groups.get(&id.into()).map(EntityRef::ConcertGroup),
            EntityKind::Concert => self.concerts.get(&id.into()).map(EntityRef::Concert),
            EntityKind::TicketCategory => self.categories.get(&id.into()).map(EntityRef::TicketCategory),
            EntityKind::Order | EntityKind::Customer => None,
        };
        found.ok_or_else(|| StorefrontError::not_found(kind, id))
    }

    /// Looks up a genre.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::NotFound`] for an unknown id.
    pub fn genre(&self, id: &GenreId) -> Result<&Genre> {
        self.genres.get(id).ok_or_else(|| StorefrontError::not_found(EntityKind::Genre, id))
    }

    /// Looks up a role.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::NotFound`] for an unknown id.
    pub fn role(&self, id: &RoleId) -> Result<&Role> {
        self.roles.get(id).ok_or_else(|| StorefrontError::not_found(EntityKind::Role, id))
    }

    /// Looks up an artist.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::NotFound`] for an unknown id.
    pub fn artist(&self, id: &ArtistId) -> Result<&Artist> {
        self.artists.get(id).ok_or_else(|| StorefrontError::not_found(EntityKind::Artist, id))
    }

    /// Looks up a venue.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::NotFound`] for an unknown id.
    pub fn venue(&self, id: &VenueId) -> Result<&Venue> {
        self.venues.get(id).ok_or_else(|| StorefrontError::not_found(EntityKind::Venue, id))
    }

    /// Looks up a concert group.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::NotFound`] for an unknown id.
    pub fn group(&self, id: &ConcertGroupId) -> Result<&ConcertGroup> {
        self.groups.get(id).ok_or_else(|| StorefrontError::not_found(EntityKind::ConcertGroup, id))
    }

    /// Looks up a concert.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::NotFound`] for an unknown id.
    pub fn concert(&self, id: &ConcertId) -> Result<&Concert> {
        self.concerts.get(id).ok_or_else(|| StorefrontError::not_found(EntityKind::Concert, id))
    }

    /// Looks up a ticket category.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::NotFound`] for an unknown id.
    pub fn ticket_category(&self, id: &TicketCategoryId) -> Result<&TicketCategory> {
        self.categories
            .get(id)
            .ok_or_else(|| StorefrontError::not_found(EntityKind::TicketCategory, id))
    }

    /// Current price of a ticket category.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::NotFound`] for an unknown id.
    pub fn price(&self, id: &TicketCategoryId) -> Result<Money> {
        self.ticket_category(id).map(|category| category.price)
    }

    /// Current inventory ceiling of a ticket category.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::NotFound`] for an unknown id.
    pub fn inventory(&self, id: &TicketCategoryId) -> Result<u32> {
        self.ticket_category(id).map(|category| category.inventory)
    }

    // ------------------------------------------------------------------------
    // Listings
    // ------------------------------------------------------------------------

    /// All concerts in dataset order
    #[must_use]
    pub fn concerts(&self) -> &[Concert] {
        &self.concerts.rows
    }

    /// All genres in dataset order
    #[must_use]
    pub fn genres(&self) -> &[Genre] {
        &self.genres.rows
    }

    /// All venues in dataset order
    #[must_use]
    pub fn venues(&self) -> &[Venue] {
        &self.venues.rows
    }

    /// All ticket categories in dataset order
    #[must_use]
    pub fn ticket_categories(&self) -> &[TicketCategory] {
        &self.categories.rows
    }

    /// Resolves a concert's lineup into (artist, role) pairs, in lineup order.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::NotFound`] if the concert was not built by
    /// this index and references unknown artists or roles.
    pub fn resolved_lineup<'a>(&'a self, concert: &Concert) -> Result<Vec<(&'a Artist, &'a Role)>> {
        concert
            .lineup
            .iter()
            .map(|slot| Ok((self.artist(&slot.artist_id)?, self.role(&slot.role_id)?)))
            .collect()
    }

    /// Name of the concert's series, or [`STANDALONE_GROUP`].
    #[must_use]
    pub fn group_name(&self, concert: &Concert) -> &str {
        concert
            .group_id
            .as_ref()
            .and_then(|id| self.groups.get(id))
            .map_or(STANDALONE_GROUP, |group| group.name.as_str())
    }

    /// Ticket categories of a concert, in listed order.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::NotFound`] for a category the index does
    /// not hold.
    pub fn categories_for(&self, concert: &Concert) -> Result<Vec<&TicketCategory>> {
        concert
            .ticket_category_ids
            .iter()
            .map(|id| self.ticket_category(id))
            .collect()
    }

    /// Dataset version, bumped on every catalog mutation.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Overwrites a category's inventory (external restock or reduction).
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::NotFound`] for an unknown id.
    pub fn set_inventory(&mut self, id: &TicketCategoryId, inventory: u32) -> Result<()> {
        let category = self.category_mut(id)?;
        tracing::info!(category = %id, from = category.inventory, to = inventory, "Inventory adjusted");
        category.inventory = inventory;
        self.version += 1;
        Ok(())
    }

    /// Overwrites a category's price. Committed orders keep the price they
    /// captured.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::NotFound`] for an unknown id.
    pub fn set_price(&mut self, id: &TicketCategoryId, price: Money) -> Result<()> {
        let category = self.category_mut(id)?;
        tracing::info!(category = %id, from = %category.price, to = %price, "Price adjusted");
        category.price = price;
        self.version += 1;
        Ok(())
    }

    /// Removes every item's quantity from its category. Only checkout calls
    /// this, after validating every line.
    ///
    /// All-or-nothing: quantities are summed per category and checked
    /// against inventory before any category is touched.
    pub(crate) fn decrement_inventory(&mut self, items: &[OrderItem]) -> Result<()> {
        let mut requested: Vec<(&TicketCategoryId, u32)> = Vec::with_capacity(items.len());
        for item in items {
            match requested.iter_mut().find(|(id, _)| *id == &item.category_id) {
                Some((_, quantity)) => *quantity = quantity.saturating_add(item.quantity),
                None => requested.push((&item.category_id, item.quantity)),
            }
        }

        for &(id, quantity) in &requested {
            let available = self.inventory(id)?;
            if quantity > available {
                return Err(StorefrontError::InventoryExceeded {
                    category: id.clone(),
                    requested: quantity,
                    available,
                });
            }
        }

        for (id, quantity) in requested {
            let category = self.category_mut(id)?;
            category.inventory -= quantity;
        }
        self.version += 1;
        Ok(())
    }

    fn category_mut(&mut self, id: &TicketCategoryId) -> Result<&mut TicketCategory> {
        self.categories
            .get_mut(id)
            .ok_or_else(|| StorefrontError::not_found(EntityKind::TicketCategory, id))
    }
}

fn dangling(
    owner_kind: EntityKind,
    owner: &impl std::fmt::Display,
    target_kind: EntityKind,
    target: &impl std::fmt::Display,
) -> StorefrontError {
    StorefrontError::config(format!(
        "{owner_kind} {owner} references unknown {target_kind} {target}"
    ))
}
