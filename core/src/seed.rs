//! Bundled demonstration dataset.
//!
//! Three concerts across three venues, seven ticket categories. Concert dates
//! are placed one, three and five weeks after the anchor time.

use chrono::{DateTime, Duration, Utc};

use crate::catalog::CatalogData;
use crate::types::{
    Artist, Concert, ConcertGroup, Genre, LineupSlot, Money, Role, TicketCategory, Venue,
};

/// Seed dataset anchored at the current time.
#[must_use]
pub fn seed_data() -> CatalogData {
    seed_data_at(Utc::now())
}

/// Seed dataset with concert dates relative to `anchor`.
#[must_use]
pub fn seed_data_at(anchor: DateTime<Utc>) -> CatalogData {
    CatalogData {
        genres: vec![
            genre("g1", "Pop"),
            genre("g2", "Rock"),
            genre("g3", "Electronic"),
            genre("g4", "Classical"),
            genre("g5", "Hip-Hop"),
        ],
        roles: vec![
            role("r1", "Headliner"),
            role("r2", "Opener"),
            role("r3", "Guest"),
            role("r4", "Conductor"),
        ],
        artists: vec![
            artist("a1", "Neon Dunes", &["g2", "g3"]),
            artist("a2", "Aurora Vale", &["g1"]),
            artist("a3", "Metro Echo", &["g3"]),
            artist("a4", "Civic Symphony", &["g4"]),
        ],
        venues: vec![
            venue("v1", "Harbor Pavilion", "Brooklyn, NY", 8500),
            venue("v2", "Cedar Hall", "Boston, MA", 2200),
            venue("v3", "Skyline Bowl", "Chicago, IL", 12000),
        ],
        groups: vec![
            ConcertGroup {
                id: "cg1".into(),
                name: "Summer Nights Series".to_string(),
            },
            ConcertGroup {
                id: "cg2".into(),
                name: "Orchestral Sundays".to_string(),
            },
        ],
        concerts: vec![
            Concert {
                id: "c1".into(),
                title: "Neon Dunes: Live at the Harbor".to_string(),
                date: anchor + Duration::days(7),
                venue_id: "v1".into(),
                group_id: Some("cg1".into()),
                lineup: vec![slot("a1", "r1"), slot("a3", "r2")],
                ticket_category_ids: vec!["tc1".into(), "tc2".into(), "tc3".into()],
            },
            Concert {
                id: "c2".into(),
                title: "Aurora Vale: Moonlight Tour".to_string(),
                date: anchor + Duration::days(21),
                venue_id: "v3".into(),
                group_id: None,
                lineup: vec![slot("a2", "r1"), slot("a3", "r3")],
                ticket_category_ids: vec!["tc4".into(), "tc5".into()],
            },
            Concert {
                id: "c3".into(),
                title: "Civic Symphony plays Beethoven 7".to_string(),
                date: anchor + Duration::days(35),
                venue_id: "v2".into(),
                group_id: Some("cg2".into()),
                lineup: vec![slot("a4", "r4")],
                ticket_category_ids: vec!["tc6".into(), "tc7".into()],
            },
        ],
        ticket_categories: vec![
            category("tc1", "c1", "VIP Pit", 169, 25),
            category("tc2", "c1", "Floor GA", 95, 260),
            category("tc3", "c1", "Balcony", 65, 180),
            category("tc4", "c2", "Gold", 145, 120),
            category("tc5", "c2", "Silver", 85, 350),
            category("tc6", "c3", "Orchestra", 120, 200),
            category("tc7", "c3", "Mezzanine", 75, 180),
        ],
    }
}

fn genre(id: &str, name: &str) -> Genre {
    Genre {
        id: id.into(),
        name: name.to_string(),
    }
}

fn role(id: &str, name: &str) -> Role {
    Role {
        id: id.into(),
        name: name.to_string(),
    }
}

fn artist(id: &str, name: &str, genres: &[&str]) -> Artist {
    Artist {
        id: id.into(),
        name: name.to_string(),
        genres: genres.iter().map(|&g| g.into()).collect(),
    }
}

fn venue(id: &str, name: &str, city: &str, capacity: u32) -> Venue {
    Venue {
        id: id.into(),
        name: name.to_string(),
        city: city.to_string(),
        capacity,
    }
}

fn slot(artist_id: &str, role_id: &str) -> LineupSlot {
    LineupSlot {
        artist_id: artist_id.into(),
        role_id: role_id.into(),
    }
}

fn category(id: &str, concert_id: &str, name: &str, dollars: u64, inventory: u32) -> TicketCategory {
    TicketCategory {
        id: id.into(),
        concert_id: concert_id.into(),
        name: name.to_string(),
        price: Money::from_dollars(dollars),
        inventory,
        row: None,
    }
}
