//! Storefront Demo
//!
//! Walks the storefront core through one shopping session:
//! - Browse concerts by text, genre and venue
//! - Fill a cart (including a clamped add and a rejected quantity)
//! - Check out, then show an oversell rejection and its recovery
//!
//! # Usage
//!
//! ```bash
//! cargo run -p storefront-demo
//!
//! # Use another dataset
//! MARQUEE_CATALOG_PATH=catalog.json cargo run -p storefront-demo
//! ```

use marquee_core::{
    CustomerInfo, FilterQuery, Storefront, StorefrontConfig, StorefrontError, TicketCategoryId,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = StorefrontConfig::from_env();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("\n🎫 ============================================");
    println!("   Marquee Storefront - Demo");
    println!("============================================\n");

    let data = config.load_catalog()?;
    let storefront = match Storefront::open(data) {
        Ok(storefront) => storefront,
        Err(err) => {
            tracing::error!(error = %err, "Catalog failed integrity checks");
            return Err(err.into());
        }
    };

    // ========== Browse ==========

    println!("1️⃣  Browsing concerts");
    let queries = [
        ("everything", FilterQuery::from_form("", "all", "all")),
        ("Electronic", FilterQuery::from_form("", "g3", "all")),
        ("\"harbor\"", FilterQuery::from_form("harbor", "all", "all")),
    ];
    for (label, query) in &queries {
        let concerts = storefront.browse(query);
        println!("   {label}: {} concert(s)", concerts.len());
        storefront.read_catalog(|index| {
            for concert in &concerts {
                let venue = index
                    .venue(&concert.venue_id)
                    .map_or("?", |venue| venue.name.as_str());
                println!(
                    "     • {} @ {} [{}]",
                    concert.title,
                    venue,
                    index.group_name(concert)
                );
            }
        });
    }

    // ========== Cart ==========

    println!("\n2️⃣  Filling the cart");
    let mut session = storefront.session();
    let vip = TicketCategoryId::from("tc1");
    let floor = TicketCategoryId::from("tc2");

    session.add_line(&floor, config.default_add_quantity)?;
    session.add_line(&floor, 1)?;
    let clamped = session.add_line(&vip, 30)?;
    println!("   VIP Pit request for 30 clamped to {clamped}");

    if let Err(err) = session.set_quantity(&vip, 0) {
        println!("   Setting VIP Pit to 0 rejected: {err}");
    }
    session.set_quantity(&vip, 4)?;

    for line in session.cart().lines() {
        println!(
            "   {} × {} = {}",
            line.category_id,
            line.quantity,
            session.line_total(&line.category_id)?
        );
    }
    println!("   Cart total: {}", session.cart_total()?);

    // ========== Checkout ==========

    println!("\n3️⃣  Checking out");
    let ada = CustomerInfo::new("Ada Lovelace", "ada@example.com");
    let order = session.checkout(&ada)?;
    println!(
        "   ✓ Order {} at {}: {} ticket(s), {}",
        order.id,
        order.created_at_iso(),
        order.ticket_count(),
        order.total
    );

    // ========== Oversell ==========

    println!("\n4️⃣  Competing for the last VIP seats");
    let mut late = storefront.session();
    late.add_line(&vip, 5)?;
    storefront.write_catalog(|index| index.set_inventory(&vip, 2))?;

    let alan = CustomerInfo::new("Alan Turing", "alan@example.com");
    match late.checkout(&alan) {
        Err(StorefrontError::InventoryExceeded { category, requested, available }) => {
            println!("   ✗ {category}: wanted {requested}, only {available} left");
            let changed = late.reclamp();
            println!("   Reclamped {} line(s); retrying", changed.len());
            let order = late.checkout(&alan)?;
            println!("   ✓ Order {}: {}", order.id, order.total);
        }
        Err(err) => return Err(err.into()),
        Ok(order) => println!("   ✓ Order {}: {}", order.id, order.total),
    }

    // ========== Ledger ==========

    let ledger = storefront.ledger();
    println!("\n📒 {} order(s), {} customer(s), revenue {}", ledger.orders().len(), ledger.customers().len(), ledger.revenue());

    println!("\n✨ Demo complete\n");
    Ok(())
}
