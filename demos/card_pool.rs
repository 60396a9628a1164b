//! Example demonstrating a recency pool of rendered cards.
//!
//! Run with: RUST_LOG=cardpool=debug cargo run --example card_pool

use std::sync::Arc;

use cardpool::builder::PoolBuilder;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Card {
    title: String,
    body: String,
}

fn render(name: &String, body: &str) -> Result<Card, String> {
    if body.is_empty() {
        return Err(format!("card {name} has no content"));
    }
    Ok(Card {
        title: name.to_uppercase(),
        body: body.to_string(),
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cardpool=debug")),
        )
        .init();

    println!("=== Card Pool Example ===\n");

    let mut pool = PoolBuilder::new(4).build::<String, &str, _>(render);
    println!(
        "capacity {} (reserved for stateful cards: {})\n",
        pool.capacity(),
        pool.protected_capacity()
    );

    // 1. Build cards on first use
    println!("1. Building cards");
    for (name, body) in [
        ("inbox", "3 unread"),
        ("editor", "draft.txt"),
        ("weather", "sunny"),
        ("clock", "12:00"),
    ] {
        let card = pool.fetch(&name.to_string(), Some(body)).unwrap().unwrap();
        println!("   built {} -> {}", card.title, card.body);
    }
    println!();

    // 2. The editor holds unsaved input, so flag it stateful
    println!("2. Flagging the editor stateful");
    let editor = "editor".to_string();
    let held: Arc<Card> = pool.fetch(&editor, None).unwrap().unwrap();
    pool.mark_stateful(&editor, Arc::clone(&held));
    println!("   editor protected? {}", pool.is_protected(&editor));
    println!();

    // 3. New cards push out the least recently used plain ones
    println!("3. Overflowing the pool");
    for name in ["news", "music", "maps"] {
        pool.fetch(&name.to_string(), Some("fresh")).unwrap();
    }
    let order: Vec<_> = pool.recency_order().cloned().collect();
    println!("   order (oldest first): {order:?}");
    println!("   editor still cached? {}", pool.contains(&editor));
    println!();

    // 4. Construction failure leaves the pool untouched
    println!("4. Failed construction");
    match pool.fetch(&"broken".to_string(), Some("")) {
        Ok(_) => println!("   unexpected success"),
        Err(err) => println!("   factory error: {err}"),
    }
    println!("   pool size still {}", pool.len());
    println!();

    // 5. A reference held elsewhere can bring an evicted card back
    println!("5. Reviving an evicted card");
    let inbox = "inbox".to_string();
    println!("   inbox cached? {}", pool.contains(&inbox));
    let saved = Arc::new(Card {
        title: "INBOX".to_string(),
        body: "restored".to_string(),
    });
    pool.mark_stateful(&inbox, saved);
    println!(
        "   inbox cached? {} (body: {})",
        pool.contains(&inbox),
        pool.peek(&inbox).map_or("-", |card| card.body.as_str())
    );
}
