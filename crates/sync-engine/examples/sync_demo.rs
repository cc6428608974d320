// crates/sync-engine/examples/sync_demo.rs
//! Demonstration of snapshot-driven synchronization

use octlib_core::{defaults, BookPatch, Collection};
use octlib_preferences::MemoryKeyValueStore;
use octlib_sync_engine::{
    Connection, DeleteOutcome, Delivery, LibrarySite, MemoryStore, SiteOptions,
};
use std::sync::Arc;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("OctLib Sync Demo");
    println!("================\n");

    demo_cold_start();
    println!();
    demo_round_trip();
    println!();
    demo_disconnected();
}

fn demo_cold_start() {
    println!("1. Cold start on an empty store");
    println!("-------------------------------");

    let store = MemoryStore::new();
    let site = LibrarySite::start(
        Connection::Connected(Arc::new(store.clone())),
        Arc::new(MemoryKeyValueStore::new()),
        SiteOptions::default(),
    );

    let view = site.view();
    println!("  ✓ {} writes issued while seeding", store.write_count());
    println!("  ✓ {} books, {} notices", view.books.len(), view.notices.len());
    for book in view.feature_books() {
        println!("    feature: {} / {}", book.title, book.author);
    }
}

fn demo_round_trip() {
    println!("2. Writes come back as snapshots");
    println!("--------------------------------");

    let store = MemoryStore::with_delivery(Delivery::Deferred);
    let site = LibrarySite::start(
        Connection::Connected(Arc::new(store.clone())),
        Arc::new(MemoryKeyValueStore::new()),
        SiteOptions::default(),
    );
    while store.pending_count() > 0 {
        if let Err(e) = store.deliver_pending() {
            println!("  ✗ delivery failed: {}", e);
            return;
        }
    }

    let Some(book) = site.view().books.into_iter().find(|b| b.is_new) else {
        println!("  ✗ no new books");
        return;
    };
    let patch = BookPatch {
        is_new: Some(false),
        ..Default::default()
    };
    match site.gateway().update(&book.id, &patch) {
        Ok(()) => println!("  ✓ Update sent for {}", book.title),
        Err(e) => println!("  ✗ {}", e),
    }
    println!("    before delivery: isNew = {}", site.view().book(&book.id).is_some_and(|b| b.is_new));
    let _ = store.deliver_pending();
    println!("    after delivery:  isNew = {}", site.view().book(&book.id).is_some_and(|b| b.is_new));

    let notice = site.view().notices[0].id.clone();
    for _ in 0..2 {
        match site.gateway().delete(Collection::Notices, &notice, &|_: &str| true) {
            Ok(DeleteOutcome::Deleted) => println!("  ✓ Notice deleted"),
            Ok(outcome) => println!("  ✓ Notice: {:?}", outcome),
            Err(e) => println!("  ✗ {}", e),
        }
    }
}

fn demo_disconnected() {
    println!("3. No store configured");
    println!("----------------------");

    let site = LibrarySite::start(
        Connection::Unavailable,
        Arc::new(MemoryKeyValueStore::new()),
        SiteOptions::default(),
    );
    println!("  ✓ {} built-in books shown", site.view().books.len());
    if let Err(e) = site.gateway().add_entity(&defaults::new_book()) {
        println!("  ✗ {}", e);
    }
}
