//! # Seed Data Generator
//!
//! Populates an empty catalog with sample books for development.
//!
//! ## Usage
//! ```bash
//! # 50 books (default)
//! cargo run -p shelf-db --bin seed
//!
//! # Custom amount
//! cargo run -p shelf-db --bin seed -- --count 200
//!
//! # Specify database path
//! cargo run -p shelf-db --bin seed -- --db ./data/shelf.db
//! ```
//!
//! Every fourth book is reserved through the Catalog Service, so the seeded
//! database has reservation history too.

use std::env;

use shelf_core::NewBook;
use shelf_db::{CatalogService, Database, DbConfig, Repository};
use tracing_subscriber::EnvFilter;

/// (title, author) pairs; cycled with an edition suffix past the end.
const TITLES: &[(&str, &str)] = &[
    ("Dune", "Frank Herbert"),
    ("Emma", "Jane Austen"),
    ("Ulysses", "James Joyce"),
    ("Middlemarch", "George Eliot"),
    ("Beloved", "Toni Morrison"),
    ("Neuromancer", "William Gibson"),
    ("The Left Hand of Darkness", "Ursula K. Le Guin"),
    ("Invisible Cities", "Italo Calvino"),
    ("Things Fall Apart", "Chinua Achebe"),
    ("The Master and Margarita", "Mikhail Bulgakov"),
    ("Pedro Páramo", "Juan Rulfo"),
    ("Solaris", "Stanisław Lem"),
    ("Kindred", "Octavia E. Butler"),
    ("The Name of the Rose", "Umberto Eco"),
    ("Snow Country", "Yasunari Kawabata"),
    ("Moby-Dick", "Herman Melville"),
];

const READERS: &[&str] = &["Alice", "Bob", "Carol", "Dave", "Erin"];

fn sample_book(index: usize) -> NewBook {
    let (title, author) = TITLES[index % TITLES.len()];
    let edition = index / TITLES.len();
    if edition == 0 {
        NewBook::new(title, author)
    } else {
        NewBook::new(format!("{title} (copy {})", edition + 1), author)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 50;
    let mut db_path = String::from("./shelf_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(50);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Shelf Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of books to generate (default: 50)");
                println!("  -d, --db <PATH>    Database file path (default: ./shelf_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    println!("Shelf Seed Data Generator");
    println!("=========================");
    println!("Database: {}", db_path);
    println!("Books:    {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = {
        let mut conn = db.connection().await?;
        shelf_db::BookRepository::new(&mut conn).count().await?
    };
    if existing > 0 {
        println!("⚠ Database already has {} books", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let catalog = CatalogService::new(db);
    let start = std::time::Instant::now();
    let mut generated = 0;
    let mut reserved = 0;

    for index in 0..count {
        let book = match catalog.add(sample_book(index)).await {
            Ok(book) => book,
            Err(e) => {
                eprintln!("Failed to insert book #{}: {}", index, e);
                continue;
            }
        };
        generated += 1;

        if index % 4 == 0 {
            let reader = READERS[(index / 4) % READERS.len()];
            catalog.reserve(book.id, &format!("for {reader}")).await?;
            reserved += 1;
        }
    }

    println!();
    println!(
        "✓ Generated {} books ({} reserved) in {:?}",
        generated,
        reserved,
        start.elapsed()
    );

    let available = catalog.list_available().await?.len();
    println!("  Available: {}", available);
    println!("  Reserved:  {}", catalog.list_reserved().await?.len());

    catalog.database().close().await;
    Ok(())
}
