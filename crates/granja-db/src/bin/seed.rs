//! # Seed Data Generator
//!
//! Populates the database with store settings, demo users, and the catalog
//! for development.
//!
//! ## Usage
//! ```bash
//! # Seed with defaults
//! cargo run -p granja-db --bin seed
//!
//! # Specify database path
//! cargo run -p granja-db --bin seed -- --db ./data/granja.db
//!
//! # Seed the store closed (for testing the placement gate)
//! cargo run -p granja-db --bin seed -- --closed
//! ```
//!
//! ## Generated Data
//! - One settings row (open by default)
//! - A handful of demo customers
//! - The poultry catalog, including weight-based promotional bundles whose
//!   names carry the `Promoción <n>kg` marker the stock calculator parses

use chrono::Utc;
use std::env;
use uuid::Uuid;

use granja_core::{Product, StoreSettings, UserSummary};
use granja_db::{Database, DbConfig};

/// Catalog entries: (nombre, descripcion, precio, stock).
///
/// The promotional entries intentionally exercise both decimal separators
/// and both marker spellings.
const PRODUCTS: &[(&str, Option<&str>, f64, f64)] = &[
    ("Alas sueltas", Some("Alas de pollo por kg"), 1200.0, 80.0),
    ("Pata muslo", Some("Pata muslo fresco por kg"), 950.0, 120.0),
    ("Suprema", Some("Suprema de pollo por kg"), 2100.0, 60.0),
    ("Pollo entero", Some("Pollo entero fresco"), 3400.0, 45.0),
    ("Milanesas de pollo", Some("Milanesas listas para freír"), 2600.0, 50.0),
    ("Huevos x12", Some("Maple de 12 huevos"), 1800.0, 90.0),
    (
        "Promoción 3kg de Alas",
        Some("Bolsa promocional de alas"),
        3200.0,
        36.0,
    ),
    (
        "Promocion 3,5 kg Pata Muslo",
        Some("Bolsa promocional de pata muslo"),
        3000.0,
        28.0,
    ),
    (
        "Combo parrillero",
        Some("Promoción 5kg surtido para parrilla"),
        5500.0,
        20.0,
    ),
    // Low stock on purpose: shows up in the dashboard's critical list.
    ("Menudencias", Some("Bandeja de menudencias"), 700.0, 6.0),
];

/// Demo customers: (nombre, email, telefono).
const USERS: &[(&str, &str, Option<&str>)] = &[
    ("Ana García", "ana@granja.test", Some("+54 11 5555-0001")),
    ("Bruno Díaz", "bruno@granja.test", Some("+54 11 5555-0002")),
    ("Carla Méndez", "carla@granja.test", None),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./granja_dev.db");
    let mut open = true;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--closed" => {
                open = false;
            }
            "--help" | "-h" => {
                println!("Granja Pedidos Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./granja_dev.db)");
                println!("      --closed       Seed the store gate closed");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Granja Pedidos Seed Data Generator");
    println!("=====================================");
    println!("Database: {}", db_path);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    let (total, applied) = granja_db::migrations::migration_status(db.pool()).await?;
    println!("✓ Migrations applied ({applied}/{total})");

    // Check existing catalog
    let existing = db.products().count_active().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Settings row
    if db.settings().get().await?.is_none() {
        let now = Utc::now();
        db.settings()
            .insert(&StoreSettings {
                id: Uuid::new_v4().to_string(),
                esta_abierto: open,
                mensaje_alerta: if open {
                    None
                } else {
                    Some("Cerrado por mantenimiento".to_string())
                },
                costo_delivery: 500.0,
                direccion_local: Some("Av. Siempre Viva 742".to_string()),
                whatsapp_notificaciones: Some("+54 11 5555-9999".to_string()),
                updated_at: now,
            })
            .await?;
        println!("✓ Settings row created (abierto: {})", open);
    }

    // Demo users
    for (nombre, email, telefono) in USERS {
        db.users()
            .insert(&UserSummary {
                id: Uuid::new_v4().to_string(),
                nombre: nombre.to_string(),
                email: email.to_string(),
                telefono: telefono.map(str::to_string),
                direccion: None,
            })
            .await?;
    }
    println!("✓ Seeded {} users", USERS.len());

    // Catalog
    println!();
    println!("Seeding catalog...");

    let start = std::time::Instant::now();
    let now = Utc::now();

    for (nombre, descripcion, precio, stock) in PRODUCTS {
        let product = Product {
            id: Uuid::new_v4().to_string(),
            nombre: nombre.to_string(),
            descripcion: descripcion.map(str::to_string),
            precio: *precio,
            stock: *stock,
            activo: true,
            categoria_id: None,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = db.products().insert(&product).await {
            eprintln!("Failed to insert {}: {}", product.nombre, e);
        }
    }

    let elapsed = start.elapsed();
    println!("✓ Seeded {} products in {:?}", PRODUCTS.len(), elapsed);

    // Sanity check the promotional parser against the seeded names
    println!();
    println!("Verifying promotional markers...");
    for product in db.products().list_active().await? {
        let multiplier =
            granja_core::promo::stock_multiplier(&product.nombre, product.descripcion.as_deref());
        if multiplier != 1.0 {
            println!("  {} → {}kg per unit", product.nombre, multiplier);
        }
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
