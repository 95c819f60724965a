//! # Seed Data Generator
//!
//! Populates an empty database with sample customers, suppliers,
//! categories and products for local development.
//!
//! ## Usage
//! ```bash
//! # Seed ./storehouse_dev.db with 20 products per category (default)
//! cargo run -p storehouse-db --bin seed
//!
//! # Custom size and path
//! cargo run -p storehouse-db --bin seed -- --count 50 --db ./data/storehouse.db
//! ```
//!
//! Products start with zero stock. Opening stock is booked through one
//! purchase invoice per category, so the ledger explains every unit on hand.

use std::env;
use storehouse_core::{
    ContactDetails, InvoiceDraft, InvoiceHeader, LineItem, Money, NewProduct, MAX_INVOICE_LINES,
};
use storehouse_db::{Database, DbConfig};

/// Product categories: (code prefix, category, unit, names)
const CATEGORIES: &[(&str, &str, &str, &[&str])] = &[
    (
        "HW",
        "Hardware",
        "piece",
        &[
            "Hex Bolt M8",
            "Hex Nut M8",
            "Wood Screw 40mm",
            "Wall Plug 8mm",
            "Hinge 75mm",
            "Door Handle",
            "Padlock 40mm",
            "Cable Tie 200mm",
            "Washer M8",
            "Shelf Bracket",
        ],
    ),
    (
        "OF",
        "Office Supplies",
        "box",
        &[
            "A4 Paper",
            "Ballpoint Pens",
            "Stapler Pins",
            "Paper Clips",
            "Sticky Notes",
            "Envelopes C4",
            "Printer Toner",
            "File Folders",
            "Highlighters",
            "Notebooks",
        ],
    ),
    (
        "CL",
        "Cleaning",
        "liter",
        &[
            "Floor Cleaner",
            "Glass Cleaner",
            "Hand Soap",
            "Dish Liquid",
            "Bleach",
            "Disinfectant",
            "Degreaser",
            "Fabric Softener",
            "Air Freshener",
            "Surface Polish",
        ],
    ),
];

const CUSTOMERS: &[(&str, &str)] = &[
    ("Nile Trading", "customer"),
    ("Delta Builders", "dealer"),
    ("Cairo Office Hub", "customer"),
    ("Sunrise Hotels", "customer"),
];

const SUPPLIERS: &[(&str, &str)] = &[
    ("Alpha Hardware Supply", "CR-10021"),
    ("Paperline Distribution", "CR-20417"),
    ("CleanPro Wholesale", "CR-33904"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 20;
    let mut db_path = String::from("./storehouse_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(20);
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
                println!("Storehouse Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Products per category (default: 20)");
                println!("  -d, --db <PATH>    Database file path (default: ./storehouse_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    // Each category is booked on a single purchase invoice
    let count = count.min(MAX_INVOICE_LINES);

    println!("Storehouse Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!("Products per category: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database, migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    for (name, customer_type) in CUSTOMERS {
        db.customers()
            .create(&contact(name), Some(*customer_type))
            .await?;
    }
    println!("✓ {} customers", CUSTOMERS.len());

    let mut supplier_ids = Vec::with_capacity(SUPPLIERS.len());
    for (name, register) in SUPPLIERS {
        let supplier = db.suppliers().create(&contact(name), Some(*register)).await?;
        supplier_ids.push(supplier.id);
    }
    println!("✓ {} suppliers", SUPPLIERS.len());

    let start = std::time::Instant::now();
    let mut generated = 0;

    for (category_idx, (prefix, category_name, unit, names)) in CATEGORIES.iter().enumerate() {
        let category = db.categories().create(category_name, None).await?;
        let mut lines = Vec::new();

        for seq in 0..count {
            let name = names[seq % names.len()];
            let seed = category_idx * 1000 + seq;
            let mut product = generate_product(prefix, unit, name, seq, seed);
            product.category_id = Some(category.id);

            let created = match db.products().create(&product).await {
                Ok(created) => created,
                Err(e) => {
                    eprintln!("Failed to insert {}: {}", product.code, e);
                    continue;
                }
            };
            generated += 1;

            let opening = opening_stock(&created.name, created.min_stock, seed);
            lines.push(LineItem::new(created.id, opening, created.purchase_price()));
        }

        if lines.is_empty() {
            continue;
        }

        let draft = InvoiceDraft::purchase(
            InvoiceHeader {
                counterparty_id: supplier_ids[category_idx % supplier_ids.len()],
                notes: Some(format!("Opening stock: {prefix}")),
                ..Default::default()
            },
            Money::zero(),
            lines,
        );
        let purchase = db.engine().create(&draft).await?;
        println!(
            "  {} opening stock booked on {} (net {})",
            prefix, purchase.invoice_number, purchase.totals.net
        );
    }

    println!();
    println!("✓ Generated {} products in {:?}", generated, start.elapsed());

    let low = db.stock().low_stock().await?;
    println!("  {} products start at or below minimum stock", low.len());

    db.close().await;
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

fn contact(name: &str) -> ContactDetails {
    ContactDetails {
        name: name.to_string(),
        phone: Some(format!("+20 2 {:04} {:04}", name.len() * 97 % 10_000, name.len() * 31)),
        ..Default::default()
    }
}

/// Generates one product with deterministic pseudo-random values.
fn generate_product(prefix: &str, unit: &str, name: &str, seq: usize, seed: usize) -> NewProduct {
    // 1.50 - 49.49
    let purchase_cents = 150 + ((seed * 37) % 4_800) as i64;
    // 25% - 59% markup
    let markup_pct = 125 + (seed % 35) as i64;
    let selling_cents = purchase_cents * markup_pct / 100;

    let min_stock = 5 + (seed % 16) as i64;

    NewProduct {
        name: if seq < 10 {
            name.to_string()
        } else {
            format!("{} #{}", name, seq / 10 + 1)
        },
        code: format!("{}-{:04}", prefix, seq + 1),
        description: None,
        unit: Some(unit.to_string()),
        category_id: None,
        purchase_price: Money::from_cents(purchase_cents),
        selling_price: Money::from_cents(selling_cents),
        min_stock,
        max_stock: Some(min_stock * 6),
        current_stock: 0,
    }
}

/// Opening quantity; roughly one product in five starts low.
fn opening_stock(name: &str, min_stock: i64, seed: usize) -> i64 {
    if (seed + name.len()) % 5 == 0 {
        (min_stock / 2).max(1)
    } else {
        min_stock * 3
    }
}
