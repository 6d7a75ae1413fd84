//! Database seeder for Fintrack development and testing.
//!
//! Seeds a demo user and a year of sample transactions so the list and
//! statistics endpoints have something to show.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::{Datelike, Months, NaiveDate, Utc};
use fintrack_core::auth::{Registration, hash_password};
use fintrack_core::transaction::{TransactionDraft, TransactionService};
use fintrack_core::user::User;
use fintrack_db::Storage;
use fintrack_shared::config::DatabaseConfig;
use fintrack_shared::types::UserId;
use rust_decimal::Decimal;

/// Demo account credentials.
const DEMO_EMAIL: &str = "demo@fintrack.dev";
const DEMO_PASSWORD: &str = "demo1234";

/// `(day of month, type, category, description, amount in cents, payment method)`
const MONTHLY_ENTRIES: &[(u32, &str, &str, &str, i64, &str)] = &[
    (1, "income", "Salary", "Monthly salary", 420_000, "bank_transfer"),
    (2, "expense", "Rent", "Apartment rent", 135_000, "bank_transfer"),
    (5, "expense", "Utilities", "Electricity and water", 8_940, "debit_card"),
    (9, "expense", "Groceries", "Weekly groceries", 11_275, "debit_card"),
    (14, "expense", "Dining", "Dinner out", 4_850, "credit_card"),
    (18, "expense", "Transport", "Metro card top-up", 3_000, "digital_wallet"),
    (23, "expense", "Groceries", "Weekly groceries", 9_860, "cash"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    println!("Connecting to database...");
    let storage = Storage::connect(&DatabaseConfig {
        url,
        ..DatabaseConfig::default()
    })
    .await
    .context("failed to connect to database")?;

    println!("Seeding demo user...");
    let owner = seed_demo_user(&storage).await?;

    println!("Seeding transactions...");
    let service = TransactionService::new(storage.transactions());
    let created = seed_transactions(&service, owner).await?;
    println!("  Created {created} transactions");

    storage.close().await?;
    println!("Seeding complete!");
    Ok(())
}

/// Returns the demo user's id, creating the account if needed.
async fn seed_demo_user(storage: &Storage) -> anyhow::Result<UserId> {
    let users = storage.users();
    if let Some(existing) = users.find_by_email(DEMO_EMAIL).await? {
        println!("  Demo user already exists, skipping...");
        return Ok(existing.id);
    }

    let registration = Registration {
        name: "Demo User".to_string(),
        email: DEMO_EMAIL.to_string(),
        password: DEMO_PASSWORD.to_string(),
    };
    let hash = hash_password(&registration.password)?;
    let user = users.insert(User::new(registration, hash, Utc::now())).await?;

    println!("  Created {DEMO_EMAIL} / {DEMO_PASSWORD}");
    Ok(user.id)
}

/// Twelve months of entries ending with the current month.
async fn seed_transactions(service: &TransactionService, owner: UserId) -> anyhow::Result<usize> {
    let today = Utc::now().date_naive();
    let this_month = NaiveDate::from_ymd_opt(today.year(), today.month(), 1)
        .context("invalid current month")?;

    let mut created = 0;
    for back in (0..12).rev() {
        let month = this_month
            .checked_sub_months(Months::new(back))
            .context("month out of range")?;

        for &(day, kind, category, description, cents, method) in MONTHLY_ENTRIES {
            let Some(date) = month.with_day(day) else {
                continue;
            };
            let is_rent = category == "Rent";
            let draft = TransactionDraft {
                date: Some(date.to_string()),
                description: Some(description.to_string()),
                amount: Some(Decimal::new(cents, 2)),
                category: Some(category.to_string()),
                kind: Some(kind.to_string()),
                tags: vec![category.to_lowercase()],
                payment_method: Some(method.to_string()),
                is_recurring: is_rent,
                recurring_frequency: is_rent.then(|| "monthly".to_string()),
                next_recurring_date: is_rent
                    .then(|| date.checked_add_months(Months::new(1)))
                    .flatten()
                    .map(|d| d.to_string()),
                ..TransactionDraft::default()
            };
            service.create(owner, &draft).await?;
            created += 1;
        }
    }
    Ok(created)
}
