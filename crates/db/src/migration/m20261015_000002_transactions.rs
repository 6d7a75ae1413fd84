//! Transactions table.
//!
//! Enum-like columns are `VARCHAR` guarded by `CHECK` constraints so the
//! entity enums map without Postgres enum casts.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(TRANSACTIONS_SQL).await?;
        db.execute_unprepared(TRANSACTION_INDEXES_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS transactions CASCADE;")
            .await?;
        Ok(())
    }
}

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    date DATE NOT NULL,
    description VARCHAR(200) NOT NULL,
    amount NUMERIC(14, 2) NOT NULL,
    category VARCHAR(50) NOT NULL,
    kind VARCHAR(16) NOT NULL,
    tags JSONB NOT NULL DEFAULT '[]'::jsonb,
    notes VARCHAR(500),
    payment_method VARCHAR(32),
    is_recurring BOOLEAN NOT NULL DEFAULT false,
    recurring_frequency VARCHAR(16),
    next_recurring_date DATE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_transactions_amount CHECK (amount >= 0.01),
    CONSTRAINT chk_transactions_kind CHECK (kind IN ('income', 'expense')),
    CONSTRAINT chk_transactions_payment_method CHECK (
        payment_method IS NULL OR payment_method IN (
            'cash', 'credit_card', 'debit_card', 'bank_transfer', 'digital_wallet', 'other'
        )
    ),
    CONSTRAINT chk_transactions_frequency CHECK (
        recurring_frequency IS NULL
        OR recurring_frequency IN ('daily', 'weekly', 'monthly', 'yearly')
    ),
    CONSTRAINT chk_transactions_recurrence CHECK (
        (is_recurring AND recurring_frequency IS NOT NULL AND next_recurring_date IS NOT NULL)
        OR (NOT is_recurring AND recurring_frequency IS NULL AND next_recurring_date IS NULL)
    )
);
";

const TRANSACTION_INDEXES_SQL: &str = r"
-- Default listing: newest first per owner
CREATE INDEX idx_transactions_user_date ON transactions(user_id, date DESC, id);

-- Category and type breakdowns
CREATE INDEX idx_transactions_user_category ON transactions(user_id, category);
CREATE INDEX idx_transactions_user_kind ON transactions(user_id, kind, date);
";
