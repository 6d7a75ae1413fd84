//! String-backed enums stored in `VARCHAR` columns.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `transactions.kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money coming in.
    #[sea_orm(string_value = "income")]
    Income,
    /// Money going out.
    #[sea_orm(string_value = "expense")]
    Expense,
}

/// `transactions.payment_method`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash.
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Credit card.
    #[sea_orm(string_value = "credit_card")]
    CreditCard,
    /// Debit card.
    #[sea_orm(string_value = "debit_card")]
    DebitCard,
    /// Bank transfer.
    #[sea_orm(string_value = "bank_transfer")]
    BankTransfer,
    /// Digital wallet.
    #[sea_orm(string_value = "digital_wallet")]
    DigitalWallet,
    /// Anything else.
    #[sea_orm(string_value = "other")]
    Other,
}

/// `transactions.recurring_frequency`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum RecurringFrequency {
    /// Every day.
    #[sea_orm(string_value = "daily")]
    Daily,
    /// Every week.
    #[sea_orm(string_value = "weekly")]
    Weekly,
    /// Every month.
    #[sea_orm(string_value = "monthly")]
    Monthly,
    /// Every year.
    #[sea_orm(string_value = "yearly")]
    Yearly,
}
