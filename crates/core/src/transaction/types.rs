//! Transaction domain types.

use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use fintrack_shared::types::{TransactionId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money coming in.
    Income,
    /// Money going out.
    Expense,
}

impl TransactionKind {
    /// Parses a kind case-insensitively.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }

    /// Canonical lower-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a transaction was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash.
    Cash,
    /// Credit card.
    CreditCard,
    /// Debit card.
    DebitCard,
    /// Bank transfer.
    BankTransfer,
    /// Digital wallet (PayPal, Apple Pay, ...).
    DigitalWallet,
    /// Anything else.
    Other,
}

impl PaymentMethod {
    /// All variants, in display order.
    pub const ALL: [Self; 6] = [
        Self::Cash,
        Self::CreditCard,
        Self::DebitCard,
        Self::BankTransfer,
        Self::DigitalWallet,
        Self::Other,
    ];

    /// Parses a payment method case-insensitively.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let wanted = input.trim().to_lowercase();
        Self::ALL.into_iter().find(|m| m.as_str() == wanted)
    }

    /// Canonical snake_case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::CreditCard => "credit_card",
            Self::DebitCard => "debit_card",
            Self::BankTransfer => "bank_transfer",
            Self::DigitalWallet => "digital_wallet",
            Self::Other => "other",
        }
    }
}

/// How often a recurring transaction repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Every day.
    Daily,
    /// Every week.
    Weekly,
    /// Every month.
    Monthly,
    /// Every year.
    Yearly,
}

impl Frequency {
    /// Parses a frequency case-insensitively.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }

    /// Canonical lower-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

/// Recurrence metadata. Only present on recurring transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recurrence {
    /// Repeat interval.
    pub frequency: Frequency,
    /// Date the next occurrence is due.
    pub next_due_date: NaiveDate,
}

/// The user-editable content of a transaction, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionFields {
    /// Calendar date of the transaction.
    pub date: NaiveDate,
    /// Short description (trimmed, at most 200 characters).
    pub description: String,
    /// Positive amount with at most two decimal places.
    pub amount: Decimal,
    /// Category label (trimmed, at most 50 characters).
    pub category: String,
    /// Income or expense.
    pub kind: TransactionKind,
    /// Free-form labels.
    pub tags: Vec<String>,
    /// Optional notes.
    pub notes: Option<String>,
    /// Optional payment method.
    pub payment_method: Option<PaymentMethod>,
    /// Recurrence metadata when the transaction repeats.
    pub recurrence: Option<Recurrence>,
}

/// A stored transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Transaction ID.
    pub id: TransactionId,
    /// Owner.
    pub user_id: UserId,
    /// Calendar date of the transaction.
    pub date: NaiveDate,
    /// Short description.
    pub description: String,
    /// Positive amount.
    pub amount: Decimal,
    /// Category label.
    pub category: String,
    /// Income or expense.
    pub kind: TransactionKind,
    /// Free-form labels.
    pub tags: Vec<String>,
    /// Optional notes.
    pub notes: Option<String>,
    /// Optional payment method.
    pub payment_method: Option<PaymentMethod>,
    /// Recurrence metadata when the transaction repeats.
    pub recurrence: Option<Recurrence>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Creates a new transaction owned by `owner`.
    ///
    /// Timestamps are truncated to microseconds, the precision Postgres keeps.
    #[must_use]
    pub fn new(owner: UserId, fields: TransactionFields, now: DateTime<Utc>) -> Self {
        let now = now.trunc_subsecs(6);
        Self {
            id: TransactionId::new(),
            user_id: owner,
            date: fields.date,
            description: fields.description,
            amount: fields.amount,
            category: fields.category,
            kind: fields.kind,
            tags: fields.tags,
            notes: fields.notes,
            payment_method: fields.payment_method,
            recurrence: fields.recurrence,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the editable content, keeping identity, owner and creation time.
    #[must_use]
    pub fn with_fields(self, fields: TransactionFields, now: DateTime<Utc>) -> Self {
        Self {
            date: fields.date,
            description: fields.description,
            amount: fields.amount,
            category: fields.category,
            kind: fields.kind,
            tags: fields.tags,
            notes: fields.notes,
            payment_method: fields.payment_method,
            recurrence: fields.recurrence,
            updated_at: now.trunc_subsecs(6),
            ..self
        }
    }

    /// Returns true if the transaction repeats.
    #[must_use]
    pub const fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }
}

/// Unvalidated input for creating a transaction.
///
/// Enum and date fields are kept as text so that every problem can be
/// reported against its field instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDraft {
    /// Date, `YYYY-MM-DD` or RFC 3339.
    pub date: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Amount.
    pub amount: Option<Decimal>,
    /// Category.
    pub category: Option<String>,
    /// `income` or `expense`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Notes.
    pub notes: Option<String>,
    /// Payment method name.
    pub payment_method: Option<String>,
    /// Whether the transaction repeats.
    #[serde(default)]
    pub is_recurring: bool,
    /// Frequency name.
    pub recurring_frequency: Option<String>,
    /// Date of the next occurrence.
    pub next_recurring_date: Option<String>,
}

impl From<&Transaction> for TransactionDraft {
    fn from(transaction: &Transaction) -> Self {
        Self {
            date: Some(transaction.date.to_string()),
            description: Some(transaction.description.clone()),
            amount: Some(transaction.amount),
            category: Some(transaction.category.clone()),
            kind: Some(transaction.kind.as_str().to_string()),
            tags: transaction.tags.clone(),
            notes: transaction.notes.clone(),
            payment_method: transaction.payment_method.map(|m| m.as_str().to_string()),
            is_recurring: transaction.is_recurring(),
            recurring_frequency: transaction
                .recurrence
                .map(|r| r.frequency.as_str().to_string()),
            next_recurring_date: transaction.recurrence.map(|r| r.next_due_date.to_string()),
        }
    }
}

/// Sparse update. Absent fields stay untouched; `null` clears the optional
/// fields that support it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPatch {
    /// New date.
    pub date: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New amount.
    pub amount: Option<Decimal>,
    /// New category.
    pub category: Option<String>,
    /// New kind.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Replacement tag list.
    pub tags: Option<Vec<String>>,
    /// New notes, or `null` to clear.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub notes: Option<Option<String>>,
    /// New payment method, or `null` to clear.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub payment_method: Option<Option<String>>,
    /// New recurring flag.
    pub is_recurring: Option<bool>,
    /// New frequency, or `null` to clear.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub recurring_frequency: Option<Option<String>>,
    /// New next occurrence date, or `null` to clear.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub next_recurring_date: Option<Option<String>>,
}

impl TransactionPatch {
    /// Returns true if the patch carries no field at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overlays the patch on `draft`.
    #[must_use]
    pub fn apply_to(self, mut draft: TransactionDraft) -> TransactionDraft {
        if let Some(date) = self.date {
            draft.date = Some(date);
        }
        if let Some(description) = self.description {
            draft.description = Some(description);
        }
        if let Some(amount) = self.amount {
            draft.amount = Some(amount);
        }
        if let Some(category) = self.category {
            draft.category = Some(category);
        }
        if let Some(kind) = self.kind {
            draft.kind = Some(kind);
        }
        if let Some(tags) = self.tags {
            draft.tags = tags;
        }
        if let Some(notes) = self.notes {
            draft.notes = notes;
        }
        if let Some(method) = self.payment_method {
            draft.payment_method = method;
        }
        if let Some(is_recurring) = self.is_recurring {
            draft.is_recurring = is_recurring;
        }
        if let Some(frequency) = self.recurring_frequency {
            draft.recurring_frequency = frequency;
        }
        if let Some(next) = self.next_recurring_date {
            draft.next_recurring_date = next;
        }
        draft
    }
}
