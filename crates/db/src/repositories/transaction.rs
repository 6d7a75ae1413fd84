//! Postgres transaction store.
//!
//! Text filters compile to `LOWER(column) LIKE '%fragment%' ESCAPE '\'` with
//! the fragment escaped, so user input is always matched literally.

use async_trait::async_trait;
use chrono::Utc;
use fintrack_core::transaction::{
    Frequency, PaymentMethod, Recurrence, Sort, SortField, SortOrder, StoreError, Transaction,
    TransactionFilter, TransactionKind, TransactionStore,
};
use fintrack_shared::types::pagination::MAX_OFFSET;
use fintrack_shared::types::{PageRequest, TransactionId, UserId};
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use tracing::debug;

use crate::entities::sea_orm_active_enums as db_enums;
use crate::entities::transactions::{self, Column};

/// Transaction store backed by the `transactions` table.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) fn backend(err: DbErr) -> StoreError {
    StoreError::Backend(err.to_string())
}

/// Escapes `\`, `%` and `_` for use inside a `LIKE ... ESCAPE '\'` pattern.
#[must_use]
pub fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for ch in fragment.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn contains_ignore_case(column: Column, fragment: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like(fragment));
    Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(pattern).escape('\\'))
}

fn condition(filter: &TransactionFilter) -> Condition {
    let mut condition = Condition::all().add(Column::UserId.eq(filter.owner.into_inner()));

    if let Some(from) = filter.range.from {
        condition = condition.add(Column::Date.gte(from));
    }
    if let Some(to) = filter.range.to {
        condition = condition.add(Column::Date.lte(to));
    }
    if let Some(kind) = filter.kind {
        condition = condition.add(Column::Kind.eq(db_enums::TransactionKind::from(kind)));
    }
    if let Some(category) = filter.category.as_deref() {
        condition = condition.add(contains_ignore_case(Column::Category, category));
    }
    if let Some(description) = filter.description.as_deref() {
        condition = condition.add(contains_ignore_case(Column::Description, description));
    }
    condition
}

/// Text columns sort on `LOWER(column)`, matching the in-memory ordering.
fn sort_expr(field: SortField) -> SimpleExpr {
    let column = sort_column(field);
    match field {
        SortField::Category | SortField::Description => Func::lower(Expr::col(column)).into(),
        _ => Expr::col(column).into(),
    }
}

/// Query for one page, or `None` when the offset cannot be bound as BIGINT.
fn page_select(
    filter: &TransactionFilter,
    sort: Sort,
    page: PageRequest,
) -> Option<Select<transactions::Entity>> {
    if page.offset() > MAX_OFFSET {
        return None;
    }
    let order = match sort.order {
        SortOrder::Asc => Order::Asc,
        SortOrder::Desc => Order::Desc,
    };

    Some(
        transactions::Entity::find()
            .filter(condition(filter))
            .order_by(sort_expr(sort.field), order)
            .order_by_asc(Column::Id)
            .offset(page.offset())
            .limit(page.limit()),
    )
}

const fn sort_column(field: SortField) -> Column {
    match field {
        SortField::Date => Column::Date,
        SortField::Amount => Column::Amount,
        SortField::Category => Column::Category,
        SortField::Description => Column::Description,
        SortField::Kind => Column::Kind,
        SortField::CreatedAt => Column::CreatedAt,
    }
}

impl From<TransactionKind> for db_enums::TransactionKind {
    fn from(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Income => Self::Income,
            TransactionKind::Expense => Self::Expense,
        }
    }
}

impl From<db_enums::TransactionKind> for TransactionKind {
    fn from(kind: db_enums::TransactionKind) -> Self {
        match kind {
            db_enums::TransactionKind::Income => Self::Income,
            db_enums::TransactionKind::Expense => Self::Expense,
        }
    }
}

impl From<PaymentMethod> for db_enums::PaymentMethod {
    fn from(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Cash => Self::Cash,
            PaymentMethod::CreditCard => Self::CreditCard,
            PaymentMethod::DebitCard => Self::DebitCard,
            PaymentMethod::BankTransfer => Self::BankTransfer,
            PaymentMethod::DigitalWallet => Self::DigitalWallet,
            PaymentMethod::Other => Self::Other,
        }
    }
}

impl From<db_enums::PaymentMethod> for PaymentMethod {
    fn from(method: db_enums::PaymentMethod) -> Self {
        match method {
            db_enums::PaymentMethod::Cash => Self::Cash,
            db_enums::PaymentMethod::CreditCard => Self::CreditCard,
            db_enums::PaymentMethod::DebitCard => Self::DebitCard,
            db_enums::PaymentMethod::BankTransfer => Self::BankTransfer,
            db_enums::PaymentMethod::DigitalWallet => Self::DigitalWallet,
            db_enums::PaymentMethod::Other => Self::Other,
        }
    }
}

impl From<Frequency> for db_enums::RecurringFrequency {
    fn from(frequency: Frequency) -> Self {
        match frequency {
            Frequency::Daily => Self::Daily,
            Frequency::Weekly => Self::Weekly,
            Frequency::Monthly => Self::Monthly,
            Frequency::Yearly => Self::Yearly,
        }
    }
}

impl From<db_enums::RecurringFrequency> for Frequency {
    fn from(frequency: db_enums::RecurringFrequency) -> Self {
        match frequency {
            db_enums::RecurringFrequency::Daily => Self::Daily,
            db_enums::RecurringFrequency::Weekly => Self::Weekly,
            db_enums::RecurringFrequency::Monthly => Self::Monthly,
            db_enums::RecurringFrequency::Yearly => Self::Yearly,
        }
    }
}

fn to_active(transaction: &Transaction) -> Result<transactions::ActiveModel, StoreError> {
    let tags = serde_json::to_value(&transaction.tags)
        .map_err(|e| StoreError::Backend(format!("failed to encode tags: {e}")))?;

    Ok(transactions::ActiveModel {
        id: Set(transaction.id.into_inner()),
        user_id: Set(transaction.user_id.into_inner()),
        date: Set(transaction.date),
        description: Set(transaction.description.clone()),
        amount: Set(transaction.amount),
        category: Set(transaction.category.clone()),
        kind: Set(transaction.kind.into()),
        tags: Set(tags),
        notes: Set(transaction.notes.clone()),
        payment_method: Set(transaction.payment_method.map(Into::into)),
        is_recurring: Set(transaction.is_recurring()),
        recurring_frequency: Set(transaction.recurrence.map(|r| r.frequency.into())),
        next_recurring_date: Set(transaction.recurrence.map(|r| r.next_due_date)),
        created_at: Set(transaction.created_at.into()),
        updated_at: Set(transaction.updated_at.into()),
    })
}

fn from_model(model: transactions::Model) -> Result<Transaction, StoreError> {
    let tags: Vec<String> = serde_json::from_value(model.tags)
        .map_err(|e| StoreError::Backend(format!("failed to decode tags: {e}")))?;

    let recurrence = match (
        model.is_recurring,
        model.recurring_frequency,
        model.next_recurring_date,
    ) {
        (true, Some(frequency), Some(next_due_date)) => Some(Recurrence {
            frequency: frequency.into(),
            next_due_date,
        }),
        _ => None,
    };

    Ok(Transaction {
        id: TransactionId::from_uuid(model.id),
        user_id: UserId::from_uuid(model.user_id),
        date: model.date,
        description: model.description,
        amount: model.amount,
        category: model.category,
        kind: model.kind.into(),
        tags,
        notes: model.notes,
        payment_method: model.payment_method.map(Into::into),
        recurrence,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

fn from_models(models: Vec<transactions::Model>) -> Result<Vec<Transaction>, StoreError> {
    models.into_iter().map(from_model).collect()
}

#[async_trait]
impl TransactionStore for TransactionRepository {
    async fn insert(&self, transaction: Transaction) -> Result<Transaction, StoreError> {
        let model = to_active(&transaction)?
            .insert(&self.db)
            .await
            .map_err(backend)?;
        from_model(model)
    }

    async fn find(
        &self,
        owner: UserId,
        id: TransactionId,
    ) -> Result<Option<Transaction>, StoreError> {
        transactions::Entity::find_by_id(id.into_inner())
            .filter(Column::UserId.eq(owner.into_inner()))
            .one(&self.db)
            .await
            .map_err(backend)?
            .map(from_model)
            .transpose()
    }

    async fn replace(&self, transaction: Transaction) -> Result<Option<Transaction>, StoreError> {
        let result = transactions::Entity::update_many()
            .set(to_active(&transaction)?)
            .filter(Column::Id.eq(transaction.id.into_inner()))
            .filter(Column::UserId.eq(transaction.user_id.into_inner()))
            .exec(&self.db)
            .await
            .map_err(backend)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        Ok(Some(transaction))
    }

    async fn remove(
        &self,
        owner: UserId,
        id: TransactionId,
    ) -> Result<Option<Transaction>, StoreError> {
        let Some(existing) = self.find(owner, id).await? else {
            return Ok(None);
        };

        let result = transactions::Entity::delete_many()
            .filter(Column::Id.eq(id.into_inner()))
            .filter(Column::UserId.eq(owner.into_inner()))
            .exec(&self.db)
            .await
            .map_err(backend)?;

        // A concurrent delete may have won the race.
        if result.rows_affected == 0 {
            return Ok(None);
        }
        Ok(Some(existing))
    }

    async fn page(
        &self,
        filter: &TransactionFilter,
        sort: Sort,
        page: PageRequest,
    ) -> Result<Vec<Transaction>, StoreError> {
        let Some(select) = page_select(filter, sort, page) else {
            return Ok(Vec::new());
        };

        debug!(
            owner = %filter.owner,
            offset = page.offset(),
            limit = page.limit(),
            "querying transaction page"
        );

        let models = select.all(&self.db).await.map_err(backend)?;
        from_models(models)
    }

    async fn count(&self, filter: &TransactionFilter) -> Result<u64, StoreError> {
        transactions::Entity::find()
            .filter(condition(filter))
            .count(&self.db)
            .await
            .map_err(backend)
    }

    async fn scan(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>, StoreError> {
        let models = transactions::Entity::find()
            .filter(condition(filter))
            .all(&self.db)
            .await
            .map_err(backend)?;
        from_models(models)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db.ping().await.map_err(backend)
    }
}
