//! Query parameters for listing transactions and computing statistics.
//!
//! Raw parameters arrive as text from the query string. They are parsed into
//! typed filters here so that every bad value is reported against its field.

use std::cmp::Ordering;

use chrono::{Datelike, NaiveDate};
use fintrack_shared::ValidationErrors;
use fintrack_shared::types::UserId;
use fintrack_shared::types::pagination::{DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT};
use fintrack_shared::types::PageRequest;
use serde::Deserialize;

use super::types::{Transaction, TransactionKind};
use super::validation::parse_date;

/// Field a transaction list can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    /// Transaction date.
    #[default]
    Date,
    /// Amount.
    Amount,
    /// Category label.
    Category,
    /// Description.
    Description,
    /// Income or expense.
    Kind,
    /// Creation timestamp.
    CreatedAt,
}

impl SortField {
    /// Parses a wire name (`date`, `amount`, `category`, `description`,
    /// `type`, `createdAt`).
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "date" => Some(Self::Date),
            "amount" => Some(Self::Amount),
            "category" => Some(Self::Category),
            "description" => Some(Self::Description),
            "type" => Some(Self::Kind),
            "createdAt" | "created_at" => Some(Self::CreatedAt),
            _ => None,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Smallest first.
    Asc,
    /// Largest first.
    #[default]
    Desc,
}

impl SortOrder {
    /// Parses `asc` or `desc`, case-insensitively.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Sort field and direction. Defaults to date descending.
///
/// Category and description compare lower-cased. Postgres orders the same
/// `LOWER(column)` values under the database collation, so non-ASCII text
/// may order differently between the two stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sort {
    /// Field to sort by.
    pub field: SortField,
    /// Direction.
    pub order: SortOrder,
}

impl Sort {
    /// Creates a sort.
    #[must_use]
    pub const fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }

    /// Compares two transactions under this sort, breaking ties by id
    /// ascending so that paging is stable.
    #[must_use]
    pub fn compare(&self, a: &Transaction, b: &Transaction) -> Ordering {
        let primary = match self.field {
            SortField::Date => a.date.cmp(&b.date),
            SortField::Amount => a.amount.cmp(&b.amount),
            SortField::Category => cmp_ignore_case(&a.category, &b.category),
            SortField::Description => cmp_ignore_case(&a.description, &b.description),
            SortField::Kind => a.kind.as_str().cmp(b.kind.as_str()),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        };
        let primary = match self.order {
            SortOrder::Asc => primary,
            SortOrder::Desc => primary.reverse(),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Inclusive date range. Either bound may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    /// First day included.
    pub from: Option<NaiveDate>,
    /// Last day included.
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// An unbounded range.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            from: None,
            to: None,
        }
    }

    /// The calendar year `year`, or `None` if it is out of range.
    #[must_use]
    pub fn year(year: i32) -> Option<Self> {
        Some(Self {
            from: NaiveDate::from_ymd_opt(year, 1, 1),
            to: Some(NaiveDate::from_ymd_opt(year, 12, 31)?),
        })
    }

    /// Returns true if `date` falls inside the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

/// Owner-scoped transaction filter.
///
/// Text filters are literal, case-insensitive substring matches. They are
/// stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Owner every match must belong to.
    pub owner: UserId,
    /// Date bounds.
    pub range: DateRange,
    /// Lower-cased category fragment.
    pub category: Option<String>,
    /// Exact kind.
    pub kind: Option<TransactionKind>,
    /// Lower-cased description fragment.
    pub description: Option<String>,
}

impl TransactionFilter {
    /// Matches every transaction of `owner`.
    #[must_use]
    pub const fn for_owner(owner: UserId) -> Self {
        Self {
            owner,
            range: DateRange::all(),
            category: None,
            kind: None,
            description: None,
        }
    }

    /// Restricts the filter to `range`.
    #[must_use]
    pub const fn with_range(mut self, range: DateRange) -> Self {
        self.range = range;
        self
    }

    /// Restricts the filter to `kind`.
    #[must_use]
    pub const fn with_kind(mut self, kind: Option<TransactionKind>) -> Self {
        self.kind = kind;
        self
    }

    /// Restricts the filter to categories containing `fragment`.
    #[must_use]
    pub fn with_category(mut self, fragment: &str) -> Self {
        self.category = Some(fragment.to_lowercase());
        self
    }

    /// Restricts the filter to descriptions containing `fragment`.
    #[must_use]
    pub fn with_description(mut self, fragment: &str) -> Self {
        self.description = Some(fragment.to_lowercase());
        self
    }

    /// Returns true if `transaction` satisfies every condition.
    #[must_use]
    pub fn matches(&self, transaction: &Transaction) -> bool {
        transaction.user_id == self.owner
            && self.range.contains(transaction.date)
            && self.kind.is_none_or(|kind| transaction.kind == kind)
            && contains_fragment(&transaction.category, self.category.as_deref())
            && contains_fragment(&transaction.description, self.description.as_deref())
    }
}

fn contains_fragment(haystack: &str, fragment: Option<&str>) -> bool {
    fragment.is_none_or(|fragment| haystack.to_lowercase().contains(fragment))
}

/// A fully parsed list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Which transactions match.
    pub filter: TransactionFilter,
    /// Ordering.
    pub sort: Sort,
    /// Page window.
    pub page: PageRequest,
}

/// Raw query-string parameters of the list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    /// Inclusive lower date bound.
    pub start_date: Option<String>,
    /// Inclusive upper date bound.
    pub end_date: Option<String>,
    /// Category fragment.
    pub category: Option<String>,
    /// `income` or `expense`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Description fragment.
    pub description: Option<String>,
    /// Page number.
    pub page: Option<String>,
    /// Page size.
    pub limit: Option<String>,
    /// Sort field.
    pub sort_by: Option<String>,
    /// Sort direction.
    pub sort_order: Option<String>,
}

/// Raw query-string parameters of the statistics endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsParams {
    /// Inclusive lower date bound.
    pub start_date: Option<String>,
    /// Inclusive upper date bound.
    pub end_date: Option<String>,
    /// `income` or `expense`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Calendar year.
    pub year: Option<String>,
}

/// Returns the trimmed value, treating blank values as absent.
fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_range(
    errors: &mut ValidationErrors,
    start: Option<&str>,
    end: Option<&str>,
) -> DateRange {
    let mut bound = |field: &str, label: &str, raw: Option<&str>| {
        let raw = present(raw)?;
        let parsed = parse_date(raw);
        if parsed.is_none() {
            errors.push(field, format!("{label} must be a valid date"));
        }
        parsed
    };
    let from = bound("startDate", "Start date", start);
    let to = bound("endDate", "End date", end);

    if let (Some(from), Some(to)) = (from, to)
        && from > to
    {
        errors.push("endDate", "End date must be on or after start date");
    }
    DateRange { from, to }
}

fn parse_kind(errors: &mut ValidationErrors, raw: Option<&str>) -> Option<TransactionKind> {
    let raw = present(raw)?;
    let parsed = TransactionKind::parse(raw);
    if parsed.is_none() {
        errors.push("type", "Type must be either income or expense");
    }
    parsed
}

fn parse_number(
    errors: &mut ValidationErrors,
    field: &str,
    raw: Option<&str>,
    default: u64,
    bounds: (u64, u64),
    message: &str,
) -> u64 {
    let Some(raw) = present(raw) else {
        return default;
    };
    match raw.parse::<u64>() {
        Ok(value) if value >= bounds.0 && value <= bounds.1 => value,
        _ => {
            errors.push(field, message);
            default
        }
    }
}

impl ListParams {
    /// Parses the parameters into a query scoped to `owner`.
    ///
    /// # Errors
    ///
    /// Returns one field error per invalid parameter.
    pub fn into_query(self, owner: UserId) -> Result<ListQuery, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let range = parse_range(
            &mut errors,
            self.start_date.as_deref(),
            self.end_date.as_deref(),
        );
        let kind = parse_kind(&mut errors, self.kind.as_deref());

        let page = parse_number(
            &mut errors,
            "page",
            self.page.as_deref(),
            DEFAULT_PAGE,
            (1, u64::MAX),
            "Page must be a positive integer",
        );
        let limit = parse_number(
            &mut errors,
            "limit",
            self.limit.as_deref(),
            DEFAULT_LIMIT,
            (1, MAX_LIMIT),
            "Limit must be between 1 and 100",
        );
        let max_page = PageRequest::max_page(limit);
        if page > max_page {
            errors.push("page", format!("Page cannot exceed {max_page}"));
        }

        let field = match present(self.sort_by.as_deref()) {
            None => SortField::default(),
            Some(raw) => SortField::parse(raw).unwrap_or_else(|| {
                errors.push(
                    "sortBy",
                    "Sort field must be one of date, amount, category, description, type, createdAt",
                );
                SortField::default()
            }),
        };
        let order = match present(self.sort_order.as_deref()) {
            None => SortOrder::default(),
            Some(raw) => SortOrder::parse(raw).unwrap_or_else(|| {
                errors.push("sortOrder", "Sort order must be asc or desc");
                SortOrder::default()
            }),
        };

        let mut filter = TransactionFilter::for_owner(owner)
            .with_range(range)
            .with_kind(kind);
        if let Some(category) = present(self.category.as_deref()) {
            filter = filter.with_category(category);
        }
        if let Some(description) = present(self.description.as_deref()) {
            filter = filter.with_description(description);
        }

        errors.into_result(ListQuery {
            filter,
            sort: Sort::new(field, order),
            page: PageRequest::new(page, limit),
        })
    }
}

impl StatsParams {
    /// Parses `startDate` and `endDate`.
    ///
    /// # Errors
    ///
    /// Returns field errors for unparseable or inverted bounds.
    pub fn date_range(&self) -> Result<DateRange, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let range = parse_range(
            &mut errors,
            self.start_date.as_deref(),
            self.end_date.as_deref(),
        );
        errors.into_result(range)
    }

    /// Parses the date range together with the optional `type`.
    ///
    /// # Errors
    ///
    /// Returns every invalid field.
    pub fn range_and_kind(&self) -> Result<(DateRange, Option<TransactionKind>), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let range = parse_range(
            &mut errors,
            self.start_date.as_deref(),
            self.end_date.as_deref(),
        );
        let kind = parse_kind(&mut errors, self.kind.as_deref());
        errors.into_result((range, kind))
    }

    /// Parses the optional `year`.
    ///
    /// # Errors
    ///
    /// Returns a field error unless the year is a four-digit number.
    pub fn year(&self) -> Result<Option<i32>, ValidationErrors> {
        let Some(raw) = present(self.year.as_deref()) else {
            return Ok(None);
        };
        match raw.parse::<i32>() {
            Ok(year) if (1000..=9999).contains(&year) => Ok(Some(year)),
            _ => {
                let mut errors = ValidationErrors::new();
                errors.push("year", "Year must be a four-digit number");
                Err(errors)
            }
        }
    }
}

/// Returns the `(year, month)` bucket of `date`.
#[must_use]
pub fn month_of(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}
