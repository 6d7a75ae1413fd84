//! Business rule validation for transaction input.
//!
//! Validation runs on the full draft (for creates) and on the merged record
//! (for partial updates), collecting every field problem before returning.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use fintrack_shared::ValidationErrors;
use rust_decimal::{Decimal, RoundingStrategy};

use super::types::{
    Frequency, PaymentMethod, Recurrence, TransactionDraft, TransactionFields, TransactionKind,
};

/// Maximum description length in characters.
pub const MAX_DESCRIPTION_LEN: usize = 200;
/// Maximum category length in characters.
pub const MAX_CATEGORY_LEN: usize = 50;
/// Maximum notes length in characters.
pub const MAX_NOTES_LEN: usize = 500;
/// Maximum tag length in characters.
pub const MAX_TAG_LEN: usize = 30;
/// Maximum number of tags on one transaction.
pub const MAX_TAGS: usize = 10;

/// Smallest accepted amount (0.01).
#[must_use]
pub const fn min_amount() -> Decimal {
    Decimal::from_parts(1, 0, 0, false, 2)
}

/// Largest amount that fits a `NUMERIC(14,2)` column.
#[must_use]
pub const fn max_amount() -> Decimal {
    Decimal::from_parts(276_447_231, 23_283, 0, false, 2)
}

/// Parses a calendar date from `YYYY-MM-DD` or an RFC 3339 timestamp.
///
/// Timestamps are converted to UTC before the date is taken.
#[must_use]
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(input) {
        return Some(timestamp.with_timezone(&Utc).date_naive());
    }
    NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}

fn required_text(
    errors: &mut ValidationErrors,
    field: &str,
    label: &str,
    value: Option<&str>,
    max_len: usize,
) -> String {
    let value = value.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        errors.push(field, format!("{label} is required"));
    } else if value.chars().count() > max_len {
        errors.push(field, format!("{label} cannot exceed {max_len} characters"));
    }
    value.to_string()
}

/// Validates a draft, returning the typed fields or every problem found.
///
/// Amounts are rounded to cents. Recurrence metadata is required when
/// `isRecurring` is set and discarded otherwise.
///
/// # Errors
///
/// Returns the collected field errors when any rule is violated.
pub fn validate_draft(draft: &TransactionDraft) -> Result<TransactionFields, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let date = match draft.date.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push("date", "Date is required");
            None
        }
        Some(raw) => {
            let parsed = parse_date(raw);
            if parsed.is_none() {
                errors.push("date", "Date must be a valid date");
            }
            parsed
        }
    };

    let description = required_text(
        &mut errors,
        "description",
        "Description",
        draft.description.as_deref(),
        MAX_DESCRIPTION_LEN,
    );

    let amount = match draft.amount {
        None => {
            errors.push("amount", "Amount is required");
            None
        }
        Some(amount) if amount < min_amount() => {
            errors.push("amount", "Amount must be at least 0.01");
            None
        }
        Some(amount) if amount > max_amount() => {
            errors.push("amount", "Amount is too large");
            None
        }
        Some(amount) => {
            Some(amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        }
    };

    let category = required_text(
        &mut errors,
        "category",
        "Category",
        draft.category.as_deref(),
        MAX_CATEGORY_LEN,
    );

    let kind = match draft.kind.as_deref() {
        None => {
            errors.push("type", "Type is required");
            None
        }
        Some(raw) => {
            let parsed = TransactionKind::parse(raw);
            if parsed.is_none() {
                errors.push("type", "Type must be either income or expense");
            }
            parsed
        }
    };

    if draft.tags.len() > MAX_TAGS {
        errors.push("tags", format!("Cannot have more than {MAX_TAGS} tags"));
    }
    let tags: Vec<String> = draft.tags.iter().map(|t| t.trim().to_string()).collect();
    if tags
        .iter()
        .any(|t| t.is_empty() || t.chars().count() > MAX_TAG_LEN)
    {
        errors.push(
            "tags",
            format!("Each tag must be between 1 and {MAX_TAG_LEN} characters"),
        );
    }

    let notes = draft
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);
    if notes
        .as_deref()
        .is_some_and(|n| n.chars().count() > MAX_NOTES_LEN)
    {
        errors.push(
            "notes",
            format!("Notes cannot exceed {MAX_NOTES_LEN} characters"),
        );
    }

    let payment_method = match draft.payment_method.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => {
            let parsed = PaymentMethod::parse(raw);
            if parsed.is_none() {
                errors.push("paymentMethod", "Invalid payment method");
            }
            parsed
        }
    };

    let recurrence = if draft.is_recurring {
        validate_recurrence(&mut errors, draft)
    } else {
        None
    };

    match (date, amount, kind) {
        (Some(date), Some(amount), Some(kind)) if errors.is_empty() => Ok(TransactionFields {
            date,
            description,
            amount,
            category,
            kind,
            tags,
            notes,
            payment_method,
            recurrence,
        }),
        _ => Err(errors),
    }
}

fn validate_recurrence(
    errors: &mut ValidationErrors,
    draft: &TransactionDraft,
) -> Option<Recurrence> {
    let frequency = match draft.recurring_frequency.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push(
                "recurringFrequency",
                "Recurring frequency is required for recurring transactions",
            );
            None
        }
        Some(raw) => {
            let parsed = Frequency::parse(raw);
            if parsed.is_none() {
                errors.push(
                    "recurringFrequency",
                    "Recurring frequency must be daily, weekly, monthly or yearly",
                );
            }
            parsed
        }
    };

    let next_due_date = match draft.next_recurring_date.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push(
                "nextRecurringDate",
                "Next recurring date is required for recurring transactions",
            );
            None
        }
        Some(raw) => {
            let parsed = parse_date(raw);
            if parsed.is_none() {
                errors.push("nextRecurringDate", "Next recurring date must be a valid date");
            }
            parsed
        }
    };

    Some(Recurrence {
        frequency: frequency?,
        next_due_date: next_due_date?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn valid_draft() -> TransactionDraft {
        TransactionDraft {
            date: Some("2024-01-05".to_string()),
            description: Some("  Salary  ".to_string()),
            amount: Some(dec!(100)),
            category: Some("Work".to_string()),
            kind: Some("income".to_string()),
            ..TransactionDraft::default()
        }
    }

    #[test]
    fn test_valid_draft() {
        let fields = validate_draft(&valid_draft()).unwrap();

        assert_eq!(fields.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(fields.description, "Salary");
        assert_eq!(fields.amount, dec!(100));
        assert_eq!(fields.kind, TransactionKind::Income);
        assert!(fields.recurrence.is_none());
    }

    #[test]
    fn test_empty_draft_reports_every_required_field() {
        let errors = validate_draft(&TransactionDraft::default()).unwrap_err();

        for field in ["date", "description", "amount", "category", "type"] {
            assert!(errors.has_field(field), "missing error for {field}");
        }
        assert_eq!(errors.len(), 5);
    }

    #[rstest]
    #[case(dec!(0.01), true)]
    #[case(dec!(0.009), false)]
    #[case(dec!(0), false)]
    #[case(dec!(-5), false)]
    #[case(dec!(9999999999.99), true)]
    #[case(dec!(1000000000000), false)]
    fn test_amount_bounds(#[case] amount: Decimal, #[case] ok: bool) {
        let draft = TransactionDraft {
            amount: Some(amount),
            ..valid_draft()
        };
        assert_eq!(validate_draft(&draft).is_ok(), ok);
    }

    #[test]
    fn test_amount_is_rounded_to_cents() {
        let draft = TransactionDraft {
            amount: Some(dec!(10.125)),
            ..valid_draft()
        };
        assert_eq!(validate_draft(&draft).unwrap().amount, dec!(10.13));
    }

    #[test]
    fn test_length_limits_count_characters() {
        let draft = TransactionDraft {
            description: Some("é".repeat(MAX_DESCRIPTION_LEN)),
            category: Some("c".repeat(MAX_CATEGORY_LEN + 1)),
            notes: Some("n".repeat(MAX_NOTES_LEN + 1)),
            ..valid_draft()
        };
        let errors = validate_draft(&draft).unwrap_err();

        assert!(!errors.has_field("description"));
        assert!(errors.has_field("category"));
        assert!(errors.has_field("notes"));
    }

    #[test]
    fn test_blank_description_is_required() {
        let draft = TransactionDraft {
            description: Some("   ".to_string()),
            ..valid_draft()
        };
        assert!(validate_draft(&draft).unwrap_err().has_field("description"));
    }

    #[rstest]
    #[case("INCOME", true)]
    #[case("Expense", true)]
    #[case("transfer", false)]
    fn test_kind_values(#[case] kind: &str, #[case] ok: bool) {
        let draft = TransactionDraft {
            kind: Some(kind.to_string()),
            ..valid_draft()
        };
        assert_eq!(validate_draft(&draft).is_ok(), ok);
    }

    #[test]
    fn test_tag_rules() {
        let too_many = TransactionDraft {
            tags: (0..=MAX_TAGS).map(|i| format!("t{i}")).collect(),
            ..valid_draft()
        };
        assert!(validate_draft(&too_many).unwrap_err().has_field("tags"));

        let too_long = TransactionDraft {
            tags: vec!["x".repeat(MAX_TAG_LEN + 1)],
            ..valid_draft()
        };
        assert!(validate_draft(&too_long).unwrap_err().has_field("tags"));

        let trimmed = TransactionDraft {
            tags: vec![" food ".to_string()],
            ..valid_draft()
        };
        assert_eq!(validate_draft(&trimmed).unwrap().tags, vec!["food"]);
    }

    #[test]
    fn test_invalid_payment_method() {
        let draft = TransactionDraft {
            payment_method: Some("cheque".to_string()),
            ..valid_draft()
        };
        assert!(validate_draft(&draft).unwrap_err().has_field("paymentMethod"));
    }

    #[test]
    fn test_recurring_requires_metadata() {
        let draft = TransactionDraft {
            is_recurring: true,
            ..valid_draft()
        };
        let errors = validate_draft(&draft).unwrap_err();

        assert!(errors.has_field("recurringFrequency"));
        assert!(errors.has_field("nextRecurringDate"));
    }

    #[test]
    fn test_recurring_with_metadata() {
        let draft = TransactionDraft {
            is_recurring: true,
            recurring_frequency: Some("Monthly".to_string()),
            next_recurring_date: Some("2024-02-05".to_string()),
            ..valid_draft()
        };
        let recurrence = validate_draft(&draft).unwrap().recurrence.unwrap();

        assert_eq!(recurrence.frequency, Frequency::Monthly);
        assert_eq!(
            recurrence.next_due_date,
            NaiveDate::from_ymd_opt(2024, 2, 5).unwrap()
        );
    }

    #[test]
    fn test_non_recurring_drops_metadata() {
        let draft = TransactionDraft {
            is_recurring: false,
            recurring_frequency: Some("weekly".to_string()),
            next_recurring_date: Some("2024-02-05".to_string()),
            ..valid_draft()
        };
        assert!(validate_draft(&draft).unwrap().recurrence.is_none());
    }

    #[rstest]
    #[case("2024-01-05", Some((2024, 1, 5)))]
    #[case("2024-01-05T10:30:00Z", Some((2024, 1, 5)))]
    #[case("2024-01-05T23:30:00.000-05:00", Some((2024, 1, 6)))]
    #[case("2024-01-05T08:00:00", Some((2024, 1, 5)))]
    #[case("05/01/2024", None)]
    #[case("2024-02-30", None)]
    fn test_parse_date(#[case] input: &str, #[case] expected: Option<(i32, u32, u32)>) {
        let expected = expected.map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap());
        assert_eq!(parse_date(input), expected);
    }
}
