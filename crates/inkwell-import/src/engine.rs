//! Rule evaluation for a single row.

use crate::error::StoreError;
use crate::row::RawRow;
use crate::rules::{Check, FieldRules, Presence, RuleTable};
use crate::store::ImportStore;
use chrono::NaiveDate;
use inkwell_domain::{parse_date, UserId};
use inkwell_policy::is_adult;
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Every message raised against one field of a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
    pub field: &'static str,
    pub messages: Vec<String>,
}

/// Validate `row` against `table`. Returns one entry per failing field, in
/// table order; an empty result means the row is valid.
///
/// A store error aborts the row's validation and is returned as-is.
pub async fn validate_row(
    table: &RuleTable,
    row: &RawRow,
    store: &dyn ImportStore,
    today: NaiveDate,
) -> Result<Vec<FieldFailure>, StoreError> {
    let mut failures = Vec::new();
    for rules in &table.fields {
        let messages = check_field(rules, row.get(rules.field), store, today).await?;
        if !messages.is_empty() {
            failures.push(FieldFailure {
                field: rules.field,
                messages,
            });
        }
    }
    Ok(failures)
}

async fn check_field(
    rules: &FieldRules,
    value: Option<&str>,
    store: &dyn ImportStore,
    today: NaiveDate,
) -> Result<Vec<String>, StoreError> {
    let Some(value) = value else {
        return Ok(match rules.presence {
            Presence::Required => vec![rules.required_failure()],
            Presence::Nullable => Vec::new(),
        });
    };

    let mut messages: Vec<String> = rules
        .rules
        .iter()
        .filter(|rule| !rule.check.needs_store())
        .filter(|rule| !passes_format(rule.check, value, today))
        .map(|rule| rules.failure(rule))
        .collect();
    if !messages.is_empty() {
        return Ok(messages);
    }

    for rule in rules.rules.iter().filter(|rule| rule.check.needs_store()) {
        if !passes_lookup(rule.check, value, store, today).await? {
            messages.push(rules.failure(rule));
            break;
        }
    }
    Ok(messages)
}

fn passes_format(check: Check, value: &str, today: NaiveDate) -> bool {
    match check {
        Check::Text => true,
        Check::MaxLength(max) => value.chars().count() <= max,
        Check::MinLength(min) => value.chars().count() >= min,
        Check::Email => EMAIL.is_match(value),
        Check::Integer => value.parse::<i64>().is_ok(),
        Check::Date => parse_date(value).is_some(),
        Check::BeforeToday => parse_date(value).map(|d| d < today).unwrap_or(false),
        Check::Unique(_) | Check::Exists(_) | Check::AdultUser => true,
    }
}

async fn passes_lookup(
    check: Check,
    value: &str,
    store: &dyn ImportStore,
    today: NaiveDate,
) -> Result<bool, StoreError> {
    match check {
        Check::Unique(key) => Ok(!store.exists(key, value).await?),
        Check::Exists(key) => store.exists(key, value).await,
        Check::AdultUser => {
            let Ok(id) = UserId::parse(value) else {
                return Ok(false);
            };
            Ok(store
                .find_user(id)
                .await?
                .map(|user| is_adult(user.date_of_birth, today))
                .unwrap_or(false))
        }
        _ => Ok(true),
    }
}
