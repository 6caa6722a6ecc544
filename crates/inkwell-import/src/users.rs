//! User account import.

use crate::error::{RowError, StoreError};
use crate::pipeline::{ImportKind, RowImporter};
use crate::row::RawRow;
use crate::rules::{Check, FieldRules, RuleTable};
use crate::store::{ImportStore, LookupKey};
use async_trait::async_trait;
use chrono::NaiveDate;
use inkwell_domain::{age_on, hash_password, parse_date, NewUser};
use inkwell_policy::MEMBER_ROLE;

/// Password given to imported accounts whose row leaves it blank.
pub const DEFAULT_IMPORT_PASSWORD: &str = "password123";

/// Imports user accounts and gives each the member role.
#[derive(Debug, Clone)]
pub struct UsersImporter {
    rules: RuleTable,
    default_password: String,
}

impl UsersImporter {
    pub fn new(default_password: impl Into<String>) -> Self {
        Self {
            rules: Self::rule_table(),
            default_password: default_password.into(),
        }
    }

    pub fn rule_table() -> RuleTable {
        RuleTable::new("users")
            .field(
                FieldRules::required("name")
                    .message("The name field is required.")
                    .check(Check::Text)
                    .check(Check::MaxLength(255)),
            )
            .field(
                FieldRules::required("email")
                    .message("The email field is required.")
                    .check(Check::Email)
                    .message("The email must be a valid email address.")
                    .check(Check::MaxLength(255))
                    .check(Check::Unique(LookupKey::UserEmail))
                    .message("This email already exists in the database."),
            )
            .field(
                FieldRules::required("mobile_number")
                    .message("The mobile number field is required.")
                    .check(Check::Text)
                    .check(Check::MaxLength(50))
                    .check(Check::Unique(LookupKey::UserMobileNumber))
                    .message("This mobile number already exists in the database."),
            )
            .field(
                FieldRules::required("address")
                    .message("The address field is required.")
                    .check(Check::Text)
                    .check(Check::MaxLength(255)),
            )
            .field(
                FieldRules::required("date_of_birth")
                    .message("The date of birth field is required.")
                    .check(Check::Date)
                    .message("The date of birth must be a valid date.")
                    .check(Check::BeforeToday)
                    .message("The date of birth must be before today."),
            )
            .field(
                FieldRules::nullable("password")
                    .check(Check::Text)
                    .check(Check::MinLength(6)),
            )
    }
}

impl Default for UsersImporter {
    fn default() -> Self {
        Self::new(DEFAULT_IMPORT_PASSWORD)
    }
}

#[async_trait]
impl RowImporter for UsersImporter {
    type Record = NewUser;

    fn kind(&self) -> ImportKind {
        ImportKind::Users
    }

    fn rules(&self) -> &RuleTable {
        &self.rules
    }

    fn transform(&self, row: &RawRow, today: NaiveDate) -> Result<NewUser, RowError> {
        let field = |name: &'static str| {
            row.get(name)
                .map(str::to_string)
                .ok_or_else(|| RowError::transform(name, "missing value"))
        };

        let date_of_birth = row.get("date_of_birth").and_then(parse_date);
        let age = date_of_birth
            .and_then(|birth| age_on(birth, today))
            .and_then(|age| i32::try_from(age).ok());
        let password = row.get("password").unwrap_or(self.default_password.as_str());

        Ok(NewUser {
            name: field("name")?,
            email: field("email")?,
            mobile_number: field("mobile_number")?,
            address: field("address")?,
            date_of_birth,
            age,
            password_hash: hash_password(password)?,
        })
    }

    async fn persist(&self, store: &dyn ImportStore, record: NewUser) -> Result<(), StoreError> {
        store.insert_user(record, MEMBER_ROLE).await.map(|_| ())
    }
}
