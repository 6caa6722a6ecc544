use chrono::{DateTime, NaiveDate, Utc};
use inkwell_common_core::UserId;
use serde::Serialize;

/// A registered account.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub mobile_number: String,
    pub address: String,
    pub date_of_birth: Option<NaiveDate>,
    /// Age in years, derived from `date_of_birth` when the record was written.
    pub age: Option<i32>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub mobile_number: String,
    pub address: String,
    pub date_of_birth: Option<NaiveDate>,
    pub age: Option<i32>,
    pub password_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_is_never_serialized() {
        let user = User {
            id: UserId::new(1),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            mobile_number: "0771234567".into(),
            address: "1 Loop Rd".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 15),
            age: Some(34),
            password_hash: "$argon2id$secret".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["id"], 1);
        assert_eq!(json["date_of_birth"], "1990-01-15");
    }
}
