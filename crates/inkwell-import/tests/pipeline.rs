//! End-to-end batch behaviour over the in-memory store.

use async_trait::async_trait;
use chrono::NaiveDate;
use inkwell_domain::{NewPost, NewUser, Post, User, UserId};
use inkwell_import::{
    read_rows, run_import, ImportStatus, ImportStore, LookupKey, MemoryStore, PostsImporter,
    RawRow, SourceFormat, StoreError, UsersImporter,
};
use inkwell_test_utils::{date, CsvFixture};
use proptest::prelude::*;

fn today() -> NaiveDate {
    date(2024, 6, 1)
}

fn user_row(n: usize) -> RawRow {
    RawRow::new()
        .with("name", format!("User {n}"))
        .with("email", format!("user{n}@example.com"))
        .with("mobile_number", format!("07700000{n:02}"))
        .with("address", format!("{n} Loop Rd"))
        .with("date_of_birth", "1990-01-15")
}

#[tokio::test]
async fn test_duplicate_email_in_second_row() {
    let store = MemoryStore::new();
    store.seed_user("Existing", "taken@example.com", "0779999999", Some(date(1980, 1, 1)));

    let rows = vec![
        user_row(1),
        user_row(2).with("email", "taken@example.com"),
        user_row(3),
    ];
    let outcome = run_import(&UsersImporter::default(), &store, rows, today()).await;

    assert_eq!(outcome.imported, 2);
    assert_eq!(outcome.skipped, 1);
    assert_eq!(outcome.total_errors(), 1);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].row, 2);
    assert_eq!(outcome.failures[0].field, "email");
    assert_eq!(
        outcome.failures[0].messages,
        vec!["This email already exists in the database."]
    );
    assert_eq!(outcome.status(), ImportStatus::Partial);

    let report = serde_json::to_value(outcome.into_report()).unwrap();
    assert_eq!(report["data"]["imported_count"], 2);
    assert_eq!(report["data"]["skipped_count"], 1);
    assert_eq!(report["data"]["total_errors"], 1);
    assert_eq!(report["data"]["validation_errors"][0]["field"], "email");
    assert_eq!(report["data"]["validation_errors"][0]["row"], 2);
}

#[tokio::test]
async fn test_row_order_is_preserved() {
    let store = MemoryStore::new();
    let bad = || user_row(9).with("name", "");
    let rows = vec![bad(), user_row(2), user_row(3).with("email", "nope")];

    let outcome = run_import(&UsersImporter::default(), &store, rows, today()).await;

    assert_eq!(outcome.imported, 1);
    let rows: Vec<usize> = outcome.failures.iter().map(|f| f.row).collect();
    assert_eq!(rows, vec![1, 3]);
    assert_eq!(store.users()[0].email, "user2@example.com");
}

#[tokio::test]
async fn test_multiple_bad_fields_count_one_skip() {
    let store = MemoryStore::new();
    let row = user_row(1)
        .with("email", "")
        .with("date_of_birth", "2030-01-01")
        .with("password", "abc");

    let outcome = run_import(&UsersImporter::default(), &store, vec![row], today()).await;

    assert_eq!(outcome.skipped, 1);
    assert_eq!(outcome.total_errors(), 3);
    let fields: Vec<&str> = outcome.failures.iter().map(|f| f.field.as_str()).collect();
    assert_eq!(fields, vec!["email", "date_of_birth", "password"]);
    assert_eq!(outcome.status(), ImportStatus::Failed);
}

#[tokio::test]
async fn test_duplicates_within_one_batch_see_earlier_rows() {
    let store = MemoryStore::new();
    let rows = vec![user_row(1), user_row(1)];
    let outcome = run_import(&UsersImporter::default(), &store, rows, today()).await;

    assert_eq!(outcome.imported, 1);
    assert_eq!(outcome.failures[0].row, 2);
    assert_eq!(outcome.failures.len(), 2);
}

#[tokio::test]
async fn test_imported_users_get_member_role() {
    let store = MemoryStore::new();
    run_import(&UsersImporter::default(), &store, vec![user_row(1)], today()).await;

    let user = &store.users()[0];
    assert_eq!(store.roles_of(user.id), vec!["member"]);
    assert_eq!(user.age, Some(34));
}

#[tokio::test]
async fn test_mobile_number_longer_than_column_is_rejected() {
    let store = MemoryStore::new();
    let rows = vec![
        user_row(1).with("mobile_number", "0".repeat(51)),
        user_row(2).with("mobile_number", "0".repeat(50)),
    ];

    let outcome = run_import(&UsersImporter::default(), &store, rows, today()).await;

    assert_eq!(outcome.imported, 1);
    assert_eq!(outcome.skipped, 1);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].row, 1);
    assert_eq!(outcome.failures[0].field, "mobile_number");
    assert_eq!(
        outcome.failures[0].messages,
        vec!["The mobile number must not be greater than 50 characters."]
    );
    assert_eq!(store.users()[0].mobile_number.len(), 50);
}

#[tokio::test]
async fn test_posts_require_adult_existing_author() {
    let store = MemoryStore::new();
    let adult = store.seed_user("Ada", "ada@example.com", "0771", Some(date(1990, 1, 1)));
    let minor = store.seed_user("Kid", "kid@example.com", "0772", Some(date(2010, 1, 1)));

    let post = |title: &str, user: String| {
        RawRow::new()
            .with("title", title)
            .with("body", "Body text")
            .with("user_id", user)
    };
    let rows = vec![
        post("First", adult.id.to_string()),
        post("Second", minor.id.to_string()),
        post("Third", "404".into()),
        post("First", adult.id.to_string()),
    ];

    let outcome = run_import(&PostsImporter::new(), &store, rows, today()).await;

    assert_eq!(outcome.imported, 1);
    assert_eq!(outcome.skipped, 3);
    let messages: Vec<&str> = outcome
        .failures
        .iter()
        .map(|f| f.messages[0].as_str())
        .collect();
    assert_eq!(
        messages,
        vec![
            "The user must be at least 18 years old to create a post.",
            "The specified user does not exist in the database.",
            "A post with this title already exists in the database.",
        ]
    );
    assert_eq!(store.posts()[0].user_id, adult.id);
}

/// Store whose inserts always hit a constraint the rules do not know about.
struct RejectingStore(MemoryStore);

#[async_trait]
impl ImportStore for RejectingStore {
    async fn exists(&self, key: LookupKey, value: &str) -> Result<bool, StoreError> {
        self.0.exists(key, value).await
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        self.0.find_user(id).await
    }

    async fn insert_user(&self, _user: NewUser, _role: &str) -> Result<User, StoreError> {
        Err(StoreError::UniqueViolation("users_email_lower_key".into()))
    }

    async fn insert_post(&self, post: NewPost) -> Result<Post, StoreError> {
        self.0.insert_post(post).await
    }
}

#[tokio::test]
async fn test_persist_errors_become_row_errors() {
    let store = RejectingStore(MemoryStore::new());
    let outcome = run_import(
        &UsersImporter::default(),
        &store,
        vec![user_row(1), user_row(2)],
        today(),
    )
    .await;

    assert_eq!(outcome.imported, 0);
    assert_eq!(outcome.skipped, 2);
    assert!(outcome.failures.is_empty());
    assert_eq!(
        outcome.errors[1],
        "Row 2: duplicate value violates unique constraint \"users_email_lower_key\""
    );
    assert_eq!(outcome.status(), ImportStatus::Failed);
}

#[tokio::test]
async fn test_csv_upload_end_to_end() {
    let bytes = CsvFixture::new(["Name", "Email", "Mobile Number", "Address", "Date of Birth"])
        .row(["Ada", "ada@example.com", "0771", "1 Loop Rd", "15/01/1990"])
        .row(["", "", "", "", ""])
        .row(["Grace", "grace@example.com", "0772", "2 Loop Rd", "1985-12-09"])
        .to_bytes();

    let rows = read_rows(&bytes, SourceFormat::Csv).unwrap();
    let store = MemoryStore::new();
    let outcome = run_import(&UsersImporter::default(), &store, rows, today()).await;

    assert_eq!(outcome.imported, 2);
    assert_eq!(outcome.status(), ImportStatus::Completed);
}

#[tokio::test]
async fn test_xlsx_upload_end_to_end() {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, heading) in ["Title", "Body", "User ID"].iter().enumerate() {
        sheet.write_string(0, col as u16, *heading).unwrap();
    }
    sheet.write_string(1, 0, "From a sheet").unwrap();
    sheet.write_string(1, 1, "Body").unwrap();
    sheet.write_number(1, 2, 1.0).unwrap();
    let bytes = workbook.save_to_buffer().unwrap();

    let rows = read_rows(&bytes, SourceFormat::Xlsx).unwrap();
    assert_eq!(rows[0].get("user_id"), Some("1"));

    let store = MemoryStore::new();
    store.seed_user("Ada", "ada@example.com", "0771", Some(date(1990, 1, 1)));
    let outcome = run_import(&PostsImporter::new(), &store, rows, today()).await;
    assert_eq!(outcome.imported, 1);
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn test_missing_required_field_skips_row(field in prop::sample::select(
        vec!["name", "email", "mobile_number", "address", "date_of_birth"]
    )) {
        let outcome = runtime().block_on(async {
            let store = MemoryStore::new();
            let row = user_row(1).with(field, "");
            run_import(&UsersImporter::default(), &store, vec![row], today()).await
        });
        prop_assert_eq!(outcome.imported, 0);
        prop_assert_eq!(outcome.skipped, 1);
        prop_assert_eq!(outcome.failures.len(), 1);
        prop_assert_eq!(outcome.failures[0].row, 1);
        prop_assert_eq!(outcome.failures[0].field.as_str(), field);
    }

    #[test]
    fn test_second_import_hits_uniqueness(n in 1usize..50) {
        let (first, second) = runtime().block_on(async {
            let store = MemoryStore::new();
            let importer = PostsImporter::new();
            store.seed_user("Ada", "ada@example.com", "0771", Some(date(1990, 1, 1)));
            let row = RawRow::new()
                .with("title", format!("Post {n}"))
                .with("body", "Body")
                .with("user_id", "1");
            let first = run_import(&importer, &store, vec![row.clone()], today()).await;
            let second = run_import(&importer, &store, vec![row], today()).await;
            (first, second)
        });
        prop_assert_eq!(first.imported, 1);
        prop_assert_eq!(second.imported, 0);
        prop_assert_eq!(second.failures[0].field.as_str(), "title");
    }
}
