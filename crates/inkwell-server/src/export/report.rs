use crate::db::repo::{posts::PostView, users::UserWithRoles};
use chrono::{DateTime, Utc};

const BODY_PREVIEW_CHARS: usize = 50;

/// A titled table ready to render.
#[derive(Debug, Clone)]
pub struct Report {
    pub title: &'static str,
    /// Noun used in the total line, e.g. "Users".
    pub subject: &'static str,
    pub heading: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
    pub generated_at: DateTime<Utc>,
}

impl Report {
    pub fn users(users: &[UserWithRoles], generated_at: DateTime<Utc>) -> Self {
        let rows = users
            .iter()
            .map(|entry| {
                let user = &entry.user;
                vec![
                    user.id.to_string(),
                    user.name.clone(),
                    user.email.clone(),
                    user.mobile_number.clone(),
                    user.address.clone(),
                    user.date_of_birth
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_default(),
                    or_na(entry.roles.join(", ")),
                    user.created_at.format("%Y-%m-%d").to_string(),
                ]
            })
            .collect();

        Self {
            title: "Users Report",
            subject: "Users",
            heading: vec![
                "ID",
                "Name",
                "Email",
                "Mobile Number",
                "Address",
                "Date of Birth",
                "Roles",
                "Created",
            ],
            rows,
            generated_at,
        }
    }

    pub fn posts(posts: &[PostView], generated_at: DateTime<Utc>) -> Self {
        let rows = posts
            .iter()
            .map(|view| {
                let categories: Vec<&str> =
                    view.categories.iter().map(|c| c.name.as_str()).collect();
                vec![
                    view.post.id.to_string(),
                    view.post.title.clone(),
                    preview(&view.post.body, BODY_PREVIEW_CHARS),
                    or_na(view.user.name.clone()),
                    or_na(categories.join(", ")),
                    view.post.created_at.format("%Y-%m-%d").to_string(),
                ]
            })
            .collect();

        Self {
            title: "Posts Report",
            subject: "Posts",
            heading: vec!["ID", "Title", "Body", "Author", "Categories", "Created"],
            rows,
            generated_at,
        }
    }

    pub fn record_count(&self) -> usize {
        self.rows.len()
    }

    pub fn generated_line(&self) -> String {
        format!(
            "Generated on: {}",
            self.generated_at.format("%B %d, %Y %I:%M %p")
        )
    }

    pub fn total_line(&self) -> String {
        format!("Total {}: {}", self.subject, self.record_count())
    }
}

/// First `limit` characters of `text`, with an ellipsis when cut.
fn preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", text[..cut].trim_end()),
        None => text.to_string(),
    }
}

fn or_na(value: String) -> String {
    if value.is_empty() {
        "N/A".to_string()
    } else {
        value
    }
}
