//! Feedback template rendering.
//!
//! | Placeholder   | Rendered as                       |
//! |---------------|-----------------------------------|
//! | `@commenter`  | `@<login>`                        |
//! | `@count`      | configured limit                  |
//! | `@reset-date` | `` `YYYY-MM-DD` ``                |
//! | `@req-id`     | `` `<uuid>` ``                    |
//! | `@assignees`  | `@a, @b ` (last entry, then space) |
//!
//! Placeholders without a value in the context are left as written.

use chrono::NaiveDate;
use uuid::Uuid;

const PLACEHOLDERS: [&str; 5] = [
    "@commenter",
    "@count",
    "@reset-date",
    "@req-id",
    "@assignees",
];

/// Values available to a feedback template.
#[derive(Debug, Clone, Default)]
pub struct FeedbackContext {
    pub login: String,
    pub count: Option<u32>,
    pub reset_date: Option<NaiveDate>,
    pub request_id: Option<Uuid>,
    pub assignees: Vec<String>,
}

impl FeedbackContext {
    pub fn for_actor(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            ..Default::default()
        }
    }

    /// Render a template. Blank templates render to `None`.
    pub fn render(&self, template: &str) -> Option<String> {
        if template.trim().is_empty() {
            return None;
        }

        // Single pass, so substituted logins are never re-expanded.
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(pos) = rest.find('@') {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];
            if let Some((value, consumed)) = self.substitute(tail) {
                out.push_str(&value);
                rest = &tail[consumed..];
            } else {
                out.push('@');
                rest = &tail[1..];
            }
        }
        out.push_str(rest);
        Some(out)
    }

    fn substitute(&self, tail: &str) -> Option<(String, usize)> {
        let placeholder = PLACEHOLDERS.iter().find(|p| tail.starts_with(*p))?;
        let value = match *placeholder {
            "@commenter" => format!("@{}", self.login),
            "@count" => self.count?.to_string(),
            "@reset-date" => format!("`{}`", self.reset_date?.format("%Y-%m-%d")),
            "@req-id" => format!("`{}`", self.request_id?),
            _ => mention_list(&self.assignees),
        };
        Some((value, placeholder.len()))
    }

    /// Render an optional template.
    pub fn render_opt(&self, template: Option<&String>) -> Option<String> {
        template.and_then(|t| self.render(t))
    }
}

/// `@a, @b ` for `[a, b]`; empty for no logins.
pub fn mention_list(logins: &[String]) -> String {
    let mut out = String::new();
    for (i, login) in logins.iter().enumerate() {
        out.push('@');
        out.push_str(login);
        out.push_str(if i + 1 == logins.len() { " " } else { ", " });
    }
    out
}
