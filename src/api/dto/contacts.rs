/*
 * Responsibility
 * - Public contact form (several historical field names per value)
 * - Admin listing filters / patch / bulk id lists
 * - Contact + stats responses
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FromRecord, is_email};
use crate::api::de::{flexible_bool, flexible_i32, string_list, trimmed};
use crate::error::AppError;
use crate::repos::contact_repo::{ContactFilter, ContactPatch, ContactRow, ContactStats, NewContact};
use crate::services::id_codec::IdCodec;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Contact form body. Older page templates post `conName`/`conEmail`/...,
/// newer ones and API clients `firstName`/`email`/...; the first non-blank wins.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    #[serde(default, deserialize_with = "trimmed")]
    con_name: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    name: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    first_name: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    fullname: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    con_l_name: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    last_name: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    con_email: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    email: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    user_email: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    con_message: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    message: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    subject: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    user_message: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    con_phone: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    phone: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    user_phone: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    con_service: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    service: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    user_service: Option<String>,
}

impl ContactForm {
    pub fn into_new_contact(self) -> Result<NewContact, &'static str> {
        let first_name = self.con_name.or(self.name).or(self.first_name).or(self.fullname);
        let email = self.con_email.or(self.email).or(self.user_email);
        let message = self
            .con_message
            .or(self.message)
            .or(self.subject)
            .or(self.user_message);

        let (Some(first_name), Some(email), Some(message)) = (first_name, email, message) else {
            return Err("Name, email, and message are required fields.");
        };
        if !is_email(&email) {
            return Err("Please provide a valid email address.");
        }

        Ok(NewContact {
            first_name,
            last_name: self.con_l_name.or(self.last_name).unwrap_or_default(),
            email,
            phone: self.con_phone.or(self.phone).or(self.user_phone).unwrap_or_default(),
            service: self
                .con_service
                .or(self.service)
                .or(self.user_service)
                .unwrap_or_default(),
            message,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ContactListQuery {
    #[serde(default, deserialize_with = "flexible_i32")]
    pub page: Option<i32>,
    #[serde(default, deserialize_with = "flexible_i32")]
    pub limit: Option<i32>,
    /// `read` | `unread` | `all`
    #[serde(default, deserialize_with = "trimmed")]
    pub status: Option<String>,
    /// service name or `all`
    #[serde(default, deserialize_with = "trimmed")]
    pub service: Option<String>,
}

impl ContactListQuery {
    pub fn page(&self) -> i64 {
        i64::from(self.page.unwrap_or(1).max(1))
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .map(i64::from)
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }

    pub fn filter(&self) -> ContactFilter {
        ContactFilter {
            is_read: match self.status.as_deref() {
                Some("read") => Some(true),
                Some("unread") => Some(false),
                _ => None,
            },
            service: self.service.clone().filter(|s| s != "all"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactUpdateRequest {
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_read: Option<bool>,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub replied: Option<bool>,
    /// Present-but-blank clears the notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<ContactUpdateRequest> for ContactPatch {
    fn from(req: ContactUpdateRequest) -> Self {
        Self {
            is_read: req.is_read,
            replied: req.replied,
            notes: req.notes.map(|n| n.trim().to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactIdsRequest {
    #[serde(default, deserialize_with = "string_list")]
    pub contact_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub service: String,
    pub message: String,
    pub is_read: bool,
    pub replied: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromRecord<ContactRow> for ContactResponse {
    fn from_record(codec: &IdCodec, row: ContactRow) -> Result<Self, AppError> {
        Ok(Self {
            id: codec.encode(row.id)?,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            service: row.service,
            message: row.message,
            is_read: row.is_read,
            replied: row.replied,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPage {
    pub contacts: Vec<ContactResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl ContactPage {
    pub fn new(contacts: Vec<ContactResponse>, total: i64, page: i64, limit: i64) -> Self {
        Self {
            contacts,
            total,
            page,
            limit,
            total_pages: (total + limit - 1) / limit,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactStatsResponse {
    pub total: i64,
    pub unread: i64,
    pub read: i64,
    pub replied: i64,
    pub this_month: i64,
}

impl From<ContactStats> for ContactStatsResponse {
    fn from(s: ContactStats) -> Self {
        Self {
            total: s.total,
            unread: s.unread,
            read: s.read,
            replied: s.replied,
            this_month: s.this_month,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkResult {
    pub message: String,
    pub affected: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(v: serde_json::Value) -> ContactForm {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn legacy_field_names_win() {
        let c = form(json!({
            "conName": "Ann", "name": "ignored", "conLName": "Lee",
            "conEmail": "ann@example.com", "conMessage": "Hello", "conService": "branding"
        }))
        .into_new_contact()
        .unwrap();
        assert_eq!(c.first_name, "Ann");
        assert_eq!(c.last_name, "Lee");
        assert_eq!(c.service, "branding");
        assert_eq!(c.phone, "");
    }

    #[test]
    fn modern_field_names() {
        let c = form(json!({
            "firstName": "Ann", "email": "ann@example.com", "subject": "Hi"
        }))
        .into_new_contact()
        .unwrap();
        assert_eq!(c.message, "Hi");
    }

    #[test]
    fn required_fields_and_email_shape() {
        let missing = form(json!({"name": "Ann", "email": "ann@example.com", "message": "  "}));
        assert_eq!(
            missing.into_new_contact().unwrap_err(),
            "Name, email, and message are required fields."
        );

        let bad = form(json!({"name": "Ann", "email": "ann-at-example", "message": "x"}));
        assert_eq!(
            bad.into_new_contact().unwrap_err(),
            "Please provide a valid email address."
        );
    }

    #[test]
    fn list_query_paging_and_filters() {
        let q: ContactListQuery =
            serde_json::from_value(json!({"page": "3", "limit": "0", "status": "unread", "service": "all"}))
                .unwrap();
        assert_eq!(q.page(), 3);
        assert_eq!(q.limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(q.offset(), 20);
        let f = q.filter();
        assert_eq!(f.is_read, Some(false));
        assert_eq!(f.service, None);

        let q = ContactListQuery {
            page: Some(-4),
            limit: Some(1000),
            ..Default::default()
        };
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), MAX_PAGE_SIZE);
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(ContactPage::new(Vec::new(), 21, 1, 10).total_pages, 3);
        assert_eq!(ContactPage::new(Vec::new(), 0, 1, 10).total_pages, 0);
    }
}
