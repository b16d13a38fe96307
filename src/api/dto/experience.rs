use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FromRecord, required};
use crate::api::de::{flexible_bool, flexible_i32, trimmed};
use crate::error::AppError;
use crate::repos::experience_repo::{ExperienceFields, ExperienceRow};
use crate::services::id_codec::IdCodec;

pub const CURRENT_POSITION: &str = "Present";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceRequest {
    #[serde(default, deserialize_with = "trimmed")]
    pub job_title: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "flexible_i32")]
    pub order: Option<i32>,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_active: Option<bool>,
}

impl ExperienceRequest {
    pub fn into_fields(self) -> Result<ExperienceFields, &'static str> {
        Ok(ExperienceFields {
            job_title: required(self.job_title, "jobTitle is required")?,
            company: required(self.company, "company is required")?,
            location: required(self.location, "location is required")?,
            start_date: required(self.start_date, "startDate is required")?,
            end_date: self.end_date.unwrap_or_else(|| CURRENT_POSITION.into()),
            description: self.description,
            sort_order: self.order.unwrap_or(1),
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceResponse {
    pub id: String,
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub description: Option<String>,
    pub order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromRecord<ExperienceRow> for ExperienceResponse {
    fn from_record(codec: &IdCodec, row: ExperienceRow) -> Result<Self, AppError> {
        Ok(Self {
            id: codec.encode(row.id)?,
            job_title: row.job_title,
            company: row.company,
            location: row.location,
            start_date: row.start_date,
            end_date: row.end_date,
            description: row.description,
            order: row.sort_order,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn end_date_defaults_to_present() {
        let req: ExperienceRequest = serde_json::from_value(json!({
            "jobTitle": "Designer", "company": "Acme", "location": "Remote",
            "startDate": "2021", "endDate": ""
        }))
        .unwrap();
        assert_eq!(req.into_fields().unwrap().end_date, CURRENT_POSITION);
    }

    #[test]
    fn missing_company_is_rejected() {
        let req: ExperienceRequest = serde_json::from_value(json!({
            "jobTitle": "Designer", "location": "Remote", "startDate": "2021"
        }))
        .unwrap();
        assert_eq!(req.into_fields().unwrap_err(), "company is required");
    }
}
