use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FromRecord, required};
use crate::api::de::{flexible_bool, flexible_i32, trimmed};
use crate::error::AppError;
use crate::repos::education_repo::{EducationFields, EducationRow};
use crate::services::id_codec::IdCodec;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationRequest {
    #[serde(default, deserialize_with = "trimmed")]
    pub degree: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    pub institution: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    pub start_year: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    pub end_year: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    pub grade: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "flexible_i32")]
    pub order: Option<i32>,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_active: Option<bool>,
}

impl EducationRequest {
    pub fn into_fields(self) -> Result<EducationFields, &'static str> {
        Ok(EducationFields {
            degree: required(self.degree, "degree is required")?,
            institution: required(self.institution, "institution is required")?,
            location: required(self.location, "location is required")?,
            start_year: required(self.start_year, "startYear is required")?,
            end_year: required(self.end_year, "endYear is required")?,
            grade: self.grade,
            description: self.description,
            sort_order: self.order.unwrap_or(1),
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationResponse {
    pub id: String,
    pub degree: String,
    pub institution: String,
    pub location: String,
    pub start_year: String,
    pub end_year: String,
    pub grade: Option<String>,
    pub description: Option<String>,
    pub order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromRecord<EducationRow> for EducationResponse {
    fn from_record(codec: &IdCodec, row: EducationRow) -> Result<Self, AppError> {
        Ok(Self {
            id: codec.encode(row.id)?,
            degree: row.degree,
            institution: row.institution,
            location: row.location,
            start_year: row.start_year,
            end_year: row.end_year,
            grade: row.grade,
            description: row.description,
            order: row.sort_order,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
