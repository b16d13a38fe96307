use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FromRecord, required};
use crate::api::de::{flexible_bool, flexible_i32, trimmed};
use crate::error::AppError;
use crate::repos::service_repo::{ServiceFields, ServiceRow};
use crate::services::id_codec::IdCodec;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    #[serde(default, deserialize_with = "trimmed")]
    pub number: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "flexible_i32")]
    pub order: Option<i32>,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_active: Option<bool>,
}

impl ServiceRequest {
    pub fn into_fields(self) -> Result<ServiceFields, &'static str> {
        Ok(ServiceFields {
            number: required(self.number, "number is required")?,
            title: required(self.title, "title is required")?,
            description: required(self.description, "description is required")?,
            icon: self.icon,
            sort_order: self.order.unwrap_or(1),
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse {
    pub id: String,
    pub number: String,
    pub title: String,
    pub description: String,
    pub icon: Option<String>,
    pub order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromRecord<ServiceRow> for ServiceResponse {
    fn from_record(codec: &IdCodec, row: ServiceRow) -> Result<Self, AppError> {
        Ok(Self {
            id: codec.encode(row.id)?,
            number: row.number,
            title: row.title,
            description: row.description,
            icon: row.icon,
            order: row.sort_order,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
