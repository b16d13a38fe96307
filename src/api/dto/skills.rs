use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FromRecord, required};
use crate::api::de::{flexible_bool, flexible_i32, trimmed};
use crate::error::AppError;
use crate::repos::skill_repo::{SkillFields, SkillRow};
use crate::services::id_codec::IdCodec;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRequest {
    #[serde(default, deserialize_with = "trimmed")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "flexible_i32")]
    pub percentage: Option<i32>,
    /// Icon path or class name; an uploaded `icon` file takes precedence.
    #[serde(default, deserialize_with = "trimmed")]
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "flexible_i32")]
    pub order: Option<i32>,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_active: Option<bool>,
}

impl SkillRequest {
    /// `current_icon` is the stored icon when updating.
    pub fn into_fields(
        self,
        uploaded_icon: Option<String>,
        current_icon: Option<&str>,
    ) -> Result<SkillFields, &'static str> {
        let name = required(self.name, "name is required")?;
        let percentage = self.percentage.ok_or("percentage is required")?;
        if !(0..=100).contains(&percentage) {
            return Err("percentage must be between 0 and 100");
        }
        let icon = uploaded_icon
            .or(self.icon)
            .or_else(|| current_icon.map(str::to_string));

        Ok(SkillFields {
            name,
            percentage,
            icon: required(icon, "icon is required")?,
            sort_order: self.order.unwrap_or(0),
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillResponse {
    pub id: String,
    pub name: String,
    pub percentage: i32,
    pub icon: String,
    pub order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromRecord<SkillRow> for SkillResponse {
    fn from_record(codec: &IdCodec, row: SkillRow) -> Result<Self, AppError> {
        Ok(Self {
            id: codec.encode(row.id)?,
            name: row.name,
            percentage: row.percentage,
            icon: row.icon,
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

    fn req(v: serde_json::Value) -> SkillRequest {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn percentage_bounds() {
        let ok = req(json!({"name": "Rust", "percentage": "100", "icon": "fa-rust"}));
        assert_eq!(ok.into_fields(None, None).unwrap().percentage, 100);

        let low = req(json!({"name": "Rust", "percentage": -1, "icon": "fa-rust"}));
        assert!(low.into_fields(None, None).is_err());

        let high = req(json!({"name": "Rust", "percentage": 101, "icon": "fa-rust"}));
        assert!(high.into_fields(None, None).is_err());
    }

    #[test]
    fn icon_precedence_and_default_order() {
        let r = req(json!({"name": "Rust", "percentage": 80, "icon": "typed"}));
        let f = r
            .into_fields(Some("/uploads/skills/up.svg".into()), Some("/uploads/skills/old.svg"))
            .unwrap();
        assert_eq!(f.icon, "/uploads/skills/up.svg");
        assert_eq!(f.sort_order, 0);

        let r = req(json!({"name": "Rust", "percentage": 80}));
        let f = r.into_fields(None, Some("/uploads/skills/old.svg")).unwrap();
        assert_eq!(f.icon, "/uploads/skills/old.svg");

        let r = req(json!({"name": "Rust", "percentage": 80}));
        assert_eq!(r.into_fields(None, None).unwrap_err(), "icon is required");
    }
}
