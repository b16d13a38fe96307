use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FromRecord, required};
use crate::api::de::{flexible_bool, flexible_i32, trimmed};
use crate::error::AppError;
use crate::repos::testimonial_repo::{TestimonialFields, TestimonialRow};
use crate::services::id_codec::IdCodec;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialRequest {
    #[serde(default, deserialize_with = "trimmed")]
    pub client_name: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    pub designation: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    pub testimonial_text: Option<String>,
    #[serde(default, deserialize_with = "flexible_i32")]
    pub rating: Option<i32>,
    #[serde(default, deserialize_with = "flexible_i32")]
    pub order: Option<i32>,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_active: Option<bool>,
}

/// Image paths for a testimonial: freshly uploaded, else whatever is stored.
#[derive(Debug, Default)]
pub struct TestimonialImages {
    pub client_image: String,
    pub company_logo: String,
}

impl TestimonialRequest {
    pub fn into_fields(self, images: TestimonialImages) -> Result<TestimonialFields, &'static str> {
        let rating = self.rating.unwrap_or(5);
        if !(1..=5).contains(&rating) {
            return Err("rating must be between 1 and 5");
        }

        Ok(TestimonialFields {
            client_name: required(self.client_name, "clientName is required")?,
            designation: required(self.designation, "designation is required")?,
            company: required(self.company, "company is required")?,
            testimonial_text: required(self.testimonial_text, "testimonialText is required")?,
            client_image: images.client_image,
            company_logo: images.company_logo,
            rating,
            sort_order: self.order.unwrap_or(1),
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialResponse {
    pub id: String,
    pub client_name: String,
    pub designation: String,
    pub company: String,
    pub testimonial_text: String,
    pub client_image: String,
    pub company_logo: String,
    pub rating: i32,
    pub order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromRecord<TestimonialRow> for TestimonialResponse {
    fn from_record(codec: &IdCodec, row: TestimonialRow) -> Result<Self, AppError> {
        Ok(Self {
            id: codec.encode(row.id)?,
            client_name: row.client_name,
            designation: row.designation,
            company: row.company,
            testimonial_text: row.testimonial_text,
            client_image: row.client_image,
            company_logo: row.company_logo,
            rating: row.rating,
            order: row.sort_order,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
