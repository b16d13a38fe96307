use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FromRecord, required};
use crate::api::de::{flexible_bool, flexible_i32, string_list, trimmed};
use crate::error::AppError;
use crate::repos::portfolio_repo::{PortfolioFields, PortfolioRow};
use crate::services::id_codec::IdCodec;

pub const CATEGORIES: [&str; 5] = ["uxui", "branding", "mobile-app", "web-design", "graphics"];
pub const DEFAULT_CATEGORY: &str = "web-design";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioRequest {
    #[serde(default, deserialize_with = "trimmed")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    pub short_description: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    pub long_description: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    pub category: Option<String>,
    /// Existing `/uploads/...` path; an uploaded `image` file takes precedence.
    #[serde(default, deserialize_with = "trimmed")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub gallery_images: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub removed_gallery_images: Vec<String>,
    #[serde(default, deserialize_with = "flexible_i32")]
    pub order: Option<i32>,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_active: Option<bool>,
}

/// Files uploaded alongside the form.
#[derive(Debug, Default)]
pub struct PortfolioUploads {
    pub image: Option<String>,
    pub gallery: Vec<String>,
}

/// Merged update plus the stored files it no longer references.
#[derive(Debug)]
pub struct PortfolioUpdate {
    pub fields: PortfolioFields,
    pub orphaned: Vec<String>,
}

fn check_category(category: Option<String>) -> Result<Option<String>, &'static str> {
    match category {
        Some(c) if !CATEGORIES.contains(&c.as_str()) => Err("unknown portfolio category"),
        other => Ok(other),
    }
}

impl PortfolioRequest {
    pub fn into_new(self, uploads: PortfolioUploads) -> Result<PortfolioFields, &'static str> {
        let title = required(self.title, "title is required")?;
        let short_description = required(self.short_description, "shortDescription is required")?;
        let long_description = required(self.long_description, "longDescription is required")?;
        let category = check_category(self.category)?.unwrap_or_else(|| DEFAULT_CATEGORY.into());
        let image = required(uploads.image.or(self.image), "image is required")?;

        let mut gallery_images = self.gallery_images;
        gallery_images.extend(uploads.gallery);

        Ok(PortfolioFields {
            title,
            image,
            gallery_images,
            short_description,
            long_description,
            category,
            sort_order: self.order.unwrap_or(1),
            is_active: self.is_active.unwrap_or(true),
        })
    }

    /// Partial update: absent fields keep their stored value.
    pub fn merge_into(
        self,
        existing: &PortfolioRow,
        uploads: PortfolioUploads,
    ) -> Result<PortfolioUpdate, &'static str> {
        let mut fields = PortfolioFields::from(existing);
        let mut orphaned = Vec::new();

        if let Some(title) = self.title {
            fields.title = title;
        }
        if let Some(s) = self.short_description {
            fields.short_description = s;
        }
        if let Some(s) = self.long_description {
            fields.long_description = s;
        }
        if let Some(c) = check_category(self.category)? {
            fields.category = c;
        }
        if let Some(order) = self.order {
            fields.sort_order = order;
        }
        if let Some(active) = self.is_active {
            fields.is_active = active;
        }

        if let Some(image) = uploads.image.or(self.image)
            && image != fields.image
        {
            orphaned.push(std::mem::replace(&mut fields.image, image));
        }

        if !self.removed_gallery_images.is_empty() {
            let (removed, kept): (Vec<_>, Vec<_>) = fields
                .gallery_images
                .into_iter()
                .partition(|p| self.removed_gallery_images.contains(p));
            fields.gallery_images = kept;
            orphaned.extend(removed);
        }
        fields.gallery_images.extend(uploads.gallery);

        Ok(PortfolioUpdate { fields, orphaned })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioResponse {
    pub id: String,
    pub title: String,
    pub image: String,
    pub gallery_images: Vec<String>,
    pub short_description: String,
    pub long_description: String,
    pub category: String,
    pub order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromRecord<PortfolioRow> for PortfolioResponse {
    fn from_record(codec: &IdCodec, row: PortfolioRow) -> Result<Self, AppError> {
        Ok(Self {
            id: codec.encode(row.id)?,
            title: row.title,
            image: row.image,
            gallery_images: row.gallery_images,
            short_description: row.short_description,
            long_description: row.long_description,
            category: row.category,
            order: row.sort_order,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Detail page: the item plus its cyclic neighbours among active items.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioDetailResponse {
    pub portfolio: PortfolioResponse,
    pub next_portfolio: Option<PortfolioResponse>,
    pub prev_portfolio: Option<PortfolioResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row() -> PortfolioRow {
        PortfolioRow {
            id: 7,
            title: "Old".into(),
            image: "/uploads/portfolio/old.png".into(),
            gallery_images: vec![
                "/uploads/portfolio/gallery/a.png".into(),
                "/uploads/portfolio/gallery/b.png".into(),
            ],
            short_description: "s".into(),
            long_description: "l".into(),
            category: "branding".into(),
            sort_order: 3,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn req(v: serde_json::Value) -> PortfolioRequest {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn create_requires_an_image() {
        let r = req(json!({"title": "t", "shortDescription": "s", "longDescription": "l"}));
        assert_eq!(r.into_new(PortfolioUploads::default()).unwrap_err(), "image is required");
    }

    #[test]
    fn create_defaults_category_and_appends_gallery() {
        let r = req(json!({"title": "t", "shortDescription": "s", "longDescription": "l"}));
        let f = r
            .into_new(PortfolioUploads {
                image: Some("/uploads/portfolio/x.png".into()),
                gallery: vec!["/uploads/portfolio/gallery/g.png".into()],
            })
            .unwrap();
        assert_eq!(f.category, DEFAULT_CATEGORY);
        assert_eq!(f.gallery_images, vec!["/uploads/portfolio/gallery/g.png"]);
    }

    #[test]
    fn unknown_category_is_rejected() {
        let r = req(json!({
            "title": "t", "shortDescription": "s", "longDescription": "l",
            "image": "/uploads/portfolio/x.png", "category": "poetry"
        }));
        assert!(r.into_new(PortfolioUploads::default()).is_err());
    }

    #[test]
    fn merge_keeps_absent_fields_and_reports_orphans() {
        let existing = row();
        let r = req(json!({
            "title": "New",
            "removedGalleryImages": "[\"/uploads/portfolio/gallery/a.png\"]"
        }));
        let update = r
            .merge_into(
                &existing,
                PortfolioUploads {
                    image: Some("/uploads/portfolio/new.png".into()),
                    gallery: vec!["/uploads/portfolio/gallery/c.png".into()],
                },
            )
            .unwrap();

        assert_eq!(update.fields.title, "New");
        assert_eq!(update.fields.category, "branding");
        assert_eq!(update.fields.sort_order, 3);
        assert_eq!(update.fields.image, "/uploads/portfolio/new.png");
        assert_eq!(
            update.fields.gallery_images,
            vec![
                "/uploads/portfolio/gallery/b.png",
                "/uploads/portfolio/gallery/c.png"
            ]
        );
        assert_eq!(
            update.orphaned,
            vec![
                "/uploads/portfolio/old.png",
                "/uploads/portfolio/gallery/a.png"
            ]
        );
    }

    #[test]
    fn removing_an_unknown_gallery_path_orphans_nothing() {
        let r = req(json!({"removedGalleryImages": ["/uploads/elsewhere.png"]}));
        let update = r.merge_into(&row(), PortfolioUploads::default()).unwrap();
        assert!(update.orphaned.is_empty());
        assert_eq!(update.fields.gallery_images.len(), 2);
    }
}
