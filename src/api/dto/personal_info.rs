/*
 * Responsibility
 * - Site-owner profile (singleton): upsert request merged onto the stored row
 * - Social links arrive as a JSON array (or a JSON string of one from forms);
 *   `socialIcon_<n>` uploads attach to the n-th kept link
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FromRecord, is_email};
use crate::api::de::{flexible_i32, json_or_string, trimmed};
use crate::error::AppError;
use crate::repos::personal_info_repo::{PersonalInfoFields, PersonalInfoRow, SocialLink};
use crate::services::id_codec::IdCodec;

#[derive(Debug, Default, Deserialize)]
pub struct SocialLinkInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfoRequest {
    #[serde(default, deserialize_with = "trimmed")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "flexible_i32")]
    pub years_of_experience: Option<i32>,
    #[serde(default, deserialize_with = "flexible_i32")]
    pub projects_completed: Option<i32>,
    #[serde(default, deserialize_with = "flexible_i32")]
    pub happy_clients: Option<i32>,
    #[serde(default, deserialize_with = "json_or_string")]
    pub social_links: Option<Vec<SocialLinkInput>>,
}

#[derive(Debug, Default)]
pub struct PersonalInfoUploads {
    pub logo: Option<String>,
    pub profile_image: Option<String>,
    pub cv_file: Option<String>,
    /// `(index, public path)` for each `socialIcon_<index>` upload.
    pub social_icons: Vec<(usize, String)>,
}

#[derive(Debug)]
pub struct PersonalInfoUpdate {
    pub fields: PersonalInfoFields,
    pub orphaned: Vec<String>,
}

fn replace_file(slot: &mut String, new: Option<String>, orphaned: &mut Vec<String>) {
    if let Some(new) = new
        && new != *slot
    {
        let old = std::mem::replace(slot, new);
        if !old.is_empty() {
            orphaned.push(old);
        }
    }
}

fn keep_links(inputs: Vec<SocialLinkInput>, icons: &[(usize, String)]) -> Vec<SocialLink> {
    inputs
        .into_iter()
        .filter_map(|l| {
            let name = l.name.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())?;
            let url = l.url.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())?;
            Some((name, url, l.icon.unwrap_or_default()))
        })
        .enumerate()
        .map(|(i, (name, url, icon))| {
            let uploaded = icons.iter().find(|(n, _)| *n == i).map(|(_, p)| p.clone());
            SocialLink {
                name,
                url,
                icon: uploaded.unwrap_or(icon),
            }
        })
        .collect()
}

impl PersonalInfoRequest {
    /// `existing` is `None` when the profile is created by this request.
    pub fn merge_into(
        self,
        existing: Option<&PersonalInfoRow>,
        uploads: PersonalInfoUploads,
    ) -> Result<PersonalInfoUpdate, &'static str> {
        let creating = existing.is_none();
        let mut fields = existing.map(PersonalInfoFields::from).unwrap_or_default();
        let mut orphaned = Vec::new();

        if creating && (self.name.is_none() || self.title.is_none() || self.email.is_none()) {
            return Err("name, title and email are required");
        }
        if let Some(email) = &self.email
            && !is_email(email)
        {
            return Err("email is not a valid address");
        }
        let counters = [self.years_of_experience, self.projects_completed, self.happy_clients];
        if counters.iter().flatten().any(|n| *n < 0) {
            return Err("counters cannot be negative");
        }

        let text = [
            (&mut fields.name, self.name),
            (&mut fields.title, self.title),
            (&mut fields.bio, self.bio),
            (&mut fields.email, self.email),
            (&mut fields.phone, self.phone),
            (&mut fields.address, self.address),
        ];
        for (slot, value) in text {
            if let Some(v) = value {
                *slot = v;
            }
        }
        if let Some(n) = self.years_of_experience {
            fields.years_of_experience = n;
        }
        if let Some(n) = self.projects_completed {
            fields.projects_completed = n;
        }
        if let Some(n) = self.happy_clients {
            fields.happy_clients = n;
        }

        replace_file(&mut fields.logo, uploads.logo, &mut orphaned);
        replace_file(&mut fields.profile_image, uploads.profile_image, &mut orphaned);
        replace_file(&mut fields.cv_file, uploads.cv_file, &mut orphaned);

        if let Some(inputs) = self.social_links {
            let links = keep_links(inputs, &uploads.social_icons);
            orphaned.extend(
                fields
                    .social_links
                    .iter()
                    .map(|l| &l.icon)
                    .filter(|icon| !icon.is_empty() && !links.iter().any(|l| &l.icon == *icon))
                    .cloned(),
            );
            fields.social_links = links;
        }

        Ok(PersonalInfoUpdate { fields, orphaned })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfoResponse {
    pub id: String,
    pub name: String,
    pub title: String,
    pub bio: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub logo: String,
    pub profile_image: String,
    pub cv_file: String,
    pub years_of_experience: i32,
    pub projects_completed: i32,
    pub happy_clients: i32,
    pub social_links: Vec<SocialLink>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromRecord<PersonalInfoRow> for PersonalInfoResponse {
    fn from_record(codec: &IdCodec, row: PersonalInfoRow) -> Result<Self, AppError> {
        Ok(Self {
            id: codec.encode(row.id)?,
            name: row.name,
            title: row.title,
            bio: row.bio,
            email: row.email,
            phone: row.phone,
            address: row.address,
            logo: row.logo,
            profile_image: row.profile_image,
            cv_file: row.cv_file,
            years_of_experience: row.years_of_experience,
            projects_completed: row.projects_completed,
            happy_clients: row.happy_clients,
            social_links: row.social_links.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sqlx::types::Json;

    fn stored() -> PersonalInfoRow {
        PersonalInfoRow {
            id: 1,
            name: "Jane".into(),
            title: "Designer".into(),
            bio: "bio".into(),
            email: "jane@example.com".into(),
            phone: "1".into(),
            address: "addr".into(),
            logo: "/uploads/logos/old.png".into(),
            profile_image: "/uploads/profiles/p.png".into(),
            cv_file: String::new(),
            years_of_experience: 5,
            projects_completed: 10,
            happy_clients: 3,
            social_links: Json(vec![SocialLink {
                name: "GitHub".into(),
                url: "https://github.com/jane".into(),
                icon: "/uploads/social-icons/gh.svg".into(),
            }]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn req(v: serde_json::Value) -> PersonalInfoRequest {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn creating_requires_identity_fields() {
        let r = req(json!({"name": "Jane"}));
        assert!(r.merge_into(None, PersonalInfoUploads::default()).is_err());

        let r = req(json!({"name": "Jane", "title": "Designer", "email": "jane@example.com"}));
        let update = r.merge_into(None, PersonalInfoUploads::default()).unwrap();
        assert_eq!(update.fields.name, "Jane");
        assert!(update.orphaned.is_empty());
    }

    #[test]
    fn partial_update_keeps_stored_values() {
        let row = stored();
        let r = req(json!({"bio": "new bio", "yearsOfExperience": "6"}));
        let update = r.merge_into(Some(&row), PersonalInfoUploads::default()).unwrap();
        assert_eq!(update.fields.name, "Jane");
        assert_eq!(update.fields.bio, "new bio");
        assert_eq!(update.fields.years_of_experience, 6);
        assert_eq!(update.fields.social_links.len(), 1);
    }

    #[test]
    fn replaced_files_are_orphaned() {
        let row = stored();
        let uploads = PersonalInfoUploads {
            logo: Some("/uploads/logos/new.png".into()),
            cv_file: Some("/uploads/cvs/cv.pdf".into()),
            ..Default::default()
        };
        let update = req(json!({})).merge_into(Some(&row), uploads).unwrap();
        assert_eq!(update.fields.logo, "/uploads/logos/new.png");
        assert_eq!(update.orphaned, vec!["/uploads/logos/old.png"]);
    }

    #[test]
    fn social_links_from_form_string_with_icon_uploads() {
        let row = stored();
        let r = req(json!({
            "socialLinks": "[{\"name\":\"\",\"url\":\"\"},{\"name\":\"X\",\"url\":\"https://x.com/jane\"}]"
        }));
        let uploads = PersonalInfoUploads {
            social_icons: vec![(0, "/uploads/social-icons/x.svg".into())],
            ..Default::default()
        };
        let update = r.merge_into(Some(&row), uploads).unwrap();
        assert_eq!(
            update.fields.social_links,
            vec![SocialLink {
                name: "X".into(),
                url: "https://x.com/jane".into(),
                icon: "/uploads/social-icons/x.svg".into(),
            }]
        );
        assert_eq!(update.orphaned, vec!["/uploads/social-icons/gh.svg"]);
    }

    #[test]
    fn bad_email_is_rejected() {
        let row = stored();
        let r = req(json!({"email": "not-an-email"}));
        assert!(r.merge_into(Some(&row), PersonalInfoUploads::default()).is_err());
    }
}
