/*
 * Responsibility
 * - One request-body extractor for JSON, urlencoded and multipart bodies
 * - Text fields become a JSON object (repeated keys / `key[]` become arrays) so a
 *   single serde DTO serves every body type
 * - File parts are held in memory until the handler decides which upload targets it accepts
 */
use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::{StatusCode, header},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::services::upload::{StoredUpload, UploadError, UploadStore, UploadTarget};

pub struct IncomingFile {
    pub field: String,
    pub target: UploadTarget,
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Default)]
pub struct Payload {
    fields: Map<String, Value>,
    files: Vec<IncomingFile>,
}

fn bad_body(message: impl Into<String>) -> AppError {
    AppError::bad_request("INVALID_BODY", message)
}

/// Body-limit hits become 413; anything else is a malformed body.
fn body_error(status: StatusCode, message: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        bad_body(message)
    }
}

impl Payload {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut payload = Self::default();
        for (k, v) in pairs {
            payload.push_field(k.as_ref(), Value::String(v.into()));
        }
        payload
    }

    fn push_field(&mut self, key: &str, value: Value) {
        let (key, force_list) = match key.strip_suffix("[]") {
            Some(k) => (k, true),
            None => (key, false),
        };

        match self.fields.get_mut(key) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None if force_list => {
                self.fields.insert(key.to_string(), Value::Array(vec![value]));
            }
            None => {
                self.fields.insert(key.to_string(), value);
            }
        }
    }

    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        serde_json::from_value(Value::Object(self.fields.clone()))
            .map_err(|e| AppError::bad_request("VALIDATION_ERROR", e.to_string()))
    }

    /// For forms that take no uploads at all.
    pub fn no_files(&self) -> Result<(), AppError> {
        match self.files.first() {
            Some(f) => Err(UploadError::UnexpectedField(f.field.clone()).into()),
            None => Ok(()),
        }
    }

    /// Validate every file against `allowed` and the per-target count cap, then
    /// write them all. Nothing is left on disk when any file is rejected or a write fails.
    pub async fn save_files(
        &self,
        uploads: &UploadStore,
        allowed: &[UploadTarget],
    ) -> Result<SavedFiles, AppError> {
        for f in &self.files {
            if !allowed.iter().any(|a| a.same_slot(&f.target)) {
                return Err(UploadError::UnexpectedField(f.field.clone()).into());
            }
            uploads.validate(f.target, &f.field, &f.content_type, f.bytes.len())?;

            let sent = self.files.iter().filter(|o| o.target == f.target).count();
            if sent > f.target.max_count() {
                return Err(UploadError::TooMany {
                    field: f.field.clone(),
                    max: f.target.max_count(),
                }
                .into());
            }
        }

        let mut saved = Vec::with_capacity(self.files.len());
        for f in &self.files {
            let res = uploads
                .save(
                    f.target,
                    &f.field,
                    f.file_name.as_deref(),
                    &f.content_type,
                    &f.bytes,
                )
                .await;
            match res {
                Ok(s) => saved.push(s),
                Err(e) => {
                    uploads.discard(&saved).await;
                    return Err(e.into());
                }
            }
        }
        Ok(SavedFiles(saved))
    }
}

/// Files written for the current request.
#[derive(Debug, Default)]
pub struct SavedFiles(Vec<StoredUpload>);

impl SavedFiles {
    pub fn first(&self, target: UploadTarget) -> Option<String> {
        self.0
            .iter()
            .find(|s| s.target == target)
            .map(|s| s.public_path.clone())
    }

    pub fn all(&self, target: UploadTarget) -> Vec<String> {
        self.0
            .iter()
            .filter(|s| s.target == target)
            .map(|s| s.public_path.clone())
            .collect()
    }

    /// `(index, path)` of every `socialIcon_<index>` upload.
    pub fn social_icons(&self) -> Vec<(usize, String)> {
        self.0
            .iter()
            .filter_map(|s| match s.target {
                UploadTarget::SocialIcon(i) => Some((i, s.public_path.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub async fn discard(self, uploads: &UploadStore) {
        uploads.discard(&self.0).await;
    }

    /// Keep the files if `result` is a success, remove them otherwise.
    pub async fn settle<T>(
        self,
        uploads: &UploadStore,
        result: Result<T, AppError>,
    ) -> Result<T, AppError> {
        if result.is_err() && !self.is_empty() {
            tracing::info!(count = self.0.len(), "discarding uploads of failed request");
            self.discard(uploads).await;
        }
        result
    }
}

impl<S: Send + Sync> FromRequest<S> for Payload {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| body_error(e.status(), e.body_text()))?;
            return read_multipart(multipart).await;
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| body_error(e.status(), e.body_text()))?;

        if bytes.is_empty() {
            return Ok(Self::default());
        }

        if content_type.starts_with("application/json") {
            return match serde_json::from_slice::<Value>(&bytes) {
                Ok(Value::Object(fields)) => Ok(Self {
                    fields,
                    files: Vec::new(),
                }),
                Ok(_) => Err(bad_body("expected a JSON object")),
                Err(e) => Err(bad_body(e.to_string())),
            };
        }

        Ok(Self::from_pairs(url::form_urlencoded::parse(&bytes).into_owned()))
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<Payload, AppError> {
    let mut payload = Payload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| body_error(e.status(), e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        let Some(file_name) = field.file_name().map(str::to_string) else {
            let text = field
                .text()
                .await
                .map_err(|e| body_error(e.status(), e.body_text()))?;
            payload.push_field(&name, Value::String(text));
            continue;
        };

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| body_error(e.status(), e.body_text()))?;

        // browsers send an empty part for an untouched file input
        if file_name.is_empty() && bytes.is_empty() {
            continue;
        }

        let target = UploadTarget::from_field(&name)
            .ok_or_else(|| AppError::from(UploadError::UnexpectedField(name.clone())))?;

        payload.files.push(IncomingFile {
            field: name,
            target,
            file_name: Some(file_name).filter(|n| !n.is_empty()),
            content_type,
            bytes,
        });
    }

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        title: String,
        #[serde(default, deserialize_with = "crate::api::de::string_list")]
        ids: Vec<String>,
    }

    #[test]
    fn repeated_and_bracket_keys_become_lists() {
        let p = Payload::from_pairs([("title", "x"), ("ids", "a"), ("ids", "b")]);
        let sample: Sample = p.parse().unwrap();
        assert_eq!(sample.title, "x");
        assert_eq!(sample.ids, vec!["a", "b"]);

        let p = Payload::from_pairs([("title", "x"), ("ids[]", "a")]);
        let sample: Sample = p.parse().unwrap();
        assert_eq!(sample.ids, vec!["a"]);
    }

    #[test]
    fn missing_required_field_is_validation_error() {
        let p = Payload::from_pairs([("ids", "a")]);
        let err = p.parse::<Sample>().unwrap_err();
        assert!(matches!(err, AppError::BadRequest { code: "VALIDATION_ERROR", .. }));
    }

    #[tokio::test]
    async fn disallowed_file_field_is_rejected_before_writing() {
        let mut p = Payload::default();
        p.files.push(IncomingFile {
            field: "logo".into(),
            target: UploadTarget::Logo,
            file_name: Some("l.png".into()),
            content_type: "image/png".into(),
            bytes: Bytes::from_static(b"png"),
        });
        let store = UploadStore::new("/nonexistent-upload-root");
        let err = p
            .save_files(&store, &[UploadTarget::SkillIcon])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest { code: "INVALID_UPLOAD", .. }));
    }

    #[test]
    fn forms_without_uploads_reject_files() {
        let mut p = Payload::from_pairs([("title", "x")]);
        assert!(p.no_files().is_ok());
        p.files.push(IncomingFile {
            field: "icon".into(),
            target: UploadTarget::SkillIcon,
            file_name: None,
            content_type: "image/png".into(),
            bytes: Bytes::from_static(b"png"),
        });
        assert!(p.no_files().is_err());
    }

    #[tokio::test]
    async fn settle_removes_files_only_on_failure() {
        let dir = std::env::temp_dir().join(format!("payload-settle-{}", uuid::Uuid::new_v4()));
        let store = UploadStore::new(&dir);
        store.ensure_dirs().await.unwrap();

        let mut p = Payload::default();
        p.files.push(IncomingFile {
            field: "icon".into(),
            target: UploadTarget::SkillIcon,
            file_name: Some("i.png".into()),
            content_type: "image/png".into(),
            bytes: Bytes::from_static(b"png"),
        });

        let files = p.save_files(&store, &[UploadTarget::SkillIcon]).await.unwrap();
        let kept = files.first(UploadTarget::SkillIcon).unwrap();
        files.settle(&store, Ok::<_, AppError>(())).await.unwrap();
        assert!(store.resolve(&kept).unwrap().exists());

        let files = p.save_files(&store, &[UploadTarget::SkillIcon]).await.unwrap();
        let dropped = files.first(UploadTarget::SkillIcon).unwrap();
        let res = files.settle(&store, Err::<(), _>(AppError::Internal)).await;
        assert!(res.is_err());
        assert!(!store.resolve(&dropped).unwrap().exists());

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn wrong_mime_is_rejected() {
        let mut p = Payload::default();
        p.files.push(IncomingFile {
            field: "cvFile".into(),
            target: UploadTarget::Cv,
            file_name: Some("cv.png".into()),
            content_type: "image/png".into(),
            bytes: Bytes::from_static(b"png"),
        });
        let store = UploadStore::new("/nonexistent-upload-root");
        assert!(p.save_files(&store, &[UploadTarget::Cv]).await.is_err());
    }

    fn image_part(field: &str, target: UploadTarget) -> IncomingFile {
        IncomingFile {
            field: field.into(),
            target,
            file_name: Some("p.png".into()),
            content_type: "image/png".into(),
            bytes: Bytes::from_static(b"png"),
        }
    }

    async fn files_in(dir: &std::path::Path) -> usize {
        let mut n = 0;
        let mut entries = tokio::fs::read_dir(dir).await.unwrap();
        while let Some(e) = entries.next_entry().await.unwrap() {
            if e.file_type().await.unwrap().is_file() {
                n += 1;
            }
        }
        n
    }

    #[tokio::test]
    async fn second_file_for_a_single_slot_writes_nothing() {
        let dir = std::env::temp_dir().join(format!("payload-count-{}", uuid::Uuid::new_v4()));
        let store = UploadStore::new(&dir);
        store.ensure_dirs().await.unwrap();

        let mut p = Payload::default();
        p.files.push(image_part("image", UploadTarget::PortfolioImage));
        p.files.push(image_part("image", UploadTarget::PortfolioImage));

        let err = p
            .save_files(&store, &[UploadTarget::PortfolioImage, UploadTarget::GalleryImage])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest { code: "INVALID_UPLOAD", .. }));
        assert_eq!(files_in(&dir.join("portfolio")).await, 0);

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn gallery_is_capped_at_ten() {
        let dir = std::env::temp_dir().join(format!("payload-gallery-{}", uuid::Uuid::new_v4()));
        let store = UploadStore::new(&dir);
        store.ensure_dirs().await.unwrap();

        let mut p = Payload::default();
        for _ in 0..10 {
            p.files.push(image_part("galleryImages", UploadTarget::GalleryImage));
        }
        let saved = p.save_files(&store, &[UploadTarget::GalleryImage]).await.unwrap();
        assert_eq!(saved.all(UploadTarget::GalleryImage).len(), 10);
        saved.discard(&store).await;

        p.files.push(image_part("galleryImages", UploadTarget::GalleryImage));
        assert!(p.save_files(&store, &[UploadTarget::GalleryImage]).await.is_err());
        assert_eq!(files_in(&dir.join("portfolio/gallery")).await, 0);

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn social_icon_cap_is_per_index() {
        let mut p = Payload::default();
        p.files.push(IncomingFile {
            content_type: "image/svg+xml".into(),
            ..image_part("socialIcon_0", UploadTarget::SocialIcon(0))
        });
        p.files.push(IncomingFile {
            content_type: "image/svg+xml".into(),
            ..image_part("socialIcon_0", UploadTarget::SocialIcon(0))
        });
        let store = UploadStore::new("/nonexistent-upload-root");
        let err = p
            .save_files(&store, &[UploadTarget::SocialIcon(0)])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest { code: "INVALID_UPLOAD", .. }));
    }

    #[tokio::test]
    async fn body_over_the_limit_is_413() {
        use axum::{Router, body::Body, extract::DefaultBodyLimit, routing::post};
        use tower::ServiceExt;

        let app: Router = Router::new()
            .route("/", post(|_: Payload| async { StatusCode::NO_CONTENT }))
            .layer(DefaultBodyLimit::max(8));

        let req = axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"title":"well past eight bytes"}"#))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
    }
}
