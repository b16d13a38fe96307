/*
 * Responsibility
 * - Map multipart field names to upload targets (subdirectory, MIME allow-list, size and count caps)
 * - Store accepted files under UPLOAD_DIR and hand back their public `/uploads/...` path
 * - Remove replaced / orphaned files, never outside the upload root
 */
use std::mem::discriminant;
use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

pub const PUBLIC_PREFIX: &str = "/uploads/";

const MIB: usize = 1024 * 1024;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("unexpected file field: {0}")]
    UnexpectedField(String),
    #[error("file type {mime} is not allowed for {field}")]
    UnsupportedType { field: String, mime: String },
    #[error("{field} exceeds the {max_bytes} byte limit")]
    TooLarge { field: String, max_bytes: usize },
    #[error("at most {max} file(s) allowed for {field}")]
    TooMany { field: String, max: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadTarget {
    Logo,
    ProfileImage,
    Cv,
    SocialIcon(usize),
    PortfolioImage,
    GalleryImage,
    SkillIcon,
    ClientImage,
    CompanyLogo,
}

impl UploadTarget {
    pub const ALL_DIRS: [&'static str; 9] = [
        "logos",
        "profiles",
        "cvs",
        "social-icons",
        "portfolio",
        "portfolio/gallery",
        "skills",
        "testimonials/clients",
        "testimonials/logos",
    ];

    pub fn from_field(field: &str) -> Option<Self> {
        let target = match field {
            "logo" => Self::Logo,
            "profileImage" => Self::ProfileImage,
            "cvFile" => Self::Cv,
            "image" => Self::PortfolioImage,
            "galleryImages" | "galleryImages[]" => Self::GalleryImage,
            "icon" => Self::SkillIcon,
            "clientImage" => Self::ClientImage,
            "companyLogo" => Self::CompanyLogo,
            other => {
                let index = other.strip_prefix("socialIcon_")?.parse().ok()?;
                Self::SocialIcon(index)
            }
        };
        Some(target)
    }

    pub fn subdir(&self) -> &'static str {
        match self {
            Self::Logo => "logos",
            Self::ProfileImage => "profiles",
            Self::Cv => "cvs",
            Self::SocialIcon(_) => "social-icons",
            Self::PortfolioImage => "portfolio",
            Self::GalleryImage => "portfolio/gallery",
            Self::SkillIcon => "skills",
            Self::ClientImage => "testimonials/clients",
            Self::CompanyLogo => "testimonials/logos",
        }
    }

    pub const fn max_bytes(&self) -> usize {
        match self {
            Self::SocialIcon(_) => MIB,
            Self::Cv | Self::PortfolioImage | Self::GalleryImage => 10 * MIB,
            _ => 5 * MIB,
        }
    }

    /// Files one request may send for this target (per index for social icons).
    pub const fn max_count(&self) -> usize {
        match self {
            Self::GalleryImage => 10,
            _ => 1,
        }
    }

    pub fn accepts(&self, mime: &str) -> bool {
        let mime = mime.trim().to_ascii_lowercase();
        match self {
            Self::SocialIcon(_) => mime == "image/svg+xml",
            Self::Cv => matches!(
                mime.as_str(),
                "application/pdf"
                    | "application/msword"
                    | "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            ),
            _ => mime.starts_with("image/"),
        }
    }

    /// Same variant, ignoring the social icon index.
    pub fn same_slot(&self, other: &UploadTarget) -> bool {
        discriminant(self) == discriminant(other)
    }
}

/// Upload bytes of the largest form: a portfolio image plus a full gallery.
pub const LARGEST_FORM_BYTES: usize = UploadTarget::PortfolioImage.max_bytes()
    * UploadTarget::PortfolioImage.max_count()
    + UploadTarget::GalleryImage.max_bytes() * UploadTarget::GalleryImage.max_count();

#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub target: UploadTarget,
    pub public_path: String,
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

/// Extension for an accepted MIME type. The client's file name never decides
/// how `/uploads` serves the file; unknown types get no extension.
fn extension_for(mime: &str) -> &'static str {
    match mime.trim().to_ascii_lowercase().as_str() {
        "image/png" => ".png",
        "image/jpeg" | "image/jpg" | "image/pjpeg" => ".jpg",
        "image/gif" => ".gif",
        "image/webp" => ".webp",
        "image/avif" => ".avif",
        "image/bmp" => ".bmp",
        "image/x-icon" | "image/vnd.microsoft.icon" => ".ico",
        "image/svg+xml" => ".svg",
        "application/pdf" => ".pdf",
        "application/msword" => ".doc",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => ".docx",
        _ => "",
    }
}

fn file_name(field: &str, mime: &str) -> String {
    let safe_field: String = field
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    format!(
        "{}-{}-{}{}",
        safe_field,
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        extension_for(mime)
    )
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        for dir in UploadTarget::ALL_DIRS {
            tokio::fs::create_dir_all(self.root.join(dir)).await?;
        }
        Ok(())
    }

    pub fn validate(
        &self,
        target: UploadTarget,
        field: &str,
        mime: &str,
        len: usize,
    ) -> Result<(), UploadError> {
        if !target.accepts(mime) {
            return Err(UploadError::UnsupportedType {
                field: field.to_string(),
                mime: mime.to_string(),
            });
        }
        if len > target.max_bytes() {
            return Err(UploadError::TooLarge {
                field: field.to_string(),
                max_bytes: target.max_bytes(),
            });
        }
        Ok(())
    }

    pub async fn save(
        &self,
        target: UploadTarget,
        field: &str,
        original_name: Option<&str>,
        mime: &str,
        bytes: &[u8],
    ) -> Result<StoredUpload, UploadError> {
        self.validate(target, field, mime, bytes.len())?;

        let name = file_name(field, mime);
        let relative = format!("{}/{}", target.subdir(), name);
        tokio::fs::write(self.root.join(&relative), bytes).await?;

        tracing::info!(
            field = %field,
            original = original_name.unwrap_or_default(),
            path = %relative,
            size = bytes.len(),
            "file uploaded"
        );

        Ok(StoredUpload {
            target,
            public_path: format!("{PUBLIC_PREFIX}{relative}"),
        })
    }

    /// Disk location for a public `/uploads/...` path. `None` for anything else.
    pub fn resolve(&self, public_path: &str) -> Option<PathBuf> {
        let rest = public_path.strip_prefix(PUBLIC_PREFIX)?;
        let rel = Path::new(rest);
        let mut parts = 0;
        for c in rel.components() {
            match c {
                Component::Normal(_) => parts += 1,
                _ => return None,
            }
        }
        if parts == 0 {
            return None;
        }
        Some(self.root.join(rel))
    }

    /// Best effort; a missing file is not an error.
    pub async fn remove(&self, public_path: &str) -> bool {
        let Some(path) = self.resolve(public_path) else {
            if !public_path.is_empty() {
                tracing::warn!(path = %public_path, "refusing to remove path outside upload root");
            }
            return false;
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(path = %public_path, "file removed");
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                tracing::warn!(path = %public_path, error = %e, "failed to remove file");
                false
            }
        }
    }

    /// Removes files no longer referenced by a record. Values that are not
    /// upload paths (icon class names, external URLs) are skipped.
    pub async fn remove_many(&self, public_paths: &[String]) {
        for p in public_paths {
            if p.starts_with(PUBLIC_PREFIX) {
                self.remove(p).await;
            }
        }
    }

    /// Undo uploads of a request that failed after the files were written.
    pub async fn discard(&self, uploads: &[StoredUpload]) {
        for u in uploads {
            self.remove(&u.public_path).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_routing() {
        assert_eq!(UploadTarget::from_field("logo"), Some(UploadTarget::Logo));
        assert_eq!(UploadTarget::from_field("cvFile"), Some(UploadTarget::Cv));
        assert_eq!(
            UploadTarget::from_field("socialIcon_2"),
            Some(UploadTarget::SocialIcon(2))
        );
        assert_eq!(UploadTarget::from_field("socialIcon_x"), None);
        assert_eq!(UploadTarget::from_field("avatar"), None);
        assert_eq!(
            UploadTarget::from_field("galleryImages").map(|t| t.subdir()),
            Some("portfolio/gallery")
        );
    }

    #[test]
    fn mime_allow_lists() {
        assert!(UploadTarget::Logo.accepts("image/png"));
        assert!(!UploadTarget::Logo.accepts("application/pdf"));
        assert!(UploadTarget::Cv.accepts("application/pdf"));
        assert!(!UploadTarget::Cv.accepts("image/png"));
        assert!(UploadTarget::SocialIcon(0).accepts("image/svg+xml"));
        assert!(!UploadTarget::SocialIcon(0).accepts("image/png"));
    }

    #[test]
    fn size_caps() {
        let store = UploadStore::new("/tmp/unused");
        assert!(store.validate(UploadTarget::SocialIcon(0), "socialIcon_0", "image/svg+xml", MIB).is_ok());
        assert!(matches!(
            store.validate(UploadTarget::SocialIcon(0), "socialIcon_0", "image/svg+xml", MIB + 1),
            Err(UploadError::TooLarge { .. })
        ));
        assert!(store.validate(UploadTarget::PortfolioImage, "image", "image/jpeg", 10 * MIB).is_ok());
        assert!(store.validate(UploadTarget::SkillIcon, "icon", "image/png", 5 * MIB + 1).is_err());
    }

    #[test]
    fn same_slot_ignores_index() {
        assert!(UploadTarget::SocialIcon(0).same_slot(&UploadTarget::SocialIcon(7)));
        assert!(!UploadTarget::Logo.same_slot(&UploadTarget::ProfileImage));
    }

    #[test]
    fn resolve_stays_inside_root() {
        let store = UploadStore::new("/srv/uploads");
        assert_eq!(
            store.resolve("/uploads/portfolio/a.png"),
            Some(PathBuf::from("/srv/uploads/portfolio/a.png"))
        );
        assert_eq!(store.resolve("/uploads/../etc/passwd"), None);
        assert_eq!(store.resolve("/uploads/portfolio/../../x"), None);
        assert_eq!(store.resolve("/etc/passwd"), None);
        assert_eq!(store.resolve("/uploads/"), None);
    }

    #[test]
    fn stored_names_keep_field_and_take_extension_from_mime() {
        let name = file_name("profileImage", "image/jpeg");
        assert!(name.starts_with("profileImage-"));
        assert!(name.ends_with(".jpg"));

        assert!(file_name("socialIcon_1", "image/svg+xml").ends_with(".svg"));
        assert!(file_name("cvFile", "application/pdf").ends_with(".pdf"));
        // no extension for image types without a mapping
        assert!(!file_name("logo", "image/x-unknown").contains('.'));
    }

    #[tokio::test]
    async fn client_file_name_cannot_pick_the_extension() {
        let root = std::env::temp_dir().join(format!("uploads-test-{}", Uuid::new_v4().simple()));
        let store = UploadStore::new(&root);
        store.ensure_dirs().await.unwrap();

        let saved = store
            .save(UploadTarget::PortfolioImage, "image", Some("x.html"), "image/png", b"png")
            .await
            .unwrap();
        assert!(saved.public_path.ends_with(".png"));

        let saved = store
            .save(UploadTarget::Logo, "logo", Some("logo.svg"), "image/png", b"png")
            .await
            .unwrap();
        assert!(saved.public_path.ends_with(".png"));

        let _ = tokio::fs::remove_dir_all(&root).await;
    }

    #[test]
    fn only_the_gallery_takes_several_files() {
        assert_eq!(UploadTarget::GalleryImage.max_count(), 10);
        for t in [
            UploadTarget::Logo,
            UploadTarget::ProfileImage,
            UploadTarget::Cv,
            UploadTarget::SocialIcon(3),
            UploadTarget::PortfolioImage,
            UploadTarget::SkillIcon,
            UploadTarget::ClientImage,
            UploadTarget::CompanyLogo,
        ] {
            assert_eq!(t.max_count(), 1);
        }
        assert_eq!(LARGEST_FORM_BYTES, 110 * MIB);
    }

    #[tokio::test]
    async fn save_and_remove_round_trip_on_disk() {
        let root = std::env::temp_dir().join(format!("uploads-test-{}", Uuid::new_v4().simple()));
        let store = UploadStore::new(&root);
        store.ensure_dirs().await.unwrap();

        let saved = store
            .save(UploadTarget::SkillIcon, "icon", Some("rust.png"), "image/png", b"png")
            .await
            .unwrap();
        assert!(saved.public_path.starts_with("/uploads/skills/icon-"));
        let disk = store.resolve(&saved.public_path).unwrap();
        assert!(disk.exists());

        assert!(store.remove(&saved.public_path).await);
        assert!(!disk.exists());
        assert!(!store.remove(&saved.public_path).await);

        let _ = tokio::fs::remove_dir_all(&root).await;
    }
}
