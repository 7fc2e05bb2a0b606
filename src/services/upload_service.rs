//! System asset uploads.
//!
//! Each asset kind has one fixed file name; a new upload overwrites the old
//! file and the public URL never changes.

use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{
    FAVICON_EDGE_PX, LOSSY_QUALITY, MAX_AVATAR_BYTES, MAX_HERO_BYTES, MAX_ICON_BYTES,
    SYSTEM_ASSETS_DIR_NAME, UPLOADS_URL_PREFIX,
};
use crate::errors::{AppError, AppResult};
use crate::infra::{Encoding, Transcoder, UnitOfWork};

/// The fixed set of uploadable site assets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemAsset {
    Favicon,
    Hero,
    Avatar,
}

impl SystemAsset {
    pub fn file_name(&self) -> &'static str {
        match self {
            SystemAsset::Favicon => "favicon.png",
            SystemAsset::Hero => "hero.jpg",
            SystemAsset::Avatar => "avatar.jpg",
        }
    }

    /// Multipart field carrying the file
    pub fn field_name(&self) -> &'static str {
        match self {
            SystemAsset::Favicon => "icon",
            SystemAsset::Hero => "hero",
            SystemAsset::Avatar => "avatar",
        }
    }

    pub fn max_bytes(&self) -> usize {
        match self {
            SystemAsset::Favicon => MAX_ICON_BYTES,
            SystemAsset::Hero => MAX_HERO_BYTES,
            SystemAsset::Avatar => MAX_AVATAR_BYTES,
        }
    }

    pub fn encoding(&self) -> Encoding {
        match self {
            SystemAsset::Favicon => Encoding::Png {
                max_edge: FAVICON_EDGE_PX,
            },
            SystemAsset::Hero | SystemAsset::Avatar => Encoding::Jpeg {
                quality: LOSSY_QUALITY,
            },
        }
    }

    fn label(&self) -> &'static str {
        match self {
            SystemAsset::Favicon => "Icon",
            SystemAsset::Hero => "Hero image",
            SystemAsset::Avatar => "Avatar",
        }
    }

    /// Stable public URL of the asset
    pub fn public_url(&self) -> String {
        format!(
            "{}/{}/{}",
            UPLOADS_URL_PREFIX,
            SYSTEM_ASSETS_DIR_NAME,
            self.file_name()
        )
    }
}

/// Upload result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UploadedAsset {
    #[schema(example = "/api/uploads/system/favicon.png")]
    pub url: String,
}

#[async_trait]
pub trait UploadService: Send + Sync {
    /// Transcode and store an asset. For avatars, `owner` also gets its
    /// `avatarUrl` pointed at the stored file.
    async fn upload(
        &self,
        asset: SystemAsset,
        bytes: Vec<u8>,
        owner: Option<Uuid>,
    ) -> AppResult<UploadedAsset>;
}

pub struct UploadManager<U: UnitOfWork> {
    uow: Arc<U>,
    transcoder: Arc<dyn Transcoder>,
    assets_dir: PathBuf,
}

impl<U: UnitOfWork> UploadManager<U> {
    pub fn new(uow: Arc<U>, transcoder: Arc<dyn Transcoder>, assets_dir: PathBuf) -> Self {
        Self {
            uow,
            transcoder,
            assets_dir,
        }
    }

    async fn write_asset(&self, asset: SystemAsset, encoded: &[u8]) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.assets_dir).await?;
        tokio::fs::write(self.assets_dir.join(asset.file_name()), encoded).await
    }

    /// Best effort: the file is already stored, so a failed sync is only logged.
    async fn sync_avatar(&self, owner: Uuid, url: &str) {
        if let Err(e) = self.uow.users().update_avatar(owner, url.to_string()).await {
            tracing::error!(user_id = %owner, error = %e, "Failed to sync avatar URL");
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> UploadService for UploadManager<U> {
    async fn upload(
        &self,
        asset: SystemAsset,
        bytes: Vec<u8>,
        owner: Option<Uuid>,
    ) -> AppResult<UploadedAsset> {
        if bytes.is_empty() {
            return Err(AppError::bad_request("Uploaded file is empty"));
        }
        if bytes.len() > asset.max_bytes() {
            return Err(AppError::PayloadTooLarge(format!(
                "{} must be at most {} KB",
                asset.label(),
                asset.max_bytes() / 1024
            )));
        }

        let size = bytes.len();
        let processing_failed =
            || AppError::Processing(format!("{} processing failed, please retry", asset.label()));

        let encoded = self
            .transcoder
            .transcode(bytes, asset.encoding())
            .await
            .map_err(|e| {
                tracing::error!(asset = asset.file_name(), error = %e, "Image transcoding failed");
                processing_failed()
            })?;

        self.write_asset(asset, &encoded).await.map_err(|e| {
            tracing::error!(asset = asset.file_name(), error = %e, "Failed to write asset");
            processing_failed()
        })?;

        let url = asset.public_url();
        tracing::info!(asset = asset.file_name(), input_bytes = size, stored_bytes = encoded.len(), "Asset uploaded");

        if let (SystemAsset::Avatar, Some(owner)) = (asset, owner) {
            self.sync_avatar(owner, &url).await;
        }

        Ok(UploadedAsset { url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{
        MockConfigRepository, MockTranscoder, MockUserRepository, StaticUnitOfWork, TranscodeError,
    };
    use mockall::predicate::{always, eq};

    fn manager(
        users: MockUserRepository,
        transcoder: MockTranscoder,
        dir: &std::path::Path,
    ) -> UploadManager<StaticUnitOfWork> {
        let uow = Arc::new(StaticUnitOfWork {
            users: Arc::new(users),
            configs: Arc::new(MockConfigRepository::new()),
        });
        UploadManager::new(uow, Arc::new(transcoder), dir.to_path_buf())
    }

    #[test]
    fn test_asset_urls_are_fixed() {
        assert_eq!(SystemAsset::Favicon.public_url(), "/api/uploads/system/favicon.png");
        assert_eq!(SystemAsset::Hero.public_url(), "/api/uploads/system/hero.jpg");
        assert_eq!(SystemAsset::Avatar.public_url(), "/api/uploads/system/avatar.jpg");
    }

    #[tokio::test]
    async fn test_oversized_upload_rejected_before_transcoding() {
        let dir = tempfile::tempdir().unwrap();
        let mut transcoder = MockTranscoder::new();
        transcoder.expect_transcode().never();

        let svc = manager(MockUserRepository::new(), transcoder, dir.path());
        let err = svc
            .upload(SystemAsset::Favicon, vec![0u8; 2 * 1024 * 1024], None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::PayloadTooLarge(_)));
        assert!(!dir.path().join("favicon.png").exists());
    }

    #[tokio::test]
    async fn test_upload_overwrites_fixed_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut transcoder = MockTranscoder::new();
        transcoder
            .expect_transcode()
            .with(always(), eq(Encoding::Jpeg { quality: 85 }))
            .returning(|bytes, _| Ok(bytes.into_iter().rev().collect()));

        let svc = manager(MockUserRepository::new(), transcoder, dir.path());
        std::fs::write(dir.path().join("hero.jpg"), b"old").unwrap();

        let uploaded = svc.upload(SystemAsset::Hero, vec![1, 2, 3], None).await.unwrap();
        assert_eq!(uploaded.url, "/api/uploads/system/hero.jpg");
        assert_eq!(std::fs::read(dir.path().join("hero.jpg")).unwrap(), vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_transcode_failure_is_generic_processing_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut transcoder = MockTranscoder::new();
        transcoder
            .expect_transcode()
            .returning(|_, _| Err(TranscodeError::Task("boom".into())));

        let svc = manager(MockUserRepository::new(), transcoder, dir.path());
        let err = svc.upload(SystemAsset::Favicon, vec![1], None).await.unwrap_err();

        assert!(matches!(err, AppError::Processing(_)));
        assert_eq!(err.to_string(), "Icon processing failed, please retry");
    }

    #[tokio::test]
    async fn test_avatar_sync_failure_does_not_fail_upload() {
        let dir = tempfile::tempdir().unwrap();
        let owner = Uuid::new_v4();
        let mut transcoder = MockTranscoder::new();
        transcoder.expect_transcode().returning(|bytes, _| Ok(bytes));
        let mut users = MockUserRepository::new();
        users
            .expect_update_avatar()
            .with(eq(owner), eq("/api/uploads/system/avatar.jpg".to_string()))
            .times(1)
            .returning(|_, _| Err(AppError::internal("database is gone")));

        let svc = manager(users, transcoder, dir.path());
        let uploaded = svc
            .upload(SystemAsset::Avatar, vec![7; 16], Some(owner))
            .await
            .unwrap();

        assert_eq!(uploaded.url, "/api/uploads/system/avatar.jpg");
        assert!(dir.path().join("avatar.jpg").exists());
    }
}
