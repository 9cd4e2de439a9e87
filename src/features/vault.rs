use std::sync::Arc;

use crate::demo::DataSource;
use crate::entity::{Clip, NewClip, NewSecret, Secret, SecretPatch};
use crate::error::{require_text, Result, ValidationError};
use crate::hook::EntityHook;
use crate::prefs::{Prefs, VAULT_PRIVACY};
use crate::store::FileUpload;

/// Shown in place of a password while privacy is on.
pub const MASKED_PASSWORD: &str = "••••••••";

/// Stored credentials, the shared clipboard, and the privacy toggle.
pub struct Vault {
    secrets: EntityHook<Secret>,
    clips: EntityHook<Clip>,
    prefs: Prefs,
}

impl Vault {
    pub async fn load(source: Arc<DataSource>, prefs: Prefs) -> Self {
        let (secrets, clips) = tokio::join!(
            EntityHook::<Secret>::load(source.clone()),
            EntityHook::<Clip>::load(source),
        );
        Self {
            secrets,
            clips,
            prefs,
        }
    }

    pub async fn refresh(&self) -> Result<()> {
        tokio::try_join!(self.secrets.refresh(), self.clips.refresh())?;
        Ok(())
    }

    pub fn secrets(&self) -> &EntityHook<Secret> {
        &self.secrets
    }

    pub fn clips(&self) -> &EntityHook<Clip> {
        &self.clips
    }

    pub async fn add_secret(
        &self,
        service: &str,
        username: &str,
        password: &str,
        notes: &str,
    ) -> Result<Secret> {
        require_text("service", service)?;
        require_text("password", password)?;
        let draft = NewSecret::new(service, username, password, notes);
        self.secrets.create(&draft, None).await
    }

    pub async fn update_secret(&self, id: &str, patch: &SecretPatch) -> Result<Secret> {
        if let Some(service) = &patch.service {
            require_text("service", service)?;
        }
        if let Some(password) = &patch.password {
            require_text("password", password)?;
        }
        self.secrets.update(id, patch, None).await
    }

    pub async fn delete_secret(&self, id: &str) -> Result<()> {
        self.secrets.delete(id).await
    }

    /// Save trimmed text, an image, or both. One of them must be present.
    pub async fn add_clip(&self, content: &str, image: Option<&FileUpload>) -> Result<Clip> {
        if content.trim().is_empty() && image.is_none() {
            return Err(ValidationError::required("content").into());
        }
        self.clips.create(&NewClip::text(content), image).await
    }

    pub async fn delete_clip(&self, id: &str) -> Result<()> {
        self.clips.delete(id).await
    }

    /// Privacy is off until turned on.
    pub fn is_private(&self) -> bool {
        self.prefs.get_bool(VAULT_PRIVACY, false)
    }

    pub fn set_private(&self, private: bool) -> Result<()> {
        self.prefs.set_bool(VAULT_PRIVACY, private)
    }

    pub fn toggle_privacy(&self) -> Result<bool> {
        self.prefs.toggle(VAULT_PRIVACY, false)
    }

    /// The password as it should be displayed right now.
    pub fn display_password<'a>(&self, secret: &'a Secret) -> &'a str {
        if self.is_private() {
            MASKED_PASSWORD
        } else {
            &secret.password
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::CollectionAdapter;
    use crate::entity::Collection;
    use crate::error::KarrosError;
    use crate::store::{Backend, MemoryStore};
    use tempfile::TempDir;

    fn live(store: &Arc<MemoryStore>) -> Arc<DataSource> {
        Arc::new(DataSource::live(CollectionAdapter::new(Backend::from_store(
            store.clone(),
        ))))
    }

    #[tokio::test]
    async fn test_secret_requires_service_and_password() {
        let store = Arc::new(MemoryStore::new());
        let vault = Vault::load(live(&store), Prefs::ephemeral()).await;

        let err = vault.add_secret("GitHub", "me", "  ", "").await.unwrap_err();
        match err {
            KarrosError::Validation(v) => assert_eq!(v.field, "password"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(vault.add_secret("", "me", "pw", "").await.is_err());
        assert!(store.rows(Collection::Secrets).is_empty());
    }

    #[tokio::test]
    async fn test_secret_blank_fields_stored_as_null() {
        let store = Arc::new(MemoryStore::new());
        let vault = Vault::load(live(&store), Prefs::ephemeral()).await;

        let secret = vault.add_secret("Netflix", " ", "pw", "").await.unwrap();
        assert!(secret.username.is_none());
        let row = &store.rows(Collection::Secrets)[0];
        assert!(row["username"].is_null());
        assert!(row["notes"].is_null());
    }

    #[tokio::test]
    async fn test_clip_content_trimmed_and_required() {
        let store = Arc::new(MemoryStore::new());
        let vault = Vault::load(live(&store), Prefs::ephemeral()).await;

        assert!(vault.add_clip("   ", None).await.is_err());
        let clip = vault.add_clip("  birch ply  ", None).await.unwrap();
        assert_eq!(clip.content, "birch ply");

        let image = FileUpload::new("board.png", "image/png", vec![1, 2, 3]);
        let clip = vault.add_clip("", Some(&image)).await.unwrap();
        assert!(clip.image_url.is_some());
        assert_eq!(vault.clips().items()[0].id, clip.id);
    }

    #[tokio::test]
    async fn test_privacy_masks_passwords() {
        let tmp = TempDir::new().unwrap();
        let vault = Vault::load(Arc::new(DataSource::demo()), Prefs::open(tmp.path())).await;
        let secret = vault.secrets().items()[0].clone();

        assert!(!vault.is_private());
        assert_eq!(vault.display_password(&secret), secret.password);

        assert!(vault.toggle_privacy().unwrap());
        assert_eq!(vault.display_password(&secret), MASKED_PASSWORD);

        let reopened = Vault::load(Arc::new(DataSource::demo()), Prefs::open(tmp.path())).await;
        assert!(reopened.is_private());
    }
}
