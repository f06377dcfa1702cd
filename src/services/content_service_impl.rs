//! `SeaORM` implementation of the `ContentService` trait.

use async_trait::async_trait;

use crate::db::Store;
use crate::db::repositories::home::HomeFields;
use crate::domain::Actor;
use crate::services::content_service::{
    ContentError, ContentService, HomeSnapshot, HomeUpdate, HomeVersion, encode_links,
};

pub struct SeaOrmContentService {
    store: Store,
    default_hero: String,
}

impl SeaOrmContentService {
    #[must_use]
    pub const fn new(store: Store, default_hero: String) -> Self {
        Self {
            store,
            default_hero,
        }
    }
}

impl From<HomeUpdate> for HomeFields {
    fn from(update: HomeUpdate) -> Self {
        Self {
            sidebar_links: encode_links(&update.sidebar_links),
            site_title: update.site_title,
            tagline: update.tagline,
            about_content: update.about_content,
            about_section_title: update.about_section_title,
            hero_image_path: update.hero_image_path,
            profile_image_path: update.profile_image_path,
            profile_image_caption: update.profile_image_caption,
            huron_title: update.huron_title,
            huron_image_path: update.huron_image_path,
            sanilac_title: update.sanilac_title,
            sanilac_image_path: update.sanilac_image_path,
            tuscola_title: update.tuscola_title,
            tuscola_image_path: update.tuscola_image_path,
        }
    }
}

#[async_trait]
impl ContentService for SeaOrmContentService {
    async fn get_current(&self) -> Result<Option<HomeSnapshot>, ContentError> {
        let current = self.store.home().latest_active().await?;
        Ok(current.map(|model| HomeSnapshot::from_model(model, &self.default_hero)))
    }

    async fn update(
        &self,
        update: HomeUpdate,
        actor: &Actor,
    ) -> Result<HomeSnapshot, ContentError> {
        update.validate()?;

        let id = update.id;
        let updated = self
            .store
            .home()
            .update(id, update.into(), actor)
            .await?
            .ok_or(ContentError::NotFound(id))?;

        tracing::info!(id, actor = %actor, "Home content updated");
        Ok(HomeSnapshot::from_model(updated, &self.default_hero))
    }

    async fn list_versions(&self) -> Result<Vec<HomeVersion>, ContentError> {
        let versions = self.store.home().list_versions().await?;
        Ok(versions.into_iter().map(HomeVersion::from).collect())
    }

    async fn activate(&self, id: i32, actor: &Actor) -> Result<HomeSnapshot, ContentError> {
        let activated = self
            .store
            .home()
            .activate(id, actor)
            .await?
            .ok_or(ContentError::NotFound(id))?;

        tracing::info!(id, actor = %actor, "Home content version activated");
        Ok(HomeSnapshot::from_model(activated, &self.default_hero))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::content_service::{DEFAULT_HERO_IMAGE, SidebarLink};

    async fn service() -> (SeaOrmContentService, Store) {
        let store = Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .unwrap();
        let service = SeaOrmContentService::new(store.clone(), DEFAULT_HERO_IMAGE.to_string());
        (service, store)
    }

    fn fields(title: &str, hero: Option<&str>) -> HomeFields {
        HomeFields {
            site_title: title.to_string(),
            tagline: "Tagline".to_string(),
            about_content: "About".to_string(),
            about_section_title: "About Our History".to_string(),
            hero_image_path: hero.map(str::to_string),
            profile_image_caption: "The Archivist".to_string(),
            sidebar_links: "[]".to_string(),
            huron_title: "Huron County".to_string(),
            sanilac_title: "Sanilac County".to_string(),
            tuscola_title: "Tuscola County".to_string(),
            ..HomeFields::default()
        }
    }

    fn update_for(id: i32) -> HomeUpdate {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "siteTitle": "Thumb of Michigan Genealogy",
            "tagline": "Discovering Your Roots",
            "aboutContent": "Welcome",
            "heroImagePath": "/images/custom.png",
            "sidebarLinks": [{"title": "Ancestry", "url": "https://www.ancestry.com/"}]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn empty_store_has_no_current_content() {
        let (service, _) = service().await;
        assert!(service.get_current().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_hero_uses_default_path() {
        let (service, store) = service().await;
        store
            .home()
            .insert(fields("Blank hero", Some("")), &Actor::system())
            .await
            .unwrap();

        let current = service.get_current().await.unwrap().unwrap();
        assert_eq!(current.hero_image_path, "/images/hero-image-thumb.png");
    }

    #[tokio::test]
    async fn present_hero_is_kept() {
        let (service, store) = service().await;
        store
            .home()
            .insert(fields("Hero", Some("/images/other.png")), &Actor::system())
            .await
            .unwrap();

        let current = service.get_current().await.unwrap().unwrap();
        assert_eq!(current.hero_image_path, "/images/other.png");
    }

    #[tokio::test]
    async fn latest_active_version_wins() {
        let (service, store) = service().await;
        let actor = Actor::system();
        let first = store.home().insert(fields("First", None), &actor).await.unwrap();
        store.home().insert(fields("Second", None), &actor).await.unwrap();

        assert_eq!(
            service.get_current().await.unwrap().unwrap().site_title,
            "Second"
        );

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        service.activate(first.id, &actor).await.unwrap();
        assert_eq!(
            service.get_current().await.unwrap().unwrap().site_title,
            "First"
        );
        assert_eq!(service.list_versions().await.unwrap()[0].id, first.id);
    }

    #[tokio::test]
    async fn update_of_missing_row_reports_the_id() {
        let (service, _) = service().await;
        let err = service
            .update(update_for(99), &Actor::new("admin"))
            .await
            .unwrap_err();

        assert!(matches!(err, ContentError::NotFound(99)));
        assert!(err.to_string().contains("99"));
        assert!(service.get_current().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_overwrites_and_stamps_actor() {
        let (service, store) = service().await;
        let row = store
            .home()
            .insert(fields("Old", None), &Actor::system())
            .await
            .unwrap();

        let snapshot = service
            .update(update_for(row.id), &Actor::new("archivist"))
            .await
            .unwrap();

        assert_eq!(snapshot.site_title, "Thumb of Michigan Genealogy");
        assert_eq!(snapshot.hero_image_path, "/images/custom.png");
        assert_eq!(snapshot.updated_by, "archivist");
        assert_eq!(
            snapshot.sidebar_links,
            vec![SidebarLink {
                title: "Ancestry".to_string(),
                url: "https://www.ancestry.com/".to_string(),
            }]
        );

        let stored = store.home().get_by_id(row.id).await.unwrap().unwrap();
        assert_eq!(stored.created_by, "System");
        assert_eq!(stored.updated_by, "archivist");
    }
}
