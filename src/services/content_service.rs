//! Domain service for the versioned homepage content.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Actor;
use crate::entities::home_content;

pub const DEFAULT_HERO_IMAGE: &str = "/images/hero-image-thumb.png";

pub const MAX_SITE_TITLE_LEN: usize = 100;
pub const MAX_TAGLINE_LEN: usize = 250;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Home content with ID: {0} not found.")]
    NotFound(i32),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for ContentError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

/// One entry of the sidebar link list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidebarLink {
    pub title: String,
    pub url: String,
}

/// Serializes links into the opaque text column, preserving order.
#[must_use]
pub fn encode_links(links: &[SidebarLink]) -> String {
    serde_json::to_string(links).unwrap_or_else(|_| "[]".to_string())
}

/// Reads the stored link list. Anything that is not a JSON link array,
/// including the empty string, yields an empty list.
#[must_use]
pub fn decode_links(raw: &str) -> Vec<SidebarLink> {
    match serde_json::from_str(raw) {
        Ok(links) => links,
        Err(e) => {
            if !raw.trim().is_empty() {
                tracing::debug!(error = %e, "Ignoring malformed sidebar links");
            }
            Vec::new()
        }
    }
}

/// The current homepage content as readers see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeSnapshot {
    pub id: i32,
    pub site_title: String,
    pub tagline: String,
    pub about_content: String,
    pub about_section_title: String,
    pub hero_image_path: String,
    pub profile_image_path: Option<String>,
    pub profile_image_caption: String,
    pub sidebar_links: Vec<SidebarLink>,
    pub huron_title: String,
    pub huron_image_path: Option<String>,
    pub sanilac_title: String,
    pub sanilac_image_path: Option<String>,
    pub tuscola_title: String,
    pub tuscola_image_path: Option<String>,
    pub updated_at: String,
    pub updated_by: String,
}

impl HomeSnapshot {
    /// Substitutes `default_hero` when the stored hero path is null or blank.
    #[must_use]
    pub fn from_model(model: home_content::Model, default_hero: &str) -> Self {
        let hero_image_path = model
            .hero_image_path
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| default_hero.to_string());

        Self {
            id: model.id,
            site_title: model.site_title,
            tagline: model.tagline,
            about_content: model.about_content,
            about_section_title: model.about_section_title,
            hero_image_path,
            profile_image_path: model.profile_image_path,
            profile_image_caption: model.profile_image_caption,
            sidebar_links: decode_links(&model.sidebar_links),
            huron_title: model.huron_title,
            huron_image_path: model.huron_image_path,
            sanilac_title: model.sanilac_title,
            sanilac_image_path: model.sanilac_image_path,
            tuscola_title: model.tuscola_title,
            tuscola_image_path: model.tuscola_image_path,
            updated_at: model.updated_at,
            updated_by: model.updated_by,
        }
    }
}

fn default_about_section_title() -> String {
    "About Our History".to_string()
}

fn default_profile_image_caption() -> String {
    "The Archivist".to_string()
}

fn default_huron_title() -> String {
    "Huron County".to_string()
}

fn default_sanilac_title() -> String {
    "Sanilac County".to_string()
}

fn default_tuscola_title() -> String {
    "Tuscola County".to_string()
}

/// Full replacement of an existing content row.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeUpdate {
    pub id: i32,
    pub site_title: String,
    pub tagline: String,
    pub about_content: String,
    #[serde(default = "default_about_section_title")]
    pub about_section_title: String,
    #[serde(default)]
    pub hero_image_path: Option<String>,
    #[serde(default)]
    pub profile_image_path: Option<String>,
    #[serde(default = "default_profile_image_caption")]
    pub profile_image_caption: String,
    #[serde(default)]
    pub sidebar_links: Vec<SidebarLink>,
    #[serde(default = "default_huron_title")]
    pub huron_title: String,
    #[serde(default)]
    pub huron_image_path: Option<String>,
    #[serde(default = "default_sanilac_title")]
    pub sanilac_title: String,
    #[serde(default)]
    pub sanilac_image_path: Option<String>,
    #[serde(default = "default_tuscola_title")]
    pub tuscola_title: String,
    #[serde(default)]
    pub tuscola_image_path: Option<String>,
}

impl HomeUpdate {
    pub fn validate(&self) -> Result<(), ContentError> {
        if self.site_title.chars().count() > MAX_SITE_TITLE_LEN {
            return Err(ContentError::Validation(format!(
                "Site title must be at most {MAX_SITE_TITLE_LEN} characters"
            )));
        }
        if self.tagline.chars().count() > MAX_TAGLINE_LEN {
            return Err(ContentError::Validation(format!(
                "Tagline must be at most {MAX_TAGLINE_LEN} characters"
            )));
        }
        if let Some(link) = self.sidebar_links.iter().find(|l| l.url.trim().is_empty()) {
            return Err(ContentError::Validation(format!(
                "Sidebar link '{}' needs a url",
                link.title
            )));
        }
        Ok(())
    }
}

/// Summary row for the version history listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeVersion {
    pub id: i32,
    pub site_title: String,
    pub is_active: bool,
    pub updated_at: String,
    pub updated_by: String,
}

impl From<home_content::Model> for HomeVersion {
    fn from(model: home_content::Model) -> Self {
        Self {
            id: model.id,
            site_title: model.site_title,
            is_active: model.is_active,
            updated_at: model.updated_at,
            updated_by: model.updated_by,
        }
    }
}

/// Domain service trait for homepage content.
#[async_trait::async_trait]
pub trait ContentService: Send + Sync {
    /// The most recently updated active version, or `None` when there is no
    /// content at all.
    async fn get_current(&self) -> Result<Option<HomeSnapshot>, ContentError>;

    /// Overwrites an existing version. Never creates one.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::NotFound`] with the attempted id when the row
    /// does not exist.
    async fn update(&self, update: HomeUpdate, actor: &Actor)
    -> Result<HomeSnapshot, ContentError>;

    async fn list_versions(&self) -> Result<Vec<HomeVersion>, ContentError>;

    async fn activate(&self, id: i32, actor: &Actor) -> Result<HomeSnapshot, ContentError>;
}
