//! First-run data: the bootstrap admin, one home content row and the three
//! Thumb counties. Every step is skipped when its table already has rows.

use anyhow::Result;
use rand::Rng;
use tracing::{info, warn};

use super::Store;
use super::repositories::county::CountyFields;
use super::repositories::home::HomeFields;
use crate::config::Config;
use crate::domain::Actor;
use crate::services::content_service::{SidebarLink, encode_links};
use crate::services::password::hash_password_blocking;

const SEED_COUNTIES: [&str; 3] = ["Huron", "Tuscola", "Sanilac"];

const GENERATED_PASSWORD_LEN: usize = 20;

impl Store {
    pub async fn ensure_seed_data(&self, config: &Config) -> Result<()> {
        self.seed_admin(config).await?;
        self.seed_home(config).await?;
        self.seed_counties().await?;
        Ok(())
    }

    async fn seed_admin(&self, config: &Config) -> Result<()> {
        let users = self.users();
        if users.count().await? > 0 {
            return Ok(());
        }

        let username = config.security.bootstrap_admin_username.clone();
        let password = if let Some(password) = config.security.bootstrap_admin_password.clone() {
            password
        } else {
            let generated = generate_password();
            warn!(
                username = %username,
                password = %generated,
                "Generated bootstrap admin password; change it with `lineage set-password`"
            );
            generated
        };

        let hash = hash_password_blocking(password, config.security.clone()).await?;

        users.create_or_reactivate(&username, hash).await?;
        info!(username = %username, "Seeded bootstrap admin user");
        Ok(())
    }

    async fn seed_home(&self, config: &Config) -> Result<()> {
        let home = self.home();
        if home.count().await? > 0 {
            return Ok(());
        }

        let links = vec![
            SidebarLink {
                title: "Huron County Records".to_string(),
                url: "/counties/huron".to_string(),
            },
            SidebarLink {
                title: "Tuscola County Archives".to_string(),
                url: "/counties/tuscola".to_string(),
            },
            SidebarLink {
                title: "Sanilac County History".to_string(),
                url: "/counties/sanilac".to_string(),
            },
        ];

        let fields = HomeFields {
            site_title: "Thumb of Michigan Genealogy".to_string(),
            tagline: "Discovering Your Roots in Michigan's Thumb".to_string(),
            about_content: "Welcome to your genealogy journey! This site is dedicated to helping \
                you explore the rich history of families in the Thumb of Michigan."
                .to_string(),
            about_section_title: "About Our History".to_string(),
            hero_image_path: Some(config.content.default_hero_image.clone()),
            profile_image_path: Some("/images/profile-image.jpg".to_string()),
            profile_image_caption: "The Archivist".to_string(),
            sidebar_links: encode_links(&links),
            huron_title: "Huron County".to_string(),
            huron_image_path: None,
            sanilac_title: "Sanilac County".to_string(),
            sanilac_image_path: None,
            tuscola_title: "Tuscola County".to_string(),
            tuscola_image_path: None,
        };

        home.insert(fields, &Actor::system()).await?;
        info!("Seeded default home content");
        Ok(())
    }

    async fn seed_counties(&self) -> Result<()> {
        let counties = self.counties();
        if counties.count().await? > 0 {
            return Ok(());
        }

        let actor = Actor::system();
        for (position, name) in (1..).zip(SEED_COUNTIES) {
            counties
                .create(
                    CountyFields {
                        name: name.to_string(),
                        description: Some(format!("Genealogy resources for {name} County")),
                        image_url: None,
                        display_order: position,
                        is_active: true,
                    },
                    &actor,
                )
                .await?;
        }

        info!(count = SEED_COUNTIES.len(), "Seeded counties");
        Ok(())
    }
}

fn generate_password() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(GENERATED_PASSWORD_LEN)
        .map(char::from)
        .collect()
}
