use std::io::{BufRead, Write};

use anyhow::Context;

use crate::config::Config;
use crate::db::Store;
use crate::services::password::hash_password_blocking;

const MIN_PASSWORD_LEN: usize = 8;

async fn open_store(config: &Config) -> anyhow::Result<Store> {
    Store::new(&config.general.database_path).await
}

/// Reads one line from stdin. Works both interactively and when piped.
fn read_password(prompt: &str) -> anyhow::Result<String> {
    print!("{prompt}");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read password from stdin")?;

    let password = input.trim_end_matches(['\r', '\n']).to_string();
    if password.trim().len() < MIN_PASSWORD_LEN {
        anyhow::bail!("Password must be at least {MIN_PASSWORD_LEN} characters");
    }

    Ok(password)
}

pub async fn cmd_create_admin(config: &Config, username: &str) -> anyhow::Result<()> {
    let username = username.trim();
    if username.is_empty() {
        anyhow::bail!("Username cannot be empty");
    }

    let password = read_password(&format!("Password for '{username}': "))?;
    let hash = hash_password_blocking(password, config.security.clone()).await?;

    let store = open_store(config).await?;
    if store.users().create_or_reactivate(username, hash).await? {
        println!("✓ Created admin '{username}'");
    } else {
        println!("✓ Re-activated admin '{username}' with a new password");
    }

    Ok(())
}

pub async fn cmd_set_password(config: &Config, username: &str) -> anyhow::Result<()> {
    let store = open_store(config).await?;

    if store.users().get_by_username(username).await?.is_none() {
        println!("Admin '{username}' not found.");
        return Ok(());
    }

    let password = read_password(&format!("New password for '{username}': "))?;
    let hash = hash_password_blocking(password, config.security.clone()).await?;
    store.users().set_password(username, hash).await?;

    println!("✓ Password updated for '{username}'");
    Ok(())
}

pub async fn cmd_deactivate_admin(config: &Config, username: &str) -> anyhow::Result<()> {
    let store = open_store(config).await?;

    let Some(user) = store.users().get_by_username(username).await? else {
        println!("Admin '{username}' not found.");
        return Ok(());
    };

    if !user.is_active {
        println!("Admin '{username}' is already inactive.");
        return Ok(());
    }

    store.users().deactivate(username).await?;
    println!("✓ Deactivated admin '{username}'");
    Ok(())
}
