//! Password acquisition: environment first, then a hidden prompt

use anyhow::{Context, Result, bail};
use dialoguer::Password;

/// Environment variable consulted before prompting
pub const PASSWORD_ENV: &str = "PVWA_PASSWORD";

/// Resolve the logon password for `username`
pub fn read_password(username: &str) -> Result<String> {
    resolve(std::env::var(PASSWORD_ENV).ok(), || prompt(username))
}

fn resolve(from_env: Option<String>, prompt: impl FnOnce() -> Result<String>) -> Result<String> {
    if let Some(password) = from_env.filter(|p| !p.is_empty()) {
        return Ok(password);
    }

    let password = prompt()?.trim().to_string();
    if password.is_empty() {
        bail!("password cannot be empty");
    }
    Ok(password)
}

fn prompt(username: &str) -> Result<String> {
    Password::new()
        .with_prompt(format!("Please enter password for user {}", username))
        .allow_empty_password(true)
        .interact()
        .context("error reading password")
}
