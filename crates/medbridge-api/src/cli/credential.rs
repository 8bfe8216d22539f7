//! Credential management CLI commands: set, status, delete.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Password;

use medbridge_core::service::credential::{CREDENTIAL_KEY, CredentialService};

use crate::state::AppState;

/// Store the API token, prompting with hidden input when no value is given.
///
/// # Examples
///
/// ```bash
/// # Secure prompt (recommended)
/// medbridge credential set
///
/// # Script/automation mode
/// medbridge credential set --value hf_...
/// ```
pub async fn set_credential(state: &AppState, value: Option<&str>, json: bool) -> Result<()> {
    let secret_value = match value {
        Some(v) => v.to_string(),
        None => Password::new()
            .with_prompt(format!("Enter value for {}", style(CREDENTIAL_KEY).bold()))
            .interact()?,
    };
    let secret_value = secret_value.trim();
    if secret_value.is_empty() {
        anyhow::bail!("the API token must not be empty");
    }

    let provider = state.credentials.store(CREDENTIAL_KEY, secret_value).await?;
    let masked = CredentialService::mask_secret(secret_value);

    if json {
        println!(
            "{}",
            serde_json::json!({"set": true, "key": CREDENTIAL_KEY, "provider": provider, "masked": masked})
        );
    } else {
        println!(
            "  {} {} stored in {} ({})",
            style("✓").green().bold(),
            style(CREDENTIAL_KEY).bold(),
            provider,
            masked
        );
    }

    Ok(())
}

/// Show which providers hold the token and which one is in effect.
pub async fn credential_status(state: &AppState, json: bool) -> Result<()> {
    let statuses = state.credentials.status(CREDENTIAL_KEY).await;
    let active = state.controller.credential_source().map(ToString::to_string);

    if json {
        let providers: Vec<_> = statuses
            .iter()
            .map(|s| serde_json::json!({"provider": s.provider, "present": s.present, "error": s.error}))
            .collect();
        println!(
            "{}",
            serde_json::json!({
                "key": CREDENTIAL_KEY,
                "active": active,
                "providers": providers,
                "data_dir": state.data_dir,
                "database": state.database_url,
            })
        );
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Provider").fg(Color::White),
        Cell::new(CREDENTIAL_KEY).fg(Color::White),
        Cell::new("Note").fg(Color::White),
    ]);

    for status in &statuses {
        let (present, color) = if status.present {
            ("present", Color::Green)
        } else {
            ("absent", Color::DarkGrey)
        };
        table.add_row(vec![
            Cell::new(&status.provider).fg(Color::Cyan),
            Cell::new(present).fg(color),
            Cell::new(status.error.as_deref().unwrap_or("")).fg(Color::Yellow),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    match active {
        Some(source) => println!("  {} Using token from {}", style("✓").green().bold(), source),
        None => println!(
            "  {} No token available. Set one with: {}",
            style("!").yellow().bold(),
            style("medbridge credential set").yellow()
        ),
    }
    println!("  {} {}", style("Data:").dim(), style(state.data_dir.display()).dim());
    println!();

    Ok(())
}

/// Remove the stored token from every writable provider.
pub async fn delete_credential(state: &AppState, json: bool) -> Result<()> {
    state.credentials.delete(CREDENTIAL_KEY).await?;

    if json {
        println!("{}", serde_json::json!({"deleted": true, "key": CREDENTIAL_KEY}));
    } else {
        println!(
            "  {} {} removed",
            style("✓").green().bold(),
            style(CREDENTIAL_KEY).bold()
        );
    }
    Ok(())
}
