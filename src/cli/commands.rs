//! CLI command implementations

use anyhow::Result;
use dialoguer::Confirm;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::connect;
use crate::connect::account::is_custodial;
use crate::connect::AccountProvisioner;
use crate::profile::{Credentials, Field, NodeKind, Profile, SaveReadiness};
use crate::safety::{DeletionContext, DeletionDecision, DeletionGuard, ModalAnswer, WalletExposure};
use crate::store::{DeleteOutcome, JsonSettingsFile, ProfileStore};

fn open_store(config: &Config) -> ProfileStore {
    let persistence = JsonSettingsFile::new(&config.storage.settings_path);
    ProfileStore::new(Arc::new(persistence), config.embedded.restart_required)
}

fn mask(secret: &str) -> String {
    if secret.is_empty() {
        "(not set)".to_string()
    } else {
        "***".to_string()
    }
}

/// List saved profiles
pub async fn list(config: &Config) -> Result<()> {
    let settings = open_store(config).settings().await?;

    println!("\n=== NODE PROFILES ===\n");
    if settings.profiles.is_empty() {
        println!("No profiles saved.");
        return Ok(());
    }

    println!("{:<3} {:<6} {:<22} {:<24} {}", "", "INDEX", "KIND", "NAME", "HOST");
    println!("{}", "-".repeat(80));

    for (index, profile) in settings.profiles.iter().enumerate() {
        let marker = if settings.is_active(index) { "*" } else { "" };
        let host = profile.credentials.display_host().unwrap_or("-");
        let host_display = if host.chars().count() > 30 {
            format!("{}...", host.chars().take(30).collect::<String>())
        } else {
            host.to_string()
        };

        println!(
            "{:<3} {:<6} {:<22} {:<24} {}",
            marker,
            index,
            profile.kind().to_string(),
            profile.label(),
            host_display
        );
    }

    println!();
    Ok(())
}

/// Show one profile with secrets masked
pub async fn show(config: &Config, index: usize) -> Result<()> {
    let settings = open_store(config).settings().await?;
    let profile = settings.profile(index)?;

    println!("\n=== PROFILE {} ===\n", index);
    println!("Nickname:    {}", profile.label());
    println!("Kind:        {}", profile.kind());
    println!("Active:      {}", settings.is_active(index));
    if profile.kind().supports_tor() {
        println!("Tor:         {}", profile.use_tor);
        println!("Verify cert: {}", profile.verify_cert);
    }

    match &profile.credentials {
        Credentials::Lnd(c) => {
            println!("Host:        {}", c.host);
            println!("Port:        {}", c.port.as_deref().unwrap_or("(default)"));
            println!("Macaroon:    {}", mask(&c.macaroon_hex));
        }
        Credentials::ClnRest(c) => {
            println!("Host:        {}", c.host);
            println!("Port:        {}", c.port.as_deref().unwrap_or("(default)"));
            println!("Rune:        {}", mask(&c.rune));
        }
        Credentials::ManagedAccount(c) => {
            println!("Server:      {}", c.account_url);
            println!("Username:    {}", c.username);
            println!("Password:    {}", mask(&c.password));
        }
        Credentials::RemotePairing(c) => {
            println!("Relay:       {}", c.effective_relay());
            println!("Phrase:      {}", mask(&c.pairing_phrase));
        }
        Credentials::NostrWalletConnect(c) => {
            println!("URL:         {}", mask(&c.wallet_connect_url));
        }
        Credentials::Embedded(m) => {
            println!("Network:     {}", m.network);
            println!("Directory:   {}", m.directory());
            println!("Seed words:  {} (hidden)", m.seed_words.len());
        }
    }

    println!();
    Ok(())
}

/// Import a connection string as a new profile
pub async fn import(config: &Config, uri: &str, nickname: Option<String>) -> Result<()> {
    let parsed = connect::parse(uri)
        .ok_or_else(|| anyhow::anyhow!("Unrecognized connection string"))?;

    let mut draft = config.session_options().new_draft(parsed.kind());
    draft.apply_import(parsed);
    if let Some(nickname) = nickname {
        draft.set_nickname(nickname);
    }

    match draft.save_readiness() {
        SaveReadiness::NeedsCertificateWarning => {
            let confirmed = Confirm::new()
                .with_prompt(
                    "Certificate verification and Tor are both off. \
                     Only continue if you trust the network path to this node.",
                )
                .default(false)
                .interact()?;

            if !confirmed {
                info!("Import cancelled by user");
                return Ok(());
            }
            draft.acknowledge_cert_warning();
        }
        SaveReadiness::Missing(fields) if draft.kind == NodeKind::ManagedAccount => {
            anyhow::bail!(
                "Managed account string has no login; missing {:?}. Create the account in the app first",
                fields
            );
        }
        _ => {}
    }

    let profile = draft.to_profile()?;
    let saved = open_store(config).save(profile, None).await?;

    println!(
        "Imported {} profile at index {}",
        saved.settings.profiles[saved.index].kind(),
        saved.index
    );
    Ok(())
}

/// Create a new account on a managed-account server and save it as a profile
pub async fn create_account(
    config: &Config,
    server: &str,
    nickname: Option<String>,
    use_tor: bool,
) -> Result<()> {
    let options = config.session_options();
    let mut draft = options.new_draft(NodeKind::ManagedAccount);

    draft.edit(Field::AccountUrl, server);
    if draft.errors.account_url || draft.account_url.is_empty() {
        anyhow::bail!("Invalid account server: {}", server);
    }
    draft.set_use_tor(use_tor);

    if is_custodial(&draft.account_url, &options.custodial_hosts) {
        warn!("{} is a custodial server", draft.account_url);
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "{} holds the funds of its accounts. Create an account anyway?",
                draft.account_url
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            info!("Account creation cancelled by user");
            return Ok(());
        }
        draft.dismiss_custodial_warning();
    }

    let login = config
        .account_provisioner()
        .create_account(&draft.account_url, draft.verify_cert, draft.use_tor)
        .await?;
    draft.apply_account(login);
    if let Some(nickname) = nickname {
        draft.set_nickname(nickname);
    }

    let profile = draft.to_profile()?;
    let saved = open_store(config).save(profile, None).await?;

    println!(
        "Created account {} on {} (profile index {})",
        draft.username, draft.account_url, saved.index
    );
    Ok(())
}

/// Make a profile active
pub async fn activate(config: &Config, index: usize) -> Result<()> {
    let result = open_store(config).set_active(index, false).await?;
    let profile = result.settings.profile(index)?;

    println!("Active profile: {} ({})", profile.label(), profile.kind());
    Ok(())
}

/// Duplicate a profile at the end of the list
pub async fn copy(config: &Config, index: usize) -> Result<()> {
    let store = open_store(config);
    let copy = store.copy(index).await?;
    let saved = store.save(copy.profile, None).await?;

    println!("Copied profile {} to index {}", index, saved.index);
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

/// Delete a profile after confirmation
pub async fn delete(config: &Config, index: usize, yes: bool) -> Result<()> {
    let store = open_store(config);
    let settings = store.settings().await?;
    let profile: &Profile = settings.profile(index)?;

    if profile.is_embedded() {
        anyhow::bail!(
            "Embedded wallets hold funds and need the node engine to be removed; delete it from the app"
        );
    }

    let context = DeletionContext {
        kind: profile.kind(),
        active: settings.is_active(index),
        exposure: WalletExposure::default(),
    };

    let mut guard = DeletionGuard::new();
    guard.request(&context);

    if !yes && !confirm(&format!("Delete profile {} ({})?", index, profile.label()))? {
        guard.disarm();
        info!("Deletion cancelled by user");
        return Ok(());
    }

    let mut decision = guard.request(&context);
    while let DeletionDecision::Modal(modal) = decision {
        let answer = if confirm(&modal.to_string())? {
            ModalAnswer::Confirm
        } else {
            ModalAnswer::Cancel
        };
        decision = guard.answer(answer);
    }

    if decision != DeletionDecision::Proceed {
        info!("Deletion cancelled");
        return Ok(());
    }

    let deletion = store.delete(index).await?;
    match deletion.outcome {
        DeleteOutcome::ListEmpty => println!("Deleted the last profile; no profiles remain"),
        DeleteOutcome::RestartNeeded => {
            warn!("Restart required to release the embedded node");
            println!("Deleted profile {}; restart required", index);
        }
        DeleteOutcome::Removed => println!("Deleted profile {}", index),
    }

    Ok(())
}

/// Show current configuration
pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", config.masked_display());
    Ok(())
}
