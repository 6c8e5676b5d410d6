use crate::cmd::{load_config, prompt_line, require_key, runtime};
use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use pathcoach_agent::MusicClient;
use pathcoach_core::credentials::{Credential, CredentialResolver, CredentialSource};
use pathcoach_core::store::Store;
use std::path::Path;

#[derive(Subcommand)]
pub enum KeySubcommand {
    /// Store an API key (read from stdin when VALUE is omitted)
    Set {
        /// Which key: text or music
        credential: Credential,
        value: Option<String>,
    },

    /// Show where each key comes from
    Status,

    /// Ask the music service whether the music key is accepted
    Check,

    /// Delete a stored key
    Remove {
        /// Which key: text or music
        credential: Credential,
    },
}

pub fn run(root: &Path, subcmd: KeySubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        KeySubcommand::Set { credential, value } => set(root, credential, value, json),
        KeySubcommand::Status => status(root, json),
        KeySubcommand::Check => check(root, json),
        KeySubcommand::Remove { credential } => remove(root, credential, json),
    }
}

fn set(root: &Path, credential: Credential, value: Option<String>, json: bool) -> anyhow::Result<()> {
    let value = match value {
        Some(v) => v,
        None => prompt_line(&format!("Enter your {} key: ", credential.label()))?,
    };
    let store = Store::open(root);
    CredentialResolver::new(&store).store_key(credential, &value)?;

    if json {
        return print_json(&serde_json::json!({ "credential": credential, "stored": true }));
    }
    println!("Stored the {} key.", credential.label());
    Ok(())
}

fn status(root: &Path, json: bool) -> anyhow::Result<()> {
    let store = Store::open(root);
    let statuses = CredentialResolver::new(&store).status();

    if json {
        return print_json(&statuses);
    }
    let rows = statuses
        .iter()
        .map(|s| {
            let source = match s.source {
                Some(CredentialSource::Environment) => "environment",
                Some(CredentialSource::Stored) => "stored",
                None => "missing",
            };
            vec![
                s.credential.to_string(),
                source.to_string(),
                s.masked.clone().unwrap_or_else(|| "-".to_string()),
                s.env_var.to_string(),
            ]
        })
        .collect();
    print_table(&["KEY", "SOURCE", "VALUE", "ENV VAR"], rows);
    Ok(())
}

fn check(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let store = Store::open(root);
    let key = require_key(&store, Credential::MusicApi)?;
    let client = MusicClient::new(&config.music_api, key)?;
    let valid = runtime()?
        .block_on(client.check_key())
        .context("music key check failed")?;

    if json {
        print_json(&serde_json::json!({ "credential": Credential::MusicApi, "valid": valid }))?;
    } else if valid {
        println!("The music key is valid.");
    }
    if !valid {
        anyhow::bail!(
            "the {} rejected the key: run 'pathcoach key set music' with a new one",
            Credential::MusicApi.label()
        );
    }
    Ok(())
}

fn remove(root: &Path, credential: Credential, json: bool) -> anyhow::Result<()> {
    let store = Store::open(root);
    CredentialResolver::new(&store)
        .forget(credential)
        .with_context(|| format!("failed to remove the {} key", credential.label()))?;

    if json {
        return print_json(&serde_json::json!({ "credential": credential, "removed": true }));
    }
    println!("Removed the stored {} key.", credential.label());
    Ok(())
}
