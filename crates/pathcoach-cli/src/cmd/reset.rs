use crate::output::print_json;
use anyhow::Context;
use pathcoach_core::store::Store;
use std::path::Path;

pub fn run(root: &Path, keep_keys: bool, json: bool) -> anyhow::Result<()> {
    Store::open(root)
        .clear_session(keep_keys)
        .context("failed to clear the session")?;

    if json {
        return print_json(&serde_json::json!({ "reset": true, "keys_kept": keep_keys }));
    }
    if keep_keys {
        println!("Session cleared. API keys kept.");
    } else {
        println!("Session cleared, including API keys.");
    }
    Ok(())
}
