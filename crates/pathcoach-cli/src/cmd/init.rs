use crate::output::print_json;
use anyhow::Context;
use pathcoach_core::config::Config;
use pathcoach_core::{io, paths};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let store_dir = paths::store_dir(root);
    std::fs::create_dir_all(&store_dir)
        .with_context(|| format!("failed to create {}", store_dir.display()))?;

    let config_path = paths::config_path(root);
    let yaml = serde_yaml::to_string(&Config::default()).context("failed to render config")?;
    let created = io::write_if_missing(&config_path, yaml.as_bytes())
        .context("failed to write config.yaml")?;

    if json {
        return print_json(&serde_json::json!({
            "root": root,
            "config": config_path,
            "config_created": created,
        }));
    }

    println!("Initialized pathcoach in: {}", root.display());
    if created {
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }
    println!("Next: 'pathcoach profile set', then 'pathcoach state current' and 'pathcoach state desired'.");
    Ok(())
}
