use anyhow::{Context, Result};
use pollscrape::config::Config;
use std::path::PathBuf;

pub async fn init_config(path: PathBuf, force: bool) -> Result<()> {
    let config_path = if path.is_dir() {
        path.join("pollscrape.toml")
    } else {
        path
    };

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }

    let toml_content = format!(
        "# pollscrape configuration\n\n{}",
        Config::default().to_toml()?
    );

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(&config_path, toml_content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("Created configuration file: {}", config_path.display());

    Ok(())
}
