use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::config::Config;

fn resolve_path(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path.to_path_buf()),
        None => Config::default_path(),
    }
}

pub fn show_config(path: Option<&Path>) -> Result<()> {
    let config = Config::load_from(path)?;
    let config_str = config.to_toml()?;

    println!("Current Configuration");
    println!("────────────────────────────────");
    println!();
    println!("{}", config_str);

    Ok(())
}

pub fn init_config(path: Option<&Path>, force: bool) -> Result<()> {
    let config_file = resolve_path(path)?;

    if config_file.exists() && !force {
        println!(
            "Configuration file already exists at: {}",
            config_file.display()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    Config::default().save_to(&config_file)?;

    println!("✓ Configuration initialized at: {}", config_file.display());

    Ok(())
}
