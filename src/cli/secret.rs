//! Secret command - maintain the deployment's secret store.

use crate::cli::output;
use crate::core::config::Settings;
use crate::core::store::EnvStore;
use crate::error::{Result, StoreError};

/// Set a value, overwriting any existing entry for the key.
pub fn set(settings: &Settings, key: &str, value: &str) -> Result<()> {
    let mut store = EnvStore::load_or_seed(&settings.env_path(), &settings.env_example_path())?;

    if store.set(key, value) {
        store.save()?;
        store.prune_backups()?;
        output::success(&format!("set {}", key));
    } else {
        output::success(&format!("{} unchanged", key));
    }
    Ok(())
}

/// Print a value. A missing key is reported distinctly from an empty value.
pub fn get(settings: &Settings, key: &str) -> Result<()> {
    let env_path = settings.env_path();
    let store = if env_path.exists() {
        EnvStore::load(&env_path)?
    } else {
        EnvStore::empty(&env_path)
    };

    match store.get(key) {
        Some(value) => {
            println!("{}", value);
            Ok(())
        }
        None => Err(StoreError::KeyNotSet(key.to_string()).into()),
    }
}

/// List stored keys (never values; some of them are credentials).
pub fn list(settings: &Settings, json: bool) -> Result<()> {
    let env_path = settings.env_path();
    let store = if env_path.exists() {
        EnvStore::load(&env_path)?
    } else {
        EnvStore::empty(&env_path)
    };

    let keys: Vec<&str> = store.keys().collect();

    if json {
        println!("{}", serde_json::to_string(&keys)?);
        return Ok(());
    }

    if keys.is_empty() {
        output::dimmed("no values stored");
        return Ok(());
    }
    for key in keys {
        output::list_item(key);
    }
    Ok(())
}
