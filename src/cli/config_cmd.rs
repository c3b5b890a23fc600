//! `config init|set|get|list|path`

use crate::application::ports::ConfigStore;
use crate::domain::config::VALID_CONFIG_KEYS;
use crate::domain::error::ConfigError;

use super::args::ConfigAction;
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

pub async fn handle_config_command<S: ConfigStore + ?Sized>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => {
            presenter.output(&store.path().to_string_lossy());
            Ok(())
        }
    }
}

async fn handle_init<S: ConfigStore + ?Sized>(
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!("Config file created at: {}", store.path().display()));
    Ok(())
}

async fn handle_set<S: ConfigStore + ?Sized>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    let mut config = store.load().await?;
    config.set_value(key, value)?;
    store.save(&config).await?;

    // Echo the stored form (normalized, masked for the key)
    let stored = config.get_value(key)?.unwrap_or_else(|| NOT_SET.to_string());
    presenter.success(&format!("{} = {}", key, stored));
    Ok(())
}

async fn handle_get<S: ConfigStore + ?Sized>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    let config = store.load().await?;
    let value = config.get_value(key)?;
    presenter.output(value.as_deref().unwrap_or(NOT_SET));
    Ok(())
}

async fn handle_list<S: ConfigStore + ?Sized>(
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    let config = store.load().await?;
    for key in VALID_CONFIG_KEYS {
        let value = config.get_value(key)?;
        presenter.key_value(key, value.as_deref().unwrap_or(NOT_SET));
    }
    Ok(())
}
