//! Configuration validation for the data and universe sections.

use crate::domain::error::ScreenerError;
use crate::domain::interval::Period;
use crate::ports::config_port::ConfigPort;

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    validate_period(config)?;
    validate_min_int(config, "data", "average_volume_window", 1)?;
    Ok(())
}

pub fn validate_universe_config(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    validate_universe_source(config)?;
    validate_min_int(config, "universe", "max_symbol_len", 1)?;
    validate_min_int(config, "universe", "min_volume", 0)?;
    validate_min_int(config, "universe", "volume_column", 0)?;
    Ok(())
}

fn validate_period(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    if let Some(raw) = config
        .get_string("data", "period")
        .filter(|raw| !raw.trim().is_empty())
    {
        raw.parse::<Period>()
            .map_err(|e| ScreenerError::ConfigInvalid {
                section: "data".to_string(),
                key: "period".to_string(),
                reason: e.to_string(),
            })?;
    }
    Ok(())
}

fn validate_universe_source(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    let file = config.get_string("universe", "file");
    let symbols = config.get_string("universe", "symbols");

    match (file, symbols) {
        (_, Some(s)) if !s.trim().is_empty() => Ok(()),
        (Some(f), _) if !f.trim().is_empty() => Ok(()),
        _ => Err(ScreenerError::ConfigMissing {
            section: "universe".to_string(),
            key: "file".to_string(),
        }),
    }
}

fn validate_min_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    minimum: i64,
) -> Result<(), ScreenerError> {
    let Some(raw) = config
        .get_string(section, key)
        .filter(|raw| !raw.trim().is_empty())
    else {
        return Ok(());
    };
    match raw.trim().parse::<i64>() {
        Ok(v) if v >= minimum => Ok(()),
        _ => Err(ScreenerError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("{key} must be an integer of at least {minimum}"),
        }),
    }
}
