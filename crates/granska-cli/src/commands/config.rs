use granska_core::config::{load_config, EngineConfig};
use std::path::Path;

pub fn show_default() -> Result<(), granska_core::error::GranskaError> {
    let json = serde_json::to_string_pretty(&EngineConfig::default())?;
    println!("{json}");
    Ok(())
}

pub fn validate(file: &Path) -> Result<(), granska_core::error::GranskaError> {
    let config = load_config(file)?;

    println!("Config '{}' is valid.", file.display());
    println!("  Band width: {}", config.band_width);
    let strategies: Vec<&str> = config.score_strategies.iter().map(|s| s.name()).collect();
    println!("  Score strategies: {}", strategies.join(", "));
    println!(
        "  Un-numbered fallback: {}",
        if config.unnumbered_fallback { "on" } else { "off" }
    );

    Ok(())
}
