use super::schema::Config;

/// Earliest season of the world championship
const FIRST_SEASON: u16 = 1950;

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.seasons.is_empty() {
        errors.push("seasons: at least one season is required".to_string());
    }

    for (i, season) in config.seasons.iter().enumerate() {
        if *season < FIRST_SEASON {
            errors.push(format!(
                "seasons[{}]: {} is before the first season ({})",
                i, season, FIRST_SEASON
            ));
        }
    }

    if !config.seasons.is_empty() && !config.seasons.contains(&config.default_season) {
        errors.push(format!(
            "default_season: {} is not one of the configured seasons",
            config.default_season
        ));
    }

    if config.top_n == 0 {
        errors.push("top_n: must be at least 1".to_string());
    }

    match humantime::parse_duration(config.provider.timeout.trim()) {
        Ok(d) if d.is_zero() => {
            errors.push("provider.timeout: must be greater than zero".to_string())
        }
        Ok(_) => {}
        Err(e) => errors.push(format!(
            "provider.timeout: invalid duration '{}' - {}",
            config.provider.timeout, e
        )),
    }

    let base = config.provider.base_url.trim();
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        errors.push(format!(
            "provider.base_url: '{}' must start with http:// or https://",
            config.provider.base_url
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_empty_seasons() {
        let config = Config {
            seasons: vec![],
            ..Config::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("seasons"));
    }

    #[test]
    fn test_default_season_not_listed() {
        let config = Config {
            default_season: 2019,
            ..Config::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].contains("default_season"));
    }

    #[test]
    fn test_ancient_season() {
        let config = Config {
            seasons: vec![2024, 1949],
            default_season: 2024,
            ..Config::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].contains("seasons[1]"));
    }

    #[test]
    fn test_bad_timeout() {
        let mut config = Config::default();
        config.provider.timeout = "soon".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].contains("provider.timeout"));

        config.provider.timeout = "0s".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].contains("greater than zero"));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = Config {
            top_n: 0,
            ..Config::default()
        };
        config.provider.base_url = "ftp://example.com".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
