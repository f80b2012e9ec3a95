use anyhow::{Context, Result};

/// Open a URL in the user's default browser
///
/// # Arguments
/// * `url` - The URL to open (e.g., a race report page)
///
/// # Errors
/// Returns error if browser cannot be opened (e.g., no browser available)
pub fn open_url(url: &str) -> Result<()> {
    webbrowser::open(url)
        .with_context(|| format!("Failed to open browser for URL: {}", url))?;
    Ok(())
}

/// Report page for an event, if the provider supplied one
pub fn report_url(event: &crate::provider::RaceEvent) -> Result<&str> {
    event
        .url
        .as_deref()
        .with_context(|| format!("No report page for {}", event.event_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::RaceEvent;

    #[test]
    fn test_report_url() {
        let mut event = RaceEvent {
            season: 2024,
            round: 1,
            event_name: "Bahrain Grand Prix".to_string(),
            date: None,
            url: None,
        };
        assert!(report_url(&event).is_err());

        event.url = Some("https://en.wikipedia.org/wiki/2024_Bahrain_Grand_Prix".to_string());
        assert_eq!(
            report_url(&event).unwrap(),
            "https://en.wikipedia.org/wiki/2024_Bahrain_Grand_Prix"
        );
    }
}
