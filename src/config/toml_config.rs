use crate::core::aggregator::DEFAULT_BONUS_CATEGORY;
use crate::core::layout::DEFAULT_UNREGISTERED_LIGHTEN;
use crate::core::palette::{CategoryPalette, CategoryStyle, DEFAULT_FALLBACK_COLOR};
use crate::core::semester::MAX_WEEK_COUNT;
use crate::domain::model::HexColor;
use crate::utils::error::{Result, StrategyError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "https://intra.epitech.eu";
pub const DEFAULT_MODULES_ENDPOINT: &str = "/course/filter?format=json&preload=1\
    &location%5B%5D=FR&location%5B%5D=FR%2FLYN\
    &course%5B%5D=bachelor%2Fclassic\
    &scolaryear%5B%5D=2024&scolaryear%5B%5D=2025";
pub const DEFAULT_LOCATION: &str = "FR/LYN";

/// Optional settings file; every section and field may be omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub portal: PortalConfig,
    pub layout: LayoutConfig,
    /// Code prefix to category, merged over the built-in palette.
    pub categories: BTreeMap<String, CategoryStyle>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub base_url: String,
    pub modules_endpoint: String,
    pub timeout_seconds: u64,
    /// `instance_location` modules must match; empty disables the filter.
    pub location: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            modules_endpoint: DEFAULT_MODULES_ENDPOINT.to_string(),
            timeout_seconds: 30,
            location: DEFAULT_LOCATION.to_string(),
        }
    }
}

impl PortalConfig {
    pub fn modules_url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.modules_endpoint
        )
    }

    pub fn location_filter(&self) -> Option<&str> {
        let location = self.location.trim();
        (!location.is_empty()).then_some(location)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub default_week_count: u32,
    pub bonus_category: String,
    pub fallback_color: HexColor,
    pub unregistered_lighten: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            default_week_count: 18,
            bonus_category: DEFAULT_BONUS_CATEGORY.to_string(),
            fallback_color: DEFAULT_FALLBACK_COLOR,
            unregistered_lighten: DEFAULT_UNREGISTERED_LIGHTEN,
        }
    }
}

impl StrategyConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(StrategyError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| StrategyError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn palette(&self) -> CategoryPalette {
        CategoryPalette::builtin()
            .with_fallback_color(self.layout.fallback_color)
            .with_overrides(&self.categories)
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("portal.base_url", &self.portal.base_url)?;
        validation::validate_non_empty_string(
            "portal.modules_endpoint",
            &self.portal.modules_endpoint,
        )?;
        validation::validate_range("portal.timeout_seconds", self.portal.timeout_seconds, 1, 600)?;
        validation::validate_range(
            "layout.default_week_count",
            self.layout.default_week_count,
            1,
            MAX_WEEK_COUNT,
        )?;
        validation::validate_non_empty_string("layout.bonus_category", &self.layout.bonus_category)?;
        validation::validate_range(
            "layout.unregistered_lighten",
            self.layout.unregistered_lighten,
            0.0,
            1.0,
        )?;

        for (prefix, style) in &self.categories {
            validation::validate_non_empty_string(&format!("categories.{}", prefix), prefix)?;
            validation::validate_non_empty_string(&format!("categories.{}.name", prefix), &style.name)?;
        }

        Ok(())
    }
}

impl Validate for StrategyConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = StrategyConfig::from_toml_str("").unwrap();
        assert_eq!(config.portal.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.portal.timeout_seconds, 30);
        assert_eq!(config.portal.location_filter(), Some("FR/LYN"));
        assert_eq!(config.layout.bonus_category, "Innovation");
        assert_eq!(config.layout.default_week_count, 18);
        assert!(config.validate().is_ok());
        assert!(config.portal.modules_url().starts_with("https://intra.epitech.eu/course/filter?"));
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_content = r##"
[portal]
base_url = "http://127.0.0.1:9000/"
location = ""

[layout]
fallback_color = "#EEEEEE"
unregistered_lighten = 0.25

[categories.G-SEC]
name = "Cybersecurity"
color = "112233"

[categories.B-WEB]
name = "Web"
color = "ABCDEF"
"##;

        let config = StrategyConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.portal.location_filter(), None);
        assert_eq!(config.portal.timeout_seconds, 30);
        assert!(config
            .portal
            .modules_url()
            .starts_with("http://127.0.0.1:9000/course/filter"));

        let palette = config.palette();
        assert_eq!(palette.resolve("G-SEC-500").name, "Cybersecurity");
        assert_eq!(palette.resolve("B-WEB-200").color, HexColor(0xABCDEF));
        assert_eq!(palette.resolve("Z-ZZZ-000").color, HexColor(0xEEEEEE));
        assert_eq!(palette.resolve("G-AIA-500").name, "AI & Machine Learning");
    }

    #[test]
    fn test_invalid_color_is_rejected_at_parse() {
        let toml_content = r#"
[categories.G-SEC]
name = "Security"
color = "not-a-color"
"#;
        assert!(matches!(
            StrategyConfig::from_toml_str(toml_content),
            Err(StrategyError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[portal]
base_url = "invalid-url"
"#;
        let config = StrategyConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let toml_content = r#"
[layout]
unregistered_lighten = 2.0
"#;
        let config = StrategyConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[layout]\ndefault_week_count = 20\n")
            .unwrap();

        let config = StrategyConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.layout.default_week_count, 20);
        assert!(StrategyConfig::from_file("/nonexistent/credit-strategy.toml").is_err());
    }
}
