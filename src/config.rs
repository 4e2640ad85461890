use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Viewer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Syntect theme used for the /highlight.css stylesheet
    #[serde(default = "default_theme")]
    pub theme: String,

    /// Extensions served as-is instead of rendered (images and other binaries)
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,

    /// Extra extension -> language-token mappings, merged over the built-in table
    #[serde(default)]
    pub language_overrides: HashMap<String, String>,
}

fn default_theme() -> String {
    "base16-ocean.dark".to_string()
}

fn default_image_extensions() -> Vec<String> {
    vec![
        "png".to_string(),
        "jpg".to_string(),
        "jpeg".to_string(),
        "gif".to_string(),
        "svg".to_string(),
        "webp".to_string(),
        "ico".to_string(),
        "pdf".to_string(),
        "woff".to_string(),
        "woff2".to_string(),
        "zip".to_string(),
        "gz".to_string(),
        "tar".to_string(),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            image_extensions: default_image_extensions(),
            language_overrides: HashMap::new(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Check if an extension is served as an opaque binary
    pub fn is_image_extension(&self, ext: &str) -> bool {
        self.image_extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_common_images() {
        let config = Config::default();
        assert!(config.is_image_extension("png"));
        assert!(config.is_image_extension("PNG"));
        assert!(!config.is_image_extension("rs"));
    }

    #[test]
    fn parses_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            theme = "InspiredGitHub"

            [language_overrides]
            cgi = "perl"
            "#,
        )
        .unwrap();

        assert_eq!(config.theme, "InspiredGitHub");
        assert_eq!(config.language_overrides.get("cgi").unwrap(), "perl");
        // untouched fields keep their defaults
        assert!(config.is_image_extension("jpg"));
    }
}
