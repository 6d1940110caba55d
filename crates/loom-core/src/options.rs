use serde::{Deserialize, Serialize};

use crate::color::ColorMode;

fn default_fontname() -> String {
    "arial".to_string()
}

fn default_bgcolor() -> String {
    "WH".to_string()
}

fn default_true() -> bool {
    true
}

/// Per-document rendering options.
///
/// Background colors are color codes; the node, connector, cable and bundle
/// colors fall back to `bgcolor` when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessOptions {
    #[serde(default = "default_fontname")]
    pub fontname: String,
    #[serde(default = "default_bgcolor")]
    pub bgcolor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bgcolor_node: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bgcolor_connector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bgcolor_cable: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bgcolor_bundle: Option<String>,
    #[serde(default)]
    pub color_mode: ColorMode,
    /// Show BOM bubbles next to components and additional parts.
    #[serde(default = "default_true")]
    pub mini_bom_mode: bool,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        HarnessOptions {
            fontname: default_fontname(),
            bgcolor: default_bgcolor(),
            bgcolor_node: None,
            bgcolor_connector: None,
            bgcolor_cable: None,
            bgcolor_bundle: None,
            color_mode: ColorMode::default(),
            mini_bom_mode: true,
        }
    }
}

impl HarnessOptions {
    pub fn node_bgcolor(&self) -> &str {
        self.bgcolor_node.as_deref().unwrap_or(&self.bgcolor)
    }

    pub fn connector_bgcolor(&self) -> &str {
        self.bgcolor_connector
            .as_deref()
            .unwrap_or_else(|| self.node_bgcolor())
    }

    pub fn cable_bgcolor(&self) -> &str {
        self.bgcolor_cable
            .as_deref()
            .unwrap_or_else(|| self.node_bgcolor())
    }

    pub fn bundle_bgcolor(&self) -> &str {
        self.bgcolor_bundle
            .as_deref()
            .unwrap_or_else(|| self.cable_bgcolor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorStyle;

    #[test]
    fn test_defaults_from_empty_document() {
        let options: HarnessOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, HarnessOptions::default());
        assert_eq!(options.fontname, "arial");
        assert!(options.mini_bom_mode);
        assert_eq!(options.connector_bgcolor(), "WH");
    }

    #[test]
    fn test_bgcolor_fallbacks() {
        let options: HarnessOptions = serde_json::from_str(
            r#"{"bgcolor_node": "GY", "bgcolor_cable": "IV", "color_mode": "full"}"#,
        )
        .unwrap();
        assert_eq!(options.connector_bgcolor(), "GY");
        assert_eq!(options.bundle_bgcolor(), "IV");
        assert_eq!(options.color_mode.style, ColorStyle::Full);
        assert!(!options.color_mode.uppercase);
    }
}
