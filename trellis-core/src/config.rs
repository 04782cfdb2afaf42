//! Engine Configuration
//!
//! Naming conventions shared by the graph, the selector resolver and the
//! menu loader. The defaults describe the conventional menu dialect; hosts
//! with a different dialect deserialize their own.

use serde::Deserialize;

/// Naming conventions the engine relies on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Joins element names and trait keys into absolute names.
    pub separator: char,

    /// Trait keys starting with this marker are custom and need no sink.
    pub custom_marker: char,

    /// A `copy` source ending with this marker is a switch over
    /// same-prefixed traits.
    pub switch_suffix: char,

    /// Absolute name of the host-provided screen element.
    pub screen_name: String,

    /// Absolute name of the host-provided string table element.
    pub strings_name: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            separator: '.',
            custom_marker: '_',
            switch_suffix: '_',
            screen_name: "__screen".to_string(),
            strings_name: "__strings".to_string(),
        }
    }
}

impl EngineConfig {
    /// Join an element name and a trait key.
    pub fn join(&self, element: &str, key: &str) -> String {
        if element.is_empty() {
            return key.to_string();
        }
        let mut name = String::with_capacity(element.len() + key.len() + 1);
        name.push_str(element);
        name.push(self.separator);
        name.push_str(key);
        name
    }

    /// Whether the last segment of `name` carries the custom marker.
    pub fn is_custom(&self, name: &str) -> bool {
        name.rsplit(self.separator)
            .next()
            .is_some_and(|key| key.starts_with(self.custom_marker))
    }

    /// Whether `name` is a switch prefix.
    pub fn is_switch(&self, name: &str) -> bool {
        name.ends_with(self.switch_suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_uses_separator() {
        let config = EngineConfig::default();
        assert_eq!(config.join("Menu.panel", "width"), "Menu.panel.width");
        assert_eq!(config.join("", "width"), "width");
    }

    #[test]
    fn custom_marker_checks_last_segment() {
        let config = EngineConfig::default();
        assert!(config.is_custom("Menu.panel._scroll"));
        assert!(!config.is_custom("_Menu.panel.scroll"));
        assert!(config.is_switch("Menu.opt_"));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{ "separator": "/" }"#).unwrap();
        assert_eq!(config.separator, '/');
        assert_eq!(config.screen_name, "__screen");
        assert_eq!(config.join("a", "b"), "a/b");
    }
}
