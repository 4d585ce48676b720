use serde::{Deserialize, Serialize};

/// Table behavior knobs, loadable from a TOML document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSettings {
    /// Maximum retained undo entries; oldest evicted beyond this
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Task page size, doubling as the flat-mode loading placeholder count
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Hierarchical display (false = flat task list)
    #[serde(default = "default_true")]
    pub show_hierarchy: bool,
}

impl Default for TableSettings {
    fn default() -> Self {
        TableSettings {
            history_limit: default_history_limit(),
            page_size: default_page_size(),
            show_hierarchy: true,
        }
    }
}

fn default_history_limit() -> usize {
    50
}

fn default_page_size() -> usize {
    100
}

fn default_true() -> bool {
    true
}

impl TableSettings {
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = TableSettings::default();
        assert_eq!(settings.history_limit, 50);
        assert_eq!(settings.page_size, 100);
        assert!(settings.show_hierarchy);
    }

    #[test]
    fn parse_overrides() {
        let settings =
            TableSettings::from_toml_str("history_limit = 10\nshow_hierarchy = false\n").unwrap();
        assert_eq!(settings.history_limit, 10);
        assert_eq!(settings.page_size, 100);
        assert!(!settings.show_hierarchy);
    }

    #[test]
    fn empty_document_uses_defaults() {
        let settings = TableSettings::from_toml_str("").unwrap();
        assert_eq!(settings.history_limit, 50);
    }
}
