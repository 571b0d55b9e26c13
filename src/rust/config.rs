use serde::{Deserialize, Serialize};

/// How to choose between classes whose scores are exactly equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TieBreak {
    /// The earliest class in metadata order wins.
    First,
    /// The latest class in metadata order wins.
    #[default]
    Last,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub tie_break: TieBreak,
    /// Written between the original record and its prediction in result files.
    pub output_separator: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            tie_break: TieBreak::Last,
            output_separator: " / ".to_string(),
        }
    }
}

impl ClassifierConfig {
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn with_output_separator(mut self, separator: impl Into<String>) -> Self {
        self.output_separator = separator.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClassifierConfig::default();
        assert_eq!(config.tie_break, TieBreak::Last);
        assert_eq!(config.output_separator, " / ");
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: ClassifierConfig = serde_json::from_str(r#"{"tie_break": "first"}"#).unwrap();
        assert_eq!(config.tie_break, TieBreak::First);
        assert_eq!(config.output_separator, " / ");
    }
}
