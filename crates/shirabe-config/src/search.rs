use serde::{Deserialize, Serialize};

fn default_mode() -> String {
    "exact".to_string()
}

fn default_fields() -> Vec<String> {
    vec![
        "word".to_string(),
        "reading".to_string(),
        "translation".to_string(),
    ]
}

fn default_max_results() -> usize {
    50
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Name of the expression search mode
    #[serde(default = "default_mode")]
    pub mode: String,
    /// Names of the entry fields searched
    #[serde(default = "default_fields")]
    pub fields: Vec<String>,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            fields: default_fields(),
            max_results: default_max_results(),
        }
    }
}
