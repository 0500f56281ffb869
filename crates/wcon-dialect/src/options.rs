use serde::{Deserialize, Serialize};

/// Key of the CeMEE Multi-Worm Tracker extension object in a track record.
pub const MWT_EXTENSION_KEY: &str = "@MWT";

/// How a repaired, mapping-shaped `data` section is laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataLayout {
    /// Records keep their source index; gaps serialize as `null`.
    #[default]
    Sparse,
    /// Records are packed in source order. Source indices are discarded.
    Dense,
}

/// Knobs for [`normalize`](crate::normalize).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizeOptions {
    pub data_layout: DataLayout,
    /// Vendor extension object whose values are singleton-wrapped.
    pub extension_key: String,
    /// Record fields whose value is wrapped in one extra list. Each one must
    /// be present in every repaired record.
    pub unwrap_fields: Vec<String>,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            data_layout: DataLayout::Sparse,
            extension_key: MWT_EXTENSION_KEY.to_string(),
            unwrap_fields: vec!["t".to_string(), "x".to_string(), "y".to_string()],
        }
    }
}

impl NormalizeOptions {
    pub fn with_layout(mut self, data_layout: DataLayout) -> Self {
        self.data_layout = data_layout;
        self
    }

    pub fn with_extension_key(mut self, key: impl Into<String>) -> Self {
        self.extension_key = key.into();
        self
    }
}
