//! Engine configuration

use serde::{Deserialize, Serialize};

use reef_host::{Connection, HostCapabilities};
use reef_hydrate::HydrateOptions;

/// Engine configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Island element tag name
    pub tag_name: String,

    /// Condition attribute prefix
    pub attribute_prefix: String,

    /// Whether the environment supports intersection observation
    pub intersection_observer: bool,

    /// Whether the environment supports idle callbacks
    pub idle_callback: bool,

    /// Whether the environment supports media query matching
    pub match_media: bool,

    /// Reported data-saver preference; `None` when the environment
    /// has no connection capability
    pub save_data: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tag_name: "is-land".to_string(),
            attribute_prefix: "on:".to_string(),
            intersection_observer: true,
            idle_callback: true,
            match_media: true,
            save_data: None,
        }
    }
}

impl Config {
    pub(crate) fn capabilities(&self) -> HostCapabilities {
        HostCapabilities {
            intersection_observer: self.intersection_observer,
            idle_callback: self.idle_callback,
            match_media: self.match_media,
            connection: self.save_data.map(|save_data| Connection { save_data }),
        }
    }

    pub(crate) fn options(&self) -> HydrateOptions {
        HydrateOptions {
            tag_name: self.tag_name.clone(),
            attribute_prefix: self.attribute_prefix.clone(),
        }
    }
}
