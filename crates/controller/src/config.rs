use layers::labels::LabelLayoutConfig;
use layers::markers::FootprintConfig;
use serde::{Deserialize, Serialize};

use crate::scroll::ScrollConfig;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Parse(String),
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Parse(msg) => write!(f, "map config is not valid json: {msg}"),
            ConfigError::Invalid { field, reason } => write!(f, "map config `{field}` {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Tunables of the map controller. Every field has a default, so a config
/// file only needs the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Quiet period after the last viewport event before recomputing.
    pub debounce_ms: u64,
    pub card_footprint_lat_deg: f64,
    pub card_footprint_lng_deg: f64,
    /// Zoom at which the card footprint equals the base values.
    pub card_reference_zoom: f64,
    pub label_width_px: f64,
    pub label_height_px: f64,
    pub label_min_distance_px: f64,
    /// Floating labels are a desktop feature; mobile hosts turn them off.
    pub labels_enabled: bool,
    /// Per-axis tolerance for treating two locations as the same place.
    pub colocation_epsilon_deg: f64,
    pub scroll_duration_ms: u64,
    pub scroll_margin_px: f64,
    /// Lists shorter than this never auto-scroll.
    pub scroll_min_items: usize,
    /// How long to wait for the provider before hiding the loading indicator.
    pub loading_timeout_ms: u64,
}

impl Default for MapConfig {
    fn default() -> Self {
        let footprint = FootprintConfig::default();
        let labels = LabelLayoutConfig::default();
        Self {
            debounce_ms: 150,
            card_footprint_lat_deg: footprint.base_lat_deg,
            card_footprint_lng_deg: footprint.base_lng_deg,
            card_reference_zoom: footprint.reference_zoom,
            label_width_px: labels.label_size_px[0],
            label_height_px: labels.label_size_px[1],
            label_min_distance_px: labels.min_distance_px,
            labels_enabled: true,
            colocation_epsilon_deg: 0.001,
            scroll_duration_ms: 400,
            scroll_margin_px: 16.0,
            scroll_min_items: 4,
            loading_timeout_ms: 5_000,
        }
    }
}

impl MapConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: MapConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("card_footprint_lat_deg", self.card_footprint_lat_deg),
            ("card_footprint_lng_deg", self.card_footprint_lng_deg),
            ("label_width_px", self.label_width_px),
            ("label_height_px", self.label_height_px),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be a positive number",
                });
            }
        }

        let non_negative = [
            ("label_min_distance_px", self.label_min_distance_px),
            ("colocation_epsilon_deg", self.colocation_epsilon_deg),
            ("scroll_margin_px", self.scroll_margin_px),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be zero or positive",
                });
            }
        }

        if !self.card_reference_zoom.is_finite() {
            return Err(ConfigError::Invalid {
                field: "card_reference_zoom",
                reason: "must be finite",
            });
        }
        Ok(())
    }

    pub fn footprint(&self) -> FootprintConfig {
        FootprintConfig {
            base_lat_deg: self.card_footprint_lat_deg,
            base_lng_deg: self.card_footprint_lng_deg,
            reference_zoom: self.card_reference_zoom,
        }
    }

    pub fn label_layout(&self) -> LabelLayoutConfig {
        LabelLayoutConfig {
            label_size_px: [self.label_width_px, self.label_height_px],
            min_distance_px: self.label_min_distance_px,
        }
    }

    pub fn scroll(&self) -> ScrollConfig {
        ScrollConfig {
            duration_ms: self.scroll_duration_ms,
            margin_px: self.scroll_margin_px,
            min_items: self.scroll_min_items,
        }
    }
}
