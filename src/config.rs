use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(default)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Map configuration. Keys follow the camelCase names of the options they
/// configure, so `containerWidth = 1200` in TOML sets `container_width`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MapConfig {
    /// Mount point; becomes the id of the root SVG element
    pub parent_element: String,
    #[serde(default = "default_container_width")]
    pub container_width: f64,
    #[serde(default = "default_container_height")]
    pub container_height: f64,
    #[serde(default)]
    pub margin: Margin,
    #[serde(default = "default_tooltip_padding")]
    pub tooltip_padding: f64,
    #[serde(default = "default_legend_offset")]
    pub legend_bottom: f64,
    #[serde(default = "default_legend_offset")]
    pub legend_left: f64,
    #[serde(default = "default_legend_rect_height")]
    pub legend_rect_height: f64,
    #[serde(default = "default_legend_rect_width")]
    pub legend_rect_width: f64,
    /// Hide the tooltip when the pointer leaves a country, not only a city
    #[serde(default)]
    pub hide_on_country_leave: bool,
    /// Draw the symbol-size hint next to the density gradient
    #[serde(default = "default_legend_symbols")]
    pub legend_symbols: bool,
}

fn default_container_width() -> f64 {
    1400.0
}

fn default_container_height() -> f64 {
    900.0
}

fn default_tooltip_padding() -> f64 {
    10.0
}

fn default_legend_offset() -> f64 {
    50.0
}

fn default_legend_rect_height() -> f64 {
    12.0
}

fn default_legend_rect_width() -> f64 {
    150.0
}

fn default_legend_symbols() -> bool {
    true
}

impl MapConfig {
    pub fn new(parent_element: impl Into<String>) -> Self {
        Self {
            parent_element: parent_element.into(),
            container_width: default_container_width(),
            container_height: default_container_height(),
            margin: Margin::default(),
            tooltip_padding: default_tooltip_padding(),
            legend_bottom: default_legend_offset(),
            legend_left: default_legend_offset(),
            legend_rect_height: default_legend_rect_height(),
            legend_rect_width: default_legend_rect_width(),
            hide_on_country_leave: false,
            legend_symbols: default_legend_symbols(),
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: MapConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parent_element.trim().is_empty() {
            return Err(ConfigError::MissingParent);
        }
        if self.inner_width() <= 0.0 || self.inner_height() <= 0.0 {
            return Err(ConfigError::EmptyDrawingArea {
                width: self.container_width,
                height: self.container_height,
            });
        }
        Ok(())
    }

    /// Drawing width inside the margins
    pub fn inner_width(&self) -> f64 {
        self.container_width - self.margin.left - self.margin.right
    }

    /// Drawing height inside the margins
    pub fn inner_height(&self) -> f64 {
        self.container_height - self.margin.top - self.margin.bottom
    }

    /// Resize the container to `width` x `height`, scaling every other
    /// pixel-valued option by the same horizontal/vertical factors.
    pub fn scaled_to(&self, width: f64, height: f64) -> Self {
        let sx = width / self.container_width;
        let sy = height / self.container_height;
        Self {
            parent_element: self.parent_element.clone(),
            container_width: width,
            container_height: height,
            margin: Margin {
                top: self.margin.top * sy,
                right: self.margin.right * sx,
                bottom: self.margin.bottom * sy,
                left: self.margin.left * sx,
            },
            tooltip_padding: self.tooltip_padding * sx.min(sy),
            legend_bottom: self.legend_bottom * sy,
            legend_left: self.legend_left * sx,
            legend_rect_height: self.legend_rect_height * sy,
            legend_rect_width: self.legend_rect_width * sx,
            hide_on_country_leave: self.hide_on_country_leave,
            legend_symbols: self.legend_symbols,
        }
    }
}
