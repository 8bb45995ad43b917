use serde::{Deserialize, Serialize};

/// Viewport width (CSS px) separating the mobile and desktop layouts.
pub const MOBILE_BREAKPOINT_PX: u32 = 640;

/// Background image URLs supplied by the hosting page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BackgroundConfigFields")]
pub struct BackgroundConfig {
    desktop_url: Option<String>,
    mobile_url: Option<String>,
}

/// Wire shape of [`BackgroundConfig`]; decoding goes through `new` so blank
/// URLs are dropped there too.
#[derive(Deserialize)]
struct BackgroundConfigFields {
    desktop_url: Option<String>,
    mobile_url: Option<String>,
}

impl From<BackgroundConfigFields> for BackgroundConfig {
    fn from(fields: BackgroundConfigFields) -> Self {
        Self::new(fields.desktop_url.as_deref(), fields.mobile_url.as_deref())
    }
}

impl BackgroundConfig {
    /// Blank strings count as "not configured".
    #[must_use]
    pub fn new(desktop_url: Option<&str>, mobile_url: Option<&str>) -> Self {
        Self {
            desktop_url: configured(desktop_url),
            mobile_url: configured(mobile_url),
        }
    }

    #[must_use]
    pub fn desktop_url(&self) -> Option<&str> {
        self.desktop_url.as_deref()
    }

    #[must_use]
    pub fn mobile_url(&self) -> Option<&str> {
        self.mobile_url.as_deref()
    }
}

fn configured(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerVisibility {
    Always,
    BelowBreakpoint,
    AtOrAboveBreakpoint,
}

impl LayerVisibility {
    #[must_use]
    pub fn is_visible_at(self, viewport_width_px: u32) -> bool {
        match self {
            Self::Always => true,
            Self::BelowBreakpoint => viewport_width_px < MOBILE_BREAKPOINT_PX,
            Self::AtOrAboveBreakpoint => viewport_width_px >= MOBILE_BREAKPOINT_PX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Desktop,
    Mobile,
}

/// Full-viewport decorative image behind the page content: covers the
/// viewport, centered, never repeated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundLayer {
    pub kind: LayerKind,
    pub url: String,
    pub visibility: LayerVisibility,
}

impl BackgroundLayer {
    /// Inline style declarations for the layer element.
    #[must_use]
    pub fn style_declarations(&self) -> Vec<(&'static str, String)> {
        vec![
            ("position", "fixed".to_string()),
            ("inset", "0".to_string()),
            ("z-index", "0".to_string()),
            ("min-height", "100lvh".to_string()),
            ("background-image", css_url(&self.url)),
            ("background-size", "cover".to_string()),
            ("background-repeat", "no-repeat".to_string()),
            ("background-position", "center".to_string()),
        ]
    }
}

fn css_url(url: &str) -> String {
    let escaped = url
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "")
        .replace('\r', "");
    format!("url(\"{escaped}\")")
}

/// Resolved background layers plus where the layout keeps its default
/// background. `default_background` is `None` when it is suppressed at every
/// width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundPlan {
    pub layers: Vec<BackgroundLayer>,
    pub default_background: Option<LayerVisibility>,
}

impl Default for BackgroundPlan {
    fn default() -> Self {
        Self {
            layers: Vec::new(),
            default_background: Some(LayerVisibility::Always),
        }
    }
}

impl BackgroundPlan {
    #[must_use]
    pub fn visible_layers_at(&self, viewport_width_px: u32) -> Vec<&BackgroundLayer> {
        self.layers
            .iter()
            .filter(|layer| layer.visibility.is_visible_at(viewport_width_px))
            .collect()
    }

    #[must_use]
    pub fn default_background_at(&self, viewport_width_px: u32) -> bool {
        self.default_background
            .is_some_and(|visibility| visibility.is_visible_at(viewport_width_px))
    }
}

#[must_use]
pub fn resolve_background_layers(config: &BackgroundConfig) -> BackgroundPlan {
    let layer = |kind, url: &str, visibility| BackgroundLayer {
        kind,
        url: url.to_string(),
        visibility,
    };

    let plan = match (config.desktop_url(), config.mobile_url()) {
        (None, None) => BackgroundPlan::default(),
        (Some(desktop), None) => BackgroundPlan {
            layers: vec![layer(LayerKind::Desktop, desktop, LayerVisibility::Always)],
            default_background: None,
        },
        (None, Some(mobile)) => BackgroundPlan {
            layers: vec![layer(
                LayerKind::Mobile,
                mobile,
                LayerVisibility::BelowBreakpoint,
            )],
            default_background: Some(LayerVisibility::AtOrAboveBreakpoint),
        },
        (Some(desktop), Some(mobile)) => BackgroundPlan {
            layers: vec![
                layer(
                    LayerKind::Desktop,
                    desktop,
                    LayerVisibility::AtOrAboveBreakpoint,
                ),
                layer(
                    LayerKind::Mobile,
                    mobile,
                    LayerVisibility::BelowBreakpoint,
                ),
            ],
            default_background: None,
        },
    };

    tracing::debug!(layers = plan.layers.len(), "background layers resolved");
    plan
}
