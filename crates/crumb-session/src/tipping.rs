//! # Tipping
//!
//! Tip presets come from the API; the cart screen preselects one unless the
//! customer already typed a custom amount.
//!
//! ```text
//! custom tip given ──────────────► Custom(amount)      (no preset highlighted)
//! presets [5, 10, 15] ───────────► Preset(10)          (second preset)
//! presets [5] ───────────────────► Preset(5)           (only preset)
//! presets [] / tipping disabled ─► NoTip
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::error::{SessionError, SessionResult};
use crate::graphql::GraphqlClient;

/// Query for the tip presets.
pub const TIPPING_QUERY: &str = "query Tips { tips { _id tipVariations enabled } }";

/// Index of the preset selected by default.
const DEFAULT_PRESET_INDEX: usize = 1;

// =============================================================================
// Tipping Config
// =============================================================================

/// Tip presets as served by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TippingConfig {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub tip_variations: Vec<f64>,
    #[serde(default)]
    pub enabled: bool,
}

impl TippingConfig {
    /// The preset shown as selected when the screen opens.
    pub fn default_preset(&self) -> Option<f64> {
        if !self.enabled {
            return None;
        }
        self.tip_variations
            .get(DEFAULT_PRESET_INDEX)
            .or_else(|| self.tip_variations.first())
            .copied()
    }
}

// =============================================================================
// Tip Selection
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "amount")]
pub enum TipSelection {
    NoTip,
    Preset(f64),
    Custom(f64),
}

impl TipSelection {
    /// Decides the initial selection.
    ///
    /// A positive custom tip always wins and leaves presets unselected.
    pub fn resolve(custom_tip: Option<f64>, config: Option<&TippingConfig>) -> Self {
        if let Some(amount) = custom_tip.filter(|a| a.is_finite() && *a > 0.0) {
            return TipSelection::Custom(amount);
        }

        config
            .and_then(TippingConfig::default_preset)
            .map_or(TipSelection::NoTip, TipSelection::Preset)
    }

    /// Highlighted preset, if any.
    pub fn preset(&self) -> Option<f64> {
        match self {
            TipSelection::Preset(value) => Some(*value),
            _ => None,
        }
    }
}

// =============================================================================
// Tipping Service
// =============================================================================

#[async_trait]
pub trait TippingService: Send + Sync {
    async fn tipping(&self) -> SessionResult<TippingConfig>;
}

/// Fetches presets over GraphQL. Always goes to the network; presets are not cached.
#[derive(Debug, Clone)]
pub struct GraphqlTippingService {
    client: GraphqlClient,
}

#[derive(Debug, Deserialize)]
struct TipsData {
    tips: TippingConfig,
}

impl GraphqlTippingService {
    pub fn new(client: GraphqlClient) -> Self {
        GraphqlTippingService { client }
    }
}

#[async_trait]
impl TippingService for GraphqlTippingService {
    async fn tipping(&self) -> SessionResult<TippingConfig> {
        let data: TipsData = self.client.query(TIPPING_QUERY, json!({})).await?;
        info!(
            presets = data.tips.tip_variations.len(),
            enabled = data.tips.enabled,
            "Loaded tipping presets"
        );
        Ok(data.tips)
    }
}

/// Fixed presets; `None` behaves like an API that never answers usefully.
#[derive(Debug, Clone, Default)]
pub struct StaticTippingService(pub Option<TippingConfig>);

#[async_trait]
impl TippingService for StaticTippingService {
    async fn tipping(&self) -> SessionResult<TippingConfig> {
        self.0
            .clone()
            .ok_or_else(|| SessionError::UpstreamFetch("tipping presets unavailable".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(presets: &[f64]) -> TippingConfig {
        TippingConfig {
            id: "T1".to_string(),
            tip_variations: presets.to_vec(),
            enabled: true,
        }
    }

    #[test]
    fn test_second_preset_is_default() {
        let tips = config(&[5.0, 10.0, 15.0]);
        assert_eq!(TipSelection::resolve(None, Some(&tips)), TipSelection::Preset(10.0));
    }

    #[test]
    fn test_single_preset_falls_back_to_first() {
        let tips = config(&[5.0]);
        assert_eq!(TipSelection::resolve(None, Some(&tips)), TipSelection::Preset(5.0));
    }

    #[test]
    fn test_custom_tip_clears_preset() {
        let tips = config(&[5.0, 10.0]);
        let selection = TipSelection::resolve(Some(7.5), Some(&tips));
        assert_eq!(selection, TipSelection::Custom(7.5));
        assert_eq!(selection.preset(), None);
    }

    #[test]
    fn test_zero_custom_tip_is_ignored() {
        let tips = config(&[5.0, 10.0]);
        assert_eq!(TipSelection::resolve(Some(0.0), Some(&tips)), TipSelection::Preset(10.0));
    }

    #[test]
    fn test_no_presets() {
        assert_eq!(TipSelection::resolve(None, None), TipSelection::NoTip);
        assert_eq!(TipSelection::resolve(None, Some(&config(&[]))), TipSelection::NoTip);

        let mut disabled = config(&[5.0, 10.0]);
        disabled.enabled = false;
        assert_eq!(TipSelection::resolve(None, Some(&disabled)), TipSelection::NoTip);
    }

    #[test]
    fn test_wire_format() {
        let tips: TippingConfig = serde_json::from_value(serde_json::json!({
            "_id": "5f0c",
            "tipVariations": [10, 15, 20],
            "enabled": true
        }))
        .unwrap();
        assert_eq!(tips.id, "5f0c");
        assert_eq!(tips.tip_variations, vec![10.0, 15.0, 20.0]);
    }
}
