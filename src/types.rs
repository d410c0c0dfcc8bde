//! Types exchanged with the Blockfolio service

use crate::pair::Pair;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Accepts identifiers served either as JSON numbers or strings
fn id_from_number_or_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

/// Side of a position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionMode {
    #[default]
    Buy,
    Sell,
}

impl PositionMode {
    /// Wire value of the mode
    pub fn as_str(&self) -> &'static str {
        match self {
            PositionMode::Buy => "buy",
            PositionMode::Sell => "sell",
        }
    }
}

/// A recorded buy or sell entry of the portfolio
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub position_id: String,
    #[serde(alias = "coin")]
    pub token: String,
    pub base: String,
    #[serde(default)]
    pub exchange: String,
    #[serde(default)]
    pub mode: PositionMode,
    #[serde(default)]
    pub price: f64,
    #[serde(default, alias = "quantity")]
    pub amount: f64,
    #[serde(default)]
    pub note: Option<String>,
    /// Milliseconds since epoch
    #[serde(default)]
    pub date: Option<i64>,
}

impl Position {
    /// Pair the position was recorded on
    pub fn pair(&self) -> Pair {
        Pair::from_parts(&self.token, &self.base)
    }

    /// Date of the position, if the service reported one
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        self.date
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }
}

/// Which side of the threshold triggers an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertDirection {
    Above,
    Below,
}

/// Accepts a `"above"`/`"below"` direction or the `above` flag used by `add_alert`
fn direction_from_str_or_bool<'de, D>(deserializer: D) -> Result<AlertDirection, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDirection {
        Above(bool),
        Named(AlertDirection),
    }

    Ok(match RawDirection::deserialize(deserializer)? {
        RawDirection::Above(true) => AlertDirection::Above,
        RawDirection::Above(false) => AlertDirection::Below,
        RawDirection::Named(direction) => direction,
    })
}

/// A standing price-threshold watch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub alert_id: String,
    #[serde(alias = "coin")]
    pub token: String,
    pub base: String,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(alias = "above", deserialize_with = "direction_from_str_or_bool")]
    pub direction: AlertDirection,
    #[serde(alias = "price")]
    pub threshold: f64,
    #[serde(default)]
    pub persistent: bool,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Alert {
    /// Pair the alert watches
    pub fn pair(&self) -> Pair {
        Pair::from_parts(&self.token, &self.base)
    }
}

/// Holdings summary for one coin
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holdings {
    #[serde(default)]
    pub coin: Option<String>,
    #[serde(default)]
    pub base: Option<String>,
    pub holding_value_string: String,
    #[serde(default)]
    pub quantity: Option<f64>,
    /// Remaining fields, as served
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Whole-portfolio valuation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub btc_value: f64,
    #[serde(default)]
    pub usd_value: Option<f64>,
    #[serde(default)]
    pub fiat_value: Option<f64>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Order book snapshot of a market on one exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketDetails {
    pub ask: String,
    #[serde(default)]
    pub bid: Option<String>,
    #[serde(default)]
    pub last: Option<String>,
    #[serde(default)]
    pub high: Option<String>,
    #[serde(default)]
    pub low: Option<String>,
    #[serde(default)]
    pub volume: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Fiat currency supported for valuations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    pub currency: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Token known to the service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coin {
    pub token: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Options of `init()`
#[derive(Debug, Clone, Copy, Default)]
pub struct InitOptions {
    /// Skip the coin list fetch and the pre-flight pair checks
    pub disable_coin_check: bool,
}

/// Options of `add_position()`
///
/// Without both price and amount the pair is only watched.
#[derive(Debug, Clone, Default)]
pub struct AddPositionOptions {
    pub exchange: Option<String>,
    pub mode: PositionMode,
    pub price: Option<f64>,
    pub amount: Option<f64>,
    pub note: Option<String>,
}

impl AddPositionOptions {
    pub(crate) fn is_watch_only(&self) -> bool {
        self.price.is_none() || self.amount.is_none()
    }
}

/// Options of market data calls
#[derive(Debug, Clone, Default)]
pub struct MarketOptions {
    /// Exchange to query; the top exchange of the pair when absent
    pub exchange: Option<String>,
}

/// Options of `add_alert()`; at least one boundary is required
#[derive(Debug, Clone, Default)]
pub struct AddAlertOptions {
    pub above: Option<f64>,
    pub below: Option<f64>,
    pub exchange: Option<String>,
    pub persistent: bool,
}

impl AddAlertOptions {
    /// Boundaries set on the options, `above` first
    pub(crate) fn boundaries(&self) -> Vec<(AlertDirection, f64)> {
        let mut boundaries = Vec::with_capacity(2);
        if let Some(above) = self.above {
            boundaries.push((AlertDirection::Above, above));
        }
        if let Some(below) = self.below {
            boundaries.push((AlertDirection::Below, below));
        }
        boundaries
    }
}
