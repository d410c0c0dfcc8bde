//! Blockfolio client façade
//!
//! One method per remote capability. Arguments are validated first, then the
//! init guard runs, and only then is the transport reached.

use crate::{
    constants::{endpoints, API_URL_ENV, BLOCKFOLIO_API_URL, STATUS_PLATFORM},
    dispatch::{require, Dispatcher},
    error::{BlockfolioError, Result},
    exchange::{CoinCheck, ExchangeResolver},
    metrics::DispatchMetrics,
    pair::{parse_token, Pair},
    session::{self, Session},
    transport::{Request, Transport},
    transports::HttpTransport,
    types::{
        AddAlertOptions, AddPositionOptions, Alert, AlertDirection, Coin, Currency, Holdings,
        InitOptions, MarketDetails, MarketOptions, PortfolioSummary, Position,
    },
};
use chrono::Utc;
use std::sync::Arc;

/// Client of the Blockfolio API
///
/// Cloning is cheap; clones share the same session.
///
/// # Example
/// ```no_run
/// use blockfolio_sdk::{BlockfolioClient, InitOptions, MarketOptions};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = BlockfolioClient::new()?;
/// client.init("1915f3d2ef313e86", InitOptions::default()).await?;
///
/// let price = client.get_price("AEON/BTC", MarketOptions::default()).await?;
/// println!("AEON: {} BTC", price);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BlockfolioClient {
    dispatcher: Arc<Dispatcher>,
}

impl BlockfolioClient {
    /// Creates a client over HTTP
    ///
    /// The API URL is read from the `BLOCKFOLIO_API_URL` environment variable,
    /// falling back to the public endpoint.
    pub fn new() -> Result<Self> {
        let base_url =
            std::env::var(API_URL_ENV).unwrap_or_else(|_| BLOCKFOLIO_API_URL.to_string());
        let transport = HttpTransport::with_base_url(&base_url)?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    /// Creates a client over a custom transport
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            dispatcher: Arc::new(Dispatcher::new(transport)),
        }
    }

    // Session

    /// Validates `client_token` and opens the session
    pub async fn init(&self, client_token: &str, options: InitOptions) -> Result<()> {
        session::init(&self.dispatcher, client_token, options).await
    }

    /// Activates a device token; fails with `AlreadyRegistered` when it is active
    pub async fn register(&self, device_token: &str) -> Result<String> {
        session::register(&self.dispatcher, device_token).await
    }

    /// Obtains a short-lived device token
    pub async fn get_disposable_device_token(&self) -> Result<String> {
        session::disposable_device_token(&self.dispatcher).await
    }

    /// Current session state
    pub async fn session(&self) -> Session {
        self.dispatcher.session().snapshot().await
    }

    /// Transport call statistics
    pub async fn metrics(&self) -> DispatchMetrics {
        self.dispatcher.metrics().await
    }

    // Positions

    /// Positions of a pair, or of the whole portfolio
    pub async fn get_positions(&self, pair: Option<&str>) -> Result<Vec<Position>> {
        self.dispatcher.ensure_initialized().await?;

        let request = match pair.filter(|p| !p.trim().is_empty()) {
            Some(pair) => {
                Request::scoped(endpoints::PAIR_POSITIONS).segment(parse_token(pair).market())
            }
            None => Request::scoped(endpoints::ALL_POSITIONS),
        };
        self.dispatcher.fetch(&request, "positionList").await
    }

    /// Records a position, or watches the pair when price or amount is missing
    pub async fn add_position(&self, pair: &str, options: AddPositionOptions) -> Result<String> {
        let original = require(pair, "You must provide a token to add to your position!")?;
        self.dispatcher.ensure_initialized().await?;

        let pair = parse_token(original);
        let exchange = self
            .resolver()
            .resolve(&pair, original, options.exchange.as_deref(), CoinCheck::Strict)
            .await?;

        let mut request = Request::scoped(endpoints::ADD_POSITION)
            .query("pair", pair.market())
            .query("exchange", &exchange)
            .query("mode", options.mode.as_str())
            .query("date", Utc::now().timestamp_millis());

        if options.is_watch_only() {
            request = request.query("watchOnly", 1);
        } else {
            request = request
                .query("price", options.price.unwrap_or_default())
                .query("quantity", options.amount.unwrap_or_default())
                .query("watchOnly", 0);
        }
        if let Some(note) = &options.note {
            request = request.query("note", note);
        }

        tracing::debug!(pair = %pair, exchange = %exchange, "Adding position");
        self.dispatcher.status(&request).await
    }

    pub async fn remove_position(&self, position_id: &str) -> Result<String> {
        let position_id = require(position_id, "You must provide a position ID!")?;
        self.dispatcher.ensure_initialized().await?;

        self.dispatcher
            .status(&Request::scoped(endpoints::REMOVE_POSITION).segment(position_id))
            .await
    }

    /// Removes a pair and all its positions from the portfolio
    pub async fn remove_coin(&self, pair: &str) -> Result<String> {
        let pair = require(pair, "You must provide a pair to remove!")?;
        self.dispatcher.ensure_initialized().await?;

        self.dispatcher
            .status(&Request::scoped(endpoints::REMOVE_COIN).segment(parse_token(pair).market()))
            .await
    }

    /// Holdings of a pair, or of every coin in the portfolio
    pub async fn get_holdings(&self, pair: Option<&str>) -> Result<Vec<Holdings>> {
        self.dispatcher.ensure_initialized().await?;

        match pair.filter(|p| !p.trim().is_empty()) {
            Some(pair) => {
                let request =
                    Request::scoped(endpoints::COIN_SUMMARY).segment(parse_token(pair).market());
                let holdings: Holdings = self.dispatcher.fetch(&request, "holdings").await?;
                Ok(vec![holdings])
            }
            None => {
                self.dispatcher
                    .fetch(&Request::scoped(endpoints::ALL_HOLDINGS), "holdingsList")
                    .await
            }
        }
    }

    pub async fn get_portfolio_summary(&self) -> Result<PortfolioSummary> {
        self.dispatcher.ensure_initialized().await?;
        self.dispatcher
            .fetch(&Request::scoped(endpoints::PORTFOLIO_SUMMARY), "portfolio")
            .await
    }

    // Markets

    /// Order book snapshot on the given or top exchange
    pub async fn get_market_details(
        &self,
        pair: &str,
        options: MarketOptions,
    ) -> Result<MarketDetails> {
        let original = require(pair, "You must provide a pair to get market details!")?;
        self.dispatcher.ensure_initialized().await?;

        let pair = parse_token(original);
        let exchange = self
            .resolver()
            .resolve(&pair, original, options.exchange.as_deref(), CoinCheck::Lenient)
            .await?;

        let body = self
            .dispatcher
            .send(
                &Request::get(endpoints::MARKET_DETAILS)
                    .segment(exchange)
                    .segment(pair.market()),
            )
            .await?;
        serde_json::from_value(body).map_err(|e| {
            BlockfolioError::remote(format!("Unexpected response from Blockfolio: {}", e))
        })
    }

    /// Exchanges listing the pair, highest volume first
    pub async fn get_exchanges(&self, pair: &str) -> Result<Vec<String>> {
        let original = require(pair, "You must provide a pair to get exchanges!")?;
        self.dispatcher.ensure_initialized().await?;

        self.resolver().exchanges(&parse_token(original), original).await
    }

    /// Last traded price on the given or top exchange
    pub async fn get_price(&self, pair: &str, options: MarketOptions) -> Result<f64> {
        let original = require(pair, "You must provide a pair to get a price!")?;
        self.dispatcher.ensure_initialized().await?;

        let pair = parse_token(original);
        let exchange = self
            .resolver()
            .resolve(&pair, original, options.exchange.as_deref(), CoinCheck::Lenient)
            .await?;

        self.dispatcher
            .fetch(
                &Request::get(endpoints::LAST_PRICE)
                    .segment(exchange)
                    .segment(pair.market())
                    .query("locale", "en-US"),
                "price",
            )
            .await
    }

    // Alerts

    /// Sets one alert per boundary given, `above` first
    ///
    /// Boundaries are sent one request at a time and the call stops at the
    /// first failure. When both `above` and `below` are set and the `below`
    /// request fails, the `above` alert stays created: list the pair with
    /// [`get_alerts`](Self::get_alerts) before retrying.
    pub async fn add_alert(&self, pair: &str, options: AddAlertOptions) -> Result<String> {
        let original = require(pair, "You must provide a pair to set alerts!")?;
        let boundaries = options.boundaries();
        if boundaries.is_empty() {
            return Err(BlockfolioError::validation(
                "You must specify at leat a boundary to set up an alert!",
            ));
        }
        self.dispatcher.ensure_initialized().await?;

        let pair = parse_token(original);
        let exchange = self
            .resolver()
            .resolve(&pair, original, options.exchange.as_deref(), CoinCheck::Lenient)
            .await?;

        let mut status = String::new();
        for (created, (direction, threshold)) in boundaries.into_iter().enumerate() {
            let request = Request::scoped(endpoints::ADD_ALERT)
                .query("pair", pair.market())
                .query("exchange", &exchange)
                .query("price", threshold)
                .query("above", direction == AlertDirection::Above)
                .query("persistent", options.persistent);
            status = match self.dispatcher.status(&request).await {
                Ok(status) => status,
                Err(e) => {
                    if created > 0 {
                        tracing::warn!(pair = %pair, created, error = %e, "Alert partially set");
                    }
                    return Err(e);
                }
            };
        }
        Ok(status)
    }

    pub async fn get_alerts(&self, pair: &str) -> Result<Vec<Alert>> {
        let pair = require(pair, "You must provide a pair to get alerts from!")?;
        self.dispatcher.ensure_initialized().await?;

        self.dispatcher
            .fetch(
                &Request::scoped(endpoints::GET_ALERTS).segment(parse_token(pair).market()),
                "alertList",
            )
            .await
    }

    pub async fn pause_alert(&self, alert_id: &str) -> Result<String> {
        self.alert_action(endpoints::PAUSE_ALERT, alert_id).await
    }

    pub async fn start_alert(&self, alert_id: &str) -> Result<String> {
        self.alert_action(endpoints::START_ALERT, alert_id).await
    }

    pub async fn remove_alert(&self, alert_id: &str) -> Result<String> {
        self.alert_action(endpoints::REMOVE_ALERT, alert_id).await
    }

    pub async fn pause_all_alerts(&self, pair: &str) -> Result<String> {
        let pair = require(pair, "You must provide a pair to pause alerts!")?;
        self.pair_alerts_action(endpoints::PAUSE_ALL_ALERTS, pair).await
    }

    pub async fn start_all_alerts(&self, pair: &str) -> Result<String> {
        let pair = require(pair, "You must provide a pair to start alerts!")?;
        self.pair_alerts_action(endpoints::START_ALL_ALERTS, pair).await
    }

    // Reference data

    pub async fn get_currencies(&self) -> Result<Vec<Currency>> {
        self.dispatcher
            .fetch(&Request::get(endpoints::CURRENCIES), "currencyList")
            .await
    }

    /// Coins known to the service, fetched fresh (the session cache is untouched)
    pub async fn get_coins_list(&self) -> Result<Vec<Coin>> {
        self.dispatcher
            .fetch(&Request::get(endpoints::COINS_LIST), "coins")
            .await
    }

    pub async fn get_version(&self) -> Result<u32> {
        self.dispatcher
            .fetch(&Request::get(endpoints::VERSION), "version")
            .await
    }

    /// System status message of the service
    pub async fn get_status(&self) -> Result<String> {
        self.dispatcher
            .fetch(
                &Request::get(endpoints::SYSTEM_STATUS).query("platform", STATUS_PLATFORM),
                "message",
            )
            .await
    }

    // Utilities

    /// Random token in device token format
    pub fn generate_client_token() -> String {
        session::generate_client_token()
    }

    /// See [`parse_token`](crate::pair::parse_token)
    pub fn parse_token(input: &str) -> Pair {
        parse_token(input)
    }

    fn resolver(&self) -> ExchangeResolver<'_> {
        ExchangeResolver::new(&self.dispatcher)
    }

    async fn alert_action(&self, endpoint: &'static str, alert_id: &str) -> Result<String> {
        let alert_id = require(alert_id, "You must provide an alert ID!")?;
        self.dispatcher.ensure_initialized().await?;

        self.dispatcher
            .status(&Request::scoped(endpoint).segment(alert_id))
            .await
    }

    async fn pair_alerts_action(&self, endpoint: &'static str, pair: &str) -> Result<String> {
        self.dispatcher.ensure_initialized().await?;

        self.dispatcher
            .status(&Request::scoped(endpoint).segment(parse_token(pair).market()))
            .await
    }
}
