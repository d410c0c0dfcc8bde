//! Exchange resolution for pair-taking operations

use crate::{
    constants::{endpoints, COINS_LIST_MISSING_MESSAGE},
    dispatch::Dispatcher,
    error::{BlockfolioError, Result},
    pair::Pair,
    transport::Request,
};

/// Behavior of the pair pre-check when no coin list is loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinCheck {
    /// Skip the check, the service rejects unknown pairs itself
    Lenient,
    /// Fail with a validation error
    Strict,
}

/// Picks the exchange a pair is queried on
pub struct ExchangeResolver<'a> {
    dispatcher: &'a Dispatcher,
}

impl<'a> ExchangeResolver<'a> {
    pub fn new(dispatcher: &'a Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Rejects pairs whose token or base is missing from the coin list
    ///
    /// `original` is the pair as the caller wrote it, used in the error message.
    pub async fn check_pair(&self, pair: &Pair, original: &str, check: CoinCheck) -> Result<()> {
        let Some(coins) = self.dispatcher.session().coins_list().await else {
            return match check {
                CoinCheck::Lenient => Ok(()),
                CoinCheck::Strict => Err(BlockfolioError::validation(COINS_LIST_MISSING_MESSAGE)),
            };
        };

        if coins.contains(pair.token()) && coins.contains(pair.base()) {
            Ok(())
        } else {
            tracing::debug!(pair = %pair, "Pair rejected by coins list");
            Err(BlockfolioError::unknown_token(original))
        }
    }

    /// Exchanges listing the pair, highest volume first
    pub async fn exchanges(&self, pair: &Pair, original: &str) -> Result<Vec<String>> {
        self.check_pair(pair, original, CoinCheck::Lenient).await?;
        self.fetch_exchanges(pair).await
    }

    /// Explicit exchange verbatim, or the top exchange of the pair
    pub async fn resolve(
        &self,
        pair: &Pair,
        original: &str,
        explicit: Option<&str>,
        check: CoinCheck,
    ) -> Result<String> {
        self.check_pair(pair, original, check).await?;

        if let Some(exchange) = explicit.filter(|e| !e.trim().is_empty()) {
            return Ok(exchange.to_string());
        }

        let top = self
            .fetch_exchanges(pair)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                BlockfolioError::remote(format!("No exchange available for {}!", pair))
            })?;
        tracing::debug!(pair = %pair, exchange = %top, "Resolved top exchange");
        Ok(top)
    }

    async fn fetch_exchanges(&self, pair: &Pair) -> Result<Vec<String>> {
        self.dispatcher
            .fetch(
                &Request::get(endpoints::EXCHANGES).segment(pair.market()),
                "exchange",
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pair::parse_token;
    use crate::session;
    use crate::transport::mock::MockTransport;
    use crate::types::InitOptions;
    use serde_json::json;
    use std::sync::Arc;

    async fn initialized(disable_coin_check: bool) -> (Arc<MockTransport>, Dispatcher) {
        let transport = Arc::new(MockTransport::new());
        transport.set_response(endpoints::REGISTER, json!({ "success": false }));
        transport.set_response(
            endpoints::COINS_LIST,
            json!({ "coins": [{ "token": "BTC" }, { "token": "AEON" }, { "token": "USD" }] }),
        );
        transport.set_response(
            endpoints::EXCHANGES,
            json!({ "exchange": ["bittrex", "poloniex"] }),
        );
        let dispatcher = Dispatcher::new(transport.clone());
        session::init(
            &dispatcher,
            "1915f3d2ef313e86",
            InitOptions { disable_coin_check },
        )
        .await
        .unwrap();
        (transport, dispatcher)
    }

    #[tokio::test]
    async fn test_unknown_token_issues_no_request() {
        let (transport, dispatcher) = initialized(false).await;
        let before = transport.call_count();
        let resolver = ExchangeResolver::new(&dispatcher);

        let err = resolver
            .resolve(&parse_token("ZSKJD/BTC"), "ZSKJD/BTC", Some("bittrex"), CoinCheck::Lenient)
            .await
            .unwrap_err();
        assert_eq!(err.message(), "ZSKJD/BTC is not an available token on Blockfolio!");

        let err = resolver
            .exchanges(&parse_token("BTC/DSQFSDFDSF"), "BTC/DSQFSDFDSF")
            .await
            .unwrap_err();
        assert_eq!(err, BlockfolioError::unknown_token("BTC/DSQFSDFDSF"));
        assert_eq!(transport.call_count(), before);
    }

    #[tokio::test]
    async fn test_explicit_exchange_is_verbatim() {
        let (transport, dispatcher) = initialized(false).await;
        let before = transport.call_count();

        let exchange = ExchangeResolver::new(&dispatcher)
            .resolve(&parse_token("AEON"), "AEON", Some("Bittrex"), CoinCheck::Strict)
            .await
            .unwrap();
        assert_eq!(exchange, "Bittrex");
        assert_eq!(transport.call_count(), before);
    }

    #[tokio::test]
    async fn test_top_exchange_is_first_listed() {
        let (transport, dispatcher) = initialized(false).await;

        let exchange = ExchangeResolver::new(&dispatcher)
            .resolve(&parse_token("AEON/BTC"), "AEON/BTC", None, CoinCheck::Lenient)
            .await
            .unwrap();
        assert_eq!(exchange, "bittrex");
        let (request, _) = transport.last_request().unwrap();
        assert_eq!(request.segments, vec!["BTC-AEON".to_string()]);
    }

    #[tokio::test]
    async fn test_disabled_coin_check() {
        let (_, dispatcher) = initialized(true).await;
        let resolver = ExchangeResolver::new(&dispatcher);
        let pair = parse_token("ZZZ/BTC");

        assert!(resolver.check_pair(&pair, "ZZZ/BTC", CoinCheck::Lenient).await.is_ok());
        assert_eq!(
            resolver
                .check_pair(&pair, "ZZZ/BTC", CoinCheck::Strict)
                .await
                .unwrap_err()
                .message(),
            "coinsList uninitialized, could not validate token pairs!"
        );
    }

    #[tokio::test]
    async fn test_empty_exchange_list() {
        let (transport, dispatcher) = initialized(false).await;
        transport.set_response(endpoints::EXCHANGES, json!({ "exchange": [] }));

        let err = ExchangeResolver::new(&dispatcher)
            .resolve(&parse_token("AEON"), "AEON", None, CoinCheck::Lenient)
            .await
            .unwrap_err();
        assert_eq!(err, BlockfolioError::remote("No exchange available for AEON/BTC!"));
    }
}
