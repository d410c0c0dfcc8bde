//! Session state and token lifecycle
//!
//! A [`SessionStore`] belongs to one client. It holds the client token, the
//! device token registered through it, the initialization flag and the coin
//! list cache. The cache is filled by `init()` and never refreshed afterwards.

use crate::{
    constants::{
        endpoints, ALREADY_REGISTERED_MESSAGE, DEVICE_TOKEN_LEN, DISPOSABLE_TOKEN_LEN, MAX_CLIENT_TOKEN_LEN,
        MIN_CLIENT_TOKEN_LEN,
    },
    dispatch::{rejection, require, Dispatcher},
    error::{BlockfolioError, Result, TransportError},
    transport::{Credentials, Request},
    types::{Coin, InitOptions},
};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use uuid::Uuid;

/// Snapshot of the session state
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub client_token: Option<String>,
    pub device_token: Option<String>,
    pub initialized: bool,
    pub coin_check_disabled: bool,
    pub coins_list: Option<Arc<HashSet<String>>>,
}

/// Owner of the session state of one client
#[derive(Debug, Default)]
pub struct SessionStore {
    state: RwLock<Session>,
    /// Serializes `init()` calls
    init_lock: Mutex<()>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> Session {
        self.state.read().await.clone()
    }

    pub async fn is_initialized(&self) -> bool {
        self.state.read().await.initialized
    }

    /// Fails with `Uninitialized` until `init()` succeeded
    pub async fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized().await {
            Ok(())
        } else {
            Err(BlockfolioError::Uninitialized)
        }
    }

    /// Credentials handed to the transport
    pub async fn credentials(&self) -> Credentials {
        Credentials {
            client_token: self.state.read().await.client_token.clone(),
        }
    }

    /// Coin list used by pre-flight checks; `None` when absent or disabled
    pub async fn coins_list(&self) -> Option<Arc<HashSet<String>>> {
        let state = self.state.read().await;
        if state.coin_check_disabled {
            None
        } else {
            state.coins_list.clone()
        }
    }

    async fn has_coins_list(&self) -> bool {
        self.state.read().await.coins_list.is_some()
    }

    async fn lock_init(&self) -> MutexGuard<'_, ()> {
        self.init_lock.lock().await
    }

    async fn record_device_token(&self, device_token: &str) {
        self.state.write().await.device_token = Some(device_token.to_string());
    }

    async fn complete_init(
        &self,
        client_token: &str,
        options: InitOptions,
        coins_list: Option<HashSet<String>>,
    ) {
        let mut state = self.state.write().await;
        state.client_token = Some(client_token.to_string());
        state.coin_check_disabled = options.disable_coin_check;
        if let Some(coins) = coins_list {
            state.coins_list = Some(Arc::new(coins));
        }
        state.initialized = true;
    }
}

/// True for a 96 lowercase hex chars disposable device token
pub fn is_disposable_token(token: &str) -> bool {
    token.len() == DISPOSABLE_TOKEN_LEN
        && token
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}

/// Checks the shape of a client token without contacting the service
pub fn check_client_token(token: &str) -> Result<()> {
    if is_disposable_token(token) {
        return Err(BlockfolioError::invalid_token(
            "Disposable device tokens cannot be used as a CLIENT_TOKEN!",
        ));
    }

    let well_formed = (MIN_CLIENT_TOKEN_LEN..=MAX_CLIENT_TOKEN_LEN).contains(&token.len())
        && token.chars().all(|c| c.is_ascii_alphanumeric());
    if !well_formed {
        return Err(BlockfolioError::invalid_token(format!(
            "{} is not a valid CLIENT_TOKEN!",
            token
        )));
    }

    Ok(())
}

/// True when a registration rejection means the token is already active
///
/// The service answers a bare `{"success": false}` or a message mentioning
/// "already" in that case; anything else is a refusal.
fn is_already_registered(message: &str) -> bool {
    message == ALREADY_REGISTERED_MESSAGE || message.to_lowercase().contains("already")
}

/// Random client token in device token format
pub fn generate_client_token() -> String {
    let mut token = Uuid::new_v4().simple().to_string();
    token.truncate(DEVICE_TOKEN_LEN);
    token
}

/// Activates a device token on the service
pub(crate) async fn register(dispatcher: &Dispatcher, device_token: &str) -> Result<String> {
    let device_token = require(device_token, "You must provide a DEVICE_TOKEN to register!")?;

    let body = dispatcher
        .transmit(&Request::get(endpoints::REGISTER).segment(device_token))
        .await?;

    if let Some(message) = rejection(&body, ALREADY_REGISTERED_MESSAGE) {
        if is_already_registered(&message) {
            tracing::debug!(%message, "Device token already registered");
            return Err(BlockfolioError::AlreadyRegistered(message));
        }
        tracing::warn!(%message, "Device token registration refused");
        return Err(BlockfolioError::Remote(message));
    }

    dispatcher.session().record_device_token(device_token).await;
    tracing::info!("Registered device token");
    Ok("success".to_string())
}

/// Validates a client token, loads the coin list and opens the session
pub(crate) async fn init(
    dispatcher: &Dispatcher,
    client_token: &str,
    options: InitOptions,
) -> Result<()> {
    let client_token = require(client_token, "You must provide a CLIENT_TOKEN!")?;
    check_client_token(client_token)?;

    let session = dispatcher.session();
    let _guard = session.lock_init().await;

    match dispatcher
        .transmit(&Request::get(endpoints::REGISTER).segment(client_token))
        .await
    {
        Ok(body) => match rejection(&body, ALREADY_REGISTERED_MESSAGE) {
            Some(message) if is_already_registered(&message) => {
                tracing::debug!("CLIENT_TOKEN already active");
            }
            Some(message) => {
                tracing::warn!(%message, "CLIENT_TOKEN rejected by Blockfolio");
                return Err(BlockfolioError::InvalidToken(message));
            }
            None => {}
        },
        Err(TransportError::Http { status, body }) if (400..500).contains(&status) => {
            tracing::warn!(status, "CLIENT_TOKEN refused by Blockfolio");
            return Err(BlockfolioError::InvalidToken(body));
        }
        Err(e) => return Err(e.into()),
    }

    let coins_list = if options.disable_coin_check || session.has_coins_list().await {
        None
    } else {
        Some(fetch_coins_list(dispatcher).await?)
    };

    if let Some(coins) = &coins_list {
        tracing::info!(coins = coins.len(), "Loaded coins list");
    }

    session.complete_init(client_token, options, coins_list).await;
    tracing::info!(
        coin_check_disabled = options.disable_coin_check,
        "Blockfolio session initialized"
    );
    Ok(())
}

/// Requests a short-lived device token
pub(crate) async fn disposable_device_token(dispatcher: &Dispatcher) -> Result<String> {
    let token: String = dispatcher
        .fetch(&Request::get(endpoints::DISPOSABLE_TOKEN), "token")
        .await?;

    if !is_disposable_token(&token) {
        return Err(BlockfolioError::remote(format!(
            "Invalid disposable token received: {}",
            token
        )));
    }

    Ok(token)
}

async fn fetch_coins_list(dispatcher: &Dispatcher) -> Result<HashSet<String>> {
    let coins: Vec<Coin> = dispatcher
        .fetch(&Request::get(endpoints::COINS_LIST), "coins")
        .await?;
    Ok(coins.into_iter().map(|c| c.token.to_uppercase()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;
    use serde_json::json;

    const FAKE_TOKEN: &str = "1915f3d2ef313e86";
    const DISPOSABLE: &str = "40f027b891222cdf7fe7d7390a29e4bb5c79ea7adbab660c855b2d6c603de2d710c10aebcc4ee76c6da4402457cbfd50";

    fn dispatcher() -> (Arc<MockTransport>, Dispatcher) {
        let transport = Arc::new(MockTransport::new());
        let dispatcher = Dispatcher::new(transport.clone());
        (transport, dispatcher)
    }

    #[test]
    fn test_token_shapes() {
        assert!(is_disposable_token(DISPOSABLE));
        assert!(!is_disposable_token(FAKE_TOKEN));
        assert!(check_client_token(FAKE_TOKEN).is_ok());
        assert!(matches!(
            check_client_token(DISPOSABLE),
            Err(BlockfolioError::InvalidToken(_))
        ));
        assert!(matches!(
            check_client_token("not a token!"),
            Err(BlockfolioError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_generate_client_token() {
        let token = generate_client_token();
        assert_eq!(token.len(), DEVICE_TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(check_client_token(&token).is_ok());
    }

    #[tokio::test]
    async fn test_init_rejects_disposable_token_without_io() {
        let (transport, dispatcher) = dispatcher();
        let err = init(&dispatcher, DISPOSABLE, InitOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BlockfolioError::InvalidToken(_)));
        assert_eq!(transport.call_count(), 0);
        assert!(!dispatcher.session().is_initialized().await);
    }

    #[tokio::test]
    async fn test_init_loads_coins_list() {
        let (transport, dispatcher) = dispatcher();
        transport.set_response(endpoints::REGISTER, json!({ "success": true }));
        transport.set_response(
            endpoints::COINS_LIST,
            json!({ "coins": [{ "token": "btc" }, { "token": "AEON" }] }),
        );

        init(&dispatcher, FAKE_TOKEN, InitOptions::default())
            .await
            .unwrap();

        let session = dispatcher.session().snapshot().await;
        assert!(session.initialized);
        assert_eq!(session.client_token.as_deref(), Some(FAKE_TOKEN));
        let coins = session.coins_list.unwrap();
        assert!(coins.contains("BTC") && coins.contains("AEON"));
    }

    #[tokio::test]
    async fn test_init_accepts_active_token_and_skips_coins() {
        let (transport, dispatcher) = dispatcher();
        transport.set_response(endpoints::REGISTER, json!({ "success": false }));

        init(
            &dispatcher,
            FAKE_TOKEN,
            InitOptions {
                disable_coin_check: true,
            },
        )
        .await
        .unwrap();

        assert_eq!(transport.calls_to(endpoints::COINS_LIST), 0);
        assert!(dispatcher.session().is_initialized().await);
        assert!(dispatcher.session().coins_list().await.is_none());
    }

    #[tokio::test]
    async fn test_init_refused_token_is_invalid() {
        let (transport, dispatcher) = dispatcher();
        // Unmocked endpoints answer HTTP 404
        let err = init(&dispatcher, FAKE_TOKEN, InitOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BlockfolioError::InvalidToken(_)));
        assert_eq!(transport.calls_to(endpoints::REGISTER), 1);
        assert!(!dispatcher.session().is_initialized().await);
    }

    #[tokio::test]
    async fn test_init_rejected_token_is_invalid() {
        let (transport, dispatcher) = dispatcher();
        transport.set_response(
            endpoints::REGISTER,
            json!({ "success": false, "message": "Invalid CLIENT_TOKEN" }),
        );
        transport.set_response(endpoints::COINS_LIST, json!({ "coins": [] }));

        let err = init(&dispatcher, FAKE_TOKEN, InitOptions::default())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            BlockfolioError::InvalidToken("Invalid CLIENT_TOKEN".to_string())
        );
        assert_eq!(transport.calls_to(endpoints::COINS_LIST), 0);
        assert!(!dispatcher.session().is_initialized().await);
        assert!(dispatcher.session().snapshot().await.client_token.is_none());
    }

    #[tokio::test]
    async fn test_init_accepts_already_registered_message() {
        let (transport, dispatcher) = dispatcher();
        transport.set_response(
            endpoints::REGISTER,
            json!({ "success": false, "message": "Token already registered" }),
        );

        init(
            &dispatcher,
            FAKE_TOKEN,
            InitOptions {
                disable_coin_check: true,
            },
        )
        .await
        .unwrap();
        assert!(dispatcher.session().is_initialized().await);
    }

    #[tokio::test]
    async fn test_concurrent_init_fetches_coins_once() {
        let (transport, dispatcher) = dispatcher();
        transport.set_response(endpoints::REGISTER, json!({ "success": true }));
        transport.set_response(
            endpoints::COINS_LIST,
            json!({ "coins": [{ "token": "BTC" }, { "token": "AEON" }] }),
        );

        let (first, second) = tokio::join!(
            init(&dispatcher, FAKE_TOKEN, InitOptions::default()),
            init(&dispatcher, FAKE_TOKEN, InitOptions::default()),
        );
        first.unwrap();
        second.unwrap();

        assert_eq!(transport.calls_to(endpoints::REGISTER), 2);
        assert_eq!(transport.calls_to(endpoints::COINS_LIST), 1);
        let session = dispatcher.session().snapshot().await;
        assert!(session.initialized);
        assert_eq!(session.coins_list.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_coins_list_is_not_refetched() {
        let (transport, dispatcher) = dispatcher();
        transport.set_response(endpoints::REGISTER, json!({ "success": false }));
        transport.set_response(endpoints::COINS_LIST, json!({ "coins": [{ "token": "BTC" }] }));

        init(&dispatcher, FAKE_TOKEN, InitOptions::default()).await.unwrap();
        init(&dispatcher, FAKE_TOKEN, InitOptions::default()).await.unwrap();

        assert_eq!(transport.calls_to(endpoints::COINS_LIST), 1);
    }

    #[tokio::test]
    async fn test_register_already_active_keeps_state() {
        let (transport, dispatcher) = dispatcher();
        transport.set_response(
            endpoints::REGISTER,
            json!({ "success": false, "message": "Token already registered" }),
        );

        let err = register(&dispatcher, FAKE_TOKEN).await.unwrap_err();
        assert_eq!(
            err,
            BlockfolioError::AlreadyRegistered("Token already registered".to_string())
        );
        assert!(dispatcher.session().snapshot().await.device_token.is_none());
    }

    #[tokio::test]
    async fn test_register_refusal_is_remote() {
        let (transport, dispatcher) = dispatcher();
        transport.set_response(
            endpoints::REGISTER,
            json!({ "success": false, "message": "Invalid DEVICE_TOKEN" }),
        );

        let err = register(&dispatcher, FAKE_TOKEN).await.unwrap_err();
        assert_eq!(err, BlockfolioError::remote("Invalid DEVICE_TOKEN"));
        assert!(dispatcher.session().snapshot().await.device_token.is_none());
    }

    #[tokio::test]
    async fn test_register_records_device_token() {
        let (transport, dispatcher) = dispatcher();
        transport.set_response(endpoints::REGISTER, json!({ "success": true }));

        assert_eq!(register(&dispatcher, FAKE_TOKEN).await.unwrap(), "success");
        assert_eq!(
            dispatcher.session().snapshot().await.device_token.as_deref(),
            Some(FAKE_TOKEN)
        );
    }

    #[tokio::test]
    async fn test_disposable_device_token_shape() {
        let (transport, dispatcher) = dispatcher();
        transport.set_response(endpoints::DISPOSABLE_TOKEN, json!({ "token": DISPOSABLE }));
        assert_eq!(disposable_device_token(&dispatcher).await.unwrap(), DISPOSABLE);

        transport.set_response(endpoints::DISPOSABLE_TOKEN, json!({ "token": "xyz" }));
        assert!(matches!(
            disposable_device_token(&dispatcher).await,
            Err(BlockfolioError::Remote(_))
        ));
    }
}
