//! Constants for the Blockfolio client
//!
//! Transport and token settings are compile-time constants. The only runtime
//! knob is the `BLOCKFOLIO_API_URL` environment variable, read by
//! [`BlockfolioClient::new`](crate::BlockfolioClient::new).

/// Blockfolio REST API base URL
pub const BLOCKFOLIO_API_URL: &str = "https://api-v0.blockfolio.com/rest/";

/// Environment variable overriding [`BLOCKFOLIO_API_URL`]
pub const API_URL_ENV: &str = "BLOCKFOLIO_API_URL";

/// HTTP request timeout (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 15;

/// User agent of the official Android application
pub const USER_AGENT: &str = "okhttp/3.6.0";

/// Static header the service expects on every request
pub const MAGIC_HEADER: (&str, &str) = ("magic", "edtopjhgn2345piuty89whqejfiobh89-2q453");

/// Platform reported when querying the system status
pub const STATUS_PLATFORM: &str = "android_rn";

/// Quote currency used when a bare symbol is given
pub const DEFAULT_BASE: &str = "BTC";

/// Length of a device token in normal use
pub const DEVICE_TOKEN_LEN: usize = 16;

/// Length of a disposable device token
pub const DISPOSABLE_TOKEN_LEN: usize = 96;

/// Shortest accepted client token
pub const MIN_CLIENT_TOKEN_LEN: usize = 16;

/// Longest accepted client token
pub const MAX_CLIENT_TOKEN_LEN: usize = 64;

/// Message returned by every portfolio-scoped call before `init()` succeeded
pub const UNINITIALIZED_MESSAGE: &str =
    "A valid CLIENT_TOKEN should be provided! (Have you called init()?)";

/// Message used when the service rejects a registration without saying why
pub const ALREADY_REGISTERED_MESSAGE: &str = "This DEVICE_TOKEN is already registered!";

/// Message returned when a strict pair check runs without a coin list
pub const COINS_LIST_MISSING_MESSAGE: &str =
    "coinsList uninitialized, could not validate token pairs!";

/// Remote endpoints
pub mod endpoints {
    pub const VERSION: &str = "version";
    pub const SYSTEM_STATUS: &str = "system_status";
    pub const REGISTER: &str = "register";
    pub const CURRENCIES: &str = "currency";
    pub const COINS_LIST: &str = "coinlist_v6";
    pub const DISPOSABLE_TOKEN: &str = "disposable_token";
    pub const ALL_POSITIONS: &str = "get_all_positions";
    pub const PAIR_POSITIONS: &str = "get_positions_v2";
    pub const ADD_POSITION: &str = "add_position_v2";
    pub const REMOVE_POSITION: &str = "remove_position";
    pub const REMOVE_COIN: &str = "remove_coin";
    pub const COIN_SUMMARY: &str = "get_coin_summary";
    pub const ALL_HOLDINGS: &str = "get_all_holdings";
    pub const PORTFOLIO_SUMMARY: &str = "get_portfolio_summary";
    pub const MARKET_DETAILS: &str = "marketdetails";
    pub const EXCHANGES: &str = "exchangelist_v2";
    pub const LAST_PRICE: &str = "lastprice";
    pub const ADD_ALERT: &str = "add_alert";
    pub const GET_ALERTS: &str = "get_alerts";
    pub const PAUSE_ALERT: &str = "pause_alert";
    pub const START_ALERT: &str = "start_alert";
    pub const PAUSE_ALL_ALERTS: &str = "pause_all_alerts";
    pub const START_ALL_ALERTS: &str = "start_all_alerts";
    pub const REMOVE_ALERT: &str = "remove_alert";
}
