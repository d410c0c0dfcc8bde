//! # Blockfolio SDK
//!
//! Typed async client for the undocumented Blockfolio REST API: device
//! registration, portfolio positions, price alerts and market data.
//!
//! ## Usage
//!
//! Each [`BlockfolioClient`] owns its session. Call [`BlockfolioClient::init`]
//! once before any portfolio-scoped operation:
//!
//! ```no_run
//! use blockfolio_sdk::{AddPositionOptions, BlockfolioClient, InitOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = BlockfolioClient::new()?;
//! client.init("1915f3d2ef313e86", InitOptions::default()).await?;
//!
//! client
//!     .add_position(
//!         "AEON/BTC",
//!         AddPositionOptions {
//!             exchange: Some("bittrex".to_string()),
//!             price: Some(0.00018),
//!             amount: Some(200.0),
//!             ..Default::default()
//!         },
//!     )
//!     .await?;
//!
//! for position in client.get_positions(Some("AEON/BTC")).await? {
//!     println!("{} {} @ {}", position.position_id, position.amount, position.price);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Pair notation
//!
//! `TOKEN/BASE`, `BASE-TOKEN` (note the order) or a bare `TOKEN` quoted in
//! BTC. See [`parse_token`].
//!
//! ## Error Handling
//!
//! ```no_run
//! use blockfolio_sdk::{BlockfolioClient, BlockfolioError, MarketOptions};
//!
//! # async fn example(client: BlockfolioClient) {
//! match client.get_price("ZSKJD/BTC", MarketOptions::default()).await {
//!     Ok(price) => println!("{}", price),
//!     Err(BlockfolioError::UnknownToken { pair }) => println!("{} is not listed", pair),
//!     Err(e) => eprintln!("Error: {}", e.message()),
//! }
//! # }
//! ```
//!
//! Completion handlers are available through the [`Callback`] trait.

pub mod callback;
pub mod client;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod exchange;
pub mod metrics;
pub mod pair;
pub mod session;
pub mod transport;
pub mod transports;
pub mod types;

// Re-export commonly used types
pub use callback::Callback;
pub use client::BlockfolioClient;
pub use error::{BlockfolioError, TransportError};
pub use metrics::DispatchMetrics;
pub use pair::{parse_token, Pair};
pub use session::{generate_client_token, Session};
pub use transport::{Credentials, Request, Transport};
pub use types::{
    AddAlertOptions, AddPositionOptions, Alert, AlertDirection, Coin, Currency, Holdings,
    InitOptions, MarketDetails, MarketOptions, PortfolioSummary, Position, PositionMode,
};
