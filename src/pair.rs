//! Token pair notation

use crate::constants::DEFAULT_BASE;
use serde::Serialize;
use std::fmt;

/// A token traded against a base currency, both uppercase
///
/// Obtained from [`parse_token`]; fields cannot be set directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Pair {
    base: String,
    token: String,
}

impl Pair {
    pub(crate) fn from_parts(token: &str, base: &str) -> Self {
        Self {
            token: token.trim().to_uppercase(),
            base: base.trim().to_uppercase(),
        }
    }

    /// Traded token symbol
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Quote currency symbol
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Service market notation, `BASE-TOKEN`
    pub fn market(&self) -> String {
        format!("{}-{}", self.base, self.token)
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.token, self.base)
    }
}

/// Parses pair notation into a [`Pair`]
///
/// - `TOKEN/BASE` splits at the first `/`
/// - `BASE-TOKEN` splits at the first `-`, operands in the opposite order
/// - a bare symbol is quoted in BTC
///
/// ```
/// let pair = blockfolio_sdk::parse_token("btc-ltc");
/// assert_eq!(pair.token(), "LTC");
/// assert_eq!(pair.base(), "BTC");
/// ```
pub fn parse_token(input: &str) -> Pair {
    if let Some((token, base)) = input.split_once('/') {
        Pair::from_parts(token, base)
    } else if let Some((base, token)) = input.split_once('-') {
        Pair::from_parts(token, base)
    } else {
        Pair::from_parts(input, DEFAULT_BASE)
    }
}
