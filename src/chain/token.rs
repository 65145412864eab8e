//! Token identifiers as supplied by callers.
//!
//! A token is either a configured symbol ("USDC") or a raw contract address.
//! Identifiers are resolved once at the entry boundary; only canonical
//! addresses reach the chain client.

use alloy::primitives::Address;
use std::collections::BTreeMap;

use crate::error::{BankError, BankResult};

/// Caller-facing token identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenRef {
    Symbolic(String),
    Address(Address),
}

impl TokenRef {
    /// Anything that parses as an address is an address; everything else is
    /// a symbol.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<Address>() {
            Ok(address) if raw.starts_with("0x") => TokenRef::Address(address),
            _ => TokenRef::Symbolic(raw.to_string()),
        }
    }

    /// Resolve to a contract address. Symbols match case-insensitively.
    pub fn resolve(&self, tokens: &BTreeMap<String, String>) -> BankResult<Address> {
        match self {
            TokenRef::Address(address) => Ok(*address),
            TokenRef::Symbolic(symbol) => tokens
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(symbol))
                .and_then(|(_, address)| address.parse().ok())
                .ok_or_else(|| BankError::UnknownToken(symbol.clone())),
        }
    }
}

impl std::fmt::Display for TokenRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenRef::Symbolic(symbol) => f.write_str(symbol),
            TokenRef::Address(address) => write!(f, "{}", address),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USDC: &str = "0x7a816c115b8aed1fee7029dd490613f20063b9c3";

    fn tokens() -> BTreeMap<String, String> {
        [("USDC".to_string(), USDC.to_string())].into_iter().collect()
    }

    #[test]
    fn test_parse_variants() {
        assert!(matches!(TokenRef::parse(USDC), TokenRef::Address(_)));
        assert_eq!(TokenRef::parse("USDC"), TokenRef::Symbolic("USDC".to_string()));
        // Not 40 hex chars: treated as a symbol and fails resolution later
        assert!(matches!(TokenRef::parse("0x1234"), TokenRef::Symbolic(_)));
    }

    #[test]
    fn test_resolve() {
        let expected: Address = USDC.parse().unwrap();
        assert_eq!(TokenRef::parse("usdc").resolve(&tokens()).unwrap(), expected);
        assert_eq!(TokenRef::parse(USDC).resolve(&BTreeMap::new()).unwrap(), expected);

        let err = TokenRef::parse("DAI").resolve(&tokens()).unwrap_err();
        assert!(matches!(err, BankError::UnknownToken(ref s) if s == "DAI"));
    }
}
