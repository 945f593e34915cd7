//! Chain identifier resolution.

use std::fmt;

/// Networks the catalog links to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chain {
    Ethereum,
    Solana,
    Bsc,
    Arbitrum,
    Polygon,
    Base,
}

impl Chain {
    /// Canonical network name as used in chart links.
    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Ethereum => "ethereum",
            Chain::Solana => "solana",
            Chain::Bsc => "bsc",
            Chain::Arbitrum => "arbitrum",
            Chain::Polygon => "polygon",
            Chain::Base => "base",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map an upstream chain identifier to its network, or `None` if unknown.
pub fn resolve_chain(chain_id: &str) -> Option<Chain> {
    match chain_id {
        "0x1" => Some(Chain::Ethereum),
        "solana" => Some(Chain::Solana),
        "0x38" => Some(Chain::Bsc),
        "0xa4b1" => Some(Chain::Arbitrum),
        "0x89" => Some(Chain::Polygon),
        "0x2105" => Some(Chain::Base),
        _ => None,
    }
}
