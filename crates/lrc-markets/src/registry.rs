use std::fmt;

use alloy::primitives::{address, Address};
use serde::{Deserialize, Serialize};

/// Canonical market symbols, i.e. the underlying asset of each lending market.
///
/// `NotApplicable` is the explicit "no such market" sentinel; it has no
/// address and callers skip it.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum MarketSymbol {
    #[serde(rename = "AVAX")]
    Avax,
    #[serde(rename = "BTCb")]
    BtcB,
    #[serde(rename = "BUSD")]
    Busd,
    #[serde(rename = "DAI.e")]
    DaiE,
    #[serde(rename = "LINK.e")]
    LinkE,
    #[serde(rename = "QI")]
    Qi,
    #[serde(rename = "USDC")]
    Usdc,
    #[serde(rename = "USDC.e")]
    UsdcE,
    #[serde(rename = "USDT")]
    Usdt,
    #[serde(rename = "USDT.e")]
    UsdtE,
    #[serde(rename = "WBTC.e")]
    WbtcE,
    #[serde(rename = "WETH.e")]
    WethE,
    #[serde(rename = "sAVAX")]
    SAvax,
    #[serde(rename = "n/a")]
    #[default]
    NotApplicable,
}

impl MarketSymbol {
    /// Every real market, in registry order. Excludes the sentinel.
    pub const ALL: [MarketSymbol; 13] = [
        MarketSymbol::Avax,
        MarketSymbol::BtcB,
        MarketSymbol::Busd,
        MarketSymbol::DaiE,
        MarketSymbol::LinkE,
        MarketSymbol::Qi,
        MarketSymbol::Usdc,
        MarketSymbol::UsdcE,
        MarketSymbol::Usdt,
        MarketSymbol::UsdtE,
        MarketSymbol::WbtcE,
        MarketSymbol::WethE,
        MarketSymbol::SAvax,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MarketSymbol::Avax => "AVAX",
            MarketSymbol::BtcB => "BTCb",
            MarketSymbol::Busd => "BUSD",
            MarketSymbol::DaiE => "DAI.e",
            MarketSymbol::LinkE => "LINK.e",
            MarketSymbol::Qi => "QI",
            MarketSymbol::Usdc => "USDC",
            MarketSymbol::UsdcE => "USDC.e",
            MarketSymbol::Usdt => "USDT",
            MarketSymbol::UsdtE => "USDT.e",
            MarketSymbol::WbtcE => "WBTC.e",
            MarketSymbol::WethE => "WETH.e",
            MarketSymbol::SAvax => "sAVAX",
            MarketSymbol::NotApplicable => "n/a",
        }
    }

    /// On-chain protocol-token ticker, e.g. `qiUSDC` for `USDC.e`.
    pub fn onchain_ticker(&self) -> Option<&'static str> {
        let t = match self {
            MarketSymbol::Avax => "qiAVAX",
            MarketSymbol::BtcB => "qiBTC.b",
            MarketSymbol::Busd => "qiBUSD",
            MarketSymbol::DaiE => "qiDAI",
            MarketSymbol::LinkE => "qiLINK",
            MarketSymbol::Qi => "qiQI",
            MarketSymbol::Usdc => "qiUSDCn",
            MarketSymbol::UsdcE => "qiUSDC",
            MarketSymbol::Usdt => "qiUSDTn",
            MarketSymbol::UsdtE => "qiUSDT",
            MarketSymbol::WbtcE => "qiBTC",
            MarketSymbol::WethE => "qiETH",
            MarketSymbol::SAvax => "qisAVAX",
            MarketSymbol::NotApplicable => return None,
        };
        Some(t)
    }

    pub fn address(&self) -> Option<Address> {
        let a = match self {
            MarketSymbol::Avax => address!("5c0401e81bc07ca70fad469b451682c0d747ef1c"),
            MarketSymbol::BtcB => address!("89a415b3d20098e6a6c8f7a59001c67bd3129821"),
            MarketSymbol::Busd => address!("872670ccae8c19557cc9443eff587d7086b8043a"),
            MarketSymbol::DaiE => address!("835866d37afb8cb8f8334dccdaf66cf01832ff5d"),
            MarketSymbol::LinkE => address!("4e9f683a27a6bdad3fc2764003759277e93696e6"),
            MarketSymbol::Qi => address!("35bd6aeda81a7e5fc7a7832490e71f757b0cd9ce"),
            MarketSymbol::Usdc => address!("b715808a78f6041e46d61cb123c9b4a27056ae9c"),
            MarketSymbol::UsdcE => address!("beb5d47a3f720ec0a390d04b4d41ed7d9688bc7f"),
            MarketSymbol::Usdt => address!("d8fcda6ec4bdc547c0827b8804e89acd817d56ef"),
            MarketSymbol::UsdtE => address!("c9e5999b8e75c3feb117f6f73e664b9f3c8ca65c"),
            MarketSymbol::WbtcE => address!("e194c4c5ac32a3c9ffdb358d9bfd523a0b6d1568"),
            MarketSymbol::WethE => address!("334ad834cd4481bb02d09615e7c11a00579a7909"),
            MarketSymbol::SAvax => address!("f362fea9659cf036792c9cb02f8ff8198e21b4cb"),
            MarketSymbol::NotApplicable => return None,
        };
        Some(a)
    }

    pub fn is_applicable(&self) -> bool {
        !matches!(self, MarketSymbol::NotApplicable)
    }
}

impl fmt::Display for MarketSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Total lookups
// ---------------------------------------------------------------------------

/// Map an on-chain protocol-token ticker (`qiUSDC`) to its market.
pub fn symbol_for_onchain_ticker(ticker: &str) -> MarketSymbol {
    MarketSymbol::ALL
        .into_iter()
        .find(|s| s.onchain_ticker() == Some(ticker))
        .unwrap_or(MarketSymbol::NotApplicable)
}

/// Map a canonical market name (`USDC.e`), as used by the partner API.
pub fn symbol_for_name(name: &str) -> MarketSymbol {
    MarketSymbol::ALL
        .into_iter()
        .find(|s| s.as_str() == name)
        .unwrap_or(MarketSymbol::NotApplicable)
}

/// `None` only for the sentinel.
pub fn address_for_symbol(symbol: MarketSymbol) -> Option<Address> {
    symbol.address()
}

pub fn symbol_for_address(address: &Address) -> MarketSymbol {
    MarketSymbol::ALL
        .into_iter()
        .find(|s| s.address().as_ref() == Some(address))
        .unwrap_or(MarketSymbol::NotApplicable)
}
