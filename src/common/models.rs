// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2026 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Normalized domain model produced by the response parsers.
//!
//! Every entity here is constructed fresh per response; only [`Market`]
//! records persist between calls, held in a [`MarketCatalog`] that is
//! replaced wholesale on each catalog refresh.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use ustr::Ustr;

use crate::common::enums::{LiquiditySide, OrderSide, OrderStatus, OrderType};

/// A tradable market normalized from the venue's symbol listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Market {
    /// Exchange-native market id (`tBTCUSD`, `tDUSK:USD`).
    pub id: Ustr,
    /// Canonical `BASE/QUOTE` symbol.
    pub symbol: Ustr,
    /// Canonical base currency code.
    pub base: Ustr,
    /// Canonical quote currency code.
    pub quote: Ustr,
    /// Exchange-native base currency id (`fBTC`).
    pub base_id: Ustr,
    /// Exchange-native quote currency id (`fUSD`).
    pub quote_id: Ustr,
    /// Decimal digits of price precision.
    pub price_precision: u32,
    /// Decimal digits of amount precision (the venue publishes a single value).
    pub amount_precision: u32,
    /// Minimum order amount.
    pub min_amount: Option<f64>,
    /// Maximum order amount.
    pub max_amount: Option<f64>,
    /// Minimum price, `10^-price_precision`.
    pub min_price: f64,
    /// Maximum price, `10^price_precision`.
    pub max_price: f64,
    /// Minimum cost, min amount times min price.
    pub min_cost: Option<f64>,
}

/// A 24h ticker snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    /// Canonical symbol, when the market was resolved.
    pub symbol: Option<Ustr>,
    /// Snapshot timestamp in milliseconds (assigned locally; the wire record
    /// carries no timestamp).
    pub timestamp: i64,
    pub bid: f64,
    pub ask: f64,
    pub last: f64,
    pub high: f64,
    pub low: f64,
    /// Absolute 24h change.
    pub change: f64,
    /// Relative 24h change, rescaled to percent.
    pub percentage: f64,
    pub base_volume: f64,
}

/// A fee denominated in a single currency.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fee {
    pub currency: Ustr,
    pub cost: f64,
}

/// A public or private execution.
///
/// The order-linkage fields (`order_id`, `liquidity`, `fee`, `order_type`)
/// are present only for private executions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: i64,
    /// Execution timestamp in milliseconds.
    pub timestamp: i64,
    /// Canonical symbol, when resolvable; private records fall back to the
    /// raw market id when the catalog has no entry for it.
    pub symbol: Option<Ustr>,
    pub side: OrderSide,
    pub price: f64,
    /// Absolute executed amount.
    pub amount: f64,
    /// Price times amount.
    pub cost: f64,
    pub order_id: Option<i64>,
    pub liquidity: Option<LiquiditySide>,
    pub order_type: Option<OrderType>,
    pub fee: Option<Fee>,
}

/// A normalized order.
///
/// `fee` and `trades` stay empty until explicitly attached by the order
/// lifecycle resolver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    /// Canonical symbol, when the market id was resolvable.
    pub symbol: Option<Ustr>,
    /// Exchange-native market id as reported on the wire.
    pub market_id: Ustr,
    /// Last-update timestamp in milliseconds.
    pub timestamp: i64,
    pub order_type: Option<OrderType>,
    pub side: OrderSide,
    pub status: OrderStatus,
    /// Total absolute amount.
    pub amount: f64,
    /// Unfilled absolute amount.
    pub remaining: f64,
    /// Amount minus remaining.
    pub filled: f64,
    pub price: Option<f64>,
    pub average: Option<f64>,
    /// Price times filled.
    pub cost: Option<f64>,
    pub fee: Option<Fee>,
    pub trades: Option<Vec<Trade>>,
}

/// Per-currency balances within one wallet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BalanceAccount {
    pub currency: Ustr,
    pub total: f64,
    pub free: f64,
    pub used: f64,
}

/// One price level of an order book.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: f64,
    pub amount: f64,
}

/// An order book snapshot.
///
/// Invariant: `bids` are non-increasing and `asks` non-decreasing by price.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct OrderBook {
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
    /// Snapshot timestamp in milliseconds (assigned locally).
    pub timestamp: i64,
}

/// An OHLCV candle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Candle open timestamp in milliseconds.
    pub timestamp: i64,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
}

/// Read-only lookup table from exchange-native market id to [`Market`].
///
/// Owned by the catalog refresh collaborator and handed to parsers by
/// reference; parsers never mutate it.
#[derive(Debug, Default)]
pub struct MarketCatalog {
    by_id: DashMap<Ustr, Market>,
    id_by_symbol: DashMap<Ustr, Ustr>,
}

impl MarketCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a single market.
    pub fn insert(&self, market: Market) {
        self.id_by_symbol.insert(market.symbol, market.id);
        self.by_id.insert(market.id, market);
    }

    /// Replaces the entire catalog with a fresh listing.
    pub fn replace_all(&self, markets: Vec<Market>) {
        self.by_id.clear();
        self.id_by_symbol.clear();
        for market in markets {
            self.insert(market);
        }
    }

    /// Looks a market up by its exchange-native id.
    #[must_use]
    pub fn by_market_id(&self, market_id: &str) -> Option<Market> {
        self.by_id
            .get(&Ustr::from(market_id))
            .map(|entry| entry.value().clone())
    }

    /// Looks a market up by its canonical `BASE/QUOTE` symbol.
    #[must_use]
    pub fn by_symbol(&self, symbol: &str) -> Option<Market> {
        let id = self.id_by_symbol.get(&Ustr::from(symbol))?;
        self.by_market_id(id.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
