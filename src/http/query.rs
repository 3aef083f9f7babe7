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

//! Request builders for Bitfinex v2 endpoints.
//!
//! Path template parameters are substituted here, at construction time, and
//! never reappear in the serialized body; the body holds only the remaining
//! payload, which is also exactly the string covered by the signature.

use serde_json::{Map, Number, Value};
use ustr::Ustr;

use crate::common::enums::{OrderSide, OrderType};

fn insert_i64(body: &mut Map<String, Value>, key: &str, value: Option<i64>) {
    if let Some(value) = value {
        body.insert(key.to_string(), Value::Number(Number::from(value)));
    }
}

fn insert_u32(body: &mut Map<String, Value>, key: &str, value: Option<u32>) {
    if let Some(value) = value {
        body.insert(key.to_string(), Value::Number(Number::from(value)));
    }
}

/// Query parameters for `trades/{symbol}/hist`.
///
/// When a start time is given the venue is asked for ascending order,
/// otherwise for the most recent trades first.
#[derive(Clone, Debug, Default)]
pub struct PublicTradesParams {
    /// Start time filter in milliseconds.
    pub start: Option<i64>,
    /// Maximum number of records (default 120, max 5000).
    pub limit: Option<u32>,
}

impl PublicTradesParams {
    /// Renders the URL query pairs.
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        let sort = if let Some(start) = self.start {
            query.push(("start".to_string(), start.to_string()));
            "1"
        } else {
            "-1"
        };
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        query.push(("sort".to_string(), sort.to_string()));
        query
    }
}

/// Query parameters for `candles/trade:{timeframe}:{symbol}/hist`.
#[derive(Clone, Debug, Default)]
pub struct CandlesParams {
    /// Start time filter in milliseconds.
    pub start: Option<i64>,
    /// Maximum number of records (default 100, max 5000).
    pub limit: Option<u32>,
}

impl CandlesParams {
    /// Renders the URL query pairs, ascending by time.
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = vec![("sort".to_string(), "1".to_string())];
        if let Some(start) = self.start {
            query.push(("start".to_string(), start.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        query
    }
}

/// Private trade-history request.
///
/// The venue exposes two endpoints for this query, one filtered by symbol
/// and one across all symbols; the variant picks the endpoint explicitly
/// rather than selecting a method name at runtime.
#[derive(Clone, Debug)]
pub enum TradesHistoryRequest {
    AllSymbols {
        start: Option<i64>,
        end: Option<i64>,
        limit: Option<u32>,
    },
    ForSymbol {
        market_id: Ustr,
        start: Option<i64>,
        end: Option<i64>,
        limit: Option<u32>,
    },
}

impl TradesHistoryRequest {
    /// Returns the endpoint path with the symbol substituted, when present.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::AllSymbols { .. } => "auth/r/trades/hist".to_string(),
            Self::ForSymbol { market_id, .. } => format!("auth/r/trades/{market_id}/hist"),
        }
    }

    /// Returns the request body, holding only the non-path payload.
    #[must_use]
    pub fn body(&self) -> Map<String, Value> {
        let (start, end, limit) = match self {
            Self::AllSymbols { start, end, limit }
            | Self::ForSymbol {
                start, end, limit, ..
            } => (*start, *end, *limit),
        };

        let mut body = Map::new();
        insert_i64(&mut body, "start", start);
        insert_i64(&mut body, "end", end);
        insert_u32(&mut body, "limit", limit);
        body
    }
}

/// Order submission request for `auth/w/order/submit`.
///
/// Amount and price are serialized as strings, with the side encoded as the
/// sign of the amount, as the venue requires.
#[derive(Clone, Debug)]
pub struct SubmitOrderRequest {
    pub market_id: Ustr,
    pub order_type: OrderType,
    pub side: OrderSide,
    pub amount: f64,
    pub price: Option<f64>,
}

impl SubmitOrderRequest {
    /// Returns the request body.
    #[must_use]
    pub fn body(&self) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert(
            "symbol".to_string(),
            Value::String(self.market_id.to_string()),
        );
        body.insert(
            "type".to_string(),
            Value::String(self.order_type.to_native().to_string()),
        );

        let mut amount = format!("{}", self.amount);
        if self.side == OrderSide::Sell {
            amount = format!("-{amount}");
        }
        body.insert("amount".to_string(), Value::String(amount));

        if self.order_type != OrderType::Market
            && let Some(price) = self.price
        {
            body.insert("price".to_string(), Value::String(format!("{price}")));
        }
        body
    }
}

/// Order-id filter body shared by the open- and closed-orders queries.
#[must_use]
pub fn order_id_filter(ids: &[i64]) -> Map<String, Value> {
    let mut body = Map::new();
    if !ids.is_empty() {
        body.insert(
            "id".to_string(),
            Value::Array(ids.iter().map(|id| Value::Number(Number::from(*id))).collect()),
        );
    }
    body
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
