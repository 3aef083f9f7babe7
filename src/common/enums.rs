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

//! Enumerations mapping Bitfinex v2 concepts onto normalized variants.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use ustr::Ustr;

/// Side of an order or trade.
///
/// Bitfinex encodes side as the sign of the amount field rather than as a
/// separate value; use [`OrderSide::from_amount`] when parsing wire records.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Derives the side from a signed wire amount (negative means sell).
    #[must_use]
    pub fn from_amount(amount: f64) -> Self {
        if amount < 0.0 { Self::Sell } else { Self::Buy }
    }
}

/// Whether a fill added (maker) or removed (taker) resting liquidity.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LiquiditySide {
    Maker,
    Taker,
}

/// Normalized order type for the exchange (non-margin) wallet.
///
/// Margin-wallet natives (`MARKET`, `LIMIT`, `STOP`, ...) have no normalized
/// counterpart here and map to `None` when parsing.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum OrderType {
    Limit,
    Market,
    Stop,
    StopLimit,
    LimitFok,
    LimitIoc,
}

impl OrderType {
    /// Maps a venue-native order type string to its normalized variant.
    #[must_use]
    pub fn from_native(native: &str) -> Option<Self> {
        match native {
            "EXCHANGE LIMIT" => Some(Self::Limit),
            "EXCHANGE MARKET" => Some(Self::Market),
            "EXCHANGE STOP" => Some(Self::Stop),
            "EXCHANGE STOP LIMIT" => Some(Self::StopLimit),
            "EXCHANGE FOK" => Some(Self::LimitFok),
            "EXCHANGE IOC" => Some(Self::LimitIoc),
            _ => None,
        }
    }

    /// Returns the venue-native order type string for submission.
    #[must_use]
    pub fn to_native(self) -> &'static str {
        match self {
            Self::Limit => "EXCHANGE LIMIT",
            Self::Market => "EXCHANGE MARKET",
            Self::Stop => "EXCHANGE STOP",
            Self::StopLimit => "EXCHANGE STOP LIMIT",
            Self::LimitFok => "EXCHANGE FOK",
            Self::LimitIoc => "EXCHANGE IOC",
        }
    }
}

/// Normalized order status.
///
/// The venue reports status as free text (`"EXECUTED @ 107.6(-0.2)"`); the
/// classifier in [`crate::common::parse::parse_order_status`] matches known
/// prefixes and passes anything unknown through as [`OrderStatus::Other`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Open,
    Closed,
    Canceled,
    Rejected,
    /// Unrecognized native status, preserved verbatim.
    Other(Ustr),
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Canceled => write!(f, "canceled"),
            Self::Rejected => write!(f, "rejected"),
            Self::Other(native) => write!(f, "{native}"),
        }
    }
}

/// Order book aggregation level.
///
/// `R0` is the raw book (no aggregation); `P0` through `P3` bucket prices
/// with increasing width. The level determines which index of a book record
/// carries the price.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
pub enum BookPrecision {
    R0,
    P0,
    P1,
    P2,
    P3,
}

impl BookPrecision {
    /// Returns true for the raw (unaggregated) book.
    #[must_use]
    pub fn is_raw(self) -> bool {
        matches!(self, Self::R0)
    }
}

/// Wallet (account) type carried in the first field of a balance record.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WalletType {
    Exchange,
    Margin,
    Funding,
}

/// Venue operational status reported by the platform-status endpoint.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlatformStatus {
    Operative,
    Maintenance,
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
