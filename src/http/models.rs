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

//! Data models for Bitfinex HTTP API responses.
//!
//! Most v2 responses are positional JSON arrays rather than objects, so the
//! raw layer deserializes them as [`RawRecord`] rows and leaves field
//! extraction to [`crate::common::parse`]. The legacy v1 symbol listing is
//! the one object-shaped response and gets a typed model.

use serde::{Deserialize, Serialize};

/// One positional-array record as returned by the v2 API.
pub type RawRecord = Vec<serde_json::Value>;

/// A v1 `symbols_details` record describing one tradable pair.
///
/// Numeric limits arrive as decimal strings on this legacy surface.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SymbolDetail {
    /// Lowercase pair identifier (`btcusd`, `dusk:usd`).
    pub pair: String,
    /// Decimal digits of significance for prices on this pair.
    pub price_precision: u32,
    pub minimum_order_size: Option<String>,
    pub maximum_order_size: Option<String>,
    #[serde(default)]
    pub initial_margin: Option<String>,
    #[serde(default)]
    pub minimum_margin: Option<String>,
    #[serde(default)]
    pub expiration: Option<String>,
    #[serde(default)]
    pub margin: Option<bool>,
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
