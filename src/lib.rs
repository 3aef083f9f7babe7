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

//! [Bitfinex](https://www.bitfinex.com) REST API v2 integration.
//!
//! This crate provides an HTTP client and data normalization layer for the
//! Bitfinex exchange, covering spot (exchange wallet) trading:
//!
//! - Market listing and per-market precision and limit metadata.
//! - Public market data: tickers, trades, order books, candles and the
//!   venue operational status.
//! - Private account data: wallet balances, order state, order history
//!   and trade history.
//! - Order management: submit, cancel, cancel-all and a single-order
//!   resolver emulating the endpoint the venue does not provide.
//!
//! The venue speaks positional JSON arrays rather than keyed objects, so
//! the [`common::parse`] module maps fixed indices (and for tickers,
//! offsets from the end of the record) into typed domain structs. Private
//! endpoints are signed per request with HMAC-SHA384 and a strictly
//! increasing nonce, handled by [`common::credential`].

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod common;
pub mod http;

pub use crate::{
    common::{
        credential::BitfinexCredential,
        enums::{
            BookPrecision, LiquiditySide, OrderSide, OrderStatus, OrderType, PlatformStatus,
            WalletType,
        },
        models::{
            BalanceAccount, BookLevel, Candle, Fee, Market, MarketCatalog, Order, OrderBook,
            Ticker, Trade,
        },
    },
    http::{
        client::{BitfinexHttpClient, BitfinexRawHttpClient},
        error::BitfinexHttpError,
    },
};
