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

//! Constants for the Bitfinex v2 REST API.

/// The venue identifier.
pub const BITFINEX_VENUE: &str = "BITFINEX";

/// Base URL for public (unauthenticated) v2 endpoints.
pub const BITFINEX_HTTP_PUBLIC_URL: &str = "https://api-pub.bitfinex.com";

/// Base URL for private (authenticated) v2 endpoints and the legacy v1 surface.
pub const BITFINEX_HTTP_PRIVATE_URL: &str = "https://api.bitfinex.com";

/// User agent sent with every request.
pub const BITFINEX_HTTP_USER_AGENT: &str =
    concat!("bitfinex-http/", env!("CARGO_PKG_VERSION"));

/// Marker prefixed to an uppercased pair to form a trading market id (`tBTCUSD`).
pub const TRADING_PAIR_PREFIX: char = 't';

/// Marker prefixed to a currency code to form a funding currency id (`fUSD`).
pub const FUNDING_CURRENCY_PREFIX: char = 'f';

/// Header carrying the strictly increasing request nonce.
pub const HEADER_NONCE: &str = "bfx-nonce";

/// Header carrying the API key.
pub const HEADER_API_KEY: &str = "bfx-apikey";

/// Header carrying the hex-encoded HMAC-SHA384 signature.
pub const HEADER_SIGNATURE: &str = "bfx-signature";

/// Path prefix included in the signing input ahead of the versioned path.
pub const SIGNING_PATH_PREFIX: &str = "/api/";
