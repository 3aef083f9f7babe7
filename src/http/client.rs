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

//! HTTP client for the Bitfinex REST API v2.
//!
//! Two complementary clients following the two-layer adapter pattern:
//!
//! - [`BitfinexRawHttpClient`]: low-level methods matching v2 endpoints,
//!   returning positional wire records.
//! - [`BitfinexHttpClient`]: high-level methods returning the normalized
//!   domain model, with a market catalog for symbol resolution.
//!
//! The raw client handles request signing and boundary error
//! classification. It performs no retries and no rate limiting; both are
//! the caller's concern, as is refreshing the market catalog.

use std::{
    fmt::{Debug, Formatter},
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use reqwest::{Method, header::CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};

use super::{
    error::{BitfinexHttpError, classify_error_response, classify_success_body},
    models::{RawRecord, SymbolDetail},
    query::{
        CandlesParams, PublicTradesParams, SubmitOrderRequest, TradesHistoryRequest,
        order_id_filter,
    },
};
use crate::common::{
    consts::{
        BITFINEX_HTTP_PRIVATE_URL, BITFINEX_HTTP_PUBLIC_URL, BITFINEX_HTTP_USER_AGENT,
        HEADER_API_KEY, HEADER_NONCE, HEADER_SIGNATURE,
    },
    credential::BitfinexCredential,
    enums::{BookPrecision, OrderSide, OrderType, PlatformStatus, WalletType},
    models::{
        BalanceAccount, Candle, Fee, Market, MarketCatalog, Order, OrderBook, Ticker, Trade,
    },
    parse::{
        parse_balances, parse_candle, parse_market, parse_order, parse_order_book,
        parse_platform_status, parse_ticker, parse_trade, round_to_precision,
    },
};

/// Index of the embedded order payload in write-endpoint acknowledgments.
const ACK_PAYLOAD_INDEX: usize = 4;

fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as i64
}

/// Provides a raw HTTP client for the [Bitfinex](https://www.bitfinex.com) v2 REST API.
///
/// Public endpoints are served from the dedicated public host; private
/// endpoints and the legacy v1 symbol listing share the authenticated host.
pub struct BitfinexRawHttpClient {
    public_base_url: String,
    private_base_url: String,
    client: reqwest::Client,
    credential: Option<BitfinexCredential>,
}

impl Default for BitfinexRawHttpClient {
    fn default() -> Self {
        Self::new(None, None, Some(60)).expect("Failed to create default BitfinexRawHttpClient")
    }
}

impl Debug for BitfinexRawHttpClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitfinexRawHttpClient")
            .field("public_base_url", &self.public_base_url)
            .field("private_base_url", &self.private_base_url)
            .field("has_credentials", &self.credential.is_some())
            .finish()
    }
}

impl BitfinexRawHttpClient {
    /// Creates a new unauthenticated client.
    pub fn new(
        public_base_url: Option<String>,
        private_base_url: Option<String>,
        timeout_secs: Option<u64>,
    ) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(BITFINEX_HTTP_USER_AGENT);
        if let Some(timeout_secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout_secs));
        }

        Ok(Self {
            public_base_url: public_base_url
                .unwrap_or_else(|| BITFINEX_HTTP_PUBLIC_URL.to_string()),
            private_base_url: private_base_url
                .unwrap_or_else(|| BITFINEX_HTTP_PRIVATE_URL.to_string()),
            client: builder
                .build()
                .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {e}"))?,
            credential: None,
        })
    }

    /// Creates a new client able to call private endpoints.
    pub fn with_credentials(
        api_key: String,
        api_secret: String,
        public_base_url: Option<String>,
        private_base_url: Option<String>,
        timeout_secs: Option<u64>,
    ) -> anyhow::Result<Self> {
        let mut client = Self::new(public_base_url, private_base_url, timeout_secs)?;
        client.credential = Some(BitfinexCredential::new(api_key, api_secret));
        Ok(client)
    }

    /// Returns true when credentials are configured.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        self.credential.is_some()
    }

    async fn consume_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BitfinexHttpError> {
        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| BitfinexHttpError::NetworkError(e.to_string()))?;

        if bytes.is_empty() {
            return Err(BitfinexHttpError::ExchangeError {
                code: None,
                message: "Returned empty response".to_string(),
            });
        }

        let value: Value = serde_json::from_slice(&bytes).map_err(|e| {
            BitfinexHttpError::ParseError(format!("Failed to deserialize response: {e}"))
        })?;

        if !(200..300).contains(&status) {
            return Err(classify_error_response(status, &value).unwrap_or_else(|| {
                BitfinexHttpError::NetworkError(format!("HTTP error {status}: {value}"))
            }));
        }

        if let Some(error) = classify_success_body(&value) {
            return Err(error);
        }

        serde_json::from_value(value).map_err(|e| {
            BitfinexHttpError::ParseError(format!("Unexpected response shape: {e}"))
        })
    }

    /// Sends an unauthenticated GET with query parameters appended to the URL.
    async fn get_public<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, BitfinexHttpError> {
        let url = format!("{}/v2/{path}", self.public_base_url);
        tracing::debug!(%url, "Sending public request");

        let mut request = self.client.request(Method::GET, &url);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BitfinexHttpError::NetworkError(e.to_string()))?;
        Self::consume_response(response).await
    }

    /// Sends an unauthenticated GET against the legacy v1 surface.
    async fn get_v1<T: DeserializeOwned>(&self, path: &str) -> Result<T, BitfinexHttpError> {
        let url = format!("{}/v1/{path}", self.private_base_url);
        tracing::debug!(%url, "Sending v1 request");

        let response = self
            .client
            .request(Method::GET, &url)
            .send()
            .await
            .map_err(|e| BitfinexHttpError::NetworkError(e.to_string()))?;
        Self::consume_response(response).await
    }

    /// Sends a signed POST to a private v2 endpoint.
    ///
    /// The body map is serialized once; that exact string is both signed
    /// and sent. Fails locally with [`BitfinexHttpError::MissingCredentials`]
    /// before any network I/O when no credential is configured.
    async fn post_private<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &Map<String, Value>,
    ) -> Result<T, BitfinexHttpError> {
        let credential = self
            .credential
            .as_ref()
            .ok_or(BitfinexHttpError::MissingCredentials)?;

        let versioned_path = format!("v2/{path}");
        let body_string = serde_json::to_string(body).map_err(|e| {
            BitfinexHttpError::ParseError(format!("Failed to serialize request body: {e}"))
        })?;

        let nonce = credential.next_nonce();
        let signature = credential.sign_request(&versioned_path, nonce, &body_string);

        let url = format!("{}/{versioned_path}", self.private_base_url);
        tracing::debug!(%url, nonce, "Sending private request");

        let response = self
            .client
            .request(Method::POST, &url)
            .header(HEADER_NONCE, nonce.to_string())
            .header(HEADER_API_KEY, credential.api_key())
            .header(HEADER_SIGNATURE, signature)
            .header(CONTENT_TYPE, "application/json")
            .body(body_string)
            .send()
            .await
            .map_err(|e| BitfinexHttpError::NetworkError(e.to_string()))?;
        Self::consume_response(response).await
    }

    /// Requests `platform/status`.
    pub async fn platform_status(&self) -> Result<RawRecord, BitfinexHttpError> {
        self.get_public("platform/status", &[]).await
    }

    /// Requests the v1 `symbols_details` listing.
    pub async fn symbols_details(&self) -> Result<Vec<SymbolDetail>, BitfinexHttpError> {
        self.get_v1("symbols_details").await
    }

    /// Requests `tickers` for a comma-separated market id list or `ALL`.
    pub async fn tickers(&self, symbols: &str) -> Result<Vec<RawRecord>, BitfinexHttpError> {
        let query = vec![("symbols".to_string(), symbols.to_string())];
        self.get_public("tickers", &query).await
    }

    /// Requests `ticker/{symbol}`.
    pub async fn ticker(&self, market_id: &str) -> Result<RawRecord, BitfinexHttpError> {
        self.get_public(&format!("ticker/{market_id}"), &[]).await
    }

    /// Requests `trades/{symbol}/hist`.
    pub async fn public_trades(
        &self,
        market_id: &str,
        params: &PublicTradesParams,
    ) -> Result<Vec<RawRecord>, BitfinexHttpError> {
        self.get_public(&format!("trades/{market_id}/hist"), &params.to_query())
            .await
    }

    /// Requests `book/{symbol}/{precision}`.
    pub async fn book(
        &self,
        market_id: &str,
        precision: BookPrecision,
        len: Option<u32>,
    ) -> Result<Vec<RawRecord>, BitfinexHttpError> {
        let mut query = Vec::new();
        if let Some(len) = len {
            // Levels per side; the venue accepts 25 or 100
            query.push(("len".to_string(), len.to_string()));
        }
        self.get_public(&format!("book/{market_id}/{precision}"), &query)
            .await
    }

    /// Requests `candles/trade:{timeframe}:{symbol}/hist`.
    pub async fn candles(
        &self,
        timeframe: &str,
        market_id: &str,
        params: &CandlesParams,
    ) -> Result<Vec<RawRecord>, BitfinexHttpError> {
        self.get_public(
            &format!("candles/trade:{timeframe}:{market_id}/hist"),
            &params.to_query(),
        )
        .await
    }

    /// Requests `auth/r/wallets`.
    pub async fn wallets(&self) -> Result<Vec<RawRecord>, BitfinexHttpError> {
        self.post_private("auth/r/wallets", &Map::new()).await
    }

    /// Requests `auth/r/orders/{symbol}`, optionally filtered by order ids.
    pub async fn open_orders(
        &self,
        market_id: &str,
        ids: &[i64],
    ) -> Result<Vec<RawRecord>, BitfinexHttpError> {
        self.post_private(&format!("auth/r/orders/{market_id}"), &order_id_filter(ids))
            .await
    }

    /// Requests `auth/r/orders/{symbol}/hist`, optionally filtered by order ids.
    ///
    /// The venue returns closed or canceled orders up to roughly two weeks
    /// back; older orders are not reachable through this surface.
    pub async fn orders_history(
        &self,
        market_id: &str,
        ids: &[i64],
    ) -> Result<Vec<RawRecord>, BitfinexHttpError> {
        self.post_private(
            &format!("auth/r/orders/{market_id}/hist"),
            &order_id_filter(ids),
        )
        .await
    }

    /// Requests `auth/r/order/{symbol}:{id}/trades`.
    pub async fn order_trades(
        &self,
        market_id: &str,
        order_id: i64,
    ) -> Result<Vec<RawRecord>, BitfinexHttpError> {
        self.post_private(
            &format!("auth/r/order/{market_id}:{order_id}/trades"),
            &Map::new(),
        )
        .await
    }

    /// Requests the private trade history, with or without a symbol filter.
    pub async fn trades_history(
        &self,
        request: &TradesHistoryRequest,
    ) -> Result<Vec<RawRecord>, BitfinexHttpError> {
        self.post_private(&request.path(), &request.body()).await
    }

    /// Requests `auth/w/order/submit` and returns the full acknowledgment.
    pub async fn submit_order(
        &self,
        request: &SubmitOrderRequest,
    ) -> Result<RawRecord, BitfinexHttpError> {
        self.post_private("auth/w/order/submit", &request.body())
            .await
    }

    /// Requests `auth/w/order/cancel` and returns the full acknowledgment.
    pub async fn cancel_order(&self, order_id: i64) -> Result<RawRecord, BitfinexHttpError> {
        let mut body = Map::new();
        body.insert("id".to_string(), Value::Number(Number::from(order_id)));
        self.post_private("auth/w/order/cancel", &body).await
    }

    /// Requests `auth/w/order/cancel/multi` for all open orders.
    pub async fn cancel_all_orders(&self) -> Result<RawRecord, BitfinexHttpError> {
        let mut body = Map::new();
        body.insert("all".to_string(), Value::Number(Number::from(1)));
        self.post_private("auth/w/order/cancel/multi", &body).await
    }
}

/// Provides a domain-level HTTP client for the Bitfinex v2 REST API.
///
/// Wraps the raw client in an `Arc` and resolves canonical symbols through
/// a [`MarketCatalog`]. The catalog starts empty; populate it with
/// [`BitfinexHttpClient::refresh_market_catalog`] or
/// [`BitfinexHttpClient::cache_markets`] before calling symbol-based
/// operations.
pub struct BitfinexHttpClient {
    inner: Arc<BitfinexRawHttpClient>,
    markets: Arc<MarketCatalog>,
    fetch_order_on_create: bool,
}

impl Clone for BitfinexHttpClient {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            markets: self.markets.clone(),
            fetch_order_on_create: self.fetch_order_on_create,
        }
    }
}

impl Default for BitfinexHttpClient {
    fn default() -> Self {
        Self::new(None, None, Some(60)).expect("Failed to create default BitfinexHttpClient")
    }
}

impl Debug for BitfinexHttpClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitfinexHttpClient")
            .field("inner", &self.inner)
            .field("markets", &self.markets.len())
            .finish()
    }
}

impl BitfinexHttpClient {
    /// Creates a new unauthenticated client.
    pub fn new(
        public_base_url: Option<String>,
        private_base_url: Option<String>,
        timeout_secs: Option<u64>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            inner: Arc::new(BitfinexRawHttpClient::new(
                public_base_url,
                private_base_url,
                timeout_secs,
            )?),
            markets: Arc::new(MarketCatalog::new()),
            fetch_order_on_create: false,
        })
    }

    /// Creates a new client able to call private endpoints.
    pub fn with_credentials(
        api_key: String,
        api_secret: String,
        public_base_url: Option<String>,
        private_base_url: Option<String>,
        timeout_secs: Option<u64>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            inner: Arc::new(BitfinexRawHttpClient::with_credentials(
                api_key,
                api_secret,
                public_base_url,
                private_base_url,
                timeout_secs,
            )?),
            markets: Arc::new(MarketCatalog::new()),
            fetch_order_on_create: false,
        })
    }

    /// When enabled, [`Self::submit_order`] re-resolves the created order to
    /// pick up fills, fees and status changes that raced the acknowledgment.
    #[must_use]
    pub fn with_fetch_order_on_create(mut self, enabled: bool) -> Self {
        self.fetch_order_on_create = enabled;
        self
    }

    /// Returns the underlying raw client.
    #[must_use]
    pub fn raw(&self) -> &BitfinexRawHttpClient {
        &self.inner
    }

    /// Returns the market catalog.
    #[must_use]
    pub fn market_catalog(&self) -> &MarketCatalog {
        &self.markets
    }

    /// Caches a single market.
    pub fn cache_market(&self, market: Market) {
        self.markets.insert(market);
    }

    /// Caches a market listing, replacing the current catalog.
    pub fn cache_markets(&self, markets: Vec<Market>) {
        self.markets.replace_all(markets);
    }

    /// Resolves a canonical symbol to its market, failing with
    /// [`BitfinexHttpError::BadSymbol`] when the catalog has no entry.
    fn market(&self, symbol: &str) -> Result<Market, BitfinexHttpError> {
        self.markets
            .by_symbol(symbol)
            .ok_or_else(|| BitfinexHttpError::BadSymbol(symbol.to_string()))
    }

    /// Fetches the venue operational status.
    pub async fn fetch_platform_status(&self) -> Result<PlatformStatus, BitfinexHttpError> {
        let record = self.inner.platform_status().await?;
        Ok(parse_platform_status(&record)?)
    }

    /// Fetches and normalizes the market listing.
    ///
    /// Does not touch the catalog; pair with [`Self::cache_markets`] or use
    /// [`Self::refresh_market_catalog`].
    pub async fn fetch_markets(&self) -> Result<Vec<Market>, BitfinexHttpError> {
        let details = self.inner.symbols_details().await?;
        let mut markets = Vec::with_capacity(details.len());
        for detail in &details {
            markets.push(parse_market(detail)?);
        }
        Ok(markets)
    }

    /// Fetches the market listing and replaces the catalog with it.
    pub async fn refresh_market_catalog(&self) -> Result<usize, BitfinexHttpError> {
        let markets = self.fetch_markets().await?;
        let count = markets.len();
        self.markets.replace_all(markets);
        tracing::debug!(count, "Refreshed market catalog");
        Ok(count)
    }

    /// Fetches the ticker for one symbol.
    pub async fn fetch_ticker(&self, symbol: &str) -> Result<Ticker, BitfinexHttpError> {
        let market = self.market(symbol)?;
        let record = self.inner.ticker(market.id.as_str()).await?;
        Ok(parse_ticker(&record, Some(&market), unix_millis())?)
    }

    /// Fetches tickers for the given symbols, or for all known markets.
    ///
    /// Records whose market id is absent from the catalog are skipped, as
    /// they cannot be attached to a canonical symbol.
    pub async fn fetch_tickers(
        &self,
        symbols: Option<&[&str]>,
    ) -> Result<Vec<Ticker>, BitfinexHttpError> {
        let request = match symbols {
            Some(symbols) => {
                let mut ids = Vec::with_capacity(symbols.len());
                for symbol in symbols {
                    ids.push(self.market(symbol)?.id.to_string());
                }
                ids.join(",")
            }
            None => "ALL".to_string(),
        };

        let records = self.inner.tickers(&request).await?;
        let timestamp = unix_millis();
        let mut tickers = Vec::new();
        for record in &records {
            let Some(market_id) = record.first().and_then(Value::as_str) else {
                continue;
            };
            let Some(market) = self.markets.by_market_id(market_id) else {
                continue;
            };
            tickers.push(parse_ticker(record, Some(&market), timestamp)?);
        }
        Ok(tickers)
    }

    /// Fetches public trades for a symbol, ascending by timestamp.
    pub async fn fetch_trades(
        &self,
        symbol: &str,
        since: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<Trade>, BitfinexHttpError> {
        let market = self.market(symbol)?;
        let params = PublicTradesParams {
            start: since,
            limit,
        };
        let records = self.inner.public_trades(market.id.as_str(), &params).await?;

        let mut trades = Vec::with_capacity(records.len());
        for record in &records {
            trades.push(parse_trade(record, &self.markets, Some(&market))?);
        }
        trades.sort_by_key(|trade| trade.timestamp);
        Ok(trades)
    }

    /// Fetches an order-book snapshot at the given aggregation level.
    pub async fn fetch_order_book(
        &self,
        symbol: &str,
        precision: BookPrecision,
        limit: Option<u32>,
    ) -> Result<OrderBook, BitfinexHttpError> {
        let market = self.market(symbol)?;
        let records = self.inner.book(market.id.as_str(), precision, limit).await?;
        Ok(parse_order_book(&records, precision, unix_millis())?)
    }

    /// Fetches candles for a symbol and venue timeframe (`1m`, `1h`, `1D`, ...).
    pub async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: &str,
        since: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<Candle>, BitfinexHttpError> {
        let market = self.market(symbol)?;
        let params = CandlesParams {
            start: since,
            limit,
        };
        let records = self
            .inner
            .candles(timeframe, market.id.as_str(), &params)
            .await?;

        let mut candles = Vec::with_capacity(records.len());
        for record in &records {
            candles.push(parse_candle(record)?);
        }
        Ok(candles)
    }

    /// Fetches per-currency balances for one wallet type.
    pub async fn fetch_balances(
        &self,
        wallet: WalletType,
    ) -> Result<Vec<BalanceAccount>, BitfinexHttpError> {
        let records = self.inner.wallets().await?;
        Ok(parse_balances(&records, wallet)?)
    }

    /// Fetches open orders for a symbol.
    pub async fn fetch_open_orders(&self, symbol: &str) -> Result<Vec<Order>, BitfinexHttpError> {
        let market = self.market(symbol)?;
        let records = self.inner.open_orders(market.id.as_str(), &[]).await?;
        self.parse_orders(&records)
    }

    /// Fetches closed or canceled orders for a symbol (up to roughly two
    /// weeks back).
    pub async fn fetch_closed_orders(
        &self,
        symbol: &str,
    ) -> Result<Vec<Order>, BitfinexHttpError> {
        let market = self.market(symbol)?;
        let records = self.inner.orders_history(market.id.as_str(), &[]).await?;
        self.parse_orders(&records)
    }

    /// Fetches the executions belonging to one order.
    pub async fn fetch_order_trades(
        &self,
        order_id: i64,
        symbol: &str,
    ) -> Result<Vec<Trade>, BitfinexHttpError> {
        let market = self.market(symbol)?;
        let records = self.inner.order_trades(market.id.as_str(), order_id).await?;

        let mut trades = Vec::with_capacity(records.len());
        for record in &records {
            trades.push(parse_trade(record, &self.markets, Some(&market))?);
        }
        Ok(trades)
    }

    /// Fetches the private trade history, across all symbols or for one.
    pub async fn fetch_my_trades(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<Trade>, BitfinexHttpError> {
        let end = Some(unix_millis());
        let request = match symbol {
            Some(symbol) => TradesHistoryRequest::ForSymbol {
                market_id: self.market(symbol)?.id,
                start: since,
                end,
                limit,
            },
            None => TradesHistoryRequest::AllSymbols {
                start: since,
                end,
                limit,
            },
        };

        let records = self.inner.trades_history(&request).await?;
        let mut trades = Vec::with_capacity(records.len());
        for record in &records {
            trades.push(parse_trade(record, &self.markets, None)?);
        }
        Ok(trades)
    }

    /// Submits an order and returns the normalized order from the
    /// acknowledgment.
    ///
    /// With `fetch_order_on_create` enabled the freshly created order is
    /// re-resolved through [`Self::fetch_order`] to pick up immediate fills.
    pub async fn submit_order(
        &self,
        symbol: &str,
        order_type: OrderType,
        side: OrderSide,
        amount: f64,
        price: Option<f64>,
    ) -> Result<Order, BitfinexHttpError> {
        if order_type != OrderType::Market && price.is_none() {
            return Err(BitfinexHttpError::ArgumentsRequired(
                "price is required for non-market orders".to_string(),
            ));
        }

        let market = self.market(symbol)?;
        let request = SubmitOrderRequest {
            market_id: market.id,
            order_type,
            side,
            amount,
            price,
        };

        let ack = self.inner.submit_order(&request).await?;
        let order = Self::order_from_ack(&ack, &self.markets)?;
        tracing::debug!(order_id = order.id, %market.id, "Order submitted");

        if self.fetch_order_on_create {
            return self.fetch_order(order.id, Some(symbol)).await;
        }
        Ok(order)
    }

    /// Cancels one order by id.
    pub async fn cancel_order(&self, order_id: i64) -> Result<Order, BitfinexHttpError> {
        let ack = self.inner.cancel_order(order_id).await?;
        let record = Self::ack_payload(&ack)?;
        Ok(parse_order(record, &self.markets)?)
    }

    /// Cancels all open orders, returning the affected orders.
    pub async fn cancel_all_orders(&self) -> Result<Vec<Order>, BitfinexHttpError> {
        let ack = self.inner.cancel_all_orders().await?;
        let payload = Self::ack_payload(&ack)?;

        let mut orders = Vec::with_capacity(payload.len());
        for record in payload {
            let record = record.as_array().ok_or_else(|| {
                BitfinexHttpError::ParseError("Expected order array in acknowledgment".to_string())
            })?;
            orders.push(parse_order(record, &self.markets)?);
        }
        Ok(orders)
    }

    /// Resolves a single order by id, emulating the missing single-order
    /// endpoint.
    ///
    /// Scans open orders first and the closed-orders history only on a
    /// miss, since each step is a network round trip. A hit gets its trade
    /// history attached and the per-trade fees aggregated into one
    /// order-level fee. A miss on both surfaces is
    /// [`BitfinexHttpError::OrderNotFound`].
    pub async fn fetch_order(
        &self,
        order_id: i64,
        symbol: Option<&str>,
    ) -> Result<Order, BitfinexHttpError> {
        let Some(symbol) = symbol else {
            return Err(BitfinexHttpError::ArgumentsRequired(
                "fetch_order requires a symbol argument".to_string(),
            ));
        };
        let market = self.market(symbol)?;
        let filter = [order_id];

        let open = self.inner.open_orders(market.id.as_str(), &filter).await?;
        if let Some(record) = open.first() {
            return self.attach_order_trades(record, &market, order_id).await;
        }

        let closed = self
            .inner
            .orders_history(market.id.as_str(), &filter)
            .await?;
        if let Some(record) = closed.first() {
            return self.attach_order_trades(record, &market, order_id).await;
        }

        Err(BitfinexHttpError::OrderNotFound(format!(
            "Order {order_id} not found"
        )))
    }

    /// Deposit-address lookup is not exposed by the v2 surface.
    pub async fn fetch_deposit_address(
        &self,
        _code: &str,
    ) -> Result<String, BitfinexHttpError> {
        Err(BitfinexHttpError::NotSupported(
            "fetch_deposit_address is not implemented for this venue".to_string(),
        ))
    }

    /// Withdrawal is not exposed by the v2 surface.
    pub async fn withdraw(
        &self,
        _code: &str,
        _amount: f64,
        _address: &str,
    ) -> Result<(), BitfinexHttpError> {
        Err(BitfinexHttpError::NotSupported(
            "withdraw is not implemented for this venue".to_string(),
        ))
    }

    fn parse_orders(&self, records: &[RawRecord]) -> Result<Vec<Order>, BitfinexHttpError> {
        let mut orders = Vec::with_capacity(records.len());
        for record in records {
            orders.push(parse_order(record, &self.markets)?);
        }
        Ok(orders)
    }

    async fn attach_order_trades(
        &self,
        record: &RawRecord,
        market: &Market,
        order_id: i64,
    ) -> Result<Order, BitfinexHttpError> {
        let mut order = parse_order(record, &self.markets)?;
        let trades = self.fetch_order_trades(order_id, market.symbol.as_str()).await?;
        order.fee = Self::aggregate_order_fee(&trades, market.price_precision);
        order.trades = Some(trades);
        Ok(order)
    }

    /// Aggregates per-trade fees into a single order-level fee.
    ///
    /// The fee currency is taken from the first trade carrying one; costs
    /// are summed and rounded to the market's precision.
    fn aggregate_order_fee(trades: &[Trade], precision: u32) -> Option<Fee> {
        let currency = trades.iter().find_map(|t| t.fee.as_ref()).map(|f| f.currency)?;
        let total: f64 = trades
            .iter()
            .filter_map(|t| t.fee.as_ref())
            .map(|f| f.cost)
            .sum();

        Some(Fee {
            currency,
            cost: round_to_precision(total, precision),
        })
    }

    /// Extracts and validates the order payload of a write acknowledgment.
    ///
    /// The acknowledgment is `[mts, purpose, _, _, payload, code, status,
    /// text]`; anything but a `"SUCCESS"` status is a submission failure
    /// carrying the venue code and text.
    fn order_from_ack(
        ack: &RawRecord,
        catalog: &MarketCatalog,
    ) -> Result<Order, BitfinexHttpError> {
        let payload = Self::ack_payload(ack)?;
        let record = payload.first().and_then(Value::as_array).ok_or_else(|| {
            BitfinexHttpError::ParseError("Missing order in acknowledgment payload".to_string())
        })?;
        Ok(parse_order(record, catalog)?)
    }

    fn ack_payload(ack: &RawRecord) -> Result<&Vec<Value>, BitfinexHttpError> {
        let status = ack.get(6).and_then(Value::as_str).unwrap_or_default();
        if status != "SUCCESS" {
            let code = ack.get(5).and_then(Value::as_i64);
            let text = ack.get(7).and_then(Value::as_str).unwrap_or_default();
            return Err(BitfinexHttpError::ExchangeError {
                code,
                message: format!("{status}: {text}"),
            });
        }

        ack.get(ACK_PAYLOAD_INDEX)
            .and_then(Value::as_array)
            .ok_or_else(|| {
                BitfinexHttpError::ParseError(
                    "Missing payload in acknowledgment".to_string(),
                )
            })
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
