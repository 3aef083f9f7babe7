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

//! Conversion helpers that translate Bitfinex positional records into the
//! normalized domain model.
//!
//! The v2 API returns most payloads as heterogeneous JSON arrays whose
//! meaning depends on position (and, for tickers, on distance from the end
//! of the record). Parsers here assert minimum lengths and fail with a
//! descriptive error rather than read out of range.

use anyhow::{Context, bail};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde_json::Value;
use ustr::Ustr;

use crate::{
    common::{
        consts::{FUNDING_CURRENCY_PREFIX, TRADING_PAIR_PREFIX},
        enums::{
            BookPrecision, LiquiditySide, OrderSide, OrderStatus, OrderType, PlatformStatus,
            WalletType,
        },
        models::{
            BalanceAccount, BookLevel, Candle, Fee, Market, MarketCatalog, Order, OrderBook,
            Ticker, Trade,
        },
    },
    http::models::{RawRecord, SymbolDetail},
};

/// Minimum record length for the end-anchored ticker offsets.
const TICKER_MIN_LEN: usize = 10;

fn field<'a>(record: &'a [Value], idx: usize, what: &str) -> anyhow::Result<&'a Value> {
    record
        .get(idx)
        .with_context(|| format!("Missing {what} at index {idx} (record length {})", record.len()))
}

fn field_f64(record: &[Value], idx: usize, what: &str) -> anyhow::Result<f64> {
    field(record, idx, what)?
        .as_f64()
        .with_context(|| format!("Invalid {what} at index {idx}: expected number"))
}

fn field_i64(record: &[Value], idx: usize, what: &str) -> anyhow::Result<i64> {
    field(record, idx, what)?
        .as_i64()
        .with_context(|| format!("Invalid {what} at index {idx}: expected integer"))
}

fn field_str<'a>(record: &'a [Value], idx: usize, what: &str) -> anyhow::Result<&'a str> {
    field(record, idx, what)?
        .as_str()
        .with_context(|| format!("Invalid {what} at index {idx}: expected string"))
}

/// Returns `None` when the index is out of range or holds a JSON null.
fn opt_f64(record: &[Value], idx: usize) -> Option<f64> {
    record.get(idx).and_then(Value::as_f64)
}

fn opt_str(record: &[Value], idx: usize) -> Option<&str> {
    record.get(idx).and_then(Value::as_str)
}

/// Canonicalizes a wire currency code by stripping a single leading
/// lowercase marker (`f` for funding, `t` for trading).
///
/// Marker prefixes are lowercase on the wire while currency codes are
/// uppercase, so codes such as `TRX` or `TUSD` are never mangled.
#[must_use]
pub fn canonical_currency_code(raw: &str) -> Ustr {
    let stripped = raw
        .strip_prefix(FUNDING_CURRENCY_PREFIX)
        .or_else(|| raw.strip_prefix(TRADING_PAIR_PREFIX))
        .unwrap_or(raw);
    Ustr::from(stripped)
}

/// Derives the exchange-native funding currency id for a canonical code.
#[must_use]
pub fn funding_currency_id(code: &str) -> Ustr {
    Ustr::from(&format!("{FUNDING_CURRENCY_PREFIX}{code}"))
}

/// Rounds a value to the given number of decimal digits.
///
/// Used for fee amounts, which the venue reports at full float precision.
#[must_use]
pub fn round_to_precision(value: f64, precision: u32) -> f64 {
    match Decimal::try_from(value) {
        Ok(decimal) => decimal.round_dp(precision).to_f64().unwrap_or(value),
        Err(_) => value,
    }
}

/// Parses the platform-status record `[1]` = operative, `[0]` = maintenance.
pub fn parse_platform_status(record: &[Value]) -> anyhow::Result<PlatformStatus> {
    let status = field_i64(record, 0, "platform status flag")?;
    Ok(if status == 1 {
        PlatformStatus::Operative
    } else {
        PlatformStatus::Maintenance
    })
}

/// Normalizes one v1 symbol listing record into a [`Market`].
///
/// # Errors
///
/// Returns an error only for a malformed or missing pair identifier, or
/// unparsable numeric limits; every well-formed listing yields a market.
pub fn parse_market(detail: &SymbolDetail) -> anyhow::Result<Market> {
    let pair = detail.pair.to_uppercase();
    let (base_raw, quote_raw) = if let Some((base, quote)) = pair.split_once(':') {
        if base.is_empty() || quote.is_empty() {
            bail!("Malformed pair identifier '{}'", detail.pair);
        }
        (base.to_string(), quote.to_string())
    } else {
        if pair.len() < 6 {
            bail!("Malformed pair identifier '{}'", detail.pair);
        }
        (pair[..3].to_string(), pair[3..6].to_string())
    };

    let base = canonical_currency_code(&base_raw);
    let quote = canonical_currency_code(&quote_raw);
    let precision = detail.price_precision;

    let min_amount = detail
        .minimum_order_size
        .as_deref()
        .map(|s| s.parse::<f64>().context("Invalid minimum_order_size"))
        .transpose()?;
    let max_amount = detail
        .maximum_order_size
        .as_deref()
        .map(|s| s.parse::<f64>().context("Invalid maximum_order_size"))
        .transpose()?;

    let min_price = 10f64.powi(-(precision as i32));
    let max_price = 10f64.powi(precision as i32);

    Ok(Market {
        id: Ustr::from(&format!("{TRADING_PAIR_PREFIX}{pair}")),
        symbol: Ustr::from(&format!("{base}/{quote}")),
        base,
        quote,
        base_id: funding_currency_id(&base_raw),
        quote_id: funding_currency_id(&quote_raw),
        price_precision: precision,
        amount_precision: precision,
        min_amount,
        max_amount,
        min_price,
        max_price,
        min_cost: min_amount.map(|amount| amount * min_price),
    })
}

/// Parses a ticker record by indexing from the end of the array.
///
/// Ticker records vary in total length by market type (and carry a leading
/// symbol in the multi-ticker response), but the trailing eight fields are
/// stable: bid at −10, ask at −8, change at −6, relative change at −5,
/// last at −4, base volume at −3, high at −2, low at −1.
pub fn parse_ticker(
    record: &[Value],
    market: Option<&Market>,
    timestamp: i64,
) -> anyhow::Result<Ticker> {
    let n = record.len();
    if n < TICKER_MIN_LEN {
        bail!("Ticker record too short: expected at least {TICKER_MIN_LEN} fields, was {n}");
    }

    Ok(Ticker {
        symbol: market.map(|m| m.symbol),
        timestamp,
        bid: field_f64(record, n - 10, "ticker bid")?,
        ask: field_f64(record, n - 8, "ticker ask")?,
        change: field_f64(record, n - 6, "ticker change")?,
        percentage: field_f64(record, n - 5, "ticker relative change")? * 100.0,
        last: field_f64(record, n - 4, "ticker last")?,
        base_volume: field_f64(record, n - 3, "ticker volume")?,
        high: field_f64(record, n - 2, "ticker high")?,
        low: field_f64(record, n - 1, "ticker low")?,
    })
}

/// Parses a public or private trade record.
///
/// The two layouts share no fixed schema and are distinguished by length:
/// more than five elements means a private execution, which additionally
/// carries the market id, order linkage, maker flag, fee and order type.
pub fn parse_trade(
    record: &[Value],
    catalog: &MarketCatalog,
    market: Option<&Market>,
) -> anyhow::Result<Trade> {
    let is_private = record.len() > 5;
    let (amount_idx, price_idx, timestamp_idx) = if is_private { (4, 5, 2) } else { (2, 3, 1) };

    let id = field_i64(record, 0, "trade id")?;
    let timestamp = field_i64(record, timestamp_idx, "trade timestamp")?;
    let signed_amount = field_f64(record, amount_idx, "trade amount")?;
    let price = field_f64(record, price_idx, "trade price")?;

    let side = OrderSide::from_amount(signed_amount);
    let amount = signed_amount.abs();

    let mut symbol = market.map(|m| m.symbol);
    let mut order_id = None;
    let mut liquidity = None;
    let mut order_type = None;
    let mut fee = None;

    if is_private {
        let market_id = field_str(record, 1, "trade market id")?;
        let resolved = catalog.by_market_id(market_id);
        // Fall back to the raw id when the catalog cannot resolve it
        symbol = Some(
            resolved
                .as_ref()
                .map_or_else(|| Ustr::from(market_id), |m| m.symbol),
        );

        order_id = Some(field_i64(record, 3, "trade order id")?);
        liquidity = Some(if field(record, 8, "trade maker flag")?.as_i64() == Some(1) {
            LiquiditySide::Maker
        } else {
            LiquiditySide::Taker
        });

        if let Some(fee_cost) = opt_f64(record, 9) {
            let fee_currency = field_str(record, 10, "trade fee currency")?;
            let cost = match resolved.as_ref().or(market) {
                Some(m) => round_to_precision(fee_cost.abs(), m.price_precision),
                None => fee_cost.abs(),
            };
            fee = Some(Fee {
                currency: canonical_currency_code(fee_currency),
                cost,
            });
        }

        order_type = opt_str(record, 6).and_then(OrderType::from_native);
    }

    Ok(Trade {
        id,
        timestamp,
        symbol,
        side,
        price,
        amount,
        cost: price * amount,
        order_id,
        liquidity,
        order_type,
        fee,
    })
}

/// Classifies a native order status string.
///
/// Matching is case-sensitive and first-match-wins; `ACTIVE` is an exact
/// match while the rest are prefixes (the venue appends execution details,
/// e.g. `"EXECUTED @ 107.6(-0.2)"`). Unknown statuses pass through
/// unchanged rather than failing.
#[must_use]
pub fn parse_order_status(native: &str) -> OrderStatus {
    if native == "ACTIVE" || native.starts_with("PARTIALLY FILLED") {
        OrderStatus::Open
    } else if native.starts_with("EXECUTED") {
        OrderStatus::Closed
    } else if native.starts_with("CANCELED") {
        OrderStatus::Canceled
    } else if native.starts_with("INSUFFICIENT MARGIN")
        || native.starts_with("RSN_DUST")
        || native.starts_with("RSN_PAUSE")
    {
        OrderStatus::Rejected
    } else {
        OrderStatus::Other(Ustr::from(native))
    }
}

/// Parses an order record.
///
/// Fixed positional layout; fields used are id@0, market-id@3, timestamp@5,
/// remaining@6, signed amount@7, native type@8, status@13, price@16 and
/// average price@17. The sign of the amount encodes the side.
pub fn parse_order(record: &[Value], catalog: &MarketCatalog) -> anyhow::Result<Order> {
    let id = field_i64(record, 0, "order id")?;
    let market_id = field_str(record, 3, "order market id")?;
    let timestamp = field_i64(record, 5, "order timestamp")?;
    let remaining = field_f64(record, 6, "order remaining")?.abs();
    let signed_amount = field_f64(record, 7, "order amount")?;
    let order_type = opt_str(record, 8).and_then(OrderType::from_native);
    let status = parse_order_status(field_str(record, 13, "order status")?);
    let price = opt_f64(record, 16);
    let average = opt_f64(record, 17);

    let amount = signed_amount.abs();
    let filled = amount - remaining;

    Ok(Order {
        id,
        symbol: catalog.by_market_id(market_id).map(|m| m.symbol),
        market_id: Ustr::from(market_id),
        timestamp,
        order_type,
        side: OrderSide::from_amount(signed_amount),
        status,
        amount,
        remaining,
        filled,
        price,
        average,
        cost: price.map(|p| p * filled),
        fee: None,
        trades: None,
    })
}

/// Parses wallet records, keeping only those for the requested wallet type.
///
/// The `available` field at index 4 is a three-way sentinel the wire format
/// needs because it cannot distinguish "no data" from "truly zero
/// available": null means free = total, exactly zero means everything is in
/// use, and a positive value is taken verbatim.
pub fn parse_balances(
    records: &[RawRecord],
    wallet: WalletType,
) -> anyhow::Result<Vec<BalanceAccount>> {
    let mut accounts = Vec::new();
    for record in records {
        let wallet_type = field_str(record, 0, "wallet type")?;
        if wallet_type != wallet.as_ref() {
            continue;
        }

        let currency = field_str(record, 1, "wallet currency")?;
        let total = field_f64(record, 2, "wallet total")?;

        let (free, used) = match opt_f64(record, 4) {
            None => (total, 0.0),
            Some(available) if available == 0.0 => (0.0, total),
            Some(available) => (available, total - available),
        };

        accounts.push(BalanceAccount {
            currency: canonical_currency_code(currency),
            total,
            free,
            used,
        });
    }
    Ok(accounts)
}

/// Parses an order-book snapshot at the given aggregation level.
///
/// Raw (`R0`) records are `[orderId, price, signedAmount]` while aggregated
/// records are `[price, count, signedAmount]`; a positive amount is a bid.
/// The venue does not guarantee ordering within the response, so bids are
/// sorted descending and asks ascending before returning.
pub fn parse_order_book(
    records: &[RawRecord],
    precision: BookPrecision,
    timestamp: i64,
) -> anyhow::Result<OrderBook> {
    let price_idx = if precision.is_raw() { 1 } else { 0 };

    let mut book = OrderBook {
        timestamp,
        ..Default::default()
    };
    for record in records {
        let price = field_f64(record, price_idx, "book price")?;
        let signed_amount = field_f64(record, 2, "book amount")?;
        let level = BookLevel {
            price,
            amount: signed_amount.abs(),
        };
        if signed_amount > 0.0 {
            book.bids.push(level);
        } else {
            book.asks.push(level);
        }
    }

    book.bids.sort_by(|a, b| b.price.total_cmp(&a.price));
    book.asks.sort_by(|a, b| a.price.total_cmp(&b.price));

    Ok(book)
}

/// Parses a candle record `[MTS, OPEN, CLOSE, HIGH, LOW, VOLUME]`.
pub fn parse_candle(record: &[Value]) -> anyhow::Result<Candle> {
    Ok(Candle {
        timestamp: field_i64(record, 0, "candle timestamp")?,
        open: field_f64(record, 1, "candle open")?,
        close: field_f64(record, 2, "candle close")?,
        high: field_f64(record, 3, "candle high")?,
        low: field_f64(record, 4, "candle low")?,
        volume: field_f64(record, 5, "candle volume")?,
    })
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;

    fn record(value: Value) -> Vec<Value> {
        value.as_array().expect("expected JSON array").clone()
    }

    fn btcusd_market() -> Market {
        parse_market(&SymbolDetail {
            pair: "btcusd".to_string(),
            price_precision: 5,
            minimum_order_size: Some("0.0002".to_string()),
            maximum_order_size: Some("2000.0".to_string()),
            initial_margin: None,
            minimum_margin: None,
            expiration: None,
            margin: None,
        })
        .unwrap()
    }

    fn catalog_with_btcusd() -> MarketCatalog {
        let catalog = MarketCatalog::new();
        catalog.insert(btcusd_market());
        catalog
    }

    #[rstest]
    #[case("fUSD", "USD")]
    #[case("tBTC", "BTC")]
    #[case("USD", "USD")]
    #[case("TRX", "TRX")]
    #[case("TUSD", "TUSD")]
    fn test_canonical_currency_code(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(canonical_currency_code(raw).as_str(), expected);
    }

    #[rstest]
    fn test_parse_market_concatenated_pair() {
        let market = btcusd_market();

        assert_eq!(market.id.as_str(), "tBTCUSD");
        assert_eq!(market.symbol.as_str(), "BTC/USD");
        assert_eq!(market.base.as_str(), "BTC");
        assert_eq!(market.quote.as_str(), "USD");
        assert_eq!(market.base_id.as_str(), "fBTC");
        assert_eq!(market.quote_id.as_str(), "fUSD");
        assert_eq!(market.price_precision, 5);
        assert_eq!(market.amount_precision, 5);
        assert_eq!(market.min_price, 1e-5);
        assert_eq!(market.max_price, 1e5);
        assert_eq!(market.min_amount, Some(0.0002));
        assert_eq!(market.min_cost, Some(0.0002 * 1e-5));
        assert!(market.max_amount.is_some());
    }

    #[rstest]
    fn test_parse_market_delimited_pair() {
        let market = parse_market(&SymbolDetail {
            pair: "dusk:usd".to_string(),
            price_precision: 5,
            minimum_order_size: None,
            maximum_order_size: None,
            initial_margin: None,
            minimum_margin: None,
            expiration: None,
            margin: None,
        })
        .unwrap();

        assert_eq!(market.id.as_str(), "tDUSK:USD");
        assert_eq!(market.symbol.as_str(), "DUSK/USD");
        assert_eq!(market.base_id.as_str(), "fDUSK");
        assert!(market.min_cost.is_none());
    }

    #[rstest]
    #[case("btc")]
    #[case("")]
    #[case(":usd")]
    fn test_parse_market_malformed_pair(#[case] pair: &str) {
        let result = parse_market(&SymbolDetail {
            pair: pair.to_string(),
            price_precision: 5,
            minimum_order_size: None,
            maximum_order_size: None,
            initial_margin: None,
            minimum_margin: None,
            expiration: None,
            margin: None,
        });
        assert!(result.is_err());
    }

    #[rstest]
    fn test_parse_ticker_end_anchored_offsets() {
        let raw = record(json!([100.0, 31.6, 101.0, 29.3, 1.0, 0.01, 101.0, 50.0, 102.0, 99.0]));
        let market = btcusd_market();

        let ticker = parse_ticker(&raw, Some(&market), 1_700_000_000_000).unwrap();

        assert_eq!(ticker.symbol.unwrap().as_str(), "BTC/USD");
        assert_eq!(ticker.bid, 100.0);
        assert_eq!(ticker.ask, 101.0);
        assert_eq!(ticker.change, 1.0);
        assert_eq!(ticker.percentage, 1.0);
        assert_eq!(ticker.last, 101.0);
        assert_eq!(ticker.base_volume, 50.0);
        assert_eq!(ticker.high, 102.0);
        assert_eq!(ticker.low, 99.0);
    }

    #[rstest]
    fn test_parse_ticker_tolerates_leading_fields() {
        // Extra leading fields (as in the multi-ticker response) must not
        // shift the trailing offsets
        let raw = record(json!([
            "FRR", 0.0001, 2.0,
            100.0, 31.6, 101.0, 29.3, 1.0, 0.01, 101.0, 50.0, 102.0, 99.0
        ]));

        let ticker = parse_ticker(&raw, None, 0).unwrap();

        assert_eq!(ticker.bid, 100.0);
        assert_eq!(ticker.ask, 101.0);
        assert_eq!(ticker.last, 101.0);
        assert_eq!(ticker.low, 99.0);
        assert!(ticker.symbol.is_none());
    }

    #[rstest]
    fn test_parse_ticker_too_short() {
        let raw = record(json!([1.0, 2.0, 3.0]));
        assert!(parse_ticker(&raw, None, 0).is_err());
    }

    #[rstest]
    fn test_parse_public_trade() {
        let raw = record(json!([399251013, 1574694475039_i64, -0.005, 7103.7]));
        let catalog = MarketCatalog::new();
        let market = btcusd_market();

        let trade = parse_trade(&raw, &catalog, Some(&market)).unwrap();

        assert_eq!(trade.id, 399251013);
        assert_eq!(trade.timestamp, 1_574_694_475_039);
        assert_eq!(trade.side, OrderSide::Sell);
        assert_eq!(trade.amount, 0.005);
        assert_eq!(trade.price, 7103.7);
        assert_eq!(trade.cost, 0.005 * 7103.7);
        assert_eq!(trade.symbol.unwrap().as_str(), "BTC/USD");
        assert!(trade.order_id.is_none());
        assert!(trade.fee.is_none());
        assert!(trade.liquidity.is_none());
    }

    #[rstest]
    fn test_parse_private_trade() {
        let raw = record(json!([
            399251013,
            "tBTCUSD",
            1574694475039_i64,
            33640053700_i64,
            0.005,
            7103.7,
            "EXCHANGE LIMIT",
            7103.7,
            1,
            -0.0000142074,
            "BTC"
        ]));
        let catalog = catalog_with_btcusd();

        let trade = parse_trade(&raw, &catalog, None).unwrap();

        assert_eq!(trade.symbol.unwrap().as_str(), "BTC/USD");
        assert_eq!(trade.order_id, Some(33_640_053_700));
        assert_eq!(trade.side, OrderSide::Buy);
        assert_eq!(trade.liquidity, Some(LiquiditySide::Maker));
        assert_eq!(trade.order_type, Some(OrderType::Limit));
        let fee = trade.fee.unwrap();
        assert_eq!(fee.currency.as_str(), "BTC");
        // Absolute fee cost rounded to the market's 5-digit precision
        assert_eq!(fee.cost, 0.00001);
    }

    #[rstest]
    fn test_parse_private_trade_unresolved_market_falls_back_to_raw_id() {
        let raw = record(json!([
            1, "tETHUSD", 1574694475039_i64, 2, -1.0, 150.0,
            "EXCHANGE MARKET", 0, 0, -0.15, "USD"
        ]));
        let catalog = MarketCatalog::new();

        let trade = parse_trade(&raw, &catalog, None).unwrap();

        assert_eq!(trade.symbol.unwrap().as_str(), "tETHUSD");
        assert_eq!(trade.liquidity, Some(LiquiditySide::Taker));
        assert_eq!(trade.order_type, Some(OrderType::Market));
        // No market resolved, fee kept at full precision
        assert_eq!(trade.fee.unwrap().cost, 0.15);
    }

    #[rstest]
    #[case("ACTIVE", OrderStatus::Open)]
    #[case("PARTIALLY FILLED @ 107.6(-0.2)", OrderStatus::Open)]
    #[case("EXECUTED @ 107.6", OrderStatus::Closed)]
    #[case("CANCELED", OrderStatus::Canceled)]
    #[case("INSUFFICIENT MARGIN was: PARTIALLY FILLED", OrderStatus::Rejected)]
    #[case("RSN_DUST", OrderStatus::Rejected)]
    #[case("RSN_PAUSE", OrderStatus::Rejected)]
    fn test_parse_order_status(#[case] native: &str, #[case] expected: OrderStatus) {
        assert_eq!(parse_order_status(native), expected);
    }

    #[rstest]
    fn test_parse_order_status_passes_unknown_through() {
        let status = parse_order_status("UNKNOWN_X");
        assert_eq!(status, OrderStatus::Other(Ustr::from("UNKNOWN_X")));
        assert_eq!(status.to_string(), "UNKNOWN_X");
    }

    #[rstest]
    fn test_parse_order() {
        let raw = record(json!([
            37271830598_i64, null, 1578784364748_i64, "tBTCUSD", 1578784364748_i64,
            1578784364748_i64, 2.0, -5.0, "EXCHANGE LIMIT", null, null, null, 0,
            "ACTIVE", null, null, 100.0, 0.0, 0, 0, null, null, null, 0, null,
            null, null, null, "API>BFX", null, null, null
        ]));
        let catalog = catalog_with_btcusd();

        let order = parse_order(&raw, &catalog).unwrap();

        assert_eq!(order.id, 37_271_830_598);
        assert_eq!(order.symbol.unwrap().as_str(), "BTC/USD");
        assert_eq!(order.market_id.as_str(), "tBTCUSD");
        assert_eq!(order.timestamp, 1_578_784_364_748);
        assert_eq!(order.side, OrderSide::Sell);
        assert_eq!(order.amount, 5.0);
        assert_eq!(order.remaining, 2.0);
        assert_eq!(order.filled, 3.0);
        assert_eq!(order.price, Some(100.0));
        assert_eq!(order.cost, Some(300.0));
        assert_eq!(order.status, OrderStatus::Open);
        assert_eq!(order.order_type, Some(OrderType::Limit));
        assert!(order.fee.is_none());
        assert!(order.trades.is_none());
    }

    #[rstest]
    fn test_parse_order_unknown_market_id() {
        let raw = record(json!([
            1, null, 2, "tXYZABC", 3, 1578784364748_i64, 0.0, 1.0, "EXCHANGE MARKET",
            null, null, null, 0, "EXECUTED @ 107.6", null, null, 107.6, 107.6
        ]));
        let catalog = MarketCatalog::new();

        let order = parse_order(&raw, &catalog).unwrap();

        assert!(order.symbol.is_none());
        assert_eq!(order.market_id.as_str(), "tXYZABC");
        assert_eq!(order.status, OrderStatus::Closed);
        assert_eq!(order.average, Some(107.6));
    }

    #[rstest]
    fn test_parse_balances_three_way_reconciliation() {
        let records: Vec<RawRecord> = vec![
            record(json!(["exchange", "USD", 10.0, 0, null])),
            record(json!(["exchange", "BTC", 10.0, 0, 0.0])),
            record(json!(["exchange", "ETH", 10.0, 0, 4.0])),
            record(json!(["margin", "USD", 99.0, 0, 99.0])),
        ];

        let accounts = parse_balances(&records, WalletType::Exchange).unwrap();

        assert_eq!(accounts.len(), 3);
        // available unset: everything is free
        assert_eq!(accounts[0].currency.as_str(), "USD");
        assert_eq!((accounts[0].free, accounts[0].used), (10.0, 0.0));
        // available exactly zero: everything is in use
        assert_eq!((accounts[1].free, accounts[1].used), (0.0, 10.0));
        // available positive: used is the remainder
        assert_eq!((accounts[2].free, accounts[2].used), (4.0, 6.0));
    }

    #[rstest]
    fn test_parse_balances_strips_marker_prefix() {
        let records: Vec<RawRecord> = vec![record(json!(["funding", "fUSD", 5.0, 0, null]))];

        let accounts = parse_balances(&records, WalletType::Funding).unwrap();

        assert_eq!(accounts[0].currency.as_str(), "USD");
    }

    #[rstest]
    fn test_parse_order_book_raw_precision() {
        // R0 records are [orderId, price, signedAmount], deliberately unsorted
        let records: Vec<RawRecord> = vec![
            record(json!([101, 7100.0, 1.5])),
            record(json!([102, 7105.0, -2.0])),
            record(json!([103, 7102.0, 0.6])),
            record(json!([104, 7103.0, -0.4])),
        ];

        let book = parse_order_book(&records, BookPrecision::R0, 0).unwrap();

        assert_eq!(book.bids.len(), 2);
        assert_eq!(book.asks.len(), 2);
        assert_eq!(book.bids[0].price, 7102.0);
        assert_eq!(book.bids[1].price, 7100.0);
        assert_eq!(book.asks[0].price, 7103.0);
        assert_eq!(book.asks[1].price, 7105.0);
        assert_eq!(book.asks[1].amount, 2.0);
    }

    #[rstest]
    fn test_parse_order_book_aggregated_precision() {
        // P0..P3 records are [price, count, signedAmount]
        let records: Vec<RawRecord> = vec![
            record(json!([7100.0, 3, 1.5])),
            record(json!([7105.0, 1, -2.0])),
        ];

        let book = parse_order_book(&records, BookPrecision::P0, 0).unwrap();

        assert_eq!(book.bids[0].price, 7100.0);
        assert_eq!(book.asks[0].price, 7105.0);
    }

    #[rstest]
    fn test_parse_order_book_sides_sorted() {
        let records: Vec<RawRecord> = (0..20)
            .map(|i| {
                let price = 7000.0 + f64::from((i * 37) % 100);
                let amount = if i % 2 == 0 { 1.0 } else { -1.0 };
                record(json!([price, 1, amount]))
            })
            .collect();

        let book = parse_order_book(&records, BookPrecision::P1, 0).unwrap();

        assert!(book.bids.windows(2).all(|w| w[0].price >= w[1].price));
        assert!(book.asks.windows(2).all(|w| w[0].price <= w[1].price));
    }

    #[rstest]
    fn test_parse_candle() {
        let raw = record(json!([1573504560000_i64, 8744.9, 8752.3, 8752.3, 8744.9, 0.73]));

        let candle = parse_candle(&raw).unwrap();

        assert_eq!(candle.timestamp, 1_573_504_560_000);
        assert_eq!(candle.open, 8744.9);
        assert_eq!(candle.close, 8752.3);
        assert_eq!(candle.high, 8752.3);
        assert_eq!(candle.low, 8744.9);
        assert_eq!(candle.volume, 0.73);
    }

    #[rstest]
    fn test_parse_platform_status() {
        assert_eq!(
            parse_platform_status(&record(json!([1]))).unwrap(),
            PlatformStatus::Operative
        );
        assert_eq!(
            parse_platform_status(&record(json!([0]))).unwrap(),
            PlatformStatus::Maintenance
        );
        assert!(parse_platform_status(&[]).is_err());
    }

    #[rstest]
    fn test_round_to_precision() {
        assert_eq!(round_to_precision(0.0000142074, 5), 0.00001);
        assert_eq!(round_to_precision(1.23456789, 4), 1.2346);
        assert_eq!(round_to_precision(1.0, 8), 1.0);
    }
}
