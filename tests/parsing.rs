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

//! Parsing tests against captured wire payloads in `test_data/`.

use std::path::PathBuf;

use bitfinex_http::{
    BookPrecision, LiquiditySide, MarketCatalog, OrderSide, OrderStatus, OrderType, WalletType,
    common::parse::{
        parse_balances, parse_candle, parse_market, parse_order, parse_order_book, parse_ticker,
        parse_trade,
    },
    http::models::{RawRecord, SymbolDetail},
};
use rstest::{fixture, rstest};

fn load_json<T: serde::de::DeserializeOwned>(filename: &str) -> T {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_data")
        .join(filename);
    let data = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()));
    serde_json::from_str(&data)
        .unwrap_or_else(|e| panic!("Failed to deserialize {}: {e}", path.display()))
}

#[fixture]
fn catalog() -> MarketCatalog {
    let details: Vec<SymbolDetail> = load_json("http_symbols_details.json");
    let catalog = MarketCatalog::new();
    for detail in &details {
        catalog.insert(parse_market(detail).unwrap());
    }
    catalog
}

#[rstest]
fn test_parse_markets_from_listing(catalog: MarketCatalog) {
    assert_eq!(catalog.len(), 4);

    let btc = catalog.by_symbol("BTC/USD").unwrap();
    assert_eq!(btc.id.as_str(), "tBTCUSD");
    assert_eq!(btc.base.as_str(), "BTC");
    assert_eq!(btc.quote.as_str(), "USD");
    assert_eq!(btc.base_id.as_str(), "fBTC");
    assert_eq!(btc.quote_id.as_str(), "fUSD");
    assert_eq!(btc.price_precision, 5);
    assert_eq!(btc.min_amount, Some(0.00006));
    assert_eq!(btc.max_amount, Some(2000.0));
    assert_eq!(btc.min_price, 1e-5);
    assert_eq!(btc.max_price, 1e5);

    // Colon-separated pairs keep the full base code
    let dusk = catalog.by_symbol("DUSK/USD").unwrap();
    assert_eq!(dusk.id.as_str(), "tDUSK:USD");
    assert_eq!(dusk.base.as_str(), "DUSK");
}

#[rstest]
fn test_parse_ticker_single(catalog: MarketCatalog) {
    let record: RawRecord = load_json("http_ticker.json");
    let market = catalog.by_symbol("BTC/USD").unwrap();

    let ticker = parse_ticker(&record, Some(&market), 1660304000000).unwrap();

    assert_eq!(ticker.symbol.unwrap().as_str(), "BTC/USD");
    assert_eq!(ticker.bid, 67030.0);
    assert_eq!(ticker.ask, 67031.0);
    assert_eq!(ticker.change, 1148.0);
    assert_eq!(ticker.percentage, 0.0174 * 100.0);
    assert_eq!(ticker.last, 67031.0);
    assert_eq!(ticker.base_volume, 576.56764539);
    assert_eq!(ticker.high, 67497.0);
    assert_eq!(ticker.low, 65653.0);
}

#[rstest]
fn test_parse_ticker_with_leading_symbol(catalog: MarketCatalog) {
    let records: Vec<RawRecord> = load_json("http_tickers.json");
    let market = catalog.by_symbol("BTC/USD").unwrap();

    // The multi-ticker layout prepends the market id; end-relative
    // indexing must yield the same fields as the single-ticker layout
    let ticker = parse_ticker(&records[0], Some(&market), 0).unwrap();

    assert_eq!(ticker.bid, 67030.0);
    assert_eq!(ticker.ask, 67031.0);
    assert_eq!(ticker.low, 65653.0);
}

#[rstest]
fn test_parse_public_trades(catalog: MarketCatalog) {
    let records: Vec<RawRecord> = load_json("http_trades.json");
    let market = catalog.by_symbol("BTC/USD").unwrap();

    let trades: Vec<_> = records
        .iter()
        .map(|r| parse_trade(r, &catalog, Some(&market)).unwrap())
        .collect();

    assert_eq!(trades.len(), 3);
    assert_eq!(trades[0].id, 1660304002);
    assert_eq!(trades[0].timestamp, 1660304000086);
    assert_eq!(trades[0].side, OrderSide::Buy);
    assert_eq!(trades[0].amount, 0.00176176);
    assert_eq!(trades[0].price, 23112.0);
    assert!(trades[0].fee.is_none());
    assert!(trades[0].order_id.is_none());

    assert_eq!(trades[1].side, OrderSide::Sell);
    assert_eq!(trades[1].amount, 0.0018);
}

#[rstest]
fn test_parse_private_trades(catalog: MarketCatalog) {
    let records: Vec<RawRecord> = load_json("http_order_trades.json");

    let trade = parse_trade(&records[0], &catalog, None).unwrap();

    assert_eq!(trade.id, 1128141790);
    assert_eq!(trade.timestamp, 1653322600000);
    assert_eq!(trade.symbol.unwrap().as_str(), "BTC/USD");
    assert_eq!(trade.order_id, Some(95412658264));
    assert_eq!(trade.side, OrderSide::Buy);
    assert_eq!(trade.amount, 0.03);
    assert_eq!(trade.price, 29510.0);
    assert_eq!(trade.order_type, Some(OrderType::Market));
    assert_eq!(trade.liquidity, Some(LiquiditySide::Taker));

    let fee = trade.fee.unwrap();
    assert_eq!(fee.currency.as_str(), "USD");
    assert_eq!(fee.cost, 1.7706);
}

#[rstest]
fn test_parse_orders(catalog: MarketCatalog) {
    let records: Vec<RawRecord> = load_json("http_orders.json");

    let open = parse_order(&records[0], &catalog).unwrap();
    assert_eq!(open.id, 95412658263);
    assert_eq!(open.symbol.unwrap().as_str(), "BTC/USD");
    assert_eq!(open.market_id.as_str(), "tBTCUSD");
    assert_eq!(open.timestamp, 1653322136258);
    assert_eq!(open.order_type, Some(OrderType::Limit));
    assert_eq!(open.side, OrderSide::Sell);
    assert_eq!(open.status, OrderStatus::Open);
    assert_eq!(open.amount, 0.2);
    assert_eq!(open.remaining, 0.2);
    assert_eq!(open.filled, 0.0);
    assert_eq!(open.price, Some(30000.0));

    let executed = parse_order(&records[1], &catalog).unwrap();
    assert_eq!(executed.status, OrderStatus::Closed);
    assert_eq!(executed.order_type, Some(OrderType::Market));
    assert_eq!(executed.side, OrderSide::Buy);
    assert_eq!(executed.filled, 0.05);
    assert_eq!(executed.average, Some(29510.0));
}

#[rstest]
fn test_parse_balances_sentinel() {
    let records: Vec<RawRecord> = load_json("http_wallets.json");

    let accounts = parse_balances(&records, WalletType::Exchange).unwrap();
    assert_eq!(accounts.len(), 3);

    // null available: everything is free
    let btc = &accounts[0];
    assert_eq!(btc.currency.as_str(), "BTC");
    assert_eq!(btc.free, 1.61169184);
    assert_eq!(btc.used, 0.0);

    // zero available: everything is in use
    let usd = &accounts[1];
    assert_eq!(usd.free, 0.0);
    assert_eq!(usd.used, 5000.0);

    // positive available taken verbatim
    let eth = &accounts[2];
    assert_eq!(eth.free, 8.25);
    assert_eq!(eth.used, 2.25);

    let margin = parse_balances(&records, WalletType::Margin).unwrap();
    assert_eq!(margin.len(), 1);
    assert_eq!(margin[0].currency.as_str(), "USD");
}

#[rstest]
fn test_parse_order_book_aggregated() {
    let records: Vec<RawRecord> = load_json("http_book_p0.json");

    let book = parse_order_book(&records, BookPrecision::P0, 1660304000000).unwrap();

    assert_eq!(book.bids.len(), 3);
    assert_eq!(book.asks.len(), 3);
    assert_eq!(book.bids[0].price, 66966.0);
    assert_eq!(book.asks[0].price, 66967.0);
    assert!(book.bids.windows(2).all(|w| w[0].price >= w[1].price));
    assert!(book.asks.windows(2).all(|w| w[0].price <= w[1].price));
    // Amounts are magnitudes after the sign encodes the side
    assert_eq!(book.asks[0].amount, 0.1225);
}

#[rstest]
fn test_parse_order_book_raw() {
    let records: Vec<RawRecord> = load_json("http_book_r0.json");

    let book = parse_order_book(&records, BookPrecision::R0, 0).unwrap();

    // Raw books carry the price at index 1, after the order id
    assert_eq!(book.bids[0].price, 66966.1);
    assert_eq!(book.asks[0].price, 66967.2);
}

#[rstest]
fn test_parse_candles() {
    let records: Vec<RawRecord> = load_json("http_candles.json");

    let candles: Vec<_> = records.iter().map(|r| parse_candle(r).unwrap()).collect();

    assert_eq!(candles.len(), 3);
    assert_eq!(candles[0].timestamp, 1660310400000);
    assert_eq!(candles[0].open, 23095.0);
    assert_eq!(candles[0].close, 23102.0);
    assert_eq!(candles[0].high, 23130.0);
    assert_eq!(candles[0].low, 23075.0);
    assert_eq!(candles[0].volume, 171.22108279);
}
