use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::header::{self, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::{
    crawler::{sylapp::Sylapp, FetchError, QuoteSource},
    declare::{Instrument, QuoteRecord},
    util,
};

/// 成功的回覆代碼
const SUCCESS_CODE: &str = "0000";
/// token 過期的回覆代碼
const TOKEN_EXPIRED_CODE: &str = "6403";

/// K 線請求內容，只取最近一根日 K
///
/// `{"Market":"SZ","Inst":"002139","Period":"DAY","ReqID":1,"servicetype":"KLINE","StartID":0,"EndID":-1}`
#[derive(Serialize, Debug)]
struct KlineRequest<'a> {
    #[serde(rename = "Market")]
    market: &'a str,
    #[serde(rename = "Inst")]
    inst: &'a str,
    #[serde(rename = "Period")]
    period: &'static str,
    #[serde(rename = "ReqID")]
    req_id: i32,
    #[serde(rename = "servicetype")]
    service_type: &'static str,
    #[serde(rename = "StartID")]
    start_id: i64,
    #[serde(rename = "EndID")]
    end_id: i64,
}

impl<'a> KlineRequest<'a> {
    fn latest_day(market: &'a str, inst: &'a str) -> Self {
        KlineRequest {
            market,
            inst,
            period: "DAY",
            req_id: 1,
            service_type: "KLINE",
            start_id: 0,
            end_id: -1,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
struct KlineResponse {
    #[serde(rename = "Code", default)]
    code: String,
    #[serde(
        rename = "Message",
        default,
        deserialize_with = "crate::crawler::null_as_default"
    )]
    message: String,
    #[serde(rename = "QuoteData", default)]
    quote_data: Option<QuoteData>,
}

#[derive(Deserialize, Debug, Default)]
struct QuoteData {
    #[serde(rename = "KlineData", default)]
    kline_data: Vec<Kline>,
}

/// 一根 K 棒，欄位名稱沿用上游的大駝峰
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "PascalCase", default)]
struct Kline {
    #[serde(deserialize_with = "crate::crawler::null_as_default")]
    trading_day: i64,
    #[serde(deserialize_with = "crate::crawler::null_as_default")]
    time: i64,
    #[serde(deserialize_with = "crate::crawler::null_as_default")]
    high: f64,
    #[serde(deserialize_with = "crate::crawler::null_as_default")]
    open: f64,
    #[serde(deserialize_with = "crate::crawler::null_as_default")]
    low: f64,
    #[serde(deserialize_with = "crate::crawler::null_as_default")]
    close: f64,
    #[serde(deserialize_with = "crate::crawler::null_as_default")]
    volume: f64,
    #[serde(deserialize_with = "crate::crawler::null_as_default")]
    amount: f64,
    #[serde(deserialize_with = "crate::crawler::null_as_default")]
    tick_count: i64,
    #[serde(deserialize_with = "crate::crawler::null_as_default")]
    after_trade_volume: f64,
    #[serde(deserialize_with = "crate::crawler::null_as_default")]
    after_trade_amount: f64,
    #[serde(deserialize_with = "crate::crawler::null_as_default")]
    pre_close: f64,
    #[serde(deserialize_with = "crate::crawler::null_as_default")]
    settlement_price: f64,
}

impl From<Kline> for QuoteRecord {
    fn from(k: Kline) -> Self {
        QuoteRecord {
            trading_day: k.trading_day,
            time: k.time,
            high: k.high,
            open: k.open,
            low: k.low,
            close: k.close,
            volume: k.volume as i64,
            amount: k.amount,
            tick_count: k.tick_count,
            after_trade_volume: k.after_trade_volume as i64,
            after_trade_amount: k.after_trade_amount,
            pre_close: k.pre_close,
            settlement_price: k.settlement_price,
            ..Default::default()
        }
    }
}

/// 將上游的回覆轉成報價紀錄
///
/// `0000` 取第一根 K 棒，`6403` 是 token 過期，其餘代碼一律視為上游錯誤。
fn parse_response(text: &str) -> Result<QuoteRecord, FetchError> {
    let res: KlineResponse = serde_json::from_str(text)?;

    match res.code.as_str() {
        SUCCESS_CODE => res
            .quote_data
            .and_then(|qd| qd.kline_data.into_iter().next())
            .map(QuoteRecord::from)
            .ok_or_else(|| FetchError::Upstream {
                code: res.code.clone(),
                message: "no kline data in the response".to_string(),
            }),
        TOKEN_EXPIRED_CODE => Err(FetchError::TokenExpired(res.message)),
        _ => Err(FetchError::Upstream {
            code: res.code,
            message: res.message,
        }),
    }
}

impl Sylapp {
    fn build_headers(&self) -> Result<header::HeaderMap, FetchError> {
        let mut headers = header::HeaderMap::with_capacity(2);
        headers.insert(
            "token",
            HeaderValue::from_str(&self.token)
                .map_err(|why| FetchError::Transport(anyhow!("invalid token header: {:?}", why)))?,
        );
        // 上游要求這個 content-type，實際的內容是 JSON
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );

        Ok(headers)
    }
}

#[async_trait]
impl QuoteSource for Sylapp {
    async fn fetch(&self, instrument: &Instrument) -> Result<QuoteRecord, FetchError> {
        let req = KlineRequest::latest_day(&instrument.exchange, &instrument.code);
        let body = serde_json::to_string(&req)?;
        let text = util::http::post(&self.client, &self.url, Some(self.build_headers()?), body)
            .await
            .map_err(FetchError::Transport)?;

        parse_response(&text)
    }
}
