use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    crawler::{chongnengjihua::ChongNeng, FetchError, QuoteSource},
    declare::{Instrument, QuoteRecord},
    util,
};

/// 上游以千分之一元回覆價格
const PRICE_SCALE: f64 = 0.001;

#[derive(Deserialize, Debug, Default)]
struct FundamentalsResponse {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    data: Option<Fundamentals>,
    #[serde(rename = "errorMessage", default)]
    error_message: Option<String>,
}

/// 只保留表格需要的欄位，其餘欄位忽略
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
struct Fundamentals {
    #[serde(deserialize_with = "crate::crawler::null_as_default")]
    high_px: f64,
    #[serde(deserialize_with = "crate::crawler::null_as_default")]
    low_px: f64,
    #[serde(deserialize_with = "crate::crawler::null_as_default")]
    last_px: f64,
    #[serde(deserialize_with = "crate::crawler::null_as_default")]
    open_price: f64,
    #[serde(deserialize_with = "crate::crawler::null_as_default")]
    pre_close_px: f64,
    /// 成交量 (股)
    #[serde(deserialize_with = "crate::crawler::null_as_default")]
    business_amount: f64,
    /// 成交金額
    #[serde(deserialize_with = "crate::crawler::null_as_default")]
    business_balance: f64,
}

impl From<Fundamentals> for QuoteRecord {
    fn from(f: Fundamentals) -> Self {
        QuoteRecord {
            high: f.high_px * PRICE_SCALE,
            low: f.low_px * PRICE_SCALE,
            close: f.last_px * PRICE_SCALE,
            open: f.open_price * PRICE_SCALE,
            pre_close: f.pre_close_px * PRICE_SCALE,
            volume: f.business_amount as i64,
            amount: f.business_balance,
            ..Default::default()
        }
    }
}

/// 以小寫的交易所與代碼組出查詢參數，例如 `shetf510300`
fn symbol(instrument: &Instrument) -> String {
    format!("{}etf{}", instrument.exchange.to_lowercase(), instrument.code)
}

/// 將上游的回覆轉成報價紀錄，`code` 不為零時帶回 `errorMessage`
fn parse_response(text: &str) -> Result<QuoteRecord, FetchError> {
    let res: FundamentalsResponse = serde_json::from_str(text)?;

    if res.code != 0 {
        return Err(FetchError::Upstream {
            code: res.code.to_string(),
            message: res.error_message.unwrap_or_default(),
        });
    }

    Ok(res.data.map(QuoteRecord::from).unwrap_or_default())
}

#[async_trait]
impl QuoteSource for ChongNeng {
    async fn fetch(&self, instrument: &Instrument) -> Result<QuoteRecord, FetchError> {
        let url = format!("{}?symbol={}", self.url, symbol(instrument));
        let text = util::http::get(&self.client, &url, None)
            .await
            .map_err(FetchError::Transport)?;

        parse_response(&text)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::{config, logging};

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_symbol() {
        let instrument = Instrument::from_str("SH_510300_300ETF_2").unwrap();

        assert_eq!(symbol(&instrument), "shetf510300");
    }

    #[test]
    fn test_parse_scales_prices() {
        let text = r#"{
            "code": 0,
            "data": {
                "highPx": 3604,
                "lowPx": 3540,
                "lastPx": 3581,
                "openPrice": 3552,
                "preClosePx": 3549,
                "prodCode": "510300",
                "prodName": "300ETF  ",
                "tradeStatus": "TRADE",
                "bidGrp": null
            },
            "errorMessage": null,
            "timestamp": 1698195619837
        }"#;

        let record = parse_response(text).unwrap();

        assert_close(record.high, 3.604);
        assert_close(record.low, 3.54);
        assert_close(record.close, 3.581);
        assert_close(record.open, 3.552);
        assert_close(record.pre_close, 3.549);
    }

    #[test]
    fn test_parse_null_prices() {
        let text = r#"{
            "code": 0,
            "data": {
                "highPx": 3604,
                "lowPx": null,
                "lastPx": 3581,
                "openPrice": 3552,
                "preClosePx": 3549,
                "businessAmount": null,
                "businessBalance": null
            }
        }"#;

        let record = parse_response(text).unwrap();

        assert_close(record.close, 3.581);
        assert_close(record.low, 0.0);
        assert_eq!(record.volume, 0);
        assert_close(record.amount, 0.0);
    }

    #[test]
    fn test_parse_error_code() {
        let why =
            parse_response(r#"{"code":500,"data":null,"errorMessage":"symbol not found"}"#)
                .unwrap_err();

        match why {
            FetchError::Upstream { code, message } => {
                assert_eq!(code, "500");
                assert_eq!(message, "symbol not found");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_parse_null_data() {
        let record = parse_response(r#"{"code":0,"data":null}"#).unwrap();

        assert_eq!(record, QuoteRecord::default());
    }

    #[tokio::test]
    #[ignore]
    async fn test_fetch() {
        dotenv::dotenv().ok();
        logging::debug_file_async("開始 chongnengjihua::fetch".to_string());

        let upstream = config::Upstream::default();
        let client = util::http::build_client(upstream.request_timeout()).unwrap();
        let source = ChongNeng::new(client, upstream.fundamentals_url);
        let instrument = Instrument::from_str("SH_510300_300ETF_2").unwrap();

        match source.fetch(&instrument).await {
            Ok(record) => logging::debug_file_async(format!("fundamentals: {:?}", record)),
            Err(why) => logging::debug_file_async(format!(
                "Failed to chongnengjihua::fetch because {:?}",
                why
            )),
        }

        logging::debug_file_async("結束 chongnengjihua::fetch".to_string());
    }
}
