use std::{fmt, str::FromStr};

use anyhow::{anyhow, Result};
use strum::{AsRefStr, EnumString};

/// 報價來源的種類，對應代碼檔每一行最後的旗標
#[derive(PartialEq, Eq, Debug, Copy, Clone, EnumString, AsRefStr)]
pub enum InstrumentKind {
    /// 個股 1，走 K 線報價
    #[strum(serialize = "1")]
    Equity,
    /// ETF 2，走基本面報價
    #[strum(serialize = "2")]
    Fund,
}

/// 代碼檔中的一檔標的，格式為 `交易所_代碼_名稱_旗標`
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Instrument {
    /// 交易所，例如 SZ、SH
    pub exchange: String,
    pub code: String,
    pub name: String,
    pub kind: InstrumentKind,
}

impl FromStr for Instrument {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split('_').collect();
        if parts.len() < 4 {
            return Err(anyhow!(
                "'{}' is not in the form exchange_code_name_type",
                s
            ));
        }

        // 名稱本身可能含有底線，旗標固定是最後一段
        let flag = parts[parts.len() - 1];
        let kind = InstrumentKind::from_str(flag)
            .map_err(|_| anyhow!("'{}' has an unknown type flag '{}'", s, flag))?;

        Ok(Instrument {
            exchange: parts[0].to_string(),
            code: parts[1].to_string(),
            name: parts[2..parts.len() - 1].join("_"),
            kind,
        })
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}",
            self.exchange,
            self.code,
            self.name,
            self.kind.as_ref()
        )
    }
}

/// 一檔標的當日的 K 棒
#[derive(PartialEq, Debug, Clone, Default)]
pub struct QuoteRecord {
    pub code: String,
    pub name: String,
    /// 交易日 (unix timestamp)
    pub trading_day: i64,
    pub time: i64,
    /// 今日最高價
    pub high: f64,
    /// 今日開盤價
    pub open: f64,
    /// 今日最低價
    pub low: f64,
    /// 目前報價
    pub close: f64,
    pub volume: i64,
    pub amount: f64,
    pub tick_count: i64,
    pub after_trade_volume: i64,
    pub after_trade_amount: f64,
    /// 上一個交易日的收盤價，所有漲跌幅的基準
    pub pre_close: f64,
    pub settlement_price: f64,
}

impl QuoteRecord {
    /// 只有代碼與名稱、數值全為零的紀錄，抓取失敗時用來維持表格的形狀
    pub fn blank(code: &str, name: &str) -> Self {
        QuoteRecord {
            code: code.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_identity(mut self, instrument: &Instrument) -> Self {
        self.code = instrument.code.clone();
        self.name = instrument.name.clone();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_instrument() {
        let i = Instrument::from_str("SZ_002139_拓邦股份_1").unwrap();

        assert_eq!(i.exchange, "SZ");
        assert_eq!(i.code, "002139");
        assert_eq!(i.name, "拓邦股份");
        assert_eq!(i.kind, InstrumentKind::Equity);
        assert_eq!(i.to_string(), "SZ_002139_拓邦股份_1");
    }

    #[test]
    fn test_parse_fund_with_underscore_in_name() {
        let i = Instrument::from_str("SH_510300_300_ETF_2").unwrap();

        assert_eq!(i.name, "300_ETF");
        assert_eq!(i.kind, InstrumentKind::Fund);
    }

    #[test]
    fn test_parse_instrument_invalid() {
        assert!(Instrument::from_str("SZ_002139_1").is_err());
        assert!(Instrument::from_str("SZ_002139_拓邦股份_9").is_err());
        assert!(Instrument::from_str("").is_err());
    }

    #[test]
    fn test_blank() {
        let r = QuoteRecord::blank("510300", "300ETF");

        assert_eq!(r.code, "510300");
        assert_eq!(r.name, "300ETF");
        assert_eq!(r.close, 0.0);
        assert_eq!(r.pre_close, 0.0);
    }
}
