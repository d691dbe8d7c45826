use std::{env, fs, path::Path, str::FromStr};

use anyhow::{anyhow, Context, Result};

use crate::{
    declare::{Instrument, InstrumentKind},
    logging,
};

const COMMENT_PREFIX: &str = "//";
const TOKEN_PREFIX: &str = "token_";
const QUOTE_TOKEN: &str = "QUOTE_TOKEN";

/// 代碼檔的內容：一組 token 與依檔案順序排列的標的
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeFile {
    pub token: String,
    pub instruments: Vec<Instrument>,
}

/// token 的來源
#[derive(Debug, Clone, PartialEq)]
pub enum TokenSource {
    /// 命令列參數
    Argument(String),
    /// 環境變數 QUOTE_TOKEN
    Environment(String),
    /// 沿用代碼檔內的 token
    Stored,
}

impl TokenSource {
    /// 命令列參數優先，其次是環境變數，都沒有就用代碼檔內的
    pub fn resolve(argument: Option<String>) -> Self {
        if let Some(token) = argument.filter(|t| !t.trim().is_empty()) {
            return TokenSource::Argument(token.trim().to_string());
        }

        match env::var(QUOTE_TOKEN) {
            Ok(token) if !token.trim().is_empty() => {
                TokenSource::Environment(token.trim().to_string())
            }
            _ => TokenSource::Stored,
        }
    }

    fn supplied(&self) -> Option<&str> {
        match self {
            TokenSource::Argument(t) | TokenSource::Environment(t) => Some(t),
            TokenSource::Stored => None,
        }
    }
}

impl CodeFile {
    /// 解析代碼檔的文字內容
    ///
    /// `//` 開頭的是註解，`token_` 開頭的是 token，其餘非空白行都是 `交易所_代碼_名稱_旗標`。
    pub fn parse(text: &str) -> Result<Self> {
        let mut code_file = CodeFile::default();

        for (index, line) in text.lines().enumerate() {
            let line = line.trim_end();
            if line.trim().is_empty() || line.starts_with(COMMENT_PREFIX) {
                continue;
            }

            if let Some(token) = line.strip_prefix(TOKEN_PREFIX) {
                code_file.token = token.trim().to_string();
                continue;
            }

            let instrument = Instrument::from_str(line)
                .with_context(|| format!("line {} of the code file", index + 1))?;
            code_file.instruments.push(instrument);
        }

        Ok(code_file)
    }

    /// 讀取並解析代碼檔，檔案不存在時回傳錯誤由呼叫端決定是否中止
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read the code file {}", path.display()))?;

        Self::parse(&text)
    }

    /// 將檔案中所有舊 token 的文字換成新 token
    ///
    /// 舊 token 為空時沒有可以取代的文字，改為在檔尾補上一行 token。
    pub fn store_token(path: &Path, old: &str, new: &str) -> Result<()> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read the code file {}", path.display()))?;

        let replaced = if old.is_empty() {
            let mut t = text;
            if !t.is_empty() && !t.ends_with('\n') {
                t.push('\n');
            }
            t.push_str(TOKEN_PREFIX);
            t.push_str(new);
            t.push('\n');
            t
        } else {
            text.replace(old, new)
        };

        fs::write(path, replaced)
            .with_context(|| format!("Failed to write the code file {}", path.display()))
    }

    /// 依 token 來源決定要用的 token，外部給的新 token 會寫回代碼檔
    pub fn apply_token(&mut self, path: &Path, source: &TokenSource) -> Result<()> {
        let Some(new) = source.supplied() else {
            return Ok(());
        };

        if new != self.token {
            Self::store_token(path, &self.token, new)?;
            logging::info_file_async(format!(
                "token in {} has been replaced by the one from {}",
                path.display(),
                source_name(source)
            ));
        }

        self.token = new.to_string();

        Ok(())
    }

    /// 清單中有個股時一定要有 token
    pub fn ensure_token(&self) -> Result<()> {
        let needs_token = self
            .instruments
            .iter()
            .any(|i| i.kind == InstrumentKind::Equity);

        if needs_token && self.token.is_empty() {
            return Err(anyhow!(
                "token is empty, supply one with --token or {}",
                QUOTE_TOKEN
            ));
        }

        Ok(())
    }
}

fn source_name(source: &TokenSource) -> &'static str {
    match source {
        TokenSource::Argument(_) => "argument",
        TokenSource::Environment(_) => "environment",
        TokenSource::Stored => "code file",
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const SAMPLE: &str = "// 個股_1 ETF_2\ntoken_abc123\nSZ_002139_拓邦股份_1\nSH_510300_300ETF_2\n";

    #[test]
    fn test_parse() {
        let code_file = CodeFile::parse(SAMPLE).unwrap();

        assert_eq!(code_file.token, "abc123");
        assert_eq!(code_file.instruments.len(), 2);
        assert_eq!(code_file.instruments[0].code, "002139");
        assert_eq!(code_file.instruments[0].kind, InstrumentKind::Equity);
        assert_eq!(code_file.instruments[1].code, "510300");
        assert_eq!(code_file.instruments[1].kind, InstrumentKind::Fund);
    }

    #[test]
    fn test_parse_skips_blank_and_crlf() {
        let code_file = CodeFile::parse("\r\n// c\r\ntoken_t1 \r\n\r\nSZ_000001_平安银行_1\r\n").unwrap();

        assert_eq!(code_file.token, "t1");
        assert_eq!(code_file.instruments.len(), 1);
        assert_eq!(code_file.instruments[0].name, "平安银行");
    }

    #[test]
    fn test_parse_bad_line() {
        let why = CodeFile::parse("token_x\nSZ_000001\n").unwrap_err();

        assert!(format!("{:#}", why).contains("line 2"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();

        assert!(CodeFile::load(&dir.path().join("missing.txt")).is_err());
    }

    #[test]
    fn test_store_token() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        CodeFile::store_token(file.path(), "abc123", "xyz789").unwrap();
        let code_file = CodeFile::load(file.path()).unwrap();

        assert_eq!(code_file.token, "xyz789");
        assert_eq!(code_file.instruments.len(), 2);
    }

    #[test]
    fn test_store_token_when_missing() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all("SZ_002139_拓邦股份_1".as_bytes()).unwrap();

        CodeFile::store_token(file.path(), "", "fresh").unwrap();
        let code_file = CodeFile::load(file.path()).unwrap();

        assert_eq!(code_file.token, "fresh");
        assert_eq!(code_file.instruments.len(), 1);
    }

    #[test]
    fn test_apply_token() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let mut code_file = CodeFile::load(file.path()).unwrap();

        code_file
            .apply_token(file.path(), &TokenSource::Stored)
            .unwrap();
        assert_eq!(code_file.token, "abc123");

        code_file
            .apply_token(file.path(), &TokenSource::Argument("new".to_string()))
            .unwrap();
        assert_eq!(code_file.token, "new");
        assert_eq!(CodeFile::load(file.path()).unwrap().token, "new");
    }

    #[test]
    fn test_resolve_prefers_argument() {
        assert_eq!(
            TokenSource::resolve(Some(" abc ".to_string())),
            TokenSource::Argument("abc".to_string())
        );
    }

    #[test]
    fn test_ensure_token() {
        let mut code_file = CodeFile::parse("SH_510300_300ETF_2").unwrap();
        assert!(code_file.ensure_token().is_ok());

        code_file.instruments.push(Instrument::from_str("SZ_002139_拓邦股份_1").unwrap());
        assert!(code_file.ensure_token().is_err());
    }
}
