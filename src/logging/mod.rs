use chrono::{format::DelayedFormat, Local};
use concat_string::concat_string;
use crossbeam_channel::{unbounded, Sender};
use once_cell::sync::Lazy;
use std::{
    fmt::Write as _,
    fs::{self, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    sync::Once,
    thread,
};

/// 日誌檔存放的目錄
const LOG_DIR: &str = "log";
/// 累積到這個長度就寫入檔案一次
const FLUSH_THRESHOLD: usize = 2048;

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new("default"));
static LOG_DIR_UNAVAILABLE: Once = Once::new();

/// 依等級分檔的非同步日誌
///
/// 每個等級各有一條 channel 與一個背景線程，呼叫端只負責把訊息丟進 channel，
/// 寫檔由背景線程批次處理，不會卡住報價的輪詢。
pub struct Logger {
    info_writer: Sender<String>,
    warn_writer: Sender<String>,
    error_writer: Sender<String>,
    debug_writer: Sender<String>,
}

impl Logger {
    pub fn new(log_name: &str) -> Self {
        Logger {
            info_writer: Self::create_writer(&concat_string!(log_name, "_info")),
            warn_writer: Self::create_writer(&concat_string!(log_name, "_warn")),
            error_writer: Self::create_writer(&concat_string!(log_name, "_error")),
            debug_writer: Self::create_writer(&concat_string!(log_name, "_debug")),
        }
    }

    pub fn info(&self, log: String) {
        self.send(log, &self.info_writer);
    }

    pub fn warn(&self, log: String) {
        self.send(log, &self.warn_writer);
    }

    pub fn error(&self, log: String) {
        self.send(log, &self.error_writer);
    }

    pub fn debug(&self, log: String) {
        self.send(log, &self.debug_writer);
    }

    fn send(&self, msg: String, writer: &Sender<String>) {
        if let Err(why) = writer.send(msg) {
            error_console(why.to_string());
        }
    }

    fn create_writer(log_name: &str) -> Sender<String> {
        Self::spawn_writer(Self::get_log_path(log_name))
    }

    /// 沒有可用的日誌檔時，背景線程只負責清空 channel，訊息直接丟棄
    fn spawn_writer(log_path: Option<PathBuf>) -> Sender<String> {
        let (tx, rx) = unbounded::<String>();
        let log_path = match log_path {
            Some(p) => p,
            None => {
                // 只提示一次，避免 stderr 與終端機上的表格互相干擾
                LOG_DIR_UNAVAILABLE.call_once(|| {
                    error_console(format!("Failed to create the log directory {}", LOG_DIR))
                });
                thread::spawn(move || for _ in &rx {});
                return tx;
            }
        };

        // 寫入檔案的操作使用另一個線程處理
        thread::spawn(move || {
            let file = match OpenOptions::new().create(true).append(true).open(&log_path) {
                Ok(f) => f,
                Err(why) => {
                    error_console(format!(
                        "Failed to open log file({}) because {:?}",
                        log_path.display(),
                        why
                    ));
                    for _ in &rx {}
                    return;
                }
            };

            let mut writer = BufWriter::new(file);
            let mut line = String::with_capacity(FLUSH_THRESHOLD);

            for received in &rx {
                if writeln!(&mut line, "{} {}", Local::now().format("%F %X%.6f"), received)
                    .is_err()
                {
                    continue;
                }

                if rx.is_empty() || line.len() >= FLUSH_THRESHOLD {
                    if let Err(why) = writer.write_all(line.as_bytes()) {
                        error_console(format!(
                            "Failed to write to log file. because:{:#?}\r\nmsg:{}",
                            why, line
                        ));
                    }

                    if let Err(why) = writer.flush() {
                        error_console(format!("Failed to flush log file. because:{:#?}", why));
                    }

                    line.clear();
                }
            }
        });

        tx
    }

    fn get_log_path(name: &str) -> Option<PathBuf> {
        let path = Path::new(LOG_DIR);

        if !path.exists() {
            fs::create_dir_all(path).ok()?;
        }

        let mut log_path = PathBuf::from(path);
        log_path.push(format!("{}_{}.log", Local::now().format("%Y-%m-%d"), name));

        Some(log_path)
    }
}

pub fn info_file_async(log: String) {
    LOGGER.info(log);
}

pub fn warn_file_async(log: String) {
    LOGGER.warn(log);
}

pub fn error_file_async(log: String) {
    LOGGER.error(log);
}

pub fn debug_file_async(log: String) {
    LOGGER.debug(log);
}

pub fn info_console(log: String) {
    println!(
        "{} Info {}",
        Local::now().format("%Y-%m-%d %H:%M:%S.%3f"),
        log
    );
}

pub fn error_console(log: String) {
    eprintln!(
        "{} Error {}",
        DelayedFormat::to_string(&Local::now().format("%Y-%m-%d %H:%M:%S.%3f")),
        log
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_log_path() {
        let path = Logger::get_log_path("unit_test").unwrap();
        let file_name = path.file_name().unwrap().to_string_lossy().to_string();

        assert!(path.starts_with(LOG_DIR));
        assert!(file_name.ends_with("_unit_test.log"));
        assert!(file_name.starts_with(&Local::now().format("%Y-%m-%d").to_string()));
    }

    #[test]
    fn test_writer_without_log_file_accepts_messages() {
        let writer = Logger::spawn_writer(None);

        for i in 0..3 {
            assert!(writer.send(format!("dropped {}", i)).is_ok());
        }
    }

    #[tokio::test]
    async fn test_file_async() {
        info_file_async("開始 test_file_async".to_string());
        warn_file_async("warn line".to_string());
        debug_file_async("結束 test_file_async".to_string());
    }
}
