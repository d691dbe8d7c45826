use std::{io::Write, time::Duration};

use crate::{
    crawler::{self, QuoteSource},
    declare::Instrument,
    logging,
    render::{refresh, table},
};

/// 輸出畫面的狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// 還沒印過任何表格，直接印出
    FirstFrame,
    /// 之後每一次都覆寫上一次的表格
    SteadyState,
}

impl FrameState {
    pub fn present(&self, frame: &str) -> String {
        match self {
            FrameState::FirstFrame => frame.to_string(),
            FrameState::SteadyState => refresh::refresh(frame),
        }
    }

    /// 完成一輪後一律進入 SteadyState
    pub fn advance(self) -> Self {
        FrameState::SteadyState
    }
}

/// 定時抓取報價並在終端機原地刷新表格
///
/// 迴圈內的錯誤都不會中止程式：單一標的失敗以零值代替，寫出畫面失敗只記日誌。
pub struct Watcher<S, W> {
    source: S,
    instruments: Vec<Instrument>,
    interval: Duration,
    colorize: bool,
    state: FrameState,
    out: W,
}

impl<S: QuoteSource, W: Write> Watcher<S, W> {
    pub fn new(
        source: S,
        instruments: Vec<Instrument>,
        interval: Duration,
        colorize: bool,
        out: W,
    ) -> Self {
        Watcher {
            source,
            instruments,
            interval,
            colorize,
            state: FrameState::FirstFrame,
            out,
        }
    }

    /// 執行一輪：抓取、產生表格、依狀態決定是否加上覆寫的控制碼後輸出
    pub async fn tick(&mut self) -> String {
        let records = crawler::fetch_all(&self.source, &self.instruments).await;
        let frame = table::build(&records, self.colorize);
        let output = self.state.present(&frame);

        // 沒有印出的畫面不能當成下一次覆寫的基準
        match writeln!(self.out, "{}", output).and_then(|_| self.out.flush()) {
            Ok(_) => self.state = self.state.advance(),
            Err(why) => logging::error_file_async(format!(
                "Failed to write the quote table because {:?}",
                why
            )),
        }

        output
    }

    /// 固定間隔不斷執行，直到程式被終止
    pub async fn run(mut self) {
        logging::info_file_async(format!(
            "watching {} instruments every {:?}",
            self.instruments.len(),
            self.interval
        ));

        loop {
            self.tick().await;
            tokio::time::sleep(self.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::tests::{instruments, StubSource};
    use std::io;

    /// 寫入一律失敗的輸出
    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_tick_keeps_first_frame_when_write_fails() {
        let mut watcher = Watcher::new(
            StubSource,
            instruments(),
            Duration::from_secs(5),
            false,
            BrokenPipe,
        );

        let first = watcher.tick().await;
        assert_eq!(watcher.state, FrameState::FirstFrame);

        // 下一輪仍然是完整的畫面，不會上移游標
        let second = watcher.tick().await;
        assert!(!second.contains('\x1b'));
        assert_eq!(first, second);
        assert_eq!(watcher.state, FrameState::FirstFrame);
    }

    #[test]
    fn test_frame_state() {
        let state = FrameState::FirstFrame;

        assert_eq!(state.present("a\nb"), "a\nb");
        assert_eq!(state.advance(), FrameState::SteadyState);
        assert_eq!(
            FrameState::SteadyState.present("a\nb"),
            refresh::refresh("a\nb")
        );
        assert_eq!(
            FrameState::SteadyState.advance(),
            FrameState::SteadyState
        );
    }

    #[tokio::test]
    async fn test_tick() {
        let mut watcher = Watcher::new(
            StubSource,
            instruments(),
            Duration::from_secs(5),
            false,
            Vec::new(),
        );

        assert_eq!(watcher.state, FrameState::FirstFrame);

        let first = watcher.tick().await;
        assert!(!first.contains('\x1b'));
        assert!(first.contains("9.760 [-3.08%]"));
        assert_eq!(watcher.state, FrameState::SteadyState);

        let second = watcher.tick().await;
        let height = first.split('\n').count();
        assert!(second.starts_with(&refresh::cursor_up(height)));
        assert_eq!(second.split('\n').count(), height);
        assert_eq!(second, refresh::refresh(&first));

        let written = String::from_utf8(watcher.out.clone()).unwrap();
        assert_eq!(written, format!("{}\n{}\n", first, second));
    }
}
