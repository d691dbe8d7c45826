/// 清除游標到行尾的內容
pub const ERASE_LINE: &str = "\x1b[K";

/// 游標上移 n 行
pub fn cursor_up(n: usize) -> String {
    format!("\x1b[{}A", n)
}

/// 為上一次印出的區塊加上控制碼，再印一次就會原地覆寫
///
/// 每一行前面加上清除到行尾，第一行另外先把游標上移整個區塊的行數。
/// 區塊的行數必須與上一次相同，行數改變時覆寫的位置會錯開。
pub fn refresh(frame: &str) -> String {
    let lines: Vec<&str> = frame.split('\n').collect();
    let up = cursor_up(lines.len());
    let mut out = String::with_capacity(frame.len() + up.len() + lines.len() * ERASE_LINE.len());

    for (index, line) in lines.iter().enumerate() {
        if index == 0 {
            out.push_str(&up);
        } else {
            out.push('\n');
        }
        out.push_str(ERASE_LINE);
        out.push_str(line);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh() {
        let frame = "+---+\n| a |\n+---+";
        let refreshed = refresh(frame);
        let lines: Vec<&str> = refreshed.split('\n').collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "\x1b[3A\x1b[K+---+");
        assert_eq!(lines[1], "\x1b[K| a |");
        assert_eq!(lines[2], "\x1b[K+---+");
    }

    #[test]
    fn test_refresh_every_line_erased() {
        let frame = (0..12).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        let refreshed = refresh(&frame);

        for (index, (line, original)) in refreshed.split('\n').zip(frame.split('\n')).enumerate() {
            let expected = if index == 0 {
                format!("{}{}{}", cursor_up(12), ERASE_LINE, original)
            } else {
                format!("{}{}", ERASE_LINE, original)
            };
            assert_eq!(line, expected);
        }
    }

    #[test]
    fn test_refresh_same_height_same_prefix() {
        let a = refresh("x\ny");
        let b = refresh("z\nw");

        assert!(a.starts_with("\x1b[2A"));
        assert!(b.starts_with("\x1b[2A"));
    }

    #[test]
    fn test_refresh_single_line() {
        assert_eq!(refresh("only"), "\x1b[1A\x1b[Konly");
    }
}
