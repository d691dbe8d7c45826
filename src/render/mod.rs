/// 覆寫上一次輸出的區塊
pub mod refresh;
/// 報價表格
pub mod table;
