/// 上市公司 (`stock`)
pub mod stock;
/// 每一期的財報數值 (`stock_data`)
pub mod stock_data;
/// 財報指標 (`stock_target`)
pub mod stock_target;
