pub mod ad_unit;
pub mod bid;
pub mod context;
pub mod http;
