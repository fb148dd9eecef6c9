pub mod biz_service;
pub mod entitys;
pub mod util;

/// 国家集合名称
pub const COUNTRY_COLLECTION: &str = "countries";
