pub mod country_code;
pub mod country_entity;
