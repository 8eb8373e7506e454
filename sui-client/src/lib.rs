pub mod apis;
pub mod field_data;
pub mod gateway;
pub mod transaction;
