pub mod auth;
pub mod customer_service;
pub mod policy;
pub mod product_service;
pub mod report_service;
pub mod storage;
pub mod user_service;
