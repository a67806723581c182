pub mod auth;
pub mod customer;
pub mod product;
pub mod report;
