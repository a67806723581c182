// src/handlers.rs

pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod products;
pub mod upload;
pub mod users;
