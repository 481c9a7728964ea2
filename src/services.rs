pub mod auth;
pub mod demand_service;
pub mod stock_service;
