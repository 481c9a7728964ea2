pub mod activity;
pub mod auth;
pub mod chat;
pub mod demand;
pub mod project;
pub mod rbac;
pub mod stock;
pub mod supplier;
pub mod tenancy;
