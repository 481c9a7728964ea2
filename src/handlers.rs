pub mod activity;
pub mod auth;
pub mod chat;
pub mod demands;
pub mod personnel;
pub mod projects;
pub mod rbac;
pub mod stock;
pub mod suppliers;
pub mod tenancy;
