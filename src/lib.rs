pub mod api;
pub mod app;
pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod views;
