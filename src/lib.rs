pub mod app;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod filter;
pub mod forms;
pub mod modal;
pub mod models;
pub mod repository;
pub mod toast;
pub mod tracking;
pub mod views;
