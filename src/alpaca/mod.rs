//! Alpaca module - Client implementation for the Alpaca trading and data APIs

pub mod auth;
pub mod client;
pub mod messages;
pub mod rest;

pub use client::AlpacaClient;
