//! Zoho CRM source adapter

pub mod client;

pub use client::ZohoClient;
