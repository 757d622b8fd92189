//! Clients - HTTP Clients for External APIs
//!
//! This module contains the notification dispatchers used by the service.

pub mod notification_client;

pub use notification_client::{LogDispatcher, WebhookDispatcher};
