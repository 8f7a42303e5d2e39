//! Gateway: HTTP server for helpdesk webhooks.
//!
//! Single port serves the webhook, a health probe and the widget host page.

mod server;

pub use server::{router, run_gateway, serve, RelayState, SERVICE_NAME};
