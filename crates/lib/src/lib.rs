//! Helpdesk relay library — config, model and helpdesk clients, reply filter,
//! widget loader, and the webhook gateway used by the CLI.

pub mod config;
pub mod gateway;
pub mod helpdesk;
pub mod init;
pub mod llm;
pub mod relay;
pub mod widget;
