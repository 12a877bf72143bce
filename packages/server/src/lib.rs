// SendTheLink - API Core
//
// Backend for the public link-sharing wall: submission intake, asynchronous
// security scanning, community reporting, and administrator moderation.
//
// Layout follows domain-driven design: `domains/` holds business logic,
// `kernel/` holds infrastructure traits and their implementations, `server/`
// is the HTTP edge.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
