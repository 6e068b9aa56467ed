// Proxy module - HTTP relay in front of a single upstream provider
//
// Every inbound request is read in full, rewritten by the transformation
// pipeline when it is a chat request, given a credential (the caller's own or
// the next one from the pool), and forwarded once. Responses come back either
// streamed chunk by chunk or buffered, depending on the payload's stream flag.

pub mod credentials;
mod error;
mod handlers;
mod helpers;
mod relay;
mod server;
pub mod state;
pub mod transformation;


pub use server::start_proxy;
pub use state::LiveConfig;
