//! Request handlers for the proxy
//!
//! `proxy_handler` takes every path and method; `reload_handler` owns
//! `POST /reload`.

mod reload;
mod request;

pub(crate) use reload::reload_handler;
pub(crate) use request::proxy_handler;
