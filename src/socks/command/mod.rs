//! SOCKS4 request/reply codec
//!
//! Handles parsing SOCKS4 requests and building replies.

mod parser;
mod reply;

pub use parser::read_request;
pub use reply::{build_reply, Reply};
