//! Shared helpers

pub mod net;

pub use net::{bind_listeners, bind_tcp_listener};
