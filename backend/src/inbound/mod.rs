//! Inbound adapters that translate external requests into dispatch-layer
//! calls while keeping framework details at the edge.

pub mod http;
