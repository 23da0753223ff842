// ABOUTME: Re-exports prost messages and the generated SuperBuilder client stub.
// ABOUTME: Single source of truth for AAB middleware RPC types.

#![allow(clippy::derive_partial_eq_without_eq)]

mod messages;

pub use messages::*;

/// Generated client and server stubs for the `superbuilder_middleware.SuperBuilder` service.
pub mod superbuilder {
    include!(concat!(
        env!("OUT_DIR"),
        "/superbuilder_middleware.SuperBuilder.rs"
    ));
}

// Re-export client types under a client module
pub mod client {
    pub use super::superbuilder::super_builder_client::SuperBuilderClient;
}
