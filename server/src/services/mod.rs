//! Domain services used by the websocket route.
//!
//! ARCHITECTURE
//! ============
//! `relay` holds the pure presence and fan-out rules. `hub` owns the shared
//! state those rules run against and delivers their results to connections.

pub mod hub;
pub mod relay;
