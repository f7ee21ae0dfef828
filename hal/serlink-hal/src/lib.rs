//! Serlink Hardware Abstraction Layer
//!
//! This crate defines the transport seams the serlink protocol engine is
//! written against. Chip-specific code implements them; the engine never
//! touches a peripheral directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Message catalog (serlink-mcb, etc.)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  serlink-protocol (framing engine)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  serlink-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  embedded-io  │       │  MockStream   │
//! │     UART      │       │   (host)      │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`stream::SerialStream`] - Non-blocking byte read/peek, write, drain
//! - [`clock::Clock`] - Monotonic millisecond counter

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod clock;
#[cfg(any(test, feature = "embedded-io"))]
pub mod io;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod stream;

// Re-export key traits at crate root for convenience
pub use clock::{Clock, Deadline};
#[cfg(any(test, feature = "embedded-io"))]
pub use io::IoStream;
pub use stream::SerialStream;
