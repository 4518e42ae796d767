//! A `no_std`, no-alloc driver core for Uniwill notebook embedded controllers.
//!
//! The EC is only reachable through a slow firmware method that reads or
//! writes one byte at a time and may silently fail. This crate puts a cached,
//! suspend-aware register map on top of that method and builds the notebook
//! features on the map.
//!
//! # Features
//!
//! - **Cached register map** - Per-register cache with readable, writeable and volatile classes
//! - **Suspend aware** - Cache-only mode while the EC sleeps, ordered replay on resume
//! - **Fan control** - Automatic, manual duty and full speed, with rollback on failure
//! - **Lightbar** - AC and battery banks kept in lockstep
//! - **Battery** - Charge end threshold, health and alert forwarding
//! - **Hotkeys** - Event keymap and an ordered observer chain with veto
//!
//! # Cargo features
//!
//! - `tracing` - Log through `tracing`. Without it logging compiles away and
//!   the crate needs no allocator.
//! - `defmt` - `defmt::Format` on public types
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   borrow   ┌─────────────────┐   bytes   ┌───────────────────┐
//! │ Feature          │───────────▶│ RegisterMap     │──────────▶│ RegisterTransport │
//! │ controllers      │ RegisterIo │                 │           │ (firmware method) │
//! │                  │            │ cache + dirty   │           │                   │
//! └──────────────────┘            └─────────────────┘           └───────────────────┘
//!                                  Live / CacheOnly / Bypass
//! ```
//!
//! - **Live** reads and writes go to the EC and update the cache
//! - **CacheOnly** reads come from the cache and writes are queued as dirty
//! - **sync** replays queued writes in address order and returns to Live
//! - **Bypass** talks to the EC directly without touching the cache
//!
//! Volatile registers (sensors, self-clearing triggers, status bits) are never
//! cached, so their values are saved and restored by the device itself across
//! suspend.
//!
//! # Example
//!
//! ```rust,no_run
//! use uniwill_ec::prelude::*;
//!
//! struct Wmi;
//!
//! impl MethodCall for Wmi {
//!     fn get_set_ulong(&mut self, input: &[u8; 8]) -> Result<u32, TransportError> {
//!         // Evaluate the firmware method here...
//!         let _ = input;
//!         Ok(0)
//!     }
//! }
//!
//! # fn main() -> Result<(), EcError> {
//! let dev = DeviceBuilder::new()
//!     .method_call(Wmi)
//!     .default_variant()
//!     .attach()?;
//! let dev = SharedDevice::new(dev);
//!
//! dev.with(|dev| dev.fan().set_mode(FanState::Manual(128)))?;
//! let cpu = dev.with(|dev| dev.temperature(TempChannel::Cpu))?;
//! let _ = cpu;
//!
//! // Around system sleep
//! dev.with(|dev| dev.on_suspend())?;
//! dev.with(|dev| dev.on_resume())?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![cfg_attr(not(test), no_std)]

pub mod ec;

pub mod prelude {
    pub use crate::ec::prelude::*;
}
