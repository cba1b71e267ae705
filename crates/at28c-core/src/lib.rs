//! at28c-core - Core library for AT28C256-compatible chip programming
//!
//! This crate drives a USB-serial bridge that exposes a parallel EEPROM or
//! SRAM through four single-byte commands (read, write, SDP on, SDP off).
//! It is `no_std` compatible (it needs `alloc`) and never touches the
//! filesystem: images are plain slices and downloads go to an [`ImageSink`].
//!
//! # Features
//!
//! - `std` - Enable standard library support (`std::error::Error`,
//!   [`StdDelay`](tester::StdDelay))
//!
//! # Example
//!
//! ```ignore
//! use at28c_core::{image, link::Link, progress::NoProgress};
//!
//! fn dump<T: at28c_core::transport::Transport>(transport: T) -> at28c_core::Result<Vec<u8>> {
//!     let mut link = Link::new(transport);
//!     let mut data = Vec::new();
//!     image::download(&mut link, 0, None, &mut data, &mut NoProgress)?;
//!     Ok(data)
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod error;
pub mod image;
pub mod link;
pub mod progress;
pub mod protocol;
pub mod range;
pub mod sweep;
pub mod tester;
pub mod transport;

#[cfg(test)]
mod mock;

pub use error::{Error, Result};
pub use image::ImageSink;
pub use link::Link;
pub use range::AddressRange;
pub use sweep::{Mismatch, MismatchKind, Phase, SweepResult};
pub use transport::Transport;
