//! Integer-only NTSC composite video signal encoding and decoding.
//!
//! An image goes in, gets turned into one field of sampled analog
//! composite signal (sync tips, color burst, quadrature modulated chroma
//! and all), and comes back out through a simulated television: sync
//! recovery, burst phase lock, quadrature demodulation, band equalization
//! and a scan onto the output raster. The round trip reproduces the
//! artifacts of consumer analog TV: dot crawl, chroma/luma crosstalk,
//! color bleed, ringing, sync jitter under noise.
//!
//! There is no floating point anywhere in the signal path and no
//! per-frame allocation; everything is `i32` fixed point against lookup
//! tables, like the hardware this imitates.
//!
//! # Example
//!
//! ```
//! use analogtv::{
//!     Config,
//!     Crt,
//!     RgbField,
//!     Subcarrier,
//! };
//!
//! let image = vec![0x00aa5500u32; 64 * 64];
//! let mut crt = Crt::new(Config::ntsc(), 256, 240);
//!
//! crt.encode_rgb(&RgbField {
//!     rgb: &image,
//!     w: 64,
//!     h: 64,
//!     raw: false,
//!     as_color: true,
//!     field: 0,
//!     subcarrier: Subcarrier::with_phase(0),
//! });
//! crt.decode(12);
//!
//! assert_eq!(crt.output().len(), 256 * 240);
//! ```
//!
//! # References
//!
//! - <https://www.nesdev.org/wiki/NTSC_video>
//! - <http://www.ifp.illinois.edu/~yuhuang/ntscdecoding.htm>

pub mod config;
mod decode;
pub mod device;
pub mod encode;
pub mod filter;
pub mod fixed;
pub mod noise;
pub mod timing;

pub use crate::{
    config::{
        ChromaPattern,
        Config,
        SystemKind,
    },
    device::Crt,
    encode::{
        NesField,
        RgbField,
        Subcarrier,
    },
};
