//! Raster filter for Brother HL series laser printers.
//!
//! This crate turns raw monochrome bitmap pages into the PJL/PCL job
//! stream the HL series accepts, compressing every scanline with the
//! printers' proprietary delta and run-length scheme. The binary is a
//! plain stdin-to-stdout filter; the library exposes the row codec and
//! the job framing for callers that drive a printer themselves.
//!
//! # Example
//!
//! ```
//! use hl_raster::compress::compress_row;
//!
//! // Five repeated bytes collapse to one group: count byte, repeat
//! // header, repeated value.
//! let row = [0x07, 0x07, 0x07, 0x07, 0x07];
//! assert_eq!(compress_row(&row, None, 0), vec![0x01, 0x83, 0x07]);
//! ```

pub mod compress;
pub mod error;
pub mod params;
pub mod pcl;
pub mod pjl;

pub use crate::{
    compress::{compress_row, max_compressed_len},
    error::Error,
    params::{Options, Params},
};
