//! PCL page emission.
//!
//! Each page is sent as one long parameterized command: `ESC * b 1030 m`
//! selects the proprietary compression method, a continuing `w` parameter
//! carries each block of compressed raster rows, and an upper-case `M`
//! parameter concludes the command before the form feed. Blocks are
//! bounded to what the printer's receive buffer holds: 128 rows or 16 kB,
//! whichever comes first.

use std::io::{self, Write};

use log::debug;

use crate::compress::{compress_row, UNCHANGED_ROW};
use crate::params::{Paper, Params, Resolution};

/// A transmission block holds at most this many bytes.
const BLOCK_MAX_BYTES: usize = 16384;

/// A transmission block holds at most this many rows.
const BLOCK_MAX_ROWS: usize = 128;

/// Emit the PCL required at the beginning of a job.
pub fn begin<W: Write>(out: &mut W, params: &Params) -> io::Result<()> {
    // Printer Reset. This resets the PCL environment, not the device.
    write!(out, "\x1bE")?;

    // Some page sizes are set up with PJL and some with a hard-coded PCL
    // command: page size 4096 (undocumented) then the standard size code,
    // 6 lines per inch, and a one-line top margin.
    match params.paper {
        Paper::Legal => write!(out, "\x1b&l4096a3a6d1E")?,
        Paper::Letter => write!(out, "\x1b&l4096a2a6d1E")?,
        Paper::A4 => write!(out, "\x1b&l4096a26a6d1E")?,
        Paper::A5 => write!(out, "\x1b&l4096a25a6d1E")?,
        Paper::A6 => write!(out, "\x1b&l4096a24a6d1E")?,
        _ => {}
    }

    // Unit of Measure and Raster Graphics Resolution.
    match params.resolution {
        Resolution::Res300 => {
            write!(out, "\x1b&u300D")?;
            write!(out, "\x1b*t300R")?;
        }
        Resolution::Res1200 | Resolution::Hq1200B => {
            write!(out, "\x1b&u1200D")?;
            write!(out, "\x1b*t1200R")?;
        }
        Resolution::Hq1200A => {
            write!(out, "\x1b&u1200D")?;
            write!(out, "\x1b*t600R")?;
        }
        Resolution::Res600 | Resolution::Res600x300 => {
            write!(out, "\x1b&u600D")?;
            write!(out, "\x1b*t600R")?;
        }
    }

    if params.source_tray == crate::params::SourceTray::Manual {
        write!(out, "\x1b&l2H")?;
    }

    if params.copies > 1 {
        write!(out, "\x1b&l{}X", params.copies)?;
    }

    match params.duplex {
        crate::params::Duplex::Long => write!(out, "\x1b&l1S")?,
        crate::params::Duplex::Short => write!(out, "\x1b&l2S")?,
        crate::params::Duplex::Off => {}
    }

    Ok(())
}

/// Compress and emit one page of raw 1-bpp data.
///
/// `data` must hold exactly one whole page, `params.page_bytes()` long.
/// Only the printable window inside the margins reaches the wire; each
/// row is delta-compressed against the raw bytes of the row above it,
/// except for the first row of a transmission block, since a new block
/// resets the printer's reference row.
pub fn page<W: Write>(out: &mut W, params: &Params, data: &[u8]) -> io::Result<()> {
    assert!(
        data.len() == params.page_bytes(),
        "page buffer of {} bytes, expected {}",
        data.len(),
        params.page_bytes()
    );

    let window = params
        .printable_window()
        .expect("params were validated at resolve time");
    let row_length = params.row_length();
    debug!(
        "page: {} printable rows of {} bytes, padding {}",
        window.rows, window.row_bytes, params.padding
    );

    // Begin the continuing Set Compression Method command. 1030 is the
    // proprietary delta-row method; the lower-case parameter character
    // keeps the command open for the raster data that follows.
    write!(out, "\x1b*b1030m")?;

    let row_at = |row: usize| {
        let start = window.offset + row * row_length;
        &data[start..start + window.row_bytes]
    };

    let mut block = RasterBlock::new();
    for row in 0..window.rows {
        // HQ1200A halves the vertical rate on the wire: odd rows are sent
        // as duplicates of the row above and their input is dropped.
        if params.resolution == Resolution::Hq1200A && row % 2 == 1 {
            block.append(out, &[UNCHANGED_ROW])?;
            continue;
        }

        let previous = if block.rows() < BLOCK_MAX_ROWS && row > 0 {
            Some(row_at(row - 1))
        } else {
            None
        };
        let compressed = compress_row(row_at(row), previous, params.padding);
        block.append(out, &compressed)?;

        // 600x300 doubles each input line to reach the 600 DPI line rate.
        if params.resolution == Resolution::Res600x300 {
            block.append(out, &[UNCHANGED_ROW])?;
        }
    }
    block.finish(out)?;

    // Conclude the command (upper-case parameter) and eject the page.
    write!(out, "1030M\x0c")?;
    Ok(())
}

/// Accumulates compressed rows into bounded transmission blocks.
///
/// Each flushed block is one continuing Transfer Raster Data parameter:
/// the decimal byte length plus 2, a lower-case `w`, a zero byte, one
/// byte holding the row count, then the raw block bytes.
struct RasterBlock {
    buf: Vec<u8>,
    rows: usize,
}

impl RasterBlock {
    fn new() -> Self {
        RasterBlock {
            buf: Vec::with_capacity(BLOCK_MAX_BYTES),
            rows: 0,
        }
    }

    /// Rows currently buffered, before any flush this append may cause.
    fn rows(&self) -> usize {
        self.rows
    }

    /// Append one compressed row, flushing first if the block is full by
    /// bytes or by rows.
    fn append<W: Write>(&mut self, out: &mut W, row: &[u8]) -> io::Result<()> {
        if self.buf.len() + row.len() > BLOCK_MAX_BYTES || self.rows >= BLOCK_MAX_ROWS {
            self.flush(out)?;
        }
        self.buf.extend_from_slice(row);
        self.rows += 1;
        Ok(())
    }

    fn flush<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        debug!("block: {} rows, {} bytes", self.rows, self.buf.len());
        write!(out, "{}w", self.buf.len() + 2)?;
        out.write_all(&[0, self.rows as u8])?;
        out.write_all(&self.buf)?;
        self.buf.clear();
        self.rows = 0;
        Ok(())
    }

    /// Flush whatever partial block remains at the end of a page.
    fn finish(mut self, out: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            self.flush(out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{Duplex, MediaType, SourceTray};

    /// Hand-built params with no padding, so row encodings stay exact.
    /// Geometry validation is covered by the params tests.
    fn params(resolution: Resolution, width: usize, height: usize) -> Params {
        Params {
            resolution,
            econo_mode: false,
            source_tray: SourceTray::Auto,
            media_type: MediaType::Regular,
            time_out_sleep: 0,
            paper: Paper::Letter,
            suppress_job: false,
            emit_hqmmode: false,
            suppress_ras1200mode_off: false,
            copies: 1,
            duplex: Duplex::Off,
            width,
            height,
            padding: 0,
        }
    }

    /// 200 pixels makes 25-byte rows with a single printable byte at 600
    /// DPI; `extra` printable rows beyond the vertical margins.
    fn narrow_600(extra: usize) -> Params {
        params(Resolution::Res600, 200, 200 + extra)
    }

    fn fill_column(params: &Params, values: &[u8]) -> Vec<u8> {
        let window = params.printable_window().unwrap();
        let mut data = vec![0u8; params.page_bytes()];
        for (row, &v) in values.iter().enumerate() {
            data[window.offset + row * params.row_length()] = v;
        }
        data
    }

    #[test]
    fn block_framer_header_layout() {
        let mut out = Vec::new();
        let mut block = RasterBlock::new();
        block.append(&mut out, &[0x01, 0x00, 0x42]).unwrap();
        block.append(&mut out, &[0x00]).unwrap();
        block.finish(&mut out).unwrap();
        // 4 data bytes + 2, 'w', zero byte, 2 rows, then the data.
        assert_eq!(out, b"6w\x00\x02\x01\x00\x42\x00");
    }

    #[test]
    fn block_framer_flushes_at_row_limit() {
        let mut out = Vec::new();
        let mut block = RasterBlock::new();
        for _ in 0..BLOCK_MAX_ROWS + 1 {
            block.append(&mut out, &[0xff]).unwrap();
        }
        // The 129th row triggered a flush of the first 128.
        assert!(out.starts_with(b"130w\x00\x80"));
        assert_eq!(block.rows(), 1);
        block.finish(&mut out).unwrap();
        assert!(out.ends_with(b"3w\x00\x01\xff"));
    }

    #[test]
    fn block_framer_flushes_at_byte_limit() {
        let mut out = Vec::new();
        let mut block = RasterBlock::new();
        block.append(&mut out, &vec![0xaa; BLOCK_MAX_BYTES - 10]).unwrap();
        assert!(out.is_empty());
        // 11 more bytes would overflow, so the first row goes out alone.
        block.append(&mut out, &vec![0xbb; 11]).unwrap();
        assert!(out.starts_with(format!("{}w", BLOCK_MAX_BYTES - 10 + 2).as_bytes()));
        block.finish(&mut out).unwrap();
        assert!(out.ends_with(b"13w\x00\x01\xbb\xbb\xbb\xbb\xbb\xbb\xbb\xbb\xbb\xbb\xbb"));
    }

    #[test]
    fn blank_page_is_one_sentinel_per_row() {
        let params = narrow_600(1);
        let data = vec![0u8; params.page_bytes()];
        let mut out = Vec::new();
        page(&mut out, &params, &data).unwrap();
        let mut expected = Vec::new();
        expected.extend_from_slice(b"\x1b*b1030m");
        expected.extend_from_slice(b"3w\x00\x01\xff");
        expected.extend_from_slice(b"1030M\x0c");
        assert_eq!(out, expected);
    }

    #[test]
    fn new_block_drops_the_reference_row() {
        // 129 identical non-zero rows: the first and the 129th open a
        // block and must be fully encoded, everything between collapses
        // to the unchanged-row sentinel.
        let params = narrow_600(129);
        let data = fill_column(&params, &[0x42; 129]);
        let mut out = Vec::new();
        page(&mut out, &params, &data).unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(b"\x1b*b1030m");
        expected.extend_from_slice(b"132w\x00\x80");
        expected.extend_from_slice(&[0x01, 0x00, 0x42]);
        expected.extend_from_slice(&[UNCHANGED_ROW; 127]);
        expected.extend_from_slice(b"5w\x00\x01");
        expected.extend_from_slice(&[0x01, 0x00, 0x42]);
        expected.extend_from_slice(b"1030M\x0c");
        assert_eq!(out, expected);
    }

    #[test]
    fn hq1200a_sends_odd_rows_as_duplicates() {
        let params = params(Resolution::Hq1200A, 408, 404);
        let window = params.printable_window().unwrap();
        assert_eq!(window.rows, 4);
        // Distinct values per input row; odd rows are dropped.
        let data = fill_column(&params, &[0x11, 0x22, 0x33, 0x44]);
        let mut out = Vec::new();
        page(&mut out, &params, &data).unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(b"\x1b*b1030m");
        expected.extend_from_slice(b"10w\x00\x04");
        expected.extend_from_slice(&[0x01, 0x00, 0x11]); // row 0, no reference
        expected.push(UNCHANGED_ROW); // row 1 duplicated
        expected.extend_from_slice(&[0x01, 0x00, 0x33]); // row 2 vs raw row 1
        expected.push(UNCHANGED_ROW); // row 3 duplicated
        expected.extend_from_slice(b"1030M\x0c");
        assert_eq!(out, expected);
    }

    #[test]
    fn res600x300_duplicates_every_row() {
        let params = params(Resolution::Res600x300, 200, 102);
        let window = params.printable_window().unwrap();
        assert_eq!(window.rows, 2);
        let data = fill_column(&params, &[0x11, 0x11]);
        let mut out = Vec::new();
        page(&mut out, &params, &data).unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(b"\x1b*b1030m");
        expected.extend_from_slice(b"8w\x00\x04");
        expected.extend_from_slice(&[0x01, 0x00, 0x11]);
        expected.push(UNCHANGED_ROW);
        expected.push(UNCHANGED_ROW); // row 1 equals row 0
        expected.push(UNCHANGED_ROW);
        expected.extend_from_slice(b"1030M\x0c");
        assert_eq!(out, expected);
    }

    #[test]
    fn begin_sets_page_size_and_resolution() {
        let params = params(Resolution::Res600, 200, 201);
        let mut out = Vec::new();
        begin(&mut out, &params).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("\x1bE"));
        assert!(text.contains("\x1b&l4096a2a6d1E"));
        assert!(text.contains("\x1b&u600D"));
        assert!(text.contains("\x1b*t600R"));
        assert!(!text.contains("\x1b&l2H"));
    }

    #[test]
    fn begin_emits_copies_and_duplex() {
        let mut p = params(Resolution::Res300, 200, 150);
        p.copies = 3;
        p.duplex = Duplex::Long;
        p.source_tray = SourceTray::Manual;
        let mut out = Vec::new();
        begin(&mut out, &p).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\x1b&u300D"));
        assert!(text.contains("\x1b*t300R"));
        assert!(text.contains("\x1b&l2H"));
        assert!(text.contains("\x1b&l3X"));
        assert!(text.contains("\x1b&l1S"));
    }
}
