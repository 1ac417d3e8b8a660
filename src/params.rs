//! Job parameters and page geometry.
//!
//! Every knob the filter accepts is collected into [`Options`] (the raw
//! command line) and resolved once, before any row is processed, into an
//! immutable [`Params`] value. The tables in here mirror the printer's
//! paper and resolution behavior; all geometry is derived up front so the
//! page loop never has to re-check anything.

use clap::{Parser, ValueEnum};

use crate::error::Error;

/// Print resolution modes supported by the HL series raster path.
///
/// The two HQ1200 variants take 1200 DPI input; `HQ1200A` halves the
/// vertical resolution on the wire by duplicating every other line, and
/// `600x300` duplicates each 300 DPI input line up to 600 DPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Resolution {
    #[value(name = "300")]
    Res300,
    #[value(name = "600")]
    Res600,
    #[value(name = "1200")]
    Res1200,
    #[value(name = "HQ1200A")]
    Hq1200A,
    #[value(name = "HQ1200B")]
    Hq1200B,
    #[value(name = "600x300")]
    Res600x300,
}

impl Resolution {
    /// Horizontal margin in bytes on each side of a row.
    fn side_margin_bytes(self) -> usize {
        match self {
            Self::Res300 => 6,
            Self::Res1200 | Self::Hq1200A | Self::Hq1200B => 25,
            Self::Res600 | Self::Res600x300 => 12,
        }
    }

    /// Vertical margin in rows at the top and bottom of a page.
    fn top_margin_rows(self) -> usize {
        match self {
            Self::Res300 | Self::Res600x300 => 50,
            Self::Res1200 | Self::Hq1200A | Self::Hq1200B => 200,
            Self::Res600 => 100,
        }
    }

    /// The print head is limited to 16.64 inches worth of bytes.
    fn max_printable_bytes(self) -> usize {
        match self {
            Self::Res300 => 624,
            Self::Res1200 | Self::Hq1200A | Self::Hq1200B => 2496,
            Self::Res600 | Self::Res600x300 => 1248,
        }
    }

    /// Scale a paper dimension from dots at 120 DPI to dots at this
    /// resolution.
    fn scale(self, width: usize, height: usize) -> (usize, usize) {
        match self {
            Self::Res300 => (width * 5 / 2, height * 5 / 2),
            Self::Res1200 | Self::Hq1200A | Self::Hq1200B => (width * 10, height * 10),
            Self::Res600x300 => (width * 5, height * 5 / 2),
            Self::Res600 => (width * 5, height * 5),
        }
    }
}

/// Paper sizes known to the printers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Paper {
    #[value(name = "LEGAL")]
    Legal,
    #[value(name = "LETTER")]
    Letter,
    #[value(name = "A4")]
    A4,
    #[value(name = "EXECUTIVE")]
    Executive,
    #[value(name = "JISB5")]
    JisB5,
    #[value(name = "B5")]
    B5,
    #[value(name = "A5")]
    A5,
    #[value(name = "B6")]
    B6,
    #[value(name = "A6")]
    A6,
    #[value(name = "C5")]
    C5,
    #[value(name = "DL")]
    Dl,
    #[value(name = "COM10")]
    Com10,
    #[value(name = "MONARCH")]
    Monarch,
}

impl Paper {
    /// Printable width and height in dots at 120 DPI.
    fn dots(self) -> (usize, usize) {
        match self {
            Self::Legal => (1020, 1680),
            Self::Letter => (1020, 1320),
            Self::A4 => (992, 1403),
            Self::Executive => (870, 1260),
            Self::JisB5 => (860, 1214),
            Self::B5 => (832, 1180),
            Self::A5 => (701, 992),
            Self::B6 => (590, 832),
            Self::A6 => (496, 701),
            Self::C5 => (767, 1082),
            Self::Dl => (520, 1039),
            Self::Com10 => (495, 1140),
            Self::Monarch => (465, 900),
        }
    }
}

/// Input trays selectable for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceTray {
    #[value(name = "AUTO")]
    Auto,
    #[value(name = "TRAY1")]
    Tray1,
    #[value(name = "TRAY2")]
    Tray2,
    #[value(name = "TRAY3")]
    Tray3,
    #[value(name = "TRAY4")]
    Tray4,
    #[value(name = "TRAY5")]
    Tray5,
    #[value(name = "MANUAL")]
    Manual,
    #[value(name = "MPTRAY")]
    MpTray,
}

/// Media types understood by the fuser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MediaType {
    #[value(name = "REGULAR")]
    Regular,
    #[value(name = "THIN")]
    Thin,
    #[value(name = "THICK")]
    Thick,
    #[value(name = "THICK2")]
    Thick2,
    #[value(name = "TRANSPARENCY")]
    Transparency,
    #[value(name = "ENVELOPES")]
    Envelopes,
    #[value(name = "ENVTHICK")]
    EnvThick,
    #[value(name = "RECYCLED")]
    Recycled,
}

/// Duplex binding modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Duplex {
    #[value(name = "OFF")]
    Off,
    #[value(name = "LONG")]
    Long,
    #[value(name = "SHORT")]
    Short,
}

/// Raw job options as given on the command line.
///
/// Reads 1-bit-per-pixel pages on stdin and writes the job stream for the
/// printer to stdout.
#[derive(Debug, Parser)]
#[command(name = "hl-raster", version, about)]
pub struct Options {
    /// Print resolution
    #[arg(long, value_enum, default_value = "600")]
    pub resolution: Resolution,

    /// Enable the toner-saving feature
    #[arg(long)]
    pub econo_mode: bool,

    /// Input tray
    #[arg(long, value_enum, default_value = "AUTO")]
    pub source_tray: SourceTray,

    /// Media type
    #[arg(long, value_enum, default_value = "REGULAR")]
    pub media_type: MediaType,

    /// Minutes before auto-sleep, 0 leaves the printer default alone
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=99))]
    pub time_out_sleep: u32,

    /// Paper size
    #[arg(long, value_enum, default_value = "LETTER")]
    pub paper: Paper,

    /// Do not emit the PJL JOB/EOJ pair
    #[arg(long)]
    pub suppress_job: bool,

    /// Emit HQMMODE at 600 DPI
    #[arg(long)]
    pub emit_hqmmode: bool,

    /// Do not emit RAS1200MODE = OFF at 300 and 600 DPI
    #[arg(long)]
    pub suppress_ras1200mode_off: bool,

    /// Number of copies
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=999))]
    pub copies: u32,

    /// Duplex binding
    #[arg(long, value_enum, default_value = "OFF")]
    pub duplex: Duplex,

    /// Input data width in pixels, defaults to the full paper width
    #[arg(long)]
    pub width: Option<usize>,

    /// Input data height in rows, defaults to the full paper height
    #[arg(long)]
    pub height: Option<usize>,
}

/// Resolved, validated job parameters.
///
/// Built once by [`Options::resolve`] and shared read-only with the page
/// driver and the row codec.
#[derive(Debug, Clone)]
pub struct Params {
    pub resolution: Resolution,
    pub econo_mode: bool,
    pub source_tray: SourceTray,
    pub media_type: MediaType,
    pub time_out_sleep: u32,
    pub paper: Paper,
    pub suppress_job: bool,
    pub emit_hqmmode: bool,
    pub suppress_ras1200mode_off: bool,
    pub copies: u32,
    pub duplex: Duplex,
    /// Input data width in pixels.
    pub width: usize,
    /// Input data height in rows.
    pub height: usize,
    /// Left-margin zero fill in bytes which centers the input data on the
    /// paper.
    pub padding: usize,
}

/// The part of a page buffer that actually reaches the drum: the margins
/// around it are cut away before compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Byte offset of the first printable byte in the page buffer.
    pub offset: usize,
    /// Printable bytes per row.
    pub row_bytes: usize,
    /// Printable rows per page.
    pub rows: usize,
}

impl Options {
    /// Fill in defaults, validate, and derive the page geometry.
    ///
    /// Width and height default to the full paper size at the selected
    /// resolution and must not exceed it. Padding centers a narrower
    /// input on the paper, rounded down to a whole byte.
    pub fn resolve(self) -> Result<Params, Error> {
        let (paper_width, paper_height) = {
            let (w, h) = self.paper.dots();
            self.resolution.scale(w, h)
        };

        let width = self.width.unwrap_or(paper_width);
        let height = self.height.unwrap_or(paper_height);
        if width == 0 || width > paper_width {
            return Err(Error::InvalidParam(format!(
                "width {} does not fit paper width {}",
                width, paper_width
            )));
        }
        if height == 0 || height > paper_height {
            return Err(Error::InvalidParam(format!(
                "height {} does not fit paper height {}",
                height, paper_height
            )));
        }

        let params = Params {
            resolution: self.resolution,
            econo_mode: self.econo_mode,
            source_tray: self.source_tray,
            media_type: self.media_type,
            time_out_sleep: self.time_out_sleep,
            paper: self.paper,
            suppress_job: self.suppress_job,
            emit_hqmmode: self.emit_hqmmode,
            suppress_ras1200mode_off: self.suppress_ras1200mode_off,
            copies: self.copies,
            duplex: self.duplex,
            width,
            height,
            padding: ((paper_width - width) / 2) >> 3,
        };

        // Reject pages entirely consumed by the margins now, so the page
        // loop can slice without checking.
        if params.printable_window().is_none() {
            return Err(Error::InvalidParam(format!(
                "input of {}x{} leaves no printable area at this resolution",
                width, height
            )));
        }

        Ok(params)
    }
}

impl Params {
    /// Length of one input row in bytes.
    pub fn row_length(&self) -> usize {
        (self.width + 7) >> 3
    }

    /// Size of one whole input page in bytes.
    pub fn page_bytes(&self) -> usize {
        self.row_length() * self.height
    }

    /// Printable part of a page, or `None` when the margins leave
    /// nothing.
    ///
    /// Horizontal and vertical margins are 1/6 inch; their size in bytes
    /// and rows depends on the resolution mode, as does the print head's
    /// byte limit. Padding counts against that limit except at 300 DPI.
    pub fn printable_window(&self) -> Option<Window> {
        let side = self.resolution.side_margin_bytes();
        let top = self.resolution.top_margin_rows();
        let row_length = self.row_length();

        let mut row_bytes = row_length.checked_sub(2 * side)?;
        let cap = self.resolution.max_printable_bytes();
        match self.resolution {
            Resolution::Res300 => row_bytes = row_bytes.min(cap),
            _ => {
                if row_bytes + self.padding > cap {
                    row_bytes = cap.checked_sub(self.padding)?;
                }
            }
        }
        let rows = self.height.checked_sub(2 * top)?;
        if row_bytes == 0 || rows == 0 {
            return None;
        }

        Some(Window {
            offset: top * row_length + side,
            row_bytes,
            rows,
        })
    }
}
