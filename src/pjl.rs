//! PJL job wrapper.
//!
//! The job stream opens with a PJL preamble that binds the environment
//! (resolution, trays, media, sleep) and hands over to PCL, and closes
//! with the matching EOJ. Command spellings here are what the HL series
//! firmware accepts; several of them are model-specific and can be
//! suppressed.

use std::io::{self, Write};

use crate::params::{MediaType, Params, Resolution, SourceTray};

/// Universal Exit Language command. Drops the printer out of whatever
/// language it is in and back to PJL.
const UEL: &str = "\x1b%-12345X";

/// Job name for the JOB/EOJ pair. The printers accept any string here.
const JOB_NAME: &str = "Brother HL-XXX";

/// Emit the PJL required at the beginning of a job.
pub fn begin<W: Write>(out: &mut W, params: &Params) -> io::Result<()> {
    write!(out, "{}", UEL)?;
    writeln!(out, "@PJL")?;

    // Some models reject JOB/EOJ, so the pair can be suppressed.
    if !params.suppress_job {
        writeln!(out, "@PJL JOB NAME=\"{}\"", JOB_NAME)?;
    }

    match params.resolution {
        Resolution::Res300 => {
            if !params.suppress_ras1200mode_off {
                writeln!(out, "@PJL SET RAS1200MODE = OFF")?;
            }
            writeln!(out, "@PJL SET RESOLUTION = 300")?;
        }
        Resolution::Res1200 => {
            writeln!(out, "@PJL SET RESOLUTION = 1200")?;
            writeln!(out, "@PJL SET PAPERFEEDSPEED=HALF")?;
        }
        Resolution::Hq1200A => {
            writeln!(out, "@PJL SET RESOLUTION = 600")?;
            writeln!(out, "@PJL SET RAS1200MODE = TRUE")?;
        }
        Resolution::Hq1200B => {
            writeln!(out, "@PJL SET RESOLUTION = 1200")?;
            writeln!(out, "@PJL SET PAPERFEEDSPEED=FULL")?;
        }
        Resolution::Res600x300 => {
            writeln!(out, "@PJL SET RESOLUTION = 600")?;
        }
        Resolution::Res600 => {
            if !params.suppress_ras1200mode_off {
                writeln!(out, "@PJL SET RAS1200MODE = OFF")?;
            }
            writeln!(out, "@PJL SET RESOLUTION = 600")?;
            if params.emit_hqmmode {
                writeln!(out, "@PJL SET HQMMODE = ON")?;
            }
        }
    }

    writeln!(
        out,
        "@PJL SET ECONOMODE = {}",
        if params.econo_mode { "ON" } else { "OFF" }
    )?;

    // Manual feed is selected with a PCL command instead.
    match params.source_tray {
        SourceTray::Auto => writeln!(out, "@PJL SET SOURCETRAY = AUTO")?,
        SourceTray::Tray1 => writeln!(out, "@PJL SET SOURCETRAY = TRAY1")?,
        SourceTray::Tray2 => writeln!(out, "@PJL SET SOURCETRAY = TRAY2")?,
        SourceTray::Tray3 => writeln!(out, "@PJL SET SOURCETRAY = TRAY3")?,
        SourceTray::Tray4 => writeln!(out, "@PJL SET SOURCETRAY = TRAY4")?,
        SourceTray::Tray5 => writeln!(out, "@PJL SET SOURCETRAY = TRAY5")?,
        SourceTray::MpTray => writeln!(out, "@PJL SET SOURCETRAY = MPTRAY")?,
        SourceTray::Manual => {}
    }

    let media = match params.media_type {
        MediaType::Regular => "REGULAR",
        MediaType::Thin => "THIN",
        MediaType::Thick => "THICK",
        MediaType::Thick2 => "THICK2",
        MediaType::Transparency => "TRANSPARENCY",
        MediaType::Envelopes => "ENVELOPES",
        MediaType::EnvThick => "ENVTHICK",
        MediaType::Recycled => "RECYCLED",
    };
    writeln!(out, "@PJL SET MEDIATYPE = {}", media)?;

    // Setting the default too makes the sleep timeout stick across jobs.
    if params.time_out_sleep > 0 {
        writeln!(out, "@PJL DEFAULT AUTOSLEEP = ON")?;
        writeln!(out, "@PJL DEFAULT TIMEOUTSLEEP = {}", params.time_out_sleep)?;
        writeln!(out, "@PJL SET AUTOSLEEP = ON")?;
        writeln!(out, "@PJL SET TIMEOUTSLEEP = {}", params.time_out_sleep)?;
    }

    writeln!(out, "@PJL SET ORIENTATION = PORTRAIT")?;

    // Paper sizes the firmware takes by PJL name; the rest are set up
    // with a hard-coded PCL command in pcl::begin.
    if let Some(paper) = pjl_paper_name(params) {
        writeln!(out, "@PJL SET PAPER = {}", paper)?;
    }

    writeln!(out, "@PJL SET PAGEPROTECT = AUTO")?;
    writeln!(out, "@PJL ENTER LANGUAGE = PCL")?;
    Ok(())
}

/// Emit the PJL required at the end of a job.
pub fn end<W: Write>(out: &mut W, params: &Params) -> io::Result<()> {
    if !params.suppress_job {
        write!(out, "{}", UEL)?;
        writeln!(out, "@PJL EOJ NAME=\"{}\"", JOB_NAME)?;
    }
    // Leave the printer in a known state.
    write!(out, "{}", UEL)?;
    Ok(())
}

fn pjl_paper_name(params: &Params) -> Option<&'static str> {
    use crate::params::Paper;
    match params.paper {
        Paper::Executive => Some("EXECUTIVE"),
        Paper::JisB5 => Some("JISB5"),
        Paper::B5 => Some("B5"),
        Paper::B6 => Some("B6"),
        Paper::C5 => Some("C5"),
        Paper::Dl => Some("DL"),
        Paper::Com10 => Some("COM10"),
        Paper::Monarch => Some("MONARCH"),
        Paper::Legal | Paper::Letter | Paper::A4 | Paper::A5 | Paper::A6 => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{Duplex, Options, Paper};

    fn params_for(paper: Paper, resolution: Resolution) -> Params {
        Options {
            resolution,
            econo_mode: false,
            source_tray: SourceTray::Auto,
            media_type: MediaType::Regular,
            time_out_sleep: 0,
            paper,
            suppress_job: false,
            emit_hqmmode: false,
            suppress_ras1200mode_off: false,
            copies: 1,
            duplex: Duplex::Off,
            width: None,
            height: None,
        }
        .resolve()
        .unwrap()
    }

    fn rendered(params: &Params) -> String {
        let mut buf = Vec::new();
        begin(&mut buf, params).unwrap();
        end(&mut buf, params).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn job_opens_with_uel_and_enters_pcl() {
        let text = rendered(&params_for(Paper::Letter, Resolution::Res600));
        assert!(text.starts_with("\x1b%-12345X@PJL\n"));
        assert!(text.contains("@PJL JOB NAME=\"Brother HL-XXX\"\n"));
        assert!(text.contains("@PJL SET RAS1200MODE = OFF\n"));
        assert!(text.contains("@PJL SET RESOLUTION = 600\n"));
        assert!(text.contains("@PJL ENTER LANGUAGE = PCL\n"));
        assert!(text.ends_with("@PJL EOJ NAME=\"Brother HL-XXX\"\n\x1b%-12345X"));
    }

    #[test]
    fn hq1200a_reports_600_with_ras1200mode() {
        let text = rendered(&params_for(Paper::Letter, Resolution::Hq1200A));
        assert!(text.contains("@PJL SET RESOLUTION = 600\n"));
        assert!(text.contains("@PJL SET RAS1200MODE = TRUE\n"));
        assert!(!text.contains("PAPERFEEDSPEED"));
    }

    #[test]
    fn pjl_paper_name_only_for_sizes_without_pcl_setup() {
        let text = rendered(&params_for(Paper::Com10, Resolution::Res600));
        assert!(text.contains("@PJL SET PAPER = COM10\n"));
        let text = rendered(&params_for(Paper::A4, Resolution::Res600));
        assert!(!text.contains("@PJL SET PAPER"));
    }

    #[test]
    fn suppressed_job_omits_the_pair() {
        let mut params = params_for(Paper::Letter, Resolution::Res600);
        params.suppress_job = true;
        let text = rendered(&params);
        assert!(!text.contains("JOB NAME"));
        assert!(!text.contains("EOJ"));
        assert!(text.ends_with("\x1b%-12345X"));
    }
}
