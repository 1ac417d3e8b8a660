use std::io::{self, BufWriter, Read, Write};

use clap::Parser;
use log::{debug, info};

use hl_raster::{pcl, pjl, Error, Options};

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        eprintln!("hl-raster: {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Error> {
    let params = Options::parse().resolve()?;
    debug!("resolved parameters: {:?}", params);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    pjl::begin(&mut out, &params)?;
    pcl::begin(&mut out, &params)?;

    // Read, compress, and emit one page at a time until the input is
    // consumed.
    let mut page = vec![0u8; params.page_bytes()];
    let mut pages = 0usize;
    while read_page(&mut input, &mut page)? {
        pcl::page(&mut out, &params, &page)?;
        pages += 1;
    }
    info!("job finished after {} page(s)", pages);

    pjl::end(&mut out, &params)?;
    out.flush()?;
    Ok(())
}

/// Fill `page` with the next whole page of input.
///
/// Returns `Ok(false)` on a clean end of input at a page boundary. An
/// input that ends mid-page fails the job; a partial sheet must never
/// reach the printer.
fn read_page<R: Read>(input: &mut R, page: &mut [u8]) -> Result<bool, Error> {
    let mut filled = 0;
    while filled < page.len() {
        match input.read(&mut page[filled..]) {
            Ok(0) => {
                if filled == 0 {
                    return Ok(false);
                }
                return Err(Error::ShortPage {
                    got: filled,
                    expected: page.len(),
                });
            }
            Ok(n) => filled += n,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn read_page_reads_whole_pages() {
        let mut input = Cursor::new(vec![7u8; 8]);
        let mut page = [0u8; 4];
        assert!(read_page(&mut input, &mut page).unwrap());
        assert_eq!(page, [7; 4]);
        assert!(read_page(&mut input, &mut page).unwrap());
        assert!(!read_page(&mut input, &mut page).unwrap());
    }

    #[test]
    fn read_page_rejects_a_truncated_page() {
        let mut input = Cursor::new(vec![7u8; 6]);
        let mut page = [0u8; 4];
        assert!(read_page(&mut input, &mut page).unwrap());
        match read_page(&mut input, &mut page) {
            Err(Error::ShortPage { got: 2, expected: 4 }) => {}
            other => panic!("expected ShortPage, got {:?}", other.map(|_| ())),
        }
    }
}
