//! Fast extraction of whitespace separated numbers from raw text
//!
//! Grid blocks can hold tens of millions of values. Splitting those into
//! lines and then tokens through the generic string methods allocates and
//! walks the data several times, so the bulk data are scanned once here as
//! bytes instead.

/// Scan up to `out.len()` finite numbers from `text`, starting at `start`
///
/// Returns `(count, end)` where `count` values were written to the front of
/// `out` and `end` is the byte offset to resume from.
///
/// Rules:
///
/// - Tokens are separated by any ASCII whitespace
/// - Tokens that do not parse as a finite `f64` are skipped and not counted
/// - Fortran `D` exponents (`1.0D+01`) are accepted
/// - Scanning stops early if, after a line break, the next non-space
///   character is a letter. The returned `end` is then the start of that
///   line, so the section marker is left for the caller.
///
/// An offset that is past the end of the text or not on a character
/// boundary reads nothing.
///
/// ```rust
/// # use voltools_volumetric::reader::scan_f64;
/// let text = "1.0 2.0 x 3.0\n 4.0E+00\naugmentation occupancies 1 2\n 5.0";
/// let mut buffer = [0.0; 8];
///
/// let (count, end) = scan_f64(text, 0, &mut buffer);
/// assert_eq!(&buffer[..count], &[1.0, 2.0, 3.0, 4.0]);
/// assert!(text[end..].starts_with("augmentation"));
/// ```
pub fn scan_f64(text: &str, start: usize, out: &mut [f64]) -> (usize, usize) {
    if start >= text.len() || !text.is_char_boundary(start) {
        return (0, start.min(text.len()));
    }

    let bytes = text.as_bytes();
    let mut pos = start;
    let mut count = 0;

    // the offset of the current line and whether a token has been seen on it
    let mut line_start = start;
    let mut at_line_start = start == 0 || bytes[start - 1] == b'\n';

    while count < out.len() && pos < bytes.len() {
        match bytes[pos] {
            b'\n' => {
                pos += 1;
                line_start = pos;
                at_line_start = true;
            }
            b if b.is_ascii_whitespace() => pos += 1,
            b => {
                if at_line_start && b.is_ascii_alphabetic() {
                    return (count, line_start);
                }
                at_line_start = false;

                let token_start = pos;
                while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() {
                    pos += 1;
                }

                if let Some(value) = parse_token(&text[token_start..pos]) {
                    out[count] = value;
                    count += 1;
                }
            }
        }
    }

    (count, pos)
}

/// Parse a single token, only accepting finite values
#[inline]
fn parse_token(token: &str) -> Option<f64> {
    let value = match token.parse::<f64>() {
        Ok(v) => v,
        Err(_) if token.contains(['D', 'd']) => token.replace(['D', 'd'], "E").parse().ok()?,
        Err(_) => return None,
    };
    value.is_finite().then_some(value)
}
