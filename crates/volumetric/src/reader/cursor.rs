//! Line cursor over the raw file content

/// Forward-only cursor handing out lines by byte offset
///
/// Parsers move through the header a line at a time and hand the current
/// offset to [scan_f64()](crate::reader::scan_f64) for bulk data, then pick
/// up again wherever the scan stopped. Nothing is copied.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    text: &'a str,
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self { text, offset: 0 }
    }

    /// Current byte offset into the text
    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    /// Move to an offset returned by the numeric scanner
    pub(crate) fn seek(&mut self, offset: usize) {
        self.offset = offset.min(self.text.len());
    }

    /// Number of bytes after the current offset
    pub(crate) fn remaining(&self) -> usize {
        self.text.len() - self.offset
    }

    /// The full text being parsed
    pub(crate) fn text(&self) -> &'a str {
        self.text
    }

    /// True once every line has been handed out
    pub(crate) fn is_finished(&self) -> bool {
        self.offset >= self.text.len()
    }

    /// Next line without its terminator, `None` at the end of the text
    pub(crate) fn next_line(&mut self) -> Option<&'a str> {
        if self.is_finished() {
            return None;
        }

        let rest = &self.text[self.offset..];
        let (line, advance) = match rest.find('\n') {
            Some(i) => (&rest[..i], i + 1),
            None => (rest, rest.len()),
        };
        self.offset += advance;
        Some(line.strip_suffix('\r').unwrap_or(line))
    }

    /// Next line that is not entirely whitespace
    pub(crate) fn next_non_blank(&mut self) -> Option<&'a str> {
        while let Some(line) = self.next_line() {
            if !line.trim().is_empty() {
                return Some(line);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_and_offsets() {
        let mut cursor = Cursor::new("a\r\nb\n\n c");
        assert_eq!(cursor.next_line(), Some("a"));
        assert_eq!(cursor.offset(), 3);
        assert_eq!(cursor.remaining(), 5);
        assert_eq!(cursor.next_line(), Some("b"));
        assert_eq!(cursor.next_non_blank(), Some(" c"));
        assert!(cursor.is_finished());
        assert_eq!(cursor.next_line(), None);
    }

    #[test]
    fn seek_is_clamped() {
        let mut cursor = Cursor::new("abc");
        cursor.seek(100);
        assert!(cursor.is_finished());
        assert_eq!(cursor.remaining(), 0);
        assert_eq!(cursor.text(), "abc");
    }
}
