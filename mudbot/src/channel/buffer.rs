//! Pattern buffer for accumulating server output.
//!
//! Output is stored with ANSI escape sequences removed, since kmud colours
//! exit lists and prompts. A match consumes the buffer through the end of the
//! matched text, so a prompt is never matched twice.

use std::fmt::{self, Debug};

use bytes::{Buf, BufMut, BytesMut};
use vte::{Parser, Perform};

use super::patterns::{Match, PatternSet};

/// Buffer for accumulating output and searching it for tagged patterns.
pub struct PatternBuffer {
    /// Cleaned, not yet consumed output.
    buffer: BytesMut,

    /// Terminal parser; holds any escape sequence cut off at a chunk boundary.
    parser: Parser,

    /// Maximum number of unconsumed bytes retained.
    search_depth: usize,
}

/// Keeps printable text and line structure, drops everything else.
struct Printer<'a> {
    out: &'a mut BytesMut,
}

impl Perform for Printer<'_> {
    fn print(&mut self, c: char) {
        let mut utf8 = [0u8; 4];
        self.out.put_slice(c.encode_utf8(&mut utf8).as_bytes());
    }

    fn execute(&mut self, byte: u8) {
        if matches!(byte, b'\n' | b'\r' | b'\t') {
            self.out.put_u8(byte);
        }
    }
}

impl PatternBuffer {
    /// Create a new pattern buffer retaining at most `search_depth` bytes.
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(search_depth.min(64 * 1024)),
            parser: Parser::new(),
            search_depth,
        }
    }

    /// Extend the buffer with new data, stripping ANSI escape codes.
    pub fn extend(&mut self, data: &[u8]) {
        let mut printer = Printer {
            out: &mut self.buffer,
        };
        self.parser.advance(&mut printer, data);

        // Only the tail can hold a prompt we have not seen yet.
        if self.buffer.len() > self.search_depth {
            let excess = self.buffer.len() - self.search_depth;
            self.buffer.advance(excess);
        }
    }

    /// Search for the first matching pattern and consume through its end.
    pub fn search<T: Copy + Debug>(&mut self, patterns: &PatternSet<T>) -> Option<Match<T>> {
        let (found, end) = patterns.find(&self.buffer)?;
        self.buffer.advance(end);
        Some(found)
    }

    /// Get a reference to the buffer contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the buffer contents as a string (lossy UTF-8 conversion).
    pub fn as_str_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.buffer)
    }

    /// Number of unconsumed bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Discard buffered output and any partial escape sequence.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.parser = Parser::new();
    }

    /// Maximum number of bytes retained.
    pub fn search_depth(&self) -> usize {
        self.search_depth
    }
}

impl Debug for PatternBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternBuffer")
            .field("buffer", &self.as_str_lossy())
            .field("search_depth", &self.search_depth)
            .finish_non_exhaustive()
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(4096)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Tag {
        Prompt,
    }

    fn prompt_set() -> PatternSet<Tag> {
        PatternSet::new().with(Tag::Prompt, r"> $").unwrap()
    }

    #[test]
    fn test_basic_extend() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"Hello, world!");
        assert_eq!(buffer.as_slice(), b"Hello, world!");
    }

    #[test]
    fn test_ansi_stripping() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"\x1b[0;34m[\x1b[1;34mN\x1b[0;34m]\x1b[0;37morth\x1b[0m");
        assert_eq!(buffer.as_slice(), b"[N]orth");
    }

    #[test]
    fn test_escape_split_across_chunks() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"Exits: \x1b[1;3");
        buffer.extend(b"4m[N]orth");
        assert_eq!(buffer.as_str_lossy(), "Exits: [N]orth");

        buffer.clear();
        buffer.extend(b"abc\x1b");
        assert_eq!(buffer.as_slice(), b"abc");
        buffer.extend(b"[0mdef");
        assert_eq!(buffer.as_slice(), b"abcdef");
    }

    #[test]
    fn test_osc_title_stripped() {
        let mut buffer = PatternBuffer::new(4096);
        buffer.extend(b"\x1b]0;kmud - Town Square\x07> ");
        assert_eq!(buffer.as_slice(), b"> ");
    }

    #[test]
    fn test_osc_split_across_chunks() {
        let mut buffer = PatternBuffer::new(4096);
        buffer.extend(b"Exits: \x1b]2;kmud");
        buffer.extend(b" - Hall\x1b\\[E]ast\r\n");
        assert_eq!(buffer.as_slice(), b"Exits: [E]ast\r\n");
    }

    #[test]
    fn test_unterminated_csi_stays_bounded() {
        let mut buffer = PatternBuffer::new(16);
        buffer.extend(b"\x1b[");
        for _ in 0..1000 {
            buffer.extend(b"1;2;3;4;5;6;7;8;9;0;");
            assert!(buffer.len() <= buffer.search_depth());
        }
        assert!(buffer.is_empty());

        // The final byte ends the sequence and text flows again.
        buffer.extend(b"m> ");
        assert_eq!(buffer.as_slice(), b"> ");
        assert!(buffer.search(&prompt_set()).is_some());
    }

    #[test]
    fn test_bell_and_utf8_text() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend("caf\u{e9}\x07\r\n> ".as_bytes());
        assert_eq!(buffer.as_str_lossy(), "caf\u{e9}\r\n> ");
    }

    #[test]
    fn test_search_consumes_through_match() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"menu\n> ");
        assert_eq!(buffer.search(&prompt_set()).unwrap().tag, Tag::Prompt);
        assert!(buffer.is_empty());

        // The same prompt must not match twice.
        assert!(buffer.search(&prompt_set()).is_none());
    }

    #[test]
    fn test_search_leaves_unmatched_tail() {
        let set = PatternSet::new().with(Tag::Prompt, r"unavailable").unwrap();
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"That name is unavailable\n> ");
        assert!(buffer.search(&set).is_some());
        assert_eq!(buffer.as_slice(), b"\n> ");
    }

    #[test]
    fn test_search_depth_bounds_buffer() {
        let mut buffer = PatternBuffer::new(10);
        buffer.extend(&[b'x'; 100]);
        buffer.extend(b"> ");
        assert_eq!(buffer.len(), 10);
        assert!(buffer.search(&prompt_set()).is_some());
    }
}
