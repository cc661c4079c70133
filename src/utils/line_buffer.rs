//! Bounded buffer holding one line of received data.

use std::borrow::Cow;

/// Default number of payload bytes a line can hold.
pub const DEFAULT_LINE_CAPACITY: usize = 99;

/// Accumulates the bytes drained from the serial device in one pass.
///
/// The buffer never grows beyond its capacity. Bytes pushed into a full buffer
/// are discarded and counted, so an oversized burst truncates the line
/// instead of overrunning it.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct LineBuffer {
    data: Vec<u8>,
    capacity: usize,
    dropped: usize,
}

impl LineBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        LineBuffer {
            data: Vec::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Append `byte` if there is room left. Returns `false` when the byte was
    /// discarded.
    pub fn push(&mut self, byte: u8) -> bool {
        if self.data.len() < self.capacity {
            self.data.push(byte);
            true
        } else {
            self.dropped += 1;
            false
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The line as text. Invalid UTF-8 sequences are replaced with `U+FFFD`.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of bytes discarded because the buffer was full.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        LineBuffer::with_capacity(DEFAULT_LINE_CAPACITY)
    }
}

#[test]
fn fills_up_to_capacity() {
    let mut line = LineBuffer::with_capacity(3);
    assert!(line.is_empty());
    assert!(line.push(b'a'));
    assert!(line.push(b'b'));
    assert!(line.push(b'c'));
    assert!(!line.push(b'd'));
    assert!(!line.push(b'e'));
    assert_eq!(line.as_bytes(), b"abc");
    assert_eq!(line.len(), 3);
    assert_eq!(line.dropped(), 2);
}

#[test]
fn zero_capacity_drops_everything() {
    let mut line = LineBuffer::with_capacity(0);
    assert!(!line.push(b'x'));
    assert!(line.is_empty());
    assert_eq!(line.dropped(), 1);
}

#[test]
fn lossy_text() {
    let mut line = LineBuffer::default();
    assert_eq!(line.capacity(), DEFAULT_LINE_CAPACITY);
    for b in b"h\xffi" {
        line.push(*b);
    }
    assert_eq!(line.text(), "h\u{fffd}i");
}
