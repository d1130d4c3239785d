/// A byte cursor over one line of source text.
///
/// Positions are local byte offsets into the line.
#[derive(Clone)]
pub struct Cursor<'a> {
    /// The line being scanned.
    pub s: &'a str,
    /// Current byte index into `s`.
    pub i: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    /// Returns true if at end of line.
    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    /// Peeks at the current byte without advancing.
    pub fn peek(&self) -> Option<u8> {
        self.s.as_bytes().get(self.i).copied()
    }

    /// Peeks `n` bytes ahead of the current position.
    pub fn peek_at(&self, n: usize) -> Option<u8> {
        self.s.as_bytes().get(self.i + n).copied()
    }

    /// Advances by one byte, returning the consumed byte.
    pub fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.i += 1;
        Some(b)
    }

    /// Moves to an absolute byte index.
    pub fn seek(&mut self, i: usize) {
        self.i = i;
    }

    /// Finds the next occurrence of `b` strictly after the current byte.
    pub fn find_after(&self, b: u8) -> Option<usize> {
        let from = self.i + 1;
        self.s.as_bytes().get(from..)?.iter().position(|&c| c == b).map(|p| from + p)
    }

    /// Length of the run of bytes matching `pred` starting at `from`.
    pub fn run_len(&self, from: usize, pred: impl Fn(u8) -> bool) -> usize {
        self.s
            .as_bytes()
            .get(from..)
            .map_or(0, |rest| rest.iter().take_while(|&&b| pred(b)).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_basics() {
        let mut cur = Cursor::new("<p>");
        assert!(!cur.eof());
        assert_eq!(cur.peek(), Some(b'<'));
        assert_eq!(cur.peek_at(1), Some(b'p'));
        assert_eq!(cur.bump(), Some(b'<'));
        assert_eq!(cur.i, 1);
    }

    #[test]
    fn find_after_skips_current_byte() {
        let cur = Cursor::new("<a><b>");
        assert_eq!(cur.find_after(b'<'), Some(3));
        assert_eq!(cur.find_after(b'>'), Some(2));
        assert_eq!(cur.find_after(b'x'), None);
    }

    #[test]
    fn find_after_at_last_byte() {
        let mut cur = Cursor::new("ab");
        cur.seek(1);
        assert_eq!(cur.find_after(b'b'), None);
        cur.seek(10);
        assert_eq!(cur.find_after(b'b'), None);
    }

    #[test]
    fn run_len_counts_matching_bytes() {
        let cur = Cursor::new("<div class>");
        assert_eq!(cur.run_len(1, |b| b.is_ascii_alphabetic()), 3);
        assert_eq!(cur.run_len(4, |b| b.is_ascii_alphabetic()), 0);
        assert_eq!(cur.run_len(99, |_| true), 0);
    }

    #[test]
    fn bump_at_eof_returns_none() {
        let mut cur = Cursor::new("x");
        assert_eq!(cur.bump(), Some(b'x'));
        assert!(cur.eof());
        assert_eq!(cur.bump(), None);
    }
}
