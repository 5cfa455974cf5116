//! Inbound byte handling: UTF-8 decoding and the receive log buffer.

/// Decodes raw serial chunks into text.
///
/// Invalid UTF-8 is dropped. A multi-byte character cut off at the end of
/// one chunk is held back and completed by the next chunk.
#[derive(Debug, Default)]
pub struct ReceiveDecoder {
    pending: Vec<u8>,
}

impl ReceiveDecoder {
    pub fn new() -> Self {
        ReceiveDecoder {
            pending: Vec::new(),
        }
    }

    /// Decode `chunk`, prefixed by any bytes held back from the last call.
    pub fn feed(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(chunk);

        let mut out = String::new();
        let mut rest: &[u8] = &bytes;
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&rest[..valid]));
                    match e.error_len() {
                        Some(bad) => rest = &rest[valid + bad..],
                        None => {
                            // Truncated sequence at the end of the input.
                            self.pending = rest[valid..].to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Number of bytes held back for the next chunk.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Forget held-back bytes.
    pub fn reset(&mut self) {
        self.pending.clear();
    }
}


/// Append-only text buffer for received data.
///
/// With a non-zero `limit`, the oldest text is discarded once the buffer
/// grows past `limit` bytes. Trimming never splits a character.
#[derive(Debug, Default)]
pub struct ReceiveLog {
    text: String,
    limit: usize,
}

impl ReceiveLog {
    /// Create a log capped at `limit` bytes (0 = unlimited).
    pub fn new(limit: usize) -> Self {
        ReceiveLog {
            text: String::new(),
            limit,
        }
    }

    pub fn append(&mut self, text: &str) {
        self.text.push_str(text);
        if self.limit > 0 && self.text.len() > self.limit {
            let mut cut = self.text.len() - self.limit;
            while !self.text.is_char_boundary(cut) {
                cut += 1;
            }
            self.text.drain(..cut);
        }
    }

    /// Append `line` on its own line, like a text widget's append.
    pub fn append_line(&mut self, line: &str) {
        if !self.text.is_empty() && !self.text.ends_with('\n') {
            self.text.push('\n');
        }
        self.append(line);
        self.append("\n");
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    // --- ReceiveDecoder ---

    #[test]
    fn ascii_passes_through() {
        let mut d = ReceiveDecoder::new();
        assert_eq!(d.feed(b"ok\r\n"), "ok\r\n");
        assert_eq!(d.pending_len(), 0);
    }

    #[test]
    fn invalid_bytes_are_dropped() {
        let mut d = ReceiveDecoder::new();
        assert_eq!(d.feed(b"a\xffb\xfe\xfdc"), "abc");
        assert_eq!(d.pending_len(), 0);
    }

    #[test]
    fn split_character_is_completed() {
        // "é" is 0xC3 0xA9
        let mut d = ReceiveDecoder::new();
        assert_eq!(d.feed(b"caf\xc3"), "caf");
        assert_eq!(d.pending_len(), 1);
        assert_eq!(d.feed(b"\xa9!"), "é!");
        assert_eq!(d.pending_len(), 0);
    }

    #[test]
    fn dangling_lead_byte_followed_by_ascii_is_dropped() {
        let mut d = ReceiveDecoder::new();
        assert_eq!(d.feed(b"x\xe2"), "x");
        assert_eq!(d.feed(b"y"), "y");
    }

    #[test]
    fn reset_discards_pending() {
        let mut d = ReceiveDecoder::new();
        d.feed(b"\xf0\x9f");
        assert_eq!(d.pending_len(), 2);
        d.reset();
        assert_eq!(d.pending_len(), 0);
        assert_eq!(d.feed(b"z"), "z");
    }

    // --- ReceiveLog ---

    #[test]
    fn append_accumulates() {
        let mut log = ReceiveLog::new(0);
        log.append("ab");
        log.append("cd");
        assert_eq!(log.text(), "abcd");
    }

    #[test]
    fn append_line_starts_new_line() {
        let mut log = ReceiveLog::new(0);
        log.append("partial");
        log.append_line("[Read Error]: boom");
        assert_eq!(log.text(), "partial\n[Read Error]: boom\n");
        assert_eq!(log.text().lines().count(), 2);
    }

    #[test]
    fn limit_trims_oldest() {
        let mut log = ReceiveLog::new(4);
        log.append("abc");
        log.append("def");
        assert_eq!(log.text(), "cdef");
    }

    #[test]
    fn limit_respects_char_boundaries() {
        let mut log = ReceiveLog::new(3);
        log.append("aé"); // 3 bytes
        log.append("b"); // 4 bytes, cut 1
        assert_eq!(log.text(), "éb");
        log.append("éé"); // "ébéé" 7 bytes, cut to boundary past 4
        assert!(log.text().len() <= 4);
        assert!(log.text().ends_with("é"));
    }

    #[test]
    fn clear_empties() {
        let mut log = ReceiveLog::new(0);
        log.append("x");
        log.clear();
        assert!(log.text().is_empty());
    }
}
