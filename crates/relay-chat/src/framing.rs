//! Line-oriented re-framing of a streamed byte sequence
//!
//! The upstream event stream arrives in arbitrary chunks; the relay forwards
//! it line by line. Every complete line is surfaced the moment its newline
//! decodes, and at most one partial line is held back until its terminator
//! (or the end of the stream) arrives.

/// Accumulates decoded text across stream chunks, yielding complete lines
///
/// Decoding is resumable: a multi-byte UTF-8 sequence split across a chunk
/// boundary is carried as undecoded bytes until the rest arrives. Malformed
/// sequences decode to U+FFFD.
#[derive(Debug, Default)]
pub struct LineBuffer {
    /// Decoded text; at most one unterminated line after `push` returns
    text: String,
    /// Undecoded tail of an incomplete multi-byte sequence, at most 3 bytes
    partial: Vec<u8>,
}

impl LineBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a chunk and return every newly completed line
    ///
    /// Returned lines include their terminating newline. Text after the last
    /// newline stays buffered for the next chunk.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.decode(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.text.find('\n') {
            lines.push(self.text.drain(..=pos).collect());
        }
        lines
    }

    /// Consume the buffer, returning any trailing partial line
    ///
    /// An incomplete multi-byte sequence left behind by the final chunk is
    /// decoded lossily rather than dropped.
    #[must_use]
    pub fn finish(mut self) -> Option<String> {
        if !self.partial.is_empty() {
            let tail = std::mem::take(&mut self.partial);
            self.text.push_str(&String::from_utf8_lossy(&tail));
        }
        if self.text.is_empty() { None } else { Some(self.text) }
    }

    fn decode(&mut self, chunk: &[u8]) {
        let carried = std::mem::take(&mut self.partial);
        let joined;
        let mut rest: &[u8] = if carried.is_empty() {
            chunk
        } else {
            joined = [carried.as_slice(), chunk].concat();
            &joined
        };

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    self.text.push_str(valid);
                    return;
                }
                Err(e) => {
                    let (valid, invalid) = rest.split_at(e.valid_up_to());
                    if let Ok(s) = std::str::from_utf8(valid) {
                        self.text.push_str(s);
                    }
                    match e.error_len() {
                        // Malformed sequence: substitute and keep decoding
                        Some(len) => {
                            self.text.push(char::REPLACEMENT_CHARACTER);
                            rest = &invalid[len..];
                        }
                        // Incomplete sequence at the chunk boundary: carry it
                        None => {
                            self.partial = invalid.to_vec();
                            return;
                        }
                    }
                }
            }
        }
    }
}
