//! Splitting of oversized messages.

/// Longest message, in characters, logged as a single line.
pub const MAX_CHUNK_CHARS: usize = 3000;

/// Split `message` into successive pieces of at most `max_chars` characters.
///
/// Pieces always end on a `char` boundary. An empty message yields one
/// empty piece so that the call still produces a line.
pub fn chunk_message(message: &str, max_chars: usize) -> Chunks<'_> {
    Chunks {
        rest: Some(message),
        max_chars: max_chars.max(1),
    }
}

/// Iterator returned by [`chunk_message`].
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    rest: Option<&'a str>,
    max_chars: usize,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let rest = self.rest?;
        match rest.char_indices().nth(self.max_chars) {
            Some((split, _)) => {
                let (head, tail) = rest.split_at(split);
                self.rest = Some(tail);
                Some(head)
            }
            None => {
                self.rest = None;
                Some(rest)
            }
        }
    }
}
