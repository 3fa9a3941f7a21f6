use miette::NamedSource;

/// Scan position over an expression's source text.
///
/// Lexing is fused into the parser: the grammar asks the cursor for one
/// character at a time, and the cursor only consumes it when it belongs to the
/// set the current rule accepts.
#[derive(Debug, Clone)]
pub struct Cursor<'de> {
    filename: Option<&'de str>,
    whole: &'de str,
    byte: usize,
}

impl<'de> Cursor<'de> {
    pub fn new(filename: Option<&'de str>, input: &'de str) -> Self {
        Cursor {
            filename,
            whole: input,
            byte: 0,
        }
    }

    /// Skips spaces, then consumes and returns the next character if
    /// `accepted` says so.
    ///
    /// Skipped spaces stay consumed even when the character after them is
    /// rejected; only that character is left in place.
    pub fn peek_consume(&mut self, accepted: impl Fn(char) -> bool) -> Option<char> {
        let rest = &self.whole[self.byte..];
        let trimmed = rest.trim_start_matches(' ');
        self.byte += rest.len() - trimmed.len();

        let c = trimmed.chars().next()?;
        if accepted(c) {
            self.byte += c.len_utf8();
            Some(c)
        } else {
            None
        }
    }

    pub fn has_remaining(&self) -> bool {
        self.byte < self.whole.len()
    }

    /// The character under the cursor, without consuming it.
    pub fn current(&self) -> Option<char> {
        self.whole.get(self.byte..)?.chars().next()
    }

    pub fn offset(&self) -> usize {
        self.byte
    }

    pub fn whole(&self) -> &'de str {
        self.whole
    }

    pub fn source(&self) -> NamedSource<String> {
        NamedSource::new(self.filename.unwrap_or("<input>"), self.whole.to_string())
    }
}
