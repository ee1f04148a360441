//! Character cursor over the source text.

pub(crate) struct Cursor<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) const fn new(source: &'a str) -> Self {
        Cursor { source, pos: 0 }
    }

    /// Byte offset of the current character.
    #[inline]
    pub(crate) const fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub(crate) fn current(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    /// The character after the current one.
    #[inline]
    pub(crate) fn peek(&self) -> Option<char> {
        let mut rest = self.source[self.pos..].chars();
        rest.next();
        rest.next()
    }

    #[inline]
    pub(crate) fn bump(&mut self) -> Option<char> {
        let c = self.current()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    pub(crate) fn eat_while(&mut self, mut pred: impl FnMut(char) -> bool) {
        while let Some(c) = self.current() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    /// Source text from `start` up to the current position.
    #[inline]
    pub(crate) fn slice_from(&self, start: usize) -> &'a str {
        &self.source[start..self.pos]
    }
}
