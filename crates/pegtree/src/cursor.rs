use crate::span::Span;

/// A position in some input text which only ever moves forward, unless explicitly restored.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Cursor<'a> {
    src: &'a str,
    pos: u32,
}

impl<'a> Cursor<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    pub fn at(src: &'a str, pos: u32) -> Self {
        debug_assert!(src.is_char_boundary(pos as usize));
        Self { src, pos }
    }

    pub fn src(&self) -> &'a str {
        self.src
    }

    pub fn pos(&self) -> u32 {
        self.pos
    }

    pub fn rest(&self) -> &'a str {
        &self.src[self.pos as usize..]
    }

    pub fn span_since(&self, start: u32) -> Span {
        Span::new(start, self.pos)
    }

    pub fn restore_pos(&mut self, pos: u32) {
        debug_assert!(pos as usize <= self.src.len());
        self.pos = pos;
    }

    pub fn is_empty(&self) -> bool {
        self.pos as usize == self.src.len()
    }

    pub fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8() as u32;
        Some(c)
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn consume(&mut self, value: char) -> bool {
        if self.peek() == Some(value) {
            self.next();
            true
        } else {
            false
        }
    }

    pub fn consume_while(&mut self, predicate: impl Fn(char) -> bool) -> Span {
        let start = self.pos();
        while let Some(c) = self.peek() {
            if predicate(c) {
                self.next();
            } else {
                break;
            }
        }
        self.span_since(start)
    }

    pub fn sequence(&mut self, sequence: &str) -> bool {
        if self.rest().starts_with(sequence) {
            self.pos += sequence.len() as u32;
            true
        } else {
            false
        }
    }
}
