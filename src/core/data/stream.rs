use crate::core::lex::Token;

/// A cursor over a lexed token stream which supports marking a position and
/// rewinding to it later. The stream must be terminated by an end-marker token;
/// reading past the end keeps yielding that token.
pub struct TokenCursor<'tokens> {
    tokens: &'tokens [Token],
    index: usize,
    marks: Vec<usize>,
}

impl<'tokens> TokenCursor<'tokens> {
    pub fn observe(tokens: &'tokens [Token]) -> TokenCursor<'tokens> {
        assert!(!tokens.is_empty(), "Token stream must contain an end marker");

        TokenCursor {
            tokens,
            index: 0,
            marks: Vec::new(),
        }
    }

    pub fn current(&self) -> &'tokens Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.index.min(last)]
    }

    /// The most recently consumed token, if any.
    pub fn previous(&self) -> Option<&'tokens Token> {
        if self.index == 0 {
            None
        } else {
            self.tokens.get(self.index.min(self.tokens.len()) - 1)
        }
    }

    pub fn position(&self) -> usize {
        self.index
    }

    pub fn at_end(&self) -> bool {
        self.current().is_end()
    }

    pub fn advance(&mut self) -> &mut Self {
        if self.index < self.tokens.len() - 1 {
            self.index += 1;
        }
        self
    }

    pub fn mark(&mut self) -> &mut Self {
        self.marks.push(self.index);
        self
    }

    /// Returns to the most recent mark, dropping it.
    pub fn rewind(&mut self) -> &mut Self {
        if let Some(index) = self.marks.pop() {
            self.index = index;
        }
        self
    }

    /// All tokens that share a line with `line`.
    pub fn line_tokens(&self, line: usize) -> impl Iterator<Item = &'tokens Token> {
        self.tokens.iter().filter(move |token| token.line == line)
    }
}
