use crate::core::lex::{
    dfa::{self, WordClass},
    rules::{RuleSet, ID, NUMBER, UNKNOWN},
};

/// Classifies single words against a rule set, falling back to the identifier/number
/// automaton when no rule matches exactly.
pub struct TokenMatcher<'rules> {
    rules: &'rules RuleSet,
}

impl<'rules> TokenMatcher<'rules> {
    pub fn new(rules: &'rules RuleSet) -> Self {
        TokenMatcher { rules }
    }

    /// Returns `(token_type, word)`, where `token_type` is `UNKNOWN` when nothing matched.
    pub fn classify<'word>(&self, word: &'word str) -> (&'rules str, &'word str) {
        let exact = self
            .rules
            .keywords()
            .iter()
            .chain(self.rules.specials().iter())
            .find(|rule| rule.pattern == word);

        if let Some(rule) = exact {
            return (&rule.token_name[..], word);
        }

        let token_type = match dfa::classify(word) {
            WordClass::Identifier => ID,
            WordClass::Number => NUMBER,
            WordClass::Unknown => UNKNOWN,
        };

        (token_type, word)
    }
}
