use {
    regex::{self, Regex},
    std::fmt,
};

pub static ID: &str = "ID";
pub static NUMBER: &str = "NUMBER";
pub static UNKNOWN: &str = "UNKNOWN";

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Rule {
    pub token_name: String,
    pub pattern: String,
}

impl Rule {
    pub fn new(token_name: &str, pattern: &str) -> Self {
        Rule {
            token_name: token_name.to_string(),
            pattern: pattern.to_string(),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} : '{}'", self.token_name, self.pattern)
    }
}

/// The two rule pools of a token-rule file.
///
/// Keyword rules are matched by exact string equality. Special (punctuation) rules are
/// matched the same way, but are additionally used to pre-split raw lines so that
/// punctuation glued to identifiers or numbers becomes a word of its own.
#[derive(Debug, Default, Clone)]
pub struct RuleSet {
    keywords: Vec<Rule>,
    specials: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_keyword(&mut self, rule: Rule) -> &mut Self {
        self.keywords.push(rule);
        self
    }

    pub fn add_special(&mut self, rule: Rule) -> &mut Self {
        self.specials.push(rule);
        self
    }

    pub fn keywords(&self) -> &[Rule] {
        &self.keywords
    }

    pub fn specials(&self) -> &[Rule] {
        &self.specials
    }

    /// Returns the pattern declared for `token_name`, searching keywords first.
    pub fn pattern_for(&self, token_name: &str) -> Option<&str> {
        self.keywords
            .iter()
            .chain(self.specials.iter())
            .find(|rule| rule.token_name == token_name)
            .map(|rule| &rule.pattern[..])
    }

    /// Builds one alternation over every special pattern, longest pattern first, so
    /// that `!=` wins over `!`. Returns `None` when there are no special rules.
    pub fn special_splitter(&self) -> Option<Regex> {
        if self.specials.is_empty() {
            return None;
        }

        let mut sorted: Vec<&Rule> = self.specials.iter().collect();
        sorted.sort_by(|a, b| b.pattern.len().cmp(&a.pattern.len()));

        let alternation = sorted
            .iter()
            .map(|rule| regex::escape(&rule.pattern))
            .collect::<Vec<String>>()
            .join("|");

        Regex::new(&alternation).ok()
    }
}
