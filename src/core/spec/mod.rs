use {
    crate::core::lex::rules::{Rule, RuleSet},
    std::{error, fmt},
};

static COMMENT: char = '#';
static QUOTE: char = '\'';
static TERMINATOR: char = ';';
static SEPARATOR: char = ':';
static SYMBOL_PREFIX: &str = "SYMBOL";

/// One `head : body;` entry of a grammar file, before any rewriting.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RawRule {
    pub head: String,
    pub body: String,
}

impl RawRule {
    pub fn new(head: &str, body: &str) -> Self {
        RawRule {
            head: head.to_string(),
            body: body.to_string(),
        }
    }
}

impl fmt::Display for RawRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} -> {}", self.head, self.body)
    }
}

/// Reads a token-rule file made of `NAME : 'pattern';` entries. Names prefixed with
/// `SYMBOL` are routed into the punctuation pool.
pub fn parse_rules(text: &str) -> Result<RuleSet, SpecError> {
    let mut rules = RuleSet::new();
    let mut pending = String::new();
    let mut start_line = 0;

    for (i, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if pending.is_empty() {
            if trimmed.is_empty() || trimmed.starts_with(COMMENT) {
                continue;
            }
            start_line = i + 1;
        } else {
            pending.push('\n');
        }
        pending.push_str(line);

        while let Some((consumed, name, pattern)) = next_rule(&pending, start_line)? {
            if name.starts_with(SYMBOL_PREFIX) {
                let name = name[SYMBOL_PREFIX.len()..].trim();
                if name.is_empty() {
                    return Err(SpecError::EmptyName { line: start_line });
                }
                rules.add_special(Rule::new(name, &pattern));
            } else {
                rules.add_keyword(Rule::new(&name, &pattern));
            }

            let rest = pending[consumed..].trim();
            pending = if rest.starts_with(COMMENT) {
                String::new()
            } else {
                rest.to_string()
            };
            start_line = i + 1;
        }
    }

    if !pending.trim().is_empty() {
        return Err(SpecError::Unterminated { line: start_line });
    }

    debug!(
        "Read {} keyword rules and {} punctuation rules",
        rules.keywords().len(),
        rules.specials().len()
    );

    Ok(rules)
}

/// Returns the byte length of the first complete rule in `buffer` along with its name
/// and pattern, or `None` if more input is needed.
fn next_rule(buffer: &str, line: usize) -> Result<Option<(usize, String, String)>, SpecError> {
    let colon = match buffer.find(SEPARATOR) {
        Some(index) => index,
        None => {
            return if buffer.contains(TERMINATOR) {
                Err(SpecError::MissingColon { line })
            } else {
                Ok(None)
            };
        }
    };

    let name = buffer[..colon].trim();
    if name.is_empty() {
        return Err(SpecError::EmptyName { line });
    }

    let after = &buffer[colon + 1..];
    let open = match after.find(QUOTE) {
        Some(index) => index,
        None => {
            return if after.contains(TERMINATOR) {
                Err(SpecError::MissingPattern {
                    line,
                    name: name.to_string(),
                })
            } else {
                Ok(None)
            };
        }
    };

    let body = &after[open + 1..];
    for (index, c) in body.char_indices() {
        if c != QUOTE {
            continue;
        }

        let tail = &body[index + 1..];
        let trimmed = tail.trim_start();
        if !trimmed.starts_with(TERMINATOR) {
            continue;
        }

        let pattern = &body[..index];
        if pattern.is_empty() {
            return Err(SpecError::MissingPattern {
                line,
                name: name.to_string(),
            });
        }

        let whitespace = tail.len() - trimmed.len();
        let consumed = colon + 1 + open + 1 + index + 1 + whitespace + 1;
        return Ok(Some((consumed, name.to_string(), pattern.to_string())));
    }

    Ok(None)
}

/// Reads a grammar file made of `head : body;` entries. A rule may span several lines,
/// and text following a `;` starts the next rule.
pub fn parse_grammar(text: &str) -> Result<Vec<RawRule>, SpecError> {
    let mut rules: Vec<RawRule> = Vec::new();
    let mut pending = String::new();
    let mut start_line = 0;

    for (i, line) in text.lines().enumerate() {
        let code = match line.find(COMMENT) {
            Some(index) => &line[..index],
            None => line,
        };

        if pending.trim().is_empty() {
            if code.trim().is_empty() {
                continue;
            }
            pending.clear();
            start_line = i + 1;
        }

        pending.push(' ');
        pending.push_str(code);

        while let Some(end) = pending.find(TERMINATOR) {
            rules.push(raw_rule(&pending[..end], start_line)?);
            pending = pending[end + 1..].to_string();
            start_line = i + 1;
        }
    }

    if !pending.trim().is_empty() {
        return Err(SpecError::Unterminated { line: start_line });
    }

    debug!("Read {} grammar rules", rules.len());

    Ok(rules)
}

fn raw_rule(text: &str, line: usize) -> Result<RawRule, SpecError> {
    let parts: Vec<&str> = text.split(SEPARATOR).collect();
    match parts.len() {
        1 => return Err(SpecError::MissingColon { line }),
        2 => {}
        _ => return Err(SpecError::ExtraColon { line }),
    }

    let head = parts[0].trim();
    if head.is_empty() {
        return Err(SpecError::EmptyName { line });
    }
    if head.contains(char::is_whitespace) {
        return Err(SpecError::InvalidHead {
            line,
            head: head.to_string(),
        });
    }

    Ok(RawRule::new(head, parts[1].trim()))
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum SpecError {
    MissingColon { line: usize },
    ExtraColon { line: usize },
    EmptyName { line: usize },
    InvalidHead { line: usize, head: String },
    MissingPattern { line: usize, name: String },
    Unterminated { line: usize },
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SpecError::MissingColon { line } => {
                write!(f, "Rule starting at line {} is missing ':'", line)
            }
            SpecError::ExtraColon { line } => {
                write!(f, "Rule starting at line {} has more than one ':'", line)
            }
            SpecError::EmptyName { line } => {
                write!(f, "Rule starting at line {} has no name", line)
            }
            SpecError::InvalidHead { line, ref head } => write!(
                f,
                "Rule starting at line {} has an invalid head '{}'",
                line, head
            ),
            SpecError::MissingPattern { line, ref name } => write!(
                f,
                "Rule '{}' starting at line {} has no quoted pattern",
                name, line
            ),
            SpecError::Unterminated { line } => {
                write!(f, "Rule starting at line {} is not terminated by ';'", line)
            }
        }
    }
}

impl error::Error for SpecError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rules_pools() {
        //setup
        let text = "
# robot keywords
FORWARD : 'forward';
GOTO: 'goto' ;

SYMBOL SEMI : ';';
SYMBOL NOTEQUAL : '!=';
";

        //exercise
        let rules = parse_rules(text).unwrap();

        //verify
        assert_eq!(
            rules.keywords(),
            &[Rule::new("FORWARD", "forward"), Rule::new("GOTO", "goto")]
        );
        assert_eq!(
            rules.specials(),
            &[Rule::new("SEMI", ";"), Rule::new("NOTEQUAL", "!=")]
        );
    }

    #[test]
    fn parse_rules_multi_line_and_quote() {
        //setup
        let text = "SYMBOL QUO :\n    ''';\nSYMBOL COMMA : ','; SYMBOL COLON : ':';";

        //exercise
        let rules = parse_rules(text).unwrap();

        //verify
        assert_eq!(
            rules.specials(),
            &[
                Rule::new("QUO", "'"),
                Rule::new("COMMA", ","),
                Rule::new("COLON", ":"),
            ]
        );
    }

    #[test]
    fn parse_rules_trailing_comment() {
        //setup
        let text = "FORWARD : 'forward'; # move ahead\nBACK : 'back';";

        //exercise
        let rules = parse_rules(text).unwrap();

        //verify
        assert_eq!(rules.keywords().len(), 2);
        assert_eq!(rules.pattern_for("BACK"), Some("back"));
    }

    #[test]
    fn parse_rules_missing_colon() {
        //setup
        let text = "FORWARD : 'forward';\nBACK 'back';";

        //exercise
        let res = parse_rules(text);

        //verify
        assert_eq!(res.err(), Some(SpecError::MissingColon { line: 2 }));
    }

    #[test]
    fn parse_rules_missing_pattern() {
        //setup
        let text = "FORWARD : forward;";

        //exercise
        let res = parse_rules(text);

        //verify
        assert_eq!(
            format!("{}", res.err().unwrap()),
            "Rule 'FORWARD' starting at line 1 has no quoted pattern"
        );
    }

    #[test]
    fn parse_rules_unterminated() {
        //setup
        let text = "FORWARD : 'forward';\n\nBACK : 'back'";

        //exercise
        let res = parse_rules(text);

        //verify
        assert_eq!(res.err(), Some(SpecError::Unterminated { line: 3 }));
    }

    #[test]
    fn parse_grammar_simple() {
        //setup
        let text = "
# entry point
program : command* ;
command : FORWARD NUMBER SEMI
        | BACK NUMBER SEMI ; empty : ;
";

        //exercise
        let rules = parse_grammar(text).unwrap();

        //verify
        let normalized: Vec<(&str, String)> = rules
            .iter()
            .map(|rule| {
                let body: Vec<&str> = rule.body.split_whitespace().collect();
                (&rule.head[..], body.join(" "))
            })
            .collect();

        assert_eq!(
            normalized,
            vec![
                ("program", "command*".to_string()),
                ("command", "FORWARD NUMBER SEMI | BACK NUMBER SEMI".to_string()),
                ("empty", "".to_string()),
            ]
        );
    }

    #[test]
    fn parse_grammar_extra_colon() {
        //setup
        let text = "a : b : c;";

        //exercise
        let res = parse_grammar(text);

        //verify
        assert_eq!(res.err(), Some(SpecError::ExtraColon { line: 1 }));
    }

    #[test]
    fn parse_grammar_invalid_head() {
        //setup
        let text = "\n\nmy rule : b;";

        //exercise
        let res = parse_grammar(text);

        //verify
        assert_eq!(
            res.err(),
            Some(SpecError::InvalidHead {
                line: 3,
                head: "my rule".to_string(),
            })
        );
    }

    #[test]
    fn parse_grammar_unterminated() {
        //setup
        let text = "a : b;\nc : d\n  e";

        //exercise
        let res = parse_grammar(text);

        //verify
        assert_eq!(
            format!("{}", res.err().unwrap()),
            "Rule starting at line 2 is not terminated by ';'"
        );
    }
}
