use {
    crate::core::{
        lex::EPSILON,
        parse::{split_body, GrammarError},
        spec::RawRule,
    },
    std::collections::{BTreeSet, HashSet, VecDeque},
};

static HELPER_PREFIX: &str = "mid_";
static QUANTIFIERS: [char; 3] = ['+', '*', '?'];
static ALTERNATIVE: char = '|';
static GROUP_OPEN: char = '(';
static GROUP_CLOSE: char = ')';

/// Lowers quantifiers and parenthesised alternation into plain context-free rules.
///
/// Helper names (`mid_<n>`) are unique within one rewriter and never collide with a
/// head of the rules being rewritten.
pub struct GrammarRewriter {
    next_helper: usize,
    reserved: HashSet<String>,
    generated: BTreeSet<String>,
}

struct QuantifierSite {
    start: usize,
    end: usize,
    operand: String,
    quantifier: char,
}

impl GrammarRewriter {
    pub fn new() -> Self {
        GrammarRewriter {
            next_helper: 0,
            reserved: HashSet::new(),
            generated: BTreeSet::new(),
        }
    }

    /// Names of every helper non-terminal introduced so far.
    pub fn generated(&self) -> &BTreeSet<String> {
        &self.generated
    }

    pub fn rewrite(&mut self, rules: Vec<RawRule>) -> Result<Vec<RawRule>, GrammarError> {
        self.reserved
            .extend(rules.iter().map(|rule| rule.head.clone()));

        let unquantified = self.eliminate_quantifiers(rules)?;
        let expanded = expand_alternatives(unquantified)?;

        debug!(
            "Rewrote grammar into {} rules using {} helpers",
            expanded.len(),
            self.generated.len()
        );

        Ok(expanded)
    }

    fn eliminate_quantifiers(&mut self, rules: Vec<RawRule>) -> Result<Vec<RawRule>, GrammarError> {
        let mut pending: VecDeque<RawRule> = rules.into_iter().collect();
        let mut done: Vec<RawRule> = Vec::new();

        while let Some(rule) = pending.pop_front() {
            let site = match find_quantifier(&rule)? {
                Some(site) => site,
                None => {
                    done.push(rule);
                    continue;
                }
            };

            let chars: Vec<char> = rule.body.chars().collect();
            let prefix: String = chars[..site.start].iter().collect();
            let suffix: String = chars[site.end..].iter().collect();

            let rewritten = if site.quantifier == '?' {
                vec![
                    RawRule::new(&rule.head, &join(&[&prefix, &site.operand, &suffix])),
                    RawRule::new(&rule.head, &join(&[&prefix, EPSILON, &suffix])),
                ]
            } else {
                let helper = self.fresh_helper();
                let replacement = if site.quantifier == '+' {
                    join(&[&site.operand, &helper])
                } else {
                    helper.clone()
                };

                vec![
                    RawRule::new(&rule.head, &join(&[&prefix, &replacement, &suffix])),
                    RawRule::new(&helper, &join(&[&site.operand, &helper])),
                    RawRule::new(&helper, EPSILON),
                ]
            };

            for rule in rewritten.into_iter().rev() {
                pending.push_front(rule);
            }
        }

        Ok(done)
    }

    fn fresh_helper(&mut self) -> String {
        loop {
            let name = format!("{}{}", HELPER_PREFIX, self.next_helper);
            self.next_helper += 1;

            if self.reserved.insert(name.clone()) {
                self.generated.insert(name.clone());
                return name;
            }
        }
    }
}

impl Default for GrammarRewriter {
    fn default() -> Self {
        GrammarRewriter::new()
    }
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || c == GROUP_OPEN || c == GROUP_CLOSE || c == ALTERNATIVE
}

/// Locates the leftmost quantifier and its operand, which is either the balanced group
/// or the bare symbol immediately before it.
fn find_quantifier(rule: &RawRule) -> Result<Option<QuantifierSite>, GrammarError> {
    let chars: Vec<char> = rule.body.chars().collect();

    let q = match chars.iter().position(|c| QUANTIFIERS.contains(c)) {
        Some(q) => q,
        None => return Ok(None),
    };

    if q == 0 || (is_delimiter(chars[q - 1]) && chars[q - 1] != GROUP_CLOSE) {
        return Err(GrammarError::DanglingQuantifier {
            head: rule.head.clone(),
            body: rule.body.clone(),
        });
    }

    let start = if chars[q - 1] == GROUP_CLOSE {
        let mut depth = 0;
        let mut open = None;
        for i in (0..q).rev() {
            if chars[i] == GROUP_CLOSE {
                depth += 1;
            } else if chars[i] == GROUP_OPEN {
                depth -= 1;
                if depth == 0 {
                    open = Some(i);
                    break;
                }
            }
        }

        match open {
            Some(open) => open,
            None => return Err(unbalanced(&rule.head, &rule.body)),
        }
    } else {
        let mut i = q;
        while i > 0 && !is_delimiter(chars[i - 1]) {
            i -= 1;
        }
        i
    };

    Ok(Some(QuantifierSite {
        start,
        end: q + 1,
        operand: chars[start..q].iter().collect(),
        quantifier: chars[q],
    }))
}

fn expand_alternatives(rules: Vec<RawRule>) -> Result<Vec<RawRule>, GrammarError> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut expanded: Vec<RawRule> = Vec::new();

    for rule in rules {
        for body in expand_body(&rule.head, &rule.body)? {
            if seen.insert((rule.head.clone(), body.clone())) {
                expanded.push(RawRule::new(&rule.head, &body));
            }
        }
    }

    Ok(expanded)
}

fn expand_body(head: &str, body: &str) -> Result<Vec<String>, GrammarError> {
    let chars: Vec<char> = body.chars().collect();

    let open = match chars.iter().position(|&c| c == GROUP_OPEN) {
        Some(open) => open,
        None => {
            if chars.contains(&GROUP_CLOSE) {
                return Err(unbalanced(head, body));
            }
            return Ok(split_top_level(&chars).iter().map(|alt| normalize(alt)).collect());
        }
    };

    let close = match matching_close(&chars, open) {
        Some(close) => close,
        None => return Err(unbalanced(head, body)),
    };

    let prefix: String = chars[..open].iter().collect();
    let interior: Vec<char> = chars[open + 1..close].to_vec();
    let suffix: String = chars[close + 1..].iter().collect();

    let mut bodies: Vec<String> = Vec::new();
    for alternative in split_top_level(&interior) {
        let alternative = normalize(&alternative);
        bodies.extend(expand_body(head, &join(&[&prefix, &alternative, &suffix]))?);
    }

    Ok(bodies)
}

fn matching_close(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0;
    for (i, &c) in chars.iter().enumerate().skip(open) {
        if c == GROUP_OPEN {
            depth += 1;
        } else if c == GROUP_CLOSE {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

fn split_top_level(chars: &[char]) -> Vec<String> {
    let mut alternatives: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut depth = 0;

    for &c in chars {
        if c == GROUP_OPEN {
            depth += 1;
        } else if c == GROUP_CLOSE {
            depth -= 1;
        } else if c == ALTERNATIVE && depth == 0 {
            alternatives.push(current);
            current = String::new();
            continue;
        }
        current.push(c);
    }

    alternatives.push(current);
    alternatives
}

fn normalize(body: &str) -> String {
    split_body(body).join(" ")
}

fn join(parts: &[&str]) -> String {
    parts
        .iter()
        .flat_map(|part| part.split_whitespace())
        .collect::<Vec<&str>>()
        .join(" ")
}

fn unbalanced(head: &str, body: &str) -> GrammarError {
    GrammarError::UnbalancedParentheses {
        head: head.to_string(),
        body: body.to_string(),
    }
}
