use {
    crate::core::{
        lex::EPSILON,
        parse::{is_epsilon_body, split_body, Production},
        spec::RawRule,
    },
    std::collections::{BTreeSet, HashMap},
};

static FACTOR_PREFIX: &str = "mid_";
static FACTOR_SUFFIX: &str = "_ext";
static PRIME: char = '\'';

/// The productions of a grammar, grouped by head in first-definition order.
#[derive(Clone, Debug, Default)]
pub struct ProductionSet {
    heads: Vec<String>,
    prods_by_head: HashMap<String, Vec<Vec<String>>>,
    generated: BTreeSet<String>,
}

impl ProductionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_raw(rules: &[RawRule]) -> Self {
        let mut productions = ProductionSet::new();
        for rule in rules {
            productions.add(&rule.head, split_body(&rule.body));
        }
        productions
    }

    /// Adds `head -> body`, ignoring exact duplicates.
    pub fn add(&mut self, head: &str, body: Vec<String>) {
        if !self.prods_by_head.contains_key(head) {
            self.heads.push(head.to_string());
        }

        let bodies = self
            .prods_by_head
            .entry(head.to_string())
            .or_insert_with(Vec::new);
        if !bodies.contains(&body) {
            bodies.push(body);
        }
    }

    pub fn heads(&self) -> &[String] {
        &self.heads
    }

    pub fn contains(&self, head: &str) -> bool {
        self.prods_by_head.contains_key(head)
    }

    pub fn bodies(&self, head: &str) -> Option<&Vec<Vec<String>>> {
        self.prods_by_head.get(head)
    }

    pub fn is_generated(&self, head: &str) -> bool {
        self.generated.contains(head)
    }

    pub fn generated(&self) -> &BTreeSet<String> {
        &self.generated
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<Vec<String>>)> {
        self.heads
            .iter()
            .filter_map(move |head| self.prods_by_head.get(head).map(|bodies| (head, bodies)))
    }

    pub fn productions(&self) -> Vec<Production> {
        self.iter()
            .flat_map(|(head, bodies)| {
                bodies
                    .iter()
                    .map(move |body| Production::new(head, body.clone()))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.prods_by_head.values().map(|bodies| bodies.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.heads.is_empty()
    }

    /// Replaces `A -> A α | β` with `A -> β A'`, `A' -> α A' | ε`.
    pub fn eliminate_left_recursion(&mut self) {
        let mut rewritten = ProductionSet {
            heads: Vec::new(),
            prods_by_head: HashMap::new(),
            generated: self.generated.clone(),
        };

        for head in self.heads.clone() {
            let bodies = &self.prods_by_head[&head];
            let (recursive, base): (Vec<&Vec<String>>, Vec<&Vec<String>>) =
                bodies.iter().partition(|body| body.first() == Some(&head));

            if recursive.is_empty() {
                for body in base {
                    rewritten.add(&head, body.clone());
                }
                continue;
            }

            let tail = self.fresh_prime(&head, &rewritten);
            debug!("Eliminating left recursion of '{}' through '{}'", head, tail);

            for body in base {
                let mut body: Vec<String> = if is_epsilon_body(body) {
                    Vec::new()
                } else {
                    body.clone()
                };
                body.push(tail.clone());
                rewritten.add(&head, body);
            }

            for body in recursive {
                if body.len() == 1 {
                    continue;
                }
                let mut body: Vec<String> = body[1..].to_vec();
                body.push(tail.clone());
                rewritten.add(&tail, body);
            }

            rewritten.add(&tail, vec![EPSILON.to_string()]);
            rewritten.generated.insert(tail);
        }

        *self = rewritten;
    }

    fn fresh_prime(&self, head: &str, rewritten: &ProductionSet) -> String {
        let mut name = format!("{}{}", head, PRIME);
        while self.contains(&name) || rewritten.contains(&name) {
            name.push(PRIME);
        }
        name
    }

    /// Pulls the longest shared prefix of two or more productions of one head into a
    /// helper, repeating until no head has productions with a common prefix.
    pub fn left_factor(&mut self) {
        let mut work_queue: Vec<String> = self.heads.clone();
        work_queue.reverse();

        while let Some(head) = work_queue.pop() {
            while let Some((prefix, members)) = self.longest_shared_prefix(&head) {
                let helper = self.fresh_factor_name(&head);
                debug!(
                    "Factoring '{}' out of {} productions of '{}' into '{}'",
                    prefix.join(" "),
                    members.len(),
                    head,
                    helper
                );

                let bodies = match self.prods_by_head.get_mut(&head) {
                    Some(bodies) => bodies,
                    None => break,
                };

                let mut suffixes: Vec<Vec<String>> = Vec::new();
                for &index in &members {
                    let suffix = &bodies[index][prefix.len()..];
                    let suffix = if suffix.is_empty() {
                        vec![EPSILON.to_string()]
                    } else {
                        suffix.to_vec()
                    };
                    if !suffixes.contains(&suffix) {
                        suffixes.push(suffix);
                    }
                }

                let mut factored = prefix.clone();
                factored.push(helper.clone());

                let first = members[0];
                let mut kept: Vec<Vec<String>> = Vec::new();
                for (index, body) in bodies.drain(..).enumerate() {
                    if index == first {
                        kept.push(factored.clone());
                    } else if !members.contains(&index) {
                        kept.push(body);
                    }
                }
                *bodies = kept;

                for suffix in suffixes {
                    self.add(&helper, suffix);
                }
                self.generated.insert(helper.clone());
                work_queue.insert(0, helper);
            }
        }
    }

    /// Finds the longest prefix (in symbols) shared by at least two productions of
    /// `head`. Ties go to the longer text, then to the earliest production.
    fn longest_shared_prefix(&self, head: &str) -> Option<(Vec<String>, Vec<usize>)> {
        let bodies = self.prods_by_head.get(head)?;

        let mut groups: Vec<(Vec<String>, Vec<usize>)> = Vec::new();
        for (index, body) in bodies.iter().enumerate() {
            if is_epsilon_body(body) {
                continue;
            }
            for length in 1..=body.len() {
                let prefix = &body[..length];
                match groups.iter_mut().find(|(p, _)| p.as_slice() == prefix) {
                    Some((_, members)) => members.push(index),
                    None => groups.push((prefix.to_vec(), vec![index])),
                }
            }
        }

        let mut best: Option<(Vec<String>, Vec<usize>)> = None;
        for (prefix, members) in groups {
            if members.len() < 2 {
                continue;
            }

            let better = match best {
                None => true,
                Some((ref best_prefix, ref best_members)) => {
                    let text_len = prefix.join(" ").len();
                    let best_text_len = best_prefix.join(" ").len();
                    prefix.len() > best_prefix.len()
                        || (prefix.len() == best_prefix.len() && text_len > best_text_len)
                        || (prefix.len() == best_prefix.len()
                            && text_len == best_text_len
                            && members[0] < best_members[0])
                }
            };

            if better {
                best = Some((prefix, members));
            }
        }

        best
    }

    fn fresh_factor_name(&self, head: &str) -> String {
        let base = format!("{}{}{}", FACTOR_PREFIX, head, FACTOR_SUFFIX);
        let mut name = base.clone();
        let mut index = 1;
        while self.contains(&name) {
            name = format!("{}{}", base, index);
            index += 1;
        }
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(text: &str) -> Vec<String> {
        split_body(text)
    }

    fn set(rules: &[(&str, &str)]) -> ProductionSet {
        let raw: Vec<RawRule> = rules
            .iter()
            .map(|&(head, body)| RawRule::new(head, body))
            .collect();
        ProductionSet::from_raw(&raw)
    }

    fn dump(productions: &ProductionSet) -> Vec<String> {
        productions
            .productions()
            .iter()
            .map(|production| production.to_string())
            .collect()
    }

    #[test]
    fn from_raw_dedups() {
        //setup
        let rules = [("A", "a b"), ("B", ""), ("A", "a  b"), ("A", "c")];

        //exercise
        let productions = set(&rules);

        //verify
        assert_eq!(productions.heads(), &["A".to_string(), "B".to_string()]);
        assert_eq!(dump(&productions), vec!["A -> a b", "A -> c", "B -> ε"]);
        assert_eq!(productions.len(), 3);
    }

    #[test]
    fn eliminate_left_recursion() {
        //setup
        let mut productions = set(&[("A", "A b"), ("A", "c")]);

        //exercise
        productions.eliminate_left_recursion();

        //verify
        assert_eq!(
            dump(&productions),
            vec!["A -> c A'", "A' -> b A'", "A' -> ε"]
        );
        assert!(productions.is_generated("A'"));
        assert!(!productions.is_generated("A"));
    }

    #[test]
    fn eliminate_left_recursion_epsilon_base_and_collision() {
        //setup
        let mut productions = set(&[("E", "E PLUS T"), ("E", ""), ("E'", "x")]);

        //exercise
        productions.eliminate_left_recursion();

        //verify
        assert_eq!(
            dump(&productions),
            vec!["E -> E''", "E'' -> PLUS T E''", "E'' -> ε", "E' -> x"]
        );
    }

    #[test]
    fn left_factor_no_shared_prefix_is_noop() {
        //setup
        let mut productions = set(&[("S", "a b"), ("S", "c d"), ("T", "a")]);
        let before = dump(&productions);

        //exercise
        productions.left_factor();

        //verify
        assert_eq!(dump(&productions), before);
        assert!(productions.generated().is_empty());
    }

    #[test]
    fn left_factor_longest_prefix_first() {
        //setup
        let mut productions = set(&[
            ("S", "IF c THEN s"),
            ("S", "IF c THEN s ELSE s"),
            ("S", "IF d"),
            ("S", "x"),
        ]);

        //exercise
        productions.left_factor();

        //verify
        assert_eq!(
            dump(&productions),
            vec![
                "S -> IF mid_S_ext1",
                "S -> x",
                "mid_S_ext -> ε",
                "mid_S_ext -> ELSE s",
                "mid_S_ext1 -> c THEN s mid_S_ext",
                "mid_S_ext1 -> d",
            ]
        );
        assert!(productions.is_generated("mid_S_ext"));
        assert!(productions.is_generated("mid_S_ext1"));
    }

    #[test]
    fn left_factor_tie_prefers_longer_text() {
        //setup
        let mut productions = set(&[
            ("S", "a x"),
            ("S", "a y"),
            ("S", "bbb x"),
            ("S", "bbb y"),
        ]);

        //exercise
        productions.left_factor();

        //verify
        assert_eq!(
            dump(&productions),
            vec![
                "S -> a mid_S_ext1",
                "S -> bbb mid_S_ext",
                "mid_S_ext -> x",
                "mid_S_ext -> y",
                "mid_S_ext1 -> x",
                "mid_S_ext1 -> y",
            ]
        );
    }

    #[test]
    fn left_factor_repeats_on_shorter_prefix() {
        //setup
        let mut productions = set(&[("S", "a b c"), ("S", "a b d"), ("S", "a e")]);

        //exercise
        productions.left_factor();

        //verify
        assert_eq!(
            dump(&productions),
            vec![
                "S -> a mid_S_ext1",
                "mid_S_ext -> c",
                "mid_S_ext -> d",
                "mid_S_ext1 -> b mid_S_ext",
                "mid_S_ext1 -> e",
            ]
        );
        assert_eq!(productions.bodies("S"), Some(&vec![body("a mid_S_ext1")]));
    }
}
