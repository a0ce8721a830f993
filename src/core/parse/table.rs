use {
    crate::core::{
        lex::{END_MARKER, EPSILON},
        parse::{
            grammar::ProductionSet,
            rewrite::GrammarRewriter,
            sets::{self, SymbolSets},
            GrammarError, Production,
        },
        spec,
    },
    std::{
        collections::{BTreeMap, BTreeSet},
        fmt,
    },
};

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Prediction {
    Derive(Vec<String>),
    Conflict,
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Prediction::Derive(ref body) => write!(f, "{}", body.join(" ")),
            Prediction::Conflict => write!(f, "<conflict>"),
        }
    }
}

pub type PredictiveTable = BTreeMap<String, BTreeMap<String, Prediction>>;

/// A FIRST/FIRST collision: every production competing for one table cell.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Conflict {
    pub non_terminal: String,
    pub terminal: String,
    pub productions: Vec<Vec<String>>,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let choices: Vec<String> = self
            .productions
            .iter()
            .map(|body| format!("[{}]", body.join(" ")))
            .collect();
        write!(
            f,
            "'{}' on '{}' may derive {}",
            self.non_terminal,
            self.terminal,
            choices.join(" or ")
        )
    }
}

/// An LL(1) predictive table together with the grammar it was built from.
pub struct GrammarTable {
    productions: ProductionSet,
    terminals: BTreeSet<String>,
    generated: BTreeSet<String>,
    first: SymbolSets,
    follow: SymbolSets,
    table: PredictiveTable,
    conflicts: Vec<Conflict>,
    start: String,
}

impl GrammarTable {
    /// Runs the whole pipeline over grammar-file text: rewriting, left-recursion
    /// elimination, left factoring, FIRST, FOLLOW and the table itself. The start
    /// symbol defaults to the head of the first rule.
    pub fn load_from_spec(
        grammar: &str,
        terminals: &[String],
        start: Option<&str>,
    ) -> Result<GrammarTable, GrammarError> {
        let raw = spec::parse_grammar(grammar)?;
        let terminals: BTreeSet<String> = terminals.iter().cloned().collect();

        let start = match start {
            Some(start) => start.to_string(),
            None => match raw.first() {
                Some(rule) => rule.head.clone(),
                None => return Err(GrammarError::EmptyGrammar),
            },
        };

        if let Some(rule) = raw.iter().find(|rule| terminals.contains(&rule.head)) {
            return Err(GrammarError::TerminalHead(rule.head.clone()));
        }

        let mut rewriter = GrammarRewriter::new();
        let rewritten = rewriter.rewrite(raw)?;

        let mut productions = ProductionSet::from_raw(&rewritten);
        productions.eliminate_left_recursion();
        productions.left_factor();

        if !productions.contains(&start) {
            return Err(GrammarError::UndefinedStart(start));
        }

        let mut generated: BTreeSet<String> = rewriter.generated().clone();
        generated.extend(productions.generated().iter().cloned());

        GrammarTable::build(productions, terminals, generated, start)
    }

    fn build(
        productions: ProductionSet,
        terminals: BTreeSet<String>,
        generated: BTreeSet<String>,
        start: String,
    ) -> Result<GrammarTable, GrammarError> {
        let is_terminal = |symbol: &str| symbol == END_MARKER || terminals.contains(symbol);

        let first = sets::first_sets(&productions, &is_terminal)?;
        let follow = sets::follow_sets(&productions, &first, &start, &is_terminal);

        let mut table: PredictiveTable = BTreeMap::new();
        let mut conflicts: Vec<Conflict> = Vec::new();
        let mut nullable: Vec<(&String, &Vec<String>)> = Vec::new();

        for (head, bodies) in productions.iter() {
            let row = table.entry(head.clone()).or_insert_with(BTreeMap::new);

            for body in bodies {
                let body_first = sets::first_of_sequence(body, &first, &is_terminal)?;

                for terminal in body_first.iter().filter(|t| *t != EPSILON) {
                    match row.get(terminal).cloned() {
                        None => {
                            row.insert(terminal.clone(), Prediction::Derive(body.clone()));
                        }
                        Some(Prediction::Derive(ref existing)) if existing == body => {}
                        Some(Prediction::Derive(existing)) => {
                            row.insert(terminal.clone(), Prediction::Conflict);
                            conflicts.push(Conflict {
                                non_terminal: head.clone(),
                                terminal: terminal.clone(),
                                productions: vec![existing, body.clone()],
                            });
                        }
                        Some(Prediction::Conflict) => {
                            if let Some(conflict) = conflicts
                                .iter_mut()
                                .find(|c| &c.non_terminal == head && &c.terminal == terminal)
                            {
                                conflict.productions.push(body.clone());
                            }
                        }
                    }
                }

                if body_first.contains(EPSILON) {
                    nullable.push((head, body));
                }
            }
        }

        for (head, body) in nullable {
            let row = table.entry(head.clone()).or_insert_with(BTreeMap::new);
            if let Some(head_follow) = follow.get(head) {
                for terminal in head_follow {
                    match row.get(terminal) {
                        None => {
                            row.insert(terminal.clone(), Prediction::Derive(body.clone()));
                        }
                        Some(Prediction::Derive(existing)) if existing == body => {}
                        Some(_) => {
                            return Err(GrammarError::FirstFollowConflict {
                                non_terminal: head.clone(),
                                terminal: terminal.clone(),
                            });
                        }
                    }
                }
            }
        }

        for conflict in &conflicts {
            warn!("Grammar conflict: {}", conflict);
        }

        info!(
            "Built predictive table for {} non-terminals ({} productions, {} conflicts)",
            table.len(),
            productions.len(),
            conflicts.len()
        );

        Ok(GrammarTable {
            productions,
            terminals,
            generated,
            first,
            follow,
            table,
            conflicts,
            start,
        })
    }

    pub fn predictive_table(&self) -> &PredictiveTable {
        &self.table
    }

    pub fn predict(&self, non_terminal: &str, terminal: &str) -> Option<&Prediction> {
        self.table.get(non_terminal)?.get(terminal)
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    pub fn productions(&self) -> &ProductionSet {
        &self.productions
    }

    pub fn first_sets(&self) -> &SymbolSets {
        &self.first
    }

    pub fn follow_sets(&self) -> &SymbolSets {
        &self.follow
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn is_terminal(&self, symbol: &str) -> bool {
        symbol == END_MARKER || self.terminals.contains(symbol)
    }

    /// Whether `symbol` was introduced by rewriting rather than written in the grammar.
    pub fn is_generated(&self, symbol: &str) -> bool {
        self.generated.contains(symbol)
    }

    pub fn has_production(&self, non_terminal: &str, body: &[String]) -> bool {
        self.productions
            .bodies(non_terminal)
            .map_or(false, |bodies| bodies.iter().any(|b| b.as_slice() == body))
    }

    pub fn dump_productions(&self) -> String {
        let lines: Vec<String> = self
            .productions
            .productions()
            .iter()
            .map(Production::to_string)
            .collect();
        lines.join("\n")
    }

    pub fn dump_sets(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        for (name, by_symbol) in &[("FIRST", &self.first), ("FOLLOW", &self.follow)] {
            for (symbol, set) in by_symbol.iter() {
                let members: Vec<&str> = set.iter().map(|s| &s[..]).collect();
                lines.push(format!("{}({}) = {{{}}}", name, symbol, members.join(", ")));
            }
        }
        lines.join("\n")
    }

    pub fn dump_table(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        for (non_terminal, row) in &self.table {
            lines.push(format!("{}:", non_terminal));
            for (terminal, prediction) in row {
                lines.push(format!("  {} -> {}", terminal, prediction));
            }
        }
        lines.join("\n")
    }
}
