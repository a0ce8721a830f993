use {
    crate::core::{
        lex::{END_MARKER, EPSILON},
        parse::{grammar::ProductionSet, GrammarError},
    },
    std::collections::{BTreeMap, BTreeSet},
};

pub type SymbolSets = BTreeMap<String, BTreeSet<String>>;

/// Computes FIRST for every defined non-terminal. `ε` marks nullability.
pub fn first_sets(
    productions: &ProductionSet,
    is_terminal: &dyn Fn(&str) -> bool,
) -> Result<SymbolSets, GrammarError> {
    for (_, bodies) in productions.iter() {
        for symbol in bodies.iter().flatten() {
            if !is_terminal(symbol) && !productions.contains(symbol) {
                return Err(GrammarError::UndefinedNonTerminal(symbol.clone()));
            }
        }
    }

    let mut first: SymbolSets = productions
        .heads()
        .iter()
        .map(|head| (head.clone(), BTreeSet::new()))
        .collect();

    let mut passes = 0;
    let mut changed = true;
    while changed {
        changed = false;
        passes += 1;

        for (head, bodies) in productions.iter() {
            for body in bodies {
                let mut additions: BTreeSet<String> = BTreeSet::new();
                let mut nullable = true;

                for symbol in body {
                    if is_terminal(symbol) {
                        if symbol != EPSILON {
                            additions.insert(symbol.clone());
                            nullable = false;
                            break;
                        }
                    } else if symbol != head {
                        let symbol_first = &first[symbol];
                        additions.extend(
                            symbol_first
                                .iter()
                                .filter(|terminal| *terminal != EPSILON)
                                .cloned(),
                        );
                        if !symbol_first.contains(EPSILON) {
                            nullable = false;
                            break;
                        }
                    }
                }

                if nullable {
                    additions.insert(EPSILON.to_string());
                }

                let target = first.entry(head.clone()).or_insert_with(BTreeSet::new);
                for terminal in additions {
                    changed |= target.insert(terminal);
                }
            }
        }
    }

    debug!("FIRST sets converged after {} passes", passes);

    Ok(first)
}

/// FIRST of a symbol sequence, containing `ε` when every symbol is nullable.
pub fn first_of_sequence(
    body: &[String],
    first: &SymbolSets,
    is_terminal: &dyn Fn(&str) -> bool,
) -> Result<BTreeSet<String>, GrammarError> {
    let mut result: BTreeSet<String> = BTreeSet::new();

    for symbol in body {
        if is_terminal(symbol) {
            if symbol != EPSILON {
                result.insert(symbol.clone());
                return Ok(result);
            }
            continue;
        }

        let symbol_first = match first.get(symbol) {
            Some(symbol_first) => symbol_first,
            None => return Err(GrammarError::UndefinedNonTerminal(symbol.clone())),
        };

        result.extend(
            symbol_first
                .iter()
                .filter(|terminal| *terminal != EPSILON)
                .cloned(),
        );
        if !symbol_first.contains(EPSILON) {
            return Ok(result);
        }
    }

    result.insert(EPSILON.to_string());
    Ok(result)
}

/// Computes FOLLOW for every defined non-terminal, seeding `start` with the end marker.
pub fn follow_sets(
    productions: &ProductionSet,
    first: &SymbolSets,
    start: &str,
    is_terminal: &dyn Fn(&str) -> bool,
) -> SymbolSets {
    let mut follow: SymbolSets = productions
        .heads()
        .iter()
        .map(|head| (head.clone(), BTreeSet::new()))
        .collect();

    follow
        .entry(start.to_string())
        .or_insert_with(BTreeSet::new)
        .insert(END_MARKER.to_string());

    let mut changed = true;
    while changed {
        changed = false;

        for (head, bodies) in productions.iter() {
            for body in bodies {
                let head_follow: BTreeSet<String> =
                    follow.get(head).cloned().unwrap_or_default();

                let mut trailer = head_follow.clone();
                trailer.insert(EPSILON.to_string());

                for (i, symbol) in body.iter().enumerate().rev() {
                    if is_terminal(symbol) {
                        trailer.clear();
                        trailer.insert(symbol.clone());
                        continue;
                    }

                    let mut additions: BTreeSet<String> = trailer
                        .iter()
                        .filter(|terminal| *terminal != EPSILON)
                        .cloned()
                        .collect();
                    if i == body.len() - 1 || trailer.contains(EPSILON) {
                        additions.extend(head_follow.iter().cloned());
                    }

                    let target = follow.entry(symbol.clone()).or_insert_with(BTreeSet::new);
                    for terminal in additions {
                        changed |= target.insert(terminal);
                    }

                    if let Some(symbol_first) = first.get(symbol) {
                        if !symbol_first.contains(EPSILON) {
                            trailer.clear();
                        }
                        trailer.extend(
                            symbol_first
                                .iter()
                                .filter(|terminal| *terminal != EPSILON)
                                .cloned(),
                        );
                    }
                }
            }
        }
    }

    follow
}
