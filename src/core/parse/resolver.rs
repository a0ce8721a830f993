use {
    crate::core::data::stream::TokenCursor,
    std::{
        collections::{BTreeMap, BTreeSet},
        fmt,
        sync::Arc,
    },
};

/// Picks one production for a non-terminal whose table cell holds a conflict. The
/// cursor is positioned at the current token and may be moved freely; the caller
/// restores it afterwards.
pub trait ConflictResolver: Send + Sync {
    fn resolve(&self, lookahead: &mut TokenCursor) -> Vec<String>;

    /// Every production this resolver may return.
    fn candidates(&self) -> Vec<Vec<String>>;
}

/// Scans ahead up to the end marker or a boundary token, choosing `on_trigger` if any
/// trigger token is seen on the way and `otherwise` if none is.
#[derive(Clone, Debug)]
pub struct LookaheadResolver {
    boundaries: BTreeSet<String>,
    triggers: BTreeSet<String>,
    on_trigger: Vec<String>,
    otherwise: Vec<String>,
}

impl LookaheadResolver {
    pub fn new(
        boundaries: &[&str],
        triggers: &[&str],
        on_trigger: &[&str],
        otherwise: &[&str],
    ) -> Self {
        let owned = |items: &[&str]| -> Vec<String> {
            items.iter().map(|item| item.to_string()).collect()
        };

        LookaheadResolver {
            boundaries: owned(boundaries).into_iter().collect(),
            triggers: owned(triggers).into_iter().collect(),
            on_trigger: owned(on_trigger),
            otherwise: owned(otherwise),
        }
    }
}

impl ConflictResolver for LookaheadResolver {
    fn resolve(&self, lookahead: &mut TokenCursor) -> Vec<String> {
        loop {
            let token = lookahead.current();
            if token.is_end() || self.boundaries.contains(&token.kind) {
                return self.otherwise.clone();
            }
            if self.triggers.contains(&token.kind) {
                return self.on_trigger.clone();
            }
            lookahead.advance();
        }
    }

    fn candidates(&self) -> Vec<Vec<String>> {
        vec![self.on_trigger.clone(), self.otherwise.clone()]
    }
}

/// Conflict resolvers keyed by the non-terminal they disambiguate.
#[derive(Clone)]
pub struct Resolvers {
    by_non_terminal: BTreeMap<String, Arc<dyn ConflictResolver>>,
}

impl Resolvers {
    pub fn new() -> Self {
        Resolvers {
            by_non_terminal: BTreeMap::new(),
        }
    }

    pub fn register<R: ConflictResolver + 'static>(
        &mut self,
        non_terminal: &str,
        resolver: R,
    ) -> &mut Self {
        self.by_non_terminal
            .insert(non_terminal.to_string(), Arc::new(resolver));
        self
    }

    pub fn get(&self, non_terminal: &str) -> Option<&dyn ConflictResolver> {
        self.by_non_terminal
            .get(non_terminal)
            .map(|resolver| resolver.as_ref())
    }

    pub fn contains(&self, non_terminal: &str) -> bool {
        self.by_non_terminal.contains_key(non_terminal)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &dyn ConflictResolver)> {
        self.by_non_terminal
            .iter()
            .map(|(non_terminal, resolver)| (non_terminal, resolver.as_ref()))
    }
}

impl Default for Resolvers {
    /// Boolean versus arithmetic expression statements of the robot language.
    fn default() -> Self {
        let mut resolvers = Resolvers::new();
        resolvers.register(
            "statement",
            LookaheadResolver::new(
                &["SEMI", "LBRACE", "RBRACE"],
                &["SMALL", "LARGE", "EQUAL", "NOTEQUAL", "AND", "OR", "NOT"],
                &["boolExp"],
                &["mathExp"],
            ),
        );
        resolvers
    }
}

impl fmt::Debug for Resolvers {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set().entries(self.by_non_terminal.keys()).finish()
    }
}
