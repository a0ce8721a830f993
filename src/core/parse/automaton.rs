use {
    crate::core::{
        data::stream::TokenCursor,
        lex::{
            rules::{ID, NUMBER},
            Token, EPSILON,
        },
        parse::{
            recovery::{Category, Diagnostic, ParseError, RecoveryPolicy},
            resolver::Resolvers,
            table::{GrammarTable, Prediction},
            tree::{NodeId, SyntaxTree},
            GrammarError,
        },
    },
    std::borrow::Cow,
};

static OPEN_PAREN: &str = "(";
static CLOSE_PAREN: &str = ")";
static ASSIGN_LITERAL: &str = "=";

pub struct ParseOutcome {
    pub tree: SyntaxTree,
    pub errors: Vec<ParseError>,
}

impl ParseOutcome {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// The categorised non-terminals still open around a failing stack entry.
#[derive(Default)]
struct Context {
    expression: Option<Category>,
    statement: Option<Category>,
}

/// A stack-based driver for a `GrammarTable`.
pub struct ParsingAutomaton<'g> {
    grammar: &'g GrammarTable,
    resolvers: Resolvers,
    policy: RecoveryPolicy,
    errors: Vec<ParseError>,
}

impl<'g> ParsingAutomaton<'g> {
    /// Fails if a conflicting table cell belongs to a non-terminal that no resolver
    /// handles, or if a resolver could choose a body the non-terminal does not have.
    pub fn new(
        grammar: &'g GrammarTable,
        resolvers: Resolvers,
        policy: RecoveryPolicy,
    ) -> Result<ParsingAutomaton<'g>, GrammarError> {
        for conflict in grammar.conflicts() {
            let resolver = match resolvers.get(&conflict.non_terminal) {
                Some(resolver) => resolver,
                None => {
                    return Err(GrammarError::UnresolvedConflict(
                        conflict.non_terminal.clone(),
                    ))
                }
            };

            for candidate in resolver.candidates() {
                if !grammar.has_production(&conflict.non_terminal, &candidate) {
                    return Err(GrammarError::InvalidResolution {
                        non_terminal: conflict.non_terminal.clone(),
                        body: candidate.join(" "),
                    });
                }
            }
        }

        Ok(ParsingAutomaton {
            grammar,
            resolvers,
            policy,
            errors: Vec::new(),
        })
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Parses `tokens`, appending an end marker if they lack one. `lines` holds the
    /// source lines, used to quote the offending line in diagnostics.
    pub fn run(&mut self, tokens: &[Token], lines: &[String]) -> ParseOutcome {
        let tokens: Cow<[Token]> = match tokens.last() {
            Some(token) if token.is_end() => Cow::Borrowed(tokens),
            _ => {
                let mut owned = tokens.to_vec();
                owned.push(Token::end(lines.len() + 1));
                Cow::Owned(owned)
            }
        };

        self.errors.clear();

        let mut tree = SyntaxTree::new(self.grammar.start());
        let mut stack: Vec<NodeId> = vec![tree.end(), tree.root()];
        let mut cursor = TokenCursor::observe(&tokens);
        let mut last_recovery: Option<usize> = None;

        while let Some(&top) = stack.last() {
            let token = cursor.current();
            let (symbol, is_terminal) = {
                let node = tree.node(top);
                (node.symbol.clone(), node.is_terminal)
            };

            if is_terminal {
                if symbol == token.kind {
                    tree.bind(top, &token.literal, token.line);
                    stack.pop();
                    if token.is_end() {
                        break;
                    }
                    cursor.advance();
                    continue;
                }
                if symbol == EPSILON {
                    stack.pop();
                    continue;
                }
            } else if let Some(body) = self.predict(&symbol, &mut cursor) {
                stack.pop();

                let children: Vec<NodeId> = body
                    .iter()
                    .map(|child| {
                        let id = tree.add_node(
                            child,
                            child == EPSILON || self.grammar.is_terminal(child),
                            self.grammar.is_generated(child),
                        );
                        tree.attach(top, id);
                        id
                    })
                    .collect();
                stack.extend(children.into_iter().rev());
                continue;
            }

            if !self.recover(&mut tree, &mut stack, &mut cursor, &mut last_recovery, lines) {
                break;
            }
        }

        debug!(
            "Parsed {} tokens into {} nodes with {} errors",
            tokens.len(),
            tree.len(),
            self.errors.len()
        );

        ParseOutcome {
            tree,
            errors: self.errors.clone(),
        }
    }

    fn predict(&self, non_terminal: &str, cursor: &mut TokenCursor) -> Option<Vec<String>> {
        match self.grammar.predict(non_terminal, &cursor.current().kind)? {
            Prediction::Derive(body) => Some(body.clone()),
            Prediction::Conflict => {
                let resolver = self.resolvers.get(non_terminal)?;

                cursor.mark();
                let body = resolver.resolve(cursor);
                cursor.rewind();

                debug!(
                    "Resolved conflict for '{}' at line {} as [{}]",
                    non_terminal,
                    cursor.current().line,
                    body.join(" ")
                );
                Some(body)
            }
        }
    }

    /// Walks up from `top` to the innermost categorised non-terminals enclosing it.
    /// An expression only counts if it lies inside the statement.
    fn context(&self, tree: &SyntaxTree, top: NodeId) -> Context {
        let mut context = Context::default();
        let mut current = Some(top);

        while let Some(id) = current {
            let node = tree.node(id);
            current = node.parent;
            if node.is_terminal || node.is_generated {
                continue;
            }

            match self.policy.category_of(&node.symbol) {
                Some(category) if category.is_expression() => {
                    if context.expression.is_none() {
                        context.expression = Some(category);
                    }
                }
                Some(category) => {
                    context.statement = Some(category);
                    break;
                }
                None => {}
            }
        }

        context
    }

    /// Records a diagnostic for the failure at the top of `stack` and resynchronises.
    /// Returns false when parsing cannot continue.
    fn recover(
        &mut self,
        tree: &mut SyntaxTree,
        stack: &mut Vec<NodeId>,
        cursor: &mut TokenCursor,
        last_recovery: &mut Option<usize>,
        lines: &[String],
    ) -> bool {
        let error = self.diagnose(tree, stack, cursor, lines);
        debug!("Recovering from: {}", error);

        let is_final = error.diagnostic.is_final() || cursor.at_end();
        let skip = error.diagnostic != Diagnostic::MissingTerminator
            || *last_recovery == Some(cursor.position());
        self.errors.push(error);

        if is_final {
            return false;
        }

        let start = tree.add_node(self.grammar.start(), false, false);
        tree.add_recovery_root(start);
        stack.clear();
        stack.push(tree.end());
        stack.push(start);

        if skip && !self.skip_past_terminator(cursor) {
            return false;
        }
        *last_recovery = Some(cursor.position());

        true
    }

    /// Consumes tokens up to and including the next terminator. Returns false if the
    /// end marker is reached first.
    fn skip_past_terminator(&self, cursor: &mut TokenCursor) -> bool {
        loop {
            let token = cursor.current();
            if token.is_end() {
                return false;
            }
            cursor.advance();
            if token.kind == self.policy.terminator {
                return true;
            }
        }
    }

    fn diagnose(
        &self,
        tree: &SyntaxTree,
        stack: &[NodeId],
        cursor: &TokenCursor,
        lines: &[String],
    ) -> ParseError {
        let token = cursor.current();
        let previous_line = cursor.previous().map_or(token.line, |previous| previous.line);
        let expected = stack.last().map(|&id| tree.node(id));
        let below = if stack.len() >= 2 {
            Some(&tree.node(stack[stack.len() - 2]).symbol[..])
        } else {
            None
        };

        let error = |line: usize, diagnostic: Diagnostic| ParseError {
            line,
            near: lines
                .get(line.wrapping_sub(1))
                .map_or(String::new(), |text| text.trim().to_string()),
            diagnostic,
        };

        if token.is_end() {
            let closed = cursor
                .line_tokens(previous_line)
                .any(|t| t.kind == self.policy.block_close);
            let diagnostic = if below == Some(&self.policy.block_close[..]) && !closed {
                Diagnostic::MissingBlockClose
            } else {
                Diagnostic::IncompleteProgram
            };
            return error(previous_line, diagnostic);
        }

        let (expected_symbol, expected_terminal) = match expected {
            Some(node) => (&node.symbol[..], node.is_terminal),
            None => ("", false),
        };

        let context = match stack.last() {
            Some(&top) => self.context(tree, top),
            None => Context::default(),
        };

        let diagnostic = match (context.expression, context.statement) {
            (Some(Category::Comparison), _) => {
                if RecoveryPolicy::is_word_comparison(&token.literal) {
                    Diagnostic::WordComparison(token.literal.clone())
                } else {
                    Diagnostic::InvalidComparison
                }
            }
            (Some(_), _) => {
                if RecoveryPolicy::is_word_arithmetic(&token.literal) {
                    Diagnostic::WordArithmetic(token.literal.clone())
                } else {
                    Diagnostic::InvalidArithmetic
                }
            }
            (None, Some(Category::Command)) => self.diagnose_command(expected_symbol, token),
            (None, Some(Category::Assignment)) => {
                self.diagnose_assignment(expected_symbol, expected_terminal, cursor)
            }
            (None, Some(category @ Category::Conditional))
            | (None, Some(category @ Category::Loop)) => {
                self.diagnose_block(category, below, cursor)
            }
            (None, _) => self.diagnose_unclassified(cursor),
        };

        if diagnostic == Diagnostic::MissingTerminator {
            error(previous_line, diagnostic)
        } else {
            error(token.line, diagnostic)
        }
    }

    fn diagnose_command(&self, expected: &str, token: &Token) -> Diagnostic {
        let policy = &self.policy;
        let kind = &token.kind[..];

        if expected == policy.terminator {
            if kind == policy.separator || kind == NUMBER {
                Diagnostic::ParameterCount
            } else if kind == policy.quote {
                Diagnostic::UnexpectedParameters
            } else {
                Diagnostic::MissingTerminator
            }
        } else if (kind == ID && expected == NUMBER)
            || (kind == NUMBER && expected == ID)
            || expected == policy.string_symbol
        {
            Diagnostic::ParameterType
        } else if kind == policy.terminator
            && (expected == policy.separator || expected == NUMBER || expected == ID)
        {
            Diagnostic::ParameterCount
        } else {
            Diagnostic::Statement(Some(Category::Command))
        }
    }

    fn diagnose_assignment(
        &self,
        expected: &str,
        expected_terminal: bool,
        cursor: &TokenCursor,
    ) -> Diagnostic {
        let token = cursor.current();
        let on_line: Vec<&Token> = cursor.line_tokens(token.line).collect();
        let has_literal = |literal: &str| on_line.iter().any(|t| t.literal == literal);

        let uses_math = on_line
            .iter()
            .any(|t| RecoveryPolicy::is_arithmetic_literal(&t.literal));

        if uses_math && !(has_literal(OPEN_PAREN) && has_literal(CLOSE_PAREN)) {
            Diagnostic::UnparenthesizedMath
        } else if expected == self.policy.terminator {
            Diagnostic::MissingTerminator
        } else if !expected_terminal {
            if token.literal == OPEN_PAREN {
                let function = cursor
                    .previous()
                    .map_or(String::new(), |previous| previous.literal.clone());
                Diagnostic::NeedlessParentheses(function)
            } else {
                Diagnostic::InvalidAssignedValue(token.literal.clone())
            }
        } else {
            Diagnostic::Statement(Some(Category::Assignment))
        }
    }

    fn diagnose_block(
        &self,
        category: Category,
        below: Option<&str>,
        cursor: &TokenCursor,
    ) -> Diagnostic {
        let line = cursor.current().line;
        let opens_block = cursor
            .line_tokens(line)
            .any(|t| t.kind == self.policy.block_open);
        let parenthesized = cursor
            .line_tokens(line)
            .any(|t| t.literal == OPEN_PAREN || t.literal == CLOSE_PAREN);

        if below == Some(&self.policy.block_open[..]) && !opens_block {
            Diagnostic::MissingBlockOpen(category)
        } else if parenthesized {
            Diagnostic::ParenthesizedCondition(category)
        } else {
            Diagnostic::Statement(Some(category))
        }
    }

    fn diagnose_unclassified(&self, cursor: &TokenCursor) -> Diagnostic {
        let token = cursor.current();
        let assigns = cursor
            .line_tokens(token.line)
            .any(|t| t.literal == ASSIGN_LITERAL);

        if !assigns {
            Diagnostic::Statement(None)
        } else if token.kind != ID {
            Diagnostic::AssignmentTarget
        } else {
            Diagnostic::Statement(Some(Category::Assignment))
        }
    }
}
