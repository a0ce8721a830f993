use {
    crate::core::lex::{END_MARKER, EPSILON},
    std::fmt,
};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(usize);

#[derive(Clone, Debug)]
pub struct Node {
    pub symbol: String,
    pub literal: Option<String>,
    pub line: Option<usize>,
    pub is_terminal: bool,
    pub is_generated: bool,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
}

impl Node {
    pub fn is_epsilon(&self) -> bool {
        self.is_terminal && self.symbol == EPSILON
    }
}

/// A concrete syntax tree stored in an arena. The start-symbol node and the end-marker
/// node are the two root-level nodes; subtrees begun after error recovery are kept as
/// additional detached roots.
#[derive(Clone, Debug)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    root: NodeId,
    end: NodeId,
    recovery_roots: Vec<NodeId>,
}

impl SyntaxTree {
    pub fn new(start: &str) -> Self {
        let mut tree = SyntaxTree {
            nodes: Vec::new(),
            root: NodeId(0),
            end: NodeId(1),
            recovery_roots: Vec::new(),
        };
        tree.root = tree.add_node(start, false, false);
        tree.end = tree.add_node(END_MARKER, true, false);
        tree
    }

    /// Creates a detached node.
    pub fn add_node(&mut self, symbol: &str, is_terminal: bool, is_generated: bool) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            symbol: symbol.to_string(),
            literal: None,
            line: None,
            is_terminal,
            is_generated,
            children: Vec::new(),
            parent: None,
        });
        id
    }

    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    pub fn add_recovery_root(&mut self, id: NodeId) {
        self.recovery_roots.push(id);
    }

    /// Fixes the literal and line of a matched terminal. Ancestors that have no line
    /// yet take the line of their first matched leaf.
    pub fn bind(&mut self, id: NodeId, literal: &str, line: usize) {
        self.nodes[id.0].literal = Some(literal.to_string());
        self.nodes[id.0].line = Some(line);

        let mut current = self.nodes[id.0].parent;
        while let Some(parent) = current {
            let node = &mut self.nodes[parent.0];
            if node.line.is_some() {
                break;
            }
            node.line = Some(line);
            current = node.parent;
        }
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn end(&self) -> NodeId {
        self.end
    }

    pub fn recovery_roots(&self) -> &[NodeId] {
        &self.recovery_roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The children of `id` as written in the grammar: helper non-terminals introduced
    /// by rewriting are replaced by their own logical children and `ε` leaves vanish.
    pub fn logical_children(&self, id: NodeId) -> Vec<NodeId> {
        let mut children: Vec<NodeId> = Vec::new();
        for &child in &self.nodes[id.0].children {
            let node = &self.nodes[child.0];
            if node.is_epsilon() {
                continue;
            }
            if !node.is_terminal && node.is_generated {
                children.extend(self.logical_children(child));
            } else {
                children.push(child);
            }
        }
        children
    }

    fn fmt_node(
        &self,
        f: &mut fmt::Formatter,
        id: NodeId,
        prefix: &str,
        is_tail: bool,
    ) -> fmt::Result {
        let node = &self.nodes[id.0];
        let branch = if is_tail { "└── " } else { "├── " };

        match node.literal {
            Some(ref literal) if node.is_terminal => {
                writeln!(f, "{}{}{} <- '{}'", prefix, branch, node.symbol, literal)?
            }
            _ => writeln!(f, "{}{}{}", prefix, branch, node.symbol)?,
        }

        let child_prefix = format!("{}{}", prefix, if is_tail { "    " } else { "│   " });
        let len = node.children.len();
        for (i, &child) in node.children.iter().enumerate() {
            self.fmt_node(f, child, &child_prefix, i == len - 1)?;
        }

        Ok(())
    }
}

impl fmt::Display for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut roots: Vec<NodeId> = vec![self.root, self.end];
        roots.extend(self.recovery_roots.iter().cloned());

        let len = roots.len();
        for (i, &root) in roots.iter().enumerate() {
            self.fmt_node(f, root, "", i == len - 1)?;
        }
        Ok(())
    }
}
