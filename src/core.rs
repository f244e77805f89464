use crate::error::{EditError, InconsistencyError};
use crate::parser::{self, Dialect};
use crate::statement::Statement;
use indexmap::{IndexMap, IndexSet};
use petgraph::stable_graph as pg;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, trace};

////////////////////////////////////////////////////////////////////////////////
// Options

/// Node identifiers (unique within a tree and never reused)
pub type NodeId = u32;

/// Per-node messages explaining why a step is wrong (empty means no problem)
pub type Diagnostics = IndexMap<NodeId, String>;

/// Text of a terminator marking a branch that stays open
pub const OPEN_TERMINATOR: &str = "◯";

/// Text of a terminator marking a branch closed by a contradiction
pub const CLOSED_TERMINATOR: &str = "×";

/// Settings that change how a tree is read and checked
///
/// Collaborators hand these over as JSON with camelCase keys; any key left
/// out keeps its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TreeOptions {
    /// Grammar used to parse node text
    pub dialect: Dialect,

    /// When set, a closed terminator must cite an atomic statement and its
    /// negation; otherwise any statement and its exact negation will do
    pub require_atomic_contradiction: bool,

    /// When set, a tree is correct only if every leaf is a terminator
    pub require_all_branches_terminated: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            require_atomic_contradiction: true,
            require_all_branches_terminated: true,
        }
    }
}

impl TreeOptions {
    /// Loads options from a JSON object
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Nodes

/// A node in a truth tree
///
/// Nodes refer to one another only by [`NodeId`]; the owning [`TruthTree`]
/// resolves them.
#[derive(Debug, Clone)]
pub struct TruthTreeNode {
    pub(crate) id: NodeId,
    pub(crate) text: String,
    pub(crate) statement: Option<Statement>,
    pub(crate) premise: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) antecedent: Option<NodeId>,
    pub(crate) decomposition: IndexSet<NodeId>,
    pub(crate) correct_decomposition: OnceCell<IndexSet<NodeId>>,
}

impl TruthTreeNode {
    pub(crate) fn new(id: NodeId, text: &str, dialect: Dialect) -> Self {
        let mut node = Self {
            id,
            text: String::new(),
            statement: None,
            premise: false,
            parent: None,
            children: vec![],
            antecedent: None,
            decomposition: IndexSet::new(),
            correct_decomposition: OnceCell::new(),
        };
        node.set_text(text, dialect);
        node
    }

    /// Stores trimmed text and reparses it; unparsable text leaves no
    /// statement behind
    pub(crate) fn set_text(&mut self, text: &str, dialect: Dialect) {
        self.text = text.trim().to_owned();
        self.statement = if self.text.is_empty() || self.is_terminator() {
            None
        } else {
            match parser::parse_with(dialect, &self.text) {
                Ok(statement) => Some(statement),
                Err(err) => {
                    trace!(node = self.id, %err, "unparsable statement");
                    None
                }
            }
        };
        self.correct_decomposition.take();
    }

    /// Returns the node's identifier
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the node's (trimmed) text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the parsed statement, if the text is a statement
    pub fn statement(&self) -> Option<&Statement> {
        self.statement.as_ref()
    }

    /// Returns true iff the node is given rather than derived
    pub fn is_premise(&self) -> bool {
        self.premise
    }

    /// Returns the parent id (`None` for the root)
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns the child ids, in branch order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Returns the node whose decomposition this node claims to be part of
    pub fn antecedent(&self) -> Option<NodeId> {
        self.antecedent
    }

    /// Returns the nodes this node cites: its decomposition, or for a closed
    /// terminator the two contradicting statements
    pub fn decomposition(&self) -> &IndexSet<NodeId> {
        &self.decomposition
    }

    /// Returns true iff the text is [`OPEN_TERMINATOR`]
    pub fn is_open_terminator(&self) -> bool {
        self.text == OPEN_TERMINATOR
    }

    /// Returns true iff the text is [`CLOSED_TERMINATOR`]
    pub fn is_closed_terminator(&self) -> bool {
        self.text == CLOSED_TERMINATOR
    }

    /// Returns true iff the node ends a branch
    pub fn is_terminator(&self) -> bool {
        self.is_open_terminator() || self.is_closed_terminator()
    }

    /// Returns true iff the node holds no text at all
    pub fn is_placeholder(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns true iff the node has no children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl fmt::Display for TruthTreeNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.text.is_empty() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{}: {}", self.id, self.text)
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Trees

/// A truth tree (main data structure for this crate)
///
/// The tree owns every node; nodes point at their parent, children,
/// antecedent and decomposition by id. The set of leaves is kept up to date
/// by every edit.
///
/// Each node caches its correct decomposition. Edits to a node's text,
/// antecedent or decomposition clear the caches that could depend on them,
/// and structural edits clear them all.
#[derive(Debug, Clone)]
pub struct TruthTree {
    pub(crate) nodes: IndexMap<NodeId, TruthTreeNode>,
    pub(crate) root: NodeId,
    pub(crate) leaves: IndexSet<NodeId>,
    pub(crate) options: TreeOptions,
    next_id: NodeId,
}

/// # Creating a truth tree
impl TruthTree {
    /// Creates a tree holding a single empty node
    pub fn empty() -> Self {
        Self::empty_with(TreeOptions::default())
    }

    /// Creates a tree holding a single empty node, checked with `options`
    pub fn empty_with(options: TreeOptions) -> Self {
        let root = TruthTreeNode::new(0, "", options.dialect);
        Self {
            nodes: IndexMap::from([(0, root)]),
            root: 0,
            leaves: IndexSet::from([0]),
            options,
            next_id: 1,
        }
    }

    /// Assembles a tree from nodes whose links are already set
    pub(crate) fn from_nodes(
        nodes: IndexMap<NodeId, TruthTreeNode>,
        root: NodeId,
        options: TreeOptions,
    ) -> Self {
        let leaves = nodes
            .values()
            .filter(|node| node.is_leaf())
            .map(|node| node.id)
            .collect();
        let next_id = nodes.keys().max().map_or(0, |max| max + 1);
        Self {
            nodes,
            root,
            leaves,
            options,
            next_id,
        }
    }
}

impl Default for TruthTree {
    fn default() -> Self {
        Self::empty()
    }
}

/// # Basic operations
impl TruthTree {
    /// Returns the id of the root node
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns a node given its id, if it exists
    pub fn node(&self, id: NodeId) -> Option<&TruthTreeNode> {
        self.nodes.get(&id)
    }

    /// Returns an iterator of all nodes, in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &TruthTreeNode> {
        self.nodes.values()
    }

    /// Returns the number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true iff the tree has no nodes (never the case for a built tree)
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the ids of all childless nodes
    pub fn leaves(&self) -> &IndexSet<NodeId> {
        &self.leaves
    }

    /// Returns the options the tree is checked with
    pub fn options(&self) -> &TreeOptions {
        &self.options
    }

    /// Replaces the options, reparsing every node if the dialect changed
    pub fn set_options(&mut self, options: TreeOptions) {
        if options.dialect != self.options.dialect {
            for node in self.nodes.values_mut() {
                let text = std::mem::take(&mut node.text);
                node.set_text(&text, options.dialect);
            }
        }
        self.options = options;
        self.invalidate_all();
    }

    pub(crate) fn lookup(&self, id: NodeId) -> Result<&TruthTreeNode, InconsistencyError> {
        self.nodes.get(&id).ok_or(InconsistencyError::MissingNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut TruthTreeNode, EditError> {
        self.nodes.get_mut(&id).ok_or(EditError::UnknownNode(id))
    }

    fn fresh_id(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// # Modification operations
impl TruthTree {
    /// Adds an empty node below `id` and returns its id
    ///
    /// With `new_branch`, the node becomes an additional child of `id`.
    /// Otherwise it is spliced in between `id` and its current children.
    pub fn add_node_after(&mut self, id: NodeId, new_branch: bool) -> Result<NodeId, EditError> {
        self.node_mut(id)?;
        let new_id = self.fresh_id();
        let mut node = TruthTreeNode::new(new_id, "", self.options.dialect);
        node.parent = Some(id);

        if !new_branch {
            let parent = self.node_mut(id)?;
            node.children = std::mem::take(&mut parent.children);
            for child in node.children.clone() {
                self.node_mut(child)?.parent = Some(new_id);
            }
        }
        self.node_mut(id)?.children.push(new_id);

        self.leaves.shift_remove(&id);
        if node.is_leaf() {
            self.leaves.insert(new_id);
        }
        self.nodes.insert(new_id, node);
        self.invalidate_all();
        Ok(new_id)
    }

    /// Adds an empty node directly above `id` and returns its id
    ///
    /// Adding above the root makes the new node the root.
    pub fn add_node_before(&mut self, id: NodeId) -> Result<NodeId, EditError> {
        let parent = self.node_mut(id)?.parent;
        let new_id = self.fresh_id();
        let mut node = TruthTreeNode::new(new_id, "", self.options.dialect);
        node.parent = parent;
        node.children = vec![id];

        match parent {
            Some(parent) => {
                let siblings = &mut self.node_mut(parent)?.children;
                if let Some(slot) = siblings.iter_mut().find(|sibling| **sibling == id) {
                    *slot = new_id;
                }
            }
            None => self.root = new_id,
        }
        self.node_mut(id)?.parent = Some(new_id);
        self.nodes.insert(new_id, node);
        self.invalidate_all();
        Ok(new_id)
    }

    /// Removes a node, moving its children up to its parent
    ///
    /// The root can only be removed when it has at most one child, which
    /// then becomes the root. Every reference to the node is dropped.
    pub fn delete_node(&mut self, id: NodeId) -> Result<(), EditError> {
        if self.nodes.len() == 1 {
            return Err(EditError::LastNode);
        }
        let node = self.nodes.get(&id).ok_or(EditError::UnknownNode(id))?;
        let parent = node.parent;
        let children = node.children.clone();

        match parent {
            None => {
                let new_root = match children.as_slice() {
                    [only] => *only,
                    _ => return Err(EditError::RootHasBranches(id)),
                };
                self.node_mut(new_root)?.parent = None;
                self.root = new_root;
            }
            Some(parent) => {
                for &child in &children {
                    self.node_mut(child)?.parent = Some(parent);
                }
                let siblings = &mut self.node_mut(parent)?.children;
                if let Some(index) = siblings.iter().position(|sibling| *sibling == id) {
                    siblings.splice(index..=index, children);
                }
                if siblings.is_empty() {
                    self.leaves.insert(parent);
                }
            }
        }

        self.nodes.shift_remove(&id);
        self.leaves.shift_remove(&id);
        for other in self.nodes.values_mut() {
            other.decomposition.shift_remove(&id);
            if other.antecedent == Some(id) {
                other.antecedent = None;
            }
        }
        self.invalidate_all();
        Ok(())
    }

    /// Replaces a node's text (trimmed) and reparses it
    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<(), EditError> {
        let dialect = self.options.dialect;
        self.node_mut(id)?.set_text(text, dialect);
        self.invalidate_around(id);
        Ok(())
    }

    /// Marks or unmarks a node as a premise
    pub fn set_premise(&mut self, id: NodeId, premise: bool) -> Result<(), EditError> {
        self.node_mut(id)?.premise = premise;
        Ok(())
    }

    /// Records `target` as part of the decomposition of `origin`
    ///
    /// Unless either node is a terminator, `origin` also becomes the
    /// antecedent of `target`, and `target` leaves the decomposition of its
    /// previous antecedent. Terminators cite and are cited without taking
    /// part in antecedent links, so several statements may cite the same
    /// open terminator.
    pub fn add_decomposition(&mut self, origin: NodeId, target: NodeId) -> Result<(), EditError> {
        let target_is_terminator = self.node_mut(target)?.is_terminator();
        let origin_node = self.node_mut(origin)?;
        origin_node.decomposition.insert(target);

        if !origin_node.is_terminator() && !target_is_terminator {
            let target_node = self.node_mut(target)?;
            let previous = target_node.antecedent.replace(origin);
            if let Some(previous) = previous.filter(|previous| *previous != origin) {
                if let Ok(previous_node) = self.node_mut(previous) {
                    previous_node.decomposition.shift_remove(&target);
                }
                self.invalidate_around(previous);
            }
        }
        self.invalidate_around(origin);
        self.invalidate_around(target);
        Ok(())
    }

    /// Removes `target` from the decomposition of `origin`, clearing the
    /// antecedent of `target` if it pointed at `origin`
    pub fn remove_decomposition(&mut self, origin: NodeId, target: NodeId) -> Result<(), EditError> {
        self.node_mut(target)?;
        self.node_mut(origin)?.decomposition.shift_remove(&target);
        let target_node = self.node_mut(target)?;
        if target_node.antecedent == Some(origin) {
            target_node.antecedent = None;
        }
        self.invalidate_around(origin);
        self.invalidate_around(target);
        Ok(())
    }
}

/// # Cache invalidation
impl TruthTree {
    fn invalidate(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.correct_decomposition.take();
        }
    }

    /// Clears the cache of `id`, of its antecedent, and of every node citing
    /// it
    fn invalidate_around(&mut self, id: NodeId) {
        let mut stale = vec![id];
        stale.extend(self.nodes.get(&id).and_then(|node| node.antecedent));
        stale.extend(
            self.nodes
                .values()
                .filter(|node| node.decomposition.contains(&id))
                .map(|node| node.id),
        );
        debug!(node = id, ?stale, "invalidating correct decompositions");
        for id in stale {
            self.invalidate(id);
        }
    }

    fn invalidate_all(&mut self) {
        debug!(nodes = self.nodes.len(), "invalidating every correct decomposition");
        for node in self.nodes.values_mut() {
            node.correct_decomposition.take();
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Rendering

#[derive(Debug, Clone, Copy)]
enum Link {
    Child,
    Decomposition,
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "")
    }
}

/// DOT formatting
impl TruthTree {
    fn node_format(highlights: &HashMap<NodeId, String>, node: &TruthTreeNode) -> String {
        let base = if node.is_terminator() {
            "shape=plaintext,fontcolor=gray35".to_string()
        } else if node.premise {
            "shape=rectangle,color=darkslateblue,fontcolor=darkslateblue,penwidth=2"
                .to_string()
        } else {
            "shape=rectangle,color=gray35,fontcolor=gray35".to_string()
        };
        base + &match highlights.get(&node.id) {
            Some(c) => format!(",style=filled,fillcolor={}", c),
            None => "".to_string(),
        }
    }

    /// Returns a representation of the tree in the
    /// [DOT](https://graphviz.org/doc/info/lang.html) markup language
    ///
    /// Parent-child edges are solid and decomposition references dashed.
    /// Nodes are filled with the colors given in `highlights`.
    pub fn dot(&self, highlights: &HashMap<NodeId, String>) -> String {
        let mut graph = pg::StableGraph::new();
        let mut indexes = HashMap::new();
        for node in self.nodes.values() {
            indexes.insert(node.id, graph.add_node(node));
        }
        for node in self.nodes.values() {
            let source = indexes[&node.id];
            for child in &node.children {
                if let Some(&target) = indexes.get(child) {
                    graph.add_edge(source, target, Link::Child);
                }
            }
            for cited in &node.decomposition {
                if let Some(&target) = indexes.get(cited) {
                    graph.add_edge(source, target, Link::Decomposition);
                }
            }
        }

        let get_node_attrs = |_, (_, node): (pg::NodeIndex, &&TruthTreeNode)| {
            Self::node_format(highlights, node)
        };

        let d = petgraph::dot::Dot::with_attr_getters(
            &graph,
            &[petgraph::dot::Config::EdgeNoLabel],
            &|_, e| match e.weight() {
                Link::Child => "color=gray35".to_string(),
                Link::Decomposition => {
                    "color=darkslateblue, style=dashed, constraint=false".to_string()
                }
            },
            &get_node_attrs,
        );
        format!("{}", d)
    }
}

/// Outline rendering: one node per line, indented by depth
impl fmt::Display for TruthTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut stack = vec![(self.root, 0)];
        let mut written = 0;
        while let Some((id, depth)) = stack.pop() {
            let node = match self.nodes.get(&id) {
                Some(node) => node,
                None => continue,
            };
            written += 1;
            if written > self.nodes.len() {
                break;
            }

            write!(f, "{}{}", "  ".repeat(depth), node)?;
            if node.premise {
                write!(f, " [premise]")?;
            }
            if let Some(antecedent) = node.antecedent {
                write!(f, " (from {})", antecedent)?;
            }
            if !node.decomposition.is_empty() {
                let cited: Vec<String> = node.decomposition.iter().map(|id| id.to_string()).collect();
                write!(f, " [cites {}]", cited.join(", "))?;
            }
            writeln!(f)?;

            for &child in node.children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(texts: &[&str]) -> TruthTree {
        let mut tree = TruthTree::empty();
        let mut last = tree.root();
        tree.set_text(last, texts[0]).unwrap();
        for text in &texts[1..] {
            last = tree.add_node_after(last, false).unwrap();
            tree.set_text(last, text).unwrap();
        }
        tree
    }

    fn cache_is_set(tree: &TruthTree, id: NodeId) -> bool {
        tree.node(id).unwrap().correct_decomposition.get().is_some()
    }

    #[test]
    fn options_from_json_default_missing_keys() {
        let options = TreeOptions::from_json(r#"{"requireAtomicContradiction": false}"#).unwrap();
        assert!(!options.require_atomic_contradiction);
        assert!(options.require_all_branches_terminated);
        assert_eq!(options.dialect, Dialect::FirstOrder);

        let options = TreeOptions::from_json(r#"{"dialect": "propositional"}"#).unwrap();
        assert_eq!(options.dialect, Dialect::Propositional);
    }

    #[test]
    fn text_is_trimmed_and_parsed() {
        let mut tree = TruthTree::empty();
        tree.set_text(0, "  A ∧ B ").unwrap();
        let node = tree.node(0).unwrap();
        assert_eq!(node.text(), "A ∧ B");
        assert!(node.statement().is_some());

        tree.set_text(0, "A ∧").unwrap();
        assert!(tree.node(0).unwrap().statement().is_none());
        tree.set_text(0, OPEN_TERMINATOR).unwrap();
        assert!(tree.node(0).unwrap().is_open_terminator());
        assert!(tree.node(0).unwrap().statement().is_none());
    }

    #[test]
    fn add_after_splices_or_branches() {
        let mut tree = TruthTree::empty();
        let a = tree.add_node_after(0, false).unwrap();
        assert_eq!(tree.node(0).unwrap().children(), &[a]);
        assert_eq!(tree.leaves(), &IndexSet::from([a]));

        let b = tree.add_node_after(0, false).unwrap();
        assert_eq!(tree.node(0).unwrap().children(), &[b]);
        assert_eq!(tree.node(b).unwrap().children(), &[a]);
        assert_eq!(tree.node(a).unwrap().parent(), Some(b));

        let c = tree.add_node_after(b, true).unwrap();
        assert_eq!(tree.node(b).unwrap().children(), &[a, c]);
        assert_eq!(tree.leaves(), &IndexSet::from([a, c]));
        assert!(tree.check_representation().is_ok());
    }

    #[test]
    fn add_before_root_makes_new_root() {
        let mut tree = TruthTree::empty();
        let child = tree.add_node_after(0, false).unwrap();
        let above = tree.add_node_before(child).unwrap();
        assert_eq!(tree.node(0).unwrap().children(), &[above]);
        assert_eq!(tree.node(above).unwrap().children(), &[child]);

        let new_root = tree.add_node_before(0).unwrap();
        assert_eq!(tree.root(), new_root);
        assert_eq!(tree.node(0).unwrap().parent(), Some(new_root));
        assert!(tree.check_representation().is_ok());
    }

    #[test]
    fn ids_are_never_reused() {
        let mut tree = TruthTree::empty();
        let a = tree.add_node_after(0, false).unwrap();
        tree.delete_node(a).unwrap();
        let b = tree.add_node_after(0, false).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn delete_moves_children_up_and_drops_references() {
        let mut tree = chain(&["A ∧ B", "A", "B"]);
        tree.add_decomposition(0, 1).unwrap();
        tree.add_decomposition(0, 2).unwrap();
        tree.delete_node(1).unwrap();

        assert_eq!(tree.node(0).unwrap().children(), &[2]);
        assert_eq!(tree.node(2).unwrap().parent(), Some(0));
        assert_eq!(tree.node(0).unwrap().decomposition(), &IndexSet::from([2]));
        assert!(tree.check_representation().is_ok());

        tree.delete_node(2).unwrap();
        assert_eq!(tree.leaves(), &IndexSet::from([0]));
        assert_eq!(tree.delete_node(0), Err(EditError::LastNode));
    }

    #[test]
    fn delete_root_needs_single_child() {
        let mut tree = TruthTree::empty();
        tree.add_node_after(0, true).unwrap();
        tree.add_node_after(0, true).unwrap();
        assert_eq!(tree.delete_node(0), Err(EditError::RootHasBranches(0)));

        let mut tree = TruthTree::empty();
        let only = tree.add_node_after(0, true).unwrap();
        tree.delete_node(0).unwrap();
        assert_eq!(tree.root(), only);
        assert_eq!(tree.node(only).unwrap().parent(), None);
    }

    #[test]
    fn unknown_nodes_are_rejected() {
        let mut tree = TruthTree::empty();
        assert_eq!(tree.set_text(9, "A"), Err(EditError::UnknownNode(9)));
        assert_eq!(tree.add_node_after(9, true), Err(EditError::UnknownNode(9)));
        assert_eq!(tree.add_decomposition(0, 9), Err(EditError::UnknownNode(9)));
    }

    #[test]
    fn decomposition_moves_between_antecedents() {
        let mut tree = chain(&["A ∧ B", "A ∧ C", "A"]);
        tree.add_decomposition(0, 2).unwrap();
        assert_eq!(tree.node(2).unwrap().antecedent(), Some(0));
        tree.add_decomposition(1, 2).unwrap();
        assert_eq!(tree.node(2).unwrap().antecedent(), Some(1));
        assert!(tree.node(0).unwrap().decomposition().is_empty());

        tree.remove_decomposition(1, 2).unwrap();
        assert_eq!(tree.node(2).unwrap().antecedent(), None);
    }

    #[test]
    fn terminators_cite_without_becoming_antecedents() {
        let mut tree = chain(&["K", "¬K", CLOSED_TERMINATOR]);
        tree.add_decomposition(2, 0).unwrap();
        tree.add_decomposition(2, 1).unwrap();
        assert_eq!(tree.node(0).unwrap().antecedent(), None);
        assert_eq!(tree.node(2).unwrap().decomposition().len(), 2);
    }

    #[test]
    fn statements_share_an_open_terminator() {
        let mut tree = chain(&["K", "L", OPEN_TERMINATOR]);
        tree.add_decomposition(0, 2).unwrap();
        tree.add_decomposition(1, 2).unwrap();
        assert_eq!(tree.node(2).unwrap().antecedent(), None);
        assert!(tree.node(0).unwrap().decomposition().contains(&2));
        assert!(tree.node(1).unwrap().decomposition().contains(&2));
    }

    #[test]
    fn writes_clear_dependent_caches() {
        let mut tree = chain(&["A ∧ B", "A", "B"]);
        tree.add_decomposition(0, 1).unwrap();
        tree.add_decomposition(0, 2).unwrap();

        tree.correct_decomposition(0).unwrap();
        assert!(cache_is_set(&tree, 0));
        tree.set_text(2, "C").unwrap();
        assert!(!cache_is_set(&tree, 0));
        assert!(!tree.correct_decomposition(0).unwrap().contains(&2));

        tree.set_text(2, "B").unwrap();
        assert_eq!(tree.correct_decomposition(0).unwrap().len(), 2);
        tree.add_node_after(2, false).unwrap();
        assert!(!cache_is_set(&tree, 0));
    }

    #[test]
    fn changing_dialect_reparses() {
        let mut tree = chain(&["P(a)"]);
        assert!(tree.node(0).unwrap().statement().is_some());
        tree.set_options(TreeOptions {
            dialect: Dialect::Propositional,
            ..TreeOptions::default()
        });
        assert!(tree.node(0).unwrap().statement().is_none());
        assert_eq!(tree.node(0).unwrap().text(), "P(a)");
    }

    #[test]
    fn dot_draws_both_kinds_of_edge() {
        let mut tree = chain(&["A ∧ B", "A"]);
        tree.add_decomposition(0, 1).unwrap();
        let dot = tree.dot(&HashMap::from([(1, "gold".to_string())]));
        assert!(dot.contains("digraph"));
        assert!(dot.contains("style=dashed"));
        assert!(dot.contains("fillcolor=gold"));
    }

    #[test]
    fn outline_indents_by_depth() {
        let mut tree = chain(&["A ∨ B"]);
        tree.set_premise(0, true).unwrap();
        let a = tree.add_node_after(0, true).unwrap();
        let b = tree.add_node_after(0, true).unwrap();
        tree.set_text(a, "A").unwrap();
        tree.set_text(b, "B").unwrap();
        tree.add_decomposition(0, a).unwrap();
        let outline = tree.to_string();
        let lines: Vec<&str> = outline.lines().collect();
        assert_eq!(lines[0], "0: A ∨ B [premise] [cites 1]");
        assert_eq!(lines[1], "  1: A (from 0)");
        assert_eq!(lines[2], "  2: B");
    }
}
