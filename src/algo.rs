use crate::core::*;
use crate::equivalence::Substitution;
use crate::error::InconsistencyError;
use crate::formula::Formula;
use crate::parser;
use crate::sets;
use crate::statement::Statement;
use indexmap::IndexSet;
use tracing::{debug, trace, warn};

fn single(id: NodeId, message: impl Into<String>) -> Diagnostics {
    Diagnostics::from([(id, message.into())])
}

////////////////////////////////////////////////////////////////////////////////
// Navigation

/// # Walking the tree
impl TruthTree {
    /// Returns the strict ancestors of a node, nearest first
    pub fn ancestors(&self, id: NodeId) -> Result<Vec<NodeId>, InconsistencyError> {
        let mut ancestors = vec![];
        let mut current = self.lookup(id)?;
        while let Some(parent) = current.parent {
            if ancestors.len() >= self.nodes.len() {
                return Err(InconsistencyError::Cycle(id));
            }
            ancestors.push(parent);
            current = self.lookup(parent)?;
        }
        Ok(ancestors)
    }

    /// Returns the ids on the path from the root down to `id`, inclusive
    pub fn branch(&self, id: NodeId) -> Result<IndexSet<NodeId>, InconsistencyError> {
        let mut path = self.ancestors(id)?;
        path.reverse();
        path.push(id);
        Ok(path.into_iter().collect())
    }

    /// Returns the leaves at or below `id`
    fn leaves_below(&self, id: NodeId) -> Result<Vec<NodeId>, InconsistencyError> {
        let mut below = vec![];
        for &leaf in &self.leaves {
            if leaf == id || self.ancestors(leaf)?.contains(&id) {
                below.push(leaf);
            }
        }
        Ok(below)
    }

    /// Returns `start` followed by its descendants down to the first node
    /// that does not have exactly one child
    fn chain(&self, start: NodeId) -> Result<Vec<NodeId>, InconsistencyError> {
        let mut chain = vec![start];
        let mut current = self.lookup(start)?;
        while let [only] = current.children.as_slice() {
            if chain.len() > self.nodes.len() {
                return Err(InconsistencyError::Cycle(start));
            }
            chain.push(*only);
            current = self.lookup(*only)?;
        }
        Ok(chain)
    }

    /// Returns the constants of every statement from the root down to `id`
    pub fn universe(&self, id: NodeId) -> Result<IndexSet<Formula>, InconsistencyError> {
        let mut universe = IndexSet::new();
        for step in self.branch(id)? {
            if let Some(statement) = &self.lookup(step)?.statement {
                universe.extend(statement.constants(&[]));
            }
        }
        Ok(universe)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Decomposition

/// # Decomposition
impl TruthTree {
    /// Returns the ids cited by a node that together form a correct
    /// decomposition of its statement
    ///
    /// Cited ids are grouped into candidate branches: starting from the
    /// parent of a cited id, each child opens a branch that follows
    /// single-child chains down to the next fork. The cited statements on
    /// those branches are accepted when they realize the node's
    /// decomposition. Instances of a universal statement are instead
    /// accepted one at a time.
    ///
    /// The result is cached until an edit that could change it.
    pub fn correct_decomposition(&self, id: NodeId) -> Result<&IndexSet<NodeId>, InconsistencyError> {
        let node = self.lookup(id)?;
        if let Some(cached) = node.correct_decomposition.get() {
            return Ok(cached);
        }
        let computed = self.compute_correct_decomposition(node)?;
        debug!(node = id, correct = ?computed, "computed correct decomposition");
        Ok(node.correct_decomposition.get_or_init(|| computed))
    }

    fn compute_correct_decomposition(
        &self,
        node: &TruthTreeNode,
    ) -> Result<IndexSet<NodeId>, InconsistencyError> {
        let mut correct = IndexSet::new();
        let statement = match &node.statement {
            Some(statement) if !node.is_terminator() => statement,
            _ => return Ok(correct),
        };

        if let Statement::Universal(..) = statement {
            for &target in &node.decomposition {
                let instance = self.nodes.get(&target).and_then(|t| t.statement.as_ref());
                if let Some(instance) = instance {
                    if statement.has_decomposition(&[vec![instance.clone()]]) {
                        correct.insert(target);
                    }
                }
            }
            return Ok(correct);
        }

        // Shallowest first, so a walk never reaches an id a deeper walk took
        let mut targets = vec![];
        for &target in &node.decomposition {
            // Citing a missing node is a wrong step, never part of a decomposition
            if !self.nodes.contains_key(&target) {
                continue;
            }
            targets.push((self.ancestors(target)?.len(), target));
        }
        targets.sort_by_key(|&(depth, _)| depth);

        let mut visited = IndexSet::new();
        for (_, target) in targets {
            if visited.contains(&target) {
                continue;
            }
            let parent = self
                .lookup(target)?
                .parent
                .ok_or(InconsistencyError::MissingParent(target))?;
            if node.decomposition.contains(&parent) {
                continue;
            }

            let mut branches = vec![];
            let mut contributed = vec![];
            let mut abandoned = false;
            for &child in &self.lookup(parent)?.children {
                let mut branch = vec![];
                for step in self.chain(child)? {
                    if !node.decomposition.contains(&step) {
                        continue;
                    }
                    if !visited.insert(step) {
                        let err = InconsistencyError::RevisitedDecomposition {
                            origin: node.id,
                            target: step,
                        };
                        warn!(%err, "corrupted decomposition");
                        return Err(err);
                    }
                    match &self.lookup(step)?.statement {
                        Some(s) => {
                            branch.push(s.clone());
                            contributed.push(step);
                        }
                        None => abandoned = true,
                    }
                }
                branches.push(branch);
            }

            if !abandoned && statement.has_decomposition(&branches) {
                correct.extend(contributed);
            }
        }
        Ok(correct)
    }

    /// Checks that a node's statement is decomposed on every open branch
    /// below it
    ///
    /// Only branches ending in an open terminator are checked; closed and
    /// unfinished branches are skipped. Terminators, placeholders and
    /// unparsable text are trivially decomposed.
    ///
    /// A statement with no decomposition (a literal or a truth constant) is
    /// decomposed on a branch once it cites some node of that branch,
    /// typically the open terminator itself. A universal statement must be
    /// instantiated on each open branch for every choice of constants from
    /// that branch's universe (or at least once when there are none). Any
    /// other statement needs a correctly decomposed node on each branch.
    pub fn is_decomposed(&self, id: NodeId) -> Result<Diagnostics, InconsistencyError> {
        let node = self.lookup(id)?;
        let statement = match &node.statement {
            Some(statement) if !node.is_terminator() => statement,
            _ => return Ok(Diagnostics::new()),
        };

        let cited = if statement.decompose().is_empty() {
            &node.decomposition
        } else {
            self.correct_decomposition(id)?
        };
        for leaf in self.leaves_below(id)? {
            if !self.lookup(leaf)?.is_open_terminator() {
                continue;
            }
            let branch = self.branch(leaf)?;
            let instances: Vec<NodeId> =
                cited.iter().copied().filter(|c| branch.contains(c)).collect();

            if let Statement::Universal(vars, _) = statement {
                if let Some(missing) = self.uninstantiated(statement, vars, &instances, leaf)? {
                    trace!(node = id, leaf, "universal not fully instantiated");
                    return Ok(single(
                        id,
                        format!(
                            "This statement is not instantiated for {} on the branch ending at node {}",
                            missing, leaf
                        ),
                    ));
                }
            } else if instances.is_empty() {
                trace!(node = id, leaf, "not decomposed");
                return Ok(single(
                    id,
                    format!(
                        "This statement is not decomposed on the branch ending at node {}",
                        leaf
                    ),
                ));
            }
        }
        Ok(Diagnostics::new())
    }

    /// Returns a description of the first choice of constants that no
    /// instance on the branch covers
    ///
    /// Only argument-less constants are chosen from. Function applications
    /// such as `f(a)` do belong to the branch's [`universe`](Self::universe),
    /// but requiring instances for them would grow the universe forever, so
    /// a universal counts as decomposed without them.
    fn uninstantiated(
        &self,
        statement: &Statement,
        vars: &[Formula],
        instances: &[NodeId],
        leaf: NodeId,
    ) -> Result<Option<String>, InconsistencyError> {
        let generic = statement.symbolized(&[]);
        let mut bindings: Vec<Substitution> = vec![];
        for instance in instances {
            if let Some(s) = &self.lookup(*instance)?.statement {
                bindings.extend(generic.equals_map(s));
            }
        }

        let universe: Vec<Formula> = self
            .universe(leaf)?
            .into_iter()
            .filter(|c| c.args().is_none())
            .collect();
        if universe.is_empty() {
            return Ok(if bindings.is_empty() {
                Some("any constant".to_string())
            } else {
                None
            });
        }

        for tuple in sets::cartesian_power(&universe, vars.len()) {
            let covered = bindings.iter().any(|binding| {
                vars.iter().zip(&tuple).all(|(var, value)| {
                    binding.get(var.name()).map_or(true, |bound| bound.equals(value))
                })
            });
            if !covered {
                let choice: Vec<String> = vars
                    .iter()
                    .zip(&tuple)
                    .map(|(var, value)| format!("{} = {}", var, value))
                    .collect();
                return Ok(Some(choice.join(", ")));
            }
        }
        Ok(None)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Validity

/// # Validity
impl TruthTree {
    /// Checks a single step of the tree
    ///
    /// Premises are always valid and empty placeholders vacuously so. An
    /// open terminator needs every ancestor to be valid and decomposed with
    /// no contradiction left on its branch. A closed terminator cites two
    /// valid ancestors, one the negation of the other. Any other node must
    /// appear in the correct decomposition of its antecedent.
    pub fn is_valid(&self, id: NodeId) -> Result<Diagnostics, InconsistencyError> {
        let node = self.lookup(id)?;
        let verdict = if node.premise || node.is_placeholder() {
            Ok(Diagnostics::new())
        } else if node.is_open_terminator() {
            self.open_terminator_validity(node)
        } else if node.is_closed_terminator() {
            self.closed_terminator_validity(node)
        } else {
            match &node.statement {
                Some(statement) => self.step_validity(node, statement),
                None => Ok(self.unparsable(node)),
            }
        };
        if let Ok(diagnostics) = &verdict {
            trace!(node = id, valid = diagnostics.is_empty(), "checked validity");
        }
        verdict
    }

    fn open_terminator_validity(&self, node: &TruthTreeNode) -> Result<Diagnostics, InconsistencyError> {
        let ancestors = self.ancestors(node.id)?;

        let mut literals: Vec<(NodeId, &Statement)> = vec![];
        for &ancestor in &ancestors {
            if let Some(statement) = self.lookup(ancestor)?.statement.as_ref() {
                if statement.is_literal() {
                    literals.push((ancestor, statement));
                }
            }
        }
        for (i, (a, sa)) in literals.iter().enumerate() {
            for (b, sb) in &literals[i + 1..] {
                if sa.contradicts(sb, true) {
                    return Ok(single(
                        node.id,
                        format!(
                            "Nodes {} and {} contradict each other, so this branch should be closed",
                            a.min(b),
                            a.max(b)
                        ),
                    ));
                }
            }
        }

        for &ancestor in &ancestors {
            let diagnostics = self.is_valid(ancestor)?;
            if !diagnostics.is_empty() {
                return Ok(diagnostics);
            }
            let diagnostics = self.is_decomposed(ancestor)?;
            if !diagnostics.is_empty() {
                return Ok(diagnostics);
            }
        }
        Ok(Diagnostics::new())
    }

    fn closed_terminator_validity(&self, node: &TruthTreeNode) -> Result<Diagnostics, InconsistencyError> {
        let (a, b) = match node.decomposition.iter().copied().collect::<Vec<_>>()[..] {
            [a, b] => (a, b),
            _ => {
                return Ok(single(
                    node.id,
                    "A closed terminator must reference exactly two statements",
                ))
            }
        };

        let ancestors = self.ancestors(node.id)?;
        for cited in [a, b] {
            if !ancestors.contains(&cited) {
                return Ok(single(
                    node.id,
                    format!("Node {} is not on the branch this terminator closes", cited),
                ));
            }
        }

        let (first, second) = (self.lookup(a)?, self.lookup(b)?);
        let (sa, sb) = match (&first.statement, &second.statement) {
            (Some(sa), Some(sb)) => (sa, sb),
            _ => {
                return Ok(single(
                    node.id,
                    "A closed terminator must reference two parsable statements",
                ))
            }
        };

        let atomic_only = self.options.require_atomic_contradiction;
        if !sa.contradicts(sb, atomic_only) {
            let kind = if atomic_only {
                "an atomic statement and its negation"
            } else {
                "a statement and its negation"
            };
            return Ok(single(
                node.id,
                format!("\"{}\" and \"{}\" are not {}", first.text, second.text, kind),
            ));
        }

        for cited in [a, b] {
            let diagnostics = self.is_valid(cited)?;
            if !diagnostics.is_empty() {
                return Ok(diagnostics);
            }
        }
        Ok(Diagnostics::new())
    }

    fn unparsable(&self, node: &TruthTreeNode) -> Diagnostics {
        match parser::parse_with(self.options.dialect, &node.text) {
            Err(err) => single(node.id, format!("Cannot parse \"{}\": {}", node.text, err)),
            Ok(_) => single(node.id, format!("Cannot parse \"{}\"", node.text)),
        }
    }

    fn step_validity(
        &self,
        node: &TruthTreeNode,
        statement: &Statement,
    ) -> Result<Diagnostics, InconsistencyError> {
        let id = node.id;
        let antecedent_id = match node.antecedent {
            Some(antecedent) => antecedent,
            None => return Ok(single(id, "This statement is not justified by an antecedent")),
        };
        let antecedent = match self.nodes.get(&antecedent_id) {
            Some(antecedent) => antecedent,
            None => {
                return Ok(single(
                    id,
                    format!("Antecedent {} does not exist", antecedent_id),
                ))
            }
        };
        let antecedent_statement = match &antecedent.statement {
            Some(s) => s,
            None => {
                return Ok(single(
                    id,
                    format!("Antecedent {} is not a parsable statement", antecedent_id),
                ))
            }
        };
        if !self.ancestors(id)?.contains(&antecedent_id) {
            return Ok(single(
                id,
                format!("Antecedent {} is not above this statement", antecedent_id),
            ));
        }
        if !self.correct_decomposition(antecedent_id)?.contains(&id) {
            return Ok(single(
                id,
                format!(
                    "This statement is not part of a correct decomposition of node {}",
                    antecedent_id
                ),
            ));
        }

        for &cited in &node.decomposition {
            if !self.nodes.contains_key(&cited) || !self.ancestors(cited)?.contains(&id) {
                return Ok(single(
                    id,
                    format!("Decomposition node {} is not below this statement", cited),
                ));
            }
        }

        if let Statement::Existential(vars, _) = antecedent_statement {
            let parent = node.parent.ok_or(InconsistencyError::MissingParent(id))?;
            let universe = self.universe(parent)?;
            let bindings = antecedent_statement
                .symbolized(&[])
                .equals_map(statement)
                .unwrap_or_default();
            for var in vars {
                if let Some(value) = bindings.get(var.name()) {
                    if universe.iter().any(|constant| constant.equals(value)) {
                        return Ok(single(
                            id,
                            format!(
                                "{} already appears on this branch; an existential instance needs a new constant",
                                value
                            ),
                        ));
                    }
                }
            }
        }

        Ok(Diagnostics::new())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Whole-tree checks

/// # Whole-tree checks
impl TruthTree {
    /// Checks every node and returns the first problem found, if any
    pub fn is_correct(&self) -> Result<Diagnostics, InconsistencyError> {
        if self.options.require_all_branches_terminated {
            for &leaf in &self.leaves {
                if !self.lookup(leaf)?.is_terminator() {
                    return Ok(single(leaf, "Every branch must end in a terminator"));
                }
            }
        }
        for &id in self.nodes.keys() {
            let diagnostics = self.is_valid(id).map_err(|err| {
                warn!(node = id, %err, "tree is inconsistent");
                err
            })?;
            if !diagnostics.is_empty() {
                debug!(node = id, "tree is not correct");
                return Ok(diagnostics);
            }
        }
        Ok(Diagnostics::new())
    }

    /// Returns true iff this tree grows `other`
    ///
    /// Every node of `other` must sit at the same child-index path in this
    /// tree with an equal statement (or, for text that is not a statement,
    /// identical text). Premises of `other` must still be premises here.
    pub fn extends(&self, other: &TruthTree) -> bool {
        let mut pending = vec![(self.root, other.root)];
        let mut steps = 0;
        while let Some((mine, theirs)) = pending.pop() {
            steps += 1;
            if steps > other.nodes.len() {
                return false;
            }
            let (mine, theirs) = match (self.nodes.get(&mine), other.nodes.get(&theirs)) {
                (Some(mine), Some(theirs)) => (mine, theirs),
                _ => return false,
            };
            let same = match (&mine.statement, &theirs.statement) {
                (Some(a), Some(b)) => a == b,
                (None, None) => mine.text == theirs.text,
                _ => false,
            };
            if !same || (theirs.premise && !mine.premise) || theirs.children.len() > mine.children.len() {
                trace!(node = theirs.id, "trees diverge here");
                return false;
            }
            pending.extend(mine.children.iter().copied().zip(theirs.children.iter().copied()));
        }
        true
    }

    /// Verifies the structural invariants of the tree
    ///
    /// Parent and child links agree, every node hangs from the root, the
    /// recorded leaves are exactly the childless nodes, ordinary nodes cite
    /// only descendants, and closed terminators cite exactly two ancestors.
    pub fn check_representation(&self) -> Result<(), InconsistencyError> {
        self.representation().map_err(|err| {
            warn!(%err, "representation check failed");
            err
        })
    }

    fn representation(&self) -> Result<(), InconsistencyError> {
        for node in self.nodes.values() {
            if let Some(parent) = node.parent {
                if !self.lookup(parent)?.children.contains(&node.id) {
                    return Err(InconsistencyError::ChildParentMismatch {
                        parent,
                        child: node.id,
                    });
                }
            }
            for &child in &node.children {
                if self.lookup(child)?.parent != Some(node.id) {
                    return Err(InconsistencyError::ChildParentMismatch {
                        parent: node.id,
                        child,
                    });
                }
            }
            let top = self.ancestors(node.id)?.last().copied().unwrap_or(node.id);
            if top != self.root {
                return Err(InconsistencyError::MissingParent(top));
            }
        }

        let childless: IndexSet<NodeId> = self
            .nodes
            .values()
            .filter(|node| node.is_leaf())
            .map(|node| node.id)
            .collect();
        if !sets::is_equal(&childless, &self.leaves) {
            return Err(InconsistencyError::Leaves);
        }

        for node in self.nodes.values() {
            if node.is_closed_terminator() {
                if node.decomposition.len() != 2 {
                    return Err(InconsistencyError::ClosedReferenceCount(node.id));
                }
                let ancestors = self.ancestors(node.id)?;
                for &cited in &node.decomposition {
                    if !ancestors.contains(&cited) {
                        return Err(InconsistencyError::ClosedReferenceNotAncestor {
                            origin: node.id,
                            target: cited,
                        });
                    }
                }
            } else if !node.is_terminator() {
                for &cited in &node.decomposition {
                    if !self.ancestors(cited)?.contains(&node.id) {
                        return Err(InconsistencyError::DecompositionNotBelow {
                            origin: node.id,
                            target: cited,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
