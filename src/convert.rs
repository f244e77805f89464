use crate::core::*;
use crate::error::DeserializationError;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// One node of a serialized truth tree
///
/// A tree is stored as a JSON array of these. Exactly one record (the root)
/// omits `parent`; `premise`, `parent` and `antecedent` are left out of the
/// output when they hold their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub text: String,
    pub children: Vec<NodeId>,
    pub decomposition: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub premise: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub antecedent: Option<NodeId>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl TryFrom<Vec<NodeRecord>> for TruthTree {
    type Error = DeserializationError;

    fn try_from(records: Vec<NodeRecord>) -> Result<Self, Self::Error> {
        TruthTree::from_records(records, TreeOptions::default())
    }
}

impl From<&TruthTree> for Vec<NodeRecord> {
    fn from(tree: &TruthTree) -> Self {
        tree.nodes()
            .map(|node| NodeRecord {
                id: node.id(),
                text: node.text().to_owned(),
                children: node.children().to_vec(),
                decomposition: node.decomposition().iter().copied().collect(),
                premise: node.is_premise(),
                parent: node.parent(),
                antecedent: node.antecedent(),
            })
            .collect()
    }
}

/// # Serialization
impl TruthTree {
    /// Builds a tree from node records, parsing text with the dialect in
    /// `options`
    ///
    /// Links to ids that do not exist are kept as they are; the validity
    /// checks report them as inconsistencies later.
    pub fn from_records(
        records: Vec<NodeRecord>,
        options: TreeOptions,
    ) -> Result<Self, DeserializationError> {
        if records.is_empty() {
            return Err(DeserializationError::Empty);
        }

        let mut nodes = IndexMap::new();
        let mut root = None;

        for record in records {
            if nodes.contains_key(&record.id) {
                return Err(DeserializationError::DuplicateNode(record.id));
            }
            if record.parent.is_none() {
                if let Some(first) = root {
                    return Err(DeserializationError::MultipleRoots(first, record.id));
                }
                root = Some(record.id);
            }

            let mut node = TruthTreeNode::new(record.id, &record.text, options.dialect);
            node.premise = record.premise;
            node.parent = record.parent;
            node.children = record.children;
            node.antecedent = record.antecedent;
            node.decomposition = record.decomposition.into_iter().collect::<IndexSet<_>>();
            nodes.insert(record.id, node);
        }

        let root = root.ok_or(DeserializationError::NoRoot)?;
        Ok(TruthTree::from_nodes(nodes, root, options))
    }

    /// Loads a tree from its JSON record list
    pub fn deserialize(text: &str) -> Result<Self, DeserializationError> {
        Self::deserialize_with(text, TreeOptions::default())
    }

    /// Loads a tree from its JSON record list, checked with `options`
    pub fn deserialize_with(text: &str, options: TreeOptions) -> Result<Self, DeserializationError> {
        let records: Vec<NodeRecord> = serde_json::from_str(text)?;
        Self::from_records(records, options)
    }

    /// Writes the tree as its JSON record list
    pub fn serialize(&self) -> serde_json::Result<String> {
        serde_json::to_string(&Vec::<NodeRecord>::from(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_omitted() {
        let tree = TruthTree::empty();
        assert_eq!(
            tree.serialize().unwrap(),
            r#"[{"id":0,"text":"","children":[],"decomposition":[]}]"#
        );
    }

    #[test]
    fn optional_fields_default() {
        let tree = TruthTree::deserialize(
            r#"[{"id": 3, "text": " K ", "children": [], "decomposition": []}]"#,
        )
        .unwrap();
        let node = tree.node(3).unwrap();
        assert_eq!(tree.root(), 3);
        assert!(!node.is_premise());
        assert_eq!(node.antecedent(), None);
        assert_eq!(node.text(), "K");
    }

    #[test]
    fn null_parent_marks_the_root() {
        let tree = TruthTree::deserialize(
            r#"[{"id": 0, "text": "K", "children": [], "decomposition": [], "parent": null}]"#,
        )
        .unwrap();
        assert_eq!(tree.root(), 0);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(
            TruthTree::deserialize("[]"),
            Err(DeserializationError::Empty)
        ));
        assert!(matches!(
            TruthTree::deserialize(r#"[{"id": 0, "children": [], "decomposition": []}]"#),
            Err(DeserializationError::Malformed(_))
        ));
        assert!(matches!(
            TruthTree::deserialize(r#"[{"id": 0, "text": "", "children": 5, "decomposition": []}]"#),
            Err(DeserializationError::Malformed(_))
        ));
        assert!(matches!(
            TruthTree::deserialize(
                r#"[{"id": 0, "text": "", "children": [], "decomposition": [], "parent": 0}]"#
            ),
            Err(DeserializationError::NoRoot)
        ));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let records = vec![
            NodeRecord {
                id: 1,
                text: "A".into(),
                children: vec![],
                decomposition: vec![],
                premise: false,
                parent: None,
                antecedent: None,
            };
            2
        ];
        assert!(matches!(
            TruthTree::try_from(records),
            Err(DeserializationError::DuplicateNode(1))
        ));
    }

    #[test]
    fn next_id_follows_largest_loaded_id() {
        let mut tree = TruthTree::deserialize(
            r#"[{"id": 7, "text": "K", "children": [], "decomposition": []}]"#,
        )
        .unwrap();
        assert_eq!(tree.add_node_after(7, false).unwrap(), 8);
    }
}
