//! Label tree navigation.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::model::{Label, LabelId};
use crate::store::{AnnotationStore, StoreError};

/// Walks label trees through the store, caching every label it reads.
///
/// Trees may nest arbitrarily deep. Walks are iterative and stop at labels
/// already visited, so a corrupt parent cycle cannot loop forever.
pub struct LabelHierarchy<'a> {
    store: &'a dyn AnnotationStore,
    labels: HashMap<LabelId, Label>,
}

impl<'a> LabelHierarchy<'a> {
    pub fn new(store: &'a dyn AnnotationStore) -> Self {
        Self {
            store,
            labels: HashMap::new(),
        }
    }

    /// Returns the label, reading it from the store on first use.
    pub fn label(&mut self, id: LabelId) -> Result<Option<&Label>, StoreError> {
        if !self.labels.contains_key(&id) {
            for label in self.store.labels(&[id])? {
                self.labels.insert(label.id, label);
            }
        }
        Ok(self.labels.get(&id))
    }

    /// Returns the given labels plus all of their descendants.
    pub fn with_descendants(
        &mut self,
        ids: &BTreeSet<LabelId>,
    ) -> Result<BTreeSet<LabelId>, StoreError> {
        let mut all: BTreeSet<LabelId> = ids.clone();
        let mut frontier: Vec<LabelId> = ids.iter().copied().collect();

        while !frontier.is_empty() {
            let children = self.store.child_labels(&frontier)?;
            frontier.clear();
            for child in children {
                if all.insert(child.id) {
                    frontier.push(child.id);
                }
                self.labels.insert(child.id, child);
            }
        }

        Ok(all)
    }

    /// Returns the label followed by its ancestors, ending with the root.
    pub fn ancestors_and_self(&mut self, id: LabelId) -> Result<Vec<LabelId>, StoreError> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(id);

        while let Some(id) = current {
            if !seen.insert(id) {
                break;
            }
            let Some(label) = self.label(id)? else {
                break;
            };
            chain.push(id);
            current = label.parent_id;
        }

        Ok(chain)
    }

    /// Returns the label name prefixed by its ancestors, e.g.
    /// `"Animalia > Porifera"`.
    pub fn expanded_name(&mut self, id: LabelId) -> Result<String, StoreError> {
        let chain = self.ancestors_and_self(id)?;
        let names: Vec<&str> = chain
            .iter()
            .rev()
            .filter_map(|id| self.labels.get(id))
            .map(|label| label.name.as_str())
            .collect();
        Ok(names.join(" > "))
    }

    /// Returns the labels a row with label `id` is counted for.
    ///
    /// Without aggregation that is the label itself. With aggregation it is
    /// the label and every ancestor, narrowed to `selected` when the report
    /// is restricted to a label subset.
    pub fn credited_labels(
        &mut self,
        id: LabelId,
        aggregate: bool,
        selected: Option<&BTreeSet<LabelId>>,
    ) -> Result<Vec<LabelId>, StoreError> {
        if !aggregate {
            return Ok(vec![id]);
        }

        let mut chain = self.ancestors_and_self(id)?;
        if let Some(selected) = selected {
            chain.retain(|id| selected.contains(id));
        }
        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LabelTree, LabelTreeId};
    use crate::store::{Catalog, CatalogData};

    fn tree() -> Catalog {
        Catalog::new(CatalogData {
            label_trees: vec![LabelTree {
                id: LabelTreeId(1),
                name: "t".into(),
            }],
            labels: vec![
                Label::new(1u64, "Root", "000000", 1u64),
                Label::new(2u64, "Child", "000000", 1u64).with_parent(1u64),
                Label::new(3u64, "Grandchild", "000000", 1u64).with_parent(2u64),
                Label::new(4u64, "Sibling", "000000", 1u64).with_parent(1u64),
                Label::new(5u64, "Other", "000000", 1u64),
            ],
            ..Default::default()
        })
        .expect("catalog")
    }

    #[test]
    fn test_descendants_of_arbitrary_depth() {
        let catalog = tree();
        let mut hierarchy = LabelHierarchy::new(&catalog);

        let all = hierarchy
            .with_descendants(&BTreeSet::from([LabelId(1)]))
            .expect("walk");
        assert_eq!(
            all,
            BTreeSet::from([LabelId(1), LabelId(2), LabelId(3), LabelId(4)])
        );
    }

    #[test]
    fn test_expanded_name() {
        let catalog = tree();
        let mut hierarchy = LabelHierarchy::new(&catalog);
        assert_eq!(
            hierarchy.expanded_name(LabelId(3)).expect("name"),
            "Root > Child > Grandchild"
        );
        assert_eq!(hierarchy.expanded_name(LabelId(5)).expect("name"), "Other");
    }

    #[test]
    fn test_credited_labels() {
        let catalog = tree();
        let mut hierarchy = LabelHierarchy::new(&catalog);

        assert_eq!(
            hierarchy.credited_labels(LabelId(3), false, None).expect("credit"),
            vec![LabelId(3)]
        );
        assert_eq!(
            hierarchy.credited_labels(LabelId(3), true, None).expect("credit"),
            vec![LabelId(3), LabelId(2), LabelId(1)]
        );
        let selected = BTreeSet::from([LabelId(1)]);
        assert_eq!(
            hierarchy
                .credited_labels(LabelId(3), true, Some(&selected))
                .expect("credit"),
            vec![LabelId(1)]
        );
    }
}
