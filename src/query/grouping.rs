//! Splitting rows into groups by label tree or by user.

use std::collections::BTreeMap;

use crate::model::{LabelTreeId, UserId};
use crate::restriction::Grouping;
use crate::store::{AnnotationStore, LabeledRow, StoreError};

/// Key of one output group. Groups are emitted in ascending key order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKey {
    LabelTree(LabelTreeId),
    User(UserId),
}

/// Returns the group of a row, or `None` if the report is not grouped.
pub fn group_key<R: LabeledRow>(grouping: Grouping, row: &R) -> Option<GroupKey> {
    match grouping {
        Grouping::None => None,
        Grouping::LabelTree => Some(GroupKey::LabelTree(row.label_tree_id())),
        Grouping::User => Some(GroupKey::User(row.user_id())),
    }
}

/// Looks up display names for group keys: label tree names or user names.
///
/// Keys without a stored record fall back to their numeric ID.
pub fn group_titles<'k>(
    store: &dyn AnnotationStore,
    keys: impl IntoIterator<Item = &'k GroupKey>,
) -> Result<BTreeMap<GroupKey, String>, StoreError> {
    let mut trees = Vec::new();
    let mut users = Vec::new();
    for key in keys {
        match key {
            GroupKey::LabelTree(id) => trees.push(*id),
            GroupKey::User(id) => users.push(*id),
        }
    }

    let mut titles: BTreeMap<GroupKey, String> = BTreeMap::new();
    for id in &trees {
        titles.insert(GroupKey::LabelTree(*id), format!("label tree {}", id));
    }
    for id in &users {
        titles.insert(GroupKey::User(*id), format!("user {}", id));
    }

    if !trees.is_empty() {
        for tree in store.label_trees(&trees)? {
            titles.insert(GroupKey::LabelTree(tree.id), tree.name);
        }
    }
    if !users.is_empty() {
        for user in store.users(&users)? {
            titles.insert(GroupKey::User(user.id), user.display_name());
        }
    }

    Ok(titles)
}
