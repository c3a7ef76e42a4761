use std::collections::HashMap;

use serde_json::Value;

use crate::key::canonical;
use crate::model::EmittedRow;

/// Values collected under one key, in row order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Group {
    pub key: Value,
    pub values: Vec<Value>,
}

/// Partition map rows for the reduce phase.
///
/// Grouped: one group per distinct key in first-seen order. Ungrouped: a
/// single `null`-keyed group holding every value, or nothing when there are
/// no rows.
pub(crate) fn group(rows: Vec<EmittedRow>, grouped: bool) -> Vec<Group> {
    if !grouped {
        if rows.is_empty() {
            return Vec::new();
        }
        let values = rows.into_iter().map(|row| row.value).collect();
        return vec![Group {
            key: Value::Null,
            values,
        }];
    }

    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for row in rows {
        let slot = *index.entry(canonical(&row.key)).or_insert_with(|| {
            groups.push(Group {
                key: row.key.clone(),
                values: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].values.push(row.value);
    }
    tracing::debug!(groups = groups.len(), "grouped map rows");
    groups
}
