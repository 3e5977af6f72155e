use std::collections::BTreeMap;

use crate::domain::types::{CartLine, ShoppingListItem};

/// Sum cart lines per (name, unit), ordered by name then unit.
pub fn aggregate(lines: impl IntoIterator<Item = CartLine>) -> Vec<ShoppingListItem> {
    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();
    for line in lines {
        *totals
            .entry((line.name, line.measurement_unit))
            .or_default() += i64::from(line.amount);
    }
    totals
        .into_iter()
        .map(|((name, measurement_unit), total)| ShoppingListItem {
            name,
            measurement_unit,
            total,
        })
        .collect()
}

/// `"{name} - {total} {unit}"`.
pub fn format_item(item: &ShoppingListItem) -> String {
    format!("{} - {} {}", item.name, item.total, item.measurement_unit)
}
