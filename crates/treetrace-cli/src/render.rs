//! Plain-text rendering of recorded steps

use treetrace_core::{ActiveNode, ForestSnapshot, HistoryEntry, NodeRecord};

const INDENT: &str = "  ";

/// Suffix of the line showing the step's active node
pub const ACTIVE_MARKER: &str = " <-";

/// `[i/n] method: action`, with `i` counted from one
pub fn header(index: usize, total: usize, entry: &HistoryEntry) -> String {
    let method = entry.method.as_deref().unwrap_or("-");
    format!("[{}/{total}] {method}: {}", index + 1, entry.action)
}

/// Header followed by every component of the step's forest
pub fn step(index: usize, total: usize, entry: &HistoryEntry) -> String {
    let mut lines = vec![header(index, total, entry)];
    lines.extend(forest(&entry.snapshot, entry.identity));
    lines.join("\n")
}

/// One line per node, children indented under their parent and tagged `L`/`R`.
pub fn forest(snapshot: &ForestSnapshot, active: ActiveNode) -> Vec<String> {
    let mut lines = Vec::new();
    match &snapshot.main {
        Some(root) => {
            lines.push("main".to_string());
            component(root, active, &mut lines);
        }
        None => lines.push("main (empty)".to_string()),
    }
    for (n, root) in snapshot.floating.iter().enumerate() {
        lines.push(format!("floating {}", n + 1));
        component(root, active, &mut lines);
    }
    lines
}

fn component(root: &NodeRecord, active: ActiveNode, lines: &mut Vec<String>) {
    let mut pending = vec![(root, "", 1)];
    while let Some((record, side, depth)) = pending.pop() {
        let marker = if active.id() == Some(record.identity) {
            ACTIVE_MARKER
        } else {
            ""
        };
        lines.push(format!(
            "{}{side}{} {}{marker}",
            INDENT.repeat(depth),
            record.display_label,
            record.identity
        ));
        if let Some(right) = record.right.as_deref() {
            pending.push((right, "R ", depth + 1));
        }
        if let Some(left) = record.left.as_deref() {
            pending.push((left, "L ", depth + 1));
        }
    }
}
