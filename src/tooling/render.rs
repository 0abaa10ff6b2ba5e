//! Text rendering for CLI output.

use crate::reconcile::{NodeAction, NodeOutcome, ReconcileReport};
use crate::service::{ApplyReport, SortPlan};
use crate::sort::SortPolicy;
use crate::tree::{BookmarkNode, ReconstructedNode};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use std::fmt::Write;

/// Indented listing of a store snapshot.
pub fn render_tree(root: &BookmarkNode) -> String {
    fn walk(node: &BookmarkNode, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        match node.url() {
            Some(url) => {
                let _ = writeln!(out, "{}- {} <{}> [{}]", indent, node.title, url, node.id);
            }
            None => {
                let _ = writeln!(out, "{}+ {}/ [{}]", indent, node.title, node.id);
            }
        }
        for child in node.children() {
            walk(child, depth + 1, out);
        }
    }

    let mut out = String::new();
    for child in root.children() {
        walk(child, 0, &mut out);
    }
    if out.is_empty() {
        out.push_str("(empty)\n");
    }
    out
}

/// The tree a sort would produce, plus warnings.
pub fn render_plan(plan: &SortPlan) -> String {
    fn walk(node: &ReconstructedNode, depth: usize, out: &mut String) {
        let marker = if node.is_folder() { "+" } else { "-" };
        let _ = writeln!(out, "{}{} {} [{}]", "  ".repeat(depth), marker, node.title, node.id);
        for child in &node.children {
            walk(child, depth + 1, out);
        }
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Plan: policy {}, applied under {}",
        plan.policy, plan.target_parent
    );
    for node in &plan.nodes {
        walk(node, 1, &mut out);
    }
    for warning in &plan.warnings {
        let _ = writeln!(out, "warning: {}", warning);
    }
    out
}

/// Summary line and outcome table for a sort run.
pub fn render_apply_report(report: &ApplyReport, color: bool) -> String {
    let mut out = format!(
        "Applied policy {} under {}\n",
        report.policy, report.target_parent
    );
    for warning in &report.warnings {
        let _ = writeln!(out, "warning: {}", warning);
    }
    out.push_str(&render_reconcile_report(&report.reconcile, color));
    out
}

/// Outcome table for a reconciliation run.
pub fn render_reconcile_report(report: &ReconcileReport, color: bool) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Node", "Action", "Parent", "Index", "Status"]);

    fn rows(outcomes: &[NodeOutcome], depth: usize, color: bool, table: &mut Table) {
        for outcome in outcomes {
            let marker = if outcome.folder { "+" } else { "-" };
            let status = match (&outcome.error, outcome.action) {
                (_, NodeAction::Skipped) => paint("skipped", color, Status::Skipped),
                (Some(error), _) => paint(&format!("failed: {}", error), color, Status::Failed),
                (None, _) => paint("ok", color, Status::Ok),
            };
            let action = match outcome.action {
                NodeAction::Moved => "move",
                NodeAction::Created => "create",
                NodeAction::Skipped => "-",
            };
            table.add_row(vec![
                format!("{}{} {}", "  ".repeat(depth), marker, outcome.title),
                action.to_string(),
                outcome.parent_id.clone().unwrap_or_else(|| "-".to_string()),
                outcome.index.to_string(),
                status,
            ]);
            rows(&outcome.children, depth + 1, color, table);
        }
    }
    rows(&report.outcomes, 0, color, &mut table);

    let summary = &report.summary;
    format!(
        "{}\n{} moved, {} created, {} failed, {} skipped\n",
        table, summary.moved, summary.created, summary.failed, summary.skipped
    )
}

/// Table of the available sort policies.
pub fn render_policies() -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Policy", "Order"]);
    for policy in SortPolicy::ALL {
        table.add_row(vec![policy.name(), policy.description()]);
    }
    format!("{}\n", table)
}

enum Status {
    Ok,
    Failed,
    Skipped,
}

fn paint(text: &str, color: bool, status: Status) -> String {
    if !color {
        return text.to_string();
    }
    match status {
        Status::Ok => text.green().to_string(),
        Status::Failed => text.red().to_string(),
        Status::Skipped => text.yellow().to_string(),
    }
}
