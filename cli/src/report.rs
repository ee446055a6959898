use kvcluster_cluster::{RunReport, Selection};
use std::io::{self, Write};

const SEPARATOR_WIDTH: usize = 72;

/// Print the discovered servers, the selected node and the outcome.
///
/// Failures end with the raw control-plane payload when one exists.
pub fn print_report<W: Write>(report: &RunReport, out: &mut W) -> io::Result<()> {
    if !report.servers.is_empty() {
        for server in &report.servers {
            writeln!(out, "{}", server)?;
        }
        writeln!(out, "{}", "-".repeat(SEPARATOR_WIDTH))?;
    }

    if let Some(node) = &report.bootstrap {
        match report.selection {
            Some(Selection::Fallback) => {
                let self_uri = report
                    .cluster_state
                    .as_ref()
                    .map(|s| s.self_uri.as_str())
                    .unwrap_or_default();
                writeln!(
                    out,
                    "bootstrap: {} (self uri {:?} not discovered, using first server)",
                    node, self_uri
                )?;
            }
            _ => writeln!(out, "bootstrap: {}", node)?,
        }
        if node.is_joined() {
            writeln!(
                out,
                "note: {} already belongs to replicaset {}",
                node.uri,
                node.replicaset_id.as_deref().unwrap_or_default()
            )?;
        }
    }

    if report.is_success() {
        writeln!(out, "success")?;
        return Ok(());
    }

    writeln!(out, "fail")?;
    if let Some(err) = &report.error {
        writeln!(out, "{}", err)?;
        if let Some(payload) = err.diagnostic_payload() {
            let pretty = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
            writeln!(out, "{}", pretty)?;
        }
    }

    Ok(())
}
