//! Run summaries in JSON.

use serde_json::{json, Value};

use crate::builder::GenerationReport;

/// Summary of a run: package, and for each file its path and value table.
pub fn summary_json(report: &GenerationReport) -> Value {
    let files: Vec<Value> = report
        .files
        .iter()
        .map(|f| {
            json!({
                "type": f.type_name,
                "path": f.path.display().to_string(),
                "formatted": f.formatted,
                "kind": f.table.kind.name(),
                "values": f.table.entries(),
            })
        })
        .collect();
    json!({
        "package": report.package,
        "dir": report.dir.display().to_string(),
        "files": files,
    })
}

/// Prints the run summary as pretty JSON on stdout.
///
/// Falls back to a compact listing of paths if serialization fails.
pub fn print_json(report: &GenerationReport) {
    match serde_json::to_string_pretty(&summary_json(report)) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("[WARN] JSON serialization failed: {}", e);
            println!("{{\"files\": {:?}}}", report.paths());
        }
    }
}
