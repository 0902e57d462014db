use cobot_agent::{AgentStatus, Dispatch, RankedAction};
use serde::Serialize;
use std::fmt::Write;

#[derive(Serialize)]
pub struct QueryOutput<'a> {
    pub query: &'a str,
    pub minimum_score: f64,
    pub matches: &'a [RankedAction],
}

/// Console reply for one dispatched line.
pub fn dispatch_line(input: &str, dispatch: &Dispatch) -> String {
    match dispatch {
        Dispatch::Exact(action) => format!("Run action '{}'.", action.name),
        Dispatch::Similar {
            action,
            score,
            alternatives,
        } => {
            let mut line = format!("Run action '{}'. (score {score:.3})", action.name);
            if !alternatives.is_empty() {
                let others: Vec<String> = alternatives
                    .iter()
                    .map(|alt| format!("{} {:.3}", alt.name, alt.score))
                    .collect();
                let _ = write!(line, " also: {}", others.join(", "));
            }
            line
        }
        Dispatch::NoMatch => format!("No similar match for user input: '{input}'."),
    }
}

pub fn matches_table(matches: &[RankedAction]) -> String {
    if matches.is_empty() {
        return "No matches.\n".to_string();
    }
    let width = matches.iter().map(|m| m.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (rank, m) in matches.iter().enumerate() {
        let _ = writeln!(out, "{:>2}. {:<width$}  {:.3}", rank + 1, m.name, m.score);
    }
    out
}

pub fn status_text(status: &AgentStatus) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "agent:    {}", status.agent);
    let _ = writeln!(out, "language: {}", status.language);
    let _ = writeln!(
        out,
        "version:  {}{}",
        status.version,
        if status.dirty { " (uncommitted changes)" } else { "" }
    );
    let _ = writeln!(out, "actions:  {}", status.actions);
    let _ = writeln!(out, "terms:    {}", status.terms);
    let _ = writeln!(out, "artifact: {}", status.artifact.display());
    let _ = writeln!(out, "cache:    {}", status.cache);
    out
}
