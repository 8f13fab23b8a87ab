//! Diagnostic rendering of the step queue.
//!
//! Produces the text behind [`Flow::dump_steps`](crate::Flow::dump_steps):
//! one line per step with its 1-based position (matching log output),
//! nesting level, executed flag and label, the currently dispatched step
//! visually marked. Invaluable when a jump does not land where expected.

use std::fmt::Write as _;

use crate::flow::state::Snapshot;

pub(crate) fn render(snap: &Snapshot, verbose: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "================================ step dump ================================"
    );
    if let Some(current) = snap.current {
        let _ = writeln!(out, "current step: {}", current + 1);
    }
    let _ = writeln!(out, "next step:    {}", snap.cursor + 1);
    let _ = writeln!(out, "steps:        {}", snap.steps.len());
    let _ = writeln!(
        out,
        "---------------------------------------------------------------------------"
    );

    for (i, line) in snap.steps.iter().enumerate() {
        let mut msg = format!("step {}/{}  level: {}", i + 1, snap.steps.len(), line.level);
        if line.executed {
            msg.push_str("  executed: true");
        }
        if let Some(label) = &line.label {
            let _ = write!(msg, "  label: {label}");
        }
        if snap.current == Some(i) {
            msg.push_str("  <== current step");
        }
        out.push_str(&msg);
        out.push('\n');
        if verbose {
            let _ = writeln!(out, "    body: {}", line.name);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use crate::config::FlowConfig;
    use crate::error::StepError;
    use crate::flow::{Flow, StepFn};

    #[test]
    fn test_dump_lists_positions_levels_and_labels() {
        let flow = Flow::builder(FlowConfig::default()).build();
        flow.start().unwrap();
        flow.then(StepFn::arc("open portal", |_ctx: Flow| async move {
            Ok::<_, StepError>(())
        }))
        .unwrap();
        flow.label("results_loop").unwrap();

        let dump = flow.dump_steps(false);
        assert!(dump.contains("steps:        2"));
        assert!(dump.contains("step 1/2  level: 0"));
        assert!(dump.contains("step 2/2  level: 0  label: results_loop"));
        assert!(!dump.contains("body:"));

        let verbose = flow.dump_steps(true);
        assert!(verbose.contains("body: open portal"));
        assert!(verbose.contains("body: label results_loop"));
    }
}
