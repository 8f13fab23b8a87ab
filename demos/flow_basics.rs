//! Labels and jumps on a linear step queue: a countdown loop.
//!
//! Run with: `cargo run --example flow_basics`

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use prospector::{Flow, FlowConfig, StepError, StepFn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let flow = Flow::builder(FlowConfig::default()).build();
    flow.start()?;

    let remaining = Arc::new(AtomicU32::new(3));

    flow.label("top")?;
    flow.then(StepFn::arc("announce", |ctx: Flow| async move {
        println!("pass; next step is {}", ctx.cursor() + 1);
        Ok::<_, StepError>(())
    }))?;
    flow.then(StepFn::arc("countdown", move |ctx: Flow| {
        let remaining = remaining.clone();
        async move {
            if remaining.fetch_sub(1, Ordering::SeqCst) > 1 {
                ctx.goto("top")?;
            }
            Ok(())
        }
    }))?;

    println!("{}", flow.dump_steps(true));
    flow.run().await?;
    println!("{}", flow.dump_steps(true));
    Ok(())
}
