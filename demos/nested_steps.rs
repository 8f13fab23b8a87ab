//! Sub-steps: registrations made from inside a running step land between
//! the parent and the parent's next sibling, one level deeper.
//!
//! Run with: `cargo run --example nested_steps`

use prospector::{Flow, FlowConfig, StepError, StepFn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let flow = Flow::builder(FlowConfig::default()).build();
    flow.start()?;

    flow.then(StepFn::arc("parent", |ctx: Flow| async move {
        println!("parent runs and registers two children");
        ctx.then(StepFn::arc("child one", |_ctx: Flow| async move {
            println!("  child one");
            Ok::<_, StepError>(())
        }))?;
        ctx.then(StepFn::arc("child two", |_ctx: Flow| async move {
            println!("  child two");
            Ok::<_, StepError>(())
        }))?;
        Ok(())
    }))?;
    flow.then(StepFn::arc("sibling", |_ctx: Flow| async move {
        println!("sibling runs after the children");
        Ok::<_, StepError>(())
    }))?;

    flow.run().await?;
    println!("{}", flow.dump_steps(true));
    Ok(())
}
