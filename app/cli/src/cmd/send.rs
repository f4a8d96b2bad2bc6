//! One-shot message command.

use anyhow::Result;
use runtime::Dispatcher;
use sbcore::model::Model;

/// Handle a single utterance and print the reply.
pub async fn run<M: Model>(mut dispatcher: Dispatcher<M>, content: &str) -> Result<()> {
    let reply = dispatcher.handle(content).await;
    println!("{reply}");
    Ok(())
}
