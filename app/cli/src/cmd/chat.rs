//! Interactive chat command.

use anyhow::Result;
use runtime::{Dispatcher, session};
use sbcore::model::Model;
use tokio::io::{self, BufReader};

const PROMPT: &str = "🧑 ";

/// Run the session loop over stdin and stdout until end of input.
pub async fn run<M: Model>(mut dispatcher: Dispatcher<M>) -> Result<()> {
    eprintln!("Switchboard chat (Ctrl+D to exit, Ctrl+C to cancel a turn)");
    eprintln!("---");

    let handled =
        session::run(&mut dispatcher, BufReader::new(io::stdin()), io::stdout(), PROMPT).await?;
    tracing::debug!(handled, active = dispatcher.active(), "session ended");
    println!();
    Ok(())
}
