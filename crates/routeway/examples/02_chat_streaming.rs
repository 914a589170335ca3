use anyhow::Result;
use routeway::{ChatMessage, Client, CreateCompletionOptions, StreamCallbacks};
use std::io::Write;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let client = Client::from_env()?;

    let options = CreateCompletionOptions::new(
        "deepseek-v3.2",
        vec![ChatMessage::user("Explain how photosynthesis works in three sentences.")],
    );

    println!("Streaming response:\n");

    let callbacks = StreamCallbacks::new()
        .on_reasoning(|text| {
            print!("\x1b[2m{}\x1b[0m", text);
            std::io::stdout().flush().ok();
        })
        .on_content(|text| {
            print!("{}", text);
            std::io::stdout().flush().ok();
        })
        .on_error(|err| eprintln!("\n\nStream failed: {}", err))
        .on_done(|| println!("\n\nDone."));

    client
        .chat()
        .completions()
        .create_stream(options, Some(callbacks))
        .await?;

    Ok(())
}
