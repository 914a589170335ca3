use anyhow::Result;
use futures::StreamExt;
use routeway::{ChatMessage, Client, CreateCompletionOptions};
use std::io::Write;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let client = Client::from_env()?;

    let options = CreateCompletionOptions::new(
        "deepseek-v3.2",
        vec![ChatMessage::user("Write a haiku about the sea.")],
    );

    let mut stream = client.chat().completions().create_iterator(options).await?;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if let Some(content) = chunk.content() {
            print!("{}", content);
            std::io::stdout().flush()?;
        }
        if let Some(reason) = chunk.finish_reason() {
            println!("\n\n[finish_reason: {}]", reason);
        }
    }

    Ok(())
}
