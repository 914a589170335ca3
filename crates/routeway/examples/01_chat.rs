use anyhow::Result;
use routeway::{ChatMessage, Client, CreateCompletionOptions};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let client = Client::from_env()?;

    let options = CreateCompletionOptions::new(
        "deepseek-v3.2",
        vec![
            ChatMessage::system("You are a helpful assistant."),
            ChatMessage::user("Hello, how are you?"),
        ],
    )
    .temperature(0.7)
    .max_tokens(100);

    let response = client.chat().completions().create(options).await?;

    println!("Response: {}", response.content().unwrap_or_default());
    println!("Tokens used: {}", response.usage.total_tokens);

    Ok(())
}
