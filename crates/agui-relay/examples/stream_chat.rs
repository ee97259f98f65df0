use std::sync::Arc;

use agui_relay::vendors::openai::OpenAiProvider;
use agui_relay::{ChatEvent, ChatRequest, RelayError, stream_chat};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), RelayError> {
    let provider = Arc::new(OpenAiProvider::from_env()?);

    let mut stream = stream_chat(
        provider,
        ChatRequest {
            message: "Show me the weather in Paris".into(),
            history: Vec::new(),
        },
    );

    while let Some(event) = stream.next_event().await {
        match event {
            ChatEvent::Activity(update) => eprintln!("[{:?}] {}", update.status, update.message),
            ChatEvent::Text(fragment) => print!("{fragment}"),
            ChatEvent::Ui(component) => {
                println!("\n<ui component={} props={}>", component.component, component.props)
            }
            ChatEvent::Error(message) => eprintln!("stream error: {message}"),
        }
    }
    println!();
    Ok(())
}
