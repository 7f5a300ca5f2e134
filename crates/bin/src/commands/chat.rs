//! Chat command - a terminal client for the conversational server.

use std::{sync::Arc, time::Duration};

use ecofusion::{
    ChatConfig, ConnectionConfig,
    chat::{ChatMessage, ChatStateMachine, ChatWidget, FileStorage, HttpChatTransport, Sender},
};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::ChatArgs;

/// Run the interactive chat
pub async fn run(args: &ChatArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = ChatConfig {
        show_welcome_message: !args.no_welcome,
        auto_open: true,
        connection: ConnectionConfig {
            timeout: Duration::from_millis(args.timeout_ms),
            ..ConnectionConfig::default()
        },
        ..ChatConfig::new(&args.server_url)
    };

    let storage = Arc::new(FileStorage::open(&args.store)?);
    let transport = Arc::new(HttpChatTransport::new(&config));
    let machine = Arc::new(ChatStateMachine::new(transport, storage));
    machine.initialize().await;

    let mut widget = ChatWidget::new(machine.clone(), &config);
    widget.open();

    if let Some(error) = machine.error() {
        eprintln!("! {error}");
    }
    println!("Session {} (type /clear to start over, /quit to exit)", machine.session_id());
    println!();

    let mut printed = print_new(&machine.messages(), 0);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/quit" | "/exit" => break,
            "/clear" => {
                widget.clear_chat();
                println!("-- new session {} --", machine.session_id());
                printed = print_new(&machine.messages(), 0);
            }
            text => {
                // Input is already on screen; skip echoing the user message
                machine.send_message(text).await;
                printed = print_new(&machine.messages(), printed);
            }
        }
    }

    Ok(())
}

/// Print messages after index `from`, returning the new count.
fn print_new(messages: &[ChatMessage], from: usize) -> usize {
    for message in messages.iter().skip(from) {
        if message.sender == Sender::Bot && !message.is_loading {
            println!("bot> {}", message.text.replace('\n', "\n     "));
            println!();
        }
    }
    messages.len()
}
