use std::sync::Arc;

use ecofusion::{
    ChatConfig,
    chat::{BotItem, BotReply, ChatStateMachine, ChatWidget, FileStorage, HttpChatTransport},
    constants::WELCOME_MESSAGE_ID,
};

use crate::helpers::{GatedTransport, closed_addr};

#[tokio::test]
async fn test_widget_state_survives_restart_with_file_storage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chat.json");
    let config = ChatConfig::default();

    let transport = GatedTransport::new(Ok(BotReply::from_items(vec![BotItem::text("Hi!")])));
    transport.release();
    let machine = Arc::new(ChatStateMachine::new(
        transport.clone(),
        Arc::new(FileStorage::open(&path).unwrap()),
    ));
    let mut widget = ChatWidget::new(machine.clone(), &config);
    widget.open();
    widget.toggle_minimize();
    machine.send_message("hello").await;
    let session_id = machine.session_id();
    drop(widget);
    drop(machine);

    let config = ChatConfig::new(format!("http://{}", closed_addr().await));
    let machine = Arc::new(ChatStateMachine::new(
        Arc::new(HttpChatTransport::new(&config)),
        Arc::new(FileStorage::open(&path).unwrap()),
    ));
    let widget = ChatWidget::new(machine.clone(), &config);
    assert!(widget.is_open());
    assert!(widget.is_minimized());
    assert_eq!(machine.session_id(), session_id);

    let messages = machine.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].id, WELCOME_MESSAGE_ID);
    assert_eq!(messages[1].text, "hello");
    assert_eq!(messages[2].text, "Hi!");
}
