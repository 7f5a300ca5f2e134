//! Open/minimized state of the chat window.

use std::sync::Arc;

use super::{ChatMessage, ChatStateMachine};
use crate::{
    config::ChatConfig,
    constants::{STORAGE_IS_MINIMIZED, STORAGE_IS_OPEN},
};

/// Window state for a [`ChatStateMachine`], persisted next to the history.
///
/// Whenever the window is open on an empty history, the welcome message is added
/// (if enabled in [`ChatConfig`]).
pub struct ChatWidget {
    machine: Arc<ChatStateMachine>,
    show_welcome_message: bool,
    is_open: bool,
    is_minimized: bool,
}

impl ChatWidget {
    /// Restore the window flags. Without a stored open flag, `config.auto_open` decides.
    pub fn new(machine: Arc<ChatStateMachine>, config: &ChatConfig) -> Self {
        let store = machine.store();
        let is_open = store.load_flag(STORAGE_IS_OPEN, config.auto_open);
        let is_minimized = store.load_flag(STORAGE_IS_MINIMIZED, false);

        let widget = Self {
            machine,
            show_welcome_message: config.show_welcome_message,
            is_open,
            is_minimized,
        };
        widget.greet();
        widget
    }

    pub fn machine(&self) -> &Arc<ChatStateMachine> {
        &self.machine
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_minimized(&self) -> bool {
        self.is_minimized
    }

    /// Open (and un-minimize) the window.
    pub fn open(&mut self) {
        self.set_open(true);
        self.set_minimized(false);
        self.greet();
    }

    pub fn close(&mut self) {
        self.set_open(false);
    }

    pub fn toggle(&mut self) {
        if self.is_open {
            self.close();
        } else {
            self.open();
        }
    }

    pub fn toggle_minimize(&mut self) {
        self.set_minimized(!self.is_minimized);
    }

    /// Clear the conversation; an open window greets again.
    pub fn clear_chat(&self) {
        self.machine.clear_chat();
        self.greet();
    }

    fn set_open(&mut self, value: bool) {
        self.is_open = value;
        self.machine.store().save_flag(STORAGE_IS_OPEN, value);
    }

    fn set_minimized(&mut self, value: bool) {
        self.is_minimized = value;
        self.machine.store().save_flag(STORAGE_IS_MINIMIZED, value);
    }

    fn greet(&self) {
        if self.is_open && self.show_welcome_message && self.machine.messages().is_empty() {
            let welcome = ChatMessage::welcome(self.machine.clock());
            self.machine.add_message(welcome);
        }
    }
}
