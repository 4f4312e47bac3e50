use super::Command;
use crate::util::time;
use uuid::Uuid;

/// An open group of buffered commands.
///
/// Nothing in a transaction runs until it is committed; the history manager
/// then applies the result of [`Transaction::into_command`] as a single step.
#[derive(Debug)]
pub struct Transaction {
    id: Uuid,
    name: String,
    timestamp: u64,
    commands: Vec<Command>,
}

impl Transaction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            timestamp: time::timestamp_millis(),
            commands: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Buffer a command, coalescing it into the previous one when they edit the same field
    pub fn add(&mut self, command: Command) {
        if let Some(last) = self.commands.last_mut() {
            if last.merge(&command) {
                return;
            }
        }
        self.commands.push(command);
    }

    /// Collapse the buffered commands into what should be pushed:
    /// nothing for an empty transaction, the command itself for a single one,
    /// and a composite for two or more.
    pub fn into_command(mut self) -> Option<Command> {
        match self.commands.len() {
            0 => None,
            1 => self.commands.pop(),
            _ => Some(Command::composite(self.name, self.commands)),
        }
    }
}
