use super::{Command, CommandError, CommandResult, Transaction};
use log::{debug, error, info, warn};
use std::collections::VecDeque;

/// Default number of undo steps kept before the oldest is evicted
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Manages the undo/redo stacks and the active transaction.
///
/// History is strictly linear: a successful push clears the redo stack.
/// Every operation that runs a side effect takes `&mut self` and awaits it to
/// completion, so two operations can never be in flight at the same time.
///
/// The manager knows nothing about editing modes; callers check their mode
/// gate before calling in.
pub struct HistoryManager {
    /// Oldest entry at the front
    undo_stack: VecDeque<Command>,
    /// Most recently undone entry at the back
    redo_stack: Vec<Command>,
    active: Option<Transaction>,
    capacity: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HistoryManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryManager")
            .field("undo", &self.undo_stack.len())
            .field("redo", &self.redo_stack.len())
            .field("active", &self.active.as_ref().map(Transaction::name))
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl HistoryManager {
    /// Creates a new empty history with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            active: None,
            capacity: capacity.max(1),
        }
    }

    /// Apply a command and record it.
    ///
    /// Inside a transaction the command is only buffered. Otherwise it is
    /// applied; on failure both stacks are left untouched and the error is
    /// returned.
    pub async fn push(&mut self, command: Command) -> CommandResult {
        if let Some(transaction) = self.active.as_mut() {
            debug!("Buffering '{}' in transaction '{}'", command.name(), transaction.name());
            transaction.add(command);
            return Ok(());
        }

        if let Err(err) = command.apply().await {
            error!("Push of '{}' failed: {err}", command.name());
            return Err(err);
        }

        self.record(command);
        Ok(())
    }

    fn record(&mut self, command: Command) {
        debug!("Recorded '{}'", command.name());
        self.undo_stack.push_back(command);
        while self.undo_stack.len() > self.capacity {
            if let Some(evicted) = self.undo_stack.pop_front() {
                debug!("Evicted oldest history entry '{}'", evicted.name());
            }
        }
        self.redo_stack.clear();
    }

    /// Revert the most recent command.
    ///
    /// Returns `Ok(false)` when there is nothing to undo. A failed revert
    /// leaves the command on top of the undo stack.
    pub async fn undo(&mut self) -> Result<bool, CommandError> {
        let Some(command) = self.undo_stack.pop_back() else {
            return Ok(false);
        };

        match command.revert().await {
            Ok(()) => {
                debug!("Undid '{}'", command.name());
                self.redo_stack.push(command);
                Ok(true)
            }
            Err(err) => {
                error!("Undo of '{}' failed: {err}", command.name());
                self.undo_stack.push_back(command);
                Err(err)
            }
        }
    }

    /// Re-apply the most recently undone command.
    ///
    /// Returns `Ok(false)` when there is nothing to redo. A failed apply
    /// leaves the command on top of the redo stack.
    pub async fn redo(&mut self) -> Result<bool, CommandError> {
        let Some(command) = self.redo_stack.pop() else {
            return Ok(false);
        };

        match command.apply().await {
            Ok(()) => {
                debug!("Redid '{}'", command.name());
                self.undo_stack.push_back(command);
                Ok(true)
            }
            Err(err) => {
                error!("Redo of '{}' failed: {err}", command.name());
                self.redo_stack.push(command);
                Err(err)
            }
        }
    }

    /// Open a new transaction, committing any transaction still open.
    ///
    /// If that implicit commit fails, the error is returned and no new
    /// transaction is opened.
    pub async fn begin_transaction(&mut self, name: impl Into<String>) -> CommandResult {
        let name = name.into();
        if let Some(open) = self.active.as_ref() {
            warn!("Transaction '{}' still open when beginning '{name}'; committing it", open.name());
            self.commit_transaction().await?;
        }
        info!("Begin transaction '{name}'");
        self.active = Some(Transaction::new(name));
        Ok(())
    }

    /// Close the active transaction and push its commands as one step.
    ///
    /// Returns `Ok(false)` if nothing was pushed (no transaction, or an empty one).
    pub async fn commit_transaction(&mut self) -> Result<bool, CommandError> {
        let Some(transaction) = self.active.take() else {
            return Ok(false);
        };

        let name = transaction.name().to_owned();
        let buffered = transaction.len();
        match transaction.into_command() {
            Some(command) => {
                info!("Commit transaction '{name}' ({buffered} command(s))");
                self.push(command).await?;
                Ok(true)
            }
            None => {
                debug!("Discarding empty transaction '{name}'");
                Ok(false)
            }
        }
    }

    /// Drop the active transaction. Its commands were never applied.
    pub fn rollback_transaction(&mut self) -> bool {
        match self.active.take() {
            Some(transaction) => {
                info!(
                    "Rolled back transaction '{}' ({} command(s))",
                    transaction.name(),
                    transaction.len()
                );
                true
            }
            None => false,
        }
    }

    /// Wipe both stacks and any open transaction
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.active = None;
    }

    /// Returns true if there are commands that can be undone
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if there are commands that can be redone
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Name of the command the next undo would revert
    pub fn undo_label(&self) -> Option<&str> {
        self.undo_stack.back().map(Command::name)
    }

    /// Name of the command the next redo would apply
    pub fn redo_label(&self) -> Option<&str> {
        self.redo_stack.last().map(Command::name)
    }

    pub fn is_transaction_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_transaction(&self) -> Option<&Transaction> {
        self.active.as_ref()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
