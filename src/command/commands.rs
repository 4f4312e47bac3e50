use super::{CommandError, CommandResult};
use crate::util::time;
use futures::FutureExt;
use futures::future::{self, BoxFuture};
use log::error;
use std::sync::Arc;
use uuid::Uuid;

/// The future returned by a command delegate
pub type CommandFuture = BoxFuture<'static, CommandResult>;

/// A side effect bound at construction, usually a call into the diagram model service.
///
/// Delegates must be idempotent: running one twice in a row leaves the same
/// observable state as running it once.
pub type Delegate = Arc<dyn Fn() -> CommandFuture + Send + Sync>;

enum CommandBody {
    Single {
        apply: Delegate,
        revert: Delegate,
        merge_key: Option<String>,
    },
    Composite(Vec<Command>),
}

/// A reversible unit of work.
///
/// `revert` after a successful `apply` must restore the state observed before
/// `apply`. Commands are immutable once pushed; the only mutation is
/// [`Command::merge`], used while a command is still buffered in a transaction.
pub struct Command {
    id: Uuid,
    name: String,
    timestamp: u64,
    body: CommandBody,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.body {
            CommandBody::Single { merge_key, .. } => f
                .debug_struct("Command")
                .field("id", &self.id)
                .field("name", &self.name)
                .field("timestamp", &self.timestamp)
                .field("merge_key", merge_key)
                .finish_non_exhaustive(),
            CommandBody::Composite(children) => f
                .debug_struct("Command")
                .field("id", &self.id)
                .field("name", &self.name)
                .field("timestamp", &self.timestamp)
                .field("children", children)
                .finish(),
        }
    }
}

impl Command {
    /// Create a command from asynchronous apply/revert delegates
    pub fn new<A, R>(name: impl Into<String>, apply: A, revert: R) -> Self
    where
        A: Fn() -> CommandFuture + Send + Sync + 'static,
        R: Fn() -> CommandFuture + Send + Sync + 'static,
    {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            timestamp: time::timestamp_millis(),
            body: CommandBody::Single {
                apply: Arc::new(apply),
                revert: Arc::new(revert),
                merge_key: None,
            },
        }
    }

    /// Create a command whose delegates complete synchronously
    pub fn from_fns<A, R>(name: impl Into<String>, apply: A, revert: R) -> Self
    where
        A: Fn() -> CommandResult + Send + Sync + 'static,
        R: Fn() -> CommandResult + Send + Sync + 'static,
    {
        Self::new(
            name,
            move || future::ready(apply()).boxed(),
            move || future::ready(revert()).boxed(),
        )
    }

    /// Wrap already-buffered commands into one step.
    ///
    /// Children apply in order and revert in reverse order.
    pub fn composite(name: impl Into<String>, children: Vec<Command>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            timestamp: time::timestamp_millis(),
            body: CommandBody::Composite(children),
        }
    }

    /// Mark this command as an edit of one logical field so that later edits
    /// of the same field can be coalesced into it.
    pub fn with_merge_key(mut self, key: impl Into<String>) -> Self {
        if let CommandBody::Single { merge_key, .. } = &mut self.body {
            *merge_key = Some(key.into());
        }
        self
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

    pub fn merge_key(&self) -> Option<&str> {
        match &self.body {
            CommandBody::Single { merge_key, .. } => merge_key.as_deref(),
            CommandBody::Composite(_) => None,
        }
    }

    /// Number of leaf commands this command runs
    pub fn len(&self) -> usize {
        match &self.body {
            CommandBody::Single { .. } => 1,
            CommandBody::Composite(children) => children.iter().map(Command::len).sum(),
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.body, CommandBody::Composite(_))
    }

    /// Coalesce `other` into `self` when both edit the same field.
    ///
    /// On success `self` keeps its own revert delegate (the value before the
    /// first edit) and takes over the forward delegate of `other` (the value
    /// after the latest edit).
    pub fn merge(&mut self, other: &Command) -> bool {
        let other_apply = match &other.body {
            CommandBody::Single {
                apply,
                merge_key: Some(other_key),
                ..
            } if self.merge_key() == Some(other_key.as_str()) => apply.clone(),
            _ => return false,
        };

        if let CommandBody::Single { apply, .. } = &mut self.body {
            *apply = other_apply;
            self.timestamp = other.timestamp;
            true
        } else {
            false
        }
    }

    /// Run the forward side effect
    pub fn apply(&self) -> BoxFuture<'_, CommandResult> {
        async move {
            match &self.body {
                CommandBody::Single { apply, .. } => {
                    apply().await.map_err(|err| self.wrap_apply_error(err))
                }
                CommandBody::Composite(children) => apply_children(&self.name, children).await,
            }
        }
        .boxed()
    }

    /// Run the reverse side effect
    pub fn revert(&self) -> BoxFuture<'_, CommandResult> {
        async move {
            match &self.body {
                CommandBody::Single { revert, .. } => {
                    revert().await.map_err(|err| self.wrap_revert_error(err))
                }
                CommandBody::Composite(children) => revert_children(&self.name, children).await,
            }
        }
        .boxed()
    }

    fn wrap_apply_error(&self, err: CommandError) -> CommandError {
        match err {
            CommandError::Service(reason) => CommandError::ApplyFailed {
                command: self.name.clone(),
                reason,
            },
            other => other,
        }
    }

    fn wrap_revert_error(&self, err: CommandError) -> CommandError {
        match err {
            CommandError::Service(reason) => CommandError::RevertFailed {
                command: self.name.clone(),
                reason,
            },
            other => other,
        }
    }
}

// A child failing mid-way undoes the children that already ran, so the
// composite is either fully applied or not applied at all.
async fn apply_children(name: &str, children: &[Command]) -> CommandResult {
    for (index, child) in children.iter().enumerate() {
        if let Err(err) = child.apply().await {
            for done in children[..index].iter().rev() {
                if let Err(recovery) = done.revert().await {
                    error!("'{name}': could not revert '{}' after failed apply: {recovery}", done.name());
                }
            }
            return Err(err);
        }
    }
    Ok(())
}

// A child failing mid-way re-applies the children already reverted, leaving
// the composite in its applied state.
async fn revert_children(name: &str, children: &[Command]) -> CommandResult {
    for (index, child) in children.iter().enumerate().rev() {
        if let Err(err) = child.revert().await {
            for done in &children[index + 1..] {
                if let Err(recovery) = done.apply().await {
                    error!("'{name}': could not re-apply '{}' after failed revert: {recovery}", done.name());
                }
            }
            return Err(err);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use parking_lot::Mutex;

    fn setter(cell: &Arc<Mutex<i32>>, name: &str, from: i32, to: i32) -> Command {
        let (a, r) = (cell.clone(), cell.clone());
        Command::from_fns(
            name,
            move || {
                *a.lock() = to;
                Ok(())
            },
            move || {
                *r.lock() = from;
                Ok(())
            },
        )
    }

    #[test]
    fn merge_keeps_first_revert_and_last_apply() {
        let cell = Arc::new(Mutex::new(0));
        let mut first = setter(&cell, "edit", 0, 1).with_merge_key("cell:A1");
        let second = setter(&cell, "edit", 1, 2).with_merge_key("cell:A1");
        assert!(first.merge(&second));

        block_on(first.apply()).unwrap();
        assert_eq!(*cell.lock(), 2);
        block_on(first.revert()).unwrap();
        assert_eq!(*cell.lock(), 0);
    }

    #[test]
    fn merge_rejects_other_fields() {
        let cell = Arc::new(Mutex::new(0));
        let mut first = setter(&cell, "edit", 0, 1).with_merge_key("cell:A1");
        let other = setter(&cell, "edit", 0, 5).with_merge_key("cell:B1");
        let unkeyed = setter(&cell, "edit", 0, 5);
        assert!(!first.merge(&other));
        assert!(!first.merge(&unkeyed));
    }

    #[test]
    fn service_errors_are_tagged_with_command_name() {
        let cmd = Command::from_fns(
            "Rename bus",
            || Err(CommandError::service("timeout")),
            || Ok(()),
        );
        let err = block_on(cmd.apply()).unwrap_err();
        assert_eq!(
            err,
            CommandError::ApplyFailed {
                command: "Rename bus".to_owned(),
                reason: "timeout".to_owned()
            }
        );
    }
}
