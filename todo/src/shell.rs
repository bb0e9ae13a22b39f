//! Line-oriented front end for the todo store.
//!
//! Each input line is parsed into a [`Command`] and handled against a
//! [`Store`]. Ordinary input mistakes come back as non-fatal
//! [`ShellError`]s; a malformed wire action is fatal.

use crate::edit::EditSession;
use crate::reducer::TodoReducer;
use crate::types::{ActionError, TodoAction, TodoId, TodoState};
use thiserror::Error;
use todo_store_runtime::{Store, StoreError};

/// Usage text printed by `help`
pub const HELP: &str = "\
Commands:
  add <text>     add a todo
  toggle <id>    mark a todo done or not done
  rm <id>        remove a todo
  edit <id>      start editing a todo
  save [text]    save the edit (keeps the current draft without text)
  cancel         abandon the edit
  list           show the list
  help           show this help
  quit           exit
A line starting with '{' is sent as a raw action, e.g.
  {\"type\":\"TOGGLE_TODO\",\"payload\":1}";

/// Errors from parsing or handling a shell line
#[derive(Error, Debug)]
pub enum ShellError {
    /// First word is not a command
    #[error("Unknown command: {0} (try `help`)")]
    UnknownCommand(String),

    /// Command needs an argument that was not given
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),

    /// `save` or `cancel` without an edit in progress
    #[error("Not editing anything (use `edit <id>` first)")]
    NotEditing,

    /// No todo is displayed with this id
    #[error("No todo with id {0}")]
    NoSuchTodo(String),

    /// Raw wire action could not be decoded
    #[error(transparent)]
    Action(#[from] ActionError),

    /// Store refused the action
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ShellError {
    /// Returns `true` if the shell must stop
    ///
    /// Undecodable wire actions and a store that no longer accepts actions
    /// are fatal. Everything else is a typo the user can fix.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Action(_) | Self::Store(_))
    }
}

/// A parsed shell line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// `add <text>`
    Add(String),
    /// `toggle <id>`
    Toggle(String),
    /// `rm <id>`
    Remove(String),
    /// `edit <id>`
    Edit(String),
    /// `save [text]`
    Save(Option<String>),
    /// `cancel`
    Cancel,
    /// `list`
    List,
    /// `help`
    Help,
    /// `quit`
    Quit,
    /// Raw wire action
    Dispatch(TodoAction),
}

impl Command {
    /// Parses one input line
    ///
    /// Returns `Ok(None)` for a blank line.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::UnknownCommand`] or
    /// [`ShellError::MissingArgument`] for unusable input, and
    /// [`ShellError::Action`] when a raw action does not decode.
    pub fn parse(line: &str) -> Result<Option<Self>, ShellError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        if line.starts_with('{') {
            return Ok(Some(Self::Dispatch(TodoAction::from_json(line)?)));
        }

        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, rest)| (word, rest.trim()));

        let argument = |name: &'static str| {
            if rest.is_empty() {
                Err(ShellError::MissingArgument(name))
            } else {
                Ok(rest.to_string())
            }
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "add" => Self::Add(argument("add")?),
            "toggle" => Self::Toggle(argument("toggle")?),
            "rm" | "remove" => Self::Remove(argument("rm")?),
            "edit" => Self::Edit(argument("edit")?),
            "save" => Self::Save((!rest.is_empty()).then(|| rest.to_string())),
            "cancel" => Self::Cancel,
            "list" | "ls" => Self::List,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => return Err(ShellError::UnknownCommand(word.to_string())),
        };

        Ok(Some(command))
    }
}

/// What the caller should do after a command
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Show the list again
    Render,
    /// Show a message
    Message(&'static str),
    /// Stop reading input
    Quit,
}

/// Shell state: the store plus the current edit session
pub struct Shell {
    store: Store<TodoReducer>,
    session: EditSession,
}

impl Shell {
    /// Creates a shell over `store`
    #[must_use]
    pub fn new(store: Store<TodoReducer>) -> Self {
        Self {
            store,
            session: EditSession::new(),
        }
    }

    /// The underlying store
    #[must_use]
    pub const fn store(&self) -> &Store<TodoReducer> {
        &self.store
    }

    /// The current edit session
    #[must_use]
    pub const fn session(&self) -> &EditSession {
        &self.session
    }

    /// Parses and handles one input line
    ///
    /// # Errors
    ///
    /// See [`Command::parse`] and [`Shell::handle`].
    pub async fn execute(&mut self, line: &str) -> Result<Option<Outcome>, ShellError> {
        match Command::parse(line)? {
            Some(command) => self.handle(command).await.map(Some),
            None => Ok(None),
        }
    }

    /// Handles one command
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::NoSuchTodo`] when `edit` names no todo,
    /// [`ShellError::NotEditing`] for `save` or `cancel` outside an edit,
    /// and [`ShellError::Store`] once the store has shut down.
    pub async fn handle(&mut self, command: Command) -> Result<Outcome, ShellError> {
        tracing::debug!(?command, "Handling command");

        match command {
            Command::Add(text) => self.store.send(TodoAction::AddTodo(text)).await?,
            Command::Toggle(raw) => {
                let id = self.resolve(&raw).await;
                self.store.send(TodoAction::ToggleTodo(id)).await?;
            },
            Command::Remove(raw) => {
                let id = self.resolve(&raw).await;
                if self.session.is_editing(&id) {
                    self.session.cancel();
                }
                self.store.send(TodoAction::RemoveTodo(id)).await?;
            },
            Command::Edit(raw) => {
                let item = self
                    .store
                    .state(|state| state.find_id(&raw).and_then(|id| state.get(&id).cloned()))
                    .await;
                let Some(item) = item else {
                    return Err(ShellError::NoSuchTodo(raw));
                };
                self.session.start(&item);
            },
            Command::Save(text) => {
                if self.session.editing_id().is_none() {
                    return Err(ShellError::NotEditing);
                }
                if let Some(text) = text {
                    self.session.set_text(text);
                }
                let Some(action) = self.session.save() else {
                    return Ok(Outcome::Message("Text cannot be empty, still editing"));
                };
                self.store.send(action).await?;
            },
            Command::Cancel => {
                if self.session.editing_id().is_none() {
                    return Err(ShellError::NotEditing);
                }
                self.session.cancel();
            },
            Command::List => {},
            Command::Help => return Ok(Outcome::Message(HELP)),
            Command::Quit => return Ok(Outcome::Quit),
            Command::Dispatch(action) => self.store.send(action).await?,
        }

        Ok(Outcome::Render)
    }

    /// Renders the list and stats line
    pub async fn render(&self) -> String {
        self.store.state(|state| render(state, &self.session)).await
    }

    /// Stops the store; later commands that dispatch fail
    pub fn shutdown(&self) {
        self.store.shutdown();
    }

    /// Finds the todo displayed as `raw`
    ///
    /// An unknown id is still returned (parsed) so the store can treat it
    /// as a no-op.
    async fn resolve(&self, raw: &str) -> TodoId {
        if let Some(id) = self.store.state(|state| state.find_id(raw)).await {
            return id;
        }
        let Ok(id) = raw.parse::<TodoId>();
        id
    }
}

/// Renders `state` as text, one line per todo followed by the stats line
///
/// ```text
/// [x] 1  Buy oat milk
/// [ ] 2  Call mom
///     editing: Call dad
/// Total: 2  Completed: 1  Pending: 1
/// ```
#[must_use]
pub fn render(state: &TodoState, session: &EditSession) -> String {
    let mut out = String::new();

    if state.is_empty() {
        out.push_str("No todos yet.\n");
    }

    for item in state.items() {
        let mark = if item.completed { 'x' } else { ' ' };
        out.push_str(&format!("[{mark}] {}  {}\n", item.id, item.text));
        if session.is_editing(&item.id) {
            out.push_str(&format!("    editing: {}\n", session.text()));
        }
    }

    let stats = state.stats();
    out.push_str(&format!(
        "Total: {}  Completed: {}  Pending: {}",
        stats.total, stats.completed, stats.pending
    ));
    out
}
