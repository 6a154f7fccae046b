/// One line of user input, decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    NewNote,
    ShowList,
    OpenNote(String),
    ShowNote,
    SetTitle(String),
    SetContent(String),
    AppendContent(String),
    DeleteNote,
    SetAlarm(String),
    ClearAlarm,
    DismissAlarm,
    ShowTime,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command `{0}`, try `help`")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("cannot read `{0}` as a date and time, use YYYY-MM-DDTHH:MM")]
    InvalidTime(String),
    #[error("no note matches `{0}`")]
    UnknownNote(String),
    #[error("`{0}` matches more than one note")]
    AmbiguousNote(String),
}

impl Message {
    /// `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        let required = |name: &'static str| -> Result<String, CommandError> {
            if rest.is_empty() {
                Err(CommandError::MissingArgument(name))
            } else {
                Ok(rest.to_string())
            }
        };

        let message = match command {
            "new" => Self::NewNote,
            "list" | "ls" => Self::ShowList,
            "open" => Self::OpenNote(required("open")?),
            "show" => Self::ShowNote,
            "title" => Self::SetTitle(required("title")?),
            // An empty body is a legitimate edit.
            "write" => Self::SetContent(rest.to_string()),
            "append" => Self::AppendContent(required("append")?),
            "delete" | "rm" => Self::DeleteNote,
            "alarm" => Self::SetAlarm(required("alarm")?),
            "unalarm" => Self::ClearAlarm,
            "dismiss" => Self::DismissAlarm,
            "time" => Self::ShowTime,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(message))
    }
}

pub const HELP: &[&str] = &[
    "new                  create a note and open it",
    "list                 list notes, newest first",
    "open <id>            open the note whose id starts with <id>",
    "show                 show the open note",
    "title <text>         rename the open note",
    "write <text>         replace the open note's body",
    "append <text>        add a line to the open note's body",
    "delete               delete the open note",
    "alarm <date time>    remind me at YYYY-MM-DDTHH:MM (local time)",
    "unalarm              cancel the open note's alarm",
    "dismiss              silence the alarm on screen",
    "time                 show the current time",
    "quit                 leave",
];
