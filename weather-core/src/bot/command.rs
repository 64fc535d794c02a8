/// A bot command recognised in message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    /// `/city <name>`; the argument is kept as typed, minus surrounding whitespace.
    City(String),
    Weather,
    Unknown(String),
}

impl Command {
    /// Returns `None` for text that is not a command at all.
    pub fn parse(text: &str) -> Option<Self> {
        let rest = text.strip_prefix('/')?;

        let (head, args) = match rest.split_once(char::is_whitespace) {
            Some((head, args)) => (head, args.trim()),
            None => (rest, ""),
        };

        // `/city@my_bot Paris` in group chats.
        let keyword = head.split_once('@').map_or(head, |(keyword, _)| keyword);
        if keyword.is_empty() {
            return None;
        }

        let command = match keyword {
            "start" => Command::Start,
            "help" => Command::Help,
            "city" => Command::City(args.to_string()),
            "weather" => Command::Weather,
            other => Command::Unknown(other.to_string()),
        };

        Some(command)
    }
}
