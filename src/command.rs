use crate::prompt::{CommentLevel, Mode};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run,
    Copy,
    Reset,
    Mode(Mode),
    Comments(CommentLevel),
    ToggleDebug,
    ToggleOptimize,
    ToggleExplain,
    TogglePreserve,
    Key(String),
    Load(String),
    Settings,
    Help,
    Quit,
}

pub fn parse_command(input: &str) -> Option<Command> {
    let input = input.strip_prefix(':').unwrap_or(input).trim();

    if input.is_empty() {
        return None;
    }

    let (cmd, args) = match input.split_once(char::is_whitespace) {
        Some((cmd, args)) => (cmd, args.trim()),
        None => (input, ""),
    };

    match cmd {
        "run" | "r" | "go" => Some(Command::Run),
        "copy" | "y" => Some(Command::Copy),
        "reset" => Some(Command::Reset),
        "mode" => args.parse().ok().map(Command::Mode),
        "comments" | "c" => args.parse().ok().map(Command::Comments),
        "debug" => Some(Command::ToggleDebug),
        "optimize" | "opt" => Some(Command::ToggleOptimize),
        "explain" => Some(Command::ToggleExplain),
        "preserve" => Some(Command::TogglePreserve),
        "key" if !args.is_empty() => Some(Command::Key(args.to_owned())),
        "load" | "open" if !args.is_empty() => Some(Command::Load(args.to_owned())),
        "settings" | "s" => Some(Command::Settings),
        "help" | "h" => Some(Command::Help),
        "quit" | "q" => Some(Command::Quit),
        _ => None,
    }
}
