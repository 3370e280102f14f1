use std::{
    io::{self, BufRead},
    sync::mpsc::Sender,
    thread,
};

use crate::info;

/// One line of the control protocol, parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Play,
    Pause,
    SetVolume(f64),
    SetFrameRate(i32),
    Remove,
    Exit,
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandParseError {
    InvalidVolume,
    InvalidFrameRate,
}

impl CommandParseError {
    pub fn usage(&self) -> &'static str {
        match self {
            Self::InvalidVolume => "Invalid volume command. Usage: volume <level>",
            Self::InvalidFrameRate => "Invalid frame rate command. Usage: frames <rate>",
        }
    }
}

impl Command {
    /// Parses one trimmed, non-empty control line. Commands are
    /// case-sensitive; a `volume`/`frames` verb with a payload that is not
    /// numeric is a parse error rather than an unknown command, so the
    /// caller can answer with the right usage hint.
    pub fn parse(line: &str) -> Result<Self, CommandParseError> {
        let mut tokens = line.split_whitespace();
        let verb = tokens.next().unwrap_or("");

        let command = match (verb, tokens.next(), tokens.next()) {
            ("play", None, _) => Self::Play,
            ("pause", None, _) => Self::Pause,
            ("remove", None, _) => Self::Remove,
            ("exit", None, _) => Self::Exit,
            ("volume", Some(level), None) => match level.parse::<f64>() {
                Ok(level) => Self::SetVolume(level),
                Err(_) => return Err(CommandParseError::InvalidVolume),
            },
            ("volume", _, _) => return Err(CommandParseError::InvalidVolume),
            ("frames", Some(rate), None) => match rate.parse::<i32>() {
                Ok(rate) => Self::SetFrameRate(rate),
                Err(_) => return Err(CommandParseError::InvalidFrameRate),
            },
            ("frames", _, _) => return Err(CommandParseError::InvalidFrameRate),
            _ => Self::Unknown(line.to_string()),
        };

        Ok(command)
    }
}

/// Spawns the blocking stdin reader. Each non-empty trimmed line is handed
/// to the UI loop over `tx`; reading stops after `exit` has been forwarded
/// (or when stdin closes / the receiver is gone).
pub fn spawn_listener(tx: Sender<String>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        println!(
            "You can now send commands (play, pause, volume <level>, frames <rate>, remove, exit):"
        );

        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let is_exit = trimmed == "exit";
            if tx.send(trimmed.to_string()).is_err() {
                break;
            }
            if is_exit {
                break;
            }
        }

        info!("[LPV][CMD] Command listener stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_verbs_parse() {
        assert_eq!(Command::parse("play"), Ok(Command::Play));
        assert_eq!(Command::parse("pause"), Ok(Command::Pause));
        assert_eq!(Command::parse("remove"), Ok(Command::Remove));
        assert_eq!(Command::parse("exit"), Ok(Command::Exit));
    }

    #[test]
    fn volume_payload_parses() {
        assert_eq!(Command::parse("volume 0.5"), Ok(Command::SetVolume(0.5)));
        assert_eq!(Command::parse("volume 1"), Ok(Command::SetVolume(1.0)));
    }

    #[test]
    fn frames_payload_parses() {
        assert_eq!(Command::parse("frames 24"), Ok(Command::SetFrameRate(24)));
        assert_eq!(Command::parse("frames -1"), Ok(Command::SetFrameRate(-1)));
    }

    #[test]
    fn malformed_payloads_are_parse_errors() {
        assert_eq!(
            Command::parse("volume abc"),
            Err(CommandParseError::InvalidVolume)
        );
        assert_eq!(Command::parse("volume"), Err(CommandParseError::InvalidVolume));
        assert_eq!(
            Command::parse("volume 0.5 extra"),
            Err(CommandParseError::InvalidVolume)
        );
        assert_eq!(
            Command::parse("frames xyz"),
            Err(CommandParseError::InvalidFrameRate)
        );
        assert_eq!(Command::parse("frames"), Err(CommandParseError::InvalidFrameRate));
    }

    #[test]
    fn anything_else_is_unknown() {
        assert_eq!(
            Command::parse("foobar"),
            Ok(Command::Unknown("foobar".to_string()))
        );
        // commands are case-sensitive
        assert_eq!(
            Command::parse("PLAY"),
            Ok(Command::Unknown("PLAY".to_string()))
        );
        // a trailing token turns a plain verb into an unknown line
        assert_eq!(
            Command::parse("play now"),
            Ok(Command::Unknown("play now".to_string()))
        );
    }
}
