//! Operator Commands
//!
//! Parses one line of operator input into a [`Command`]. Keywords are
//! case-insensitive and separated by any whitespace.

use std::fmt;
use std::str::FromStr;

use entities_process::IoEvent;

/// Command menu shown by `help`
pub const MENU: &[(&str, &str)] = &[
    ("stop", "Stop the simulation and display summary statistics"),
    ("show jobs", "Display all jobs with the status of each process"),
    ("show queues", "Display the contents of the Ready, Blocked and Completed queues"),
    ("show memory", "Display a map of memory showing the starting location of each job"),
    ("tick n", "Run the simulation for n ticks"),
    ("admit job n", "Admit program n as a job"),
    ("admit all", "Admit every program that has not been admitted"),
    (
        "interrupt n",
        "Move every process waiting on event n (1 INPUT, 2 OUTPUT) to the Ready Queue",
    ),
    ("help", "Display this menu"),
];

/// Which jobs an `admit` command names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmitTarget {
    Job(usize),
    All,
}

/// Simulator command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Stop,
    ShowJobs,
    ShowQueues,
    ShowMemory,
    Tick(usize),
    Admit(AdmitTarget),
    Interrupt(IoEvent),
    Help,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<String> = line.split_whitespace().map(str::to_lowercase).collect();
        let words: Vec<&str> = words.iter().map(String::as_str).collect();

        match words.as_slice() {
            [] => Err(CommandError::Empty),
            ["stop"] => Ok(Command::Stop),
            ["help"] => Ok(Command::Help),
            ["show", "jobs"] => Ok(Command::ShowJobs),
            ["show", "queues"] => Ok(Command::ShowQueues),
            ["show", "memory"] => Ok(Command::ShowMemory),
            ["tick", n] => Ok(Command::Tick(parse_number(n)?)),
            ["admit", "all"] => Ok(Command::Admit(AdmitTarget::All)),
            ["admit", "job", n] => Ok(Command::Admit(AdmitTarget::Job(parse_number(n)?))),
            ["interrupt", n] => {
                let code: u8 = parse_number(n)?;
                let event =
                    IoEvent::try_from(code).map_err(|_| CommandError::UnknownEvent(code))?;
                Ok(Command::Interrupt(event))
            }
            ["tick"] | ["interrupt"] | ["admit"] | ["admit", "job"] | ["show"] => {
                Err(CommandError::MissingArgument(line.trim().to_string()))
            }
            _ => Err(CommandError::Unknown(line.trim().to_string())),
        }
    }
}

fn parse_number<T: FromStr>(word: &str) -> Result<T, CommandError> {
    word.parse()
        .map_err(|_| CommandError::InvalidNumber(word.to_string()))
}

/// Command parsing errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    Unknown(String),
    MissingArgument(String),
    InvalidNumber(String),
    UnknownEvent(u8),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Empty => write!(f, "No command given"),
            CommandError::Unknown(line) => write!(f, "Invalid simulator command: {}", line),
            CommandError::MissingArgument(line) => write!(f, "Missing argument: {}", line),
            CommandError::InvalidNumber(word) => write!(f, "Not a number: {}", word),
            CommandError::UnknownEvent(code) => {
                write!(f, "Unknown event {} (expected 1 or 2)", code)
            }
        }
    }
}

impl std::error::Error for CommandError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let cases = [
            ("stop", Command::Stop),
            ("help", Command::Help),
            ("show jobs", Command::ShowJobs),
            ("  SHOW   Queues ", Command::ShowQueues),
            ("show memory", Command::ShowMemory),
            ("tick 12", Command::Tick(12)),
            ("admit all", Command::Admit(AdmitTarget::All)),
            ("admit job 0", Command::Admit(AdmitTarget::Job(0))),
            ("interrupt 1", Command::Interrupt(IoEvent::Input)),
            ("interrupt 2", Command::Interrupt(IoEvent::Output)),
        ];
        for (line, expected) in cases {
            assert_eq!(line.parse::<Command>(), Ok(expected), "{}", line);
        }
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Command>(), Err(CommandError::Empty));
        assert_eq!(
            "tick".parse::<Command>(),
            Err(CommandError::MissingArgument("tick".to_string()))
        );
        assert_eq!(
            "tick many".parse::<Command>(),
            Err(CommandError::InvalidNumber("many".to_string()))
        );
        assert_eq!(
            "tick -1".parse::<Command>(),
            Err(CommandError::InvalidNumber("-1".to_string()))
        );
        assert_eq!("interrupt 3".parse::<Command>(), Err(CommandError::UnknownEvent(3)));
        assert_eq!(
            "reboot".parse::<Command>(),
            Err(CommandError::Unknown("reboot".to_string()))
        );
    }

    #[test]
    fn test_menu_lists_every_command() {
        for (name, _) in MENU {
            let line = name.replace(" n", " 1");
            assert!(line.parse::<Command>().is_ok(), "{}", line);
        }
    }
}
