//! Commands understood by the driver and their results

use std::fmt;

use anyhow::{bail, Context, Result};

/// One operation against the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Replace the current cache with a new one
    Create { capacity: u32 },
    Put { key: i32, value: i32 },
    Get { key: i32 },
}

impl Command {
    /// Build a command from a call name and its integer arguments
    ///
    /// Names are case-insensitive; `LRUCache`, `create` and `new` all create
    /// a cache.
    pub fn from_call(name: &str, args: &[i64]) -> Result<Self> {
        let lower = name.to_ascii_lowercase();
        let arity = match lower.as_str() {
            "lrucache" | "create" | "new" => 1,
            "put" => 2,
            "get" => 1,
            _ => bail!("unknown command '{}'", name),
        };
        if args.len() != arity {
            bail!(
                "wrong number of arguments for '{}': expected {}, got {}",
                name,
                arity,
                args.len()
            );
        }

        let int = |i: usize| -> Result<i32> {
            i32::try_from(args[i])
                .with_context(|| format!("argument {} of '{}' out of range", args[i], name))
        };

        Ok(match lower.as_str() {
            "put" => Command::Put {
                key: int(0)?,
                value: int(1)?,
            },
            "get" => Command::Get { key: int(0)? },
            _ => Command::Create {
                capacity: u32::try_from(args[0])
                    .with_context(|| format!("capacity {} out of range", args[0]))?,
            },
        })
    }

    /// Name as printed in the input listing
    pub fn name(&self) -> &'static str {
        match self {
            Command::Create { .. } => "LRUCache",
            Command::Put { .. } => "put",
            Command::Get { .. } => "get",
        }
    }

    /// Arguments as printed in the input listing
    pub fn args(&self) -> Vec<i64> {
        match *self {
            Command::Create { capacity } => vec![capacity as i64],
            Command::Put { key, value } => vec![key as i64, value as i64],
            Command::Get { key } => vec![key as i64],
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<String> = self.args().iter().map(|a| a.to_string()).collect();
        write!(f, "{}({})", self.name(), args.join(", "))
    }
}

/// Result of running one command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// create and put produce nothing
    Null,
    /// get found the key
    Value(i32),
    /// get did not find the key
    Missing,
}

impl Output {
    /// Text rendering; a miss prints as `-1`
    pub fn render(&self) -> String {
        match self {
            Output::Null => "null".to_string(),
            Output::Value(v) => v.to_string(),
            Output::Missing => "-1".to_string(),
        }
    }

    pub fn value(&self) -> Option<i32> {
        match self {
            Output::Value(v) => Some(*v),
            _ => None,
        }
    }
}

/// The ten-step trace run when no commands are given
pub fn preset() -> Vec<Command> {
    vec![
        Command::Create { capacity: 2 },
        Command::Put { key: 1, value: 1 },
        Command::Put { key: 2, value: 2 },
        Command::Get { key: 1 },
        Command::Put { key: 3, value: 3 },
        Command::Get { key: 2 },
        Command::Put { key: 4, value: 4 },
        Command::Get { key: 1 },
        Command::Get { key: 3 },
        Command::Get { key: 4 },
    ]
}
