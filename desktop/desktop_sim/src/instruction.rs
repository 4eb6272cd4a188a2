/*
 *  Copyright (C) 2025  Markus Elias Gerber
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use core::{fmt, str::FromStr};

/// One line of the instruction language
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// `P <size> <pid>`
    CreateProcess { size: usize, pid: String },

    /// `A <address> <pid> <modify>`
    Access {
        address: usize,
        pid: String,
        modify: bool,
    },

    /// `L <pid>`
    Delete { pid: String },

    /// `C <text...>`
    Comment(String),

    /// `F`
    Finalize,

    /// `E`
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstructionError {
    MissingArguments { command: char, expected: usize },
    InvalidNumber(String),
    InvalidBool(String),
    UnknownCommand(String),
}

impl fmt::Display for InstructionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstructionError::MissingArguments { command, expected } => {
                write!(f, "command {} should have {} arguments", command, expected)
            }
            InstructionError::InvalidNumber(arg) => {
                write!(f, "argument {} needs to be a number", arg)
            }
            InstructionError::InvalidBool(arg) => {
                write!(f, "argument {} needs to be a boolean", arg)
            }
            InstructionError::UnknownCommand(command) => write!(f, "invalid command {}", command),
        }
    }
}

impl std::error::Error for InstructionError {}

/// Parses one line, `Ok(None)` for blank lines.
pub fn parse_line(line: &str) -> Result<Option<Instruction>, InstructionError> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    line.parse().map(Some)
}

impl FromStr for Instruction {
    type Err = InstructionError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let command = match tokens.first() {
            Some(command) => command.to_uppercase(),
            None => return Err(InstructionError::UnknownCommand(String::new())),
        };

        // tokens including the command itself
        let require = |command: char, expected: usize| {
            if tokens.len() < expected {
                Err(InstructionError::MissingArguments { command, expected })
            } else {
                Ok(())
            }
        };

        match command.as_str() {
            "P" => {
                require('P', 3)?;
                Ok(Instruction::CreateProcess {
                    size: parse_number(tokens[1])?,
                    pid: tokens[2].to_string(),
                })
            }
            "A" => {
                require('A', 4)?;
                Ok(Instruction::Access {
                    address: parse_number(tokens[1])?,
                    pid: tokens[2].to_string(),
                    modify: parse_bool(tokens[3])?,
                })
            }
            "L" => {
                require('L', 2)?;
                Ok(Instruction::Delete {
                    pid: tokens[1].to_string(),
                })
            }
            "C" => Ok(Instruction::Comment(tokens[1..].join(" "))),
            "F" => Ok(Instruction::Finalize),
            "E" => Ok(Instruction::End),
            _ => Err(InstructionError::UnknownCommand(tokens[0].to_string())),
        }
    }
}

fn parse_number(arg: &str) -> Result<usize, InstructionError> {
    arg.parse()
        .map_err(|_| InstructionError::InvalidNumber(arg.to_string()))
}

fn parse_bool(arg: &str) -> Result<bool, InstructionError> {
    match arg {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(InstructionError::InvalidBool(arg.to_string())),
    }
}
