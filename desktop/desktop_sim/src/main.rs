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

use core::fmt;
use std::{
    env,
    fs::File,
    io::{self, BufRead, BufReader, Write},
    process,
    time::Instant,
};

use env_logger::{Builder, Env};
use memsim::{modules::eviction_policy::PolicyKind, MmuConfig};

mod cpu;
mod instruction;

use cpu::{print_snapshot, Cpu, CpuError};
use instruction::{parse_line, Instruction, InstructionError};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Options {
    filename: String,
    policy: PolicyKind,
    debug: bool,
    breaking: bool,
    json: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            filename: "input.txt".to_string(),
            policy: PolicyKind::Fifo,
            debug: false,
            breaking: false,
            json: false,
        }
    }
}

fn parse_args<I: Iterator<Item = String>>(mut args: I) -> Result<Options, String> {
    let mut options = Options::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--filename" => {
                options.filename = args
                    .next()
                    .ok_or_else(|| "--filename needs a value".to_string())?;
            }
            "--policy" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--policy needs a value".to_string())?;
                options.policy = value.parse().map_err(|err| format!("{}", err))?;
            }
            "--debug" => options.debug = true,
            "--breaking" => options.breaking = true,
            "--json" => options.json = true,
            _ => return Err(format!("unknown argument {}", arg)),
        }
    }

    Ok(options)
}

#[derive(Debug)]
enum SimError {
    Instruction(InstructionError),
    Cpu(CpuError),
    Io(io::Error),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::Instruction(err) => write!(f, "error parsing instruction: {}", err),
            SimError::Cpu(err) => write!(f, "{}", err),
            SimError::Io(err) => write!(f, "could not write output: {}", err),
        }
    }
}

impl From<InstructionError> for SimError {
    fn from(err: InstructionError) -> Self {
        SimError::Instruction(err)
    }
}

impl From<io::Error> for SimError {
    fn from(err: io::Error) -> Self {
        SimError::Io(err)
    }
}

impl From<CpuError> for SimError {
    fn from(err: CpuError) -> Self {
        SimError::Cpu(err)
    }
}

enum Flow {
    Continue,
    Stop,
}

struct Simulator {
    cpu: Cpu,
    config: MmuConfig,
    options: Options,
}

impl Simulator {
    fn execute<W: Write>(&mut self, instruction: Instruction, out: &mut W) -> Result<Flow, SimError> {
        match instruction {
            Instruction::CreateProcess { size, pid } => {
                writeln!(out, "Loading PID: {} size: {}", pid, size)?;
                self.cpu.create_process(&pid, size)?;
            }
            Instruction::Access {
                address,
                pid,
                modify,
            } => {
                writeln!(
                    out,
                    "Accessing PID: {} address: {} modify: {}",
                    pid, address, modify
                )?;
                let translation = self.cpu.access_process(&pid, address)?;
                if translation.page_fault {
                    writeln!(out, "page fault, found at real address {}", translation.address)?;
                } else {
                    writeln!(out, "found at real address {}", translation.address)?;
                }
            }
            Instruction::Delete { pid } => {
                writeln!(out, "Clearing PID: {}", pid)?;
                self.cpu.delete_process(&pid)?;
            }
            Instruction::Comment(comment) => {
                writeln!(out, "Comment: {}", comment)?;
            }
            Instruction::Finalize => {
                writeln!(out, "Finalized this sequence of instructions")?;
                self.cpu.report(out)?;
                writeln!(out, "Reseting system")?;
                self.cpu = Cpu::new(&self.config).map_err(CpuError::from)?;
                writeln!(out, "----------------------------------------------------")?;
            }
            Instruction::End => {
                self.cpu.report(out)?;
                writeln!(out, "End. Thanks for using the program!")?;
                return Ok(Flow::Stop);
            }
        }

        Ok(Flow::Continue)
    }

    /// Runs one line of the program, returning the failure message if it failed.
    ///
    /// The elapsed time and the `--debug` snapshot are printed whether or not
    /// the instruction succeeded.
    fn run_line<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<Result<Flow, SimError>> {
        let start = Instant::now();

        let result = match parse_line(line) {
            Ok(Some(instruction)) => self.execute(instruction, out),
            Ok(None) => return Ok(Ok(Flow::Continue)),
            Err(InstructionError::UnknownCommand(_)) => {
                writeln!(out, "Invalid command")?;
                Ok(Flow::Continue)
            }
            Err(err) => Err(err.into()),
        };

        if let Err(err) = &result {
            writeln!(out, "{}", err)?;
        }
        writeln!(out, "{:?}", start.elapsed())?;
        if self.options.debug {
            self.print_memory(out)?;
        }

        Ok(result)
    }

    fn print_memory<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let snapshot = self.cpu.mmu().snapshot();
        if self.options.json {
            match serde_json::to_string(&snapshot) {
                Ok(json) => writeln!(out, "{}", json)?,
                Err(err) => log::warn!("could not serialize snapshot: {}", err),
            }
            Ok(())
        } else {
            print_snapshot(&snapshot, out)
        }
    }
}

/// Asks whether to continue after an error, always `false` without `--breaking`.
fn ask_continue(breaking: bool) -> bool {
    if !breaking {
        return false;
    }

    print!("Do you wish to continue with next instruction? [y/n] ");
    io::stdout().flush().ok();

    let mut response = String::new();
    if io::stdin().read_line(&mut response).is_err() {
        return false;
    }
    response.trim().to_lowercase() != "n"
}

fn main() {
    Builder::from_env(Env::default())
        .filter_level(log::LevelFilter::Warn)
        .format_module_path(false)
        .init();

    let options = match parse_args(env::args().skip(1)) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    };

    let file = match File::open(&options.filename) {
        Ok(file) => file,
        Err(_) => {
            println!(
                "File {} couldn't be opened. Verify it's existance.",
                options.filename
            );
            println!("Stopping execution");
            process::exit(1);
        }
    };

    let config = MmuConfig {
        policy: options.policy,
        ..Default::default()
    };
    let cpu = match Cpu::new(&config) {
        Ok(cpu) => cpu,
        Err(err) => {
            println!("{}", err);
            println!("Stopping execution");
            process::exit(1);
        }
    };

    if options.breaking {
        println!("\n* You are using breaking, after an error you will be asked whether to continue *\n");
    }

    let mut simulator = Simulator {
        cpu,
        config,
        options,
    };
    let stdout = io::stdout();

    for line in BufReader::new(file).lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                println!("could not read instruction: {}", err);
                process::exit(1);
            }
        };

        let result = match simulator.run_line(&line, &mut stdout.lock()) {
            Ok(result) => result,
            Err(err) => {
                eprintln!("could not write output: {}", err);
                process::exit(1);
            }
        };

        match result {
            Ok(Flow::Continue) => {}
            Ok(Flow::Stop) => break,
            Err(_) => {
                if !ask_continue(simulator.options.breaking) {
                    println!("Stopping execution");
                    process::exit(1);
                }
            }
        }
    }

    println!("Done!");
}
