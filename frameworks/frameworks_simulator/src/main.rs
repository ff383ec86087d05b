//! Basic OS Simulator Binary Entry Point
//!
//! Parses the settings, loads the program files and runs the operator
//! command loop on stdin until `stop` or end of input.
//!
//! Diagnostics go through `log`; set `RUST_LOG=info` (or `debug`) to see
//! scheduling and placement decisions.

use std::io::{self, BufRead, Write};
use std::process;

use clap::Parser;
use frameworks_simulator::{write_menu, BasicOs, Command, Flow, SimulatorArgs, SimulatorConfig};

fn main() {
    env_logger::init();

    let args = SimulatorArgs::parse();

    let config = match SimulatorConfig::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    let mut os = match BasicOs::boot(config) {
        Ok(os) => os,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    println!("{} processes have been loaded", os.jobs().len());

    if let Err(e) = run(&mut os) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(os: &mut BasicOs) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    writeln!(stdout)?;
    write_menu(&mut stdout)?;

    let mut lines = stdin.lock().lines();
    loop {
        write!(stdout, "\nEnter a simulator command: ")?;
        stdout.flush()?;

        let Some(line) = lines.next() else {
            // End of input behaves like `stop`
            writeln!(stdout)?;
            return os.write_summary(&mut stdout);
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        // Errors are reported and the loop carries on
        match os.execute(command, &mut stdout) {
            Ok(Flow::Stop) => return Ok(()),
            Ok(Flow::Continue) => {}
            Err(e) => println!("{}", e),
        }
    }
}
