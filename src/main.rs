//! CLI 入口: 预载 JSON 存档并打印网摘要。
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{Arg, Command};
use log::debug;

use timed_petri::PetriNet;

fn make_options_parser() -> Command {
    Command::new("timed-petri")
        .about("Timed Petri net editor engine")
        .disable_help_flag(true)
        .arg(
            Arg::new("help")
                .short('h')
                .long("help")
                .action(clap::ArgAction::Help)
                .help("Print usage"),
        )
        .arg(
            Arg::new("file")
                .value_name("FILE.json")
                .value_parser(clap::value_parser!(PathBuf))
                .required(false)
                .help("Petri net file to preload"),
        )
}

fn main() -> ExitCode {
    if std::env::var("TPN_LOG").is_ok() {
        let env = env_logger::Env::new()
            .filter("TPN_LOG")
            .write_style("TPN_LOG_STYLE");
        env_logger::init_from_env(env);
    }

    let matches = match make_options_parser().try_get_matches() {
        Ok(matches) => matches,
        Err(err) if err.kind() == ErrorKind::DisplayHelp => {
            // usage requested: print it but exit non-zero like a bare tool
            let _ = err.print();
            return ExitCode::FAILURE;
        }
        Err(err) => {
            let _ = err.print();
            return ExitCode::FAILURE;
        }
    };

    match run(matches.get_one::<PathBuf>("file")) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(file: Option<&PathBuf>) -> anyhow::Result<()> {
    let mut net = PetriNet::default();
    if let Some(path) = file {
        net.load(path)
            .with_context(|| format!("failed loading '{}'", path.display()))?;
        debug!("loaded '{}'", path.display());
    }

    println!(
        "{}: {} place(s), {} transition(s), {} arc(s)",
        net.kind(),
        net.places().len(),
        net.transitions().len(),
        net.arcs().len()
    );

    if !net.is_empty() && net.is_event_graph() {
        print!("{}", net.counter_form("# "));
        print!("{}", net.dater_form("# "));
        match net.find_critical_cycle() {
            Ok(cycle) => {
                println!("# Cycle time [unit of time]:");
                for time in &cycle.cycle_time {
                    println!("#   {time}");
                }
            }
            Err(err) => println!("# No critical cycle: {err}"),
        }
    }
    Ok(())
}
