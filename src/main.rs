use std::fs;
use std::process::ExitCode;

use color_eyre::eyre::{eyre, WrapErr};

use qmdd_rs::decode::decode;
use qmdd_rs::program::parse;

fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let mut args = std::env::args();
    let argv0 = args.next().unwrap_or_else(|| "qmdd".to_string());
    let Some(path) = args.next() else {
        eprintln!("Usage: {} <input>", argv0);
        return Ok(ExitCode::from(2));
    };

    let text = fs::read_to_string(&path).wrap_err_with(|| format!("failed to open {}", path))?;
    let program = parse(&text).map_err(|e| eyre!("{}: {}", path, e))?;

    let (dd, root) = decode(&program);
    log::info!(
        "decoded {} gates over {} variables ({} nodes, {} distinct weights)",
        program.gates.len(),
        program.variables.len(),
        dd.num_nodes(),
        dd.num_weights(),
    );

    let dot = dd.to_dot(root, &program.variables)?;
    print!("{}", dot);

    Ok(ExitCode::SUCCESS)
}
