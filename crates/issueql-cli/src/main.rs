mod cli;
mod commands;

use cli::{AstParams, CheckParams, CompileParams, build_cli};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("check", m)) => {
            commands::check::run(CheckParams::from_matches(m).into());
        }
        Some(("ast", m)) => {
            commands::ast::run(AstParams::from_matches(m).into());
        }
        Some(("compile", m)) => {
            commands::compile::run(CompileParams::from_matches(m).into());
        }
        _ => unreachable!("clap should have caught this"),
    }
}
