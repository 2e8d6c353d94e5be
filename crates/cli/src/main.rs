use clap::Parser;

mod cli;
mod commands;
mod render;

fn main() -> anyhow::Result<()> {
    stockroom_observability::init_for_cli("warn");
    let cli = cli::Cli::parse();
    commands::run_command(cli)
}
