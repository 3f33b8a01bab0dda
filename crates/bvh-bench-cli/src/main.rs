mod cli;
mod commands;
mod logging;

use cli::cli;

fn main() -> anyhow::Result<()> {
    let code = cli()?;
    std::process::exit(code)
}
