// crates.io
use clap::Parser;
// self
use prf_run::Args;

fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = Args::parse();
	prf_run::run(args)
}
