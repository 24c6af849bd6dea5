#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "nestpack", about = "Pack nested values into self-describing containers")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Pack a JSON document into a container file.
	Pack(cmd::pack::Args),
	/// Print a container's value as JSON.
	Unpack(cmd::unpack::Args),
	/// Print header and node statistics.
	Info(cmd::info::Args),
	/// List every node with its attributes.
	Tree(cmd::tree::Args),
}

fn main() {
	init_tracing();
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> cmd::Result<()> {
	let cli = Cli::parse();

	match cli.command {
		Commands::Pack(args) => cmd::pack::run(args),
		Commands::Unpack(args) => cmd::unpack::run(args),
		Commands::Info(args) => cmd::info::run(args),
		Commands::Tree(args) => cmd::tree::run(args),
	}
}

fn init_tracing() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(false)
		.with_writer(std::io::stderr)
		.init();
}
