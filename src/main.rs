use clap::{Parser, Subcommand};
use lead::{build, commands, config, logger, output, serve, watch};
use std::path::Path;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "lead")]
#[command(about = "Static site generator for a personal notebook")]
#[command(long_about = "\
Static site generator for a personal notebook

Run from the project root. Every directory can be renamed in config.toml.

Project structure:

  .
  ├── config.toml          # Optional overrides (directories, remote, [site])
  ├── _log/                # Posts: *.md with a JSON or +++ TOML header
  ├── _layouts/            # Tera layouts: post.html, demo.html, ...
  ├── _demos/              # *.json / *.html demos and demo folders
  ├── _images/log/         # Images referenced by bare file name in posts
  ├── _styles/  _scripts/  # Copied as-is
  ├── index.html           # Pages: *.html with a header, outside _ and . dirs
  └── _site/               # Output (leading underscores are dropped)

Run 'lead help <command>' for one command's usage.")]
#[command(version = version_string())]
#[command(disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Build the whole site into the output directory
    Build,
    /// Serve the output directory on http://127.0.0.1:8000
    Test,
    /// Recopy images, styles and scripts only
    Static,
    /// Create a dated post stub
    New,
    /// Sync the output directory to the configured remote
    Push,
    /// Build, serve, and rebuild on every change
    Dev,
    /// Show usage for a command
    Help { command: Option<String> },
    #[command(external_subcommand)]
    Unknown(Vec<String>),
}

fn main() {
    logger::init(None);
    if let Err(e) = run(Cli::parse()) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let root = Path::new(".");
    let Some(command) = cli.command else {
        println!("{}", commands::unknown_command_message());
        return Ok(());
    };

    match command {
        Command::Build => {
            let config = config::load_config(root)?;
            let report = build::build_site(&config, root)?;
            output::print_build_report(&report);
        }
        Command::Test => {
            let config = config::load_config(root)?;
            serve::serve_until_interrupted(&config.output_root(root), serve::PREVIEW_ADDR)?;
        }
        Command::Static => {
            let config = config::load_config(root)?;
            let copies = build::update_static(&config, root)?;
            output::print_static_report(&copies);
        }
        Command::New => {
            let config = config::load_config(root)?;
            let today = chrono::Local::now().date_naive();
            let result = commands::new_post(&config, root, today)?;
            println!("{}", result.message());
        }
        Command::Push => {
            let config = config::load_config(root)?;
            commands::push_remote(&config, root)?;
        }
        Command::Dev => watch::run_dev(root, serve::PREVIEW_ADDR)?,
        Command::Help { command } => {
            println!("{}", commands::command_help(command.as_deref()));
        }
        Command::Unknown(_) => println!("{}", commands::unknown_command_message()),
    }

    Ok(())
}
