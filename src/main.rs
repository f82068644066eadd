mod app;
mod cli;
mod msg;
mod watch;

use std::io;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use app::App;
use cli::{Cli, Command};
use duml::model::config::AppConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout only ever carries documents.
    let (non_blocking, _guard) = tracing_appender::non_blocking(io::stderr());
    let filter = if cli.verbose {
        EnvFilter::new("duml=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("duml=warn"))
    };
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(filter)
        .init();

    let mut config = match cli.config.as_deref() {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    if cli.trim {
        config.parser.trim_values = true;
    }
    tracing::debug!(?config, "configuration loaded");

    run(App::new(config), cli.command)
}

fn run(mut app: App, command: Command) -> Result<()> {
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr();

    match command {
        Command::Parse {
            files,
            format,
            no_lost,
        } => {
            if no_lost {
                app.config.output.report_lost = false;
            }
            let format = format.unwrap_or(app.config.output.format);
            app.parse_files(&files, format, &mut stdout, &mut stderr)
        }
        Command::Check { paths } => {
            let statuses = app.check(&paths, &mut stdout)?;
            app::check_outcome(&statuses)
        }
        Command::Render { file } => app.render_file(&file, &mut stdout, &mut stderr),
        Command::Watch { file, format } => {
            drop(stdout);
            let format = format.unwrap_or(app.config.output.format);
            tracing::info!(file = %file.display(), format = format.label(), "watching");
            app.watch(&file, format)
        }
    }
}
