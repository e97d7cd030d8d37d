use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use employee_client::{config::load_settings, HttpEmployeeClient};
use page_controller::{ActionOutcome, EmployeePage, Field, FormKind, PageCommand, PageLayout};
use tracing_subscriber::EnvFilter;

mod bridge;
mod input;
mod render;

use input::{parse_line, ConsoleInput, HELP};

#[derive(Parser, Debug)]
#[command(name = "staff-console", about = "Manage employees through the employee REST API")]
struct Args {
    /// Base URL of the employee API server.
    #[arg(long)]
    server_url: Option<String>,
    /// TOML settings file (defaults to ./staff_console.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the employee list.
    List,
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        position: String,
        #[arg(long)]
        department: String,
        #[arg(long, default_value = "")]
        contact: String,
    },
    Update {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        position: String,
        #[arg(long)]
        department: String,
        #[arg(long, default_value = "")]
        contact: String,
    },
    Review {
        #[arg(long)]
        id: String,
        #[arg(long)]
        text: String,
    },
    Deactivate {
        #[arg(long)]
        id: String,
    },
    Details {
        id: String,
    },
    Delete {
        id: String,
    },
}

impl Command {
    fn into_page_commands(self) -> Vec<PageCommand> {
        let fill = |form: FormKind, values: Vec<(Field, String)>| {
            let mut commands: Vec<PageCommand> = values
                .into_iter()
                .map(|(field, value)| PageCommand::SetInput { form, field, value })
                .collect();
            commands.push(PageCommand::Submit(form));
            commands
        };

        match self {
            Command::List => vec![PageCommand::Reload],
            Command::Add {
                name,
                position,
                department,
                contact,
            } => fill(
                FormKind::Add,
                vec![
                    (Field::Name, name),
                    (Field::Position, position),
                    (Field::Department, department),
                    (Field::Contact, contact),
                ],
            ),
            Command::Update {
                id,
                name,
                position,
                department,
                contact,
            } => fill(
                FormKind::Update,
                vec![
                    (Field::Id, id),
                    (Field::Name, name),
                    (Field::Position, position),
                    (Field::Department, department),
                    (Field::Contact, contact),
                ],
            ),
            Command::Review { id, text } => fill(
                FormKind::Review,
                vec![(Field::Id, id), (Field::Review, text)],
            ),
            Command::Deactivate { id } => fill(FormKind::Deactivate, vec![(Field::Id, id)]),
            Command::Details { id } => vec![PageCommand::OpenDetails { id }],
            Command::Delete { id } => vec![PageCommand::Delete { id }],
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(server_url) = &args.server_url {
        settings = settings.with_server_url(server_url);
    }
    tracing::info!(server_url = %settings.server_url, "using employee api");

    let client = HttpEmployeeClient::new(&settings).context("failed to build api client")?;
    let page = EmployeePage::new(Arc::new(client), PageLayout::full(), settings);

    match args.command {
        Some(command) => run_once(page, command.into_page_commands()),
        None => run_interactive(page),
    }
}

fn run_once(page: Arc<EmployeePage>, commands: Vec<PageCommand>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build runtime")?;

    runtime.block_on(async move {
        let mut events = page.subscribe_events();
        let outcomes = bridge::run_batch(&page, commands).await;
        render::drain(&mut events);

        if !outcomes.iter().all(ActionOutcome::is_success) {
            anyhow::bail!("command did not complete");
        }
        Ok(())
    })
}

fn run_interactive(page: Arc<EmployeePage>) -> Result<()> {
    let (cmd_tx, cmd_rx) = crossbeam_channel::bounded(bridge::COMMAND_QUEUE_CAPACITY);
    let backend = bridge::start_backend(page, cmd_rx);
    println!("{HELP}");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        match parse_line(&line) {
            Ok(ConsoleInput::Commands(batch)) => {
                if let Some(status) = bridge::queue_commands(&cmd_tx, batch) {
                    eprintln!("{status}");
                }
            }
            Ok(ConsoleInput::Help) => println!("{HELP}"),
            Ok(ConsoleInput::Quit) => break,
            Ok(ConsoleInput::Nothing) => {}
            Err(err) => eprintln!("{err}"),
        }
        io::stdout().flush().context("failed to flush stdout")?;
    }

    drop(cmd_tx);
    if backend.join().is_err() {
        anyhow::bail!("backend worker panicked");
    }
    Ok(())
}
