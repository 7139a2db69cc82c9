//! Command-line front end for the contact directory.
//!
//! # Responsibility
//! - Act as a minimal presentation layer over `ContactList`.
//! - Keep output line-oriented so it can be piped into other tools.

use clap::{Parser, Subcommand};
use contactbook_core::db::open_db;
use contactbook_core::{
    default_log_level, init_logging, Contact, ContactId, ContactList, ContactListChange,
    SqliteContactRepository,
};
use log::error;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "contactbook")]
#[command(about = "Local contact directory")]
#[command(version)]
struct Cli {
    /// SQLite database file (created when missing)
    db_path: PathBuf,

    /// Absolute directory for rolling log files
    #[arg(long, env = "CONTACTBOOK_LOG_DIR")]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Commands {
    /// Print every contact
    List,
    /// Add a contact, replacing the one with the same id
    Add {
        #[arg(allow_negative_numbers = true)]
        id: ContactId,
        name: String,
        tel: String,
    },
    /// Remove the contact at a list position
    Remove { index: usize },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        if let Err(err) = init_logging(default_log_level(), log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    match run(&cli.db_path, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(db_path: &Path, command: Commands) -> Result<(), Box<dyn Error>> {
    let conn = open_db(db_path)?;
    let repo = SqliteContactRepository::try_new(&conn)?;
    let mut contacts = ContactList::load(repo)?;
    contacts.subscribe(|change| println!("{}", describe_change(change)));

    match command {
        Commands::List => {}
        Commands::Add { id, name, tel } => {
            contacts.add(Contact::new(id, name, tel))?;
        }
        Commands::Remove { index } => {
            contacts.remove_at(index)?;
        }
    }

    for (index, contact) in contacts.get_all().iter().enumerate() {
        println!("{index}\t{}\t{}\t{}", contact.id, contact.name, contact.tel);
    }
    Ok(())
}

fn describe_change(change: &ContactListChange) -> String {
    match change {
        ContactListChange::Inserted { index, id } => format!("# inserted id={id} at {index}"),
        ContactListChange::Replaced { index, id } => format!("# replaced id={id} at {index}"),
        ContactListChange::Removed { index, id } => format!("# removed id={id} from {index}"),
    }
}
