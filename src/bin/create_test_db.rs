use std::{env, error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;
use time::macros::date;

use marmot::{AppState, NewEntity, UserId, create, issue_token};

/// A utility for creating a test database for the JSON API server of marmot.
///
/// If `JWT_SECRET` is set, a bearer token for the test user is printed too.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The ID of the user that owns the test records.
    #[arg(long, short, default_value = "test-user")]
    user_id: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;
    let secret = env::var("JWT_SECRET").ok();
    // The secret only matters for the token printed below.
    let state = AppState::from_connection(conn, secret.as_deref().unwrap_or_default(), None)?;
    let store = state.store.as_ref();
    let user_id = UserId::new(args.user_id);

    println!("Creating test records for {user_id}...");

    let group_id = create(
        store,
        &NewEntity::Group {
            name: "Household".to_owned(),
        },
        &user_id,
    )?;
    let payee_id = create(
        store,
        &NewEntity::Payee {
            name: "Supermarket".to_owned(),
        },
        &user_id,
    )?;
    let account_id = create(
        store,
        &NewEntity::Account {
            name: "Everyday".to_owned(),
            balance: 1000.0,
        },
        &user_id,
    )?;
    let category_id = create(
        store,
        &NewEntity::Category {
            name: "Groceries".to_owned(),
            group_id,
        },
        &user_id,
    )?;
    create(
        store,
        &NewEntity::Transaction {
            amount: -54.3,
            date: date!(2025 - 01 - 15),
            payee_id,
            category_id,
            account_id,
        },
        &user_id,
    )?;

    if let Some(secret) = secret {
        let token = issue_token(&secret, &user_id, None, time::Duration::days(30))?;
        println!("Bearer token (valid for 30 days):\n{token}");
    }

    println!("Success!");

    Ok(())
}
