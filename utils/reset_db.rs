use clap::Parser;
use sea_orm::{ConnectionTrait, Database, Statement};
use std::env;

/// Drop the products table and migration history so the next start
/// recreates the schema from scratch.
#[derive(Parser)]
#[command(name = "reset_db")]
struct Args {
    /// Required confirmation; nothing is dropped without it
    #[arg(long)]
    yes: bool,

    /// Also delete every file in UPLOAD_DIR (default: uploads)
    #[arg(long)]
    with_uploads: bool,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    if !args.yes {
        eprintln!("Refusing to reset without --yes");
        std::process::exit(2);
    }

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let db = Database::connect(database_url)
        .await
        .expect("Failed to connect to database");
    let backend = db.get_database_backend();

    for table in ["products", "seaql_migrations"] {
        db.execute(Statement::from_string(
            backend,
            format!("DROP TABLE IF EXISTS {table};"),
        ))
        .await
        .expect("Failed to drop table");
        println!("Dropped {table}");
    }

    if args.with_uploads {
        let dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());
        let mut removed = 0usize;
        if let Ok(entries) = std::fs::read_dir(&dir) {
            for entry in entries.flatten() {
                if entry.path().is_file() && std::fs::remove_file(entry.path()).is_ok() {
                    removed += 1;
                }
            }
        }
        println!("Removed {removed} files from {dir}");
    }

    println!("Database reset successfully");
}
