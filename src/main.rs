#[cfg(all(target_os = "linux", target_env = "musl"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::{
    cli::{Cli, Command},
    config::code_file::{CodeFile, TokenSource},
    crawler::Fetcher,
    database::{table::stock::Stock, Sqlite},
    watcher::Watcher,
};

pub mod cli;
pub mod config;
pub mod crawler;
pub mod database;
pub mod declare;
pub mod export;
pub mod logging;
pub mod render;
pub mod util;
pub mod watcher;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let app = config::App::get()?;

    match Cli::parse().command() {
        Command::Watch { token, code_file } => watch(&app, token, code_file).await,
        Command::Export { limit, out } => {
            let db = open_database(&app).await?;
            let path = export::run(&db, &app.export, out.as_deref(), limit).await?;
            logging::info_console(format!("exported to {}", path.display()));
            Ok(())
        }
        Command::Seed { stocks } => {
            let db = open_database(&app).await?;
            let affected = database::seed::run(&db, stocks).await?;
            logging::info_console(format!("seeded {} rows", affected));
            Ok(())
        }
        Command::InitDb => {
            let db = open_database(&app).await?;
            let stocks = Stock::count(db.pool()).await?;
            logging::info_console(format!(
                "database {} is ready with {} stocks",
                app.sqlite.path, stocks
            ));
            Ok(())
        }
    }
}

/// 啟動階段的錯誤都直接結束程式，進入迴圈後就不再中止
async fn watch(app: &config::App, token: Option<String>, code_file: Option<PathBuf>) -> Result<()> {
    let path = code_file.unwrap_or_else(|| app.watch.code_file_path());

    let mut codes = CodeFile::load(&path)?;
    codes.apply_token(&path, &TokenSource::resolve(token))?;
    codes.ensure_token()?;

    let client = util::http::build_client(app.upstream.request_timeout())?;
    let fetcher = Fetcher::new(client, &app.upstream, codes.token.clone());

    Watcher::new(
        fetcher,
        codes.instruments,
        app.watch.poll_interval(),
        app.watch.color,
        std::io::stdout(),
    )
    .run()
    .await;

    Ok(())
}

async fn open_database(app: &config::App) -> Result<Sqlite> {
    let db = Sqlite::connect(&app.sqlite.path).await?;
    db.init_schema().await?;

    Ok(db)
}
