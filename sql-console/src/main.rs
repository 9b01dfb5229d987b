//! 自然语言 SQL 控制台
//!
//! 提供以下功能：
//! - 将自然语言请求发送给大模型生成 SQL
//! - 在 MySQL 上执行生成的语句
//! - 以对齐文本表格展示结果
//! - 数据库与大模型接口的连通性检查

mod chat_client;
mod diagnostics;
mod executor;
mod formatter;
mod generator;
mod repl;
mod state;
#[cfg(test)]
mod test_support;

use anyhow::Context;
use clap::{Parser, Subcommand};
use common::config::{self, AppConfig, DatabaseConfig, LlmConfig};
use common::errors::AppError;
use executor::MySqlExecutor;
use state::AppState;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "deepseek-sql",
    version,
    about = "Ask questions about your articles in natural language"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Check that the database accepts a connection
    CheckDb,
    /// Check that the chat-completion API answers
    CheckApi,
    /// Show the structure of the articles table
    Describe,
}

#[tokio::main]
async fn main() {
    // 初始化日志追踪（输出到 stderr，默认仅 warn 以上）
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        None => interactive().await,
        Some(Command::CheckDb) => {
            config::load_dotenv();
            let database = DatabaseConfig::from_lookup(config::env_lookup)
                .context("failed to load database configuration")?;
            print!("{}", diagnostics::check_db(&database).await);
            Ok(())
        }
        Some(Command::CheckApi) => {
            config::load_dotenv();
            let key_present =
                config::env_lookup("DEEPSEEK_API_KEY").is_some_and(|key| !key.is_empty());
            let llm = LlmConfig::from_lookup(config::env_lookup);
            print!(
                "{}",
                diagnostics::check_api(key_present, llm, reqwest::Client::new()).await
            );
            Ok(())
        }
        Some(Command::Describe) => {
            config::load_dotenv();
            let database = DatabaseConfig::from_lookup(config::env_lookup)
                .context("failed to load database configuration")?;
            print!("{}", diagnostics::describe_table(&database).await?);
            Ok(())
        }
    }
}

async fn interactive() -> anyhow::Result<()> {
    // 加载配置
    let config = AppConfig::from_env().context("failed to load configuration")?;
    info!(database = ?config.database, llm = ?config.llm, "configuration loaded");

    let state = AppState::new(config);
    let mut stdout = tokio::io::stdout();
    repl::write_banner(&mut stdout).await?;

    let mut executor = MySqlExecutor::connect(&state.config.database)
        .await
        .context("Error connecting to database")?;
    let generator = state.sql_generator();

    let mut stdin = BufReader::new(tokio::io::stdin());
    let session = repl::run(&generator, &mut executor, &mut stdin, &mut stdout).await;

    if let Err(e) = executor.close().await {
        tracing::warn!(error = %e, "closing database session failed");
    }
    session.map_err(|e| match e {
        AppError::Io(_) => anyhow::Error::new(e).context("console I/O failed"),
        other => anyhow::Error::new(other).context("Error generating SQL"),
    })
}
