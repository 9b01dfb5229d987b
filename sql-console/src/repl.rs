//! Interactive prompt loop.
//!
//! Reads one line at a time and runs generate → execute → render for each
//! non-blank line until `exit` or end of input.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use common::errors::AppResult;
use common::utils::IdGenerator;

use crate::executor::QueryRunner;
use crate::formatter;
use crate::generator::SqlGenerator;

pub const BANNER: &str = "DeepSeek SQL Demo\nType 'exit' to quit\n\n";
pub const PROMPT: &str = "Enter your query (natural language): ";
const EXIT_COMMAND: &str = "exit";

/// What a line of input asks for.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Exit,
    Blank,
    Query(String),
}

impl Input {
    /// `None` is end of input.
    fn parse(line: Option<&str>) -> Self {
        match line.map(str::trim) {
            None => Input::Exit,
            Some(text) if text.eq_ignore_ascii_case(EXIT_COMMAND) => Input::Exit,
            Some("") => Input::Blank,
            Some(text) => Input::Query(text.to_string()),
        }
    }
}

pub async fn write_banner<O>(output: &mut O) -> AppResult<()>
where
    O: AsyncWrite + Unpin,
{
    output.write_all(BANNER.as_bytes()).await?;
    output.flush().await?;
    Ok(())
}

/// Runs the loop until `exit` or end of input.
///
/// A generation failure ends the loop with that error; database failures
/// are shown and the loop continues. Closing the session is left to the
/// caller.
pub async fn run<G, R, I, O>(
    generator: &G,
    runner: &mut R,
    input: &mut I,
    output: &mut O,
) -> AppResult<()>
where
    G: SqlGenerator + ?Sized,
    R: QueryRunner + ?Sized,
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let mut line = String::new();
    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        line.clear();
        let read = input.read_line(&mut line).await?;
        let text = match Input::parse((read > 0).then_some(line.as_str())) {
            Input::Exit => break,
            Input::Blank => continue,
            Input::Query(text) => text,
        };

        let request_id = IdGenerator::short_id();
        tracing::info!(request_id = %request_id, input = %text, "prompt received");

        output.write_all(b"Generating SQL query...\n").await?;
        output.flush().await?;
        let sql = generator.generate_sql(&text).await.map_err(|e| {
            tracing::error!(request_id = %request_id, error = %e, "SQL generation failed");
            e
        })?;
        tracing::info!(request_id = %request_id, sql = %sql, "SQL generated");

        let generated = format!("Generated SQL: {}\n\nExecuting query...\n", sql);
        output.write_all(generated.as_bytes()).await?;
        output.flush().await?;

        let outcome = runner.execute(&sql).await;

        let rendered = format!(
            "Results (showing up to 5 entries):\n{}\n\n",
            formatter::render(&outcome)
        );
        output.write_all(rendered.as_bytes()).await?;
        output.flush().await?;
    }

    tracing::info!("interactive loop terminated");
    Ok(())
}
