//! Tabula - CLI Client

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

use tabula::executor::ResultRow;
use tabula::{Engine, EngineConfig, ExecutionResult, FileStore};

/// Print welcome banner
fn print_banner(data_dir: &std::path::Path) {
    println!(
        r#"
 _        _           _
| |_ __ _| |__  _   _| | __ _
| __/ _` | '_ \| | | | |/ _` |
| || (_| | |_) | |_| | | (_| |
 \__\__,_|_.__/ \__,_|_|\__,_|

 An in-memory SQL-like query engine
 Data directory: {}
 Type '.help' for help, '.quit' to exit
"#,
        data_dir.display()
    );
}

/// Print help message
fn print_help() {
    println!(
        r#"
Commands:
  .help              Show this help message
  .quit              Exit Tabula
  .tables            List tables in the current database
  .databases         List databases
  .schema <table>    Show table schema
  .use <database>    Switch database
  .history           Show recent statements
  .clear             Clear screen

SQL Commands:
  CREATE DATABASE / DROP DATABASE / USE / SHOW DATABASES
  CREATE TABLE / DROP TABLE / ALTER TABLE / TRUNCATE TABLE
  INSERT INTO / UPDATE / DELETE FROM / SELECT
  SHOW TABLES / DESCRIBE / EXPLAIN / CREATE INDEX / DROP INDEX
  BEGIN / COMMIT / ROLLBACK (accepted, changes apply immediately)

Statements end with ';'. An empty line runs an unterminated buffer.

Examples:
  CREATE TABLE users (id INT PRIMARY KEY AUTO_INCREMENT, name VARCHAR(100));
  INSERT INTO users (name) VALUES ('Alice'), ('Bob');
  SELECT * FROM users WHERE name LIKE 'a%' ORDER BY id DESC LIMIT 1;
"#
    );
}

/// Command-line options
struct Options {
    data_dir: PathBuf,
    database: Option<String>,
}

impl Options {
    fn parse() -> anyhow::Result<Self> {
        let mut options = Options {
            data_dir: PathBuf::from("./tabula-data"),
            database: None,
        };

        let mut args = env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--data-dir" | "-d" => {
                    let dir = args.next().context("--data-dir requires a directory")?;
                    options.data_dir = PathBuf::from(dir);
                }
                "--database" | "-D" => {
                    options.database = Some(args.next().context("--database requires a name")?);
                }
                "--help" | "-h" => {
                    println!("Usage: tabula-cli [--data-dir <dir>] [--database <name>]");
                    std::process::exit(0);
                }
                other => bail!("unknown argument '{}'", other),
            }
        }
        Ok(options)
    }
}

/// Format query results as a table
fn format_results(columns: &[String], rows: &[ResultRow]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|c| row.get(c).map(|v| v.to_string()).unwrap_or_default())
                .collect()
        })
        .collect();

    // Calculate column widths
    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in &cells {
        for (i, value) in row.iter().enumerate() {
            widths[i] = widths[i].max(value.chars().count());
        }
    }

    let separator: String = widths
        .iter()
        .map(|w| "-".repeat(*w + 2))
        .collect::<Vec<_>>()
        .join("+");
    let separator = format!("+{}+\n", separator);

    let mut output = String::new();
    output.push_str(&separator);
    let header: String = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!(" {:^width$} ", c, width = *w))
        .collect::<Vec<_>>()
        .join("|");
    output.push_str(&format!("|{}|\n", header));
    output.push_str(&separator);

    for row in &cells {
        let line: String = row
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!(" {:<width$} ", v, width = *w))
            .collect::<Vec<_>>()
            .join("|");
        output.push_str(&format!("|{}|\n", line));
    }
    if !cells.is_empty() {
        output.push_str(&separator);
    }

    output
}

/// Print one statement's outcome
fn print_result(result: &ExecutionResult) {
    if !result.success {
        eprintln!("{}", result.output);
        return;
    }
    if let Some(columns) = &result.columns {
        print!("{}", format_results(columns, result.rows()));
    }
    println!("{} ({:.2} ms)", result.output, result.execution_time);
}

/// An interactive shell over an engine
struct Shell {
    engine: Engine,
    /// Database statements run against; empty means the engine's default
    database: String,
}

impl Shell {
    fn prompt(&self) -> String {
        format!("tabula:{}> ", self.target_database())
    }

    /// Run a buffer of one or more statements
    fn execute_sql(&mut self, sql: &str) {
        for result in self.engine.execute_batch(&self.database, sql) {
            print_result(&result);
            if result.success && result.query_type == "USE" {
                if let Some(db) = &result.database {
                    self.database = db.clone();
                }
            }
        }
    }

    /// Handle special dot commands. Returns false when the shell should exit.
    fn handle_special_command(&mut self, cmd: &str) -> bool {
        let parts: Vec<&str> = cmd.split_whitespace().collect();

        match (parts[0], &parts[1..]) {
            (".help", _) => print_help(),
            (".quit", _) | (".exit", _) => return false,
            (".tables", []) => self.execute_sql("SHOW TABLES"),
            (".databases", []) => self.execute_sql("SHOW DATABASES"),
            (".schema", [table]) => self.execute_sql(&format!("DESCRIBE {}", table)),
            (".schema", []) => {
                let tables: Vec<String> = self
                    .engine
                    .catalog()
                    .get_database(&self.target_database())
                    .map(|db| db.tables().iter().map(|t| t.name.clone()).collect())
                    .unwrap_or_default();
                if tables.is_empty() {
                    println!("No tables found.");
                }
                for table in tables {
                    println!("{}:", table);
                    self.execute_sql(&format!("DESCRIBE {}", table));
                }
            }
            (".use", [db]) => self.execute_sql(&format!("USE {}", db)),
            (".history", []) => {
                if self.engine.history().is_empty() {
                    println!("No history.");
                }
                for entry in self.engine.history().entries().take(20) {
                    let status = if entry.success { "ok" } else { "err" };
                    println!(
                        "{:>4}  {}  {:<3}  {:<24}  {}",
                        entry.id,
                        entry.timestamp.format("%H:%M:%S"),
                        status,
                        entry.result_label,
                        entry.query
                    );
                }
            }
            (".clear", []) => {
                // Clear screen (ANSI escape code)
                print!("\x1B[2J\x1B[1;1H");
                io::stdout().flush().ok();
            }
            (cmd, _) => {
                eprintln!("Unknown command or arguments: {}", cmd);
                eprintln!("Type '.help' for available commands.");
            }
        }
        true
    }

    /// Database the next statement will run against
    fn target_database(&self) -> String {
        if self.database.is_empty() {
            self.engine
                .current_database()
                .unwrap_or(&self.engine.config().default_database)
                .to_string()
        } else {
            self.database.clone()
        }
    }
}

/// Main REPL loop
fn run_repl(options: Options) -> anyhow::Result<()> {
    let store = FileStore::open(&options.data_dir)
        .with_context(|| format!("cannot open data directory {}", options.data_dir.display()))?;
    let engine = Engine::new(EngineConfig::default(), Box::new(store));
    let mut shell = Shell {
        engine,
        database: options.database.unwrap_or_default(),
    };

    let mut editor = DefaultEditor::new()?;
    let history_path = options.data_dir.join(".tabula_history");
    editor.load_history(&history_path).ok();

    print_banner(&options.data_dir);

    let mut input_buffer = String::new();
    loop {
        let prompt = if input_buffer.is_empty() {
            shell.prompt()
        } else {
            "     ...> ".to_string()
        };

        let line = match editor.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                input_buffer.clear();
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let trimmed = line.trim();

        // Handle special commands
        if input_buffer.is_empty() && trimmed.starts_with('.') {
            editor.add_history_entry(trimmed)?;
            if !shell.handle_special_command(trimmed) {
                break;
            }
            continue;
        }

        // An empty line runs whatever is buffered
        if trimmed.is_empty() {
            if !input_buffer.is_empty() {
                let sql = std::mem::take(&mut input_buffer);
                editor.add_history_entry(sql.trim())?;
                shell.execute_sql(&sql);
            }
            continue;
        }

        input_buffer.push_str(&line);
        input_buffer.push('\n');

        if trimmed.ends_with(';') {
            let sql = std::mem::take(&mut input_buffer);
            editor.add_history_entry(sql.trim())?;
            shell.execute_sql(&sql);
        }
    }

    editor.save_history(&history_path).ok();
    println!("Goodbye!");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let options = Options::parse()?;
    run_repl(options)
}
