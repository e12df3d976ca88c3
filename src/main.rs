use lib::executor_layer::executor::{ExecuteResult, Executor};
use lib::parser_layer::{ast::MetaCommand, prepare::*};
use lib::table_layer::{
    btree::Table,
    config::{TABLE_MAX_PAGES, TableConfig},
    node::{INTERNAL_NODE_MAX_CELLS, LEAF_NODE_MAX_CELLS},
};

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

/// Single-table database shell
#[derive(Parser, Debug)]
#[command(name = "leafdb", version, about = "Single-table B-tree database shell")]
struct Args {
    /// Database file, created if missing
    filename: PathBuf,

    /// Upper bound on the number of pages in the file
    #[arg(long, default_value_t = TABLE_MAX_PAGES, env = "LEAFDB_MAX_PAGES")]
    max_pages: u32,

    /// Cells per leaf node before it splits
    #[arg(long, default_value_t = LEAF_NODE_MAX_CELLS, env = "LEAFDB_LEAF_MAX_CELLS")]
    leaf_max_cells: usize,

    /// Keyed cells per internal node before it splits
    #[arg(long, default_value_t = INTERNAL_NODE_MAX_CELLS, env = "LEAFDB_INTERNAL_MAX_CELLS")]
    internal_max_cells: usize,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn table_config(&self) -> TableConfig {
        TableConfig {
            max_pages: self.max_pages,
            leaf_max_cells: self.leaf_max_cells,
            internal_max_cells: self.internal_max_cells,
        }
    }
}

/// What the loop should do after a line
enum Flow {
    Continue,
    Exit,
}

pub struct Repl {
    executor: Executor,
    preparer: StatementPreparer,
}

impl Repl {
    pub fn new(executor: Executor) -> Self {
        Self {
            executor,
            preparer: StatementPreparer::new(),
        }
    }

    fn run_meta_command<W: Write>(&self, input: &str, out: &mut W) -> io::Result<Flow> {
        match parse_meta_command(input) {
            Ok(MetaCommand::Exit) => return Ok(Flow::Exit),
            Ok(MetaCommand::BTree) => {
                writeln!(out, "Tree:")?;
                match self.executor.table().render_tree() {
                    Ok(tree) => writeln!(out, "{tree}")?,
                    Err(e) => writeln!(out, "Error: {e}")?,
                }
            }
            Ok(MetaCommand::Constants) => {
                writeln!(out, "Constants:")?;
                for (name, value) in self.executor.table().constants() {
                    writeln!(out, "{name}: {value}")?;
                }
            }
            Err(e) => writeln!(out, "{e}")?,
        }

        Ok(Flow::Continue)
    }

    fn run_statement<W: Write>(&mut self, input: &str, out: &mut W) -> io::Result<()> {
        let statement = match self.preparer.prepare(input) {
            Ok(statement) => statement,
            Err(e) => return writeln!(out, "{e}"),
        };

        match self.executor.execute(&statement, out) {
            Ok(ExecuteResult::Success) => writeln!(out, "Executed."),
            Ok(ExecuteResult::DuplicateKey) => writeln!(out, "Error: Duplicate key."),
            Ok(ExecuteResult::TableFull) => writeln!(out, "Error: Table full."),
            Err(e) => {
                error!(error = %e, "statement failed");
                writeln!(out, "Error: {e}")
            }
        }
    }

    /// Read lines until `.exit` or end of input
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, out: &mut W) -> io::Result<()> {
        let mut buffer = Vec::new();

        loop {
            write!(out, "db > ")?;
            out.flush()?;

            buffer.clear();
            if input.read_until(b'\n', &mut buffer)? == 0 {
                debug!("end of input");
                return Ok(());
            }

            // Invalid UTF-8 only spoils its own line
            let line = String::from_utf8_lossy(&buffer);
            let line = line.trim();

            if is_meta_command(line) {
                if let Flow::Exit = self.run_meta_command(line, out)? {
                    return Ok(());
                }
            } else {
                self.run_statement(line, out)?;
            }
        }
    }

    pub fn close(self) -> Result<(), lib::executor_layer::error::ExecutorError> {
        self.executor.close()
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let table = match Table::open(&args.filename, args.table_config()) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("Unable to open {}: {e}", args.filename.display());
            return ExitCode::FAILURE;
        }
    };

    let mut repl = Repl::new(Executor::new(table));
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Err(e) = repl.run(io::stdin().lock(), &mut out) {
        eprintln!("Error: {e}");
    }

    if let Err(e) = repl.close() {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
