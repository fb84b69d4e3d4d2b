use clap::{Parser, Subcommand};

mod cmd;

#[derive(Parser, Debug)]
#[command(
    name = "ptc",
    version,
    about = "Premium Tax Credit reconciliation (Form 8962, tax year 2022)"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute Form 8962 lines from filer input
    Calc(cmd::calc::CalcCommand),
    /// Print the poverty guideline and applicable figure tables
    Tables(cmd::tables::TablesCommand),
    /// Print the expected input formats
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Calc(calc) => calc.exec(),
        Command::Tables(tables) => tables.exec(),
        Command::Schema(schema) => schema.exec(),
    }
}
