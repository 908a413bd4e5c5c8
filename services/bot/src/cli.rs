use crate::demo::{run_demo, DemoArgs};
use crate::server;
use applicant_intake::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Applicant Intake Bot",
    about = "Collect job applications over chat and forward them to a reviewer",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll the chat platform and serve health endpoints (default command)
    Serve(ServeArgs),
    /// Walk a scripted applicant through the intake flow without network access
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the ops HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the ops HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}
