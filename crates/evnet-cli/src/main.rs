use clap::Parser;
use evnet_cli::cli::{Cli, Commands};
use tracing::error;
use tracing_subscriber::FmtSubscriber;

mod commands;

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let result = match &cli.command {
        Some(Commands::Solve {
            instance,
            out,
            iterations,
            seed,
            solver,
            mip_gap,
            time_limit,
            verbose,
        }) => commands::solve::handle(&commands::solve::SolveArgs {
            instance,
            out: out.as_deref(),
            iterations: *iterations,
            seed: *seed,
            solver: solver.as_deref(),
            mip_gap: *mip_gap,
            time_limit: *time_limit,
            verbose: *verbose,
        }),
        Some(Commands::Generate { config, out, seed }) => {
            commands::generate::handle(config, out, *seed)
        }
        Some(Commands::Validate { instance }) => commands::validate::handle(instance),
        Some(Commands::Completions { shell, out }) => {
            commands::completions::handle(*shell, out.as_deref())
        }
        None => {
            println!("No command specified. Run `evnet --help` for usage.");
            Ok(())
        }
    };

    if let Err(e) = result {
        error!("{e:#}");
        std::process::exit(1);
    }
}
