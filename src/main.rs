use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use whiteout_core::{BatchReport, Outcome, Tolerance};

mod config;
mod driver;

use config::Config;

#[derive(Parser)]
#[command(
    name = "whiteout",
    version,
    about = "Make near-white image backgrounds transparent"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Process the configured asset directories and files (the default)
    Run(RunArgs),
    /// Convert a single image to a transparent PNG
    Convert {
        /// Image to read (PNG or JPEG)
        source: PathBuf,
        /// Where to write the PNG (defaults to overwriting the source)
        destination: Option<PathBuf>,
        /// Channels above 255 - tolerance count as white
        #[arg(short, long, default_value_t = Tolerance::DEFAULT, allow_negative_numbers = true)]
        tolerance: Tolerance,
    },
}

#[derive(Args, Default)]
struct RunArgs {
    /// Config file (defaults to ./whiteout.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Asset root directory
    #[arg(long)]
    root: Option<PathBuf>,
    /// Write outputs under this directory instead of in place
    #[arg(long)]
    output_root: Option<PathBuf>,
    /// Channels above 255 - tolerance count as white
    #[arg(short, long, allow_negative_numbers = true)]
    tolerance: Option<Tolerance>,
}

impl RunArgs {
    /// Flags given on the command line win over the config file.
    fn apply(self, config: &mut Config) {
        if let Some(root) = self.root {
            config.root = root;
        }
        if let Some(output_root) = self.output_root {
            config.output_root = Some(output_root);
        }
        if let Some(tolerance) = self.tolerance {
            config.tolerance = tolerance.value();
        }
    }
}

fn main() {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(args) => cmd_run(args),
        Commands::Convert {
            source,
            destination,
            tolerance,
        } => cmd_convert(source, destination, tolerance),
    }
}

fn cmd_run(args: RunArgs) {
    let mut config = Config::resolve(args.config.as_deref()).unwrap_or_else(|e| {
        log::error!("Failed to load config: {}", e);
        eprintln!("Error loading config: {}", e);
        std::process::exit(1);
    });

    args.apply(&mut config);

    driver::run(&config);
}

fn cmd_convert(source: PathBuf, destination: Option<PathBuf>, tolerance: Tolerance) {
    let destination = destination.unwrap_or_else(|| source.clone());
    let mut report = BatchReport::new();
    report.record(&Outcome::convert(&source, &destination, tolerance));
    report.log_summary();
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILE: &str = r#"
        root = "site/img"
        output_root = "dist/img"
        tolerance = 12
    "#;

    fn run_args(argv: &[&str]) -> RunArgs {
        match Cli::try_parse_from(argv).unwrap().command {
            Some(Commands::Run(args)) => args,
            _ => panic!("expected run subcommand"),
        }
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut config = Config::parse(FILE).unwrap();
        run_args(&[
            "whiteout",
            "run",
            "--root",
            "other/root",
            "--output-root",
            "other/out",
            "--tolerance",
            "-7",
        ])
        .apply(&mut config);

        assert_eq!(config.root, PathBuf::from("other/root"));
        assert_eq!(config.output_root, Some(PathBuf::from("other/out")));
        assert_eq!(config.tolerance(), Tolerance::new(-7));
    }

    #[test]
    fn test_absent_flags_keep_config_values() {
        let mut config = Config::parse(FILE).unwrap();
        run_args(&["whiteout", "run"]).apply(&mut config);

        assert_eq!(config.root, PathBuf::from("site/img"));
        assert_eq!(config.output_root, Some(PathBuf::from("dist/img")));
        assert_eq!(config.tolerance(), Tolerance::new(12));
    }

    #[test]
    fn test_single_flag_only_touches_its_field() {
        let mut config = Config::parse(FILE).unwrap();
        run_args(&["whiteout", "run", "-t", "40"]).apply(&mut config);

        assert_eq!(config.tolerance(), Tolerance::new(40));
        assert_eq!(config.root, PathBuf::from("site/img"));
        assert_eq!(config.output_root, Some(PathBuf::from("dist/img")));
    }

    #[test]
    fn test_convert_defaults() {
        let cli = Cli::try_parse_from(["whiteout", "convert", "logo.jpg"]).unwrap();
        match cli.command {
            Some(Commands::Convert {
                source,
                destination,
                tolerance,
            }) => {
                assert_eq!(source, PathBuf::from("logo.jpg"));
                assert_eq!(destination, None);
                assert_eq!(tolerance, Tolerance::DEFAULT);
            }
            _ => panic!("expected convert subcommand"),
        }
    }
}
