use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "drawai")]
#[command(about = "Turn natural-language drawing requests into artifacts", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Engine configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Draw a request
    Draw {
        /// What to draw
        #[arg(required = true, num_args = 1..)]
        request: Vec<String>,

        /// Never prompt; print the run id when clarification is needed
        #[arg(long)]
        no_input: bool,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resume a run that is waiting for clarification
    Resume {
        run_id: String,

        /// The clarification to add to the request
        #[arg(required = true, num_args = 1..)]
        clarification: Vec<String>,

        #[arg(long)]
        json: bool,
    },

    /// List runs waiting for clarification
    Pending,

    /// Print the effective configuration as TOML
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_joins_words() {
        let cli = Cli::try_parse_from(["drawai", "draw", "a", "red", "circle", "--json"]).unwrap();
        match cli.command {
            Commands::Draw { request, json, no_input } => {
                assert_eq!(request.join(" "), "a red circle");
                assert!(json);
                assert!(!no_input);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["drawai", "config", "--config", "drawai.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("drawai.toml")));
        assert!(matches!(cli.command, Commands::Config));
    }

    #[test]
    fn test_resume_requires_text() {
        assert!(Cli::try_parse_from(["drawai", "resume", "run-1"]).is_err());
        let cli = Cli::try_parse_from(["drawai", "resume", "run-1", "a", "blue", "square"]).unwrap();
        assert!(matches!(cli.command, Commands::Resume { ref run_id, .. } if run_id == "run-1"));
    }
}
