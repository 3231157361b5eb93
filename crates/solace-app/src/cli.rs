//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use solace_core::classifier::{EmergencyClassifier, MatchMode};
use solace_server::{ServerConfig, DEFAULT_HOST, DEFAULT_PORT};

/// Solace - therapy platform backend with emergency message detection
#[derive(Parser, Debug)]
#[command(name = "solace", version, about)]
pub struct Args {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(flatten)]
    pub taxonomy: TaxonomyArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command that classifies text.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct TaxonomyArgs {
    /// Load the keyword taxonomy from a JSON file
    #[arg(long = "taxonomy", global = true, value_name = "PATH")]
    pub taxonomy_file: Option<PathBuf>,

    /// Require phrases to start and end on word boundaries
    #[arg(long, global = true)]
    pub word_boundary: bool,
}

impl TaxonomyArgs {
    /// Returns the selected match mode.
    pub fn match_mode(&self) -> MatchMode {
        if self.word_boundary {
            MatchMode::WordBoundary
        } else {
            MatchMode::Substring
        }
    }

    /// Builds the classifier these options describe.
    pub fn build_classifier(&self) -> anyhow::Result<EmergencyClassifier> {
        Ok(self.apply(ServerConfig::default()).build_classifier()?)
    }

    /// Copies the taxonomy options into a server configuration.
    pub fn apply(&self, config: ServerConfig) -> ServerConfig {
        let config = config.with_match_mode(self.match_mode());
        match self.taxonomy_file {
            Some(ref path) => config.with_taxonomy_path(path),
            None => config,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,

        /// Port to bind to
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },

    /// Check text for emergency language (reads stdin when no text is given)
    Classify {
        /// Text to classify; multiple words are joined with spaces
        text: Vec<String>,

        /// Report every matching phrase, not just the first
        #[arg(long)]
        all: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Chat with the demo assistant on the terminal
    Chat {
        /// User id recorded on the chat
        #[arg(long, default_value = "cli")]
        user: String,
    },

    /// Print the keyword taxonomy as JSON
    Taxonomy,
}

impl Args {
    /// Builds the server configuration for `serve`.
    pub fn server_config(&self, host: &str, port: u16) -> ServerConfig {
        self.taxonomy
            .apply(ServerConfig::default().with_host(host).with_port(port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_classify_with_words() {
        let args = Args::parse_from(["solace", "classify", "I", "feel", "fine", "--all"]);
        match args.command {
            Command::Classify { text, all, json } => {
                assert_eq!(text, vec!["I", "feel", "fine"]);
                assert!(all);
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn global_taxonomy_flags_after_subcommand() {
        let args = Args::parse_from(["solace", "taxonomy", "--word-boundary"]);
        assert_eq!(args.taxonomy.match_mode(), MatchMode::WordBoundary);
    }

    #[test]
    fn serve_defaults() {
        let args = Args::parse_from(["solace", "serve"]);
        match args.command {
            Command::Serve { ref host, port } => {
                let config = args.server_config(host, port);
                assert_eq!(config.host, DEFAULT_HOST);
                assert_eq!(config.port, DEFAULT_PORT);
                assert!(config.taxonomy_path.is_none());
            }
            ref other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn serve_passes_taxonomy_path() {
        let args = Args::parse_from([
            "solace",
            "--taxonomy",
            "rules.json",
            "serve",
            "--port",
            "9000",
        ]);
        let config = args.server_config(DEFAULT_HOST, 9000);
        assert_eq!(config.port, 9000);
        assert_eq!(config.taxonomy_path, Some(PathBuf::from("rules.json")));
    }

    #[test]
    fn default_classifier_is_substring() {
        let classifier = TaxonomyArgs::default().build_classifier().unwrap();
        assert_eq!(classifier.mode(), MatchMode::Substring);
    }

    #[test]
    fn missing_taxonomy_file_is_an_error() {
        let args = TaxonomyArgs {
            taxonomy_file: Some(PathBuf::from("/nonexistent/taxonomy.json")),
            word_boundary: false,
        };
        assert!(args.build_classifier().is_err());
    }

    #[test]
    fn custom_taxonomy_file_and_word_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taxonomy.json");
        std::fs::write(&path, r#"{"bullying": ["hate you"]}"#).unwrap();

        let args = Args::parse_from([
            "solace",
            "classify",
            "--word-boundary",
            "--taxonomy",
            path.to_str().unwrap(),
        ]);
        let classifier = args.taxonomy.build_classifier().unwrap();

        assert_eq!(classifier.mode(), MatchMode::WordBoundary);
        assert!(classifier.is_emergency("I HATE YOU"));
        assert!(!classifier.is_emergency("I want to end my life"));
    }
}
