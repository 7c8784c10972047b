use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "viewprobe", version, about = "List and smoke-test the views of a PostgreSQL schema")]
pub struct Cli {
    /// Database to connect to
    #[arg(short, long, env = "VIEWPROBE_DATABASE")]
    pub database: String,

    /// Section of the connection service file holding the credentials
    #[arg(long, env = "VIEWPROBE_SERVICE", default_value = "client-test")]
    pub service: String,

    /// Connection service file (defaults to ~/.pg_service.conf)
    #[arg(long, env = "PGSERVICEFILE")]
    pub service_file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Log filter directive, e.g. "viewprobe_core=debug"
    #[arg(long, global = true)]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the views in a schema
    Views {
        /// Schema to inspect (defaults to the session's current schema)
        #[arg(short, long)]
        schema: Option<String>,
    },
    /// Probe a single view
    Probe {
        /// View to probe
        view: String,

        /// Schema containing the view (defaults to the session's current schema)
        #[arg(short, long)]
        schema: Option<String>,
    },
    /// Probe every view in a schema
    Check {
        /// Schema to check (defaults to the session's current schema)
        #[arg(short, long)]
        schema: Option<String>,
    },
}

impl Commands {
    /// Schema given on the command line, if any.
    pub fn schema(&self) -> Option<&str> {
        match self {
            Commands::Views { schema } | Commands::Probe { schema, .. } | Commands::Check { schema } => {
                schema.as_deref()
            }
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check_defaults() {
        let cli = Cli::parse_from(["viewprobe", "--database", "testdb", "check"]);

        assert_eq!(cli.database, "testdb");
        assert_eq!(cli.service, "client-test");
        assert_eq!(cli.format, OutputFormat::Text);
        assert_eq!(cli.command.schema(), None);
    }

    #[test]
    fn test_parse_probe_with_schema() {
        let cli = Cli::parse_from([
            "viewprobe", "-d", "testdb", "--format", "json", "probe", "active_users", "--schema",
            "reporting",
        ]);

        match &cli.command {
            Commands::Probe { view, .. } => assert_eq!(view, "active_users"),
            other => panic!("Expected probe subcommand, got {other:?}"),
        }
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.command.schema(), Some("reporting"));
    }

    #[test]
    fn test_parse_views_with_service() {
        let cli = Cli::parse_from([
            "viewprobe", "-d", "testdb", "--service", "staging", "--service-file", "/tmp/svc.conf",
            "views",
        ]);

        assert_eq!(cli.service, "staging");
        assert_eq!(cli.service_file, Some(PathBuf::from("/tmp/svc.conf")));
        assert!(matches!(cli.command, Commands::Views { schema: None }));
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::parse_from([
            "viewprobe", "-d", "testdb", "views", "--schema", "reporting", "--format", "json",
            "--log-filter", "viewprobe_core=trace",
        ]);

        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.log_filter.as_deref(), Some("viewprobe_core=trace"));
        assert_eq!(cli.command.schema(), Some("reporting"));
    }

    #[test]
    fn test_probe_requires_view() {
        assert!(Cli::try_parse_from(["viewprobe", "-d", "testdb", "probe"]).is_err());
    }
}
