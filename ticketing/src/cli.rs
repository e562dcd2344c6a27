use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Event ticketing service
#[derive(Parser, Debug)]
#[command(name = "ticketing")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API
    Serve {
        /// Interface to bind (default: from env or 0.0.0.0)
        #[arg(long)]
        host: Option<IpAddr>,

        /// Port to listen on (default: from env or 5000)
        #[arg(long)]
        port: Option<u16>,

        /// SQLite database file (default: from env or data/events.db)
        #[arg(long, value_name = "PATH")]
        database: Option<PathBuf>,
    },

    /// Create or upgrade the database schema
    Migrate {
        /// SQLite database file (default: from env or data/events.db)
        #[arg(long, value_name = "PATH")]
        database: Option<PathBuf>,
    },

    /// Container image tooling
    Image {
        #[command(subcommand)]
        action: ImageAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ImageAction {
    /// Print the Dockerfile for the service image
    Render {
        /// Write to this file instead of stdout
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Run the build preflight without invoking a container engine
    Check {
        /// Build context directory
        #[arg(long, value_name = "DIR", default_value = ".")]
        context: PathBuf,
    },

    /// Preflight, then build the image with docker or podman
    Build {
        /// Build context directory
        #[arg(long, value_name = "DIR", default_value = ".")]
        context: PathBuf,

        /// Image tag
        #[arg(long, short, default_value = "ticketing:dev")]
        tag: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_flags() {
        let cli = Cli::try_parse_from([
            "ticketing", "serve", "--host", "127.0.0.1", "--port", "8080", "--database", "x.db",
        ])
        .unwrap();
        match cli.command {
            Commands::Serve { host, port, database } => {
                assert_eq!(host, Some("127.0.0.1".parse().unwrap()));
                assert_eq!(port, Some(8080));
                assert_eq!(database, Some(PathBuf::from("x.db")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_serve_rejects_bad_host() {
        assert!(Cli::try_parse_from(["ticketing", "serve", "--host", "everywhere"]).is_err());
    }

    #[test]
    fn test_image_defaults() {
        let cli = Cli::try_parse_from(["ticketing", "image", "build"]).unwrap();
        match cli.command {
            Commands::Image {
                action: ImageAction::Build { context, tag },
            } => {
                assert_eq!(context, PathBuf::from("."));
                assert_eq!(tag, "ticketing:dev");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
