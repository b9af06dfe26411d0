//! Command-line arguments, each overridable from the environment.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use lessons_core::models::principal::{ActorType, Principal};
use lessons_service::config::AuthConfig;
use lessons_service::token::issue_access_token;
use uuid::Uuid;

/// Lessons service: lesson lifecycle and access control for courses.
#[derive(Parser, Debug, Clone)]
#[command(name = "lessons-server")]
pub struct Args {
    /// Path to a TOML configuration file. Built-in defaults apply when
    /// omitted.
    #[arg(long, short, env = "LESSONS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// SurrealDB endpoint, e.g. `ws://127.0.0.1:8000` or `mem://`
    #[arg(long, env = "LESSONS_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Base URL of the course service
    #[arg(long, env = "LESSONS_COURSE_SERVICE_URL")]
    pub course_service_url: Option<String>,

    /// PEM file with the Ed25519 public key used to verify bearer tokens
    #[arg(long, env = "LESSONS_JWT_PUBLIC_KEY_FILE")]
    pub jwt_public_key_file: Option<PathBuf>,

    /// Default log filter when `RUST_LOG` is unset
    #[arg(long, env = "LESSONS_LOG", default_value = "lessons=info,info")]
    pub log_filter: String,

    /// Runs the server when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print a signed access token for a service account or system caller.
    IssueToken {
        /// Subject id carried in the token
        #[arg(long)]
        subject: Uuid,

        #[arg(long, value_enum, default_value_t = TokenActor::ServiceAccount)]
        actor_type: TokenActor,

        /// PEM file with the Ed25519 signing key. Falls back to
        /// `auth.jwt_private_key_pem` from the configuration.
        #[arg(long, env = "LESSONS_JWT_PRIVATE_KEY_FILE")]
        private_key_file: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenActor {
    User,
    ServiceAccount,
    System,
}

impl From<TokenActor> for ActorType {
    fn from(actor: TokenActor) -> Self {
        match actor {
            TokenActor::User => ActorType::User,
            TokenActor::ServiceAccount => ActorType::ServiceAccount,
            TokenActor::System => ActorType::System,
        }
    }
}

/// Sign a token for `subject` with the configured issuer and lifetime.
pub fn issue_token(
    auth: &AuthConfig,
    subject: Uuid,
    actor: TokenActor,
    private_key_file: Option<&Path>,
) -> anyhow::Result<String> {
    let mut auth = auth.clone();
    if let Some(path) = private_key_file {
        auth.jwt_private_key_pem = Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("reading private key {}", path.display()))?,
        );
    }

    let principal = Principal {
        id: subject,
        actor_type: actor.into(),
    };
    issue_access_token(&principal, &auth).context("issuing access token")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_token_subcommand_parses() {
        let subject = Uuid::new_v4();
        let subject_arg = subject.to_string();
        let args = Args::try_parse_from([
            "lessons-server",
            "issue-token",
            "--subject",
            subject_arg.as_str(),
            "--actor-type",
            "system",
        ])
        .unwrap();

        match args.command {
            Some(Command::IssueToken {
                subject: parsed,
                actor_type,
                private_key_file,
            }) => {
                assert_eq!(parsed, subject);
                assert_eq!(actor_type, TokenActor::System);
                assert!(private_key_file.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn no_subcommand_runs_the_server() {
        let args = Args::try_parse_from(["lessons-server"]).unwrap();
        assert!(args.command.is_none());
    }

    #[test]
    fn issuing_without_a_key_fails() {
        let err = issue_token(
            &AuthConfig::default(),
            Uuid::new_v4(),
            TokenActor::User,
            None,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("no private key"));
    }
}
