//! Command-line argument parsing for youthy
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::policy::UserContext;

/// youthy - Korean youth-policy retrieval engine
#[derive(Parser, Debug)]
#[command(name = "youthy")]
#[command(version)]
#[command(about = "Answer questions about Korean youth-support policies", long_about = None)]
pub struct Args {
    /// Question to answer, e.g. "성북구 25세 대학생 월세 지원"
    #[arg(value_name = "QUESTION")]
    pub question: Option<String>,

    /// Requester age in years
    #[arg(long)]
    pub age: Option<u8>,

    /// Requester district, e.g. "성북구"
    #[arg(long)]
    pub region: Option<String>,

    /// Requester is a university student
    #[arg(long)]
    pub student: bool,

    /// Print the retrieved context and citations without generating an answer
    #[arg(long)]
    pub no_generate: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress all output except the answer)
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run service health checks
    Doctor,

    /// List the policy category taxonomy
    Categories,

    /// Display current configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Requester profile assembled from the flags
    pub fn user_context(&self) -> UserContext {
        UserContext {
            age: self.age,
            region: self.region.clone(),
            student: self.student.then_some(true),
            ..UserContext::default()
        }
    }

    /// Check if question is required and provided
    pub fn validate(&self) -> Result<(), String> {
        // Question required if no subcommand
        if self.command.is_none() && self.question.is_none() {
            return Err(
                "Question required. Use 'youthy <QUESTION>' or run a subcommand.".to_string(),
            );
        }

        // Question not allowed with subcommands
        if self.command.is_some() && self.question.is_some() {
            return Err("Cannot specify a question with a subcommand.".to_string());
        }

        Ok(())
    }
}

impl Verbosity {
    /// Log filter directive for this level
    pub fn log_filter(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "youthy=error",
            Verbosity::Normal => "youthy=warn",
            Verbosity::Verbose => "youthy=info",
            Verbosity::VeryVerbose => "youthy=debug",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        let mut args = Args::parse_from(["youthy", "월세 지원"]);
        assert_eq!(args.verbosity(), Verbosity::Normal);

        args.verbose = 1;
        assert_eq!(args.verbosity(), Verbosity::Verbose);

        args.verbose = 3;
        assert_eq!(args.verbosity(), Verbosity::VeryVerbose);

        args.quiet = true;
        assert_eq!(args.verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn test_user_context_from_flags() {
        let args = Args::parse_from([
            "youthy",
            "월세 지원",
            "--age",
            "25",
            "--region",
            "성북구",
            "--student",
        ]);
        let user = args.user_context();
        assert_eq!(user.age, Some(25));
        assert_eq!(user.region.as_deref(), Some("성북구"));
        assert_eq!(user.student, Some(true));
    }

    #[test]
    fn test_student_flag_absent_means_unknown() {
        let args = Args::parse_from(["youthy", "월세 지원"]);
        assert_eq!(args.user_context().student, None);
    }

    #[test]
    fn test_validate_requires_question_without_subcommand() {
        let args = Args::parse_from(["youthy"]);
        assert!(args.validate().is_err());

        let args = Args::parse_from(["youthy", "월세 지원"]);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_question_with_subcommand() {
        let mut args = Args::parse_from(["youthy", "doctor"]);
        assert!(args.validate().is_ok());

        args.question = Some("월세 지원".to_string());
        assert!(args.validate().is_err());
    }
}
