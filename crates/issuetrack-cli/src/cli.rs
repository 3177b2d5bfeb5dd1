use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "issuetrack")]
#[command(version)]
#[command(about = "Report and browse issues from the terminal")]
pub struct Cli {
    /// Backend base address (overrides config and ISSUETRACK_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Keep tokens in memory only, for this invocation
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the session tokens
    Login {
        /// Username (defaults to ISSUETRACK_USERNAME or the last one used)
        #[arg(env = "ISSUETRACK_USERNAME")]
        username: Option<String>,

        #[command(flatten)]
        password: PasswordArg,
    },
    /// Create a new account
    Register {
        username: String,
        email: String,

        #[command(flatten)]
        password: PasswordArg,
    },
    /// Forget the stored session tokens
    Logout,
    /// Exchange the stored access token for a fresh one
    Refresh,
    /// Show the backend address and whether a session is stored
    Status,
    /// Work with issues
    Issues {
        #[command(subcommand)]
        command: IssueCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum IssueCommands {
    /// List all reported issues
    List,
    /// Report a new issue (requires login)
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        description: String,
    },
}

#[derive(Args, Debug)]
pub struct PasswordArg {
    /// Password (prompted for when omitted)
    #[arg(long, env = "ISSUETRACK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_issue_create() {
        let cli = Cli::try_parse_from([
            "issuetrack",
            "--api-url",
            "http://localhost:8000",
            "issues",
            "create",
            "--title",
            "Pothole",
            "--location",
            "Main St",
            "--description",
            "Deep",
        ])
        .unwrap();

        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:8000"));
        match cli.command {
            Commands::Issues {
                command: IssueCommands::Create { title, .. },
            } => assert_eq!(title, "Pothole"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_register() {
        let cli = Cli::try_parse_from([
            "issuetrack",
            "register",
            "bob",
            "bob@example.com",
            "--password",
            "secret",
        ])
        .unwrap();
        match cli.command {
            Commands::Register {
                username, password, ..
            } => {
                assert_eq!(username, "bob");
                assert_eq!(password.password.as_deref(), Some("secret"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
