use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "desk",
    bin_name = "desk",
    version,
    disable_help_subcommand = true,
    after_help = "Paths look like /Root/Docs/notes.txt. A leading root may be omitted."
)]
#[command(about = "Lockable folders and notes from the command line", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Store file to use instead of the one in the data directory
    #[arg(long, global = true, value_name = "FILE", help_heading = "Options")]
    pub data: Option<PathBuf>,

    /// Act as this user for one invocation
    #[arg(short, long, global = true, help_heading = "Options")]
    pub user: Option<String>,

    /// Output format
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = OutputFormat::Text,
        help_heading = "Options"
    )]
    pub output: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(flatten)]
    Core(CoreCommands),

    #[command(flatten)]
    Node(NodeCommands),

    /// Read or write the note of a file
    #[command(display_order = 20)]
    Note {
        #[command(subcommand)]
        action: NoteCommands,
    },

    #[command(flatten)]
    Misc(MiscCommands),
}

#[derive(Subcommand, Debug)]
pub enum CoreCommands {
    /// List a folder (the root by default)
    #[command(alias = "list", display_order = 1)]
    Ls {
        path: Option<String>,

        /// Password for locked folders on the way
        #[arg(long, short = 'p')]
        password: Option<String>,
    },

    /// Create a folder
    #[command(display_order = 2)]
    Mkdir {
        /// Name, or a path whose last segment is the name
        path: String,

        /// Folder to create in (instead of a path)
        #[arg(long = "in", short = 'i', value_name = "FOLDER")]
        inside: Option<String>,

        /// Password for locked folders on the way
        #[arg(long, short = 'p')]
        password: Option<String>,
    },

    /// Create a file
    #[command(display_order = 3)]
    Touch {
        /// Name, or a path whose last segment is the name
        path: String,

        /// Folder to create in (instead of a path)
        #[arg(long = "in", short = 'i', value_name = "FOLDER")]
        inside: Option<String>,

        /// Password for locked folders on the way
        #[arg(long, short = 'p')]
        password: Option<String>,
    },

    /// Show every folder and file
    #[command(display_order = 4)]
    Tree,

    /// Find files whose name contains the text, ignoring case
    #[command(alias = "search", display_order = 5)]
    Find {
        /// Search words (joined with spaces)
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum NodeCommands {
    /// Rename a folder or file
    #[command(display_order = 10)]
    Rename {
        path: String,
        new_name: String,

        /// Password for the node and locked folders on the way
        #[arg(long, short = 'p')]
        password: Option<String>,
    },

    /// Delete a folder with everything inside, or a file with its note
    #[command(alias = "delete", display_order = 11)]
    Rm {
        path: String,

        /// Password for the node and locked folders on the way
        #[arg(long, short = 'p')]
        password: Option<String>,
    },

    /// Move a folder or file into another folder
    #[command(alias = "move", display_order = 12)]
    Mv {
        path: String,

        /// Destination folder, e.g. /Root/Archive
        destination: String,

        /// Password for the node and locked folders on the way
        #[arg(long, short = 'p')]
        password: Option<String>,
    },

    /// Lock a folder with a password
    #[command(display_order = 13)]
    Lock { path: String, password: String },

    /// Unlock a folder
    #[command(display_order = 14)]
    Unlock { path: String, password: String },
}

#[derive(Subcommand, Debug)]
pub enum NoteCommands {
    /// Print the note of a file
    Show {
        path: String,

        /// Password for locked folders on the way
        #[arg(long, short = 'p')]
        password: Option<String>,
    },

    /// Save the note of a file from --content or stdin
    Save {
        path: String,

        /// New title, which also renames the file (defaults to the file name)
        #[arg(long, short = 't')]
        title: Option<String>,

        /// Note content. Read from stdin when omitted
        #[arg(long, short = 'c')]
        content: Option<String>,

        /// Password for locked folders on the way
        #[arg(long, short = 'p')]
        password: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum MiscCommands {
    /// Show the activity log, newest first
    #[command(alias = "log", display_order = 30)]
    Logs {
        /// Only entries older than this timestamp (milliseconds)
        #[arg(long)]
        before: Option<i64>,

        /// Entries per page (defaults to log_page_size)
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// Sign in for this and later invocations
    #[command(display_order = 31)]
    Login {
        name: String,

        #[arg(long, short = 'e')]
        email: Option<String>,
    },

    /// Sign out
    #[command(display_order = 32)]
    Logout,

    /// Show who actions are attributed to
    #[command(display_order = 33)]
    Whoami,

    /// Run terminal commands, one line or an interactive session
    #[command(alias = "terminal", display_order = 34)]
    Term {
        /// A single terminal line. Reads lines from stdin when omitted
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        line: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn naked_invocation_has_no_command() {
        let cli = Cli::try_parse_from(["desk"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.output, OutputFormat::Text);
    }

    #[test]
    fn global_options_follow_subcommands() {
        let cli = Cli::try_parse_from(["desk", "ls", "Docs", "--output", "json", "-u", "Ada"])
            .unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.user.as_deref(), Some("Ada"));
        match cli.command {
            Some(Commands::Core(CoreCommands::Ls { path, password })) => {
                assert_eq!(path.as_deref(), Some("Docs"));
                assert_eq!(password, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn term_keeps_the_line_verbatim() {
        let cli = Cli::try_parse_from(["desk", "term", "Lock", "/Root/Docs", "-x"]).unwrap();
        match cli.command {
            Some(Commands::Misc(MiscCommands::Term { line })) => {
                assert_eq!(line, vec!["Lock", "/Root/Docs", "-x"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn mkdir_accepts_in_folder() {
        let cli = Cli::try_parse_from(["desk", "mkdir", "Work", "--in", "/Root/Docs"]).unwrap();
        match cli.command {
            Some(Commands::Core(CoreCommands::Mkdir { path, inside, .. })) => {
                assert_eq!(path, "Work");
                assert_eq!(inside.as_deref(), Some("/Root/Docs"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn note_save_takes_content_flag() {
        let cli =
            Cli::try_parse_from(["desk", "note", "save", "a.txt", "--content", "hi"]).unwrap();
        match cli.command {
            Some(Commands::Note {
                action: NoteCommands::Save { path, content, .. },
            }) => {
                assert_eq!(path, "a.txt");
                assert_eq!(content.as_deref(), Some("hi"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
