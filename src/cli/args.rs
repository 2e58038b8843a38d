use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "campus")]
#[command(version)]
#[command(about = "Learning-management client with cached course, user and image access", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize configuration
    Init,
    /// Log in and store the session token
    Login {
        email: String,
        #[arg(long, env = "CAMPUS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the session token and cached responses
    Logout,
    /// List courses
    Courses {
        /// Skip the cached list
        #[arg(long)]
        refresh: bool,
    },
    /// List course materials
    Materials {
        /// Only materials of this course
        #[arg(long)]
        course: Option<String>,
    },
    /// Show a user profile
    User { id: String },
    /// Inspect the stored session token
    Token,
    /// Load an image through the cache
    Image {
        url: String,
        #[arg(long, requires = "height")]
        width: Option<u32>,
        #[arg(long, requires = "width")]
        height: Option<u32>,
        /// Write the decoded image here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show image cache statistics
    CacheStats,
    /// Remove every cached response and image
    CacheClear,
}
