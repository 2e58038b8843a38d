use anyhow::{Context, Result};
use chrono::DateTime;
use colored::Colorize;

use crate::{
    api::Credentials,
    app::init_config,
    auth::jwt,
    cache::TargetSize,
    runtime::CampusCore,
};

use super::Commands;

/// Commands that run before any client state exists
///
/// Returns `true` when the command was handled.
pub fn handle_offline_command(command: &Commands) -> Result<bool> {
    match command {
        Commands::Init => {
            println!("Initializing campus configuration...");
            let path = init_config()?;
            println!("Configuration written to {}", path.display().to_string().green());
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Handle CLI subcommands
pub async fn handle_command(core: &CampusCore, command: &Commands) -> Result<()> {
    match command {
        Commands::Init => {
            handle_offline_command(command)?;
        }
        Commands::Login { email, password } => {
            let credentials = Credentials {
                email: email.clone(),
                password: password.clone(),
            };
            core.auth()
                .login(&credentials)
                .await
                .context("Login failed")?;
            println!("{} Logged in as {}", "[OK]".green(), email);
        }
        Commands::Logout => {
            core.auth().logout();
            println!("{} Logged out", "[OK]".green());
        }
        Commands::Courses { refresh } => {
            let courses = if *refresh {
                core.courses().refresh().await
            } else {
                core.courses().courses().await
            }
            .context("Failed to load courses")?;

            println!("Courses ({}):", courses.len());
            for course in courses {
                match course.description {
                    Some(description) => println!(
                        "  • {} {} - {}",
                        course.id.dimmed(),
                        course.name.green(),
                        description
                    ),
                    None => println!("  • {} {}", course.id.dimmed(), course.name.green()),
                }
            }
        }
        Commands::Materials { course } => {
            let materials = match course {
                Some(course_id) => core.materials().materials_for_course(course_id).await,
                None => core.materials().materials().await,
            }
            .context("Failed to load materials")?;

            println!("Materials ({}):", materials.len());
            for material in materials {
                println!(
                    "  • {} {} [{}]",
                    material.id.dimmed(),
                    material.title.green(),
                    material.course_id
                );
                if let Some(url) = material.file_url {
                    println!("      {}", url);
                }
            }
        }
        Commands::User { id } => {
            let user = core.users().user(id).await.context("Failed to load user")?;
            println!("{} ({})", user.name.green(), user.id.dimmed());
            println!("  email: {}", user.email);
            if let Some(role) = user.role {
                println!("  role:  {}", role);
            }
            if let Some(avatar) = user.avatar_url {
                println!("  avatar: {}", avatar);
            }
        }
        Commands::Token => show_token(core),
        Commands::Image {
            url,
            width,
            height,
            output,
        } => {
            let target = (*width).zip(*height).map(|(w, h)| TargetSize::new(w, h));
            let image = core
                .images()
                .load(url, target)
                .await
                .with_context(|| format!("Failed to load image {}", url))?;
            println!(
                "{} Loaded {}x{} image",
                "[OK]".green(),
                image.width(),
                image.height()
            );
            if let Some(path) = output {
                image
                    .save(path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("  saved to {}", path.display());
            }
        }
        Commands::CacheStats => {
            let stats = core.images().stats()?;
            println!("Image cache:");
            println!(
                "  memory: {}/{} entries",
                stats.memory_entries, stats.memory_capacity
            );
            println!(
                "  disk:   {} entries, {} bytes in {}",
                stats.disk.entries,
                stats.disk.bytes,
                core.images().disk_dir().display()
            );
        }
        Commands::CacheClear => {
            core.coordinator().invalidate_all();
            core.images().clear_memory();
            core.images().clear_disk()?;
            println!("{} Caches cleared", "[OK]".green());
        }
    }
    Ok(())
}

/// Show the session token state without printing the token itself
fn show_token(core: &CampusCore) {
    match core.tokens().get() {
        Some(token) => {
            println!("  [OK] Session token: present ({} bytes)", token.len());
            if let Some(exp) = jwt::expiry(&token) {
                let expires = DateTime::from_timestamp(exp, 0)
                    .map(|at| at.to_rfc3339())
                    .unwrap_or_else(|| exp.to_string());
                println!("      expires: {}", expires);
            }
        }
        None => println!("  [WARNING] Session token: none (log in first)"),
    }
}
