//! Status command handler

use anyhow::Result;

use shotbook_core::{Library, Session};

use crate::output::{Output, OutputFormat};

/// Show storage and session information
pub async fn show(library: &Library, session: &Session, output: &Output) -> Result<()> {
    let stats = library.stats().await?;
    let config = library.config();
    let author = session.author();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "database": {
                        "path": stats.database_path,
                        "size": stats.database_size,
                    },
                    "counts": {
                        "stored": stats.preset_count,
                        "cached": library.cache().len(),
                    },
                    "session": {
                        "logged_in": session.is_logged_in(),
                        "author": author,
                    },
                    "max_images": config.max_images,
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", stats.preset_count);
        }
        OutputFormat::Human => {
            println!("Shotbook Status");
            println!("===============");
            println!();
            println!("Storage:");
            println!("  Database: {}", stats.database_path.display());
            println!("  Size:     {}", stats.database_size_human());
            println!();
            println!("Contents:");
            println!("  Presets:  {}", stats.preset_count);
            println!();
            println!("Session:");
            match session.user() {
                Some(user) => println!("  Logged in as {} ({})", user.nickname, user.phone),
                None => println!("  Not logged in (submitting as \"{}\")", author.phone),
            }
            println!();
            println!("Submission limit: {} image(s)", config.max_images);
        }
    }

    Ok(())
}
