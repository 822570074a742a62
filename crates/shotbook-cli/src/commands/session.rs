//! Login session command handlers

use anyhow::Result;

use shotbook_core::Session;

use crate::output::{Output, OutputFormat};

/// Log in with phone number and verification code
pub fn login(session: &mut Session, phone: String, code: String, output: &Output) -> Result<()> {
    let user = session.login(&phone, &code)?;

    match output.format {
        OutputFormat::Json => output.json(user),
        OutputFormat::Quiet => println!("{}", user.phone),
        OutputFormat::Human => {
            println!("✓ Logged in as {} ({})", user.nickname, user.phone);
        }
    }
    Ok(())
}

/// Log out, forgetting the stored session
pub fn logout(session: &mut Session, output: &Output) -> Result<()> {
    if !session.is_logged_in() {
        output.message("Not logged in.");
        return Ok(());
    }

    session.logout()?;
    output.success("Logged out");
    Ok(())
}

/// Show who new submissions will be credited to
pub fn whoami(session: &Session, output: &Output) -> Result<()> {
    let author = session.author();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "logged_in": session.is_logged_in(),
                    "author": author,
                })
            );
        }
        OutputFormat::Quiet => println!("{}", author.phone),
        OutputFormat::Human => match session.user() {
            Some(user) => {
                println!("Logged in as {} ({})", user.nickname, user.phone);
            }
            None => {
                println!("Not logged in. Submissions are credited to \"{}\".", author.phone);
                println!("Log in with: shotbook login <phone> <code>");
            }
        },
    }
    Ok(())
}
