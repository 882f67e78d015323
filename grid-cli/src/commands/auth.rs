//! Login and logout handlers
//!
//! The site requires a captcha on login, so the image is written to disk
//! and the operator types the code back in.

use anyhow::{Context, Result, bail};
use colored::*;
use grid_client::{LoginOutcome, MicrogridClient, Session};
use grid_core::dto::auth::Login;
use std::io::{BufRead, Write};

use crate::config::Config;

/// Log in interactively and save the session
pub async fn login(config: &Config, captcha_file: &str) -> Result<()> {
    let client = MicrogridClient::new(&config.base_url);
    let session = client
        .start_session()
        .await
        .context("Failed to start a session")?;
    let client = client.with_session(session.clone());

    let image = client.captcha().await.context("Failed to download captcha")?;
    tokio::fs::write(captcha_file, &image)
        .await
        .with_context(|| format!("Failed to write {}", captcha_file))?;
    println!("Captcha saved to {}", captcha_file.bold());

    let credentials = {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        Login {
            login: prompt(&mut input, "Username")?,
            password: prompt(&mut input, "Password")?,
            captcha: prompt(&mut input, "Captcha")?,
        }
    };

    match client.login(&credentials).await? {
        LoginOutcome::Successful => {
            session
                .save(&config.session_file)
                .await
                .context("Failed to save session")?;
            println!(
                "{} Session saved to {}",
                "✓".green(),
                config.session_file.display()
            );
            Ok(())
        }
        LoginOutcome::InvalidCaptcha => bail!("Invalid captcha, try again"),
        LoginOutcome::WrongToken => bail!("The site rejected the session token"),
        LoginOutcome::Failed => bail!("Login failed, check username and password"),
    }
}

/// Log out the saved session and remove it
pub async fn logout(config: &Config) -> Result<()> {
    let session = Session::load(&config.session_file)
        .await
        .context("No saved session")?;

    let client = MicrogridClient::new(&config.base_url).with_session(session);
    match client.logout().await {
        Ok(true) => println!("{} Logged out", "✓".green()),
        Ok(false) => println!("{}", "The site did not confirm the logout.".yellow()),
        Err(e) => println!("{} {}", "Logout request failed:".yellow(), e),
    }

    tokio::fs::remove_file(&config.session_file)
        .await
        .with_context(|| format!("Failed to remove {}", config.session_file.display()))?;
    println!("Removed {}", config.session_file.display());
    Ok(())
}

fn prompt(input: &mut impl BufRead, label: &str) -> Result<String> {
    print!("{}: ", label.bold());
    std::io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("No input for {}", label.to_lowercase());
    }
    Ok(line.trim().to_string())
}
