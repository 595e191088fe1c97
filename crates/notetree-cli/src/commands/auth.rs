use notetree_core::models::{Credentials, RegisterUser};

use crate::cli::AuthCommands;
use crate::commands::common::build_client;
use crate::error::CliError;

pub async fn run_auth(command: AuthCommands, base_url: Option<&str>) -> Result<(), CliError> {
    let client = build_client(base_url, "/login")?;
    let session = client.session();

    match command {
        AuthCommands::Login { email, password } => {
            let user = session
                .login(&Credentials::new(email.trim(), password))
                .await?;
            println!("Logged in as {} <{}>", user.username, user.email);
        }
        AuthCommands::Register {
            username,
            email,
            password,
        } => {
            let user = session
                .register(&RegisterUser {
                    username: username.trim().to_string(),
                    password,
                    email: email.trim().to_string(),
                })
                .await?;
            println!(
                "Registered {} (id {}). Run `notetree auth login` to sign in.",
                user.username, user.id
            );
        }
        AuthCommands::Logout => {
            session.logout().await?;
            println!("Logged out");
        }
        AuthCommands::Status => match session.current_user()? {
            Some(user) => {
                let role = if user.is_administrator() { " (admin)" } else { "" };
                println!(
                    "Logged in as {} <{}>, id {}{role}",
                    user.username, user.email, user.id
                );
            }
            None => println!("Not logged in."),
        },
    }
    Ok(())
}
