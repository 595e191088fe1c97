use notetree_core::models::{ChangePassword, UpdateProfile};
use notetree_core::util::normalize_text_option;
use notetree_core::UserId;

use crate::cli::UserCommands;
use crate::commands::common::build_client;
use crate::error::CliError;

pub async fn run_user(command: UserCommands, base_url: Option<&str>) -> Result<(), CliError> {
    let client = build_client(base_url, "/profile")?;
    let users = client.users();

    match command {
        UserCommands::Show { id } => {
            let user = users.get(UserId(id)).await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        UserCommands::Update {
            id,
            username,
            email,
        } => {
            let changes = profile_update(username, email)?;
            let user = users.update_profile(UserId(id), &changes).await?;
            println!("Updated {} <{}>", user.username, user.email);
        }
        UserCommands::Password { id, new_password } => {
            users
                .change_password(UserId(id), &ChangePassword { new_password })
                .await?;
            println!("Password changed");
        }
    }
    Ok(())
}

pub fn profile_update(
    username: Option<String>,
    email: Option<String>,
) -> Result<UpdateProfile, CliError> {
    let changes = UpdateProfile {
        username: normalize_text_option(username),
        email: normalize_text_option(email),
    };
    if changes == UpdateProfile::default() {
        return Err(CliError::EmptyProfileUpdate);
    }
    Ok(changes)
}
