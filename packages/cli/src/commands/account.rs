use anyhow::Result;
use api::{Credentials, SignupForm};
use ui::{HeaderModel, NavItem};

use super::{prompt, App};

pub async fn signup(
    app: &mut App,
    email: String,
    name: String,
    password: Option<String>,
) -> Result<()> {
    let password = prompt("Password", password)?;
    let confirm = prompt("Confirm password", None)?;
    let form = SignupForm::new(email, password, confirm, name);

    app.client.signup(&form).await?;
    app.success(&format!(
        "Registered {}. Run `blog login {}` to sign in.",
        form.email.trim(),
        form.email.trim()
    ));
    Ok(())
}

pub async fn login(app: &mut App, email: String, password: Option<String>) -> Result<()> {
    let password = prompt("Password", password)?;
    let session = app
        .session()
        .login(&Credentials::new(email, password))
        .await?;

    if let Some(identity) = session.identity() {
        app.success(&format!("Signed in as {}", identity.display_name()));
    }
    Ok(())
}

pub async fn logout(app: &mut App) -> Result<()> {
    let was_signed_in = app.session().is_authenticated();
    app.session().logout().await;
    if was_signed_in {
        app.success("Signed out");
    } else {
        println!("Not signed in");
    }
    Ok(())
}

/// Print the session and what the header would offer.
pub fn whoami(app: &App) {
    let header = HeaderModel::from_session(&app.session().current());
    match &header.member {
        Some(name) => println!("Signed in as {name}"),
        None => println!("Not signed in"),
    }
    for item in &header.items {
        match item {
            NavItem::Link { label, route } => println!("  {label:<10} {route}"),
            NavItem::Logout => println!("  {:<10} blog logout", "Logout"),
        }
    }
}
