use std::io;

use clap::Args;
use freshcart::session::{self, UserMarker};

use super::{CliError, Storefront};

#[derive(Debug, Args)]
pub(crate) struct LoginArgs {
    /// Email address
    #[arg(long)]
    email: String,

    /// Password
    #[arg(long, env = "FRESHCART_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Debug, Args)]
pub(crate) struct SignupArgs {
    /// Full name
    #[arg(long)]
    name: String,

    /// Email address
    #[arg(long)]
    email: String,

    /// Password
    #[arg(long, env = "FRESHCART_PASSWORD", hide_env_values = true)]
    password: String,

    /// Phone number
    #[arg(long)]
    phone: Option<String>,
}

pub(crate) fn login(
    storefront: &Storefront,
    args: &LoginArgs,
    out: &mut impl io::Write,
) -> Result<(), CliError> {
    let user = session::sign_in(storefront.store().as_ref(), &args.email, &args.password)?;

    writeln!(out, "Signed in as {}", describe(&user))?;

    Ok(())
}

pub(crate) fn signup(
    storefront: &Storefront,
    args: &SignupArgs,
    out: &mut impl io::Write,
) -> Result<(), CliError> {
    let user = session::sign_up(
        storefront.store().as_ref(),
        &args.name,
        &args.email,
        &args.password,
        args.phone.as_deref(),
    )?;

    writeln!(out, "Welcome, {}", describe(&user))?;

    Ok(())
}

pub(crate) fn logout(storefront: &Storefront, out: &mut impl io::Write) -> Result<(), CliError> {
    session::sign_out(storefront.store().as_ref())?;

    writeln!(out, "Signed out.")?;

    Ok(())
}

pub(crate) fn whoami(storefront: &Storefront, out: &mut impl io::Write) -> Result<(), CliError> {
    match session::current_user(storefront.store().as_ref()) {
        Some(user) => writeln!(out, "{}", describe(&user))?,
        None => writeln!(out, "Not signed in.")?,
    }

    Ok(())
}

fn describe(user: &UserMarker) -> String {
    let who = user
        .name
        .as_deref()
        .or(user.email.as_deref())
        .unwrap_or("guest");

    if user.is_admin() {
        format!("{who} (admin)")
    } else {
        who.to_string()
    }
}
