//! `login`, `logout` and `whoami`.

use std::io::BufRead;

use secrecy::SecretString;

use super::{CliShop, CommandError, output};

/// Log in and persist the session.
///
/// # Errors
///
/// Returns [`CommandError`] if the password cannot be read or login fails.
pub async fn login(
    shop: &mut CliShop,
    email: &str,
    password: Option<String>,
) -> Result<(), CommandError> {
    let password = match password {
        Some(password) => SecretString::from(password),
        None => read_password()?,
    };

    let session = shop.login(email, &password).await?;
    tracing::info!(user_id = %session.user().id, "logged in");
    output::session(Some(session));
    Ok(())
}

/// Forget the stored session. Succeeds when already logged out.
pub fn logout(shop: &mut CliShop) {
    shop.logout();
    output::message("Logged out.");
}

pub fn whoami(shop: &CliShop) {
    output::session(shop.session().current());
}

/// Read one line from stdin as the password.
fn read_password() -> Result<SecretString, CommandError> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err(CommandError::InvalidArgument(
            "no password given (use --password, TIENDA_PASSWORD or stdin)".to_string(),
        ));
    }
    Ok(SecretString::from(password.to_string()))
}
