use probe_client::{AuthSession, Credentials};
use probe_core::ProbeResult;

use super::{Expect, Runner};

/// Registers a fresh user and logs it in, installing the token on the
/// runner's client. `None` means the scenario cannot go on.
pub async fn register_and_authenticate(
    runner: &mut Runner<'_>,
    prefix: &str,
    display: &str,
) -> ProbeResult<Option<AuthSession>> {
    let credentials = Credentials::generate(
        prefix,
        display,
        &runner.config.email_domain,
        &runner.config.password,
    );

    let register = runner
        .client
        .auth()
        .register(&credentials.register_request())
        .await?;
    if !runner.record("POST /auth/register", &register, Expect::REGISTERED) {
        runner.say(format!(
            "Failed to register user {}: {}",
            credentials.email, register.response.text
        ))?;
        return Ok(None);
    }
    runner.say(format!("Registered new user: {}", credentials.email))?;

    authenticate(runner, &credentials).await
}

pub async fn authenticate(
    runner: &mut Runner<'_>,
    credentials: &Credentials,
) -> ProbeResult<Option<AuthSession>> {
    let login = runner
        .client
        .auth()
        .login(&credentials.login_request())
        .await?;
    if !runner.record("POST /auth/login", &login, Expect::LOGGED_IN) {
        runner.say(format!(
            "Failed to authenticate {}: {}",
            credentials.email, login.response.text
        ))?;
        return Ok(None);
    }

    let session: AuthSession = login.decode()?;
    runner.say(format!(
        "Authenticated user {} with ID {}",
        session.user.email, session.user.id
    ))?;
    runner.client.set_token(session.token.clone());
    Ok(Some(session))
}
