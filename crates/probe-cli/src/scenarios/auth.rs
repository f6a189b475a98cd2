use probe_client::render::token_preview;
use probe_client::{Credentials, LoginRequest};
use probe_core::{ProbeError, ProbeResult};
use serde_json::Value;

use super::{Expect, Runner};

pub async fn run(runner: &mut Runner<'_>) -> ProbeResult<()> {
    runner.announce("Testing User Registration")?;
    let credentials = Credentials::generate(
        "test",
        "",
        &runner.config.email_domain,
        &runner.config.password,
    );
    let register = runner
        .client
        .auth()
        .register(&credentials.register_request())
        .await?;
    let registered = runner.check("POST /auth/register", &register, Expect::REGISTERED)?;

    runner.announce("Testing User Login")?;
    if !registered {
        runner.say("Registration failed, skipping login test.")?;
        runner.skip("POST /auth/login", "registration failed");
        return runner.say("Login failed or no token received.");
    }

    // Log in with the address the server echoed back.
    let email = register
        .field("user")
        .and_then(|user| user.get("email"))
        .and_then(Value::as_str)
        .unwrap_or(credentials.email.as_str())
        .to_string();
    let login = runner
        .client
        .auth()
        .login(&LoginRequest {
            email,
            password: credentials.password.clone(),
        })
        .await?;

    if runner.check("POST /auth/login", &login, Expect::LOGGED_IN)? {
        let token = login
            .field("token")
            .and_then(Value::as_str)
            .ok_or_else(|| ProbeError::missing_field("token", "login response"))?;
        runner.say(format!("Login successful. Token: {}...", token_preview(token)))
    } else {
        runner.say("Login failed or no token received.")
    }
}
