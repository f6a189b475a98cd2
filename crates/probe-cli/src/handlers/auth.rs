use probe_client::{Credentials, LoginRequest, RegisterRequest};

use crate::cli::AuthAction;
use crate::context::ProbeContext;

pub async fn handle(ctx: &ProbeContext, action: AuthAction) -> anyhow::Result<()> {
    let auth = ctx.client.auth();
    let exchange = match action {
        AuthAction::Register {
            email,
            name,
            password,
        } => {
            let generated = Credentials::generate(
                "probe",
                "",
                &ctx.config.email_domain,
                &ctx.config.password,
            );
            auth.register(&RegisterRequest {
                email: email.unwrap_or(generated.email),
                password: password.unwrap_or(generated.password),
                name: name.unwrap_or(generated.name),
            })
            .await?
        }
        AuthAction::Login { email, password } => {
            auth.login(&LoginRequest {
                email,
                password: password.unwrap_or_else(|| ctx.config.password.clone()),
            })
            .await?
        }
    };
    ctx.show(&exchange)
}
