use clap::Args;
use serde_json::json;

use crate::auth::{generate_jwt, Claims};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::SecurityConfig;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(help = "Subject (username) the token identifies")]
    pub subject: String,

    #[arg(long = "role", help = "Role to grant; repeat for several")]
    pub roles: Vec<String>,

    #[arg(long, help = "Lifetime in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
    pub hours: Option<u64>,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let token = issue(&args, &crate::config::config().security)?;
    output_success(
        &output_format,
        &token,
        Some(json!({ "subject": args.subject, "roles": args.roles, "token": token })),
    )
}

fn issue(args: &TokenArgs, security: &SecurityConfig) -> anyhow::Result<String> {
    let mut security = security.clone();
    if let Some(hours) = args.hours {
        security.jwt_expiry_hours = hours;
    }
    let claims = Claims::new(args.subject.clone(), args.roles.clone(), &security);
    Ok(generate_jwt(&claims, &security.jwt_secret)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Caller, TokenAuthenticator};

    fn security() -> SecurityConfig {
        SecurityConfig {
            enable_cors: false,
            cors_origins: vec![],
            jwt_secret: "cli-secret".to_string(),
            jwt_issuer: Some("shop".to_string()),
            jwt_audience: None,
            jwt_expiry_hours: 2,
        }
    }

    #[test]
    fn issued_tokens_verify() {
        let args = TokenArgs {
            subject: "ops".to_string(),
            roles: vec!["admin".to_string(), "user".to_string()],
            hours: Some(1),
        };
        let token = issue(&args, &security()).unwrap();

        let authenticator = TokenAuthenticator::new(&security()).unwrap();
        let caller = authenticator.authenticate(Some(&format!("Bearer {}", token))).unwrap();
        let Caller::Identified(identity) = caller else {
            panic!("expected an identity");
        };
        assert_eq!(identity.subject(), "ops");
        assert!(identity.has_role("admin"));
    }

    #[test]
    fn empty_secret_cannot_sign() {
        let mut security = security();
        security.jwt_secret.clear();
        let args = TokenArgs { subject: "ops".to_string(), roles: vec![], hours: None };
        assert!(issue(&args, &security).is_err());
    }
}
