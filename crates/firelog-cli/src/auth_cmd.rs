use chrono::DateTime;

use firelog::api::{self, is_secure_url};

use crate::Context;

pub fn cmd_auth_login(ctx: &Context, email: &str, password: Option<&str>) -> anyhow::Result<i32> {
    if let Some(tokens) = ctx.manager.tokens()?
        && ctx.manager.is_token_valid()?
    {
        eprintln!(
            "[firelog] already logged in as {}. Run `firelog auth logout` first.",
            tokens.email.as_deref().unwrap_or("unknown user")
        );
        return Ok(0);
    }

    if !is_secure_url(&ctx.server) {
        eprintln!(
            "[firelog] WARNING: server URL uses insecure HTTP, your password will be sent unencrypted"
        );
    }

    let password = match password {
        Some(p) => p.to_string(),
        None => dialoguer::Password::new().with_prompt("Password").interact()?,
    };

    let resp = api::auth_client::login(ctx.manager.client(), email, &password)?;
    let Some(session) = resp.session else {
        anyhow::bail!("server returned no session; confirm your e-mail address first");
    };
    ctx.manager.save_session(&session, Some(&resp.user.email))?;
    eprintln!(
        "[firelog] Logged in as {} {} ({})",
        resp.profile.first_name, resp.profile.last_name, resp.profile.role
    );
    Ok(0)
}

pub fn cmd_auth_logout(ctx: &Context) -> anyhow::Result<i32> {
    let Some(tokens) = ctx.manager.tokens()? else {
        eprintln!("[firelog] Not logged in, nothing to do.");
        return Ok(0);
    };
    let client = ctx.manager.client().with_token(tokens.access_token);
    if let Err(e) = api::auth_client::logout(&client) {
        eprintln!("[firelog] server logout failed ({e:#}); forgetting the local session anyway");
    }
    ctx.manager.clear()?;
    eprintln!("[firelog] Logged out");
    Ok(0)
}

pub fn cmd_auth_status(ctx: &Context) -> anyhow::Result<i32> {
    let Some(tokens) = ctx.manager.tokens()? else {
        println!("Not logged in. Run `firelog auth login` to authenticate.");
        return Ok(0);
    };
    println!(
        "Logged in as {}",
        tokens.email.as_deref().unwrap_or("unknown user")
    );
    println!("Server: {}", ctx.server);
    println!("Session file: {}", ctx.manager.store().path().display());
    let expires = DateTime::from_timestamp(tokens.expires_at, 0)
        .map_or_else(|| tokens.expires_at.to_string(), |t| t.to_rfc3339());
    if ctx.manager.needs_refresh()? {
        println!("Token: expires {expires}, will be refreshed on the next command");
    } else {
        println!("Token: valid until {expires}");
    }
    Ok(0)
}

