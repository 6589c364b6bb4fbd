use std::fmt::Write;

use keel_config::{Configuration, DeploymentTarget, NetworkProfile};
use tracing::info;

pub(super) fn cmd_profiles(config: &Configuration) -> keel_core::Result<()> {
    println!("\x1b[1mNetwork profiles\x1b[0m");
    println!("{}", "-".repeat(72));
    for profile in config.profiles() {
        print!("{}", render_profile(profile));
    }
    Ok(())
}

pub(super) fn cmd_resolve(config: &Configuration, name: &str) -> keel_core::Result<()> {
    let target = config.resolve_profile(name)?;
    info!(profile = %target.name, endpoint = %target.endpoint, "profile ready for deployment");
    print!("{}", render_target(&target));
    Ok(())
}

fn render_profile(profile: &NetworkProfile) -> String {
    let mut out = String::new();
    let chain_id = profile
        .chain_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".into());
    let _ = writeln!(
        out,
        "\x1b[36m{:<12}\x1b[0m {} (chain {}, id {})",
        profile.name, profile.endpoint, profile.chain, chain_id
    );
    for slot in &profile.credentials {
        let status = if slot.is_present() {
            "\x1b[32mset\x1b[0m"
        } else {
            "\x1b[31mmissing\x1b[0m"
        };
        let _ = writeln!(out, "             {}: {}", slot.env, status);
    }
    out
}

fn render_target(target: &DeploymentTarget<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "✅ {} is ready for deployment", target.name);
    let _ = writeln!(out, "   Endpoint:  {}", target.endpoint);
    if let Some(id) = target.chain_id {
        let _ = writeln!(out, "   Chain id:  {id}");
    }
    for (i, secret) in target.credentials.iter().enumerate() {
        let _ = writeln!(out, "   Signer {i}:  {}", secret.masked());
    }
    out
}
