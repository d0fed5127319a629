//! Auto-detects a default identity, or interactively prompts; degrades to a typed
//! error in non-interactive environments instead of blocking on stdin.

use crate::config::AuthConfig;
use crate::context::AuthContext;
use crate::error::AuthError;
use crate::names::IdentityName;
use dialoguer::Select;
use dialoguer::theme::ColorfulTheme;
use std::io::IsTerminal;
use tracing::instrument;

/// True when stdin and stdout are both attached to a terminal and the process isn't
/// running under CI (several CI systems export `CI=true`; honoring it here means a
/// pipeline invocation gets a typed error instead of hanging on a prompt no one can
/// answer).
fn is_interactive() -> bool {
    std::io::stdin().is_terminal()
        && std::io::stdout().is_terminal()
        && std::env::var("CI").map(|v| v != "true").unwrap_or(true)
}

#[instrument(skip(config, ctx))]
pub fn get_default_identity(
    config: &AuthConfig,
    force_select: bool,
    ctx: &AuthContext,
) -> Result<IdentityName, AuthError> {
    if config.identities.is_empty() {
        return Err(AuthError::NoIdentitiesAvailable);
    }

    let defaults: Vec<&IdentityName> = config
        .identities
        .iter()
        .filter(|(_, cfg)| cfg.default)
        .map(|(name, _)| name)
        .collect();

    let may_prompt = ctx.allow_prompts && is_interactive();

    if force_select {
        if !may_prompt {
            return Err(AuthError::IdentitySelectionRequiresTTY);
        }
        return prompt_among(all_identity_names(config));
    }

    match defaults.len() {
        1 => Ok(defaults[0].clone()),
        0 => {
            if may_prompt {
                prompt_among(all_identity_names(config))
            } else {
                Err(AuthError::NoDefaultIdentity)
            }
        }
        _ => {
            if may_prompt {
                prompt_among(defaults.into_iter().cloned().collect())
            } else {
                Err(AuthError::MultipleDefaultIdentities(
                    defaults.into_iter().map(IdentityName::to_string).collect(),
                ))
            }
        }
    }
}

fn all_identity_names(config: &AuthConfig) -> Vec<IdentityName> {
    config.identities.keys().cloned().collect()
}

fn prompt_among(mut candidates: Vec<IdentityName>) -> Result<IdentityName, AuthError> {
    candidates.sort();
    let labels: Vec<String> = candidates.iter().map(IdentityName::to_string).collect();

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select an identity")
        .items(&labels)
        .default(0)
        .interact_opt()
        .map_err(|_| AuthError::UserAborted)?;

    match selection {
        Some(index) => Ok(candidates[index].clone()),
        None => Err(AuthError::UserAborted),
    }
}
