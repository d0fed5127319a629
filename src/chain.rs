//! Resolves an identity name to an ordered authentication path, detecting cycles.

use crate::config::{AuthConfig, Via};
use crate::error::ChainError;
use crate::names::{IdentityName, ProviderName};
use std::collections::HashSet;
use tracing::instrument;

/// One entry in a resolved chain: either the root provider, or an identity that
/// must be authenticated in sequence toward the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainStep {
    Provider(ProviderName),
    Identity(IdentityName),
}

impl ChainStep {
    pub fn name(&self) -> &str {
        match self {
            ChainStep::Provider(p) => p.as_str(),
            ChainStep::Identity(i) => i.as_str(),
        }
    }
}

/// An ordered authentication path: `[provider?, identity_1, ..., identity_n]`, where
/// `identity_n` is the originally requested target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    steps: Vec<ChainStep>,
}

impl Chain {
    pub fn steps(&self) -> &[ChainStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The final step, which is always the originally requested identity.
    pub fn target(&self) -> &IdentityName {
        match self.steps.last().expect("chain is never empty") {
            ChainStep::Identity(name) => name,
            ChainStep::Provider(_) => unreachable!("chain always ends on an identity"),
        }
    }

    pub fn provider(&self) -> Option<&ProviderName> {
        match self.steps.first() {
            Some(ChainStep::Provider(p)) => Some(p),
            _ => None,
        }
    }
}

/// Resolves an identity name to its [`Chain`] via a depth-first walk over `via.identity`
/// links, appending the root provider (if any) and detecting cycles.
#[instrument(skip(config), fields(identity = %identity_name))]
pub fn build_chain(config: &AuthConfig, identity_name: &IdentityName) -> Result<Chain, ChainError> {
    let mut visited = HashSet::new();
    let mut steps = Vec::new();
    let mut current = identity_name.clone();

    loop {
        if !visited.insert(current.clone()) {
            let mut path: Vec<String> = visited.iter().map(IdentityName::to_string).collect();
            path.sort();
            return Err(ChainError::CircularDependency {
                identity: identity_name.to_string(),
                path,
            });
        }

        let identity = config
            .identities
            .get(&current)
            .ok_or_else(|| ChainError::IdentityNotInConfig(current.to_string()))?;

        steps.push(ChainStep::Identity(current.clone()));

        match &identity.via {
            Via::Identity(next) => {
                current = next.clone();
            }
            Via::Provider(provider) => {
                steps.push(ChainStep::Provider(provider.clone()));
                break;
            }
            Via::None => {
                // Config construction already guarantees a `via: none` identity is of a
                // standalone kind (see `ConfigError::MissingVia`), so this is always a
                // valid chain terminus, whether reached directly or through a via.identity
                // link from another identity.
                break;
            }
        }
    }

    steps.reverse();
    Ok(Chain { steps })
}
