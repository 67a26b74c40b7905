//! Credential lookup: explicit flags win, environment variables fall back.

use gitshift_core::prelude::{CredentialProvider, MissingCredential, Secret};

pub const SOURCE_PAT_VAR: &str = "SOURCE_PAT";
pub const GITHUB_PAT_VAR: &str = "GH_PAT";

/// Supplies tokens from CLI flags with environment fallback. Values are
/// wrapped in [`Secret`] immediately so they never reach logs.
pub struct EnvCredentialProvider {
    source_pat_override: Option<Secret>,
    github_pat_override: Option<Secret>,
}

impl EnvCredentialProvider {
    pub fn new(source_pat: Option<String>, github_pat: Option<String>) -> Self {
        Self {
            source_pat_override: source_pat.map(Secret::new),
            github_pat_override: github_pat.map(Secret::new),
        }
    }

    fn lookup(
        override_value: &Option<Secret>,
        var: &str,
    ) -> Result<Secret, MissingCredential> {
        if let Some(secret) = override_value {
            return Ok(secret.clone());
        }
        std::env::var(var)
            .map(Secret::new)
            .map_err(|_| MissingCredential(var.to_string()))
    }
}

impl CredentialProvider for EnvCredentialProvider {
    fn source_pat(&self) -> Result<Secret, MissingCredential> {
        Self::lookup(&self.source_pat_override, SOURCE_PAT_VAR)
    }

    fn github_pat(&self) -> Result<Secret, MissingCredential> {
        Self::lookup(&self.github_pat_override, GITHUB_PAT_VAR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_override_wins_over_environment() {
        let provider =
            EnvCredentialProvider::new(Some("flag-token".to_string()), None);
        let secret = provider.source_pat().expect("source pat");
        assert_eq!(secret.expose(), "flag-token");
    }

    #[test]
    fn test_missing_credential_names_the_variable() {
        std::env::remove_var(SOURCE_PAT_VAR);
        let provider = EnvCredentialProvider::new(None, None);
        let err = provider.source_pat().expect_err("missing");
        assert!(err.to_string().contains(SOURCE_PAT_VAR));
    }
}
