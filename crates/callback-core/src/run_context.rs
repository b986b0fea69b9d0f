//! Identifies the workflow run that produced the result.

use crate::error::{CoreError, Result};

/// Server used when the runner does not advertise one.
pub const DEFAULT_SERVER_URL: &str = "https://github.com";

const SERVER_URL_VAR: &str = "GITHUB_SERVER_URL";
const REPOSITORY_VAR: &str = "GITHUB_REPOSITORY";
const RUN_ID_VAR: &str = "GITHUB_RUN_ID";

/// Repository and run identifiers of the current workflow run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    server_url: String,
    owner: String,
    repo: String,
    run_id: u64,
}

impl RunContext {
    /// Creates a context from explicit identifiers.
    pub fn new(
        server_url: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        run_id: u64,
    ) -> Self {
        let server_url = server_url.into().trim_end_matches('/').to_string();
        Self { server_url, owner: owner.into(), repo: repo.into(), run_id }
    }

    /// Reads the context through `lookup`, which receives variable names such
    /// as `GITHUB_REPOSITORY`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidInput` when the repository is not of the
    /// form `owner/repo` or the run id is missing or not an unsigned integer.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_url = lookup(SERVER_URL_VAR)
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

        let repository = lookup(REPOSITORY_VAR).unwrap_or_default();
        let (owner, repo) = repository
            .trim()
            .split_once('/')
            .filter(|(owner, repo)| !owner.is_empty() && !repo.is_empty())
            .ok_or_else(|| {
                CoreError::invalid_input(format!(
                    "{REPOSITORY_VAR} must be set to 'owner/repo', got '{repository}'"
                ))
            })?;

        let raw_run_id = lookup(RUN_ID_VAR).unwrap_or_default();
        let run_id = raw_run_id.trim().parse::<u64>().map_err(|e| {
            CoreError::invalid_input(format!("{RUN_ID_VAR} is not a valid run id '{raw_run_id}': {e}"))
        })?;

        Ok(Self::new(server_url, owner, repo, run_id))
    }

    /// Reads the context from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Repository owner.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name.
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Numeric run identifier.
    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    /// Link to the run page: `<server>/<owner>/<repo>/actions/runs/<run_id>`.
    pub fn run_url(&self) -> String {
        format!("{}/{}/{}/actions/runs/{}", self.server_url, self.owner, self.repo, self.run_id)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_in(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let env: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| env.get(key).cloned()
    }

    #[test]
    fn composes_run_url_with_default_server() {
        let context = RunContext::from_lookup(lookup_in(&[
            ("GITHUB_REPOSITORY", "acme/widgets"),
            ("GITHUB_RUN_ID", "987654321"),
        ]))
        .unwrap();

        assert_eq!(context.owner(), "acme");
        assert_eq!(context.repo(), "widgets");
        assert_eq!(context.run_id(), 987_654_321);
        assert_eq!(context.run_url(), "https://github.com/acme/widgets/actions/runs/987654321");
    }

    #[test]
    fn honours_enterprise_server_url() {
        let context = RunContext::from_lookup(lookup_in(&[
            ("GITHUB_SERVER_URL", "https://git.corp.example/"),
            ("GITHUB_REPOSITORY", "platform/api"),
            ("GITHUB_RUN_ID", "42"),
        ]))
        .unwrap();

        assert_eq!(context.run_url(), "https://git.corp.example/platform/api/actions/runs/42");
    }

    #[test]
    fn rejects_repository_without_owner() {
        let error = RunContext::from_lookup(lookup_in(&[
            ("GITHUB_REPOSITORY", "widgets"),
            ("GITHUB_RUN_ID", "1"),
        ]))
        .unwrap_err();

        assert!(matches!(error, CoreError::InvalidInput { .. }));
        assert!(error.to_string().contains("GITHUB_REPOSITORY"));
    }

    #[test]
    fn rejects_missing_run_id() {
        let error =
            RunContext::from_lookup(lookup_in(&[("GITHUB_REPOSITORY", "acme/widgets")]))
                .unwrap_err();

        assert!(matches!(error, CoreError::InvalidInput { .. }));
        assert!(error.to_string().contains("GITHUB_RUN_ID"));
    }
}
