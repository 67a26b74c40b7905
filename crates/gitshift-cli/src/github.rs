//! GitHub GraphQL client implementing the core's `MigrationApi` seam.
//!
//! Thin transport plumbing: one POST per call, remote error messages
//! surfaced verbatim. The "already exists" rejection is classified here so
//! the core can treat it as an idempotent no-op.

use async_trait::async_trait;

use gitshift_core::prelude::{
    ApiError, MigrationApi, MigrationRequest, MigrationState, MigrationStatus, Secret,
};

pub const DEFAULT_GRAPHQL_ENDPOINT: &str = "https://api.github.com/graphql";

pub struct GithubApi {
    client: reqwest::Client,
    endpoint: String,
    token: Secret,
}

impl GithubApi {
    pub fn new(token: Secret) -> Self {
        Self::with_endpoint(token, DEFAULT_GRAPHQL_ENDPOINT)
    }

    pub fn with_endpoint(token: Secret, endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            token,
        }
    }

    async fn graphql(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        let payload = serde_json::json!({ "query": query, "variables": variables });
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.token.expose())
            .header(reqwest::header::USER_AGENT, "gitshift")
            .json(&payload)
            .send()
            .await
            .map_err(|err| ApiError::Transport(err.to_string()))?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|err| ApiError::Transport(err.to_string()))?;

        if let Some(message) = first_error_message(&body) {
            return Err(classify_remote_error(message));
        }
        Ok(body)
    }

    async fn organization_id(&self, github_org: &str) -> Result<String, ApiError> {
        let body = self
            .graphql(
                "query($login: String!) { organization(login: $login) { id } }",
                serde_json::json!({ "login": github_org }),
            )
            .await?;
        string_at(&body, "/data/organization/id")
    }
}

#[async_trait]
impl MigrationApi for GithubApi {
    async fn create_migration_source(&self, github_org: &str) -> Result<String, ApiError> {
        let owner_id = self.organization_id(github_org).await?;
        let body = self
            .graphql(
                "mutation($name: String!, $ownerId: ID!, $type: MigrationSourceType!) { \
                 createMigrationSource(input: { name: $name, ownerId: $ownerId, type: $type }) { \
                 migrationSource { id } } }",
                serde_json::json!({
                    "name": "gitshift-source",
                    "ownerId": owner_id,
                    "type": "GIT_SOURCE",
                }),
            )
            .await?;
        string_at(&body, "/data/createMigrationSource/migrationSource/id")
    }

    async fn start_migration(
        &self,
        source_id: &str,
        request: &MigrationRequest,
    ) -> Result<String, ApiError> {
        let owner_id = self.organization_id(&request.github_org).await?;
        let body = self
            .graphql(
                "mutation($sourceId: ID!, $ownerId: ID!, $sourceRepositoryUrl: URI!, \
                 $repositoryName: String!, $visibility: String!, $accessToken: String!, \
                 $githubPat: String!) { \
                 startRepositoryMigration(input: { sourceId: $sourceId, ownerId: $ownerId, \
                 sourceRepositoryUrl: $sourceRepositoryUrl, repositoryName: $repositoryName, \
                 targetRepoVisibility: $visibility, accessToken: $accessToken, \
                 githubPat: $githubPat, continueOnError: true }) { \
                 repositoryMigration { id } } }",
                serde_json::json!({
                    "sourceId": source_id,
                    "ownerId": owner_id,
                    "sourceRepositoryUrl": request.source_repo_url,
                    "repositoryName": request.github_repo,
                    "visibility": request.visibility.as_str().to_ascii_uppercase(),
                    "accessToken": request.credentials.source_pat.expose(),
                    "githubPat": request.credentials.github_pat.expose(),
                }),
            )
            .await?;
        string_at(&body, "/data/startRepositoryMigration/repositoryMigration/id")
    }

    async fn get_migration(&self, migration_id: &str) -> Result<MigrationStatus, ApiError> {
        let body = self
            .graphql(
                "query($id: ID!) { node(id: $id) { ... on Migration { \
                 id state failureReason migrationSource { url } } } }",
                serde_json::json!({ "id": migration_id }),
            )
            .await?;

        let state_str = string_at(&body, "/data/node/state")?;
        let failure_reason = body
            .pointer("/data/node/failureReason")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());
        let repository_url = body
            .pointer("/data/node/migrationSource/url")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        Ok(MigrationStatus {
            state: MigrationState::from_remote(&state_str),
            repository_url,
            failure_reason,
        })
    }
}

fn first_error_message(body: &serde_json::Value) -> Option<String> {
    body.get("errors")
        .and_then(|v| v.as_array())
        .and_then(|errors| errors.first())
        .and_then(|err| err.get("message"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

fn classify_remote_error(message: String) -> ApiError {
    if message.contains("already exists") {
        ApiError::AlreadyExists(message)
    } else {
        ApiError::Remote(message)
    }
}

fn string_at(body: &serde_json::Value, pointer: &str) -> Result<String, ApiError> {
    body.pointer(pointer)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| ApiError::Transport(format!("malformed response: missing {}", pointer)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_exists_rejection_is_classified() {
        let err = classify_remote_error(
            "A repository called fabrikam-gh/Tools-alpha already exists".to_string(),
        );
        assert!(matches!(err, ApiError::AlreadyExists(_)));
    }

    #[test]
    fn test_other_rejections_stay_remote_errors() {
        let err = classify_remote_error("Resource not accessible by integration".to_string());
        assert!(matches!(err, ApiError::Remote(_)));
    }

    #[test]
    fn test_error_message_extraction() {
        let body = serde_json::json!({
            "errors": [{ "message": "bad credentials" }]
        });
        assert_eq!(first_error_message(&body).as_deref(), Some("bad credentials"));
        assert_eq!(first_error_message(&serde_json::json!({ "data": {} })), None);
    }
}
