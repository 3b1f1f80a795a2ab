//! In-memory clients that record every call.

use async_trait::async_trait;
use github_client::{
    BranchProtectionPayload, Collaborator, Error as GitHubError, FileCreatePayload, Label,
    Repository, RepositoryClient, RepositoryCreatePayload, RepositoryPage, WebhookPayload,
    DEFAULT_LABELS,
};
use merge_check_client::MergeCheckClient;
use pullapprove_client::ApprovalPolicyClient;
use secrecy::SecretString;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::errors::ProvisionerResult;
use crate::hiring::RepositoryMirror;

/// A call observed by one of the mock clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateRepository(String),
    GetRepository(String),
    DeleteRepository(String),
    CreateFile {
        path: String,
        branch: String,
        content: String,
    },
    AddTeam(u64, String),
    AddCollaborator(String, String),
    CreateLabel(String),
    DeleteLabel(String),
    CreateWebhook(String),
    UpdateBranchProtection(String, Vec<String>),
    ListRepositories(u32),
    ListOutsideCollaborators(String),
    RemoveCollaborator(String, String),
    Register(String, String),
    EnableMergeCheck(u64),
    DisableMergeCheck(u64),
    ImpersonateApp,
    Mirror {
        source: String,
        target: String,
        reference: Option<String>,
    },
}

/// A shared, ordered log of calls across all mocks of a test.
#[derive(Debug, Default)]
pub struct CallLog {
    calls: Mutex<Vec<Call>>,
}

impl CallLog {
    pub fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| predicate(c)).count()
    }

    pub fn contains(&self, call: &Call) -> bool {
        self.calls.lock().unwrap().contains(call)
    }
}

#[derive(Debug, Default)]
struct GitHubState {
    repositories: HashMap<String, Repository>,
    labels: HashMap<String, BTreeSet<String>>,
    files: HashSet<(String, String)>,
    webhooks: HashSet<(String, String)>,
    outside_collaborators: HashMap<String, Vec<Collaborator>>,
    pages: Vec<RepositoryPage>,
    failing_teams: HashSet<u64>,
    failing_pages: HashSet<u32>,
    quota_exceeded: bool,
    next_id: u64,
}

/// A GitHub organization held in memory.
///
/// New repositories start with GitHub's default labels, like repositories
/// created with `auto_init`.
#[derive(Debug, Default)]
pub struct MockRepositoryClient {
    pub log: Arc<CallLog>,
    state: Mutex<GitHubState>,
}

impl MockRepositoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repository(self, repository: Repository) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.labels.insert(repository.name().to_string(), BTreeSet::new());
            state
                .repositories
                .insert(repository.name().to_string(), repository);
        }
        self
    }

    pub fn with_failing_team(self, team_id: u64) -> Self {
        self.state.lock().unwrap().failing_teams.insert(team_id);
        self
    }

    pub fn with_failing_page(self, page: u32) -> Self {
        self.state.lock().unwrap().failing_pages.insert(page);
        self
    }

    pub fn with_quota_exceeded(self) -> Self {
        self.state.lock().unwrap().quota_exceeded = true;
        self
    }

    pub fn with_file(self, repo: &str, path: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .files
            .insert((repo.to_string(), path.to_string()));
        self
    }

    /// Serves `pages` from `list_org_repositories`, page numbers starting at 1.
    pub fn with_pages(self, pages: Vec<RepositoryPage>) -> Self {
        self.state.lock().unwrap().pages = pages;
        self
    }

    pub fn with_outside_collaborators(self, repo: &str, logins: &[&str]) -> Self {
        let collaborators = logins
            .iter()
            .enumerate()
            .map(|(i, login)| Collaborator {
                id: i as u64 + 1,
                login: login.to_string(),
            })
            .collect();
        self.state
            .lock()
            .unwrap()
            .outside_collaborators
            .insert(repo.to_string(), collaborators);
        self
    }

    pub fn repository_exists(&self, name: &str) -> bool {
        self.state.lock().unwrap().repositories.contains_key(name)
    }

    pub fn labels(&self, repo: &str) -> BTreeSet<String> {
        self.state
            .lock()
            .unwrap()
            .labels
            .get(repo)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl RepositoryClient for MockRepositoryClient {
    async fn create_org_repository(
        &self,
        org_name: &str,
        payload: &RepositoryCreatePayload,
    ) -> Result<Repository, GitHubError> {
        self.log.push(Call::CreateRepository(payload.name.clone()));
        let mut state = self.state.lock().unwrap();
        if state.quota_exceeded {
            return Err(GitHubError::QuotaExceeded(
                "private repository limit reached".to_string(),
            ));
        }
        if state.repositories.contains_key(&payload.name) {
            return Err(GitHubError::AlreadyExists("Repository".to_string()));
        }

        state.next_id += 1;
        let repository = Repository::new(
            1000 + state.next_id,
            payload.name.clone(),
            format!("{org_name}/{}", payload.name),
            payload.private.unwrap_or(false),
        );
        let labels = if payload.auto_init.unwrap_or(false) {
            DEFAULT_LABELS.iter().map(|l| l.to_string()).collect()
        } else {
            BTreeSet::new()
        };
        state.labels.insert(payload.name.clone(), labels);
        state
            .repositories
            .insert(payload.name.clone(), repository.clone());
        Ok(repository)
    }

    async fn get_repository(&self, _owner: &str, repo: &str) -> Result<Repository, GitHubError> {
        self.log.push(Call::GetRepository(repo.to_string()));
        self.state
            .lock()
            .unwrap()
            .repositories
            .get(repo)
            .cloned()
            .ok_or_else(|| GitHubError::NotFound(format!("Repository {repo}")))
    }

    async fn delete_repository(&self, _owner: &str, repo: &str) -> Result<(), GitHubError> {
        self.log.push(Call::DeleteRepository(repo.to_string()));
        self.state
            .lock()
            .unwrap()
            .repositories
            .remove(repo)
            .map(drop)
            .ok_or_else(|| GitHubError::NotFound(format!("Repository {repo}")))
    }

    async fn create_file(
        &self,
        _owner: &str,
        repo: &str,
        file_path: &str,
        content: &FileCreatePayload,
    ) -> Result<(), GitHubError> {
        self.log.push(Call::CreateFile {
            path: file_path.to_string(),
            branch: content.branch.clone(),
            content: content.decoded_content().unwrap_or_default(),
        });
        let inserted = self
            .state
            .lock()
            .unwrap()
            .files
            .insert((repo.to_string(), file_path.to_string()));
        if inserted {
            Ok(())
        } else {
            Err(GitHubError::AlreadyExists(format!("File {file_path}")))
        }
    }

    async fn add_team_to_repository(
        &self,
        team_id: u64,
        _org: &str,
        _repo: &str,
        permission: &str,
    ) -> Result<(), GitHubError> {
        self.log.push(Call::AddTeam(team_id, permission.to_string()));
        if self.state.lock().unwrap().failing_teams.contains(&team_id) {
            return Err(GitHubError::RemoteError(format!(
                "connection reset while adding team {team_id}"
            )));
        }
        Ok(())
    }

    async fn add_collaborator(
        &self,
        _owner: &str,
        _repo: &str,
        username: &str,
        permission: &str,
    ) -> Result<(), GitHubError> {
        self.log.push(Call::AddCollaborator(
            username.to_string(),
            permission.to_string(),
        ));
        Ok(())
    }

    async fn create_label(&self, _owner: &str, repo: &str, label: &Label) -> Result<(), GitHubError> {
        self.log.push(Call::CreateLabel(label.name.clone()));
        let inserted = self
            .state
            .lock()
            .unwrap()
            .labels
            .entry(repo.to_string())
            .or_default()
            .insert(label.name.clone());
        if inserted {
            Ok(())
        } else {
            Err(GitHubError::AlreadyExists(format!("Label {}", label.name)))
        }
    }

    async fn delete_label(&self, _owner: &str, repo: &str, name: &str) -> Result<(), GitHubError> {
        self.log.push(Call::DeleteLabel(name.to_string()));
        let removed = self
            .state
            .lock()
            .unwrap()
            .labels
            .get_mut(repo)
            .is_some_and(|labels| labels.remove(name));
        if removed {
            Ok(())
        } else {
            Err(GitHubError::NotFound(format!("Label {name}")))
        }
    }

    async fn create_webhook(
        &self,
        _owner: &str,
        repo: &str,
        hook: &WebhookPayload,
    ) -> Result<(), GitHubError> {
        let url = hook
            .config
            .get("url")
            .and_then(|u| u.as_str())
            .unwrap_or_default()
            .to_string();
        self.log.push(Call::CreateWebhook(url.clone()));
        let inserted = self
            .state
            .lock()
            .unwrap()
            .webhooks
            .insert((repo.to_string(), url));
        if inserted {
            Ok(())
        } else {
            Err(GitHubError::AlreadyExists("Hook".to_string()))
        }
    }

    async fn update_branch_protection(
        &self,
        _owner: &str,
        _repo: &str,
        branch: &str,
        protection: &BranchProtectionPayload,
    ) -> Result<(), GitHubError> {
        self.log.push(Call::UpdateBranchProtection(
            branch.to_string(),
            protection.required_status_checks.contexts.clone(),
        ));
        Ok(())
    }

    async fn list_org_repositories(
        &self,
        _org: &str,
        page: u32,
        _per_page: u8,
    ) -> Result<RepositoryPage, GitHubError> {
        self.log.push(Call::ListRepositories(page));
        let state = self.state.lock().unwrap();
        if state.failing_pages.contains(&page) {
            return Err(GitHubError::ServerError {
                status: 502,
                message: "Bad Gateway".to_string(),
            });
        }
        Ok(page
            .checked_sub(1)
            .and_then(|i| state.pages.get(i as usize))
            .cloned()
            .unwrap_or_default())
    }

    async fn list_outside_collaborators(
        &self,
        _owner: &str,
        repo: &str,
    ) -> Result<Vec<Collaborator>, GitHubError> {
        self.log.push(Call::ListOutsideCollaborators(repo.to_string()));
        Ok(self
            .state
            .lock()
            .unwrap()
            .outside_collaborators
            .get(repo)
            .cloned()
            .unwrap_or_default())
    }

    async fn remove_collaborator(
        &self,
        _owner: &str,
        repo: &str,
        username: &str,
    ) -> Result<(), GitHubError> {
        self.log.push(Call::RemoveCollaborator(
            repo.to_string(),
            username.to_string(),
        ));
        if let Some(collaborators) = self
            .state
            .lock()
            .unwrap()
            .outside_collaborators
            .get_mut(repo)
        {
            collaborators.retain(|c| c.login != username);
        }
        Ok(())
    }
}

/// An approval-policy service that accepts every registration.
#[derive(Debug, Default)]
pub struct MockApprovalPolicyClient {
    pub log: Arc<CallLog>,
    pub unauthorized: bool,
}

#[async_trait]
impl ApprovalPolicyClient for MockApprovalPolicyClient {
    async fn register(&self, name: &str, org: &str) -> Result<(), pullapprove_client::Error> {
        self.log.push(Call::Register(name.to_string(), org.to_string()));
        if self.unauthorized {
            return Err(pullapprove_client::Error::Unauthorized);
        }
        Ok(())
    }
}

/// A merge-check service tracking which repositories have the check.
#[derive(Debug, Default)]
pub struct MockMergeCheckClient {
    pub log: Arc<CallLog>,
    pub enabled: Mutex<HashSet<u64>>,
    pub unauthorized: bool,
}

impl MockMergeCheckClient {
    pub fn with_enabled(self, repo_id: u64) -> Self {
        self.enabled.lock().unwrap().insert(repo_id);
        self
    }
}

#[async_trait]
impl MergeCheckClient for MockMergeCheckClient {
    async fn enable(&self, repo_id: u64) -> Result<(), merge_check_client::Error> {
        self.log.push(Call::EnableMergeCheck(repo_id));
        if self.enabled.lock().unwrap().insert(repo_id) {
            Ok(())
        } else {
            Err(merge_check_client::Error::AlreadyEnabled)
        }
    }

    async fn disable(&self, repo_id: u64) -> Result<(), merge_check_client::Error> {
        self.log.push(Call::DisableMergeCheck(repo_id));
        if self.enabled.lock().unwrap().remove(&repo_id) {
            Ok(())
        } else {
            Err(merge_check_client::Error::AlreadyNotEnabled)
        }
    }

    async fn impersonate_app(&self) -> Result<SecretString, merge_check_client::Error> {
        self.log.push(Call::ImpersonateApp);
        if self.unauthorized {
            return Err(merge_check_client::Error::Unauthorized);
        }
        Ok(SecretString::from("app-token".to_string()))
    }
}

/// A mirror that records what it was asked to copy.
#[derive(Debug, Default)]
pub struct MockMirror {
    pub log: Arc<CallLog>,
    pub fail: bool,
}

#[async_trait]
impl RepositoryMirror for MockMirror {
    async fn mirror(
        &self,
        source_url: &str,
        target_url: &str,
        reference: Option<&str>,
        _token: &SecretString,
    ) -> ProvisionerResult<()> {
        self.log.push(Call::Mirror {
            source: source_url.to_string(),
            target: target_url.to_string(),
            reference: reference.map(str::to_string),
        });
        if self.fail {
            return Err(crate::errors::ProvisionerError::Git(
                "failed to push to the repository: rejected".to_string(),
            ));
        }
        Ok(())
    }
}
