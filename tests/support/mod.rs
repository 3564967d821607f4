// ABOUTME: Test support utilities.
// ABOUTME: In-memory identity, plugin, stack, asset, diff and prompt collaborators that record what they were asked.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use stackhand::assembly::{AssetKind, AssetManifestEntry, StackArtifact, Template};
use stackhand::cloud::{
    AccountInfo, AssetOps, AssumeRoleRequest, CloudClient, CloudError, DeployOutcome,
    DeployStackRequest, IdentityOps, RequireApproval, RollbackResult, RollbackStackRequest,
    StackOps, TemplateDiff,
};
use stackhand::credentials::{
    CredentialBroker, CredentialSettings, CredentialSource, Credentials, Mode,
    PluginCredentialResolver, PluginCredentials, SharedProvider, StaticProvider,
};
use stackhand::deploy::{Deployments, Prompter, Toolkit};
use stackhand::types::{AccountId, Environment, StackName};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;

pub const ACCOUNT: &str = "111111111111";
pub const OTHER_ACCOUNT: &str = "222222222222";
pub const REGION: &str = "eu-west-1";

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter =
            EnvFilter::from_default_env().add_directive("stackhand=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

// =============================================================================
// Execution trace
// =============================================================================

/// Ordered log of collaborator calls shared by all mocks in a test.
#[derive(Default)]
pub struct Trace {
    events: Mutex<Vec<String>>,
}

impl Trace {
    pub fn record(&self, event: impl Into<String>) {
        self.events.lock().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    pub fn position(&self, event: &str) -> Option<usize> {
        self.events.lock().iter().position(|e| e == event)
    }

    pub fn count(&self, event: &str) -> usize {
        self.events.lock().iter().filter(|e| *e == event).count()
    }
}

// =============================================================================
// Identity
// =============================================================================

pub struct MockIdentity {
    account: Option<AccountInfo>,
    default_error: Option<CloudError>,
    assume_error: Option<CloudError>,
    pub default_calls: AtomicUsize,
    pub assume_calls: AtomicUsize,
}

impl MockIdentity {
    /// Ambient credentials belong to `account`.
    pub fn new(account: &str) -> Self {
        Self {
            account: Some(AccountInfo::new(account, "aws")),
            default_error: None,
            assume_error: None,
            default_calls: AtomicUsize::new(0),
            assume_calls: AtomicUsize::new(0),
        }
    }

    /// No ambient credentials at all.
    pub fn anonymous() -> Self {
        Self {
            account: None,
            ..Self::new(ACCOUNT)
        }
    }

    pub fn failing_default(mut self, error: CloudError) -> Self {
        self.default_error = Some(error);
        self
    }

    pub fn failing_assume(mut self, error: CloudError) -> Self {
        self.assume_error = Some(error);
        self
    }
}

pub fn default_credentials() -> Credentials {
    Credentials::new("AKIADEFAULT", "default-secret")
}

pub fn assumed_credentials() -> Credentials {
    Credentials::new("AKIAASSUMED", "assumed-secret").with_session_token("session")
}

#[async_trait]
impl IdentityOps for MockIdentity {
    fn default_region(&self) -> String {
        REGION.to_string()
    }

    async fn default_credentials(&self) -> Result<SharedProvider, CloudError> {
        self.default_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = &self.default_error {
            return Err(e.clone());
        }
        Ok(StaticProvider::shared(default_credentials()))
    }

    async fn current_account(
        &self,
        _credentials: &SharedProvider,
    ) -> Result<AccountInfo, CloudError> {
        self.account
            .clone()
            .ok_or_else(|| CloudError::access_denied("no ambient identity"))
    }

    async fn assume_role(
        &self,
        _base: &SharedProvider,
        _request: &AssumeRoleRequest,
        _region: &str,
    ) -> Result<Credentials, CloudError> {
        self.assume_calls.fetch_add(1, Ordering::SeqCst);
        match &self.assume_error {
            Some(e) => Err(e.clone()),
            None => Ok(assumed_credentials()),
        }
    }
}

// =============================================================================
// Credential plugins
// =============================================================================

pub struct MockPlugin {
    name: String,
    available: Result<bool, CloudError>,
    accounts: HashSet<String>,
    provider_error: Option<CloudError>,
    credentials: Credentials,
    pub availability_checks: AtomicUsize,
    pub capability_checks: AtomicUsize,
    pub provider_calls: AtomicUsize,
}

impl MockPlugin {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            available: Ok(true),
            accounts: HashSet::new(),
            provider_error: None,
            credentials: Credentials::new(format!("AKIA{}", name.to_uppercase()), "plugin-secret"),
            availability_checks: AtomicUsize::new(0),
            capability_checks: AtomicUsize::new(0),
            provider_calls: AtomicUsize::new(0),
        }
    }

    pub fn serving(mut self, account: &str) -> Self {
        self.accounts.insert(account.to_string());
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.available = Ok(false);
        self
    }

    pub fn broken_availability(mut self, error: CloudError) -> Self {
        self.available = Err(error);
        self
    }

    pub fn failing_provider(mut self, error: CloudError) -> Self {
        self.provider_error = Some(error);
        self
    }

    pub fn access_key(&self) -> &str {
        &self.credentials.access_key_id
    }
}

#[async_trait]
impl CredentialSource for MockPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    async fn is_available(&self) -> Result<bool, CloudError> {
        self.availability_checks.fetch_add(1, Ordering::SeqCst);
        self.available.clone()
    }

    async fn can_provide_credentials(&self, account: &AccountId) -> Result<bool, CloudError> {
        self.capability_checks.fetch_add(1, Ordering::SeqCst);
        Ok(self.accounts.contains(account.as_str()))
    }

    async fn get_provider(
        &self,
        _account: &AccountId,
        _mode: Mode,
    ) -> Result<PluginCredentials, CloudError> {
        self.provider_calls.fetch_add(1, Ordering::SeqCst);
        match &self.provider_error {
            Some(e) => Err(e.clone()),
            None => Ok(PluginCredentials::Static(self.credentials.clone())),
        }
    }
}

pub fn plugins(sources: Vec<Arc<MockPlugin>>) -> PluginCredentialResolver {
    let mut resolver = PluginCredentialResolver::new(Duration::from_secs(300));
    for source in sources {
        resolver.register(source);
    }
    resolver
}

// =============================================================================
// Stacks
// =============================================================================

/// Provisioning mock. Scripted outcomes are consumed in order; the last one repeats.
pub struct MockStacks {
    trace: Arc<Trace>,
    outcomes: Mutex<HashMap<String, VecDeque<DeployOutcome>>>,
    deploy_errors: Mutex<HashMap<String, CloudError>>,
    rollback_results: Mutex<HashMap<String, Result<RollbackResult, CloudError>>>,
    existing: Mutex<HashSet<String>>,
    deploy_delay: Duration,
    pub requests: Mutex<Vec<DeployStackRequest>>,
    pub clients: Mutex<Vec<(String, String)>>,
}

impl MockStacks {
    pub fn new(trace: Arc<Trace>) -> Self {
        Self {
            trace,
            outcomes: Mutex::new(HashMap::new()),
            deploy_errors: Mutex::new(HashMap::new()),
            rollback_results: Mutex::new(HashMap::new()),
            existing: Mutex::new(HashSet::new()),
            deploy_delay: Duration::from_millis(5),
            requests: Mutex::new(Vec::new()),
            clients: Mutex::new(Vec::new()),
        }
    }

    pub fn script(&self, stack: &str, outcomes: Vec<DeployOutcome>) {
        self.outcomes
            .lock()
            .insert(stack.to_string(), outcomes.into_iter().collect());
    }

    pub fn fail_deploy(&self, stack: &str, error: CloudError) {
        self.deploy_errors.lock().insert(stack.to_string(), error);
    }

    pub fn rollback_result(&self, stack: &str, result: Result<RollbackResult, CloudError>) {
        self.rollback_results
            .lock()
            .insert(stack.to_string(), result);
    }

    pub fn mark_existing(&self, stack: &str) {
        self.existing.lock().insert(stack.to_string());
    }

    pub fn deploy_count(&self, stack: &str) -> usize {
        self.trace.count(&format!("deploy-start:{stack}"))
    }

    fn next_outcome(&self, stack: &str) -> DeployOutcome {
        let mut outcomes = self.outcomes.lock();
        match outcomes.get_mut(stack) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if queue.len() == 1 => queue[0].clone(),
            _ => did_deploy(stack, &[]),
        }
    }
}

pub fn did_deploy(stack: &str, outputs: &[(&str, &str)]) -> DeployOutcome {
    DeployOutcome::DidDeploy {
        outputs: outputs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        stack_arn: format!("arn:aws:cloudformation:{REGION}:{ACCOUNT}:stack/{stack}/1"),
        no_op: false,
    }
}

pub fn no_op(stack: &str) -> DeployOutcome {
    DeployOutcome::DidDeploy {
        outputs: BTreeMap::new(),
        stack_arn: format!("arn:aws:cloudformation:{REGION}:{ACCOUNT}:stack/{stack}/1"),
        no_op: true,
    }
}

#[async_trait]
impl StackOps for MockStacks {
    async fn deploy_stack(
        &self,
        client: &CloudClient,
        request: &DeployStackRequest,
    ) -> Result<DeployOutcome, CloudError> {
        let name = request.stack.name.to_string();
        self.trace.record(format!("deploy-start:{name}"));
        self.requests.lock().push(request.clone());
        self.clients
            .lock()
            .push((name.clone(), client.source.clone()));

        tokio::time::sleep(self.deploy_delay).await;

        if let Some(e) = self.deploy_errors.lock().get(&name) {
            self.trace.record(format!("deploy-failed:{name}"));
            return Err(e.clone());
        }

        let outcome = self.next_outcome(&name);
        self.trace.record(format!("deploy-end:{name}"));
        Ok(outcome)
    }

    async fn rollback_stack(
        &self,
        _client: &CloudClient,
        request: &RollbackStackRequest,
    ) -> Result<RollbackResult, CloudError> {
        let name = request.stack.to_string();
        self.trace.record(format!("rollback:{name}"));
        self.rollback_results
            .lock()
            .get(&name)
            .cloned()
            .unwrap_or(Ok(RollbackResult::default()))
    }

    async fn destroy_stack(
        &self,
        _client: &CloudClient,
        stack: &StackName,
        _role_arn: Option<&str>,
    ) -> Result<(), CloudError> {
        self.trace.record(format!("destroy:{stack}"));
        self.existing.lock().remove(stack.as_str());
        Ok(())
    }

    async fn stack_exists(
        &self,
        _client: &CloudClient,
        stack: &StackName,
    ) -> Result<bool, CloudError> {
        Ok(self.existing.lock().contains(stack.as_str()))
    }

    async fn read_current_template(
        &self,
        _client: &CloudClient,
        _stack: &StackName,
    ) -> Result<Template, CloudError> {
        Ok(Template::default())
    }
}

// =============================================================================
// Assets
// =============================================================================

pub struct MockAssets {
    trace: Arc<Trace>,
    published: Mutex<HashSet<String>>,
    build_errors: Mutex<HashMap<String, CloudError>>,
    delay: Mutex<Duration>,
    in_flight: AtomicUsize,
    pub max_in_flight_publishes: AtomicUsize,
}

impl MockAssets {
    pub fn new(trace: Arc<Trace>) -> Self {
        Self {
            trace,
            published: Mutex::new(HashSet::new()),
            build_errors: Mutex::new(HashMap::new()),
            delay: Mutex::new(Duration::from_millis(2)),
            in_flight: AtomicUsize::new(0),
            max_in_flight_publishes: AtomicUsize::new(0),
        }
    }

    pub fn mark_published(&self, asset: &str) {
        self.published.lock().insert(asset.to_string());
    }

    pub fn fail_build(&self, asset: &str, error: CloudError) {
        self.build_errors.lock().insert(asset.to_string(), error);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    fn delay(&self) -> Duration {
        *self.delay.lock()
    }
}

#[async_trait]
impl AssetOps for MockAssets {
    async fn build_asset(
        &self,
        asset: &AssetManifestEntry,
        _stack: &StackArtifact,
    ) -> Result<(), CloudError> {
        let id = asset.id.as_str();
        self.trace.record(format!("build-start:{id}"));
        tokio::time::sleep(self.delay()).await;
        if let Some(e) = self.build_errors.lock().get(id) {
            return Err(e.clone());
        }
        self.trace.record(format!("build-end:{id}"));
        Ok(())
    }

    async fn publish_asset(
        &self,
        _client: &CloudClient,
        asset: &AssetManifestEntry,
    ) -> Result<(), CloudError> {
        let id = asset.id.as_str();
        self.trace.record(format!("publish-start:{id}"));
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight_publishes
            .fetch_max(running, Ordering::SeqCst);
        tokio::time::sleep(self.delay()).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.published.lock().insert(id.to_string());
        self.trace.record(format!("publish-end:{id}"));
        Ok(())
    }

    async fn is_asset_published(
        &self,
        _client: &CloudClient,
        asset: &AssetManifestEntry,
    ) -> Result<bool, CloudError> {
        Ok(self.published.lock().contains(asset.id.as_str()))
    }
}

// =============================================================================
// Diff and prompts
// =============================================================================

pub struct MockDiff {
    pub broadening: bool,
}

impl TemplateDiff for MockDiff {
    fn requires_approval(
        &self,
        _current: &Template,
        _desired: &Template,
        level: RequireApproval,
    ) -> bool {
        level != RequireApproval::Never && self.broadening
    }
}

pub struct ScriptedPrompter {
    pub interactive: bool,
    pub answer: bool,
    pub questions: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(interactive: bool, answer: bool) -> Self {
        Self {
            interactive,
            answer,
            questions: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    async fn confirm(&self, question: &str) -> std::io::Result<bool> {
        self.questions.lock().push(question.to_string());
        Ok(self.answer)
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn env() -> Environment {
    Environment::new(ACCOUNT, REGION)
}

/// Template with `resources` placeholder resources.
pub fn template(resources: usize) -> Template {
    let resources: serde_json::Map<String, serde_json::Value> = (0..resources)
        .map(|i| (format!("Resource{i}"), json!({ "Type": "AWS::SNS::Topic" })))
        .collect();
    Template::new(json!({ "Resources": resources }))
}

pub fn stack(name: &str) -> StackArtifact {
    StackArtifact::new(StackName::new(name).unwrap(), env(), template(1))
}

pub fn asset(id: &str) -> AssetManifestEntry {
    AssetManifestEntry::new(
        id,
        AssetKind::File,
        format!("build/{id}.zip"),
        format!("assets-bucket/{id}.zip"),
    )
}

pub fn name(stack: &str) -> StackName {
    StackName::new(stack).unwrap()
}

/// Every collaborator a toolkit needs, wired to one trace.
pub struct Harness {
    pub trace: Arc<Trace>,
    pub identity: Arc<MockIdentity>,
    pub stacks: Arc<MockStacks>,
    pub assets: Arc<MockAssets>,
    pub prompter: Arc<ScriptedPrompter>,
    pub diff: Arc<MockDiff>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_identity(MockIdentity::new(ACCOUNT))
    }

    pub fn with_identity(identity: MockIdentity) -> Self {
        init_tracing();
        let trace = Arc::new(Trace::default());
        Self {
            identity: Arc::new(identity),
            stacks: Arc::new(MockStacks::new(trace.clone())),
            assets: Arc::new(MockAssets::new(trace.clone())),
            prompter: Arc::new(ScriptedPrompter::new(false, false)),
            diff: Arc::new(MockDiff { broadening: false }),
            trace,
        }
    }

    pub fn with_prompter(mut self, prompter: ScriptedPrompter) -> Self {
        self.prompter = Arc::new(prompter);
        self
    }

    pub fn with_diff(mut self, diff: MockDiff) -> Self {
        self.diff = Arc::new(diff);
        self
    }

    pub fn broker(&self, plugins: PluginCredentialResolver) -> Arc<CredentialBroker> {
        Arc::new(CredentialBroker::new(
            self.identity.clone(),
            plugins,
            &CredentialSettings::default(),
        ))
    }

    pub fn toolkit(&self) -> Toolkit {
        self.toolkit_with(PluginCredentialResolver::new(Duration::from_secs(300)))
    }

    pub fn toolkit_with(&self, plugins: PluginCredentialResolver) -> Toolkit {
        let deployments = Arc::new(Deployments::new(
            self.broker(plugins),
            self.stacks.clone(),
            self.assets.clone(),
        ));
        Toolkit::new(deployments, self.prompter.clone(), self.diff.clone())
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
