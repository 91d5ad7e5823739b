//! Tag-invalidated query cache over a [`TaskService`].
//!
//! Every endpoint + argument pair is one cache entry. Resolved entries
//! carry tags; mutations invalidate by tag, which marks matching entries
//! stale. A stale entry keeps serving its old value until the next
//! observation, which re-fetches. Nothing is ever re-fetched eagerly.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use taskdeck_core::project::{CreateProject, Project};
use taskdeck_core::search::SearchResults;
use taskdeck_core::task::{CreateTask, DeletedTask, Status, Task, UpdateTask};
use taskdeck_core::team::Team;
use taskdeck_core::user::{CreateUser, User};
use taskdeck_service::{ServiceError, TaskService};

/// Invalidation tag. The broad variants cover an entity family; `Task`
/// pins the cached lists one task appears in, so moving or editing a
/// single task only disturbs the lists that contain it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Projects,
    Tasks,
    Users,
    Teams,
    Task(i64),
}

/// Identity of one cached query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum QueryKey {
    TasksByProject(i64),
    TasksByUser(i64),
    Projects,
    Users,
    Teams,
    Search(String),
}

/// The family tag a query belongs to regardless of its result. A failed
/// fetch is linked under this tag so a later mutation can recover it.
fn family_tag(key: &QueryKey) -> Option<Tag> {
    match key {
        QueryKey::TasksByProject(_) | QueryKey::TasksByUser(_) => Some(Tag::Tasks),
        QueryKey::Projects => Some(Tag::Projects),
        QueryKey::Users => Some(Tag::Users),
        QueryKey::Teams => Some(Tag::Teams),
        QueryKey::Search(_) => None,
    }
}

/// The three phases a cached query can be observed in.
#[derive(Debug, Clone)]
pub enum QueryState<T> {
    /// A fetch is in flight and no earlier value exists.
    Pending,
    Ready(T),
    /// The last fetch failed. Served as-is until an invalidation.
    Failed(ServiceError),
}

impl<T> QueryState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, QueryState::Pending)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            QueryState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ServiceError> {
        match self {
            QueryState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Clone)]
enum CachedValue {
    Tasks(Vec<Task>),
    Projects(Vec<Project>),
    Users(Vec<User>),
    Teams(Vec<Team>),
    Search(SearchResults),
}

enum EntryState {
    Pending,
    Ready(CachedValue),
    Failed(ServiceError),
}

struct Entry {
    state: EntryState,
    tags: Vec<Tag>,
    stale: bool,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<QueryKey, Entry>,
    tag_index: HashMap<Tag, HashSet<QueryKey>>,
}

impl CacheInner {
    /// Replaces whatever is under `key` with a fresh Pending entry. Tags
    /// are attached only when a result lands, so the old links go first.
    fn begin(&mut self, key: &QueryKey) {
        self.unlink(key);
        self.entries.insert(
            key.clone(),
            Entry {
                state: EntryState::Pending,
                tags: Vec::new(),
                stale: false,
            },
        );
    }

    fn settle_ready(&mut self, key: QueryKey, value: CachedValue, tags: Vec<Tag>) {
        for tag in &tags {
            self.tag_index.entry(*tag).or_default().insert(key.clone());
        }
        self.entries.insert(
            key,
            Entry {
                state: EntryState::Ready(value),
                tags,
                stale: false,
            },
        );
    }

    fn settle_failed(&mut self, key: QueryKey, err: ServiceError) {
        let tags: Vec<Tag> = family_tag(&key).into_iter().collect();
        for tag in &tags {
            self.tag_index.entry(*tag).or_default().insert(key.clone());
        }
        self.entries.insert(
            key,
            Entry {
                state: EntryState::Failed(err),
                tags,
                stale: false,
            },
        );
    }

    fn unlink(&mut self, key: &QueryKey) {
        let tags = match self.entries.get(key) {
            Some(entry) => entry.tags.clone(),
            None => return,
        };
        for tag in tags {
            if let Some(keys) = self.tag_index.get_mut(&tag) {
                keys.remove(key);
                if keys.is_empty() {
                    self.tag_index.remove(&tag);
                }
            }
        }
    }

    fn mark_stale(&mut self, tags: &[Tag]) {
        for tag in tags {
            let Some(keys) = self.tag_index.get(tag) else {
                continue;
            };
            for key in keys {
                if let Some(entry) = self.entries.get_mut(key) {
                    entry.stale = true;
                }
            }
        }
    }
}

/// Clears a Pending entry if the observing future is dropped before its
/// fetch settles, so the next observation starts over instead of finding
/// a Pending entry nothing will ever resolve.
struct PendingReset<'a> {
    cache: &'a Mutex<CacheInner>,
    key: Option<QueryKey>,
}

impl PendingReset<'_> {
    fn disarm(mut self) {
        self.key = None;
    }
}

impl Drop for PendingReset<'_> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            let mut inner = self.cache.lock().unwrap();
            if let Some(entry) = inner.entries.get(&key) {
                if matches!(entry.state, EntryState::Pending) {
                    inner.entries.remove(&key);
                }
            }
        }
    }
}

/// Client-side cache over any [`TaskService`] transport.
///
/// Queries go through the cache; mutations go straight to the service
/// and invalidate tags on success. An expired session on any call raises
/// the sign-out flag instead of being retried.
pub struct QueryClient<S> {
    service: S,
    inner: Mutex<CacheInner>,
    signed_out: AtomicBool,
}

impl<S: TaskService> QueryClient<S> {
    pub fn new(service: S) -> Self {
        QueryClient {
            service,
            inner: Mutex::new(CacheInner::default()),
            signed_out: AtomicBool::new(false),
        }
    }

    /// True once any call has failed with an invalid or expired session.
    /// Views route to sign-in on this instead of rendering the error.
    pub fn signed_out(&self) -> bool {
        self.signed_out.load(Ordering::SeqCst)
    }

    /// Marks every entry linked to any of `tags` stale. Stale entries
    /// re-fetch on their next observation.
    pub fn invalidate(&self, tags: &[Tag]) {
        self.inner.lock().unwrap().mark_stale(tags);
    }

    // ---- queries ----

    pub async fn tasks_by_project(&self, project_id: i64) -> QueryState<Vec<Task>> {
        self.observe(
            QueryKey::TasksByProject(project_id),
            async move {
                let tasks = self.service.list_tasks_by_project(project_id).await?;
                let tags = task_list_tags(&tasks);
                Ok((tasks, tags))
            },
            CachedValue::Tasks,
            |value| match value {
                CachedValue::Tasks(tasks) => Some(tasks.clone()),
                _ => None,
            },
        )
        .await
    }

    pub async fn tasks_by_user(&self, user_id: i64) -> QueryState<Vec<Task>> {
        self.observe(
            QueryKey::TasksByUser(user_id),
            async move {
                let tasks = self.service.list_tasks_by_user(user_id).await?;
                let tags = task_list_tags(&tasks);
                Ok((tasks, tags))
            },
            CachedValue::Tasks,
            |value| match value {
                CachedValue::Tasks(tasks) => Some(tasks.clone()),
                _ => None,
            },
        )
        .await
    }

    pub async fn projects(&self) -> QueryState<Vec<Project>> {
        self.observe(
            QueryKey::Projects,
            async move {
                let projects = self.service.list_projects().await?;
                Ok((projects, vec![Tag::Projects]))
            },
            CachedValue::Projects,
            |value| match value {
                CachedValue::Projects(projects) => Some(projects.clone()),
                _ => None,
            },
        )
        .await
    }

    pub async fn users(&self) -> QueryState<Vec<User>> {
        self.observe(
            QueryKey::Users,
            async move {
                let users = self.service.list_users().await?;
                Ok((users, vec![Tag::Users]))
            },
            CachedValue::Users,
            |value| match value {
                CachedValue::Users(users) => Some(users.clone()),
                _ => None,
            },
        )
        .await
    }

    pub async fn teams(&self) -> QueryState<Vec<Team>> {
        self.observe(
            QueryKey::Teams,
            async move {
                let teams = self.service.list_teams().await?;
                Ok((teams, vec![Tag::Teams]))
            },
            CachedValue::Teams,
            |value| match value {
                CachedValue::Teams(teams) => Some(teams.clone()),
                _ => None,
            },
        )
        .await
    }

    /// Cached per query string. Search results carry no tags; a repeat
    /// of the same text answers from cache.
    pub async fn search(&self, query: &str) -> QueryState<SearchResults> {
        let text = query.to_string();
        self.observe(
            QueryKey::Search(text.clone()),
            async move {
                let results = self.service.search(&text).await?;
                Ok((results, Vec::new()))
            },
            CachedValue::Search,
            |value| match value {
                CachedValue::Search(results) => Some(results.clone()),
                _ => None,
            },
        )
        .await
    }

    // ---- mutations ----

    pub async fn create_task(&self, input: &CreateTask) -> Result<Task, ServiceError> {
        let task = self.track(self.service.create_task(input).await)?;
        self.invalidate(&[Tag::Tasks]);
        Ok(task)
    }

    /// Sets the task's workflow status. A board column drop reduces to
    /// this call.
    pub async fn move_task(&self, id: i64, status: Status) -> Result<Task, ServiceError> {
        let task = self.track(self.service.update_task_status(id, status).await)?;
        self.invalidate(&[Tag::Task(id)]);
        Ok(task)
    }

    pub async fn edit_task(&self, id: i64, update: &UpdateTask) -> Result<Task, ServiceError> {
        let task = self.track(self.service.edit_task(id, update).await)?;
        self.invalidate(&[Tag::Task(id)]);
        Ok(task)
    }

    pub async fn delete_task(&self, id: i64) -> Result<DeletedTask, ServiceError> {
        let ack = self.track(self.service.delete_task(id).await)?;
        self.invalidate(&[Tag::Task(id)]);
        Ok(ack)
    }

    pub async fn create_project(&self, input: &CreateProject) -> Result<Project, ServiceError> {
        let project = self.track(self.service.create_project(input).await)?;
        self.invalidate(&[Tag::Projects]);
        Ok(project)
    }

    /// First-login provisioning: resolve the signed-in identity to its
    /// user row, creating the row on first sight. A concurrent create
    /// answers with the existing row, so the conflict resolves to it.
    pub async fn resolve_auth_user(
        &self,
        cognito_id: &str,
        profile: &CreateUser,
    ) -> Result<User, ServiceError> {
        match self.track(self.service.get_user(cognito_id).await) {
            Ok(user) => Ok(user),
            Err(ServiceError::NotFound(_)) => {
                match self.track(self.service.create_user(profile).await) {
                    Ok(user) => {
                        self.invalidate(&[Tag::Users]);
                        Ok(user)
                    }
                    Err(ServiceError::Conflict(_)) => {
                        self.track(self.service.get_user(cognito_id).await)
                    }
                    Err(err) => Err(err),
                }
            }
            Err(err) => Err(err),
        }
    }

    // ---- internals ----

    /// One cache round for `key`. A fresh entry answers without polling
    /// `fetch` at all; otherwise the entry turns Pending, the fetch runs,
    /// and the outcome settles into the cache.
    async fn observe<T, Fut>(
        &self,
        key: QueryKey,
        fetch: Fut,
        wrap: fn(T) -> CachedValue,
        peek: impl Fn(&CachedValue) -> Option<T>,
    ) -> QueryState<T>
    where
        T: Clone,
        Fut: Future<Output = Result<(T, Vec<Tag>), ServiceError>>,
    {
        {
            let mut inner = self.inner.lock().unwrap();
            if let Some(entry) = inner.entries.get(&key) {
                if !entry.stale {
                    match &entry.state {
                        EntryState::Pending => return QueryState::Pending,
                        EntryState::Failed(err) => return QueryState::Failed(err.clone()),
                        EntryState::Ready(value) => {
                            if let Some(value) = peek(value) {
                                return QueryState::Ready(value);
                            }
                            // Key and value variant disagree; fall
                            // through and re-fetch.
                        }
                    }
                }
            }
            inner.begin(&key);
        }

        let reset = PendingReset {
            cache: &self.inner,
            key: Some(key.clone()),
        };
        let outcome = fetch.await;
        reset.disarm();

        match outcome {
            Ok((value, tags)) => {
                let mut inner = self.inner.lock().unwrap();
                inner.settle_ready(key, wrap(value.clone()), tags);
                QueryState::Ready(value)
            }
            Err(err) => {
                self.note_auth_failure(&err);
                let mut inner = self.inner.lock().unwrap();
                inner.settle_failed(key, err.clone());
                QueryState::Failed(err)
            }
        }
    }

    fn track<T>(&self, outcome: Result<T, ServiceError>) -> Result<T, ServiceError> {
        if let Err(err) = &outcome {
            self.note_auth_failure(err);
        }
        outcome
    }

    fn note_auth_failure(&self, err: &ServiceError) {
        if matches!(err, ServiceError::Auth(_)) {
            self.signed_out.store(true, Ordering::SeqCst);
        }
    }
}

/// A resolved task list is pinned by the family tag plus one tag per
/// contained task, so single-task mutations only stale the lists that
/// hold the task.
fn task_list_tags(tasks: &[Task]) -> Vec<Tag> {
    let mut tags = vec![Tag::Tasks];
    tags.extend(tasks.iter().map(|task| Tag::Task(task.id)));
    tags
}
