//! Bug service tests.
//!
//! Mock-based tests cover the lifecycle contracts in isolation; the
//! in-memory fake at the bottom exercises the full
//! create/authorize/update/delete flow across calls.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use bugtrail::domain::{
    Bug, BugFilter, BugPatch, BugPriority, BugStatus, NewBug, Principal, User, UserRole,
};
use bugtrail::errors::{AppError, AppResult};
use bugtrail::infra::{
    BugRepository, MockBugRepository, MockUserRepository, UnitOfWork, UserRepository,
};
use bugtrail::services::{BugService, BugTracker};

fn new_bug(title: &str, description: &str) -> NewBug {
    NewBug {
        title: title.to_string(),
        description: description.to_string(),
        status: BugStatus::Open,
        priority: BugPriority::High,
        assigned_to: None,
    }
}

fn stored_bug(id: Uuid, created_by: Uuid, status: BugStatus) -> Bug {
    Bug {
        id,
        title: "Crash on save".to_string(),
        description: "Editor crashes when saving".to_string(),
        status,
        priority: BugPriority::High,
        created_by,
        assigned_to: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn principal(id: Uuid, role: UserRole) -> Principal {
    Principal { id, role }
}

/// Test UnitOfWork wrapping mock repositories
struct TestUnitOfWork {
    users: Arc<MockUserRepository>,
    bugs: Arc<MockBugRepository>,
}

impl TestUnitOfWork {
    fn new(users: MockUserRepository, bugs: MockBugRepository) -> Self {
        Self {
            users: Arc::new(users),
            bugs: Arc::new(bugs),
        }
    }
}

impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn bugs(&self) -> Arc<dyn BugRepository> {
        self.bugs.clone()
    }
}

fn service(users: MockUserRepository, bugs: MockBugRepository) -> BugTracker<TestUnitOfWork> {
    BugTracker::new(Arc::new(TestUnitOfWork::new(users, bugs)))
}

// =============================================================================
// Mock-based contract tests
// =============================================================================

#[tokio::test]
async fn create_rejects_missing_fields_listing_all_of_them() {
    let svc = service(MockUserRepository::new(), MockBugRepository::new());
    let creator = principal(Uuid::new_v4(), UserRole::User);

    let result = svc.create_bug(new_bug("", "  "), &creator).await;

    let err = result.unwrap_err();
    let message = err.to_string();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(message.contains("title"));
    assert!(message.contains("description"));
}

#[tokio::test]
async fn create_sets_ownership_to_the_creator() {
    let creator_id = Uuid::new_v4();
    let mut bugs = MockBugRepository::new();
    bugs.expect_create()
        .withf(move |input, created_by| {
            input.title == "Crash on save" && *created_by == creator_id
        })
        .returning(|input, created_by| {
            let now = Utc::now();
            Ok(Bug {
                id: Uuid::new_v4(),
                title: input.title,
                description: input.description,
                status: input.status,
                priority: input.priority,
                created_by,
                assigned_to: input.assigned_to,
                created_at: now,
                updated_at: now,
            })
        });

    let svc = service(MockUserRepository::new(), bugs);
    let creator = principal(creator_id, UserRole::User);

    let bug = svc
        .create_bug(new_bug("Crash on save", "Editor crashes"), &creator)
        .await
        .unwrap();

    assert_eq!(bug.created_by, creator_id);
}

#[tokio::test]
async fn create_rejects_unknown_assignee() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().returning(|_| Ok(None));

    let svc = service(users, MockBugRepository::new());
    let creator = principal(Uuid::new_v4(), UserRole::User);

    let mut input = new_bug("Crash on save", "Editor crashes");
    input.assigned_to = Some(Uuid::new_v4());

    let result = svc.create_bug(input, &creator).await;
    assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
}

#[tokio::test]
async fn get_missing_bug_is_not_found() {
    let mut bugs = MockBugRepository::new();
    bugs.expect_find_by_id().returning(|_| Ok(None));

    let svc = service(MockUserRepository::new(), bugs);
    let result = svc.get_bug(Uuid::new_v4()).await;

    assert!(matches!(result.unwrap_err(), AppError::NotFound));
}

#[tokio::test]
async fn update_of_missing_bug_is_not_found_before_authorization() {
    let mut bugs = MockBugRepository::new();
    bugs.expect_find_by_id().returning(|_| Ok(None));

    let svc = service(MockUserRepository::new(), bugs);
    // Even a principal who would be forbidden sees NotFound for an
    // absent record: lookup comes first
    let someone = principal(Uuid::new_v4(), UserRole::User);

    let result = svc
        .update_bug(Uuid::new_v4(), BugPatch::default(), &someone)
        .await;
    assert!(matches!(result.unwrap_err(), AppError::NotFound));
}

#[tokio::test]
async fn update_by_non_owner_is_forbidden() {
    let owner = Uuid::new_v4();
    let mut bugs = MockBugRepository::new();
    bugs.expect_find_by_id()
        .returning(move |id| Ok(Some(stored_bug(id, owner, BugStatus::Open))));

    let svc = service(MockUserRepository::new(), bugs);
    let outsider = principal(Uuid::new_v4(), UserRole::User);

    let patch = BugPatch {
        status: Some(BugStatus::Resolved),
        ..Default::default()
    };
    let result = svc.update_bug(Uuid::new_v4(), patch, &outsider).await;

    assert!(matches!(result.unwrap_err(), AppError::Forbidden));
}

#[tokio::test]
async fn update_by_admin_succeeds_regardless_of_ownership() {
    let owner = Uuid::new_v4();
    let mut bugs = MockBugRepository::new();
    bugs.expect_find_by_id()
        .returning(move |id| Ok(Some(stored_bug(id, owner, BugStatus::Open))));
    bugs.expect_update()
        .withf(|_, patch| patch.status == Some(BugStatus::Resolved))
        .returning(move |id, patch| {
            let mut bug = stored_bug(id, owner, BugStatus::Open);
            if let Some(status) = patch.status {
                bug.status = status;
            }
            bug.updated_at = Utc::now();
            Ok(bug)
        });

    let svc = service(MockUserRepository::new(), bugs);
    let admin = principal(Uuid::new_v4(), UserRole::Admin);

    let patch = BugPatch {
        status: Some(BugStatus::Resolved),
        ..Default::default()
    };
    let bug = svc.update_bug(Uuid::new_v4(), patch, &admin).await.unwrap();

    assert_eq!(bug.status, BugStatus::Resolved);
}

#[tokio::test]
async fn delete_by_non_owner_is_forbidden() {
    let owner = Uuid::new_v4();
    let mut bugs = MockBugRepository::new();
    bugs.expect_find_by_id()
        .returning(move |id| Ok(Some(stored_bug(id, owner, BugStatus::Open))));

    let svc = service(MockUserRepository::new(), bugs);
    let outsider = principal(Uuid::new_v4(), UserRole::User);

    let result = svc.delete_bug(Uuid::new_v4(), &outsider).await;
    assert!(matches!(result.unwrap_err(), AppError::Forbidden));
}

#[tokio::test]
async fn delete_by_owner_succeeds() {
    let owner = Uuid::new_v4();
    let mut bugs = MockBugRepository::new();
    bugs.expect_find_by_id()
        .returning(move |id| Ok(Some(stored_bug(id, owner, BugStatus::Open))));
    bugs.expect_delete().returning(|_| Ok(()));

    let svc = service(MockUserRepository::new(), bugs);
    let result = svc.delete_bug(Uuid::new_v4(), &principal(owner, UserRole::User)).await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn list_passes_the_filter_through_unchanged() {
    let mut bugs = MockBugRepository::new();
    bugs.expect_list()
        .withf(|filter| {
            filter.status == Some(BugStatus::Open)
                && filter.priority == Some(BugPriority::High)
                && filter.assigned_to.is_none()
        })
        .returning(|_| Ok(vec![]));

    let svc = service(MockUserRepository::new(), bugs);
    let filter = BugFilter {
        status: Some(BugStatus::Open),
        priority: Some(BugPriority::High),
        assigned_to: None,
    };

    assert!(svc.list_bugs(&filter).await.unwrap().is_empty());
}

#[tokio::test]
async fn stats_are_counted_from_one_snapshot() {
    let me = Uuid::new_v4();
    let mut bugs = MockBugRepository::new();
    bugs.expect_list().returning(move |_| {
        let mut snapshot = vec![
            stored_bug(Uuid::new_v4(), me, BugStatus::Open),
            stored_bug(Uuid::new_v4(), me, BugStatus::Open),
            stored_bug(Uuid::new_v4(), me, BugStatus::Open),
            stored_bug(Uuid::new_v4(), me, BugStatus::Resolved),
        ];
        snapshot[0].assigned_to = Some(me);
        Ok(snapshot)
    });

    let svc = service(MockUserRepository::new(), bugs);
    let stats = svc.stats(&principal(me, UserRole::User)).await.unwrap();

    assert_eq!(stats.total_bugs, 4);
    assert_eq!(stats.open_bugs, 3);
    assert_eq!(stats.in_progress_bugs, 0);
    assert_eq!(stats.resolved_bugs, 1);
    assert_eq!(stats.assigned_to_me, 1);
    assert_eq!(
        stats.open_bugs + stats.in_progress_bugs + stats.resolved_bugs,
        stats.total_bugs
    );
}

// =============================================================================
// In-memory fake for cross-call flows
// =============================================================================

#[derive(Default)]
struct InMemoryBugs {
    bugs: Mutex<Vec<Bug>>,
}

impl InMemoryBugs {
    fn seeded(bugs: Vec<Bug>) -> Self {
        Self {
            bugs: Mutex::new(bugs),
        }
    }
}

#[async_trait]
impl BugRepository for InMemoryBugs {
    async fn create(&self, input: NewBug, created_by: Uuid) -> AppResult<Bug> {
        let now = Utc::now();
        let bug = Bug {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            status: input.status,
            priority: input.priority,
            created_by,
            assigned_to: input.assigned_to,
            created_at: now,
            updated_at: now,
        };
        self.bugs.lock().unwrap().push(bug.clone());
        Ok(bug)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Bug>> {
        Ok(self
            .bugs
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.id == id)
            .cloned())
    }

    async fn list(&self, filter: &BugFilter) -> AppResult<Vec<Bug>> {
        let mut matching: Vec<Bug> = self
            .bugs
            .lock()
            .unwrap()
            .iter()
            .filter(|b| {
                filter.status.map_or(true, |s| b.status == s)
                    && filter.priority.map_or(true, |p| b.priority == p)
                    && filter.assigned_to.map_or(true, |a| b.assigned_to == Some(a))
            })
            .cloned()
            .collect();
        // Newest first; the stable sort keeps insertion order for ties
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn update(&self, id: Uuid, patch: BugPatch) -> AppResult<Bug> {
        let mut bugs = self.bugs.lock().unwrap();
        let bug = bugs
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(AppError::NotFound)?;

        if let Some(title) = patch.title {
            bug.title = title;
        }
        if let Some(description) = patch.description {
            bug.description = description;
        }
        if let Some(status) = patch.status {
            bug.status = status;
        }
        if let Some(priority) = patch.priority {
            bug.priority = priority;
        }
        if let Some(assigned_to) = patch.assigned_to {
            bug.assigned_to = Some(assigned_to);
        }
        bug.updated_at = Utc::now();
        Ok(bug.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut bugs = self.bugs.lock().unwrap();
        let before = bugs.len();
        bugs.retain(|b| b.id != id);
        if bugs.len() == before {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

#[derive(Default)]
struct InMemoryUsers {
    users: Mutex<Vec<User>>,
}

impl InMemoryUsers {
    fn seeded(users: Vec<User>) -> Self {
        Self {
            users: Mutex::new(users),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, name: String, email: String, password_hash: String) -> AppResult<User> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            role: UserRole::User,
            created_at: now,
            updated_at: now,
        };
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }

    async fn update(
        &self,
        id: Uuid,
        name: Option<String>,
        email: Option<String>,
        password_hash: Option<String>,
    ) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(AppError::NotFound)?;

        if let Some(name) = name {
            user.name = name;
        }
        if let Some(email) = email {
            user.email = email;
        }
        if let Some(password_hash) = password_hash {
            user.password_hash = password_hash;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        Ok(self.users.lock().unwrap().iter().cloned().collect())
    }
}

struct FakeUnitOfWork {
    users: Arc<InMemoryUsers>,
    bugs: Arc<InMemoryBugs>,
}

impl UnitOfWork for FakeUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn bugs(&self) -> Arc<dyn BugRepository> {
        self.bugs.clone()
    }
}

fn seeded_user(email: &str, role: UserRole) -> User {
    User {
        id: Uuid::new_v4(),
        name: email.split('@').next().unwrap().to_string(),
        email: email.to_string(),
        password_hash: "hash".to_string(),
        role,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[tokio::test]
async fn ownership_scenario_across_the_full_lifecycle() {
    let alice = seeded_user("alice@x.com", UserRole::User);
    let bob = seeded_user("bob@x.com", UserRole::User);
    let root = seeded_user("root@x.com", UserRole::Admin);

    let uow = Arc::new(FakeUnitOfWork {
        users: Arc::new(InMemoryUsers::seeded(vec![
            alice.clone(),
            bob.clone(),
            root.clone(),
        ])),
        bugs: Arc::new(InMemoryBugs::default()),
    });
    let svc = BugTracker::new(uow);

    let alice_p = principal(alice.id, alice.role);
    let bob_p = principal(bob.id, bob.role);
    let root_p = principal(root.id, root.role);

    // Alice creates a bug; the stored record matches the input
    let created = svc
        .create_bug(new_bug("Crash on save", "Segfault in the save path"), &alice_p)
        .await
        .unwrap();
    assert_eq!(created.created_by, alice.id);

    let fetched = svc.get_bug(created.id).await.unwrap();
    assert_eq!(fetched.title, "Crash on save");
    assert_eq!(fetched.description, "Segfault in the save path");
    assert_eq!(fetched.status, BugStatus::Open);
    assert_eq!(fetched.priority, BugPriority::High);
    assert_eq!(fetched.created_by, alice.id);

    // Bob may read but not mutate
    assert!(svc.get_bug(created.id).await.is_ok());
    let patch = BugPatch {
        status: Some(BugStatus::Resolved),
        ..Default::default()
    };
    let denied = svc.update_bug(created.id, patch.clone(), &bob_p).await;
    assert!(matches!(denied.unwrap_err(), AppError::Forbidden));

    // The admin resolves it despite not owning it
    let resolved = svc.update_bug(created.id, patch, &root_p).await.unwrap();
    assert_eq!(resolved.status, BugStatus::Resolved);
    // Ownership survives every patch
    assert_eq!(resolved.created_by, alice.id);

    // Bob cannot delete either; Alice can
    let denied = svc.delete_bug(created.id, &bob_p).await;
    assert!(matches!(denied.unwrap_err(), AppError::Forbidden));
    svc.delete_bug(created.id, &alice_p).await.unwrap();
    let gone = svc.get_bug(created.id).await;
    assert!(matches!(gone.unwrap_err(), AppError::NotFound));
}

#[tokio::test]
async fn patch_merges_only_present_fields() {
    let alice = seeded_user("alice@x.com", UserRole::User);
    let uow = Arc::new(FakeUnitOfWork {
        users: Arc::new(InMemoryUsers::seeded(vec![alice.clone()])),
        bugs: Arc::new(InMemoryBugs::default()),
    });
    let svc = BugTracker::new(uow);
    let alice_p = principal(alice.id, alice.role);

    let created = svc
        .create_bug(new_bug("Crash on save", "Original description"), &alice_p)
        .await
        .unwrap();

    let patch = BugPatch {
        title: Some("Crash on autosave".to_string()),
        ..Default::default()
    };
    let updated = svc.update_bug(created.id, patch, &alice_p).await.unwrap();

    assert_eq!(updated.title, "Crash on autosave");
    assert_eq!(updated.description, "Original description");
    assert_eq!(updated.status, created.status);
    assert!(updated.updated_at >= created.updated_at);
}

fn bug_at(minutes_ago: i64, status: BugStatus, priority: BugPriority) -> Bug {
    let at = Utc::now() - Duration::minutes(minutes_ago);
    Bug {
        id: Uuid::new_v4(),
        title: format!("Bug from {} minutes ago", minutes_ago),
        description: "Description".to_string(),
        status,
        priority,
        created_by: Uuid::new_v4(),
        assigned_to: None,
        created_at: at,
        updated_at: at,
    }
}

#[tokio::test]
async fn listing_is_newest_first_and_filters_combine_with_and() {
    let old_open_high = bug_at(30, BugStatus::Open, BugPriority::High);
    let open_low = bug_at(20, BugStatus::Open, BugPriority::Low);
    let resolved_high = bug_at(10, BugStatus::Resolved, BugPriority::High);
    let fresh_open_high = bug_at(1, BugStatus::Open, BugPriority::High);

    let uow = Arc::new(FakeUnitOfWork {
        users: Arc::new(InMemoryUsers::default()),
        bugs: Arc::new(InMemoryBugs::seeded(vec![
            old_open_high.clone(),
            open_low.clone(),
            resolved_high.clone(),
            fresh_open_high.clone(),
        ])),
    });
    let svc = BugTracker::new(uow);

    // Unfiltered: strictly newest first
    let all = svc.list_bugs(&BugFilter::default()).await.unwrap();
    let ids: Vec<Uuid> = all.iter().map(|b| b.id).collect();
    assert_eq!(
        ids,
        vec![
            fresh_open_high.id,
            resolved_high.id,
            open_low.id,
            old_open_high.id
        ]
    );

    // Single-field filter
    let open = svc
        .list_bugs(&BugFilter {
            status: Some(BugStatus::Open),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(open.len(), 3);
    assert!(open.iter().all(|b| b.status == BugStatus::Open));

    // Combined filters are ANDed
    let open_and_high = svc
        .list_bugs(&BugFilter {
            status: Some(BugStatus::Open),
            priority: Some(BugPriority::High),
            ..Default::default()
        })
        .await
        .unwrap();
    let ids: Vec<Uuid> = open_and_high.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![fresh_open_high.id, old_open_high.id]);
}
