/// Project-scoped authorization
///
/// Every project endpoint declares which [`Permission`] classes it accepts.
/// Access is granted if any one of them holds (logical OR):
///
/// - **ParticipantOfProject**: the actor has an employee record in the project
///   and the request only reads
/// - **ManagerOfProject**: the actor is the project's manager, any request
/// - **ChiefOfEmployee**: the actor is the manager, or sits above a specific
///   target employee in the chief chain (see [`ChiefScope`])
///
/// The rules are pure functions over a loaded snapshot (project, the actor's
/// employee record and, for chief checks, the project [`Roster`]), so they
/// are tested without a database. [`authorize`] loads that snapshot and
/// evaluates it.
///
/// Lookup failures are reported apart from denial: a missing project or a
/// missing target employee is `ProjectNotFound` / `EmployeeNotFound`, while an
/// actor without an employee record is simply denied.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::auth::authorization::{
///     authorize, AccessKind, AccessRequest, AuthzPolicy, Permission,
/// };
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, actor: Uuid, project_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let access = authorize(
///     &pool,
///     AccessRequest::new(actor, project_id, AccessKind::Write)
///         .allow(&[Permission::ParticipantOfProject, Permission::ManagerOfProject]),
///     &AuthzPolicy::default(),
/// )
/// .await?;
///
/// assert_eq!(access.granted_by, Permission::ManagerOfProject);
/// # Ok(())
/// # }
/// ```

use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use super::hierarchy::{ChiefScope, Roster};
use crate::models::{employee::Employee, project::Project};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    #[error("Project {0} not found")]
    ProjectNotFound(Uuid),

    #[error("Employee {0} not found in project")]
    EmployeeNotFound(Uuid),

    #[error("You do not have permission to perform this action")]
    Denied,

    /// A chief check was declared without naming the target employee
    #[error("No target employee given for chief check")]
    MissingTarget,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Whether a request only reads (GET, and HEAD which axum routes to GET
/// handlers) or may mutate state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessKind {
    Read,
    Write,
}

/// Permission classes an endpoint can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ParticipantOfProject,
    ManagerOfProject,
    ChiefOfEmployee,
}

/// Participant or manager: the declaration shared by all project-scoped CRUD
pub const PARTICIPANT_OR_MANAGER: &[Permission] =
    &[Permission::ParticipantOfProject, Permission::ManagerOfProject];

/// Tunables for authorization decisions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthzPolicy {
    /// Reach of chief authority over a target employee
    pub chief_scope: ChiefScope,
}

/// One authorization question: may `actor` do `kind` in `project_id`?
#[derive(Debug, Clone, Copy)]
pub struct AccessRequest<'a> {
    pub actor: Uuid,
    pub project_id: Uuid,
    pub kind: AccessKind,
    pub permissions: &'a [Permission],

    /// Employee the action targets; required by `ChiefOfEmployee`
    pub target_employee: Option<Uuid>,
}

impl<'a> AccessRequest<'a> {
    pub fn new(actor: Uuid, project_id: Uuid, kind: AccessKind) -> Self {
        Self {
            actor,
            project_id,
            kind,
            permissions: &[],
            target_employee: None,
        }
    }

    /// Sets the accepted permission classes
    pub fn allow(mut self, permissions: &'a [Permission]) -> Self {
        self.permissions = permissions;
        self
    }

    /// Sets the target employee for chief checks
    pub fn target(mut self, employee_id: Uuid) -> Self {
        self.target_employee = Some(employee_id);
        self
    }
}

/// Data a decision is made from
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub project: &'a Project,

    /// The actor's employee record in `project`, if any
    pub actor_employee: Option<&'a Employee>,

    /// The project's employees; only needed for chief checks
    pub roster: Option<&'a Roster>,
}

/// Result of a successful [`authorize`] call
#[derive(Debug, Clone)]
pub struct ProjectAccess {
    pub project: Project,
    pub actor_employee: Option<Employee>,
    pub granted_by: Permission,
}

/// Participant rule: an employee of the project, reading
pub fn is_participant_of_project(
    project: &Project,
    actor_employee: Option<&Employee>,
    kind: AccessKind,
) -> bool {
    kind == AccessKind::Read && actor_employee.is_some_and(|e| e.project_id == project.id)
}

/// Manager rule: the project's manager, any access kind
pub fn is_manager_of_project(project: &Project, actor: Uuid) -> bool {
    project.is_managed_by(actor)
}

/// Chief rule: authority over one target employee
///
/// The manager always has it. Otherwise the actor's own employee record must
/// appear in the target's chief chain, within `scope`. An actor without an
/// employee record in the project is denied.
pub fn is_chief_of_employee(
    project: &Project,
    roster: &Roster,
    actor: Uuid,
    target_employee: Uuid,
    scope: ChiefScope,
) -> bool {
    if is_manager_of_project(project, actor) {
        return true;
    }

    match roster.by_user(actor) {
        Some(actor_employee) => roster.is_chief_of(actor_employee.id, target_employee, scope),
        None => false,
    }
}

fn check(
    permission: Permission,
    snapshot: &Snapshot<'_>,
    request: &AccessRequest<'_>,
    policy: &AuthzPolicy,
) -> Result<bool, AuthzError> {
    Ok(match permission {
        Permission::ParticipantOfProject => {
            is_participant_of_project(snapshot.project, snapshot.actor_employee, request.kind)
        }
        Permission::ManagerOfProject => is_manager_of_project(snapshot.project, request.actor),
        Permission::ChiefOfEmployee => {
            let (Some(roster), Some(target)) = (snapshot.roster, request.target_employee) else {
                return Err(AuthzError::MissingTarget);
            };
            is_chief_of_employee(
                snapshot.project,
                roster,
                request.actor,
                target,
                policy.chief_scope,
            )
        }
    })
}

/// Evaluates the declared permissions in order and returns the first that
/// grants access
///
/// # Errors
///
/// - `AuthzError::Denied` if none grants access (including an empty
///   declaration)
/// - `AuthzError::MissingTarget` if a chief check lacks its target or roster
pub fn decide(
    snapshot: &Snapshot<'_>,
    request: &AccessRequest<'_>,
    policy: &AuthzPolicy,
) -> Result<Permission, AuthzError> {
    for &permission in request.permissions {
        if check(permission, snapshot, request, policy)? {
            return Ok(permission);
        }
    }

    Err(AuthzError::Denied)
}

/// Loads the snapshot for `request` and decides it
///
/// # Errors
///
/// - `ProjectNotFound` if the project does not exist
/// - `MissingTarget` / `EmployeeNotFound` if a chief check is declared and
///   the target is absent or not an employee of this project
/// - `Denied` if no declared permission grants access
/// - `Database` on store failures
pub async fn authorize(
    pool: &PgPool,
    request: AccessRequest<'_>,
    policy: &AuthzPolicy,
) -> Result<ProjectAccess, AuthzError> {
    let project = Project::find_by_id(pool, request.project_id)
        .await?
        .ok_or(AuthzError::ProjectNotFound(request.project_id))?;

    let roster = if request.permissions.contains(&Permission::ChiefOfEmployee) {
        let target = request.target_employee.ok_or(AuthzError::MissingTarget)?;
        let roster = Roster::new(Employee::list_by_project(pool, project.id).await?);

        if !roster.contains(target) {
            return Err(AuthzError::EmployeeNotFound(target));
        }
        Some(roster)
    } else {
        None
    };

    let actor_employee = match &roster {
        Some(roster) => roster.by_user(request.actor).cloned(),
        None => Employee::find_by_user(pool, project.id, request.actor).await?,
    };

    let snapshot = Snapshot {
        project: &project,
        actor_employee: actor_employee.as_ref(),
        roster: roster.as_ref(),
    };

    match decide(&snapshot, &request, policy) {
        Ok(granted_by) => {
            debug!(
                actor = %request.actor,
                project_id = %request.project_id,
                kind = ?request.kind,
                granted_by = ?granted_by,
                "Access granted"
            );

            Ok(ProjectAccess {
                project,
                actor_employee,
                granted_by,
            })
        }
        Err(err) => {
            info!(
                actor = %request.actor,
                project_id = %request.project_id,
                kind = ?request.kind,
                permissions = ?request.permissions,
                target_employee = ?request.target_employee,
                error = %err,
                "Access denied"
            );
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    struct Fixture {
        project: Project,
        manager: Uuid,
        roster: Roster,
        /// user ids
        e1_user: Uuid,
        e2_user: Uuid,
        outsider: Uuid,
        /// employee ids
        e0: Uuid,
        e1: Uuid,
        e2: Uuid,
    }

    fn employee(project_id: Uuid, chief_id: Option<Uuid>) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            project_id,
            user_id: Uuid::new_v4(),
            position_id: Uuid::new_v4(),
            chief_id,
            created_at: Utc::now(),
        }
    }

    /// Manager M; E0 (no chief) <- E1 <- E2
    fn fixture() -> Fixture {
        let manager = Uuid::new_v4();
        let project = Project {
            id: Uuid::new_v4(),
            project_name: "Apollo".to_string(),
            manager_id: manager,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let e0 = employee(project.id, None);
        let e1 = employee(project.id, Some(e0.id));
        let e2 = employee(project.id, Some(e1.id));

        Fixture {
            manager,
            e1_user: e1.user_id,
            e2_user: e2.user_id,
            outsider: Uuid::new_v4(),
            e0: e0.id,
            e1: e1.id,
            e2: e2.id,
            roster: Roster::new([e0, e1, e2]),
            project,
        }
    }

    fn run(
        f: &Fixture,
        actor: Uuid,
        kind: AccessKind,
        permissions: &[Permission],
        target: Option<Uuid>,
        policy: AuthzPolicy,
    ) -> Result<Permission, AuthzError> {
        let snapshot = Snapshot {
            project: &f.project,
            actor_employee: f.roster.by_user(actor),
            roster: Some(&f.roster),
        };
        let mut request = AccessRequest::new(actor, f.project.id, kind).allow(permissions);
        request.target_employee = target;

        decide(&snapshot, &request, &policy)
    }

    const DIRECT: AuthzPolicy = AuthzPolicy {
        chief_scope: ChiefScope::Direct,
    };

    const TRANSITIVE: AuthzPolicy = AuthzPolicy {
        chief_scope: ChiefScope::Transitive,
    };

    #[test]
    fn test_manager_may_do_anything() {
        let f = fixture();

        for kind in [AccessKind::Read, AccessKind::Write] {
            assert!(is_manager_of_project(&f.project, f.manager));
            assert_eq!(
                run(&f, f.manager, kind, PARTICIPANT_OR_MANAGER, None, DIRECT).unwrap(),
                Permission::ManagerOfProject
            );
        }
    }

    #[test]
    fn test_participant_reads_but_does_not_write() {
        let f = fixture();
        let e1 = f.roster.get(f.e1);

        assert!(is_participant_of_project(&f.project, e1, AccessKind::Read));
        assert!(!is_participant_of_project(&f.project, e1, AccessKind::Write));

        assert_eq!(
            run(&f, f.e1_user, AccessKind::Read, PARTICIPANT_OR_MANAGER, None, DIRECT).unwrap(),
            Permission::ParticipantOfProject
        );
        assert!(matches!(
            run(&f, f.e1_user, AccessKind::Write, PARTICIPANT_OR_MANAGER, None, DIRECT),
            Err(AuthzError::Denied)
        ));
    }

    #[test]
    fn test_employee_of_other_project_is_not_a_participant() {
        let f = fixture();
        let foreign = employee(Uuid::new_v4(), None);

        assert!(!is_participant_of_project(&f.project, Some(&foreign), AccessKind::Read));
        assert!(!is_participant_of_project(&f.project, None, AccessKind::Read));
    }

    #[test]
    fn test_outsider_is_denied() {
        let f = fixture();

        for kind in [AccessKind::Read, AccessKind::Write] {
            assert!(matches!(
                run(&f, f.outsider, kind, PARTICIPANT_OR_MANAGER, None, AuthzPolicy::default()),
                Err(AuthzError::Denied)
            ));
        }
    }

    #[test]
    fn test_direct_chief_has_authority_over_subordinate() {
        let f = fixture();

        assert!(is_chief_of_employee(&f.project, &f.roster, f.e1_user, f.e2, ChiefScope::Direct));
        assert_eq!(
            run(
                &f,
                f.e1_user,
                AccessKind::Write,
                &[Permission::ChiefOfEmployee],
                Some(f.e2),
                AuthzPolicy::default()
            )
            .unwrap(),
            Permission::ChiefOfEmployee
        );
    }

    #[test]
    fn test_chief_rule_denies_outsider_and_subordinate() {
        let f = fixture();
        let chief = &[Permission::ChiefOfEmployee];

        assert!(matches!(
            run(&f, f.outsider, AccessKind::Write, chief, Some(f.e2), AuthzPolicy::default()),
            Err(AuthzError::Denied)
        ));
        assert!(matches!(
            run(&f, f.e2_user, AccessKind::Write, chief, Some(f.e1), TRANSITIVE),
            Err(AuthzError::Denied)
        ));
        assert!(matches!(
            run(&f, f.e2_user, AccessKind::Write, chief, Some(f.e2), TRANSITIVE),
            Err(AuthzError::Denied)
        ));
    }

    #[test]
    fn test_manager_passes_chief_rule_without_employee_record() {
        let f = fixture();

        assert!(f.roster.by_user(f.manager).is_none());
        for target in [f.e0, f.e1, f.e2] {
            assert!(is_chief_of_employee(
                &f.project,
                &f.roster,
                f.manager,
                target,
                ChiefScope::Direct
            ));
        }
    }

    #[test]
    fn test_grand_chief_depends_on_scope() {
        let f = fixture();
        let e0_user = f.roster.get(f.e0).unwrap().user_id;
        let chief = &[Permission::ChiefOfEmployee];

        assert!(matches!(
            run(&f, e0_user, AccessKind::Write, chief, Some(f.e2), AuthzPolicy::default()),
            Err(AuthzError::Denied)
        ));
        assert_eq!(
            run(&f, e0_user, AccessKind::Write, chief, Some(f.e2), TRANSITIVE).unwrap(),
            Permission::ChiefOfEmployee
        );
    }

    #[test]
    fn test_chief_rule_requires_target() {
        let f = fixture();

        assert!(matches!(
            run(&f, f.manager, AccessKind::Write, &[Permission::ChiefOfEmployee], None, DIRECT),
            Err(AuthzError::MissingTarget)
        ));
    }

    #[test]
    fn test_empty_declaration_denies() {
        let f = fixture();

        assert!(matches!(
            run(&f, f.manager, AccessKind::Read, &[], None, AuthzPolicy::default()),
            Err(AuthzError::Denied)
        ));
    }

    #[test]
    fn test_first_granting_permission_is_reported() {
        let f = fixture();
        let both = &[Permission::ManagerOfProject, Permission::ParticipantOfProject];

        let manager_employee = employee(f.project.id, None);
        let snapshot = Snapshot {
            project: &f.project,
            actor_employee: Some(&manager_employee),
            roster: None,
        };
        let request = AccessRequest::new(f.manager, f.project.id, AccessKind::Read).allow(both);

        assert_eq!(
            decide(&snapshot, &request, &AuthzPolicy::default()).unwrap(),
            Permission::ManagerOfProject
        );
    }
}
