/// Role-based access control
///
/// Roles are not nested. Every protected [`Operation`] names exactly one
/// [`CapabilitySet`], and [`authorize`] is the single place where a user's
/// role is compared against it.
///
/// # Capability Sets
///
/// | Set | Roles |
/// |-----|-------|
/// | [`CapabilitySet::ADMIN_ONLY`] | admin |
/// | [`CapabilitySet::STAFF`] | admin, manager |
/// | [`CapabilitySet::ANY_ROLE`] | admin, manager, member |
///
/// Comments carry extra ownership rules on top of their capability set:
/// only the author may edit a comment, while the author or any staff member
/// may delete it.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use taskboard_shared::auth::authorization::{authorize, Operation};
/// use taskboard_shared::models::user::{Role, User};
/// use uuid::Uuid;
///
/// let manager = User {
///     id: Uuid::new_v4(),
///     username: "max".to_string(),
///     email: "max@example.com".to_string(),
///     password_hash: String::new(),
///     role: Role::Manager,
///     created_at: Utc::now(),
/// };
///
/// assert!(authorize(&manager, Operation::CreateProject).is_ok());
/// assert!(authorize(&manager, Operation::DeleteUser).is_err());
/// ```

use std::fmt;

use tracing::debug;

use crate::models::comment::Comment;
use crate::models::user::{Role, User};

/// A set of roles allowed to perform an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilitySet {
    roles: &'static [Role],
}

impl CapabilitySet {
    /// Administrators only
    pub const ADMIN_ONLY: CapabilitySet = CapabilitySet {
        roles: &[Role::Admin],
    };

    /// Administrators and managers
    pub const STAFF: CapabilitySet = CapabilitySet {
        roles: &[Role::Admin, Role::Manager],
    };

    /// Every authenticated user
    pub const ANY_ROLE: CapabilitySet = CapabilitySet {
        roles: &[Role::Admin, Role::Manager, Role::Member],
    };

    /// Returns true if `role` belongs to this set
    pub fn allows(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Message shown to a user outside this set
    pub fn denial_message(&self) -> &'static str {
        if *self == CapabilitySet::ADMIN_ONLY {
            "Admin access required"
        } else {
            "You do not have permission to perform this action"
        }
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.roles.iter().map(Role::as_str).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

/// Every operation that requires an authenticated user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListUsers,
    ChangeUserRole,
    DeleteUser,

    CreateProject,
    DeleteProject,
    ListProjects,

    CreateTask,
    DeleteTask,
    ListTasks,
    UpdateTask,

    CreateComment,
    ListComments,
    UpdateComment,
    DeleteComment,

    CreateTool,
    DeleteTool,
    ListTools,
    ListToolTasks,

    UploadAttachment,
    ListAttachments,
    DownloadAttachment,

    UserSummary,
    TasksByStatus,
    ProjectSummary,

    /// Reading another user's summary or task lists
    CrossUserSummary,
}

impl Operation {
    /// The roles allowed to perform this operation
    pub fn capability(&self) -> CapabilitySet {
        use Operation::*;

        match self {
            ChangeUserRole | DeleteUser | CrossUserSummary => CapabilitySet::ADMIN_ONLY,

            ListUsers | CreateProject | DeleteProject | CreateTask | DeleteTask | CreateTool
            | DeleteTool | ProjectSummary => CapabilitySet::STAFF,

            ListProjects | ListTasks | UpdateTask | CreateComment | ListComments
            | UpdateComment | DeleteComment | ListTools | ListToolTasks | UploadAttachment
            | ListAttachments | DownloadAttachment | UserSummary | TasksByStatus => {
                CapabilitySet::ANY_ROLE
            }
        }
    }
}

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// User's role is outside the operation's capability set
    #[error("{}", .required.denial_message())]
    InsufficientRole {
        operation: Operation,
        required: CapabilitySet,
        actual: Role,
    },

    /// Only the author may edit a comment
    #[error("Not allowed to edit this comment")]
    NotCommentAuthor,

    /// Neither the author nor staff
    #[error("You do not have permission to delete this comment")]
    CommentDeleteDenied,
}

/// Checks that `user` may perform `operation`
///
/// # Errors
///
/// Returns `AuthzError::InsufficientRole` if the user's role is not in the
/// operation's capability set
pub fn authorize(user: &User, operation: Operation) -> Result<(), AuthzError> {
    let required = operation.capability();

    if required.allows(user.role) {
        Ok(())
    } else {
        debug!(
            user_id = %user.id,
            role = %user.role,
            operation = ?operation,
            required = %required,
            "Authorization denied"
        );
        Err(AuthzError::InsufficientRole {
            operation,
            required,
            actual: user.role,
        })
    }
}

/// Checks that `user` may edit `comment`
///
/// Editing is reserved to the author; staff roles get no override.
pub fn require_comment_author(user: &User, comment: &Comment) -> Result<(), AuthzError> {
    authorize(user, Operation::UpdateComment)?;

    if comment.is_authored_by(user.id) {
        Ok(())
    } else {
        Err(AuthzError::NotCommentAuthor)
    }
}

/// Checks that `user` may delete `comment`
///
/// Allowed for the author and for admins and managers.
pub fn require_comment_delete(user: &User, comment: &Comment) -> Result<(), AuthzError> {
    authorize(user, Operation::DeleteComment)?;

    if comment.is_authored_by(user.id) || CapabilitySet::STAFF.allows(user.role) {
        Ok(())
    } else {
        Err(AuthzError::CommentDeleteDenied)
    }
}
