/// Task model and database operations
///
/// A task always belongs to exactly one project and is assigned to at most
/// one user. Deleting the project deletes its tasks (cascade); deleting the
/// assigned user keeps the task and nulls the assignment.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     assigned_to UUID REFERENCES users(id) ON DELETE SET NULL,
///     completed_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     status TEXT NOT NULL DEFAULT 'todo',
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// The status column is free-form text rather than an enum: the per-project
/// tally counts the known set {todo, in-progress, completed} and leaves any
/// other stored string in no bucket, so unknown values must be storable.
///
/// # Example
///
/// ```no_run
/// use taskhub_shared::models::task::{CreateTask, Task, TaskStatus};
/// # use sqlx::PgPool;
/// # use uuid::Uuid;
///
/// # async fn example(pool: PgPool, project_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, CreateTask {
///     title: "Write launch notes".to_string(),
///     description: String::new(),
///     project_id,
///     assigned_to: Some(user_id),
///     status: TaskStatus::Todo.as_str().to_string(),
///     completed: false,
/// }).await?;
///
/// let assigned = Task::list_by_assignee(&pool, user_id).await?;
/// assert!(assigned.iter().any(|t| t.id == task.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::UserSummary;

/// The known task statuses
///
/// Stored statuses are plain strings; this enum names the set the tally
/// and defaults operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not yet started
    Todo,

    /// Being worked on
    InProgress,

    /// Done
    Completed,
}

impl TaskStatus {
    /// Converts status to its wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        }
    }

    /// Parses a stored status string, returning None for anything outside
    /// the known set
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "todo" => Some(TaskStatus::Todo),
            "in-progress" => Some(TaskStatus::InProgress),
            "completed" => Some(TaskStatus::Completed),
            _ => None,
        }
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Task title
    pub title: String,

    /// Free-form description
    pub description: String,

    /// Owning project (required)
    pub project_id: Uuid,

    /// Assigned user (None if unassigned or the user was deleted)
    pub assigned_to: Option<Uuid>,

    /// User who completed the task (None until completion)
    pub completed_by: Option<Uuid>,

    /// Status string; "todo" by default, arbitrary values storable
    pub status: String,

    /// Completion flag
    pub completed: bool,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last mutated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone)]
pub struct CreateTask {
    /// Task title
    pub title: String,

    /// Description (empty string when the client omitted it)
    pub description: String,

    /// Owning project
    pub project_id: Uuid,

    /// Assigned user
    pub assigned_to: Option<Uuid>,

    /// Initial status string
    pub status: String,

    /// Initial completion flag
    pub completed: bool,
}

/// Input for partially updating a task
///
/// Only non-None fields are written; everything else is left unchanged.
/// `updated_at` is refreshed on every write regardless.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New assignee
    pub assigned_to: Option<Uuid>,

    /// New status string
    pub status: Option<String>,

    /// New completion flag
    pub completed: Option<bool>,

    /// Who completed the task; set by the handler when an update marks
    /// the task completed
    pub completed_by: Option<Uuid>,
}

/// Wire representation of a task
///
/// Full field serialization, with `assigned_to` / `completed_by` expanded
/// to `{id, username, email}` instead of bare ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDetail {
    /// Unique task ID
    pub id: Uuid,

    /// Task title
    pub title: String,

    /// Description
    pub description: String,

    /// Owning project
    pub project_id: Uuid,

    /// Assignee summary, if any
    pub assigned_to: Option<UserSummary>,

    /// Completer summary, if any
    pub completed_by: Option<UserSummary>,

    /// Status string
    pub status: String,

    /// Completion flag
    pub completed: bool,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last mutated
    pub updated_at: DateTime<Utc>,
}

/// Flat row shape for the users-joined task queries
#[derive(Debug, sqlx::FromRow)]
struct TaskDetailRow {
    id: Uuid,
    title: String,
    description: String,
    project_id: Uuid,
    status: String,
    completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    assigned_to_id: Option<Uuid>,
    assigned_to_username: Option<String>,
    assigned_to_email: Option<String>,
    completed_by_id: Option<Uuid>,
    completed_by_username: Option<String>,
    completed_by_email: Option<String>,
}

impl From<TaskDetailRow> for TaskDetail {
    fn from(row: TaskDetailRow) -> Self {
        let assigned_to = match (row.assigned_to_id, row.assigned_to_username, row.assigned_to_email)
        {
            (Some(id), Some(username), Some(email)) => Some(UserSummary {
                id,
                username,
                email,
            }),
            _ => None,
        };

        let completed_by = match (row.completed_by_id, row.completed_by_username, row.completed_by_email)
        {
            (Some(id), Some(username), Some(email)) => Some(UserSummary {
                id,
                username,
                email,
            }),
            _ => None,
        };

        TaskDetail {
            id: row.id,
            title: row.title,
            description: row.description,
            project_id: row.project_id,
            assigned_to,
            completed_by,
            status: row.status,
            completed: row.completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// SELECT list shared by the users-joined task queries
const DETAIL_SELECT: &str = r#"
    SELECT t.id, t.title, t.description, t.project_id, t.status, t.completed,
           t.created_at, t.updated_at,
           a.id AS assigned_to_id,
           a.username AS assigned_to_username,
           a.email AS assigned_to_email,
           c.id AS completed_by_id,
           c.username AS completed_by_username,
           c.email AS completed_by_email
    FROM tasks t
    LEFT JOIN users a ON a.id = t.assigned_to
    LEFT JOIN users c ON c.id = t.completed_by
"#;

impl Task {
    /// Creates a new task under a project
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, project_id, assigned_to, status, completed)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, description, project_id, assigned_to, completed_by,
                      status, completed, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.project_id)
        .bind(data.assigned_to)
        .bind(data.status)
        .bind(data.completed)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, project_id, assigned_to, completed_by,
                   status, completed, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID in its wire shape (users expanded)
    pub async fn find_detail(pool: &PgPool, id: Uuid) -> Result<Option<TaskDetail>, sqlx::Error> {
        let query = format!("{} WHERE t.id = $1", DETAIL_SELECT);

        let row = sqlx::query_as::<_, TaskDetailRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(TaskDetail::from))
    }

    /// Lists a project's tasks in wire shape
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<TaskDetail>, sqlx::Error> {
        let query = format!(
            "{} WHERE t.project_id = $1 ORDER BY t.created_at ASC",
            DETAIL_SELECT
        );

        let rows = sqlx::query_as::<_, TaskDetailRow>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(TaskDetail::from).collect())
    }

    /// Lists the tasks assigned to a user, in wire shape
    pub async fn list_by_assignee(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<TaskDetail>, sqlx::Error> {
        let query = format!(
            "{} WHERE t.assigned_to = $1 ORDER BY t.created_at ASC",
            DETAIL_SELECT
        );

        let rows = sqlx::query_as::<_, TaskDetailRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(TaskDetail::from).collect())
    }

    /// Partially updates a task
    ///
    /// Builds the UPDATE dynamically from the fields present in `data`;
    /// `updated_at` is always refreshed. Returns the updated task, or None
    /// if no task with that ID exists.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.assigned_to.is_some() {
            bind_count += 1;
            query.push_str(&format!(", assigned_to = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.completed.is_some() {
            bind_count += 1;
            query.push_str(&format!(", completed = ${}", bind_count));
        }
        if data.completed_by.is_some() {
            bind_count += 1;
            query.push_str(&format!(", completed_by = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, title, description, project_id, assigned_to, \
             completed_by, status, completed, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(assigned_to) = data.assigned_to {
            q = q.bind(assigned_to);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(completed) = data.completed {
            q = q.bind(completed);
        }
        if let Some(completed_by) = data.completed_by {
            q = q.bind(completed_by);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Deletes a task by ID
    ///
    /// Returns true if a task was deleted.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_as_str() {
        assert_eq!(TaskStatus::Todo.as_str(), "todo");
        assert_eq!(TaskStatus::InProgress.as_str(), "in-progress");
        assert_eq!(TaskStatus::Completed.as_str(), "completed");
    }

    #[test]
    fn test_task_status_parse_round_trip() {
        for status in [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Completed] {
            assert_eq!(TaskStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_task_status_parse_rejects_unknown() {
        assert_eq!(TaskStatus::parse("not-started"), None);
        assert_eq!(TaskStatus::parse("done"), None);
        assert_eq!(TaskStatus::parse(""), None);
        assert_eq!(TaskStatus::parse("TODO"), None);
    }

    #[test]
    fn test_update_task_default_is_empty() {
        let update = UpdateTask::default();
        assert!(update.title.is_none());
        assert!(update.description.is_none());
        assert!(update.assigned_to.is_none());
        assert!(update.status.is_none());
        assert!(update.completed.is_none());
        assert!(update.completed_by.is_none());
    }

    #[test]
    fn test_detail_row_expands_users() {
        let user_id = Uuid::new_v4();
        let row = TaskDetailRow {
            id: Uuid::new_v4(),
            title: "t".to_string(),
            description: String::new(),
            project_id: Uuid::new_v4(),
            status: "todo".to_string(),
            completed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            assigned_to_id: Some(user_id),
            assigned_to_username: Some("alice".to_string()),
            assigned_to_email: Some("alice@example.com".to_string()),
            completed_by_id: None,
            completed_by_username: None,
            completed_by_email: None,
        };

        let detail = TaskDetail::from(row);
        let assignee = detail.assigned_to.expect("assignee should be expanded");
        assert_eq!(assignee.id, user_id);
        assert_eq!(assignee.username, "alice");
        assert!(detail.completed_by.is_none());
    }

    #[test]
    fn test_detail_wire_shape() {
        let detail = TaskDetail {
            id: Uuid::new_v4(),
            title: "Ship it".to_string(),
            description: String::new(),
            project_id: Uuid::new_v4(),
            assigned_to: Some(UserSummary {
                id: Uuid::new_v4(),
                username: "bob".to_string(),
                email: "bob@example.com".to_string(),
            }),
            completed_by: None,
            status: "in-progress".to_string(),
            completed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["status"], "in-progress");
        assert_eq!(json["assigned_to"]["username"], "bob");
        assert!(json["completed_by"].is_null());
    }
}
