/// Project model and database operations
///
/// Every project is owned by exactly one manager. Deleting a project
/// cascades to all of its tasks (FK `ON DELETE CASCADE`).
///
/// # Schema
///
/// ```sql
/// CREATE TYPE project_status AS ENUM ('not_started', 'in_progress', 'completed');
///
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     manager_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     status project_status NOT NULL DEFAULT 'not_started',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskhub_shared::models::project::{CreateProject, Project};
/// # use sqlx::PgPool;
/// # use uuid::Uuid;
///
/// # async fn example(pool: PgPool, manager_id: Uuid) -> Result<(), sqlx::Error> {
/// let project = Project::create(&pool, CreateProject {
///     name: "Launch".to_string(),
///     description: String::new(),
///     manager_id,
/// }).await?;
///
/// let counts = Project::count_tasks_by_status(&pool, project.id).await?;
/// println!("{} tasks still todo", counts.todo);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::task::TaskStatus;

/// Project lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// No work has begun
    NotStarted,

    /// Work is underway
    InProgress,

    /// All work is done
    Completed,
}

impl ProjectStatus {
    /// Converts status to its wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::NotStarted => "not_started",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Completed => "completed",
        }
    }
}

/// Project model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,

    /// Project name
    pub name: String,

    /// Free-form description (empty string when omitted at creation)
    pub description: String,

    /// Owning manager (required; only this user may update/delete)
    pub manager_id: Uuid,

    /// Lifecycle status
    pub status: ProjectStatus,

    /// When the project was created (set once)
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new project
#[derive(Debug, Clone)]
pub struct CreateProject {
    /// Project name
    pub name: String,

    /// Description (pass an empty string when the client omitted it)
    pub description: String,

    /// Owning manager; always the requesting principal, never
    /// client-supplied
    pub manager_id: Uuid,
}

/// Input for partially updating a project
///
/// Only non-None fields are written; everything else is left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProject {
    /// New name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New status
    pub status: Option<ProjectStatus>,
}

/// Per-status task tally for a project
///
/// Covers exactly the known task statuses; tasks carrying any other status
/// string fall in no bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatusCounts {
    /// Tasks with status "todo"
    pub todo: i64,

    /// Tasks with status "in-progress"
    #[serde(rename = "in-progress")]
    pub in_progress: i64,

    /// Tasks with status "completed"
    pub completed: i64,
}

impl TaskStatusCounts {
    /// Sum over the three known buckets
    pub fn total(&self) -> i64 {
        self.todo + self.in_progress + self.completed
    }
}

impl Project {
    /// Creates a new project
    ///
    /// Status defaults to `not_started`; `created_at` is set by the
    /// database and never changes afterwards.
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, description, manager_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, manager_id, status, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.manager_id)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, manager_id, status, created_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Lists the projects managed by a given user
    ///
    /// This is the scope of `GET /projects/`: callers only ever see their
    /// own managed projects in the list.
    pub async fn list_by_manager(
        pool: &PgPool,
        manager_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, manager_id, status, created_at
            FROM projects
            WHERE manager_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(manager_id)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Partially updates a project
    ///
    /// Builds the UPDATE dynamically from the fields present in `data`.
    /// Returns the updated project, or None if no project with that ID
    /// exists.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut sets: Vec<String> = Vec::new();
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            sets.push(format!("name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            sets.push(format!("description = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            sets.push(format!("status = ${}", bind_count));
        }

        if sets.is_empty() {
            // Nothing to write; a partial update with an empty payload is
            // a read.
            return Self::find_by_id(pool, id).await;
        }

        let query = format!(
            "UPDATE projects SET {} WHERE id = $1 \
             RETURNING id, name, description, manager_id, status, created_at",
            sets.join(", ")
        );

        let mut q = sqlx::query_as::<_, Project>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }

        let project = q.fetch_optional(pool).await?;

        Ok(project)
    }

    /// Deletes a project by ID
    ///
    /// All tasks under the project are deleted with it (FK cascade).
    /// Returns true if a project was deleted.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Tallies this project's tasks by status
    ///
    /// Point-in-time read, recomputed on each call. Only the known
    /// statuses {todo, in-progress, completed} are counted; rows with any
    /// other status string are excluded from every bucket.
    pub async fn count_tasks_by_status(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<TaskStatusCounts, sqlx::Error> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT status, COUNT(*)
            FROM tasks
            WHERE project_id = $1 AND status IN ('todo', 'in-progress', 'completed')
            GROUP BY status
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        let mut counts = TaskStatusCounts::default();
        for (status, count) in rows {
            match TaskStatus::parse(&status) {
                Some(TaskStatus::Todo) => counts.todo = count,
                Some(TaskStatus::InProgress) => counts.in_progress = count,
                Some(TaskStatus::Completed) => counts.completed = count,
                None => {}
            }
        }

        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_status_as_str() {
        assert_eq!(ProjectStatus::NotStarted.as_str(), "not_started");
        assert_eq!(ProjectStatus::InProgress.as_str(), "in_progress");
        assert_eq!(ProjectStatus::Completed.as_str(), "completed");
    }

    #[test]
    fn test_project_status_wire_serialization() {
        let json = serde_json::to_string(&ProjectStatus::NotStarted).unwrap();
        assert_eq!(json, "\"not_started\"");

        let status: ProjectStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(status, ProjectStatus::InProgress);
    }

    #[test]
    fn test_task_status_counts_total() {
        let counts = TaskStatusCounts {
            todo: 3,
            in_progress: 2,
            completed: 5,
        };
        assert_eq!(counts.total(), 10);
    }

    #[test]
    fn test_task_status_counts_wire_shape() {
        let counts = TaskStatusCounts {
            todo: 1,
            in_progress: 2,
            completed: 3,
        };

        let json = serde_json::to_value(&counts).unwrap();
        assert_eq!(json["todo"], 1);
        assert_eq!(json["in-progress"], 2);
        assert_eq!(json["completed"], 3);
    }

    #[test]
    fn test_update_project_default_is_empty() {
        let update = UpdateProject::default();
        assert!(update.name.is_none());
        assert!(update.description.is_none());
        assert!(update.status.is_none());
    }
}
