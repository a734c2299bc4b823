//! `PostgreSQL` project repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use portfolio_core::{NewProject, Project, ProjectId, ProjectStatus};

use super::{PgStore, ProjectRepository, RepositoryError};

const PROJECT_COLUMNS: &str = "id, title, description, features, technologies, live_url, \
     github_url, image_url, featured, status, display_order, created_at";

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: ProjectId,
    title: String,
    description: String,
    features: Vec<String>,
    technologies: Vec<String>,
    live_url: Option<String>,
    github_url: Option<String>,
    image_url: Option<String>,
    featured: bool,
    status: ProjectStatus,
    display_order: i32,
    created_at: DateTime<Utc>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            features: row.features,
            technologies: row.technologies,
            live_url: row.live_url,
            github_url: row.github_url,
            image_url: row.image_url,
            featured: row.featured,
            status: row.status,
            order: row.display_order,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl ProjectRepository for PgStore {
    async fn list_projects(&self) -> Result<Vec<Project>, RepositoryError> {
        let rows: Vec<ProjectRow> = sqlx::query_as(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY display_order ASC, created_at DESC"
        ))
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(Project::from).collect())
    }

    async fn get_project(&self, id: ProjectId) -> Result<Option<Project>, RepositoryError> {
        let row: Option<ProjectRow> = sqlx::query_as(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(Project::from))
    }

    async fn create_project(&self, project: NewProject) -> Result<Project, RepositoryError> {
        let row: ProjectRow = sqlx::query_as(&format!(
            r"
            INSERT INTO projects (id, title, description, features, technologies, live_url,
                                  github_url, image_url, featured, status, display_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {PROJECT_COLUMNS}
            "
        ))
        .bind(ProjectId::generate())
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.features)
        .bind(&project.technologies)
        .bind(&project.live_url)
        .bind(&project.github_url)
        .bind(&project.image_url)
        .bind(project.featured)
        .bind(project.status)
        .bind(project.order)
        .fetch_one(self.pool())
        .await?;

        Ok(row.into())
    }

    async fn update_project(
        &self,
        id: ProjectId,
        project: NewProject,
    ) -> Result<Option<Project>, RepositoryError> {
        let row: Option<ProjectRow> = sqlx::query_as(&format!(
            r"
            UPDATE projects
            SET title = $2, description = $3, features = $4, technologies = $5,
                live_url = $6, github_url = $7, image_url = $8, featured = $9,
                status = $10, display_order = $11
            WHERE id = $1
            RETURNING {PROJECT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.features)
        .bind(&project.technologies)
        .bind(&project.live_url)
        .bind(&project.github_url)
        .bind(&project.image_url)
        .bind(project.featured)
        .bind(project.status)
        .bind(project.order)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(Project::from))
    }

    async fn delete_project(&self, id: ProjectId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_projects(&self) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects")
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }
}
