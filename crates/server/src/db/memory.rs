//! In-process store used for `memory://` URLs and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use portfolio_core::{
    AdminId, AdminProfile, Message, MessageId, NewMessage, NewProject, Project, ProjectId,
};

use super::{
    AdminRepository, MessageCounts, MessageRepository, ProjectRepository, RepositoryError, Store,
};
use crate::models::{AdminCredentials, NewAdmin};

#[derive(Default)]
struct Tables {
    messages: HashMap<MessageId, Message>,
    projects: HashMap<ProjectId, Project>,
    admins: Vec<AdminCredentials>,
}

/// A store that keeps every record in memory.
///
/// One lock guards all tables, so each operation is atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageRepository for MemoryStore {
    async fn list_messages(&self) -> Result<Vec<Message>, RepositoryError> {
        let tables = self.tables.read().await;
        let mut messages: Vec<Message> = tables.messages.values().cloned().collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(messages)
    }

    async fn create_message(&self, message: NewMessage) -> Result<Message, RepositoryError> {
        let stored = Message {
            id: MessageId::generate(),
            name: message.name,
            email: message.email,
            subject: message.subject,
            message: message.message,
            read: false,
            created_at: Utc::now(),
        };
        self.tables
            .write()
            .await
            .messages
            .insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn mark_message_read(&self, id: MessageId) -> Result<Option<Message>, RepositoryError> {
        let mut tables = self.tables.write().await;
        Ok(tables.messages.get_mut(&id).map(|message| {
            message.read = true;
            message.clone()
        }))
    }

    async fn delete_message(&self, id: MessageId) -> Result<bool, RepositoryError> {
        Ok(self.tables.write().await.messages.remove(&id).is_some())
    }

    async fn message_counts(&self) -> Result<MessageCounts, RepositoryError> {
        let tables = self.tables.read().await;
        let unread = tables.messages.values().filter(|m| !m.read).count();
        Ok(MessageCounts {
            total: to_i64(tables.messages.len()),
            unread: to_i64(unread),
        })
    }
}

#[async_trait]
impl ProjectRepository for MemoryStore {
    async fn list_projects(&self) -> Result<Vec<Project>, RepositoryError> {
        let tables = self.tables.read().await;
        let mut projects: Vec<Project> = tables.projects.values().cloned().collect();
        projects.sort_by(|a, b| {
            a.order
                .cmp(&b.order)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(projects)
    }

    async fn get_project(&self, id: ProjectId) -> Result<Option<Project>, RepositoryError> {
        Ok(self.tables.read().await.projects.get(&id).cloned())
    }

    async fn create_project(&self, project: NewProject) -> Result<Project, RepositoryError> {
        let stored = Project::from_new(ProjectId::generate(), Utc::now(), project);
        self.tables
            .write()
            .await
            .projects
            .insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_project(
        &self,
        id: ProjectId,
        project: NewProject,
    ) -> Result<Option<Project>, RepositoryError> {
        let mut tables = self.tables.write().await;
        Ok(tables.projects.get_mut(&id).map(|stored| {
            *stored = Project::from_new(stored.id, stored.created_at, project);
            stored.clone()
        }))
    }

    async fn delete_project(&self, id: ProjectId) -> Result<bool, RepositoryError> {
        Ok(self.tables.write().await.projects.remove(&id).is_some())
    }

    async fn count_projects(&self) -> Result<i64, RepositoryError> {
        Ok(to_i64(self.tables.read().await.projects.len()))
    }
}

#[async_trait]
impl AdminRepository for MemoryStore {
    async fn count_admins(&self) -> Result<i64, RepositoryError> {
        Ok(to_i64(self.tables.read().await.admins.len()))
    }

    async fn find_admin_credentials(
        &self,
        username: &str,
    ) -> Result<Option<AdminCredentials>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .admins
            .iter()
            .find(|admin| admin.profile.username == username)
            .cloned())
    }

    async fn create_first_admin(
        &self,
        admin: NewAdmin,
    ) -> Result<Option<AdminProfile>, RepositoryError> {
        let mut tables = self.tables.write().await;
        if !tables.admins.is_empty() {
            return Ok(None);
        }

        let profile = AdminProfile {
            id: AdminId::generate(),
            username: admin.username,
            email: admin.email,
        };
        tables.admins.push(AdminCredentials {
            profile: profile.clone(),
            password_hash: admin.password_hash,
        });
        Ok(Some(profile))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

fn to_i64(count: usize) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use portfolio_core::{ProjectInput, ProjectStatus};

    use super::*;

    fn new_message(subject: &str) -> NewMessage {
        NewMessage {
            name: "A".to_owned(),
            email: "a@x.com".to_owned(),
            subject: subject.to_owned(),
            message: "Test".to_owned(),
        }
    }

    fn new_project(title: &str, order: i32) -> NewProject {
        ProjectInput {
            title: Some(title.to_owned()),
            description: Some("D".to_owned()),
            order: Some(order),
            ..ProjectInput::default()
        }
        .into_new_project()
        .unwrap()
    }

    #[tokio::test]
    async fn test_message_lifecycle() {
        let store = MemoryStore::new();
        let created = store.create_message(new_message("Hi")).await.unwrap();
        assert!(!created.read);

        let counts = store.message_counts().await.unwrap();
        assert_eq!(counts, MessageCounts { total: 1, unread: 1 });

        let read = store.mark_message_read(created.id).await.unwrap().unwrap();
        assert!(read.read);
        // Idempotent
        assert!(store.mark_message_read(created.id).await.unwrap().unwrap().read);
        assert_eq!(store.message_counts().await.unwrap().unread, 0);

        assert!(store.delete_message(created.id).await.unwrap());
        assert!(!store.delete_message(created.id).await.unwrap());
        assert!(store.mark_message_read(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_messages_newest_first() {
        let store = MemoryStore::new();
        let first = store.create_message(new_message("first")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second = store.create_message(new_message("second")).await.unwrap();

        let listed = store.list_messages().await.unwrap();
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[tokio::test]
    async fn test_projects_ordered_by_order_then_newest() {
        let store = MemoryStore::new();
        let late = store.create_project(new_project("late", 2)).await.unwrap();
        let older_tie = store.create_project(new_project("tie-old", 1)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let newer_tie = store.create_project(new_project("tie-new", 1)).await.unwrap();

        let ids: Vec<_> = store
            .list_projects()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![newer_tie.id, older_tie.id, late.id]);
    }

    #[tokio::test]
    async fn test_update_keeps_identity() {
        let store = MemoryStore::new();
        let created = store.create_project(new_project("T", 0)).await.unwrap();
        let mut fields = new_project("Renamed", 4);
        fields.status = ProjectStatus::InProgress;

        let updated = store
            .update_project(created.id, fields.clone())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.status, ProjectStatus::InProgress);

        assert!(
            store
                .update_project(ProjectId::generate(), fields)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_first_admin_only_once() {
        let store = MemoryStore::new();
        let admin = || NewAdmin {
            username: "admin".to_owned(),
            email: None,
            password_hash: "$argon2id$test".to_owned(),
        };

        assert!(store.create_first_admin(admin()).await.unwrap().is_some());
        assert!(store.create_first_admin(admin()).await.unwrap().is_none());
        assert_eq!(store.count_admins().await.unwrap(), 1);
        assert!(
            store
                .find_admin_credentials("admin")
                .await
                .unwrap()
                .is_some()
        );
        assert!(
            store
                .find_admin_credentials("nobody")
                .await
                .unwrap()
                .is_none()
        );
    }
}
