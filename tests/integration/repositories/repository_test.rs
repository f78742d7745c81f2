// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::super::helpers::create_test_db;
use chrono::{Duration, Utc};
use enrichrs::domain::models::contact::{Contact, RawContact};
use enrichrs::domain::models::error_log::ErrorLogEntry;
use enrichrs::domain::models::task::{DomainError, EnrichmentTask, TaskStatus};
use enrichrs::domain::repositories::contact_repository::ContactRepository;
use enrichrs::domain::repositories::error_log_repository::ErrorLogRepository;
use enrichrs::domain::repositories::opportunity_repository::OpportunityRepository;
use enrichrs::domain::repositories::task_repository::{RepositoryError, TaskRepository};
use enrichrs::infrastructure::database::entities::opportunity as opportunity_entity;
use enrichrs::infrastructure::repositories::contact_repo_impl::ContactRepositoryImpl;
use enrichrs::infrastructure::repositories::error_log_repo_impl::ErrorLogRepositoryImpl;
use enrichrs::infrastructure::repositories::opportunity_repo_impl::OpportunityRepositoryImpl;
use enrichrs::infrastructure::repositories::task_repo_impl::TaskRepositoryImpl;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::json;
use uuid::Uuid;

/// 测试任务的创建、查询和状态更新
#[tokio::test]
async fn test_task_lifecycle() {
    let db = create_test_db().await;
    let repo = TaskRepositoryImpl::new(db.clone());
    let user_id = Uuid::new_v4();

    let task = EnrichmentTask::new(user_id, "Acme", Some(Uuid::new_v4())).with_slug("acme");
    repo.create(&task).await.unwrap();

    let found = repo.find_by_id(task.id).await.unwrap().unwrap();
    assert_eq!(found.company_name, "Acme");
    assert_eq!(found.linkedin_url_slug.as_deref(), Some("acme"));
    assert_eq!(found.status, TaskStatus::Pending);

    repo.update_status(task.id, TaskStatus::Processing, None)
        .await
        .unwrap();
    repo.update_status(task.id, TaskStatus::Error, Some("login wall".to_string()))
        .await
        .unwrap();

    let found = repo.find_by_id(task.id).await.unwrap().unwrap();
    assert_eq!(found.status, TaskStatus::Error);
    assert_eq!(found.error_message.as_deref(), Some("login wall"));
}

/// 测试更新不存在的任务
#[tokio::test]
async fn test_update_missing_task() {
    let db = create_test_db().await;
    let repo = TaskRepositoryImpl::new(db);

    let err = repo
        .update_status(Uuid::new_v4(), TaskStatus::Processing, None)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
}

/// 测试终态任务不会被覆盖
#[tokio::test]
async fn test_terminal_task_is_not_overwritten() {
    let db = create_test_db().await;
    let repo = TaskRepositoryImpl::new(db);
    let task = EnrichmentTask::new(Uuid::new_v4(), "Acme", None);
    repo.create(&task).await.unwrap();

    repo.update_status(task.id, TaskStatus::Processing, None)
        .await
        .unwrap();
    repo.update_status(task.id, TaskStatus::Complete, None)
        .await
        .unwrap();

    let err = repo
        .update_status(task.id, TaskStatus::Processing, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::Conflict(DomainError::InvalidStateTransition {
            from: TaskStatus::Complete,
            to: TaskStatus::Processing,
        })
    ));

    let err = repo
        .update_status(task.id, TaskStatus::Error, Some("late".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));

    let found = repo.find_by_id(task.id).await.unwrap().unwrap();
    assert_eq!(found.status, TaskStatus::Complete);
    assert!(found.error_message.is_none());
}

/// 测试完成必须先经过处理中
#[tokio::test]
async fn test_complete_requires_processing() {
    let db = create_test_db().await;
    let repo = TaskRepositoryImpl::new(db);
    let task = EnrichmentTask::new(Uuid::new_v4(), "Acme", None);
    repo.create(&task).await.unwrap();

    let err = repo
        .update_status(task.id, TaskStatus::Complete, None)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));
    assert_eq!(
        repo.find_by_id(task.id).await.unwrap().unwrap().status,
        TaskStatus::Pending
    );
}

/// 测试按创建时间加载用户的待处理任务
#[tokio::test]
async fn test_find_pending_by_user_in_creation_order() {
    let db = create_test_db().await;
    let repo = TaskRepositoryImpl::new(db);
    let user_id = Uuid::new_v4();
    let now = Utc::now();

    let mut newer = EnrichmentTask::new(user_id, "Newer", None);
    newer.created_at = now.into();
    let mut older = EnrichmentTask::new(user_id, "Older", None);
    older.created_at = (now - Duration::minutes(5)).into();
    let done = EnrichmentTask::new(user_id, "Done", None);
    let foreign = EnrichmentTask::new(Uuid::new_v4(), "Foreign", None);

    for task in [&newer, &older, &done, &foreign] {
        repo.create(task).await.unwrap();
    }
    repo.update_status(done.id, TaskStatus::Processing, None)
        .await
        .unwrap();
    repo.update_status(done.id, TaskStatus::Complete, None)
        .await
        .unwrap();

    let pending = repo.find_pending_by_user(user_id).await.unwrap();
    let names: Vec<&str> = pending.iter().map(|t| t.company_name.as_str()).collect();
    assert_eq!(names, vec!["Older", "Newer"]);
}

/// 测试批量写入联系人
#[tokio::test]
async fn test_contacts_insert_many() {
    let db = create_test_db().await;
    let repo = ContactRepositoryImpl::new(db);
    let task_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();

    let contacts: Vec<Contact> = ["Jane", "John"]
        .into_iter()
        .map(|name| {
            Contact::from_raw(
                RawContact {
                    name: name.to_string(),
                    title: Some("Engineer".to_string()),
                    profile_url: None,
                    email: None,
                },
                task_id,
                None,
                user_id,
            )
        })
        .collect();

    assert_eq!(repo.insert_many(contacts).await.unwrap(), 2);
    assert_eq!(repo.insert_many(vec![]).await.unwrap(), 0);

    let saved = repo.find_by_task_id(task_id).await.unwrap();
    assert_eq!(saved.len(), 2);
    assert!(saved.iter().all(|c| c.user_id == user_id));
    assert!(saved
        .iter()
        .all(|c| c.job_title.as_deref() == Some("Engineer")));
}

/// 测试错误日志
#[tokio::test]
async fn test_error_log_round_trip() {
    let db = create_test_db().await;
    let repo = ErrorLogRepositoryImpl::new(db);
    let task_id = Uuid::new_v4();

    let entry = ErrorLogEntry::for_task(task_id, "rate limited").with_page(Some(2));
    repo.create(&entry).await.unwrap();

    let logs = repo.find_by_task_id(task_id).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].message, "rate limited");
    assert_eq!(logs[0].page_number, Some(2));
}

/// 测试机会的公司数据与标识更新
#[tokio::test]
async fn test_opportunity_updates() {
    let db = create_test_db().await;
    let repo = OpportunityRepositoryImpl::new(db.clone());
    let id = Uuid::new_v4();
    let now = Utc::now();

    opportunity_entity::ActiveModel {
        id: Set(id),
        user_id: Set(Uuid::new_v4()),
        company_name: Set("Acme".to_string()),
        linkedin_url_slug: Set(None),
        company_data: Set(None),
        company_enriched_at: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db.as_ref())
    .await
    .unwrap();

    repo.update_slug(id, "acme-corp").await.unwrap();
    repo.update_company_data(id, json!({"industry": "Software"}))
        .await
        .unwrap();

    let opportunity = repo.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(opportunity.linkedin_url_slug.as_deref(), Some("acme-corp"));
    assert_eq!(opportunity.company_data, Some(json!({"industry": "Software"})));
    assert!(opportunity.company_enriched_at.is_some());

    let err = repo.update_slug(Uuid::new_v4(), "x").await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
}
