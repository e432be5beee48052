use super::ServiceError;
use crate::domain::{normalize_email, Activity};
use crate::repositories::activities::{ActivityRepository, MembershipChange};
use async_trait::async_trait;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;

/// Point-in-time copy of the whole registry, serialized as a JSON object in
/// catalog order.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityCatalogView {
    entries: Vec<(String, Activity)>,
}

impl ActivityCatalogView {
    pub fn new(entries: Vec<(String, Activity)>) -> Self {
        Self { entries }
    }
}

impl Serialize for ActivityCatalogView {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, activity) in &self.entries {
            map.serialize_entry(name, activity)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupReceipt {
    pub activity: String,
    pub email: String,
}

impl SignupReceipt {
    pub fn message(&self) -> String {
        format!("Signed up {} for {}", self.email, self.activity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnregisterReceipt {
    pub activity: String,
    pub email: String,
}

impl UnregisterReceipt {
    pub fn message(&self) -> String {
        format!("Unregistered {} from {}", self.email, self.activity)
    }
}

#[async_trait]
pub trait ActivityService: Send + Sync {
    async fn list_activities(&self) -> ActivityCatalogView;

    async fn signup(&self, activity: &str, email: &str) -> Result<SignupReceipt, ServiceError>;

    async fn unregister(
        &self,
        activity: &str,
        email: &str,
    ) -> Result<UnregisterReceipt, ServiceError>;
}

pub struct ActivityServiceImpl {
    repo: Arc<dyn ActivityRepository>,
}

impl ActivityServiceImpl {
    pub fn new(repo: Arc<dyn ActivityRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl ActivityService for ActivityServiceImpl {
    async fn list_activities(&self) -> ActivityCatalogView {
        ActivityCatalogView::new(self.repo.snapshot_all().await)
    }

    async fn signup(&self, activity: &str, email: &str) -> Result<SignupReceipt, ServiceError> {
        let email = normalize_email(email);

        match self.repo.add_participant(activity, &email).await {
            None => {
                tracing::debug!(activity, "signup rejected: unknown activity");
                Err(ServiceError::ActivityNotFound {
                    activity: activity.to_string(),
                })
            }
            Some(MembershipChange::Unchanged) => {
                tracing::debug!(activity, email = %email, "signup rejected: already signed up");
                Err(ServiceError::AlreadySignedUp {
                    activity: activity.to_string(),
                    email,
                })
            }
            Some(MembershipChange::Applied) => {
                tracing::info!(activity, email = %email, "participant signed up");
                Ok(SignupReceipt {
                    activity: activity.to_string(),
                    email,
                })
            }
        }
    }

    async fn unregister(
        &self,
        activity: &str,
        email: &str,
    ) -> Result<UnregisterReceipt, ServiceError> {
        let email = normalize_email(email);

        match self.repo.remove_participant(activity, &email).await {
            None => {
                tracing::debug!(activity, "unregister rejected: unknown activity");
                Err(ServiceError::ActivityNotFound {
                    activity: activity.to_string(),
                })
            }
            Some(MembershipChange::Unchanged) => {
                tracing::debug!(activity, email = %email, "unregister rejected: not signed up");
                Err(ServiceError::ParticipantNotFound {
                    activity: activity.to_string(),
                    email,
                })
            }
            Some(MembershipChange::Applied) => {
                tracing::info!(activity, email = %email, "participant unregistered");
                Ok(UnregisterReceipt {
                    activity: activity.to_string(),
                    email,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::default_catalog;
    use crate::repositories::activities::InMemoryActivityRepository;
    use crate::services::ErrorKind;

    fn service() -> ActivityServiceImpl {
        ActivityServiceImpl::new(Arc::new(InMemoryActivityRepository::new(default_catalog())))
    }

    async fn participants(service: &ActivityServiceImpl, activity: &str) -> Vec<String> {
        service
            .list_activities()
            .await
            .entries
            .into_iter()
            .find(|(n, _)| n == activity)
            .map(|(_, a)| a.participants)
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn signup_appears_in_listing_for_every_activity() {
        let service = service();
        let names: Vec<String> = service
            .list_activities()
            .await
            .entries
            .into_iter()
            .map(|(n, _)| n)
            .collect();

        for name in names {
            let receipt = service.signup(&name, "Someone@Mergington.edu ").await.unwrap();
            assert_eq!(receipt.email, "someone@mergington.edu");
            assert!(participants(&service, &name)
                .await
                .contains(&"someone@mergington.edu".to_string()));
        }
    }

    #[tokio::test]
    async fn duplicate_signup_is_a_conflict() {
        let service = service();
        service.signup("Chess Club", "dup@mergington.edu").await.unwrap();

        let err = service
            .signup("Chess Club", "  DUP@mergington.edu")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(participants(&service, "Chess Club").await.len(), 3);
    }

    #[tokio::test]
    async fn seeded_participant_cannot_sign_up_again() {
        let service = service();
        let err = service
            .signup("Chess Club", "Michael@Mergington.edu")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AlreadySignedUp { .. }));
    }

    #[tokio::test]
    async fn unregister_missing_participant_is_not_found() {
        let service = service();
        let err = service
            .unregister("Chess Club", "nobody@mergington.edu")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ParticipantNotFound { .. }));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn signup_then_unregister_restores_roster() {
        let service = service();
        let before = participants(&service, "Drama Club").await;

        service.signup("Drama Club", "actor@mergington.edu").await.unwrap();
        let receipt = service
            .unregister("Drama Club", " Actor@Mergington.EDU ")
            .await
            .unwrap();
        assert_eq!(receipt.message(), "Unregistered actor@mergington.edu from Drama Club");

        assert_eq!(participants(&service, "Drama Club").await, before);
    }

    #[tokio::test]
    async fn unknown_activity_is_not_found_for_any_email() {
        let service = service();
        for email in ["", "  ", "michael@mergington.edu", "X@Y.Z"] {
            let err = service.signup("Knitting", email).await.unwrap_err();
            assert!(matches!(err, ServiceError::ActivityNotFound { .. }));
            let err = service.unregister("Knitting", email).await.unwrap_err();
            assert!(matches!(err, ServiceError::ActivityNotFound { .. }));
        }
    }

    #[tokio::test]
    async fn signup_ignores_capacity() {
        let catalog = vec![(
            "Tiny".to_string(),
            Activity::new("d", "s", 1, &["first@x.io"]),
        )];
        let service = ActivityServiceImpl::new(Arc::new(InMemoryActivityRepository::new(catalog)));

        service.signup("Tiny", "second@x.io").await.unwrap();
        service.signup("Tiny", "third@x.io").await.unwrap();
        assert_eq!(
            participants(&service, "Tiny").await,
            vec!["first@x.io", "second@x.io", "third@x.io"]
        );
    }

    #[tokio::test]
    async fn signup_message_uses_normalized_email() {
        let service = service();
        let receipt = service
            .signup("Chess Club", "  New@Mergington.edu ")
            .await
            .unwrap();
        assert_eq!(receipt.message(), "Signed up new@mergington.edu for Chess Club");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_signups_admit_one_copy() {
        const TASKS: usize = 32;
        let service = Arc::new(service());
        let start = Arc::new(tokio::sync::Barrier::new(TASKS));
        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..TASKS {
            let service = service.clone();
            let start = start.clone();
            let email = if i % 2 == 0 {
                "race@mergington.edu".to_string()
            } else {
                " RACE@mergington.edu ".to_string()
            };
            tasks.spawn(async move {
                start.wait().await;
                service.signup("Chess Club", &email).await.is_ok()
            });
        }

        let mut successes = 0;
        while let Some(res) = tasks.join_next().await {
            if res.unwrap() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);

        let roster = participants(&service, "Chess Club").await;
        let copies = roster.iter().filter(|p| *p == "race@mergington.edu").count();
        assert_eq!(copies, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_distinct_signups_are_all_kept() {
        const TASKS: usize = 32;
        let service = Arc::new(service());
        let start = Arc::new(tokio::sync::Barrier::new(TASKS));
        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..TASKS {
            let service = service.clone();
            let start = start.clone();
            tasks.spawn(async move {
                start.wait().await;
                service
                    .signup("Gym Class", &format!("runner{}@mergington.edu", i))
                    .await
                    .is_ok()
            });
        }

        while let Some(res) = tasks.join_next().await {
            assert!(res.unwrap());
        }
        assert_eq!(participants(&service, "Gym Class").await.len(), TASKS + 2);
    }

    #[tokio::test]
    async fn listing_serializes_as_ordered_object() {
        let service = service();
        let json = serde_json::to_string(&service.list_activities().await).unwrap();
        let chess = json.find("\"Chess Club\"").unwrap();
        let science = json.find("\"Science Club\"").unwrap();
        assert!(chess < science);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["Chess Club"]["max_participants"], 12);
        assert_eq!(
            value["Chess Club"]["participants"],
            serde_json::json!(["michael@mergington.edu", "daniel@mergington.edu"])
        );
    }
}
