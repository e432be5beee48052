use crate::domain::{Activity, CatalogEntries};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Result of a membership mutation against an existing activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipChange {
    Applied,
    Unchanged,
}

/// Storage seam for the activity registry. Methods returning `Option` yield
/// `None` when the activity name is unknown. Emails passed in are expected
/// to be normalized by the caller.
#[async_trait::async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn snapshot_all(&self) -> Vec<(String, Activity)>;

    async fn add_participant(&self, name: &str, email: &str) -> Option<MembershipChange>;

    async fn remove_participant(&self, name: &str, email: &str) -> Option<MembershipChange>;
}

/// Process-memory registry. The map is fixed at construction; each activity
/// has its own lock so mutations on one activity serialize while other
/// activities stay available.
pub struct InMemoryActivityRepository {
    order: Vec<String>,
    activities: HashMap<String, RwLock<Activity>>,
}

impl InMemoryActivityRepository {
    pub fn new(catalog: CatalogEntries) -> Self {
        let mut order = Vec::with_capacity(catalog.len());
        let mut activities = HashMap::with_capacity(catalog.len());
        for (name, activity) in catalog {
            order.push(name.clone());
            activities.insert(name, RwLock::new(activity));
        }
        Self { order, activities }
    }
}

#[async_trait::async_trait]
impl ActivityRepository for InMemoryActivityRepository {
    async fn snapshot_all(&self) -> Vec<(String, Activity)> {
        let mut out = Vec::with_capacity(self.order.len());
        for name in &self.order {
            if let Some(slot) = self.activities.get(name) {
                out.push((name.clone(), slot.read().await.clone()));
            }
        }
        out
    }

    async fn add_participant(&self, name: &str, email: &str) -> Option<MembershipChange> {
        let slot = self.activities.get(name)?;
        let mut activity = slot.write().await;
        if activity.position_of(email).is_some() {
            return Some(MembershipChange::Unchanged);
        }
        activity.participants.push(email.to_string());
        Some(MembershipChange::Applied)
    }

    async fn remove_participant(&self, name: &str, email: &str) -> Option<MembershipChange> {
        let slot = self.activities.get(name)?;
        let mut activity = slot.write().await;
        match activity.position_of(email) {
            Some(idx) => {
                activity.participants.remove(idx);
                Some(MembershipChange::Applied)
            }
            None => Some(MembershipChange::Unchanged),
        }
    }
}
