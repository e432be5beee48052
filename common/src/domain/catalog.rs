use super::activity::{normalize_email, Activity};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Ordered list of `(name, activity)` pairs; order is the listing order.
pub type CatalogEntries = Vec<(String, Activity)>;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("catalog is empty")]
    Empty,
    #[error("activity name must not be empty")]
    EmptyName,
    #[error("duplicate activity name: {0}")]
    DuplicateActivity(String),
    #[error("activity {0} must allow at least one participant")]
    ZeroCapacity(String),
    #[error("activity {activity} lists {email} more than once")]
    DuplicateParticipant { activity: String, email: String },
}

pub fn default_catalog() -> CatalogEntries {
    vec![
        (
            "Chess Club".to_string(),
            Activity::new(
                "Learn strategies and compete in chess tournaments",
                "Fridays, 3:30 PM - 5:00 PM",
                12,
                &["michael@mergington.edu", "daniel@mergington.edu"],
            ),
        ),
        (
            "Programming Class".to_string(),
            Activity::new(
                "Learn programming fundamentals and build software projects",
                "Tuesdays and Thursdays, 3:30 PM - 4:30 PM",
                20,
                &["emma@mergington.edu", "sophia@mergington.edu"],
            ),
        ),
        (
            "Gym Class".to_string(),
            Activity::new(
                "Physical education and sports activities",
                "Mondays, Wednesdays, Fridays, 2:00 PM - 3:00 PM",
                30,
                &["john@mergington.edu", "olivia@mergington.edu"],
            ),
        ),
        (
            "Soccer Team".to_string(),
            Activity::new(
                "Competitive soccer training and matches",
                "Mondays and Thursdays, 4:00 PM - 6:00 PM",
                22,
                &["ryan@mergington.edu", "mia@mergington.edu"],
            ),
        ),
        (
            "Basketball Club".to_string(),
            Activity::new(
                "Pickup games and skills practice",
                "Tuesdays and Fridays, 4:00 PM - 5:30 PM",
                15,
                &["chris@mergington.edu", "nora@mergington.edu"],
            ),
        ),
        (
            "Art Club".to_string(),
            Activity::new(
                "Painting, drawing, and mixed media projects",
                "Wednesdays, 3:30 PM - 5:00 PM",
                18,
                &["lisa@mergington.edu", "noah@mergington.edu"],
            ),
        ),
        (
            "Drama Club".to_string(),
            Activity::new(
                "Acting workshops and school productions",
                "Thursdays, 3:30 PM - 6:00 PM",
                25,
                &["ava@mergington.edu", "ethan@mergington.edu"],
            ),
        ),
        (
            "Debate Team".to_string(),
            Activity::new(
                "Develop public speaking and argumentation skills",
                "Mondays, 3:30 PM - 4:30 PM",
                16,
                &["oliver@mergington.edu", "sophia@mergington.edu"],
            ),
        ),
        (
            "Science Club".to_string(),
            Activity::new(
                "Hands-on experiments and science fair projects",
                "Fridays, 3:30 PM - 5:00 PM",
                20,
                &["liam@mergington.edu", "isabella@mergington.edu"],
            ),
        ),
    ]
}

/// Reads a seed file shaped like the `GET /activities` body. Key order in
/// the file becomes the catalog order.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<CatalogEntries, CatalogError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: display.clone(),
        source,
    })?;
    parse_catalog(&raw).map_err(|source| CatalogError::Parse {
        path: display,
        source,
    })
}

pub fn parse_catalog(raw: &str) -> Result<CatalogEntries, serde_json::Error> {
    serde_json::from_str::<OrderedCatalog>(raw).map(|c| c.0)
}

/// Normalizes every seed participant and rejects catalogs that would break
/// registry invariants from the start.
pub fn validate_catalog(entries: CatalogEntries) -> Result<CatalogEntries, CatalogError> {
    if entries.is_empty() {
        return Err(CatalogError::Empty);
    }

    let mut names = HashSet::new();
    let mut out = Vec::with_capacity(entries.len());

    for (name, mut activity) in entries {
        if name.trim().is_empty() {
            return Err(CatalogError::EmptyName);
        }
        if !names.insert(name.clone()) {
            return Err(CatalogError::DuplicateActivity(name));
        }
        if activity.max_participants == 0 {
            return Err(CatalogError::ZeroCapacity(name));
        }

        let mut seen = HashSet::new();
        let mut participants = Vec::with_capacity(activity.participants.len());
        for raw in &activity.participants {
            let email = normalize_email(raw);
            if !seen.insert(email.clone()) {
                return Err(CatalogError::DuplicateParticipant {
                    activity: name,
                    email,
                });
            }
            participants.push(email);
        }
        activity.participants = participants;

        out.push((name, activity));
    }

    Ok(out)
}

struct OrderedCatalog(CatalogEntries);

impl<'de> Deserialize<'de> for OrderedCatalog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CatalogVisitor;

        impl<'de> Visitor<'de> for CatalogVisitor {
            type Value = OrderedCatalog;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping activity names to activities")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, activity)) = map.next_entry::<String, Activity>()? {
                    entries.push((name, activity));
                }
                Ok(OrderedCatalog(entries))
            }
        }

        deserializer.deserialize_map(CatalogVisitor)
    }
}
