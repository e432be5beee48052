pub mod activities;

pub use activities::{ActivityRepository, InMemoryActivityRepository, MembershipChange};
