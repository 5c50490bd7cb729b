//! Test fixtures

use std::sync::atomic::{AtomicI64, Ordering};

use numhub_core::entities::{NewAdvertisement, NewCountry, NewUser};
use numhub_core::value_objects::{AudienceFilter, UserId};

/// Unique test user ids, far away from real chat-platform id space
static USER_COUNTER: AtomicI64 = AtomicI64::new(9_900_000_000);

/// Generate a unique test user id
pub fn test_user_id() -> UserId {
    UserId::new(USER_COUNTER.fetch_add(1, Ordering::SeqCst))
}

/// Create a test user profile
pub fn test_user() -> NewUser {
    let id = test_user_id();
    NewUser {
        id,
        username: Some(format!("test_user_{id}")),
        first_name: Some("Test".to_string()),
        last_name: None,
    }
}

/// Create a uniquely named test country
pub fn test_country() -> NewCountry {
    let tag = uuid::Uuid::new_v4().simple().to_string();
    NewCountry {
        name: format!("Testland-{}", &tag[..8]),
        flag: None,
        platform: "Telegram".to_string(),
        activation_channel: None,
    }
}

/// Create a test advertisement for `created_by`
pub fn test_ad(created_by: UserId) -> NewAdvertisement {
    NewAdvertisement {
        title: "Integration test ad".to_string(),
        content: "Content".to_string(),
        created_by,
        target_audience: AudienceFilter::All,
    }
}
