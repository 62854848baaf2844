//! User records, email lookup, and follow edges.

use crate::models::UserProfile;
use dashmap::DashMap;
use std::collections::HashSet;
use uuid::Uuid;

/// User map with a lowercased-email index and follow edges kept in both
/// directions so either side's count is a direct lookup.
#[derive(Default)]
pub struct UserStore {
    users: DashMap<Uuid, UserProfile>,
    by_email: DashMap<String, Uuid>,
    /// user -> users they follow
    following: DashMap<Uuid, HashSet<Uuid>>,
    /// user -> users following them
    followers: DashMap<Uuid, HashSet<Uuid>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user; fails (returns false) when the email is taken.
    pub fn insert(&self, user: UserProfile) -> bool {
        let email_key = user.email.to_lowercase();
        if self.by_email.contains_key(&email_key) {
            return false;
        }
        self.by_email.insert(email_key, user.id);
        self.users.insert(user.id, user);
        true
    }

    pub fn get(&self, id: Uuid) -> Option<UserProfile> {
        self.users.get(&id).map(|u| u.clone())
    }

    pub fn get_by_email(&self, email: &str) -> Option<UserProfile> {
        let id = *self.by_email.get(&email.to_lowercase())?;
        self.get(id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.users.contains_key(&id)
    }

    pub fn update<F: FnOnce(&mut UserProfile)>(&self, id: Uuid, f: F) -> Option<UserProfile> {
        self.users.get_mut(&id).map(|mut u| {
            f(&mut u);
            u.clone()
        })
    }

    pub fn all(&self) -> Vec<UserProfile> {
        let mut users: Vec<UserProfile> = self.users.iter().map(|u| u.clone()).collect();
        users.sort_by(|a, b| a.join_date.cmp(&b.join_date).then(a.id.cmp(&b.id)));
        users
    }

    /// Record a follow edge. Returns false when it already exists.
    pub fn follow(&self, follower: Uuid, followee: Uuid) -> bool {
        let inserted = self.following.entry(follower).or_default().insert(followee);
        if inserted {
            self.followers.entry(followee).or_default().insert(follower);
        }
        inserted
    }

    /// Remove a follow edge. Returns false when it did not exist.
    pub fn unfollow(&self, follower: Uuid, followee: Uuid) -> bool {
        let removed = self
            .following
            .get_mut(&follower)
            .map(|mut set| set.remove(&followee))
            .unwrap_or(false);
        if removed {
            if let Some(mut set) = self.followers.get_mut(&followee) {
                set.remove(&follower);
            }
        }
        removed
    }

    pub fn following_count(&self, id: Uuid) -> usize {
        self.following.get(&id).map(|s| s.len()).unwrap_or(0)
    }

    pub fn followers_count(&self, id: Uuid) -> usize {
        self.followers.get(&id).map(|s| s.len()).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
