// SPDX-FileCopyrightText: 2026 Claimgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory account directory for tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use claimgate_core::{AccountDirectory, ClaimgateError};

/// In-memory [`AccountDirectory`] recording every provisioning call.
#[derive(Default)]
pub struct MockDirectory {
    existing: Mutex<HashSet<String>>,
    created: Mutex<Vec<String>>,
    display_names: Mutex<HashMap<String, String>>,
    emails: Mutex<HashMap<String, String>>,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory pre-populated with existing accounts.
    pub fn with_users<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let directory = Self::default();
        {
            let mut existing = directory.existing.lock().unwrap();
            for user in users {
                existing.insert(user.into());
            }
        }
        directory
    }

    /// Accounts created through [`AccountDirectory::create_user`], in
    /// call order.
    pub fn created_users(&self) -> Vec<String> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl AccountDirectory for MockDirectory {
    async fn user_exists(&self, local_id: &str) -> Result<bool, ClaimgateError> {
        Ok(self.existing.lock().unwrap().contains(local_id))
    }

    async fn create_user(&self, local_id: &str, _password: &str) -> Result<(), ClaimgateError> {
        self.existing.lock().unwrap().insert(local_id.to_string());
        self.created.lock().unwrap().push(local_id.to_string());
        Ok(())
    }

    async fn display_name(&self, local_id: &str) -> Result<Option<String>, ClaimgateError> {
        Ok(self.display_names.lock().unwrap().get(local_id).cloned())
    }

    async fn set_display_name(
        &self,
        local_id: &str,
        display_name: &str,
    ) -> Result<(), ClaimgateError> {
        self.display_names
            .lock()
            .unwrap()
            .insert(local_id.to_string(), display_name.to_string());
        Ok(())
    }

    async fn email_address(&self, local_id: &str) -> Result<Option<String>, ClaimgateError> {
        Ok(self.emails.lock().unwrap().get(local_id).cloned())
    }

    async fn set_email_address(&self, local_id: &str, email: &str) -> Result<(), ClaimgateError> {
        self.emails
            .lock()
            .unwrap()
            .insert(local_id.to_string(), email.to_string());
        Ok(())
    }
}
