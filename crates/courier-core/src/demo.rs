//! In-memory API client and grant store.
//!
//! `DemoClient` serves generated sample data for every resource and applies
//! mutations and submissions to its own copy, so a session behaves like a
//! small live account. It backs the `courier` binary and the test suites.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{Local, TimeDelta};

use crate::client::{ApiClient, GrantStore};
use crate::error::ApiError;
use crate::model::{FormKind, FormSubmission, GrantIdentity, Mutation, Query, Row, Summary, ViewName};

/// Folder listed when a query does not name one.
pub const DEFAULT_FOLDER: &str = "INBOX";

/// A mutation recorded by [`DemoClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedMutation {
    pub grant: String,
    pub resource: ViewName,
    pub id: String,
    pub mutation: Mutation,
}

#[derive(Debug, Default)]
struct DemoData {
    records: HashMap<ViewName, Vec<Row>>,
    mutations: Vec<RecordedMutation>,
    submissions: Vec<FormSubmission>,
    next_id: usize,
    failure: Option<ApiError>,
}

/// Sample-data API client.
#[derive(Debug)]
pub struct DemoClient {
    data: Mutex<DemoData>,
    latency: Duration,
}

impl Default for DemoClient {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoClient {
    /// Create a client populated with sample data and no latency.
    pub fn new() -> Self {
        let mut records = HashMap::new();
        records.insert(ViewName::Messages, sample_messages());
        records.insert(ViewName::Drafts, sample_drafts());
        records.insert(ViewName::Events, sample_events());
        records.insert(ViewName::Availability, sample_availability());
        records.insert(ViewName::Contacts, sample_contacts());
        records.insert(ViewName::Webhooks, sample_webhooks());
        records.insert(ViewName::WebhookServer, sample_webhook_deliveries());
        records.insert(ViewName::Grants, sample_grants());
        records.insert(ViewName::Inbound, sample_inboxes());

        Self {
            data: Mutex::new(DemoData {
                records,
                next_id: 100,
                ..Default::default()
            }),
            latency: Duration::ZERO,
        }
    }

    /// Simulate network latency on every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make every subsequent call fail with `error` until cleared with `None`.
    pub fn set_failure(&self, error: Option<ApiError>) {
        self.lock().failure = error;
    }

    /// Mutations applied so far, oldest first.
    pub fn mutations(&self) -> Vec<RecordedMutation> {
        self.lock().mutations.clone()
    }

    /// Forms submitted so far, oldest first.
    pub fn submissions(&self) -> Vec<FormSubmission> {
        self.lock().submissions.clone()
    }

    /// The grants the demo account exposes.
    pub fn grants() -> Vec<GrantIdentity> {
        vec![
            GrantIdentity::new("grant-demo-1", "alex@example.com", "google"),
            GrantIdentity::new("grant-demo-2", "alex@work.example.com", "microsoft"),
            GrantIdentity::new("grant-demo-3", "alex.imap@example.org", "imap"),
        ]
    }

    fn lock(&self) -> MutexGuard<'_, DemoData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep for the configured latency, then lock the data or report the injected failure.
    fn begin(&self) -> Result<MutexGuard<'_, DemoData>, ApiError> {
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        let data = self.lock();
        match &data.failure {
            Some(error) => Err(error.clone()),
            None => Ok(data),
        }
    }
}

impl ApiClient for DemoClient {
    fn list(&self, _grant: &str, resource: ViewName, query: &Query) -> Result<Vec<Row>, ApiError> {
        let data = self.begin()?;
        let rows = data.records.get(&resource).cloned().unwrap_or_default();

        let folder = (resource == ViewName::Messages)
            .then(|| query.folder.as_deref().unwrap_or(DEFAULT_FOLDER));

        Ok(rows
            .into_iter()
            .filter(|row| folder.is_none_or(|folder| row.detail("Folder") == Some(folder)))
            .filter(|row| row.matches(&query.filter))
            .collect())
    }

    fn summary(&self, _grant: &str) -> Result<Summary, ApiError> {
        let data = self.begin()?;
        let count = |name: ViewName| data.records.get(&name).map_or(0, Vec::len);
        let inbox: Vec<&Row> = data
            .records
            .get(&ViewName::Messages)
            .map(|rows| {
                rows.iter()
                    .filter(|row| row.detail("Folder") == Some(DEFAULT_FOLDER))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Summary {
            unread_messages: inbox.iter().filter(|row| row.unread).count(),
            total_messages: inbox.len(),
            upcoming_events: count(ViewName::Events),
            contacts: count(ViewName::Contacts),
            webhooks: count(ViewName::Webhooks),
        })
    }

    fn mutate(
        &self,
        grant: &str,
        resource: ViewName,
        id: &str,
        mutation: &Mutation,
    ) -> Result<(), ApiError> {
        let mut data = self.begin()?;
        let rows = data.records.entry(resource).or_default();
        let index = rows
            .iter()
            .position(|row| row.id == id)
            .ok_or_else(|| ApiError::NotFound {
                resource: resource.to_string(),
                id: id.to_string(),
            })?;

        match (resource, mutation) {
            (_, Mutation::Delete) => {
                rows.remove(index);
            }
            (ViewName::Messages, Mutation::Star(starred)) => rows[index].starred = *starred,
            (ViewName::Messages, Mutation::Read(read)) => rows[index].unread = !*read,
            (ViewName::Messages, Mutation::Archive) => set_detail(&mut rows[index], "Folder", "ARCHIVE"),
            (ViewName::Events, Mutation::Rsvp(answer)) => {
                set_detail(&mut rows[index], "RSVP", &answer.to_string());
            }
            (ViewName::Webhooks, Mutation::Test) => {}
            (resource, mutation) => {
                return Err(ApiError::Unsupported {
                    operation: format!("{mutation:?}"),
                    resource: resource.to_string(),
                });
            }
        }

        data.mutations.push(RecordedMutation {
            grant: grant.to_string(),
            resource,
            id: id.to_string(),
            mutation: mutation.clone(),
        });
        Ok(())
    }

    fn submit(&self, _grant: &str, submission: &FormSubmission) -> Result<(), ApiError> {
        let mut data = self.begin()?;
        data.next_id += 1;
        let fresh_id = format!("demo-{}", data.next_id);
        let field = |label: &str| submission.field(label).unwrap_or_default().to_string();

        let (resource, row) = match submission.kind {
            FormKind::Message => {
                let subject = field("Subject");
                let row = Row::new(
                    fresh_id,
                    vec!["me".into(), subject.clone(), now_label(0)],
                )
                .with_details(vec![
                    ("From".into(), "me".into()),
                    ("To".into(), field("To")),
                    ("Subject".into(), subject),
                    ("Folder".into(), "SENT".into()),
                    ("Body".into(), field("Body")),
                ]);
                (ViewName::Messages, row)
            }
            FormKind::Event => (
                ViewName::Events,
                Row::new(
                    submission.id.clone().unwrap_or(fresh_id),
                    vec![field("Title"), field("When"), field("Location")],
                )
                .with_details(submission.fields.clone()),
            ),
            FormKind::Contact => (
                ViewName::Contacts,
                Row::new(
                    submission.id.clone().unwrap_or(fresh_id),
                    vec![field("Name"), field("Email"), field("Company")],
                )
                .with_details(submission.fields.clone()),
            ),
            FormKind::Webhook => (
                ViewName::Webhooks,
                Row::new(
                    submission.id.clone().unwrap_or(fresh_id),
                    vec![field("URL"), field("Triggers"), "active".into()],
                )
                .with_details(submission.fields.clone()),
            ),
        };

        let rows = data.records.entry(resource).or_default();
        match rows.iter_mut().find(|existing| existing.id == row.id) {
            Some(existing) => *existing = row,
            None => rows.insert(0, row),
        }
        data.submissions.push(submission.clone());
        Ok(())
    }
}

/// Grant store that keeps the default grant in memory.
#[derive(Debug, Default)]
pub struct MemoryGrantStore {
    default_grant: Mutex<Option<String>>,
}

impl MemoryGrantStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The grant most recently made default, if any.
    pub fn default_grant(&self) -> Option<String> {
        self.default_grant
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl GrantStore for MemoryGrantStore {
    fn set_default_grant(&self, id: &str) -> Result<(), ApiError> {
        if id.trim().is_empty() {
            return Err(ApiError::other("grant id cannot be empty"));
        }
        *self
            .default_grant
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(id.to_string());
        Ok(())
    }
}

fn set_detail(row: &mut Row, label: &str, value: &str) {
    match row.details.iter_mut().find(|(key, _)| key == label) {
        Some((_, existing)) => *existing = value.to_string(),
        None => row.details.push((label.to_string(), value.to_string())),
    }
}

/// Format a timestamp `hours_ago` hours in the past.
fn now_label(hours_ago: i64) -> String {
    (Local::now() - TimeDelta::hours(hours_ago))
        .format("%b %d %H:%M")
        .to_string()
}

/// Format a timestamp `hours` hours in the future.
fn ahead_label(hours: i64) -> String {
    (Local::now() + TimeDelta::hours(hours))
        .format("%a %b %d %H:%M")
        .to_string()
}

fn detail_pairs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

fn sample_messages() -> Vec<Row> {
    let samples = [
        ("Priya Natarajan", "Quarterly planning notes", DEFAULT_FOLDER, true, 1),
        ("Build Bot", "Nightly build passed", DEFAULT_FOLDER, true, 3),
        ("Marco Rossi", "Lunch on Thursday?", DEFAULT_FOLDER, false, 5),
        ("Billing", "Your invoice is ready", DEFAULT_FOLDER, false, 9),
        ("Sam Okafor", "Re: design review", DEFAULT_FOLDER, true, 20),
        ("Newsletter", "This week in Rust", DEFAULT_FOLDER, false, 30),
        ("me", "Slides for Monday", "SENT", false, 26),
        ("Old Thread", "Archived conversation", "TRASH", false, 200),
    ];

    samples
        .iter()
        .enumerate()
        .map(|(index, (from, subject, folder, unread, hours))| {
            let received = now_label(*hours);
            let mut row = Row::new(
                format!("msg-{}", index + 1),
                vec![from.to_string(), subject.to_string(), received.clone()],
            )
            .with_details(detail_pairs(&[
                ("From", from),
                ("To", "alex@example.com"),
                ("Subject", subject),
                ("Date", &received),
                ("Folder", folder),
                ("Body", "Hi Alex,\n\nSee the notes below.\n\nThanks"),
            ]));
            row.unread = *unread;
            row.starred = index == 0;
            row
        })
        .collect()
}

fn sample_drafts() -> Vec<Row> {
    vec![
        Row::new(
            "draft-1",
            vec!["team@example.com".into(), "Offsite agenda".into(), now_label(2)],
        )
        .with_details(detail_pairs(&[("To", "team@example.com"), ("Subject", "Offsite agenda")])),
        Row::new(
            "draft-2",
            vec!["marco@example.com".into(), "Re: Lunch".into(), now_label(6)],
        )
        .with_details(detail_pairs(&[("To", "marco@example.com"), ("Subject", "Re: Lunch")])),
    ]
}

fn sample_events() -> Vec<Row> {
    let samples = [
        ("Standup", 2, "Zoom"),
        ("Design review", 5, "Room 4B"),
        ("1:1 with Priya", 26, "Cafe"),
        ("Quarterly planning", 50, "Main hall"),
        ("Dentist", 74, "Downtown"),
    ];
    samples
        .iter()
        .enumerate()
        .map(|(index, (title, hours, location))| {
            let when = ahead_label(*hours);
            Row::new(
                format!("evt-{}", index + 1),
                vec![title.to_string(), when.clone(), location.to_string()],
            )
            .with_details(detail_pairs(&[
                ("Title", title),
                ("When", &when),
                ("Location", location),
                ("RSVP", "pending"),
            ]))
        })
        .collect()
}

fn sample_availability() -> Vec<Row> {
    [(3, "30m"), (6, "60m"), (27, "45m"), (30, "30m")]
        .iter()
        .enumerate()
        .map(|(index, (hours, duration))| {
            Row::new(
                format!("slot-{}", index + 1),
                vec![ahead_label(*hours), duration.to_string(), "free".into()],
            )
        })
        .collect()
}

fn sample_contacts() -> Vec<Row> {
    [
        ("Priya Natarajan", "priya@example.com", "Acme"),
        ("Marco Rossi", "marco@example.com", "Acme"),
        ("Sam Okafor", "sam@example.org", "Globex"),
        ("Lin Wei", "lin@example.net", "Initech"),
        ("Dana Scully", "dana@example.gov", "FBI"),
    ]
    .iter()
    .enumerate()
    .map(|(index, (name, email, company))| {
        Row::new(
            format!("ct-{}", index + 1),
            vec![name.to_string(), email.to_string(), company.to_string()],
        )
        .with_details(detail_pairs(&[("Name", name), ("Email", email), ("Company", company)]))
    })
    .collect()
}

fn sample_webhooks() -> Vec<Row> {
    [
        ("https://hooks.example.com/mail", "message.created", "active"),
        ("https://hooks.example.com/cal", "event.updated", "active"),
        ("https://old.example.com/hook", "contact.deleted", "failing"),
    ]
    .iter()
    .enumerate()
    .map(|(index, (url, triggers, status))| {
        Row::new(
            format!("wh-{}", index + 1),
            vec![url.to_string(), triggers.to_string(), status.to_string()],
        )
        .with_details(detail_pairs(&[("URL", url), ("Triggers", triggers), ("Status", status)]))
    })
    .collect()
}

fn sample_webhook_deliveries() -> Vec<Row> {
    vec![
        Row::new("dlv-1", vec![now_label(0), "message.created".into(), "msg-1".into()]),
        Row::new("dlv-2", vec![now_label(1), "event.updated".into(), "evt-2".into()]),
    ]
}

fn sample_grants() -> Vec<Row> {
    DemoClient::grants()
        .into_iter()
        .map(|grant| {
            Row::new(
                grant.id.clone(),
                vec![grant.email.clone(), grant.provider.clone(), grant.id.clone()],
            )
            .with_details(vec![
                ("Email".into(), grant.email),
                ("Provider".into(), grant.provider),
                ("Grant ID".into(), grant.id),
            ])
        })
        .collect()
}

fn sample_inboxes() -> Vec<Row> {
    vec![
        Row::new("inb-1", vec!["support".into(), "support@in.example.com".into(), "12".into()]),
        Row::new("inb-2", vec!["sales".into(), "sales@in.example.com".into(), "3".into()]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_messages_defaults_to_inbox() {
        let client = DemoClient::new();
        let rows = client
            .list("g", ViewName::Messages, &Query::default())
            .unwrap();
        assert!(!rows.is_empty());
        assert!(rows.iter().all(|row| row.detail("Folder") == Some(DEFAULT_FOLDER)));
    }

    #[test]
    fn test_list_applies_filter() {
        let client = DemoClient::new();
        let query = Query {
            filter: "lunch".into(),
            folder: None,
        };
        let rows = client.list("g", ViewName::Messages, &query).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cells[1], "Lunch on Thursday?");
    }

    #[test]
    fn test_delete_removes_and_records() {
        let client = DemoClient::new();
        client
            .mutate("g", ViewName::Contacts, "ct-1", &Mutation::Delete)
            .unwrap();
        let rows = client.list("g", ViewName::Contacts, &Query::default()).unwrap();
        assert!(rows.iter().all(|row| row.id != "ct-1"));
        assert_eq!(client.mutations().len(), 1);
    }

    #[test]
    fn test_unsupported_mutation_is_rejected() {
        let client = DemoClient::new();
        let err = client
            .mutate("g", ViewName::Contacts, "ct-1", &Mutation::Star(true))
            .unwrap_err();
        assert!(matches!(err, ApiError::Unsupported { .. }));
        assert!(client.mutations().is_empty());
    }

    #[test]
    fn test_injected_failure() {
        let client = DemoClient::new();
        client.set_failure(Some(ApiError::Network {
            message: "offline".into(),
        }));
        assert!(client.summary("g").is_err());
        client.set_failure(None);
        assert!(client.summary("g").is_ok());
    }

    #[test]
    fn test_memory_grant_store_rejects_empty_id() {
        let store = MemoryGrantStore::new();
        assert!(store.set_default_grant("  ").is_err());
        store.set_default_grant("grant-demo-2").unwrap();
        assert_eq!(store.default_grant().as_deref(), Some("grant-demo-2"));
    }
}
