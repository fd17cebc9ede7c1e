//! Core types for courier.
//!
//! This crate holds the terminal-independent half of the dashboard kernel:
//! the domain model, the collaborator traits an API backend implements,
//! the command registry and resolver, the key-chord detector, the page
//! stack and the runtime configuration. It also ships an in-memory demo
//! backend.

mod action;
mod chord;
mod client;
mod commands;
mod config;
mod demo;
mod error;
mod model;
mod page_stack;
mod resolver;

pub use action::Action;
pub use chord::{CHORD_KEYS, CHORD_TIMEOUT, ChordDetector, ChordOutcome};
pub use client::{ApiClient, GrantStore};
pub use commands::{Category, CategoryGroup, Command, CommandRegistry, MAX_SUGGESTIONS};
pub use config::{Config, ConfigBuilder, ConfigBuilderError, StalePolicy};
pub use demo::{DEFAULT_FOLDER, DemoClient, MemoryGrantStore, RecordedMutation};
pub use error::{ApiError, KernelError};
pub use model::{
    FormKind, FormSubmission, GrantIdentity, Hint, Mutation, Query, Row, Rsvp, Summary, ViewName,
};
pub use page_stack::{PageEntry, PageStack};
pub use resolver::{Resolution, resolve, resolves};
