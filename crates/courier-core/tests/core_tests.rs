use std::sync::Arc;
use std::time::{Duration, Instant};

use courier_core::{
    Action, ApiClient, ChordDetector, ChordOutcome, CommandRegistry, Config, DemoClient,
    GrantIdentity, GrantStore, MemoryGrantStore, Mutation, PageStack, Query, Resolution,
    StalePolicy, ViewName, resolve,
};

#[test]
fn test_page_stack_never_drops_below_one() {
    let mut stack = PageStack::new("dashboard", ());
    let ops = [true, true, false, false, false, true, false, false, true, true, true];
    for push in ops {
        if push {
            stack.push("detail", ());
        } else {
            stack.pop();
        }
        assert!(stack.len() >= 1);
    }
}

#[test]
fn test_switch_to_leaves_single_named_entry() {
    let mut stack = PageStack::new("dashboard", ());
    stack.push("detail", ());
    stack.switch_to("events", ());
    assert_eq!(stack.top(), Some("events"));
    assert_eq!(stack.len(), 1);
}

#[test]
fn test_chord_timing() {
    let mut chord = ChordDetector::new();
    let start = Instant::now();

    chord.press('g', start);
    assert_eq!(
        chord.press('g', start + Duration::from_millis(100)),
        ChordOutcome::Complete('g')
    );

    chord.press('g', start);
    assert_eq!(
        chord.press('g', start + Duration::from_millis(600)),
        ChordOutcome::Pending
    );
}

#[test]
fn test_resolver_table() {
    let registry = CommandRegistry::with_defaults();

    assert_eq!(resolve(&registry, "42"), Resolution::Action(Action::SelectRow(42)));
    for input in ["messages", "m", "msg"] {
        assert_eq!(
            resolve(&registry, input),
            Resolution::Action(Action::Navigate(ViewName::Messages))
        );
    }
    assert_eq!(
        resolve(&registry, "e events"),
        Resolution::Action(Action::Navigate(ViewName::Events))
    );
    assert_eq!(resolve(&registry, "bogus-command"), Resolution::Ignored);
}

#[test]
fn test_every_navigation_alias_targets_a_view() {
    let registry = CommandRegistry::with_defaults();
    let cases = [
        ("dr", ViewName::Drafts),
        ("cal", ViewName::Events),
        ("findtime", ViewName::Availability),
        ("ct", ViewName::Contacts),
        ("wh", ViewName::Webhooks),
        ("server", ViewName::WebhookServer),
        ("gr", ViewName::Grants),
        ("in", ViewName::Inbound),
        ("home", ViewName::Dashboard),
    ];
    for (alias, view) in cases {
        assert_eq!(
            resolve(&registry, alias),
            Resolution::Action(Action::Navigate(view)),
            "alias {alias}"
        );
    }
}

#[test]
fn test_vim_and_folder_commands() {
    let registry = CommandRegistry::with_defaults();
    assert_eq!(resolve(&registry, "q!"), Resolution::Action(Action::Quit));
    assert_eq!(resolve(&registry, "x"), Resolution::Action(Action::Quit));
    assert_eq!(resolve(&registry, "gg"), Resolution::Action(Action::JumpToTop));
    assert_eq!(
        resolve(&registry, "sent"),
        Resolution::Action(Action::OpenFolder("SENT".into()))
    );
    assert_eq!(
        resolve(&registry, "rsvp maybe"),
        Resolution::Action(Action::Rsvp(courier_core::Rsvp::Maybe))
    );
}

#[test]
fn test_config_builder_with_grant_store() {
    let store = Arc::new(MemoryGrantStore::new());
    let config = Config::builder()
        .client(Arc::new(DemoClient::new()))
        .grant_store(store)
        .grant(GrantIdentity::new("grant-demo-1", "alex@example.com", "google"))
        .refresh_interval(Duration::ZERO)
        .initial_view(ViewName::Messages)
        .stale_policy(StalePolicy::Apply)
        .build()
        .unwrap();

    assert!(config.grant_store.is_some());
    assert_eq!(config.initial_view, ViewName::Messages);
    assert_eq!(config.refresh_interval, Duration::ZERO);
}

#[test]
fn test_demo_client_archive_moves_out_of_inbox() {
    let client = DemoClient::new();
    let before = client.list("g", ViewName::Messages, &Query::default()).unwrap();
    let id = before[0].id.clone();

    client
        .mutate("g", ViewName::Messages, &id, &Mutation::Archive)
        .unwrap();

    let after = client.list("g", ViewName::Messages, &Query::default()).unwrap();
    assert_eq!(after.len(), before.len() - 1);
    assert!(after.iter().all(|row| row.id != id));
}

#[test]
fn test_memory_grant_store_records_default() {
    let store = MemoryGrantStore::new();
    assert_eq!(store.default_grant(), None);
    store.set_default_grant("grant-demo-3").unwrap();
    assert_eq!(store.default_grant().as_deref(), Some("grant-demo-3"));
}

#[test]
fn test_kernel_actions_are_not_forwarded() {
    assert!(Action::Navigate(ViewName::Events).is_kernel());
    assert!(Action::OpenFolder("SENT".into()).is_kernel());
    assert!(!Action::Delete.is_kernel());
    assert!(!Action::JumpToTop.is_kernel());
}

#[test]
fn test_top_mut_edits_visible_entry() {
    let mut stack = PageStack::new("messages", 0);
    stack.push("detail", 1);
    if let Some(entry) = stack.top_mut() {
        entry.surface = 7;
    }
    assert_eq!(stack.top_entry().map(|entry| entry.surface), Some(7));
    assert_eq!(stack.base().map(|entry| entry.surface), Some(0));
}
