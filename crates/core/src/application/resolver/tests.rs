use super::*;
use crate::domain::{ChangeKind, MaintenanceStatus};
use crate::port::change_feed::mocks::MockChangeFeed;
use crate::port::status_source::mocks::{MockReply, MockStatusSource};
use crate::port::FetchError;
use std::time::Duration;
use tokio::time::sleep;

/// Let every ready task run (the paused clock only advances when idle)
async fn settle() {
    sleep(Duration::from_millis(10)).await;
}

fn mount(
    path: &str,
    source: &MockStatusSource,
    feed: &MockChangeFeed,
) -> MaintenanceResolver {
    MaintenanceResolver::mount(
        path,
        Arc::new(source.clone()),
        Arc::new(feed.clone()),
        ResolverConfig::default(),
    )
}

fn change(kind: ChangeKind, key: &str) -> ChangeEvent {
    ChangeEvent::new(kind, PageKey::parse(key).unwrap())
}

#[tokio::test(start_paused = true)]
async fn test_maintenance_on_shows_notice_with_message() {
    let source = MockStatusSource::new_healthy();
    source.set_reply(
        "home",
        MockReply::Status(MaintenanceStatus::active("Back soon")),
    );
    let feed = MockChangeFeed::new();

    let resolver = mount("/", &source, &feed);
    settle().await;

    let snapshot = resolver.snapshot();
    assert!(snapshot.is_maintenance);
    assert_eq!(snapshot.maintenance_message.as_deref(), Some("Back soon"));
    assert!(!snapshot.is_loading);
    assert!(snapshot.error.is_none());
    assert_eq!(
        resolver.page_view(),
        PageView::Maintenance {
            message: "Back soon".to_string()
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_maintenance_off_renders_content() {
    let source = MockStatusSource::new_healthy();
    let feed = MockChangeFeed::new();

    let resolver = mount("/news", &source, &feed);
    settle().await;

    assert_eq!(resolver.snapshot().status(), MaintenanceStatus::default());
    assert_eq!(resolver.page_view(), PageView::Content);
}

#[tokio::test(start_paused = true)]
async fn test_loading_only_until_first_resolution() {
    let source = MockStatusSource::new(MockReply::Delayed(
        Duration::from_secs(1),
        MaintenanceStatus::default(),
    ));
    let feed = MockChangeFeed::new();

    let resolver = mount("/", &source, &feed);
    settle().await;
    assert!(resolver.snapshot().is_loading);

    sleep(Duration::from_secs(2)).await;
    assert!(!resolver.snapshot().is_loading);

    // later resolutions do not flip loading back on
    resolver.refresh();
    settle().await;
    assert!(!resolver.snapshot().is_loading);
}

#[tokio::test(start_paused = true)]
async fn test_failures_fail_open_with_error_marker() {
    let failures = vec![
        MockReply::Error(FetchError::Transport("dns error".into())),
        MockReply::Error(FetchError::Status(500)),
        MockReply::Error(FetchError::Malformed("missing field".into())),
    ];

    for reply in failures {
        let source = MockStatusSource::new(reply);
        let feed = MockChangeFeed::new();
        let resolver = mount("/", &source, &feed);
        settle().await;

        let snapshot = resolver.snapshot();
        assert_eq!(snapshot.status(), MaintenanceStatus::default());
        assert!(!snapshot.is_loading);
        assert!(snapshot.error.is_some());
        assert_eq!(resolver.page_view(), PageView::Content);
    }
}

#[tokio::test(start_paused = true)]
async fn test_timeout_after_five_seconds_fails_open() {
    let source = MockStatusSource::new(MockReply::Hang);
    let feed = MockChangeFeed::new();

    let resolver = mount("/", &source, &feed);
    sleep(Duration::from_millis(4_900)).await;
    assert!(resolver.snapshot().is_loading);

    sleep(Duration::from_millis(200)).await;
    let snapshot = resolver.snapshot();
    assert!(!snapshot.is_loading);
    assert_eq!(snapshot.status(), MaintenanceStatus::default());
    assert!(snapshot.error.unwrap().contains("timed out"));
}

#[tokio::test(start_paused = true)]
async fn test_path_change_rescopes_subscription_and_resolves_once() {
    let source = MockStatusSource::new_healthy();
    let feed = MockChangeFeed::new();

    let resolver = mount("/news", &source, &feed);
    settle().await;
    assert_eq!(source.calls_for("news"), 1);
    assert_eq!(feed.active_subscriptions(), vec![PageKey::from_path("/news")]);

    resolver.navigate("/casinos");
    settle().await;

    assert_eq!(source.calls_for("casinos"), 1);
    assert_eq!(source.calls_for("news"), 1);
    assert_eq!(feed.subscribe_count(), 2);
    assert_eq!(
        feed.active_subscriptions(),
        vec![PageKey::from_path("/casinos")]
    );
    assert_eq!(resolver.snapshot().page_key.as_str(), "casinos");

    // events for the old page no longer reach this resolver
    assert_eq!(feed.emit(change(ChangeKind::Update, "news")), 0);
}

#[tokio::test(start_paused = true)]
async fn test_navigate_to_same_key_is_a_no_op() {
    let source = MockStatusSource::new_healthy();
    let feed = MockChangeFeed::new();

    let resolver = mount("/news", &source, &feed);
    settle().await;
    resolver.navigate("/news/");
    settle().await;

    assert_eq!(source.call_count(), 1);
    assert_eq!(feed.subscribe_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_change_event_triggers_refetch() {
    let source = MockStatusSource::new_healthy();
    let feed = MockChangeFeed::new();

    let resolver = mount("/", &source, &feed);
    settle().await;
    assert_eq!(source.call_count(), 1);

    source.set_reply(
        "home",
        MockReply::Status(MaintenanceStatus::active("Upgrading")),
    );
    assert_eq!(feed.emit(change(ChangeKind::Update, "home")), 1);
    settle().await;

    assert_eq!(source.call_count(), 2);
    assert_eq!(
        resolver.snapshot().maintenance_message.as_deref(),
        Some("Upgrading")
    );
}

#[tokio::test(start_paused = true)]
async fn test_delete_event_refetches_instead_of_trusting_payload() {
    let source = MockStatusSource::new_healthy();
    source.set_reply("home", MockReply::Status(MaintenanceStatus::active("Down")));
    let feed = MockChangeFeed::new();

    let resolver = mount("/", &source, &feed);
    settle().await;

    // a delete hint arrives but the read endpoint still reports maintenance
    feed.emit(change(ChangeKind::Delete, "home"));
    settle().await;

    assert_eq!(source.call_count(), 2);
    assert!(resolver.snapshot().is_maintenance);
}

#[tokio::test(start_paused = true)]
async fn test_poll_interval_triggers_refetch() {
    let source = MockStatusSource::new_healthy();
    let feed = MockChangeFeed::new();

    let _resolver = mount("/", &source, &feed);
    settle().await;
    assert_eq!(source.call_count(), 1);

    sleep(Duration::from_secs(119)).await;
    assert_eq!(source.call_count(), 1);

    sleep(Duration::from_secs(2)).await;
    assert_eq!(source.call_count(), 2);

    sleep(Duration::from_secs(120)).await;
    assert_eq!(source.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_polling_continues_when_feed_unavailable() {
    let source = MockStatusSource::new_healthy();
    let feed = MockChangeFeed::new();
    feed.set_unavailable(true);

    let resolver = mount("/", &source, &feed);
    settle().await;
    assert!(!resolver.snapshot().is_loading);
    assert_eq!(feed.subscribe_count(), 0);

    sleep(Duration::from_secs(121)).await;
    assert_eq!(source.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_polling_continues_after_feed_closes() {
    let source = MockStatusSource::new_healthy();
    let feed = MockChangeFeed::new();

    let _resolver = mount("/", &source, &feed);
    settle().await;
    feed.disconnect_all();
    settle().await;
    assert_eq!(source.call_count(), 1);

    sleep(Duration::from_secs(121)).await;
    assert_eq!(source.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_manual_refresh() {
    let source = MockStatusSource::new_healthy();
    let feed = MockChangeFeed::new();

    let resolver = mount("/", &source, &feed);
    settle().await;
    resolver.refresh();
    settle().await;

    assert_eq!(source.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_superseded_slow_response_is_discarded() {
    let source = MockStatusSource::new_healthy();
    source.set_reply(
        "home",
        MockReply::Delayed(Duration::from_secs(3), MaintenanceStatus::active("stale")),
    );
    let feed = MockChangeFeed::new();

    let resolver = mount("/", &source, &feed);
    settle().await;

    resolver.navigate("/news");
    settle().await;
    assert_eq!(resolver.snapshot().page_key.as_str(), "news");
    assert!(!resolver.snapshot().is_maintenance);

    // the aborted home request never lands on the news scope
    sleep(Duration::from_secs(5)).await;
    let snapshot = resolver.snapshot();
    assert_eq!(snapshot.page_key.as_str(), "news");
    assert!(!snapshot.is_maintenance);
    assert!(snapshot.error.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_refresh_while_in_flight_runs_one_follow_up() {
    let source = MockStatusSource::new(MockReply::Delayed(
        Duration::from_secs(1),
        MaintenanceStatus::active("first"),
    ));
    let feed = MockChangeFeed::new();

    let resolver = mount("/", &source, &feed);
    settle().await;
    source.set_fallback(MockReply::Delayed(
        Duration::from_secs(1),
        MaintenanceStatus::active("second"),
    ));
    resolver.refresh();
    resolver.refresh();
    feed.emit(change(ChangeKind::Update, "home"));
    settle().await;
    assert_eq!(source.call_count(), 1);

    // the in-flight fetch completes, then exactly one follow-up runs
    sleep(Duration::from_millis(1_100)).await;
    assert_eq!(source.call_count(), 2);
    assert_eq!(
        resolver.snapshot().maintenance_message.as_deref(),
        Some("first")
    );

    sleep(Duration::from_secs(2)).await;
    assert_eq!(source.call_count(), 2);
    assert_eq!(
        resolver.snapshot().maintenance_message.as_deref(),
        Some("second")
    );
}

#[tokio::test(start_paused = true)]
async fn test_steady_events_cannot_starve_timeout() {
    let source = MockStatusSource::new(MockReply::Hang);
    let feed = MockChangeFeed::new();

    let resolver = mount("/", &source, &feed);
    for _ in 0..30 {
        sleep(Duration::from_secs(4)).await;
        feed.emit(change(ChangeKind::Update, "home"));
    }
    settle().await;

    let snapshot = resolver.snapshot();
    assert!(!snapshot.is_loading);
    assert_eq!(snapshot.status(), MaintenanceStatus::default());
    assert!(snapshot.error.unwrap().contains("timed out"));

    // one attempt per 5s timeout window, not one per event
    assert!(source.call_count() <= 26, "calls: {}", source.call_count());
}

#[tokio::test(start_paused = true)]
async fn test_poll_counts_from_last_resolution() {
    let source = MockStatusSource::new_healthy();
    let feed = MockChangeFeed::new();

    let _resolver = mount("/", &source, &feed);
    sleep(Duration::from_secs(100)).await;
    feed.emit(change(ChangeKind::Update, "home"));
    settle().await;
    assert_eq!(source.call_count(), 2);

    // t=121: the original schedule would have polled here
    sleep(Duration::from_secs(21)).await;
    assert_eq!(source.call_count(), 2);

    // t=221: a full interval after the event-driven fetch
    sleep(Duration::from_secs(100)).await;
    assert_eq!(source.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_watch_notifies_on_change_only() {
    let source = MockStatusSource::new_healthy();
    let feed = MockChangeFeed::new();

    let resolver = mount("/", &source, &feed);
    let mut rx = resolver.watch();
    settle().await;
    assert!(rx.has_changed().unwrap());
    rx.borrow_and_update();

    // same backend state: no notification
    resolver.refresh();
    settle().await;
    assert!(!rx.has_changed().unwrap());

    source.set_reply("home", MockReply::Status(MaintenanceStatus::active("x")));
    resolver.refresh();
    settle().await;
    assert!(rx.has_changed().unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_unmount_tears_down_timer_and_subscription() {
    let source = MockStatusSource::new_healthy();
    let feed = MockChangeFeed::new();

    let resolver = mount("/", &source, &feed);
    settle().await;
    assert_eq!(feed.active_subscriptions().len(), 1);

    resolver.unmount().await;
    assert!(feed.active_subscriptions().is_empty());

    let calls = source.call_count();
    assert_eq!(feed.emit(change(ChangeKind::Update, "home")), 0);
    sleep(Duration::from_secs(600)).await;
    assert_eq!(source.call_count(), calls);
}

#[tokio::test(start_paused = true)]
async fn test_drop_stops_driver() {
    let source = MockStatusSource::new_healthy();
    let feed = MockChangeFeed::new();

    let resolver = mount("/", &source, &feed);
    settle().await;
    drop(resolver);
    settle().await;

    assert!(feed.active_subscriptions().is_empty());
    sleep(Duration::from_secs(600)).await;
    assert_eq!(source.call_count(), 1);
}
