use super::*;

#[test]
fn session_state_starts_unresolved() {
    let state = SessionState::new(ThemeMode::Auto);
    assert!(state.location.is_none());
    assert!(state.regional_content.is_none());
    assert!(!state.show_consent_modal);
    assert!(!state.loading_regional);
    assert_eq!(state.theme_mode, ThemeMode::Auto);
    assert!(state.resolved_theme.is_none());
}

#[tokio::test]
async fn update_is_visible_to_snapshot() {
    let session = Session::new(ThemeMode::Day);
    session.update(|s| s.show_consent_modal = true).await;
    assert!(session.snapshot().await.show_consent_modal);
    assert!(session.read(|s| s.show_consent_modal).await);
}

#[tokio::test]
async fn publish_reaches_subscribers() {
    let session = Session::new(ThemeMode::Day);
    let mut rx = session.subscribe();
    session.publish(StateEvent::ConsentRequired);
    assert_eq!(rx.recv().await.unwrap(), StateEvent::ConsentRequired);
}

#[test]
fn publish_without_subscribers_is_silent() {
    let session = Session::new(ThemeMode::Day);
    session.publish(StateEvent::ThemeResolved { theme: ResolvedTheme::Night });
}

#[test]
fn state_event_serializes_with_type_tag() {
    let json = serde_json::to_value(StateEvent::RegionalContentReplaced { region_code: "NG".into() }).unwrap();
    assert_eq!(json["type"], "regional_content_replaced");
    assert_eq!(json["region_code"], "NG");
}

#[test]
fn fallback_stats_count_per_kind() {
    let stats = FallbackStats::new();
    stats.record(FallbackKind::Geolocation);
    stats.record(FallbackKind::Geolocation);
    stats.record(FallbackKind::RegionalList);

    let clone = stats.clone();
    clone.record(FallbackKind::StorageWrite);

    let snap = stats.snapshot();
    assert_eq!(snap.geolocation, 2);
    assert_eq!(snap.regional_list, 1);
    assert_eq!(snap.storage_write, 1);
    assert_eq!(snap.global_list, 0);
    assert_eq!(snap.search, 0);
    assert_eq!(snap.unmapped_country, 0);
}
