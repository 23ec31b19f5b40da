use shelf_core::{
    readable_size, validate_user_agent, AdvancedSettings, DohProvider, PreferenceKind, SettingsError,
    DEFAULT_USER_AGENT,
};

#[test]
fn defaults_are_conservative() {
    let settings = AdvancedSettings::default();
    assert!(!settings.verbose_logging);
    assert_eq!(settings.doh_provider, DohProvider::Disabled);
    assert_eq!(settings.user_agent, DEFAULT_USER_AGENT);
}

#[test]
fn apply_parses_and_reports_restart() {
    let mut settings = AdvancedSettings::default();

    let outcome = settings.apply("verbose_logging", "on").unwrap();
    assert!(settings.verbose_logging);
    assert!(outcome.requires_restart);

    let outcome = settings.apply("doh_provider", "quad 101").unwrap();
    assert_eq!(settings.doh_provider, DohProvider::Quad101);
    assert!(outcome.requires_restart);

    let outcome = settings.apply("auto_clear_chapter_cache", "yes").unwrap();
    assert!(settings.auto_clear_chapter_cache);
    assert!(!outcome.requires_restart);
}

#[test]
fn apply_rejects_bad_input_without_changing_state() {
    let mut settings = AdvancedSettings::default();
    assert_eq!(
        settings.apply("colour", "blue"),
        Err(SettingsError::UnknownKey("colour".to_string()))
    );
    assert!(settings.apply("verbose_logging", "maybe").is_err());
    assert!(settings.apply("doh_provider", "example").is_err());
    assert!(settings.apply("connectivity_probe", "localhost").is_err());
    assert!(settings.apply("user_agent", "bad\nagent").is_err());
    assert_eq!(settings, AdvancedSettings::default());
}

#[test]
fn user_agent_validation_matches_header_rules() {
    assert!(validate_user_agent("Mozilla/5.0 (X11; Linux x86_64)").is_ok());
    assert!(validate_user_agent("   ").is_err());
    assert!(validate_user_agent("tab\there").is_err());
    assert!(validate_user_agent("ünïcode").is_err());
}

#[test]
fn reset_user_agent_only_enabled_after_a_change() {
    let mut settings = AdvancedSettings::default();
    let reset_enabled = |settings: &AdvancedSettings| {
        settings
            .preference_groups(0, 0)
            .into_iter()
            .flat_map(|group| group.items)
            .find(|item| item.key == "reset_user_agent")
            .map(|item| item.enabled)
    };
    assert_eq!(reset_enabled(&settings), Some(false));

    settings.apply("user_agent", "shelf/1.0").unwrap();
    assert_eq!(reset_enabled(&settings), Some(true));

    assert!(settings.reset_user_agent().requires_restart);
    assert_eq!(settings.user_agent, DEFAULT_USER_AGENT);
    assert!(!settings.reset_user_agent().requires_restart);
}

#[test]
fn groups_reflect_current_values() {
    let mut settings = AdvancedSettings::default();
    settings.apply("doh_provider", "Cloudflare").unwrap();
    let groups = settings.preference_groups(3, 1536);

    let titles: Vec<&str> = groups.iter().map(|group| group.title).collect();
    assert_eq!(titles, vec!["Advanced", "Data", "Network"]);

    let doh = groups[2]
        .items
        .iter()
        .find(|item| item.key == "doh_provider")
        .unwrap();
    match &doh.kind {
        PreferenceKind::List { selected, entries } => {
            assert_eq!(selected, "Cloudflare");
            assert_eq!(entries.len(), 13);
        }
        other => panic!("unexpected kind {other:?}"),
    }

    let clear = groups[1]
        .items
        .iter()
        .find(|item| item.key == "clear_failed_updates")
        .unwrap();
    assert!(clear.enabled);
    assert_eq!(clear.subtitle.as_deref(), Some("3 recorded"));

    let data_keys: Vec<&str> = groups[1].items.iter().map(|item| item.key).collect();
    assert_eq!(
        data_keys,
        vec![
            "clear_chapter_cache",
            "auto_clear_chapter_cache",
            "clear_failed_updates"
        ]
    );
    assert_eq!(
        groups[1].items[0].subtitle.as_deref(),
        Some("Used: 1.5 KB")
    );
}

#[test]
fn readable_sizes_use_binary_units() {
    assert_eq!(readable_size(0), "0 B");
    assert_eq!(readable_size(1023), "1023 B");
    assert_eq!(readable_size(1024), "1.0 KB");
    assert_eq!(readable_size(5 * 1024 * 1024 + 512 * 1024), "5.5 MB");
    assert_eq!(readable_size(3 * 1024 * 1024 * 1024), "3.0 GB");
}
