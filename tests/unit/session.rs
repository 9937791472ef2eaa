use super::*;
use crate::schedule::config::AnimationFormat;

#[test]
fn editor_opens_once() {
    let mut s = Session::new();
    assert!(s.try_open_editor());
    assert!(!s.try_open_editor());
    s.close_editor();
    assert!(!s.is_editor_open());
    assert!(s.try_open_editor());
}

#[test]
fn new_document_clears_seen_definitions_but_keeps_settings() {
    let mut s = Session::new();
    s.animation.frames_per_day = 96;
    s.export.format = AnimationFormat::Gif;
    assert!(s.mark_definition_seen(DefinitionId(3)));
    assert!(!s.mark_definition_seen(DefinitionId(3)));

    s.reset_for_new_document();
    assert!(!s.has_seen_definition(DefinitionId(3)));
    assert_eq!(s.animation.frames_per_day, 96);
    assert_eq!(s.export.format, AnimationFormat::Gif);
}

#[test]
fn defaults_match_the_export_dialog() {
    let s = Session::new();
    assert_eq!(s.animation.frames_per_day, 24);
    assert!(!s.animation.skip_nights);
    assert_eq!(s.export.resolution.to_string(), "1280x720");
    assert_eq!(s.export.frames_per_second, 24);
    assert_eq!(s.export.constant_rate_factor, 23);
}
