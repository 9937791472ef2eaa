use super::*;
use crate::foundation::calendar::REFERENCE_YEAR;
use crate::foundation::error::LitError;
use crate::layer::store::{LayerStore, MemoryLayers};

fn md(m: u32, d: u32) -> MonthDay {
    MonthDay::new(m, d).unwrap()
}

fn tod(h: u32, m: u32, s: u32) -> TimeOfDay {
    TimeOfDay::new(h, m, s).unwrap()
}

fn layers(windows: &[(&str, &str)]) -> Vec<TaggedLayer> {
    let mut store = MemoryLayers::new();
    for (i, (dates, hours)) in windows.iter().enumerate() {
        let id = store.get_or_create(&format!("L{i}"));
        let mut l = TaggedLayer::load(&store, id);
        l.set_dates(&mut store, dates);
        l.set_hours(&mut store, hours);
    }
    TaggedLayer::load_all(&store)
}

#[test]
fn dates_are_sorted_starts_of_dates_layers() {
    let ls = layers(&[
        ("11/01 - 02/01", ""),
        ("", "08:00 - 09:00"),
        ("03/15 - 04/01", ""),
        ("03/02 - 03/03", ""),
    ]);
    assert_eq!(derive_dates(&ls), vec![md(3, 2), md(3, 15), md(11, 1)]);
}

#[test]
fn no_dates_layer_injects_new_year() {
    let ls = layers(&[("", "08:00 - 09:00")]);
    assert_eq!(derive_dates(&ls), vec![MonthDay::NEW_YEAR]);
    assert_eq!(derive_dates(&[]), vec![MonthDay::NEW_YEAR]);
}

#[test]
fn hourly_sampling_ends_on_midnight() {
    let offsets = derive_offsets(24).unwrap();
    assert_eq!(offsets.len(), 24);
    assert_eq!(offsets[0], 3600);
    assert_eq!(*offsets.last().unwrap(), 86_400);
    assert!(offsets.windows(2).all(|w| w[1] - w[0] == 3600));

    let hours = derive_hours(24).unwrap();
    assert_eq!(hours[0], tod(1, 0, 0));
    assert_eq!(hours[22], tod(23, 0, 0));
    assert_eq!(hours[23], TimeOfDay::MIDNIGHT);
}

#[test]
fn uneven_steps_truncate() {
    let offsets = derive_offsets(7).unwrap();
    assert_eq!(offsets[0], 12_342);
    assert_eq!(*offsets.last().unwrap(), 86_394);

    let every_second = derive_hours(86_400).unwrap();
    assert_eq!(every_second.len(), 86_400);
    assert_eq!(every_second[0], tod(0, 0, 1));
}

#[test]
fn out_of_range_frames_per_day_is_a_configuration_error() {
    assert!(matches!(derive_hours(0), Err(LitError::Configuration(_))));
    assert!(matches!(
        derive_hours(86_401),
        Err(LitError::Configuration(_))
    ));
}

#[test]
fn sequence_is_dates_outer_hours_inner() {
    let dates = [md(1, 1), md(6, 1)];
    let hours = derive_hours(2).unwrap();
    let seq = build_sequence(&dates, &hours);
    assert_eq!(
        seq,
        vec![
            Sample { date: md(1, 1), time: tod(12, 0, 0) },
            Sample { date: md(1, 1), time: TimeOfDay::MIDNIGHT },
            Sample { date: md(6, 1), time: tod(12, 0, 0) },
            Sample { date: md(6, 1), time: TimeOfDay::MIDNIGHT },
        ]
    );
    assert_eq!(seq, build_sequence(&dates, &hours));
}

#[test]
fn timestamps_add_utc_offset() {
    // 2021-01-01T00:00:00Z
    let base = 1_609_459_200;
    assert_eq!(
        timestamp_for(MonthDay::NEW_YEAR, TimeOfDay::MIDNIGHT, REFERENCE_YEAR, 0).unwrap(),
        base
    );
    assert_eq!(
        timestamp_for(md(1, 2), tod(1, 0, 0), REFERENCE_YEAR, -3600).unwrap(),
        base + 86_400
    );
}

#[test]
fn overflowing_utc_offset_is_rejected() {
    for offset in [i64::MAX, i64::MIN] {
        let err = timestamp_for(md(1, 1), TimeOfDay::MIDNIGHT, REFERENCE_YEAR, offset).unwrap_err();
        assert!(matches!(err, LitError::Validation(_)));
    }
    let samples = build_sequence(&[md(1, 1)], &derive_hours(2).unwrap());
    assert!(schedule(&samples, REFERENCE_YEAR, i64::MAX).is_err());
}

#[test]
fn schedule_keeps_order() {
    let samples = build_sequence(&[md(3, 1)], &derive_hours(4).unwrap());
    let seq = schedule(&samples, REFERENCE_YEAR, 0).unwrap();
    assert_eq!(seq.len(), 4);
    assert!(seq.frames()[..3].windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    // The midnight sample belongs to the start of its own day.
    assert!(seq.frames()[3].timestamp < seq.frames()[0].timestamp);
}

#[test]
fn skip_nights_drops_frames_outside_daylight() {
    let samples = build_sequence(&[md(3, 1)], &derive_hours(24).unwrap());
    let seq = schedule(&samples, REFERENCE_YEAR, 0).unwrap();
    let day_start = seq.frames()[23].timestamp;
    let bounds = SunBounds {
        sunrise: day_start + 6 * 3600,
        sunset: day_start + 18 * 3600,
    };

    let mut asked = 0;
    let kept = apply_skip_nights(seq.clone(), true, |_| {
        asked += 1;
        bounds
    });
    assert_eq!(asked, 24);
    assert_eq!(kept.len(), 13);
    assert_eq!(kept.frames()[0].sample.time, tod(6, 0, 0));
    assert_eq!(kept.frames()[12].sample.time, tod(18, 0, 0));

    let untouched = apply_skip_nights(seq.clone(), false, |_| bounds);
    assert_eq!(untouched, seq);
}

#[test]
fn frame_numbers_are_gapless() {
    let samples = build_sequence(&[md(3, 1)], &derive_hours(6).unwrap());
    let seq = schedule(&samples, REFERENCE_YEAR, 0).unwrap();
    let kept = apply_skip_nights(seq, true, |ts| SunBounds {
        sunrise: ts - (ts % 86_400) + 8 * 3600,
        sunset: ts - (ts % 86_400) + 20 * 3600,
    });
    let numbered = number_frames(&kept);
    assert_eq!(
        numbered.iter().map(|(i, _)| *i).collect::<Vec<_>>(),
        (0..kept.len() as u64).collect::<Vec<_>>()
    );
}
