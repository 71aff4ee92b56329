use pendulum_core::offline::{DrawCommand, OfflineAudio, OfflineTone, RecordingSurface};
use pendulum_core::*;
use std::f64::consts::{PI, TAU};

fn params(angular_velocity: f64) -> ArcParams {
    ArcParams {
        center_x: 500.0,
        center_y: 580.0,
        radius: 100.0,
        starting_angle: PI,
        angular_velocity,
        color: Rgb::WHITE,
        frequency: 220.0,
    }
}

fn make_arc(audio: &mut OfflineAudio, p: ArcParams) -> PendulumArc<OfflineTone> {
    let tone = audio
        .create_tone(Waveform::Sine, p.frequency)
        .expect("offline tone");
    PendulumArc::new(p, ToneVoice::new(tone, Envelope::default())).expect("valid arc")
}

/// Tick numbers (1-based) at which a crossing fired, with its kind.
fn crossings(arc: &mut PendulumArc<OfflineTone>, ticks: usize) -> Vec<(usize, Crossing)> {
    (1..=ticks)
        .filter_map(|tick| arc.advance(tick as f64 / 60.0).map(|c| (tick, c)))
        .collect()
}

#[test]
fn first_zero_crossing_from_half_turn() {
    let mut audio = OfflineAudio::new();
    let mut arc = make_arc(&mut audio, params(PI / 30.0));
    let hits = crossings(&mut arc, 30);
    assert_eq!(hits, vec![(30, Crossing::Zero)]);
    assert_eq!(arc.voice().trigger_count(), 1);
    assert_eq!(audio.trigger_count(), 1);
}

#[test]
fn crossings_alternate_every_half_revolution() {
    let mut audio = OfflineAudio::new();
    let mut arc = make_arc(&mut audio, params(PI / 30.0));
    let hits = crossings(&mut arc, 240);
    let ticks: Vec<usize> = hits.iter().map(|(t, _)| *t).collect();
    assert_eq!(ticks, vec![30, 60, 90, 120, 150, 180, 210, 240]);
    for pair in hits.windows(2) {
        assert_ne!(pair[0].1, pair[1].1, "crossing kinds must alternate");
    }
    assert_eq!(hits[0].1, Crossing::Zero);
}

#[test]
fn phase_stays_within_one_turn() {
    let mut audio = OfflineAudio::new();
    for w in [0.01, PI / 30.0, 0.7, 2.0, 3.1, -0.4, -3.0] {
        let mut arc = make_arc(&mut audio, params(w));
        for tick in 0..2_000 {
            arc.advance(tick as f64);
            let phase = arc.phase();
            assert!((0.0..TAU).contains(&phase), "w={w} phase={phase}");
        }
    }
}

#[test]
fn two_triggers_per_revolution_for_any_speed() {
    let mut audio = OfflineAudio::new();
    let ticks = 5_000;
    for w in [0.013, 0.05, 0.3, 1.0, 2.5, 3.0] {
        let mut arc = make_arc(&mut audio, params(w));
        let hits = crossings(&mut arc, ticks);
        let expected = 2.0 * ticks as f64 * w / TAU;
        let diff = (hits.len() as f64 - expected).abs();
        assert!(diff <= 2.0, "w={w}: {} triggers, expected ~{expected}", hits.len());
        for pair in hits.windows(2) {
            assert_ne!(pair[0].1, pair[1].1, "w={w}");
        }
    }
}

#[test]
fn motion_is_periodic_in_whole_revolutions() {
    let mut audio = OfflineAudio::new();
    let mut arc = make_arc(&mut audio, params(PI / 30.0));
    crossings(&mut arc, 60);
    let (x0, y0) = arc.marker().position();
    let p0 = arc.phase();
    let second = crossings(&mut arc, 60);
    assert_eq!(second.len(), 2);
    let (x1, y1) = arc.marker().position();
    assert!((arc.phase() - p0).abs() < 1e-6);
    assert!((x1 - x0).abs() < 1e-6 && (y1 - y0).abs() < 1e-6);
}

#[test]
fn negative_velocity_mirrors_the_crossings() {
    let mut audio = OfflineAudio::new();
    let mut arc = make_arc(&mut audio, params(-PI / 30.0));
    let hits = crossings(&mut arc, 90);
    assert_eq!(
        hits,
        vec![(30, Crossing::Zero), (60, Crossing::Midline), (90, Crossing::Zero)]
    );
}

#[test]
fn marker_never_drops_below_the_base_line() {
    let mut audio = OfflineAudio::new();
    let p = params(0.37);
    let mut arc = make_arc(&mut audio, p);
    for tick in 0..500 {
        arc.advance(tick as f64);
        let (x, y) = arc.marker().position();
        assert!(y <= p.center_y + 1e-9, "marker below base line at tick {tick}");
        let d = ((x - p.center_x).powi(2) + (y - p.center_y).powi(2)).sqrt();
        assert!((d - p.radius).abs() < 1e-6, "marker left the arc");
    }
}

#[test]
fn starting_angle_is_normalized() {
    let mut audio = OfflineAudio::new();
    let mut p = params(0.1);
    p.starting_angle = -PI / 2.0;
    let arc = make_arc(&mut audio, p);
    assert!((arc.phase() - 1.5 * PI).abs() < 1e-12);
    p.starting_angle = 3.0 * TAU;
    let arc = make_arc(&mut audio, p);
    assert_eq!(arc.phase(), 0.0);
}

#[test]
fn invalid_velocities_are_rejected() {
    let mut audio = OfflineAudio::new();
    for w in [0.0, PI, -PI, 4.0, f64::NAN, f64::INFINITY] {
        let tone = audio.create_tone(Waveform::Sine, 220.0).expect("tone");
        let err = PendulumArc::new(params(w), ToneVoice::new(tone, Envelope::default()));
        assert!(matches!(err, Err(ArcError::Velocity(_))), "w={w}");
    }
    let mut p = params(0.1);
    p.radius = 0.0;
    assert_eq!(p.validate(), Err(ArcError::Radius(0.0)));
}

#[test]
fn dispose_stops_once_and_freezes_the_arc() {
    let mut audio = OfflineAudio::new();
    let mut arc = make_arc(&mut audio, params(PI / 30.0));
    arc.advance(0.0);
    let phase = arc.phase();
    assert!(arc.dispose());
    assert!(!arc.dispose());
    assert_eq!(arc.state(), ArcState::Disposed);
    assert_eq!(audio.stop_count(0), 1);

    for tick in 0..100 {
        assert_eq!(arc.advance(tick as f64), None);
    }
    assert_eq!(arc.phase(), phase);
    assert_eq!(arc.voice().trigger_count(), 0);

    let mut surface = RecordingSurface::new(1000.0, 600.0);
    arc.draw(&mut surface, &RenderStyle::default());
    assert!(surface.commands.is_empty());

    drop(arc);
    assert_eq!(audio.stop_count(0), 1);
}

#[test]
fn drawing_strokes_the_upper_semicircle_and_label() {
    let mut audio = OfflineAudio::new();
    let p = params(0.1);
    let arc = make_arc(&mut audio, p);
    let mut surface = RecordingSurface::new(1000.0, 600.0);
    arc.draw(&mut surface, &RenderStyle::default());
    let cmds = surface.take();
    assert_eq!(cmds[0], DrawCommand::StrokeColor(Rgb::WHITE));
    assert!(cmds.contains(&DrawCommand::Arc {
        cx: 500.0,
        cy: 580.0,
        radius: 100.0,
        start: PI,
        end: TAU,
    }));
    assert!(cmds.contains(&DrawCommand::Text {
        text: "220".to_string(),
        x: 400.0,
        y: 590.0,
    }));
    assert_eq!(cmds.last(), Some(&DrawCommand::Fill));
}
