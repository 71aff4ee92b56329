use pendulum_core::offline::{
    DrawCommand, ManualFrameClock, OfflineAudio, RecordingSurface, ToneEvent,
};
use pendulum_core::*;

type OfflineSimulation = Simulation<OfflineAudio, ManualFrameClock>;

fn make_sim(audio: &OfflineAudio) -> OfflineSimulation {
    Simulation::new(
        Config::default(),
        audio.clone(),
        ManualFrameClock::default(),
        RenderStyle::default(),
    )
    .expect("default config is valid")
}

fn surface() -> RecordingSurface {
    RecordingSurface::new(1000.0, 600.0)
}

/// Render `n` frames, advancing the audio clock by one frame each time.
fn run(sim: &mut OfflineSimulation, audio: &OfflineAudio, n: usize) -> usize {
    let mut s = surface();
    let mut triggers = 0;
    for _ in 0..n {
        audio.advance_clock(1.0 / 60.0);
        if let Some(report) = sim.frame(&mut s) {
            triggers += report.triggers;
        }
    }
    triggers
}

#[test]
fn invalid_initial_config_is_rejected() {
    let config = Config {
        arc_count: 0,
        ..Config::default()
    };
    let err = Simulation::new(
        config,
        OfflineAudio::new(),
        ManualFrameClock::default(),
        RenderStyle::default(),
    )
    .err();
    assert_eq!(err, Some(SimulationError::Config(ConfigError::ArcCount(0))));
}

#[test]
fn start_builds_the_ensemble_and_requests_a_frame() {
    let audio = OfflineAudio::new();
    let mut sim = make_sim(&audio);
    assert!(sim.ensemble().is_empty());
    assert!(sim.needs_rebuild());

    assert_eq!(sim.start(), Ok(true));
    assert_eq!(sim.ensemble().len(), 10);
    assert!(!sim.needs_rebuild());
    assert_eq!(sim.render_loop().clock().requested, 1);

    assert_eq!(sim.start(), Ok(false));
    assert_eq!(sim.ensemble().generation(), 1);
    assert_eq!(sim.render_loop().clock().requested, 1);
}

#[test]
fn each_frame_draws_the_base_line_first_and_schedules_the_next() {
    let audio = OfflineAudio::new();
    let mut sim = make_sim(&audio);
    sim.start().expect("start");
    let mut s = surface();
    let report = sim.frame(&mut s).expect("running");
    assert_eq!(report.frame, 1);

    assert_eq!(
        s.commands[0],
        DrawCommand::Clear {
            x: 0.0,
            y: 0.0,
            width: 1000.0,
            height: 600.0
        }
    );
    assert!(s.commands.contains(&DrawCommand::MoveTo(20.0, 580.0)));
    assert!(s.commands.contains(&DrawCommand::LineTo(980.0, 580.0)));
    let labels = s
        .commands
        .iter()
        .filter(|c| matches!(c, DrawCommand::Text { .. }))
        .count();
    assert_eq!(labels, 10);
    assert_eq!(sim.render_loop().clock().requested, 2);
}

#[test]
fn triggers_reach_the_audio_backend() {
    let audio = OfflineAudio::new();
    let mut sim = make_sim(&audio);
    sim.start().expect("start");
    // The outermost arc needs about 75 ticks to reach its first crossing.
    let triggers = run(&mut sim, &audio, 600);
    assert!(triggers > 10);
    assert_eq!(triggers, audio.trigger_count());
    let per_arc: u64 = sim
        .ensemble()
        .arcs()
        .iter()
        .map(|a| a.voice().trigger_count())
        .sum();
    assert_eq!(per_arc as usize, triggers);
}

#[test]
fn stop_suspends_audio_and_refuses_frames() {
    let audio = OfflineAudio::new();
    let mut sim = make_sim(&audio);
    sim.start().expect("start");
    run(&mut sim, &audio, 10);

    assert!(sim.stop());
    assert!(!sim.stop());
    assert!(audio.is_suspended());
    assert_eq!(sim.render_loop().clock().cancelled, 1);

    let mut s = surface();
    assert_eq!(sim.frame(&mut s), None);
    assert!(s.commands.is_empty());

    let t = audio.current_time();
    audio.advance_clock(5.0);
    assert_eq!(audio.current_time(), t);

    assert_eq!(sim.start(), Ok(true));
    assert!(!audio.is_suspended());
}

#[test]
fn pause_and_resume_keeps_the_phases() {
    let audio = OfflineAudio::new();
    let mut sim = make_sim(&audio);
    sim.start().expect("start");
    run(&mut sim, &audio, 40);
    let before: Vec<f64> = sim.ensemble().arcs().iter().map(|a| a.phase()).collect();
    let triggers = audio.trigger_count();

    sim.stop();
    run(&mut sim, &audio, 40);
    sim.start().expect("resume");

    let after: Vec<f64> = sim.ensemble().arcs().iter().map(|a| a.phase()).collect();
    assert_eq!(before, after);
    assert_eq!(audio.trigger_count(), triggers);
    assert_eq!(sim.ensemble().generation(), 1);
}

#[test]
fn invalid_change_keeps_the_previous_config() {
    let audio = OfflineAudio::new();
    let mut sim = make_sim(&audio);
    sim.start().expect("start");

    let err = sim.configure(&ConfigPatch::default().max_gain(1.5));
    assert_eq!(err, Err(SimulationError::Config(ConfigError::MaxGain(1.5))));
    assert_eq!(sim.config(), &Config::default());
    assert!(sim.is_running());
    assert!(!sim.needs_rebuild());
}

#[test]
fn change_that_would_fail_the_rebuild_is_rejected_up_front() {
    let audio = OfflineAudio::new();
    let mut sim = make_sim(&audio);
    sim.start().expect("start");

    let patch = ConfigPatch {
        cycle_window_secs: Some(f64::MAX),
        ..ConfigPatch::default()
    };
    let err = sim.configure(&patch);
    assert!(matches!(
        err,
        Err(SimulationError::Config(ConfigError::Velocity { .. }))
    ));
    assert_eq!(sim.config(), &Config::default());
    assert_eq!(sim.ensemble().len(), 10);
    assert!(sim.is_running());
    assert_eq!(audio.live_tones(), 10);
}

#[test]
fn unchanged_config_is_a_no_op() {
    let audio = OfflineAudio::new();
    let mut sim = make_sim(&audio);
    sim.start().expect("start");
    sim.configure(&ConfigPatch::default().arc_count(10))
        .expect("same value");
    assert!(sim.is_running());
    assert_eq!(sim.ensemble().generation(), 1);
}

#[test]
fn change_while_running_stops_and_rebuilds_on_next_start() {
    let audio = OfflineAudio::new();
    let mut sim = make_sim(&audio);
    sim.start().expect("start");
    run(&mut sim, &audio, 5);

    sim.configure(&ConfigPatch::default().arc_count(15))
        .expect("valid change");
    assert!(!sim.is_running());
    assert!(sim.needs_rebuild());
    assert_eq!(sim.ensemble().len(), 10);
    assert_eq!(sim.config().arc_count, 15);

    sim.start().expect("restart");
    assert_eq!(sim.ensemble().len(), 15);
    assert_eq!(sim.ensemble().generation(), 2);
    assert_eq!(audio.live_tones(), 15);
}

#[test]
fn change_while_stopped_rebuilds_immediately() {
    let audio = OfflineAudio::new();
    let mut sim = make_sim(&audio);
    sim.configure(&ConfigPatch::default().waveform(Waveform::Triangle))
        .expect("valid change");
    assert!(!sim.is_running());
    assert!(!sim.needs_rebuild());
    assert_eq!(sim.ensemble().len(), 10);
    assert_eq!(sim.config().waveform, Waveform::Triangle);
    assert!(audio.events().iter().all(|e| match e {
        ToneEvent::Created { waveform, .. } => *waveform == Waveform::Triangle,
        _ => true,
    }));
}

#[test]
fn failed_rebuild_is_retried_on_start() {
    let audio = OfflineAudio::with_tone_limit(4);
    let mut sim = make_sim(&audio);
    assert!(matches!(
        sim.start(),
        Err(SimulationError::Rebuild(EnsembleError::Voice { index: 5, .. }))
    ));
    assert!(!sim.is_running());
    assert!(sim.needs_rebuild());
    assert_eq!(audio.live_tones(), 0);

    audio.set_tone_limit(None);
    assert_eq!(sim.start(), Ok(true));
    assert_eq!(sim.ensemble().len(), 10);
}

#[test]
fn controls_feed_configure() {
    let audio = OfflineAudio::new();
    let mut sim = make_sim(&audio);
    let patch = patch_from_control("base_frequency", "300").expect("in range");
    sim.configure(&patch).expect("valid");
    assert_eq!(sim.ensemble().get(0).map(|a| a.frequency()), Some(320.0));
    assert!(patch_from_control("base_frequency", "9000").is_err());
}

#[test]
fn shutdown_stops_every_voice() {
    let audio = OfflineAudio::new();
    let mut sim = make_sim(&audio);
    sim.start().expect("start");
    sim.shutdown();
    assert!(!sim.is_running());
    assert!(sim.ensemble().is_empty());
    assert_eq!(audio.live_tones(), 0);
    drop(sim);
    for id in 0..audio.tones_created() {
        assert_eq!(audio.stop_count(id), 1);
    }
}

#[test]
fn resize_moves_the_arcs_with_the_base_line() {
    let audio = OfflineAudio::new();
    let mut sim = make_sim(&audio);
    let geometry = sim.style().geometry_for(1600.0, 900.0);
    sim.configure(&ConfigPatch::default().geometry(geometry))
        .expect("valid geometry");
    let outer = sim.ensemble().get(9).expect("ten arcs");
    assert_eq!(outer.params().center_y, 880.0);
    assert!((outer.radius() - 495.0).abs() < 1e-9);

    let mut s = RecordingSurface::new(1600.0, 900.0);
    sim.redraw(&mut s);
    assert!(s.commands.contains(&DrawCommand::MoveTo(300.0, 880.0)));
    assert!(s.commands.contains(&DrawCommand::LineTo(1300.0, 880.0)));
}
