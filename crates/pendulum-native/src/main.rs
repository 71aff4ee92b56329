mod audio;
mod render;
mod scene;

use std::cell::Cell;
use std::rc::Rc;

use audio::CpalAudio;
use clap::Parser;
use pendulum_core::constants::{DEFAULT_SURFACE_HEIGHT, DEFAULT_SURFACE_WIDTH, FRAME_RATE};
use pendulum_core::offline::{ManualFrameClock, OfflineAudio};
use pendulum_core::{
    patch_from_control, Config, ConfigPatch, FrameClock, Geometry, RenderStyle, Simulation,
};
use render::GpuState;
use scene::SceneBuilder;
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowBuilder;

/// Pendulum wave: arcs sweeping at slightly different speeds, each one chiming
/// as it crosses the base line.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Number of arcs
    #[arg(short, long, default_value = "10")]
    arcs: String,
    /// Wave type: sine, square, sawtooth or triangle
    #[arg(short, long, default_value = "sine")]
    waveform: String,
    /// Frequency of the outermost arc in Hz
    #[arg(short, long, default_value = "200")]
    base_frequency: String,
    /// Seconds until the pattern realigns
    #[arg(short, long, default_value = "100")]
    time: String,
    /// Run without a window or audio device and report the triggers
    #[arg(long)]
    headless: bool,
    /// Frames to simulate in headless mode
    #[arg(short, long, default_value_t = 3600)]
    frames: u64,
}

impl Cli {
    /// Run every option through the same parsing and range checks as the web controls.
    fn config(&self, geometry: Geometry) -> anyhow::Result<Config> {
        let controls = [
            ("arc_count", &self.arcs),
            ("waveform", &self.waveform),
            ("base_frequency", &self.base_frequency),
            ("cycle_window", &self.time),
        ];
        let mut config = Config {
            geometry,
            ..Config::default()
        };
        for (key, raw) in controls {
            config = config.merged(&patch_from_control(key, raw)?);
        }
        config.validate()?;
        Ok(config)
    }
}

/// Frame clock for the winit loop: a request just raises a flag that the
/// next `AboutToWait` consumes.
#[derive(Clone, Default)]
struct RedrawFlag(Rc<Cell<bool>>);

impl RedrawFlag {
    fn take(&self) -> bool {
        self.0.replace(false)
    }
}

impl FrameClock for RedrawFlag {
    fn request_frame(&mut self) {
        self.0.set(true);
    }

    fn cancel_frame(&mut self) {
        self.0.set(false);
    }
}

type NativeSim = Simulation<CpalAudio, RedrawFlag>;

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    if cli.headless {
        run_headless(&cli)
    } else {
        run_window(&cli)
    }
}

fn toggle(sim: &mut NativeSim) {
    if sim.is_running() {
        sim.stop();
    } else if let Err(e) = sim.start() {
        log::error!("[loop] start failed: {}", e);
    }
}

fn apply(sim: &mut NativeSim, patch: &ConfigPatch) {
    if let Err(e) = sim.configure(patch) {
        log::warn!("[config] {}", e);
    }
}

fn step_arc_count(sim: &mut NativeSim, delta: i64) {
    let next = sim.config().arc_count as i64 + delta;
    match patch_from_control("arc_count", &next.to_string()) {
        Ok(patch) => apply(sim, &patch),
        Err(e) => log::warn!("[config] {}", e),
    }
}

fn run_window(cli: &Cli) -> anyhow::Result<()> {
    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("Pendulum Wave (native)")
        .with_inner_size(winit::dpi::LogicalSize::new(
            DEFAULT_SURFACE_WIDTH,
            DEFAULT_SURFACE_HEIGHT,
        ))
        .build(&event_loop)?;

    let mut gpu = pollster::block_on(GpuState::new(&window))?;
    let size = window.inner_size();
    let (width, height) = (size.width.max(1) as f64, size.height.max(1) as f64);
    let style = RenderStyle::default();
    let config = cli.config(style.geometry_for(width, height))?;

    let audio = CpalAudio::new().unwrap_or_else(|e| {
        log::warn!("[audio] {}; continuing without sound", e);
        CpalAudio::silent()
    });
    let flag = RedrawFlag::default();
    let mut sim: NativeSim = Simulation::new(config, audio, flag.clone(), style)?;
    if let Err(e) = sim.rebuild() {
        log::error!("[init] {}", e);
    }
    let mut scene = SceneBuilder::new(width, height);
    sim.redraw(&mut scene);
    log::info!("[init] space toggles, up/down change the arc count, w cycles the wave type");

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent {
            event: WindowEvent::Resized(size),
            ..
        } => {
            gpu.resize(size);
            let (w, h) = (size.width.max(1) as f64, size.height.max(1) as f64);
            scene.resize(w, h);
            let geometry = sim.style().geometry_for(w, h);
            apply(&mut sim, &ConfigPatch::default().geometry(geometry));
        }
        Event::WindowEvent {
            event: WindowEvent::CloseRequested,
            ..
        } => elwt.exit(),
        Event::WindowEvent {
            event:
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            logical_key,
                            state: ElementState::Pressed,
                            repeat: false,
                            ..
                        },
                    ..
                },
            ..
        } => match logical_key {
            Key::Named(NamedKey::Space) => toggle(&mut sim),
            Key::Named(NamedKey::ArrowUp) => step_arc_count(&mut sim, 1),
            Key::Named(NamedKey::ArrowDown) => step_arc_count(&mut sim, -1),
            Key::Named(NamedKey::Escape) => elwt.exit(),
            Key::Character(c) if c.as_str().eq_ignore_ascii_case("w") => {
                let next = sim.config().waveform.next();
                log::info!("[config] wave type {}", next);
                apply(&mut sim, &ConfigPatch::default().waveform(next));
            }
            _ => {}
        },
        Event::AboutToWait => {
            if !flag.take() || sim.frame(&mut scene).is_none() {
                sim.redraw(&mut scene);
            }
            match gpu.render(scene.vertices()) {
                Ok(_) => gpu.window.request_redraw(),
                Err(wgpu::SurfaceError::Lost) => gpu.resize(gpu.window.inner_size()),
                Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                Err(e) => log::debug!("[render] {:?}", e),
            }
        }
        Event::LoopExiting => sim.shutdown(),
        _ => {}
    })?;
    Ok(())
}

fn run_headless(cli: &Cli) -> anyhow::Result<()> {
    let style = RenderStyle::default();
    let config = cli.config(style.geometry_for(DEFAULT_SURFACE_WIDTH, DEFAULT_SURFACE_HEIGHT))?;
    let audio = OfflineAudio::new();
    let mut sim = Simulation::new(config, audio.clone(), ManualFrameClock::default(), style)?;
    let mut scene = SceneBuilder::new(DEFAULT_SURFACE_WIDTH, DEFAULT_SURFACE_HEIGHT);
    sim.start()?;

    let frames_per_second = FRAME_RATE as u64;
    let mut window_triggers = 0;
    let mut total_triggers = 0;
    for _ in 0..cli.frames {
        let Some(report) = sim.frame(&mut scene) else {
            break;
        };
        audio.advance_clock(1.0 / FRAME_RATE);
        window_triggers += report.triggers;
        total_triggers += report.triggers;
        if report.frame % frames_per_second == 0 {
            log::info!(
                "[headless] t={:>4}s triggers={:>3} vertices={}",
                report.frame / frames_per_second,
                window_triggers,
                scene.vertices().len()
            );
            window_triggers = 0;
        }
    }

    for (i, arc) in sim.ensemble().arcs().iter().enumerate() {
        log::info!(
            "[headless] arc {:>2}: {:.0} Hz, {:.4} rad/frame, {} triggers",
            i,
            arc.frequency(),
            arc.angular_velocity(),
            arc.voice().trigger_count()
        );
    }
    log::info!(
        "[headless] {} frames, {} triggers, {} tones, {} labels skipped",
        sim.render_loop().frames(),
        total_triggers,
        audio.tones_created(),
        scene.skipped_labels()
    );
    sim.shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("pendulum-native").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_give_the_default_config() {
        let config = cli(&[]).config(Geometry::default()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn options_go_through_control_ranges() {
        let config = cli(&["-a", "12", "-w", "triangle", "-b", "300"])
            .config(Geometry::default())
            .unwrap();
        assert_eq!(config.arc_count, 12);
        assert_eq!(config.waveform, pendulum_core::Waveform::Triangle);
        assert_eq!(config.base_frequency, 300.0);

        assert!(cli(&["-a", "40"]).config(Geometry::default()).is_err());
        assert!(cli(&["-w", "noise"]).config(Geometry::default()).is_err());
    }

    #[test]
    fn redraw_flag_is_consumed_once() {
        let mut flag = RedrawFlag::default();
        let shared = flag.clone();
        flag.request_frame();
        assert!(shared.take());
        assert!(!shared.take());
        flag.request_frame();
        flag.cancel_frame();
        assert!(!shared.take());
    }
}
