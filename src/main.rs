//! Chef Runner entry point
//!
//! The browser build is driven through `WebRunner` (see `web.rs`). Natively
//! this runs a headless autopilot run and records the score.
//!
//! Usage: `chef-runner [seed] [easy|medium|hard] [level]`
//! Set `CHEF_RUNNER_DATA` to choose where the session is stored.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use chef_runner::audio::LogAudio;
    use chef_runner::consts::SIM_DT;
    use chef_runner::persistence::{FileStorage, SessionStore};
    use chef_runner::sim::{Difficulty, GameEvent, RunStatus};
    use chef_runner::{Game, RunConfig};

    /// Simulated seconds before the demo gives up
    const DEMO_LIMIT_SECS: f32 = 180.0;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Chef Runner (native) starting...");

    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or_else(|| chef_runner::persistence::now_ms() as u64);
    let difficulty = args
        .next()
        .and_then(|s| Difficulty::from_str(&s))
        .unwrap_or_default();
    let start_level = args
        .next()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(1);

    let data_dir = std::env::var("CHEF_RUNNER_DATA").unwrap_or_else(|_| ".chef-runner".into());
    let store = SessionStore::new(Box::new(FileStorage::new(data_dir)));
    let mut game = Game::new(store, Box::new(LogAudio::default()));

    game.set_autopilot(true);
    game.start(RunConfig {
        difficulty,
        start_level,
        seed,
    });

    let max_ticks = (DEMO_LIMIT_SECS / SIM_DT) as u32;
    let mut ticks = 0;
    while game.status() == RunStatus::Playing && ticks < max_ticks {
        ticks += game.advance(SIM_DT);
        for event in game.recent_events() {
            match event {
                GameEvent::LevelUp { level } => println!("Level up! Now level {level}"),
                GameEvent::FuryStart => println!("Chef fury!"),
                GameEvent::PowerUpAcquired(kind) => println!("Power-up: {}", kind.as_str()),
                _ => {}
            }
        }
    }

    let view = game.frame();
    match game.status() {
        RunStatus::GameOver => println!(
            "Run over after {:.0} units: score {} (best {})",
            view.distance,
            game.session().history.first().map(|r| r.score).unwrap_or(0),
            game.session().best()
        ),
        _ => {
            println!(
                "Autopilot survived {:.0}s ({:.0} units, score {})",
                DEMO_LIMIT_SECS, view.distance, view.score
            );
            game.to_menu();
        }
    }
    if let Some(fault) = game.last_fault() {
        eprintln!("Run aborted: {fault}");
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser entry point is `WebRunner`; this only satisfies the bin target
}
