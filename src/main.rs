//! Headless autoplay: loads a session, fires random shots at a fixed rate
//! and exits when the run ends.
//!
//! `HEXPOP_CONFIG` and `HEXPOP_LEVELS` may point at JSON files overriding
//! the default tuning and the built-in levels.

use std::{env, path::Path, time::Duration};

use bevy::{app::ScheduleRunnerPlugin, log::LogPlugin, prelude::*};
use hexpop::{
    GameConfig, GamePlugin, GameSession, LevelSet, Phase,
    game::{projectile::FireShooter, shooter::AimShooter, state::GameOverReached},
};
use rand::Rng;

/// Give up after this many shots even if the run is still going.
const MAX_SHOTS: u32 = 500;

fn main() -> AppExit {
    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
            1.0 / 60.0,
        ))),
        LogPlugin::default(),
    ));

    // Inserted before `GamePlugin` so it does not build a default session.
    app.insert_resource(load_session())
        .insert_resource(Time::<Fixed>::from_hz(60.0))
        .add_plugins(GamePlugin)
        .add_systems(Update, (autoplay, exit_on_game_over))
        .run()
}

fn load_session() -> GameSession {
    let config = match env::var("HEXPOP_CONFIG") {
        Ok(path) => GameConfig::load_or_default(Path::new(&path)),
        Err(_) => GameConfig::default(),
    };
    let levels = match env::var("HEXPOP_LEVELS") {
        Ok(path) => LevelSet::load_or_default(Path::new(&path)),
        Err(_) => LevelSet::builtin(),
    };
    info!(
        "Loaded {}x{} grid config with {} levels",
        config.rows,
        config.cols,
        levels.len()
    );
    GameSession::new(config, levels)
}

/// Aim somewhere random and fire whenever the shooter is idle.
fn autoplay(
    session: Res<GameSession>,
    mut shots: Local<u32>,
    mut aim: MessageWriter<AimShooter>,
    mut fire: MessageWriter<FireShooter>,
    mut app_exit: MessageWriter<AppExit>,
) {
    if session.phase() != Phase::Playing || session.projectile().is_some() {
        return;
    }
    if *shots >= MAX_SHOTS {
        info!(
            "Stopping after {} shots on level {} with score {}",
            *shots,
            session.level(),
            session.score()
        );
        app_exit.write(AppExit::Success);
        return;
    }

    let angle = rand::rng().random_range(-2.8..-0.3);
    aim.write(AimShooter::Angle(angle));
    fire.write(FireShooter);
    *shots += 1;
}

fn exit_on_game_over(
    mut game_over: MessageReader<GameOverReached>,
    mut app_exit: MessageWriter<AppExit>,
) {
    if let Some(event) = game_over.read().last() {
        info!("Run over, final score {}", event.score);
        app_exit.write(AppExit::Success);
    }
}
