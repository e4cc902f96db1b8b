//! Game state management - score, levels, win/lose conditions.
//!
//! Win: clear all bubbles from the grid, which loads the next level.
//! Lose: a bubble comes to rest on the bottom row.
//!
//! [`GameSession`] owns everything that changes during play and advances
//! one tick at a time. The ECS side only feeds it commands and forwards
//! what happened.

use bevy::prelude::*;
use rand::{SeedableRng, rngs::StdRng};

use super::{
    bubble::{Bubble, BubbleColor},
    cluster::{ClusterPopped, FloatingBubblesRemoved},
    config::GameConfig,
    grid::{GridBounds, HexGrid},
    levels::{LevelSet, LevelTemplate},
    projectile::{BubbleLanded, FireShooter, Playfield, Projectile, SnapOutcome},
    shooter::{AimShooter, Shooter},
};

/// Uses the app's `GameSession` if one was inserted first, else a default one.
pub(super) fn plugin(app: &mut App) {
    app.init_resource::<GameSession>();
    app.register_type::<Phase>();
    app.add_message::<RestartGame>();
    app.add_message::<LevelAdvanced>();
    app.add_message::<GameOverReached>();

    app.add_systems(FixedUpdate, drive_session);
}

/// Message asking for a brand new run from level 1.
#[derive(Message, Debug, Clone)]
pub struct RestartGame;

/// Message sent when a cleared grid is replaced by the next level.
#[derive(Message, Debug, Clone)]
pub struct LevelAdvanced {
    pub level: u32,
}

/// Message sent once when the run ends.
#[derive(Message, Debug, Clone)]
pub struct GameOverReached {
    pub score: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum Phase {
    Playing,
    /// Terminal until restarted.
    GameOver,
}

/// Something observable that happened during a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickEvent {
    Bounced,
    Landed(Bubble),
    Discarded,
    ClusterPopped {
        color: BubbleColor,
        bubbles: Vec<Bubble>,
        points: u32,
    },
    FloatingRemoved {
        bubbles: Vec<Bubble>,
        points: u32,
    },
    LevelAdvanced {
        level: u32,
    },
    GameOver {
        score: u32,
    },
}

/// Snapshot of the session for whoever draws it.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub phase: Phase,
    pub score: u32,
    pub level: u32,
    pub projectile: Option<Projectile>,
    pub bubbles: Vec<Bubble>,
    pub shooter: Shooter,
    /// What happened during the tick that produced this view.
    pub events: Vec<TickEvent>,
}

/// One run of the game: grid, projectile, shooter, score and level.
#[derive(Resource, Debug)]
pub struct GameSession {
    config: GameConfig,
    levels: LevelSet,
    grid: HexGrid,
    projectile: Option<Projectile>,
    shooter: Shooter,
    score: u32,
    level: u32,
    phase: Phase,
    rng: StdRng,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(GameConfig::default(), LevelSet::builtin())
    }
}

impl GameSession {
    /// Start a run at level 1.
    pub fn new(config: GameConfig, levels: LevelSet) -> Self {
        let config = config.sanitized();
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let shooter = Shooter::new(config.shooter_origin(), &config.palette, &mut rng);
        let grid = build_grid(&config, levels.for_level(1));

        info!("Starting level 1 with {} bubbles", grid.len());

        Self {
            config,
            levels,
            grid,
            projectile: None,
            shooter,
            score: 0,
            level: 1,
            phase: Phase::Playing,
            rng,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &HexGrid {
        &self.grid
    }

    pub fn projectile(&self) -> Option<&Projectile> {
        self.projectile.as_ref()
    }

    pub fn shooter(&self) -> &Shooter {
        &self.shooter
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn playfield(&self) -> Playfield {
        Playfield {
            width: self.config.playfield_width,
            height: self.config.playfield_height,
        }
    }

    /// Replace the grid with a fresh one built from `template`.
    ///
    /// Score and level number are kept; any projectile in flight is dropped.
    pub fn load_level(&mut self, template: &LevelTemplate) {
        self.grid = build_grid(&self.config, template);
        self.projectile = None;
        self.phase = Phase::Playing;
    }

    /// Throw everything away and start again from level 1.
    pub fn restart(&mut self) {
        self.score = 0;
        self.level = 1;
        self.shooter = Shooter::new(
            self.config.shooter_origin(),
            &self.config.palette,
            &mut self.rng,
        );
        let template = self.levels.for_level(1).clone();
        self.load_level(&template);
        info!("Game restarted");
    }

    /// Aim the shooter. Ignored once the run is over.
    pub fn aim(&mut self, angle: f32) {
        if self.phase == Phase::Playing {
            self.shooter.aim(angle);
        }
    }

    /// Aim the shooter at a playfield point. Ignored once the run is over.
    pub fn aim_at(&mut self, target: Vec2) {
        if self.phase == Phase::Playing {
            self.shooter.aim_at(target);
        }
    }

    /// Launch a projectile.
    ///
    /// Returns false, changing nothing, if one is already in flight, the run
    /// is over, or the shot has no vertical motion and would bounce between
    /// the walls forever.
    pub fn fire(&mut self, color: BubbleColor, origin: Vec2, angle: f32, speed: f32) -> bool {
        if self.phase != Phase::Playing || self.projectile.is_some() {
            return false;
        }

        let projectile = Projectile::launch(color, origin, angle, speed, self.config.bubble_radius);
        if !projectile.velocity.is_finite() || projectile.velocity.y == 0.0 {
            warn!(
                "Rejected shot with velocity {:?} (angle {}, speed {})",
                projectile.velocity, angle, speed
            );
            return false;
        }
        debug!(
            "Fired {:?} bubble from {:?} with velocity {:?}",
            color, origin, projectile.velocity
        );
        self.projectile = Some(projectile);
        true
    }

    /// Fire the shooter's loaded color along its aim, then reload.
    pub fn fire_loaded(&mut self) -> bool {
        let Shooter {
            position,
            angle,
            loaded,
            ..
        } = self.shooter;
        if !self.fire(loaded, position, angle, self.config.projectile_speed) {
            return false;
        }
        self.shooter.reload(&self.config.palette, &mut self.rng);
        true
    }

    /// Advance one frame and report what the renderer needs.
    pub fn tick(&mut self) -> SessionView {
        let mut events = Vec::new();
        if self.phase == Phase::Playing {
            self.advance_projectile(&mut events);
        }
        self.snapshot(events)
    }

    /// Current state without advancing.
    pub fn view(&self) -> SessionView {
        self.snapshot(Vec::new())
    }

    fn snapshot(&self, events: Vec<TickEvent>) -> SessionView {
        SessionView {
            phase: self.phase,
            score: self.score,
            level: self.level,
            projectile: self.projectile.clone(),
            bubbles: self.grid.iter().collect(),
            shooter: self.shooter.clone(),
            events,
        }
    }

    fn advance_projectile(&mut self, events: &mut Vec<TickEvent>) {
        let playfield = self.playfield();
        let Some(projectile) = self.projectile.as_mut() else {
            return;
        };

        let step = projectile.step(&playfield, &self.grid);
        if step.bounced {
            debug!("Projectile bounced at {:?}", projectile.position);
            events.push(TickEvent::Bounced);
        }
        if step.out_of_play {
            self.projectile = None;
            warn!("Projectile fell out of the playfield, discarding it");
            events.push(TickEvent::Discarded);
            self.check_game_over(events);
            return;
        }
        let Some(contact) = step.contact else {
            return;
        };
        let Some(projectile) = self.projectile.take() else {
            return;
        };

        debug!("Projectile stopped by {:?}", contact);
        match projectile.snap(&mut self.grid, self.config.snap_radius()) {
            SnapOutcome::Placed(bubble) => {
                events.push(TickEvent::Landed(bubble));
                self.resolve_matches(bubble, events);
            }
            SnapOutcome::Discarded => {
                events.push(TickEvent::Discarded);
                self.check_game_over(events);
            }
        }
    }

    /// Pop the landed bubble's cluster, drop whatever it was holding up, then
    /// either move to the next level or check for game over.
    fn resolve_matches(&mut self, placed: Bubble, events: &mut Vec<TickEvent>) {
        let cluster = self.grid.find_cluster(placed);

        if cluster.len() >= self.config.min_cluster_size {
            self.grid.remove_bubbles(&cluster);
            let points = award(cluster.len(), self.config.pop_points);
            self.score = self.score.saturating_add(points);
            info!(
                "Cluster popped: {} {:?} bubbles, +{} points (total: {})",
                cluster.len(),
                placed.color,
                points,
                self.score
            );
            events.push(TickEvent::ClusterPopped {
                color: placed.color,
                bubbles: cluster,
                points,
            });

            let floating = self.grid.find_floating();
            if !floating.is_empty() {
                self.grid.remove_bubbles(&floating);
                let points = award(floating.len(), self.config.floating_points);
                self.score = self.score.saturating_add(points);
                info!(
                    "Floating bubbles removed: {}, +{} bonus points (total: {})",
                    floating.len(),
                    points,
                    self.score
                );
                events.push(TickEvent::FloatingRemoved {
                    bubbles: floating,
                    points,
                });
            }

            if self.grid.is_level_cleared() {
                self.advance_level(events);
                return;
            }
        }

        self.check_game_over(events);
    }

    fn advance_level(&mut self, events: &mut Vec<TickEvent>) {
        self.level += 1;
        self.grid = build_grid(&self.config, self.levels.for_level(self.level));
        self.projectile = None;
        info!(
            "Level cleared! Starting level {} (score: {})",
            self.level, self.score
        );
        events.push(TickEvent::LevelAdvanced { level: self.level });
    }

    fn check_game_over(&mut self, events: &mut Vec<TickEvent>) {
        if self.grid.is_game_over() {
            self.phase = Phase::GameOver;
            info!("GAME OVER! Bubbles reached the bottom. Final score: {}", self.score);
            events.push(TickEvent::GameOver { score: self.score });
        }
    }
}

/// Points for removing `count` bubbles, saturating at `u32::MAX`.
fn award(count: usize, points_each: u32) -> u32 {
    u32::try_from(count)
        .unwrap_or(u32::MAX)
        .saturating_mul(points_each)
}

fn build_grid(config: &GameConfig, template: &LevelTemplate) -> HexGrid {
    let mut grid = HexGrid::new(
        GridBounds::new(config.rows, config.cols),
        config.grid_origin(),
        config.bubble_radius,
    );
    grid.load_level(template, &config.palette);
    grid
}

/// Apply queued commands, then advance the session by exactly one tick.
fn drive_session(
    mut session: ResMut<GameSession>,
    mut restart_events: MessageReader<RestartGame>,
    mut aim_events: MessageReader<AimShooter>,
    mut fire_events: MessageReader<FireShooter>,
    mut landed_events: MessageWriter<BubbleLanded>,
    mut popped_events: MessageWriter<ClusterPopped>,
    mut floating_events: MessageWriter<FloatingBubblesRemoved>,
    mut level_events: MessageWriter<LevelAdvanced>,
    mut game_over_events: MessageWriter<GameOverReached>,
) {
    if restart_events.read().count() > 0 {
        session.restart();
    }

    for event in aim_events.read() {
        match *event {
            AimShooter::Angle(angle) => session.aim(angle),
            AimShooter::At(target) => session.aim_at(target),
        }
    }

    if fire_events.read().count() > 0 {
        session.fire_loaded();
    }

    for event in session.tick().events {
        match event {
            TickEvent::Bounced | TickEvent::Discarded => {}
            TickEvent::Landed(bubble) => {
                landed_events.write(BubbleLanded {
                    coord: bubble.coord,
                    color: bubble.color,
                });
            }
            TickEvent::ClusterPopped { color, bubbles, .. } => {
                popped_events.write(ClusterPopped {
                    coords: bubbles.iter().map(|b| b.coord).collect(),
                    color,
                    count: bubbles.len(),
                });
            }
            TickEvent::FloatingRemoved { bubbles, .. } => {
                floating_events.write(FloatingBubblesRemoved {
                    coords: bubbles.iter().map(|b| b.coord).collect(),
                    count: bubbles.len(),
                });
            }
            TickEvent::LevelAdvanced { level } => {
                level_events.write(LevelAdvanced { level });
            }
            TickEvent::GameOver { score } => {
                game_over_events.write(GameOverReached { score });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;
    use crate::game::hex::HexCoord;

    fn levels(layouts: Vec<Vec<Vec<u32>>>) -> LevelSet {
        let templates = layouts
            .into_iter()
            .enumerate()
            .map(|(i, layout)| LevelTemplate {
                id: i as u32 + 1,
                layout,
            })
            .collect();
        LevelSet::new(templates).unwrap()
    }

    fn session(layouts: Vec<Vec<Vec<u32>>>) -> GameSession {
        let config = GameConfig {
            seed: Some(7),
            ..default()
        };
        GameSession::new(config, levels(layouts))
    }

    /// Tick until the projectile is gone, collecting every event.
    fn run_until_landed(session: &mut GameSession) -> Vec<TickEvent> {
        let mut events = Vec::new();
        for _ in 0..200 {
            events.extend(session.tick().events);
            if session.projectile().is_none() {
                return events;
            }
        }
        panic!("projectile never landed");
    }

    #[test]
    fn test_new_session_starts_on_level_one() {
        let session = session(vec![vec![vec![1, 2, 3]]]);
        let view = session.view();
        assert_eq!(view.phase, Phase::Playing);
        assert_eq!(view.level, 1);
        assert_eq!(view.score, 0);
        assert_eq!(view.bubbles.len(), 3);
        assert!(view.projectile.is_none());
    }

    #[test]
    fn test_matching_run_pops_and_clears_level() {
        let mut session = session(vec![vec![vec![1, 1, 1]], vec![vec![2, 2]]]);

        // Just below and left of (0, 3): grazes (0, 2), nearest empty cell is (0, 3).
        assert!(session.fire(BubbleColor::Red, Vec2::new(150.0, 45.0), -FRAC_PI_2, 1.0));
        let view = session.tick();

        assert!(view.events.contains(&TickEvent::Landed(Bubble::new(
            HexCoord::new(0, 3),
            BubbleColor::Red
        ))));
        assert!(view.events.iter().any(|e| matches!(
            e,
            TickEvent::ClusterPopped { bubbles, points: 40, .. } if bubbles.len() == 4
        )));
        assert!(view.events.contains(&TickEvent::LevelAdvanced { level: 2 }));
        assert_eq!(view.score, 4 * session.config().pop_points);
        assert_eq!(view.level, 2);
        assert_eq!(view.phase, Phase::Playing);
        assert_eq!(view.bubbles.len(), 2);
        assert!(view.projectile.is_none());
    }

    #[test]
    fn test_small_cluster_stays() {
        let mut session = session(vec![vec![vec![1, 0, 0, 0, 0, 0, 0, 0, 0, 2]]]);
        // Misses everything and drifts up to the ceiling next to (0, 0).
        assert!(session.fire(BubbleColor::Red, Vec2::new(90.0, 45.0), -FRAC_PI_2, 1.0));
        let events = run_until_landed(&mut session);

        assert!(events.contains(&TickEvent::Landed(Bubble::new(
            HexCoord::new(0, 1),
            BubbleColor::Red
        ))));
        assert_eq!(session.score(), 0);
        assert_eq!(session.grid().len(), 3);
    }

    #[test]
    fn test_popping_drops_floating_bubbles() {
        // (1, 0) hangs from the red pair and holds up the cyan bubble at (2, 0).
        let mut session = session(vec![vec![vec![2, 1, 1], vec![1], vec![4], vec![], vec![]]]);
        assert!(session.grid().find_floating().is_empty());

        // Land a red bubble at (0, 3) to complete a red cluster of four.
        assert!(session.fire(BubbleColor::Red, Vec2::new(150.0, 45.0), -FRAC_PI_2, 1.0));
        let events = run_until_landed(&mut session);

        assert!(events.contains(&TickEvent::FloatingRemoved {
            bubbles: vec![Bubble::new(HexCoord::new(2, 0), BubbleColor::Cyan)],
            points: 20,
        }));
        assert_eq!(session.score(), 4 * 10 + 20);
        assert_eq!(session.grid().len(), 1);
        assert_eq!(session.level(), 1);
    }

    #[test]
    fn test_shot_travels_and_lands_under_grid() {
        let mut session = GameSession::new(
            GameConfig {
                seed: Some(1),
                ..default()
            },
            LevelSet::builtin(),
        );
        let origin = session.config().shooter_origin();
        assert!(session.fire(BubbleColor::Red, origin, -FRAC_PI_2, 15.0));
        let events = run_until_landed(&mut session);

        assert!(events.contains(&TickEvent::Landed(Bubble::new(
            HexCoord::new(4, 4),
            BubbleColor::Red
        ))));
        assert_eq!(session.grid().len(), 39);
        assert_eq!(session.phase(), Phase::Playing);
    }

    #[test]
    fn test_full_grid_discards_projectile() {
        let mut session = session(vec![vec![vec![1, 2]]]);
        let full: Vec<Vec<u32>> = (0..14).map(|row| vec![row % 6 + 1; 10]).collect();
        session.load_level(&LevelTemplate { id: 9, layout: full });

        let origin = session.config().shooter_origin();
        assert!(session.fire(BubbleColor::Red, origin, -FRAC_PI_2, 15.0));
        let events = run_until_landed(&mut session);

        assert!(events.contains(&TickEvent::Discarded));
        assert_eq!(session.score(), 0);
        assert_eq!(session.grid().len(), 140);
        assert_eq!(session.phase(), Phase::GameOver);
        assert!(events.contains(&TickEvent::GameOver { score: 0 }));
    }

    #[test]
    fn test_landing_on_bottom_row_ends_game() {
        let layout: Vec<Vec<u32>> = (0..13).map(|row| vec![row % 6 + 1; 10]).collect();
        let mut session = session(vec![layout]);

        let origin = session.config().shooter_origin();
        assert!(session.fire(BubbleColor::Amber, origin, -FRAC_PI_2, 15.0));
        let events = run_until_landed(&mut session);

        assert!(events.contains(&TickEvent::Landed(Bubble::new(
            HexCoord::new(13, 4),
            BubbleColor::Amber
        ))));
        assert_eq!(session.phase(), Phase::GameOver);

        // Terminal: no more shots, no more ticks.
        assert!(!session.fire(BubbleColor::Red, origin, -FRAC_PI_2, 15.0));
        assert!(session.tick().events.is_empty());
    }

    #[test]
    fn test_fire_is_rejected_while_in_flight() {
        let mut session = session(vec![vec![vec![1]]]);
        let origin = session.config().shooter_origin();
        assert!(session.fire(BubbleColor::Red, origin, -1.0, 15.0));
        let in_flight = session.projectile().cloned();
        assert!(!session.fire(BubbleColor::Lime, origin, -2.0, 15.0));
        assert_eq!(session.projectile().cloned(), in_flight);
    }

    #[test]
    fn test_downward_shot_falls_out_and_frees_the_shooter() {
        let mut session = session(vec![vec![vec![1, 2, 3]]]);
        let origin = session.config().shooter_origin();
        assert!(session.fire(BubbleColor::Red, origin, FRAC_PI_2, 15.0));
        let events = run_until_landed(&mut session);

        assert_eq!(events, vec![TickEvent::Discarded]);
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.grid().len(), 3);
        assert!(session.fire(BubbleColor::Red, origin, -FRAC_PI_2, 15.0));
    }

    #[test]
    fn test_shot_without_vertical_motion_is_rejected() {
        let mut session = session(vec![vec![vec![1]]]);
        let origin = session.config().shooter_origin();
        assert!(!session.fire(BubbleColor::Red, origin, 0.0, 15.0));
        assert!(!session.fire(BubbleColor::Red, origin, -1.0, 0.0));
        assert!(!session.fire(BubbleColor::Red, origin, f32::NAN, 15.0));
        assert!(session.projectile().is_none());
    }

    #[test]
    fn test_huge_point_values_saturate_score() {
        let config = GameConfig {
            seed: Some(7),
            pop_points: u32::MAX,
            ..default()
        };
        let mut session = GameSession::new(config, levels(vec![vec![vec![1, 1, 1]], vec![vec![2, 2]]]));
        assert!(session.fire(BubbleColor::Red, Vec2::new(150.0, 45.0), -FRAC_PI_2, 1.0));
        session.tick();

        assert_eq!(session.score(), u32::MAX);
        assert_eq!(session.level(), 2);
    }

    #[test]
    fn test_fire_loaded_uses_and_rotates_shooter_queue() {
        let mut session = session(vec![vec![vec![1]]]);
        session.aim(-1.2);
        let loaded = session.shooter().loaded;
        let next = session.shooter().next;

        assert!(session.fire_loaded());
        let projectile = session.projectile().unwrap();
        assert_eq!(projectile.color, loaded);
        let expected = Vec2::new((-1.2f32).cos(), (-1.2f32).sin()) * session.config().projectile_speed;
        assert!((projectile.velocity - expected).length() < 1e-4);
        assert_eq!(session.shooter().loaded, next);

        // Rejected shots do not consume the queue.
        assert!(!session.fire_loaded());
        assert_eq!(session.shooter().loaded, next);
    }

    #[test]
    fn test_restart_resets_score_and_level() {
        let mut session = session(vec![vec![vec![1, 1, 1]], vec![vec![2, 2]]]);
        assert!(session.fire(BubbleColor::Red, Vec2::new(150.0, 45.0), -FRAC_PI_2, 1.0));
        session.tick();
        assert_eq!(session.level(), 2);

        session.restart();
        let view = session.view();
        assert_eq!(view.level, 1);
        assert_eq!(view.score, 0);
        assert_eq!(view.phase, Phase::Playing);
        assert_eq!(view.bubbles.len(), 3);
    }

    #[test]
    fn test_plugin_drives_session_each_fixed_step() {
        let mut app = App::new();
        app.insert_resource(session(vec![vec![vec![1, 1, 1]], vec![vec![2, 2]]]));
        app.add_plugins(crate::game::plugin);

        app.world_mut().write_message(AimShooter::Angle(-1.0));
        app.world_mut().write_message(FireShooter);
        app.world_mut().run_schedule(FixedUpdate);

        let session = app.world().resource::<GameSession>();
        // The inserted session is kept, not replaced by a default one.
        assert_eq!(session.grid().len(), 3);
        assert_eq!(session.shooter().angle, -1.0);
        let projectile = session.projectile().expect("projectile should be in flight");
        assert!(projectile.position.y < session.config().shooter_origin().y);
    }
}
