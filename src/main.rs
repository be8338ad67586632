//! Platformer Demo
//!
//! Plays a scripted run through two hand-authored levels (a coin level and
//! a boss level), logging events, then replays the first level to check
//! the state hash matches.
//!
//! `PLATFORMER_CONFIG` may point at a JSON world configuration.

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use platformer_core::{
    game::{
        enemy::EnemyKind,
        events::GameEventData,
        level::{EnemySpawn, PlatformMotion, PlatformSpec, PowerUpSpawn},
        pickup::PowerUpKind,
        player::{CharacterId, Weapon},
        tick::run_script,
    },
    Game, GameFlow, InputFrame, InputScript, LevelLayout, Session, StaticLevels, Vec2, WorldConfig,
    TICK_RATE, VERSION,
};

/// Ticks to play per level before giving up.
const LEVEL_TICK_LIMIT: u32 = 60 * TICK_RATE;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to set tracing subscriber")?;

    info!("Platformer Core v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);

    let config = match std::env::var("PLATFORMER_CONFIG") {
        Ok(path) => WorldConfig::from_json_file(&path).with_context(|| format!("loading {path}"))?,
        Err(_) => WorldConfig::default(),
    };

    demo_run(config)
}

/// Walk the flow from the menu through both levels.
fn demo_run(config: WorldConfig) -> anyhow::Result<()> {
    info!("=== Starting Demo Run ===");
    let rng_seed = 12345u64;
    let levels = StaticLevels::new(vec![coin_level(), boss_level()])?;
    let mut game = Game::new(config.clone(), levels, rng_seed)?;

    game.start()?;
    game.confirm_player(CharacterId(1))?;
    game.confirm_weapon(Weapon::BigSword)?;

    let script = demo_script();
    let mut total_events = 0usize;

    for t in 0..LEVEL_TICK_LIMIT * 2 {
        let result = game.update(script.frame_at(t));
        total_events += result.events.len();
        log_events(&result.events);

        match game.flow() {
            GameFlow::LevelComplete if game.session().level_index == 0 => game.next_level()?,
            GameFlow::LevelComplete | GameFlow::GameOver => break,
            _ => {}
        }
    }

    let session = game.session();
    info!("=== Run Results ===");
    info!("Flow: {}", game.flow().name());
    info!("Level: {}  Score: {}  Lives: {}", session.level_index, session.score, session.lives);
    info!("Total events: {}", total_events);
    let snapshot = game.snapshot().to_json()?;
    info!("Final snapshot: {} bytes", snapshot.len());

    verify_determinism(config, rng_seed, &script)
}

/// Play level 0 twice from the same seed and input; the hashes must match.
fn verify_determinism(config: WorldConfig, rng_seed: u64, script: &InputScript) -> anyhow::Result<()> {
    info!("=== Verifying Determinism ===");
    let mut first = Session::new(config.clone(), &coin_level(), rng_seed)?;
    let mut second = Session::new(config, &coin_level(), rng_seed)?;

    run_script(&mut first, script, LEVEL_TICK_LIMIT);
    run_script(&mut second, script, LEVEL_TICK_LIMIT);

    let hash = first.compute_hash();
    let replay_hash = second.compute_hash();
    info!("State Hash:  {}", hex::encode(hash));
    info!("Replay Hash: {}", hex::encode(replay_hash));

    if hash == replay_hash {
        info!("DETERMINISM VERIFIED: Hashes match!");
    } else {
        warn!("DETERMINISM FAILURE: Hashes differ!");
    }
    Ok(())
}

fn log_events(events: &[platformer_core::game::GameEvent]) {
    for event in events {
        match &event.data {
            GameEventData::EnemyDefeated { kind, award, new_score, .. } => {
                info!("Tick {}: {:?} defeated (+{}, score {})", event.tick, kind, award, new_score);
            }
            GameEventData::LifeLost { cause, lives_left } => {
                info!("Tick {}: life lost to {:?}, {} left", event.tick, cause, lives_left);
            }
            GameEventData::PowerUpCollected { kind } => {
                info!("Tick {}: picked up {:?}", event.tick, kind);
            }
            GameEventData::RunScore { final_score, reason } => {
                info!("Tick {}: final score {} ({:?})", event.tick, final_score, reason);
            }
            _ => {}
        }
    }
}

/// Run right along the floor, hopping and swinging, then turn back and fire.
fn demo_script() -> InputScript {
    let right = InputFrame::with(InputFrame::MOVE_RIGHT);
    let mut script = InputScript::new();
    for t in 0..400 {
        let frame = match t % 40 {
            20 | 21 => right.and(InputFrame::JUMP),
            0 | 1 if t > 0 => right.and(InputFrame::MELEE),
            _ => right,
        };
        script.record(t, frame);
    }
    script
        .hold(400, 200, InputFrame::with(InputFrame::MOVE_LEFT))
        .hold(600, 2, InputFrame::with(InputFrame::RANGED));
    script
}

fn coin_level() -> LevelLayout {
    LevelLayout {
        spawn_point: Vec2::new(40.0, 500.0),
        platforms: vec![
            PlatformSpec::fixed(0.0, 580.0, 800.0, 20.0),
            PlatformSpec::fixed(250.0, 470.0, 120.0, 20.0),
            PlatformSpec::moving(
                450.0,
                420.0,
                100.0,
                20.0,
                PlatformMotion { patrol_min_x: 400.0, patrol_max_x: 700.0, speed: 1.5 },
            ),
        ],
        coins: vec![
            Vec2::new(150.0, 540.0),
            Vec2::new(290.0, 430.0),
            Vec2::new(600.0, 540.0),
        ],
        enemies: vec![
            EnemySpawn::new(EnemyKind::Walker, Vec2::new(400.0, 530.0), 120.0),
            EnemySpawn::new(EnemyKind::Flyer, Vec2::new(650.0, 300.0), 100.0),
        ],
        power_up: Some(PowerUpSpawn {
            kind: PowerUpKind::OrbitShield,
            position: Vec2::new(200.0, 550.0),
        }),
        boss: None,
    }
}

fn boss_level() -> LevelLayout {
    LevelLayout {
        spawn_point: Vec2::new(60.0, 500.0),
        platforms: vec![PlatformSpec::fixed(0.0, 580.0, 800.0, 20.0)],
        coins: Vec::new(),
        enemies: vec![EnemySpawn::new(EnemyKind::Shooter, Vec2::new(600.0, 530.0), 80.0)],
        power_up: None,
        boss: Some(EnemySpawn::new(EnemyKind::Boss, Vec2::new(350.0, 150.0), 250.0)),
    }
}
