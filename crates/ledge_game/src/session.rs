//! One running level: the map, its entities and the per-tick update order.
//!
//! Tick order is fixed: one-shot player input, enemies, player, projectiles,
//! camera. Enemies see the player's position from the start of the tick.

use crate::camera::Camera;
use crate::config::GameConfig;
use crate::enemy::Enemy;
use crate::entity::{Entity, GameEvent, RenderState, TickContext};
use crate::player::{JumpKind, Player};
use crate::projectile::{Projectile, ProjectileFate};
use glam::Vec2;
use ledge_core::input::PlayerIntent;
use ledge_map::level::load_level_from_path;
use ledge_map::tilemap::DEFAULT_TILE_SIZE;
use ledge_map::{Aabb, LevelError, PlacedTile, TileKind, TileMap};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::path::Path;

pub const PLAYER_SPAWNER: (TileKind, u32) = (TileKind::Spawner, 0);
pub const ENEMY_SPAWNER: (TileKind, u32) = (TileKind::Spawner, 1);
pub const TREE: (TileKind, u32) = (TileKind::BigDecoration, 1);

/// Where the player starts when the level has no player spawner.
const FALLBACK_PLAYER_START: Vec2 = Vec2::new(50.0, 50.0);

/// Everything that happened in one tick, plus what to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub events: Vec<GameEvent>,
    pub player: RenderState,
    pub enemies: Vec<RenderState>,
}

pub struct LevelSession {
    pub map: TileMap,
    pub config: GameConfig,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    /// Tree canopies that shed leaf particles.
    pub leaf_emitters: Vec<Aabb>,
    pub camera: Camera,
    pub player_hits: u32,
    rng: SmallRng,
    tick: u64,
}

impl LevelSession {
    /// Load a level file. A missing file starts an empty level.
    pub fn load(path: &Path, config: GameConfig) -> Result<Self, LevelError> {
        let map = match load_level_from_path(path) {
            Ok(map) => map,
            Err(err) if err.is_not_found() => {
                log::warn!("{err}; starting with an empty level");
                TileMap::new(DEFAULT_TILE_SIZE)
            }
            Err(err) => return Err(err),
        };
        log::info!(
            "Loaded level {} ({} grid tiles, {} decorations)",
            path.display(),
            map.grid_len(),
            map.off_grid_tiles().len()
        );
        Ok(Self::from_map(map, config))
    }

    /// Build a session from an already loaded map. Spawner tiles are consumed.
    pub fn from_map(mut map: TileMap, config: GameConfig) -> Self {
        let leaf_emitters = map
            .extract(&[TREE], true)
            .into_iter()
            .map(|tree| Aabb::new(tree.pos.x + 4.0, tree.pos.y + 4.0, 23.0, 13.0))
            .collect();

        let mut player = Player::new(FALLBACK_PLAYER_START, config.player);
        let mut enemies = Vec::new();
        for spawner in map.extract(&[PLAYER_SPAWNER, ENEMY_SPAWNER], false) {
            if (spawner.kind, spawner.variant) == PLAYER_SPAWNER {
                player.body.position = spawner.pos;
            } else {
                enemies.push(Enemy::new(spawner.pos, config.enemy));
            }
        }

        let mut camera = Camera::new(config.viewport[0], config.viewport[1]);
        camera.lag = config.camera_lag;
        camera.snap_to(player.body.center());

        log::info!(
            "Session ready: player at ({:.0}, {:.0}), {} enemies, seed {}",
            player.body.position.x,
            player.body.position.y,
            enemies.len(),
            config.seed
        );
        Self {
            map,
            config,
            player,
            enemies,
            projectiles: Vec::new(),
            leaf_emitters,
            camera,
            player_hits: 0,
            rng: SmallRng::seed_from_u64(config.seed),
            tick: 0,
        }
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn tick(&mut self, intent: PlayerIntent) -> TickReport {
        let mut events = Vec::new();
        let player_pos = self.player.body().center();

        if intent.dash && self.player.dash() {
            events.push(GameEvent::DashStarted {
                pos: player_pos,
                facing: self.player.facing,
            });
        }
        if intent.jump {
            match self.player.jump() {
                Some(JumpKind::Normal) => events.push(GameEvent::Jumped { pos: player_pos }),
                Some(JumpKind::WallKick) => events.push(GameEvent::WallKicked { pos: player_pos }),
                None => {}
            }
        }

        let mut ctx = TickContext {
            map: &self.map,
            physics: &self.config.physics,
            rng: &mut self.rng,
            player_center: player_pos,
            events: &mut events,
        };
        let enemies: Vec<RenderState> = self
            .enemies
            .iter_mut()
            .map(|enemy| enemy.update(&mut ctx, Vec2::ZERO))
            .collect();
        let player = self
            .player
            .update(&mut ctx, Vec2::new(intent.move_x, 0.0));

        for event in events.iter() {
            if let GameEvent::Shot { pos, facing } = *event {
                self.projectiles.push(Projectile::new(
                    pos,
                    facing,
                    self.config.enemy.projectile_speed,
                ));
            }
        }
        self.step_projectiles(&mut events);

        self.camera.follow(self.player.body.center());
        self.tick += 1;
        TickReport {
            tick: self.tick,
            events,
            player,
            enemies,
        }
    }

    fn step_projectiles(&mut self, events: &mut Vec<GameEvent>) {
        let target = if self.player.is_invulnerable() {
            None
        } else {
            Some(self.player.body.rect())
        };
        let map = &self.map;
        let mut hits = 0;
        self.projectiles.retain_mut(|shot| {
            let fate = shot.step(map, target);
            match fate {
                ProjectileFate::HitWall => events.push(GameEvent::ProjectileHit { pos: shot.pos }),
                ProjectileFate::HitPlayer => {
                    events.push(GameEvent::PlayerHit { pos: shot.pos });
                    hits += 1;
                }
                ProjectileFate::Flying | ProjectileFate::Expired => {}
            }
            fate.is_alive()
        });
        if hits > 0 {
            self.player_hits += hits;
            log::debug!("player hit at tick {} ({} total)", self.tick, self.player_hits);
        }
    }

    /// Tiles under the camera, decorations first.
    pub fn visible_tiles(&self) -> Vec<PlacedTile> {
        self.map.tiles_visible_in(self.camera.view_rect())
    }
}
