//! Patrolling enemy: idles, occasionally walks for a while, turns around at
//! walls and ledges, and fires when the player is level with it as a walk
//! ends.

use crate::entity::{Entity, Facing, GameEvent, RenderState, TickContext};
use crate::physics::PhysicsBody;
use glam::Vec2;
use rand::Rng;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub size: [f32; 2],
    /// Per-tick chance of leaving idle.
    pub walk_chance: f64,
    pub walk_min_ticks: u32,
    pub walk_max_ticks: u32,
    pub walk_speed: f32,
    /// Horizontal distance from the body center to the ground probe.
    pub probe_distance: f32,
    /// Vertical distance from the body top to the ground probe.
    pub probe_depth: f32,
    pub shot_range_y: f32,
    pub projectile_speed: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            size: [8.0, 15.0],
            walk_chance: 0.01,
            walk_min_ticks: 30,
            walk_max_ticks: 120,
            walk_speed: 0.5,
            probe_distance: 7.0,
            probe_depth: 23.0,
            shot_range_y: 16.0,
            projectile_speed: 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyState {
    Idle,
    Walking,
}

impl EnemyState {
    pub fn animation(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Walking => "run",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub body: PhysicsBody,
    pub config: EnemyConfig,
    pub facing: Facing,
    /// Remaining walk ticks; zero while idle.
    pub walking: u32,
    pub state: EnemyState,
}

impl Enemy {
    pub fn new(position: Vec2, config: EnemyConfig) -> Self {
        Self {
            body: PhysicsBody::new(position, Vec2::from(config.size)),
            config,
            facing: Facing::Right,
            walking: 0,
            state: EnemyState::Idle,
        }
    }

    /// Point one step ahead and below the feet that must be solid ground for
    /// the enemy to keep walking.
    pub fn ground_probe(&self) -> Vec2 {
        Vec2::new(
            self.body.center().x + self.config.probe_distance * self.facing.sign(),
            self.body.position.y + self.config.probe_depth,
        )
    }

    fn try_shoot(&self, ctx: &mut TickContext<'_>) {
        let center = self.body.center();
        let offset = ctx.player_center - center;
        if offset.y.abs() >= self.config.shot_range_y {
            return;
        }
        if offset.x * self.facing.sign() > 0.0 {
            let muzzle = Vec2::new(
                center.x + self.config.probe_distance * self.facing.sign(),
                center.y,
            );
            ctx.events.push(GameEvent::Shot {
                pos: muzzle,
                facing: self.facing,
            });
        }
    }
}

impl Entity for Enemy {
    fn body(&self) -> &PhysicsBody {
        &self.body
    }

    fn update(&mut self, ctx: &mut TickContext<'_>, movement: Vec2) -> RenderState {
        let mut movement = movement;
        if self.walking > 0 {
            // Contact flags are from the previous tick's step.
            if ctx.map.solid_check(self.ground_probe()).is_none()
                || self.body.collisions.horizontal()
            {
                self.facing = self.facing.flipped();
            } else {
                movement.x += self.config.walk_speed * self.facing.sign();
            }
            self.walking -= 1;
            if self.walking == 0 {
                self.try_shoot(ctx);
            }
        } else if ctx.rng.gen_bool(self.config.walk_chance) {
            self.walking = ctx
                .rng
                .gen_range(self.config.walk_min_ticks..=self.config.walk_max_ticks);
            log::trace!("enemy starts walking for {} ticks", self.walking);
        }

        self.body.update(ctx.map, movement, ctx.physics);
        if let Some(facing) = Facing::from_movement(movement.x) {
            self.facing = facing;
        }
        self.state = if self.walking > 0 {
            EnemyState::Walking
        } else {
            EnemyState::Idle
        };
        self.render_state()
    }

    fn render_state(&self) -> RenderState {
        RenderState {
            position: self.body.position,
            size: self.body.size,
            facing: self.facing,
            action: self.state.animation(),
            visible: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::PhysicsConfig;
    use ledge_map::{GridPos, TileKind, TileMap};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    /// Ledge spanning columns 2..=8 on row 10, optionally walled at its
    /// right end.
    fn ledge_map(with_wall: bool) -> TileMap {
        let mut map = TileMap::new(16);
        for x in 2..=8 {
            map.place(GridPos::new(x, 10), TileKind::Grass, 1);
        }
        if with_wall {
            map.place(GridPos::new(8, 9), TileKind::Cobblestone, 1);
        }
        map
    }

    fn step(
        enemy: &mut Enemy,
        map: &TileMap,
        rng: &mut SmallRng,
        events: &mut Vec<GameEvent>,
        player_center: Vec2,
    ) {
        let physics = PhysicsConfig::default();
        let mut ctx = TickContext {
            map,
            physics: &physics,
            rng,
            player_center,
            events,
        };
        enemy.update(&mut ctx, Vec2::ZERO);
    }

    fn far_away() -> Vec2 {
        Vec2::new(-1000.0, -1000.0)
    }

    #[test]
    fn idle_enemy_with_zero_chance_never_walks() {
        let map = ledge_map(false);
        let config = EnemyConfig {
            walk_chance: 0.0,
            ..EnemyConfig::default()
        };
        let mut enemy = Enemy::new(Vec2::new(80.0, 145.0), config);
        let mut rng = SmallRng::seed_from_u64(1);
        let mut events = Vec::new();
        for _ in 0..500 {
            step(&mut enemy, &map, &mut rng, &mut events, far_away());
        }
        assert_eq!(enemy.state, EnemyState::Idle);
        assert_eq!(enemy.body.position.x, 80.0);
    }

    #[test]
    fn certain_chance_commits_to_walk_in_range() {
        let map = ledge_map(false);
        let config = EnemyConfig {
            walk_chance: 1.0,
            ..EnemyConfig::default()
        };
        let mut enemy = Enemy::new(Vec2::new(80.0, 145.0), config);
        let mut rng = SmallRng::seed_from_u64(2);
        let mut events = Vec::new();
        step(&mut enemy, &map, &mut rng, &mut events, far_away());
        assert!((30..=120).contains(&enemy.walking));
        assert_eq!(enemy.state, EnemyState::Walking);
    }

    #[test]
    fn walker_turns_at_ledge_and_stays_on_platform() {
        let map = ledge_map(false);
        let mut enemy = Enemy::new(Vec2::new(120.0, 145.0), EnemyConfig::default());
        let mut rng = SmallRng::seed_from_u64(3);
        let mut events = Vec::new();
        let mut turned = false;
        for _ in 0..400 {
            enemy.walking = enemy.walking.max(10);
            let before = enemy.facing;
            step(&mut enemy, &map, &mut rng, &mut events, far_away());
            turned |= before != enemy.facing;
            let rect = enemy.body.rect();
            assert!(rect.left() >= 32.0 - 7.0 && rect.right() <= 144.0 + 7.0);
            assert!(rect.bottom() <= 160.0);
        }
        assert!(turned);
    }

    #[test]
    fn walker_turns_at_wall() {
        let map = ledge_map(true);
        let mut enemy = Enemy::new(Vec2::new(110.0, 145.0), EnemyConfig::default());
        let mut rng = SmallRng::seed_from_u64(4);
        let mut events = Vec::new();
        for _ in 0..60 {
            enemy.walking = enemy.walking.max(10);
            step(&mut enemy, &map, &mut rng, &mut events, far_away());
            assert!(enemy.body.rect().right() <= 128.0);
        }
        assert_eq!(enemy.facing, Facing::Left);
    }

    #[test]
    fn shoots_when_walk_ends_facing_level_player() {
        let map = ledge_map(false);
        let mut enemy = Enemy::new(Vec2::new(80.0, 145.0), EnemyConfig {
            walk_chance: 0.0,
            ..EnemyConfig::default()
        });
        enemy.walking = 1;
        let mut rng = SmallRng::seed_from_u64(5);
        let mut events = Vec::new();
        let player = enemy.body.center() + Vec2::new(40.0, 3.0);
        step(&mut enemy, &map, &mut rng, &mut events, player);

        assert_eq!(events.len(), 1);
        match events[0] {
            GameEvent::Shot { pos, facing } => {
                assert_eq!(facing, Facing::Right);
                assert!(pos.x > 84.0);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn does_not_shoot_player_behind_it() {
        let map = ledge_map(false);
        let mut enemy = Enemy::new(Vec2::new(80.0, 145.0), EnemyConfig {
            walk_chance: 0.0,
            ..EnemyConfig::default()
        });
        enemy.walking = 1;
        let mut rng = SmallRng::seed_from_u64(6);
        let mut events = Vec::new();
        let player = enemy.body.center() + Vec2::new(-40.0, 0.0);
        step(&mut enemy, &map, &mut rng, &mut events, player);
        assert!(events.is_empty());
    }
}
