//! Enemy shots: straight-line movers that die on walls, on age, or on the
//! player.

use crate::entity::Facing;
use glam::Vec2;
use ledge_map::{Aabb, TileMap};

/// Ticks a projectile survives without hitting anything.
pub const MAX_PROJECTILE_AGE: u32 = 360;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub pos: Vec2,
    pub facing: Facing,
    pub speed: f32,
    pub age: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileFate {
    Flying,
    HitWall,
    Expired,
    HitPlayer,
}

impl ProjectileFate {
    pub fn is_alive(self) -> bool {
        self == Self::Flying
    }
}

impl Projectile {
    pub fn new(pos: Vec2, facing: Facing, speed: f32) -> Self {
        Self {
            pos,
            facing,
            speed,
            age: 0,
        }
    }

    /// Advance one tick. `player` is the player's rectangle, or `None` while
    /// the player cannot be hit.
    pub fn step(&mut self, map: &TileMap, player: Option<Aabb>) -> ProjectileFate {
        self.pos.x += self.speed * self.facing.sign();
        self.age += 1;
        if map.solid_check(self.pos).is_some() {
            return ProjectileFate::HitWall;
        }
        if self.age > MAX_PROJECTILE_AGE {
            return ProjectileFate::Expired;
        }
        match player {
            Some(rect) if rect.contains_point(self.pos) => ProjectileFate::HitPlayer,
            _ => ProjectileFate::Flying,
        }
    }
}
