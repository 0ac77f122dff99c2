//! Shared entity surface: the per-tick context, the event sink and the state
//! handed to the renderer.
//!
//! Entities never hold a reference back to the session. Everything they may
//! read or emit during a tick comes in through [`TickContext`].

use crate::physics::{PhysicsBody, PhysicsConfig};
use glam::Vec2;
use ledge_map::TileMap;
use rand::rngs::SmallRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Facing implied by horizontal movement, or `None` when standing still.
    pub fn from_movement(dx: f32) -> Option<Self> {
        if dx > 0.0 {
            Some(Self::Right)
        } else if dx < 0.0 {
            Some(Self::Left)
        } else {
            None
        }
    }
}

/// Things that happened during a tick that collaborators (audio, particles,
/// screen shake) may react to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    Jumped { pos: Vec2 },
    WallKicked { pos: Vec2 },
    DashStarted { pos: Vec2, facing: Facing },
    Shot { pos: Vec2, facing: Facing },
    ProjectileHit { pos: Vec2 },
    PlayerHit { pos: Vec2 },
}

pub struct TickContext<'a> {
    pub map: &'a TileMap,
    pub physics: &'a PhysicsConfig,
    pub rng: &'a mut SmallRng,
    /// Player body center as of the start of the tick.
    pub player_center: Vec2,
    pub events: &'a mut Vec<GameEvent>,
}

/// What the renderer needs to draw one entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    pub position: Vec2,
    pub size: Vec2,
    pub facing: Facing,
    /// Animation clip name, e.g. `"run"`.
    pub action: &'static str,
    pub visible: bool,
}

pub trait Entity {
    fn body(&self) -> &PhysicsBody;

    /// Advance one tick. `movement` is this tick's intended displacement on
    /// top of the body's velocity.
    fn update(&mut self, ctx: &mut TickContext<'_>, movement: Vec2) -> RenderState;

    fn render_state(&self) -> RenderState;
}
