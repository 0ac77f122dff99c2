//! Player state machine: running, jumping, wall-sliding, wall-kicks and dash.
//!
//! The physics body does the moving; this layer reads its contact flags after
//! each step and turns them into air time, jump charges and wall-slide state.
//! Jump and dash are one-shot inputs applied before the tick's `update`.

use crate::entity::{Entity, Facing, RenderState, TickContext};
use crate::physics::PhysicsBody;
use glam::Vec2;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub size: [f32; 2],
    pub jump_impulse: f32,
    pub wall_kick: [f32; 2],
    /// Ticks without ground contact before the player counts as airborne.
    pub air_threshold: u32,
    pub wall_slide_max_fall: f32,
    pub max_jumps: u32,
    pub dash_duration: i32,
    /// The dash burst lasts while `|dash timer| > dash_active`.
    pub dash_active: i32,
    pub dash_speed: f32,
    /// Fraction of dash speed kept on the last burst tick.
    pub dash_end_factor: f32,
    /// Horizontal velocity lost per tick.
    pub friction: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            size: [8.0, 15.0],
            jump_impulse: -3.0,
            wall_kick: [3.5, -2.5],
            air_threshold: 4,
            wall_slide_max_fall: 0.5,
            max_jumps: 1,
            dash_duration: 60,
            dash_active: 50,
            dash_speed: 8.0,
            dash_end_factor: 0.1,
            friction: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Running,
    Jumping,
    WallSliding,
    Dashing,
}

impl PlayerState {
    pub fn animation(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "run",
            Self::Jumping => "jump",
            Self::WallSliding => "wall_slide",
            Self::Dashing => "slide",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKind {
    Normal,
    WallKick,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub body: PhysicsBody,
    pub config: PlayerConfig,
    pub air_time: u32,
    pub jumps: u32,
    /// Signed dash timer: sign is the dash direction, counts toward zero.
    pub dashing: i32,
    pub wall_slide: bool,
    pub facing: Facing,
    pub last_movement: Vec2,
    pub state: PlayerState,
}

impl Player {
    pub fn new(position: Vec2, config: PlayerConfig) -> Self {
        Self {
            body: PhysicsBody::new(position, Vec2::from(config.size)),
            config,
            air_time: 0,
            jumps: config.max_jumps,
            dashing: 0,
            wall_slide: false,
            facing: Facing::Right,
            last_movement: Vec2::ZERO,
            state: PlayerState::Idle,
        }
    }

    /// Try to jump. Returns what kind of jump happened, or `None` if the
    /// input was ignored (so the caller only plays a sound on success).
    pub fn jump(&mut self) -> Option<JumpKind> {
        let airborne_marker = self.config.air_threshold + 1;
        if self.wall_slide {
            // Facing points away from the wall; pushing into it kicks off.
            let toward_wall = -self.facing.sign();
            if self.last_movement.x * toward_wall > 0.0 {
                let [kick_x, kick_y] = self.config.wall_kick;
                self.body.velocity.x = kick_x * self.facing.sign();
                self.body.velocity.y = kick_y;
                self.air_time = airborne_marker;
                self.jumps = self.jumps.saturating_sub(1);
                log::debug!("wall kick toward {:?}", self.facing);
                return Some(JumpKind::WallKick);
            }
            return None;
        }

        if self.jumps > 0 {
            self.body.velocity.y = self.config.jump_impulse;
            self.jumps -= 1;
            self.air_time = airborne_marker;
            return Some(JumpKind::Normal);
        }
        None
    }

    /// Start a dash in the facing direction. Ignored while a dash is running.
    pub fn dash(&mut self) -> bool {
        if self.dashing != 0 {
            return false;
        }
        self.dashing = self.config.dash_duration * self.facing.sign() as i32;
        true
    }

    /// Inside the high-speed burst at the start of a dash.
    pub fn in_dash_burst(&self) -> bool {
        self.dashing.abs() > self.config.dash_active
    }

    /// Projectiles pass through the player during the first part of a dash.
    pub fn is_invulnerable(&self) -> bool {
        self.dashing.abs() >= self.config.dash_active
    }

    fn tick_dash(&mut self) {
        self.dashing -= self.dashing.signum();
        if self.in_dash_burst() {
            self.body.velocity.x = self.dashing.signum() as f32 * self.config.dash_speed;
            if self.dashing.abs() == self.config.dash_active + 1 {
                self.body.velocity.x *= self.config.dash_end_factor;
            }
        }
    }

    fn apply_friction(&mut self) {
        let vx = self.body.velocity.x;
        self.body.velocity.x = if vx > 0.0 {
            (vx - self.config.friction).max(0.0)
        } else {
            (vx + self.config.friction).min(0.0)
        };
    }

    fn next_state(&self, movement: Vec2) -> PlayerState {
        if self.in_dash_burst() {
            PlayerState::Dashing
        } else if self.wall_slide {
            PlayerState::WallSliding
        } else if self.air_time > self.config.air_threshold {
            PlayerState::Jumping
        } else if movement.x != 0.0 {
            PlayerState::Running
        } else {
            PlayerState::Idle
        }
    }
}

impl Entity for Player {
    fn body(&self) -> &PhysicsBody {
        &self.body
    }

    fn update(&mut self, ctx: &mut TickContext<'_>, movement: Vec2) -> RenderState {
        let contacts = self.body.update(ctx.map, movement, ctx.physics);
        if let Some(facing) = Facing::from_movement(movement.x) {
            self.facing = facing;
        }
        self.last_movement = movement;

        self.air_time += 1;
        if contacts.down {
            self.air_time = 0;
            self.jumps = self.config.max_jumps;
        }

        self.wall_slide = false;
        if contacts.horizontal() && self.air_time > self.config.air_threshold {
            self.wall_slide = true;
            self.body.velocity.y = self.body.velocity.y.min(self.config.wall_slide_max_fall);
            self.facing = if contacts.right {
                Facing::Left
            } else {
                Facing::Right
            };
        }

        self.tick_dash();
        self.apply_friction();

        let state = self.next_state(movement);
        if state != self.state {
            log::trace!("player {:?} -> {:?}", self.state, state);
            self.state = state;
        }
        self.render_state()
    }

    fn render_state(&self) -> RenderState {
        RenderState {
            position: self.body.position,
            size: self.body.size,
            facing: self.facing,
            action: self.state.animation(),
            visible: !self.in_dash_burst(),
        }
    }
}
