//! ECS Components for the Stance Duel simulation.
//!
//! Components are pure data containers attached to entities.
//! All game logic lives in systems that query these components.
//!
//! Three entity shapes exist: players, swords and walls. Which one an entity
//! is follows from the components it carries, never from a type field.

use crate::error::DuelError;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

// ============================================================================
// SPATIAL COMPONENTS
// ============================================================================

/// World-space position in pixels. For collider-bearing entities this is the
/// top-left corner of the box.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Velocity in pixels per second.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
}

impl Velocity {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn zero(&mut self) {
        self.x = 0.0;
        self.y = 0.0;
    }
}

/// What an axis-aligned box stands for. Drives interaction rules only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColliderTag {
    Player,
    Sword,
    Wall,
}

/// Axis-aligned collision box anchored at the entity's `Position`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub w: f32,
    pub h: f32,
    pub tag: ColliderTag,
}

impl Collider {
    pub fn new(w: f32, h: f32, tag: ColliderTag) -> Self {
        Self { w, h, tag }
    }
}

// ============================================================================
// IDENTITY COMPONENTS
// ============================================================================

/// One of the two duelists. Serialized as the numbers 1 and 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PlayerId {
    One,
    Two,
}

impl PlayerId {
    pub const ALL: [PlayerId; 2] = [PlayerId::One, PlayerId::Two];

    pub fn other(self) -> Self {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            PlayerId::One => 1,
            PlayerId::Two => 2,
        }
    }

    /// Direction of territorial advance along X: player 1 pushes right,
    /// player 2 pushes left.
    pub fn advance_direction(self) -> f32 {
        match self {
            PlayerId::One => 1.0,
            PlayerId::Two => -1.0,
        }
    }

    /// Facing at match start (toward the opponent).
    pub fn default_facing(self) -> Facing {
        match self {
            PlayerId::One => Facing::Right,
            PlayerId::Two => Facing::Left,
        }
    }
}

impl TryFrom<u8> for PlayerId {
    type Error = DuelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PlayerId::One),
            2 => Ok(PlayerId::Two),
            other => Err(DuelError::UnknownPlayer(other)),
        }
    }
}

impl From<PlayerId> for u8 {
    fn from(id: PlayerId) -> Self {
        id.number()
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.number())
    }
}

/// Marks an entity as a duelist.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
}

/// Horizontal facing of a player.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Right,
    Left,
}

impl Facing {
    /// +1 when facing right, -1 when facing left.
    pub fn sign(self) -> f32 {
        match self {
            Facing::Right => 1.0,
            Facing::Left => -1.0,
        }
    }

    pub fn from_sign(sign: f32) -> Self {
        if sign < 0.0 {
            Facing::Left
        } else {
            Facing::Right
        }
    }
}

/// Key the render collaborator uses to pick a sprite.
#[derive(Component, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteKey(pub String);

/// Marker for level geometry.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Wall;

// ============================================================================
// COMBAT COMPONENTS
// ============================================================================

/// Guard height. Values are mutually exclusive and ordered low to high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum StanceLevel {
    Low,
    #[default]
    Mid,
    High,
}

impl StanceLevel {
    /// One step up, clamped at `High`.
    pub fn raised(self) -> Self {
        match self {
            StanceLevel::Low => StanceLevel::Mid,
            StanceLevel::Mid | StanceLevel::High => StanceLevel::High,
        }
    }

    /// One step down, clamped at `Low`.
    pub fn lowered(self) -> Self {
        match self {
            StanceLevel::High => StanceLevel::Mid,
            StanceLevel::Mid | StanceLevel::Low => StanceLevel::Low,
        }
    }

    /// Vertical adjustment of a held sword for this guard. Screen Y grows
    /// downward, so a low guard pushes the blade down.
    pub fn sword_y_shift(self, delta: f32) -> f32 {
        match self {
            StanceLevel::Low => delta,
            StanceLevel::Mid => 0.0,
            StanceLevel::High => -delta,
        }
    }
}

/// Current guard plus the time left before it may change again.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Stance {
    pub current: StanceLevel,
    pub cooldown_remaining: f32,
}

impl Stance {
    pub fn new(current: StanceLevel) -> Self {
        Self {
            current,
            cooldown_remaining: 0.0,
        }
    }
}

/// Phase of the thrust/retract state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackPhase {
    Idle,
    Thrusting,
    Retracting,
}

/// Thrust/retract sub-state of a player.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Attack {
    pub is_attacking: bool,
    /// Current reach added to the sword, in pixels.
    pub extension: f32,
    pub is_retracting: bool,
}

impl Attack {
    pub fn phase(&self) -> AttackPhase {
        if self.is_attacking {
            AttackPhase::Thrusting
        } else if self.is_retracting {
            AttackPhase::Retracting
        } else {
            AttackPhase::Idle
        }
    }

    /// True while the sword is out, in either phase.
    pub fn is_active(&self) -> bool {
        self.is_attacking || self.extension > 0.0
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Kept for parity with the render layer; death is entity removal.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(1.0)
    }
}

// ============================================================================
// SWORD COMPONENTS
// ============================================================================

/// Possession state of a sword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwordState {
    /// Carried by `owner`.
    Held,
    /// Airborne and unowned. Lethal on contact.
    Flying,
    /// Resting on the ground, free to pick up.
    Grounded,
}

/// Offset of a held sword from its owner's leading edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SwordOffset {
    pub x: f32,
    pub y: f32,
}

/// A sword. `owner` is a weak back-reference to a player entity: it names a
/// relation, the player's lifetime is independent, and it is only meaningful
/// while `state == Held`.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Sword {
    pub owner: Option<Entity>,
    /// The player this sword was issued to at spawn.
    pub origin: PlayerId,
    pub offset: SwordOffset,
    pub state: SwordState,
}

impl Sword {
    pub fn held_by(owner: Entity, origin: PlayerId, offset: SwordOffset) -> Self {
        Self {
            owner: Some(owner),
            origin,
            offset,
            state: SwordState::Held,
        }
    }

    pub fn is_held_by(&self, player: Entity) -> bool {
        self.state == SwordState::Held && self.owner == Some(player)
    }

    pub fn is_loose(&self) -> bool {
        self.state != SwordState::Held
    }

    /// Drop the sword into free flight. The owner link is cleared.
    pub fn release(&mut self) {
        self.owner = None;
        self.state = SwordState::Flying;
    }

    pub fn claim(&mut self, player: Entity) {
        self.owner = Some(player);
        self.state = SwordState::Held;
    }
}

// ============================================================================
// INPUT COMPONENTS
// ============================================================================

/// Per-step intention of a player: held buttons plus rising-edge flags that
/// are true on exactly one step per physical press.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    /// -1, 0 or 1.
    pub move_axis: i8,
    pub jump: bool,
    pub attack: bool,
    pub stance_up: bool,
    pub stance_down: bool,
    pub pickup: bool,
    pub jump_pressed: bool,
    pub attack_pressed: bool,
    pub stance_up_pressed: bool,
    pub stance_down_pressed: bool,
    pub pickup_pressed: bool,
}

// ============================================================================
// BUNDLE HELPERS
// ============================================================================

/// Bundle for spawning a complete duelist entity.
#[derive(Bundle)]
pub struct PlayerBundle {
    pub player: Player,
    pub position: Position,
    pub velocity: Velocity,
    pub collider: Collider,
    pub stance: Stance,
    pub input: Input,
    pub health: Health,
    pub facing: Facing,
    pub attack: Attack,
    pub sprite: SpriteKey,
}

/// Bundle for spawning a sword entity.
#[derive(Bundle)]
pub struct SwordBundle {
    pub sword: Sword,
    pub position: Position,
    pub velocity: Velocity,
    pub collider: Collider,
    pub sprite: SpriteKey,
}

/// Bundle for spawning a piece of level geometry.
#[derive(Bundle)]
pub struct WallBundle {
    pub position: Position,
    pub collider: Collider,
    pub sprite: SpriteKey,
    pub marker: Wall,
}

impl WallBundle {
    pub fn new(key: &str, x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            position: Position::new(x, y),
            collider: Collider::new(w, h, ColliderTag::Wall),
            sprite: SpriteKey(key.to_string()),
            marker: Wall,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stance_steps_clamp_at_ends() {
        assert_eq!(StanceLevel::Low.raised(), StanceLevel::Mid);
        assert_eq!(StanceLevel::Mid.raised(), StanceLevel::High);
        assert_eq!(StanceLevel::High.raised(), StanceLevel::High);
        assert_eq!(StanceLevel::High.lowered(), StanceLevel::Mid);
        assert_eq!(StanceLevel::Low.lowered(), StanceLevel::Low);
    }

    #[test]
    fn test_player_id_conversion() {
        assert_eq!(PlayerId::try_from(1).unwrap(), PlayerId::One);
        assert_eq!(PlayerId::try_from(2).unwrap(), PlayerId::Two);
        assert!(PlayerId::try_from(3).is_err());
        assert_eq!(PlayerId::One.other(), PlayerId::Two);
        assert_eq!(u8::from(PlayerId::Two), 2);
    }

    #[test]
    fn test_attack_phase() {
        let mut attack = Attack::default();
        assert_eq!(attack.phase(), AttackPhase::Idle);
        attack.is_retracting = true;
        attack.extension = 10.0;
        assert_eq!(attack.phase(), AttackPhase::Retracting);
        assert!(attack.is_active());
        attack.reset();
        assert_eq!(attack, Attack::default());
    }

    #[test]
    fn test_sword_release_clears_owner() {
        let mut world = World::new();
        let owner = world.spawn_empty().id();
        let mut sword = Sword::held_by(owner, PlayerId::One, SwordOffset::default());
        assert!(sword.is_held_by(owner));
        sword.release();
        assert_eq!(sword.owner, None);
        assert_eq!(sword.state, SwordState::Flying);
        assert!(!sword.is_held_by(owner));
    }
}
