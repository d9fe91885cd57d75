//! Shared components, resources, events, and states for Hollowfield.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain directly.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE — top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Boot,
    Playing,
}

/// Fixed-tick simulation order. Configured as a single chain in `main.rs`;
/// each domain plugin places its `FixedUpdate` systems into its step.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixedStep {
    Movement,
    Transitions,
    Items,
    CombatTimers,
    Enemies,
    ContactDamage,
    Npcs,
}

// ═══════════════════════════════════════════════════════════════════════
// SCENES
// ═══════════════════════════════════════════════════════════════════════

/// Which world grid is currently active. Switching scenes atomically
/// replaces the grid and repositions player + camera together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneId {
    Exterior,
    Interior,
    TownSquare,
    GeneralStore,
    Blacksmith,
    CozyHouse,
    Arena,
}

impl SceneId {
    /// Farming mutations are only allowed here.
    pub fn is_farmable(self) -> bool {
        matches!(self, SceneId::Exterior)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TILES & TERRAIN
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Furniture {
    Bed,
    Table,
    Chest,
    ShopCounter,
    ShopShelf,
    Anvil,
    KitchenCounter,
    Bookshelf,
    DisplayCase,
    Workbench,
    Stove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Grass,
    Path,
    StonePath,
    Water,
    Fence,
    StoneWall,
    /// Trees carry their remaining chop health directly on the tile.
    Tree { health: u8 },
    HouseWall,
    HouseFloor,
    HouseDoor,
    BuildingWall,
    BuildingFloor,
    BuildingDoor,
    Fountain,
    Forge,
    Furniture(Furniture),
    ExitToTown,
    ExitToFarm,
    ExitToArena,
}

impl Terrain {
    /// Fixed solid set for collision. Doors, exits, paths and floors are
    /// passable; the bed is passable so the player can reach the save spot.
    pub fn is_solid(self) -> bool {
        match self {
            Terrain::Water
            | Terrain::Fence
            | Terrain::StoneWall
            | Terrain::Tree { .. }
            | Terrain::HouseWall
            | Terrain::BuildingWall
            | Terrain::Fountain
            | Terrain::Forge => true,
            Terrain::Furniture(f) => !matches!(f, Furniture::Bed),
            Terrain::Grass
            | Terrain::Path
            | Terrain::StonePath
            | Terrain::HouseFloor
            | Terrain::HouseDoor
            | Terrain::BuildingFloor
            | Terrain::BuildingDoor
            | Terrain::ExitToTown
            | Terrain::ExitToFarm
            | Terrain::ExitToArena => false,
        }
    }

    /// Tiles that trigger a scene change when stepped on (or activated).
    pub fn is_transition(self) -> bool {
        matches!(
            self,
            Terrain::HouseDoor
                | Terrain::BuildingDoor
                | Terrain::ExitToTown
                | Terrain::ExitToFarm
                | Terrain::ExitToArena
        )
    }
}

/// One cell of a world grid: terrain, bare farmable soil, or a crop record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Tile {
    Terrain(Terrain),
    /// Farmable soil with nothing on it.
    Empty,
    Crop(Crop),
}

impl Tile {
    /// Crops, tilled soil, and empty soil are always passable.
    pub fn is_solid(&self) -> bool {
        match self {
            Tile::Terrain(t) => t.is_solid(),
            Tile::Empty | Tile::Crop(_) => false,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CROPS & SEEDS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeedKind {
    Parsnip,
    Potato,
}

impl SeedKind {
    pub const ALL: [SeedKind; 2] = [SeedKind::Parsnip, SeedKind::Potato];

    pub fn name(self) -> &'static str {
        match self {
            SeedKind::Parsnip => "Parsnip",
            SeedKind::Potato => "Potato",
        }
    }

    pub fn max_stage(self) -> u8 {
        match self {
            SeedKind::Parsnip => 3,
            SeedKind::Potato => 4,
        }
    }

    /// Waterings needed per growth stage.
    pub fn waterings_required(self) -> u8 {
        match self {
            SeedKind::Parsnip => 1,
            SeedKind::Potato => 3,
        }
    }

    pub fn sell_price(self) -> u32 {
        match self {
            SeedKind::Parsnip => 50,
            SeedKind::Potato => 80,
        }
    }
}

/// Crop state on a tile. Tilled soil is a crop record with `kind: Tilled`
/// so the till → plant → grow lifecycle stays on one type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    pub kind: CropKind,
    pub stage: u8,
    pub max_stage: u8,
    pub watered: bool,
    pub waterings_received: u8,
    pub waterings_required: u8,
    /// SimClock seconds at planting time.
    pub planted_at: f64,
    pub corrupted: bool,
    pub corruption_level: u8, // 0..=3
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CropKind {
    Tilled,
    Seed(SeedKind),
}

impl Crop {
    pub fn tilled() -> Self {
        Self {
            kind: CropKind::Tilled,
            stage: 0,
            max_stage: 0,
            watered: false,
            waterings_received: 0,
            waterings_required: 0,
            planted_at: 0.0,
            corrupted: false,
            corruption_level: 0,
        }
    }

    pub fn planted(seed: SeedKind, now: f64) -> Self {
        Self {
            kind: CropKind::Seed(seed),
            stage: 0,
            max_stage: seed.max_stage(),
            watered: false,
            waterings_received: 0,
            waterings_required: seed.waterings_required(),
            planted_at: now,
            corrupted: false,
            corruption_level: 0,
        }
    }

    pub fn is_tilled(&self) -> bool {
        self.kind == CropKind::Tilled
    }

    pub fn is_mature(&self) -> bool {
        !self.is_tilled() && self.stage == self.max_stage
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TOOLS & TOOLBAR
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tool {
    Hoe,
    Seed(SeedKind),
    WateringCan,
    Hand,
    Axe,
    Sword,
}

impl Tool {
    pub fn name(self) -> &'static str {
        match self {
            Tool::Hoe => "Hoe",
            Tool::Seed(SeedKind::Parsnip) => "Parsnip Seeds",
            Tool::Seed(SeedKind::Potato) => "Potato Seeds",
            Tool::WateringCan => "Watering Can",
            Tool::Hand => "Harvest",
            Tool::Axe => "Axe",
            Tool::Sword => "Sword",
        }
    }
}

/// Stamina cost for each tool action. Checked before any mutation.
pub fn stamina_cost(tool: Tool) -> f32 {
    match tool {
        Tool::Hoe => 5.0,
        Tool::Seed(_) => 2.0,
        Tool::WateringCan => 2.0,
        Tool::Hand => 3.0,
        Tool::Axe => 8.0,
        Tool::Sword => 0.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolbarSlot {
    pub tool: Tool,
    /// Remaining count for consumable slots (seeds); None for plain tools.
    pub count: Option<u32>,
}

/// Pure projection of the inventory into the ordered toolbar. Seed slots
/// only appear while the player still holds seeds of that kind.
pub fn toolbar_slots(inventory: &Inventory) -> Vec<ToolbarSlot> {
    let mut slots = vec![ToolbarSlot { tool: Tool::Hoe, count: None }];
    for kind in SeedKind::ALL {
        let count = inventory.seed_count(kind);
        if count > 0 {
            slots.push(ToolbarSlot { tool: Tool::Seed(kind), count: Some(count) });
        }
    }
    slots.push(ToolbarSlot { tool: Tool::WateringCan, count: None });
    slots.push(ToolbarSlot { tool: Tool::Hand, count: None });
    slots.push(ToolbarSlot { tool: Tool::Axe, count: None });
    slots.push(ToolbarSlot { tool: Tool::Sword, count: None });
    slots
}

// ═══════════════════════════════════════════════════════════════════════
// PLAYER
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

/// Grid delta for a facing direction (screen-down is +y in grid space).
pub fn facing_offset(facing: Facing) -> (i32, i32) {
    match facing {
        Facing::Up => (0, -1),
        Facing::Down => (0, 1),
        Facing::Left => (-1, 0),
        Facing::Right => (1, 0),
    }
}

/// The single player. Pixel position is the source of truth; grid position
/// is derived as `round(pixel / CELL_SIZE)` after every move.
#[derive(Resource, Debug, Clone)]
pub struct PlayerState {
    pub grid_x: i32,
    pub grid_y: i32,
    pub pixel_x: f32,
    pub pixel_y: f32,
    pub facing: Facing,
    pub is_moving: bool,
    pub stamina: f32,
    pub max_stamina: f32,
    pub health: f32,
    pub max_health: f32,
    /// Seconds remaining; > 0 means the player ignores enemy damage.
    pub invuln_remaining: f32,
    /// Seconds remaining; > 0 means a sword swing is in progress.
    pub swing_remaining: f32,
    pub selected_tool: Tool,
    pub scene: SceneId,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            grid_x: 4,
            grid_y: 4,
            pixel_x: 4.0 * CELL_SIZE,
            pixel_y: 4.0 * CELL_SIZE,
            facing: Facing::Down,
            is_moving: false,
            stamina: MAX_STAMINA,
            max_stamina: MAX_STAMINA,
            health: MAX_HEALTH,
            max_health: MAX_HEALTH,
            invuln_remaining: 0.0,
            swing_remaining: 0.0,
            selected_tool: Tool::Hoe,
            scene: SceneId::Exterior,
        }
    }
}

impl PlayerState {
    pub fn is_swinging(&self) -> bool {
        self.swing_remaining > 0.0
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invuln_remaining > 0.0
    }

    pub fn set_position(&mut self, grid_x: i32, grid_y: i32) {
        self.grid_x = grid_x;
        self.grid_y = grid_y;
        self.pixel_x = grid_x as f32 * CELL_SIZE;
        self.pixel_y = grid_y as f32 * CELL_SIZE;
    }

    /// The tile the player would act on, clamped to the grid.
    pub fn target_tile(&self, width: i32, height: i32) -> (i32, i32) {
        let (dx, dy) = facing_offset(self.facing);
        (
            (self.grid_x + dx).clamp(0, width - 1),
            (self.grid_y + dy).clamp(0, height - 1),
        )
    }
}

/// Smoothed camera center in pixel space. Follows the player exponentially.
#[derive(Resource, Debug, Clone, Default)]
pub struct CameraState {
    pub x: f32,
    pub y: f32,
}

impl CameraState {
    pub fn snap_to(&mut self, player: &PlayerState) {
        self.x = player.pixel_x;
        self.y = player.pixel_y;
    }
}

// ═══════════════════════════════════════════════════════════════════════
// INVENTORY
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    pub seeds: HashMap<SeedKind, u32>,
    pub crops: HashMap<SeedKind, u32>,
    pub wood: u32,
    pub coins: u32,
}

impl Default for Inventory {
    fn default() -> Self {
        let mut seeds = HashMap::new();
        seeds.insert(SeedKind::Parsnip, STARTING_PARSNIP_SEEDS);
        seeds.insert(SeedKind::Potato, STARTING_POTATO_SEEDS);
        Self {
            seeds,
            crops: HashMap::new(),
            wood: 0,
            coins: STARTING_COINS,
        }
    }
}

impl Inventory {
    pub fn seed_count(&self, kind: SeedKind) -> u32 {
        self.seeds.get(&kind).copied().unwrap_or(0)
    }

    pub fn crop_count(&self, kind: SeedKind) -> u32 {
        self.crops.get(&kind).copied().unwrap_or(0)
    }

    /// Remove one seed. Returns false (unchanged) if none left.
    pub fn take_seed(&mut self, kind: SeedKind) -> bool {
        match self.seeds.get_mut(&kind) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn add_crop(&mut self, kind: SeedKind) {
        *self.crops.entry(kind).or_insert(0) += 1;
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TIME — logical clock and game clock
// ═══════════════════════════════════════════════════════════════════════

/// Monotonic simulation clock in seconds, advanced from `Res<Time>` every
/// frame. All timestamps (crop planting, item spawn, horror events) are
/// taken from here — never from the wall clock.
#[derive(Resource, Debug, Clone, Default)]
pub struct SimClock {
    pub elapsed: f64,
}

pub const DAY_START_HOUR: u8 = 6;
pub const DUSK_START_HOUR: u8 = 18;
pub const NIGHT_START_HOUR: u8 = 20;
pub const DAWN_START_HOUR: u8 = 5;

/// In-game time of day and day counter. The day only advances through
/// sleep (saving) or the death-respawn path.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct GameClock {
    pub hours: u8,
    pub minutes: u8,
    /// Monotonic minute counter within the current day.
    pub total_minutes: u32,
    pub day: u32,
}

impl Default for GameClock {
    fn default() -> Self {
        Self {
            hours: STARTING_HOUR,
            minutes: 0,
            total_minutes: STARTING_HOUR as u32 * 60,
            day: 1,
        }
    }
}

impl GameClock {
    pub fn advance_minutes(&mut self, minutes: u32) {
        self.total_minutes += minutes;
        self.hours = ((self.total_minutes / 60) % 24) as u8;
        self.minutes = (self.total_minutes % 60) as u8;
    }

    /// Reset the time of day to morning; used by sleep and respawn.
    pub fn start_new_day(&mut self) {
        self.day += 1;
        self.hours = STARTING_HOUR;
        self.minutes = 0;
        self.total_minutes = STARTING_HOUR as u32 * 60;
    }

    pub fn is_night(&self) -> bool {
        self.hours >= NIGHT_START_HOUR || self.hours < DAY_START_HOUR
    }

    pub fn night_intensity(&self) -> f32 {
        night_intensity(self.hours)
    }
}

/// Piecewise darkness curve: 0 during the day, ramping to 0.7 through dusk,
/// peaking at 1.0 at midnight, easing back to 0.7 by dawn, then to 0.
pub fn night_intensity(hours: u8) -> f32 {
    let h = hours as f32;
    if hours >= DAY_START_HOUR && hours < DUSK_START_HOUR {
        0.0
    } else if hours >= DUSK_START_HOUR && hours < NIGHT_START_HOUR {
        let progress = (h - DUSK_START_HOUR as f32)
            / (NIGHT_START_HOUR - DUSK_START_HOUR) as f32;
        progress * 0.7
    } else if hours >= NIGHT_START_HOUR {
        // Evening toward midnight: 0.7 → 1.0
        let span = (24 - NIGHT_START_HOUR) as f32;
        let progress = (h - NIGHT_START_HOUR as f32) / span;
        0.7 + progress * 0.3
    } else if hours < DAWN_START_HOUR {
        // Midnight toward dawn: 1.0 → 0.7
        let progress = h / DAWN_START_HOUR as f32;
        1.0 - progress * 0.3
    } else {
        // Dawn transition: 0.7 → 0
        let progress = (h - DAWN_START_HOUR as f32)
            / (DAY_START_HOUR - DAWN_START_HOUR) as f32;
        0.7 * (1.0 - progress)
    }
}

/// Check whether an hour falls within a range, supporting overnight
/// wraparound ranges like 20..6.
pub fn hour_in_range(hour: u8, start: u8, end: u8) -> bool {
    if start <= end {
        hour >= start && hour <= end
    } else {
        hour >= start || hour <= end
    }
}

// ═══════════════════════════════════════════════════════════════════════
// HORROR
// ═══════════════════════════════════════════════════════════════════════

/// Step function: elapsed days → horror level 0..=10.
pub fn horror_level(day: u32) -> u8 {
    const THRESHOLDS: [u32; 10] = [3, 5, 8, 12, 15, 20, 25, 30, 40, 50];
    THRESHOLDS.iter().filter(|&&t| day >= t).count() as u8
}

pub const NIGHTMARE_LEVEL: u8 = 8;

/// Derived horror escalation state, recomputed from the day counter each
/// scheduler tick. `recent_events` is an anti-repeat ring of the last 5
/// completed event kinds.
#[derive(Resource, Debug, Clone, Default)]
pub struct HorrorState {
    pub level: u8,
    pub corruption_spread: f32,
    pub nightmare_mode: bool,
    pub recent_events: VecDeque<HorrorEventKind>,
}

impl HorrorState {
    pub fn recompute(&mut self, day: u32) {
        self.level = horror_level(day);
        self.corruption_spread = (self.level as f32 / 10.0).min(1.0);
        self.nightmare_mode = self.level >= NIGHTMARE_LEVEL;
    }

    pub fn push_recent(&mut self, kind: HorrorEventKind) {
        self.recent_events.push_back(kind);
        while self.recent_events.len() > RECENT_EVENT_RING {
            self.recent_events.pop_front();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HorrorEventKind {
    Whispers,
    ShadowFigure,
    CropRot,
    BloodMist,
    Footsteps,
    Heartbeat,
    ForgeNightmare,
}

impl HorrorEventKind {
    /// Kinds eligible for the random scheduler, one more than the
    /// recent-events ring holds so the cooldown can never block every
    /// kind at once. ForgeNightmare is scripted (forge interaction only)
    /// and never rolls.
    pub const SCHEDULED: [HorrorEventKind; 6] = [
        HorrorEventKind::Whispers,
        HorrorEventKind::ShadowFigure,
        HorrorEventKind::CropRot,
        HorrorEventKind::BloodMist,
        HorrorEventKind::Footsteps,
        HorrorEventKind::Heartbeat,
    ];

    pub fn min_day(self) -> u32 {
        match self {
            HorrorEventKind::Whispers => 3,
            HorrorEventKind::ShadowFigure => 5,
            HorrorEventKind::CropRot => 5,
            HorrorEventKind::BloodMist => 8,
            HorrorEventKind::Footsteps => 8,
            HorrorEventKind::Heartbeat => 12,
            HorrorEventKind::ForgeNightmare => 1,
        }
    }

    /// Allowed time-of-day window (inclusive hours, may wrap overnight).
    pub fn hour_window(self) -> (u8, u8) {
        match self {
            HorrorEventKind::Whispers => (20, 6),
            HorrorEventKind::ShadowFigure => (22, 4),
            HorrorEventKind::CropRot => (0, 23),
            HorrorEventKind::BloodMist => (21, 5),
            HorrorEventKind::Footsteps => (19, 7),
            HorrorEventKind::Heartbeat => (0, 23),
            HorrorEventKind::ForgeNightmare => (0, 23),
        }
    }

    /// Independent per-kind trigger probability once eligible.
    pub fn chance(self) -> f64 {
        match self {
            HorrorEventKind::Whispers => 0.5,
            HorrorEventKind::ShadowFigure => 0.4,
            HorrorEventKind::CropRot => 0.3,
            HorrorEventKind::BloodMist => 0.3,
            HorrorEventKind::Footsteps => 0.35,
            HorrorEventKind::Heartbeat => 0.25,
            HorrorEventKind::ForgeNightmare => 0.0,
        }
    }
}

/// An active horror event instance. At most one primary event exists at a
/// time, held in `ActiveHorrorEvent`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorrorEvent {
    pub kind: HorrorEventKind,
    /// SimClock seconds when the event started.
    pub started_at: f64,
    pub duration: f32,
    pub intensity: f32,
}

impl HorrorEvent {
    pub fn is_expired(&self, now: f64) -> bool {
        now - self.started_at >= self.duration as f64
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct ActiveHorrorEvent(pub Option<HorrorEvent>);

/// Intensity envelope over an event's lifetime: ramp up over the first 30%,
/// hold through the middle 40%, fade over the final 30%. Pure function of
/// the event's timestamps so overlays can sample it every frame.
pub fn horror_intensity(event: &HorrorEvent, now: f64) -> f32 {
    let progress = ((now - event.started_at) / event.duration as f64).clamp(0.0, 1.0) as f32;
    let envelope = if progress < 0.3 {
        progress / 0.3
    } else if progress < 0.7 {
        1.0
    } else {
        1.0 - (progress - 0.7) / 0.3
    };
    envelope * event.intensity
}

// ═══════════════════════════════════════════════════════════════════════
// ENEMIES
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Slime,
    Bat,
    Skeleton,
}

impl EnemyKind {
    pub fn max_health(self) -> f32 {
        match self {
            EnemyKind::Slime => 30.0,
            EnemyKind::Bat => 20.0,
            EnemyKind::Skeleton => 50.0,
        }
    }

    /// Pixels per second at full chase speed.
    pub fn speed(self) -> f32 {
        match self {
            EnemyKind::Slime => 60.0,
            EnemyKind::Bat => 108.0,
            EnemyKind::Skeleton => 48.0,
        }
    }

    pub fn damage(self) -> f32 {
        match self {
            EnemyKind::Slime => 8.0,
            EnemyKind::Bat => 6.0,
            EnemyKind::Skeleton => 15.0,
        }
    }

    /// Spawn eligibility by time of day and escalation state.
    pub fn can_spawn(self, clock: &GameClock, horror: &HorrorState) -> bool {
        match self {
            EnemyKind::Slime => true,
            EnemyKind::Bat => clock.is_night(),
            EnemyKind::Skeleton => horror.nightmare_mode,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnemyBehavior {
    #[default]
    Chase,
    Wander,
    Pause,
}

#[derive(Component, Debug, Clone)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub health: f32,
    pub max_health: f32,
    pub pixel: Vec2,
    pub grid_x: i32,
    pub grid_y: i32,
    pub facing: Facing,
    pub is_moving: bool,
    pub behavior: EnemyBehavior,
    /// Seconds accumulated since the last behavior change.
    pub behavior_timer: f32,
    pub wander_target: Option<Vec2>,
    pub knockback_velocity: Vec2,
    /// Seconds of knockback remaining; normal AI is suspended while > 0.
    pub knockback_remaining: f32,
    pub scene: SceneId,
}

impl Enemy {
    pub fn spawn_at(kind: EnemyKind, grid_x: i32, grid_y: i32, scene: SceneId) -> Self {
        Self {
            kind,
            health: kind.max_health(),
            max_health: kind.max_health(),
            pixel: Vec2::new(grid_x as f32 * CELL_SIZE, grid_y as f32 * CELL_SIZE),
            grid_x,
            grid_y,
            facing: Facing::Down,
            is_moving: false,
            behavior: EnemyBehavior::Chase,
            behavior_timer: 0.0,
            wander_target: None,
            knockback_velocity: Vec2::ZERO,
            knockback_remaining: 0.0,
            scene,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// NPCS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: i32,
    pub y: i32,
    /// Seconds to stand still after arriving; 0 = keep walking.
    pub pause_secs: f32,
}

impl Waypoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y, pause_secs: 0.0 }
    }

    pub fn pause(x: i32, y: i32, pause_secs: f32) -> Self {
        Self { x, y, pause_secs }
    }

    pub fn pixel(&self) -> Vec2 {
        Vec2::new(self.x as f32 * CELL_SIZE, self.y as f32 * CELL_SIZE)
    }
}

#[derive(Component, Debug, Clone)]
pub struct Npc {
    pub id: String,
    pub name: String,
    pub pixel: Vec2,
    pub grid_x: i32,
    pub grid_y: i32,
    pub facing: Facing,
    pub is_moving: bool,
    /// Cyclic waypoint path; the index wraps modulo the path length.
    pub path: Vec<Waypoint>,
    pub path_index: usize,
    pub is_paused: bool,
    pub pause_remaining: f32,
    /// Pixels per second.
    pub move_speed: f32,
    pub dialogue: Vec<String>,
    pub dialogue_index: usize,
    pub scene: SceneId,
}

// ═══════════════════════════════════════════════════════════════════════
// DROPPED ITEMS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DropKind {
    Wood,
    Crop(SeedKind),
}

impl DropKind {
    /// Materials sit on the ground longer before they can be picked up.
    pub fn pickup_delay(self) -> f32 {
        match self {
            DropKind::Wood => ITEM_PICKUP_DELAY,
            DropKind::Crop(_) => CROP_PICKUP_DELAY,
        }
    }
}

/// A physical item on the ground. Position and velocity are in tile units
/// (1.0 = one cell) like the farming grid.
#[derive(Component, Debug, Clone)]
pub struct DroppedItem {
    pub kind: DropKind,
    pub pos: Vec2,
    pub velocity: Vec2,
    /// SimClock seconds at spawn.
    pub spawned_at: f64,
    pub scene: SceneId,
}

// ═══════════════════════════════════════════════════════════════════════
// MODAL STATE
// ═══════════════════════════════════════════════════════════════════════

/// Open dialogue box; swallows the next action input.
#[derive(Resource, Debug, Clone, Default)]
pub struct ActiveDialogue(pub Option<DialogueBox>);

#[derive(Debug, Clone, PartialEq)]
pub struct DialogueBox {
    pub npc_name: String,
    pub text: String,
}

/// Save prompt shown when the player stands on the bed. `declined` keeps
/// a dismissed prompt closed until the player steps off the bed.
#[derive(Resource, Debug, Clone, Default)]
pub struct SavePrompt {
    pub active: bool,
    pub declined: bool,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct DebugMode(pub bool);

// ═══════════════════════════════════════════════════════════════════════
// INPUT
// ═══════════════════════════════════════════════════════════════════════

/// Frame-local input snapshot, rebuilt from hardware state every `PreUpdate`.
/// Systems read this instead of `ButtonInput` directly.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlayerInput {
    /// Held movement direction; opposing keys cancel. Not normalized —
    /// diagonal movement is normalized at the point of use.
    pub move_axis: Vec2,
    /// Space / Enter pressed this frame: tool use, interact, modal dismiss.
    pub action: bool,
    /// Escape pressed this frame: cancel an open modal.
    pub cancel: bool,
    /// Toolbar slot index selected by a digit key this frame.
    pub tool_slot: Option<u8>,
    pub debug_toggle: bool,
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS — cross-domain communication
// ═══════════════════════════════════════════════════════════════════════

/// Request an atomic scene swap. The transition handler rebuilds the grid,
/// repositions the player and camera, and runs scene-entry hooks.
#[derive(Event, Debug, Clone)]
pub struct SceneTransitionEvent {
    pub to: SceneId,
    pub entry: (i32, i32),
}

/// The day ended (sleep or death-respawn). `slept_in_bed` distinguishes a
/// save-confirmed sleep from a combat knockout.
#[derive(Event, Debug, Clone)]
pub struct DayEndEvent {
    pub slept_in_bed: bool,
}

/// A sword swing started this frame; combat resolves the cone once.
#[derive(Event, Debug, Clone)]
pub struct SwordSwingEvent;

/// Axe hit on the tree at the given cell.
#[derive(Event, Debug, Clone)]
pub struct ChopTreeEvent {
    pub x: i32,
    pub y: i32,
}

/// A farm tool applied to a plot inside the farm rectangle. The farming
/// domain owns all guards; an inapplicable action is a silent no-op.
#[derive(Event, Debug, Clone)]
pub struct FarmActionEvent {
    pub tool: Tool,
    pub x: i32,
    pub y: i32,
}

/// Scripted horror trigger (the forge). The scheduler path never uses this.
#[derive(Event, Debug, Clone)]
pub struct TriggerHorrorEvent {
    pub kind: HorrorEventKind,
}

/// A horror event just became active (scheduled or scripted). Domains with
/// a stake in a kind react here: farming rots crops, audio plays stingers.
#[derive(Event, Debug, Clone)]
pub struct HorrorEventStartedEvent {
    pub kind: HorrorEventKind,
}

#[derive(Event, Debug, Clone)]
pub struct SaveRequestEvent;

#[derive(Event, Debug, Clone)]
pub struct PlaySfxEvent {
    pub sfx_id: String,
}

#[derive(Event, Debug, Clone)]
pub struct PlayMusicEvent {
    pub track_id: String,
}

/// Rebuild tile sprites after the grid changed wholesale (scene swap, load).
#[derive(Event, Debug, Clone)]
pub struct GridRebuiltEvent;

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const CELL_SIZE: f32 = 48.0;

/// Player speed in pixels per second (4 px per 60 Hz tick).
pub const PLAYER_SPEED: f32 = 240.0;
pub const CAMERA_SMOOTHING: f32 = 0.1;
pub const SIM_TICK_HZ: f64 = 60.0;

pub const MAX_STAMINA: f32 = 100.0;
pub const MAX_HEALTH: f32 = 100.0;

pub const STARTING_HOUR: u8 = 6;
pub const STARTING_PARSNIP_SEEDS: u32 = 5;
pub const STARTING_POTATO_SEEDS: u32 = 3;
pub const STARTING_COINS: u32 = 100;

/// Real seconds per clock tick; each tick adds 10 in-game minutes.
pub const CLOCK_TICK_SECONDS: f32 = 2.0;
pub const MINUTES_PER_CLOCK_TICK: u32 = 10;
/// Stamina drained per clock tick while the player is moving.
pub const STAMINA_DECAY_PER_TICK: f32 = 0.5;

/// Seconds per growth stage once the watering quota is met.
pub const CROP_GROWTH_INTERVAL: f64 = 3.0;
pub const GROWTH_TICK_SECONDS: f32 = 1.0;

pub const CORRUPTION_BASE_CHANCE: f64 = 0.01;
pub const CORRUPTION_LEVEL_MULTIPLIER: f64 = 0.2;
pub const CORRUPTION_PROGRESS_CHANCE: f64 = 0.1;
pub const MAX_CORRUPTION_LEVEL: u8 = 3;

pub const FARM_START_X: i32 = 10;
pub const FARM_START_Y: i32 = 5;
pub const FARM_SIZE: i32 = 10;

pub const TREE_MAX_HEALTH: u8 = 3;
pub const WOOD_DROP_COUNT: usize = 4;

/// Item physics (tile units per 60 Hz tick).
pub const ITEM_FRICTION: f32 = 0.95;
pub const ITEM_PICKUP_RANGE: f32 = 0.6;
pub const ITEM_MAGNET_RANGE: f32 = 2.5;
pub const ITEM_MAGNET_SPEED: f32 = 0.05;
pub const ITEM_VELOCITY_EPSILON: f32 = 0.001;
pub const ITEM_PICKUP_DELAY: f32 = 1.0;
pub const CROP_PICKUP_DELAY: f32 = 0.5;

pub const SWORD_DAMAGE: f32 = 15.0;
pub const SWORD_RANGE: f32 = CELL_SIZE * 1.5;
/// Facing-cone deadzone: the enemy must be at least this far along the
/// facing axis to count as "in front".
pub const SWORD_CONE_DEADZONE: f32 = CELL_SIZE * 0.3;
pub const SWING_DURATION: f32 = 0.3;

/// Knockback impulse in pixels per second (8 px per 60 Hz tick).
pub const KNOCKBACK_SPEED: f32 = 480.0;
pub const KNOCKBACK_DURATION: f32 = 0.3;
pub const KNOCKBACK_FRICTION: f32 = 0.9;

pub const PLAYER_HIT_RADIUS: f32 = CELL_SIZE * 0.7;
pub const INVULN_DURATION: f32 = 1.0;

pub const ENEMY_DETECTION_RADIUS: f32 = CELL_SIZE * 8.0;
pub const ENEMY_BEHAVIOR_INTERVAL: f32 = 2.0;
pub const ENEMY_CHASE_JITTER: f32 = 0.3;

pub const NPC_INTERACT_RANGE: f32 = 1.5;

pub const HORROR_TICK_SECONDS: f32 = 1.0;
pub const HORROR_TRIGGER_CHANCE: f64 = 0.1;
pub const RECENT_EVENT_RING: usize = 5;
pub const HORROR_BASE_DURATION: f32 = 5.0;
pub const HORROR_DURATION_PER_LEVEL: f32 = 1.0;
pub const FORGE_NIGHTMARE_DURATION: f32 = 8.0;

pub const ARENA_ENEMY_BASE_CAP: usize = 3;
