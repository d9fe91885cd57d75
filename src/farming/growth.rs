//! Crop growth and corruption rolls.
//!
//! Both are pure functions over the grid so the headless tests can drive
//! them directly without timers.

use rand::Rng;

use crate::shared::*;
use crate::world::WorldGrid;

/// Advances every planted crop that has met its watering quota and aged
/// past `(stage + 1)` growth intervals since planting. Advancing a stage
/// resets the quota, so each stage must be watered anew; a late watering
/// on an old enough crop advances it on the very next tick. Returns the
/// positions that changed.
pub fn advance_crop_growth(grid: &mut WorldGrid, now: f64) -> Vec<(i32, i32)> {
    let mut updated = Vec::new();

    for y in FARM_START_Y..FARM_START_Y + FARM_SIZE {
        for x in FARM_START_X..FARM_START_X + FARM_SIZE {
            let Some(Tile::Crop(mut crop)) = grid.get(x, y) else {
                continue;
            };
            if crop.is_tilled() || crop.is_mature() {
                continue;
            }
            if crop.waterings_received < crop.waterings_required {
                continue;
            }
            let required = (crop.stage as f64 + 1.0) * CROP_GROWTH_INTERVAL;
            if now - crop.planted_at < required {
                continue;
            }

            crop.stage += 1;
            crop.watered = false;
            crop.waterings_received = 0;
            grid.set(x, y, Tile::Crop(crop));
            updated.push((x, y));
        }
    }

    updated
}

/// Chance that a healthy crop turns corrupted this tick. Scales with the
/// horror level, the global spread factor, and crop maturity.
pub fn corruption_chance(horror: &HorrorState, stage: u8) -> f64 {
    let level_factor = 1.0 + CORRUPTION_LEVEL_MULTIPLIER * horror.level as f64;
    let age_factor = 1.0 + (stage as f64 / 4.0).min(0.5);
    CORRUPTION_BASE_CHANCE * level_factor * horror.corruption_spread as f64 * age_factor
}

/// One corruption pass: healthy crops may turn, turned crops may deepen
/// one level per tick up to the cap.
pub fn roll_corruption<R: Rng>(grid: &mut WorldGrid, horror: &HorrorState, rng: &mut R) {
    if horror.corruption_spread <= 0.0 {
        return;
    }

    for y in FARM_START_Y..FARM_START_Y + FARM_SIZE {
        for x in FARM_START_X..FARM_START_X + FARM_SIZE {
            let Some(Tile::Crop(mut crop)) = grid.get(x, y) else {
                continue;
            };
            if crop.is_tilled() {
                continue;
            }

            if !crop.corrupted {
                if rng.gen_bool(corruption_chance(horror, crop.stage).clamp(0.0, 1.0)) {
                    crop.corrupted = true;
                    crop.corruption_level = 1;
                    grid.set(x, y, Tile::Crop(crop));
                }
            } else if crop.corruption_level < MAX_CORRUPTION_LEVEL
                && rng.gen_bool(CORRUPTION_PROGRESS_CHANCE)
            {
                crop.corruption_level += 1;
                grid.set(x, y, Tile::Crop(crop));
            }
        }
    }
}
