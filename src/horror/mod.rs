//! Horror domain — the game clock, the escalation state derived from the
//! day counter, and the probabilistic event scheduler.

use bevy::prelude::*;
use rand::Rng;

use crate::shared::*;
use crate::world::maps;

pub struct HorrorPlugin;

impl Plugin for HorrorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ClockTimer>()
            .init_resource::<HorrorTimer>()
            .add_systems(PreUpdate, advance_sim_clock)
            .add_systems(
                Update,
                (tick_game_clock, horror_scheduler, handle_forge_trigger)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(Update, handle_day_end);
    }
}

#[derive(Resource)]
pub struct ClockTimer(pub Timer);

impl Default for ClockTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(CLOCK_TICK_SECONDS, TimerMode::Repeating))
    }
}

#[derive(Resource)]
pub struct HorrorTimer(pub Timer);

impl Default for HorrorTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(HORROR_TICK_SECONDS, TimerMode::Repeating))
    }
}

/// The logical clock every timestamp in the game reads from.
fn advance_sim_clock(time: Res<Time>, mut clock: ResMut<SimClock>) {
    clock.elapsed += time.delta_secs_f64();
}

/// Ten in-game minutes per tick. Moving through the world costs a sliver
/// of stamina on the same cadence.
pub fn tick_game_clock(
    time: Res<Time>,
    mut timer: ResMut<ClockTimer>,
    mut clock: ResMut<GameClock>,
    mut player: ResMut<PlayerState>,
) {
    timer.0.tick(time.delta());
    for _ in 0..timer.0.times_finished_this_tick() {
        clock.advance_minutes(MINUTES_PER_CLOCK_TICK);
        if player.is_moving {
            player.stamina = (player.stamina - STAMINA_DECAY_PER_TICK).max(0.0);
        }
    }
}

/// Scheduled event duration and intensity scale with the horror level.
pub fn event_duration(level: u8) -> f32 {
    HORROR_BASE_DURATION + level as f32 * HORROR_DURATION_PER_LEVEL
}

pub fn event_intensity(level: u8) -> f32 {
    (0.5 + level as f32 * 0.05).min(1.0)
}

/// Kinds that may fire right now: past their unlock day, inside their
/// time-of-day window, and not anywhere in the recent-events ring.
pub fn eligible_kinds(
    clock: &GameClock,
    horror: &HorrorState,
) -> Vec<HorrorEventKind> {
    HorrorEventKind::SCHEDULED
        .into_iter()
        .filter(|kind| clock.day >= kind.min_day())
        .filter(|kind| {
            let (start, end) = kind.hour_window();
            hour_in_range(clock.hours, start, end)
        })
        .filter(|kind| !horror.recent_events.contains(kind))
        .collect()
}

/// Each eligible kind gets its own independent trigger roll; the first
/// one that passes wins the slot (at most one event at a time).
pub fn pick_event<R: Rng>(
    candidates: &[HorrorEventKind],
    rng: &mut R,
) -> Option<HorrorEventKind> {
    candidates
        .iter()
        .copied()
        .find(|kind| rng.gen_bool(kind.chance()))
}

/// Once a second: refresh the derived escalation state, expire the active
/// event, and maybe start a new one. At most one primary event at a time.
pub fn horror_scheduler(
    time: Res<Time>,
    sim: Res<SimClock>,
    clock: Res<GameClock>,
    mut timer: ResMut<HorrorTimer>,
    mut horror: ResMut<HorrorState>,
    mut active: ResMut<ActiveHorrorEvent>,
    mut started: EventWriter<HorrorEventStartedEvent>,
    mut sfx: EventWriter<PlaySfxEvent>,
) {
    timer.0.tick(time.delta());
    if !timer.0.just_finished() {
        return;
    }

    horror.recompute(clock.day);

    if let Some(event) = active.0 {
        if event.is_expired(sim.elapsed) {
            // Completed events enter the anti-repeat ring.
            horror.push_recent(event.kind);
            active.0 = None;
        } else {
            return;
        }
    }

    if horror.level == 0 {
        return;
    }
    let mut rng = rand::thread_rng();
    if !rng.gen_bool(HORROR_TRIGGER_CHANCE) {
        return;
    }

    let candidates = eligible_kinds(&clock, &horror);
    let Some(chosen) = pick_event(&candidates, &mut rng) else {
        return;
    };

    active.0 = Some(HorrorEvent {
        kind: chosen,
        started_at: sim.elapsed,
        duration: event_duration(horror.level),
        intensity: event_intensity(horror.level),
    });
    started.send(HorrorEventStartedEvent { kind: chosen });
    sfx.send(PlaySfxEvent {
        sfx_id: "horror_sting".into(),
    });
    info!("Horror event: {:?} (level {})", chosen, horror.level);
}

/// The forge doesn't roll dice. Touching it always answers.
pub fn handle_forge_trigger(
    mut triggers: EventReader<TriggerHorrorEvent>,
    sim: Res<SimClock>,
    mut active: ResMut<ActiveHorrorEvent>,
    mut started: EventWriter<HorrorEventStartedEvent>,
) {
    for trigger in triggers.read() {
        active.0 = Some(HorrorEvent {
            kind: trigger.kind,
            started_at: sim.elapsed,
            duration: FORGE_NIGHTMARE_DURATION,
            intensity: 1.0,
        });
        started.send(HorrorEventStartedEvent { kind: trigger.kind });
        warn!("The forge stirs");
    }
}

/// A day ends by sleeping or by being knocked out. Either way the pools
/// refill, the clock rolls to the next morning, and any lingering event
/// cuts off. Sleeping also tucks the player back into bed.
pub fn handle_day_end(
    mut day_ends: EventReader<DayEndEvent>,
    mut clock: ResMut<GameClock>,
    mut horror: ResMut<HorrorState>,
    mut active: ResMut<ActiveHorrorEvent>,
    mut player: ResMut<PlayerState>,
    mut camera: ResMut<CameraState>,
) {
    for event in day_ends.read() {
        clock.start_new_day();
        horror.recompute(clock.day);
        active.0 = None;
        player.health = player.max_health;
        player.stamina = player.max_stamina;
        player.invuln_remaining = 0.0;
        player.swing_remaining = 0.0;

        if event.slept_in_bed {
            player.set_position(maps::INTERIOR_WAKE.0, maps::INTERIOR_WAKE.1);
            camera.snap_to(&player);
        }
        info!(
            "Day {} begins ({})",
            clock.day,
            if event.slept_in_bed { "rested" } else { "knocked out" }
        );
    }
}
