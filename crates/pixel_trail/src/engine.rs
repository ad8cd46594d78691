use bevy::prelude::*;
use bevy::utils::Duration;

/// Side length of one grid cell in logical pixels.
pub const CELL_SIZE: f32 = 12.0;
/// Maximum number of cells kept in the trail, head first.
pub const TRAIL_LENGTH: usize = 12;

const FADE_INTERVAL: Duration = Duration::from_millis(50);
const AMBIENT_SPAWN_INTERVAL: Duration = Duration::from_millis(800);
const AMBIENT_RESUME_DELAY: Duration = Duration::from_millis(1000);
const AMBIENT_LIFE_MIN_MS: u64 = 500;
const AMBIENT_LIFE_MAX_MS: u64 = 1500;
const AMBIENT_WAVE_MIN: usize = 2;
const AMBIENT_WAVE_MAX: usize = 4;

/// A transient idle-state pulse at a random cell.
pub struct AmbientCell {
    index: usize,
    life: Timer,
}

impl AmbientCell {
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Remaining lifetime as a fraction, 1.0 at spawn down to 0.0 at expiry.
    pub fn life_fraction(&self) -> f32 {
        self.life.fraction_remaining()
    }
}

/// Tracks the recent pointer/touch history as a capped, deduplicated list of
/// grid cells, plus the idle-state ambient pulses shown on touch devices.
///
/// The engine owns every timer it needs and is advanced exclusively through
/// [`TrailEngine::tick`], so tests drive it with synthetic time steps instead
/// of real frame callbacks.
#[derive(Resource)]
pub struct TrailEngine {
    width: f32,
    height: f32,
    columns: usize,
    rows: usize,
    trail: Vec<usize>,
    fade: Option<Timer>,
    ambient: Vec<AmbientCell>,
    ambient_spawn: Timer,
    ambient_resume: Option<Timer>,
    interacting: bool,
    touch_capable: bool,
    revision: u64,
}

impl TrailEngine {
    pub fn new(width: f32, height: f32) -> Self {
        let mut engine = Self {
            width: 0.0,
            height: 0.0,
            columns: 0,
            rows: 0,
            trail: Vec::with_capacity(TRAIL_LENGTH),
            fade: None,
            ambient: Vec::new(),
            ambient_spawn: Timer::new(AMBIENT_SPAWN_INTERVAL, TimerMode::Repeating),
            ambient_resume: None,
            interacting: false,
            touch_capable: false,
            revision: 0,
        };
        engine.configure(width, height);
        engine
    }

    /// Recomputes the grid for a new viewport size and discards all visual
    /// state. Cell indices handed out before this call are meaningless under
    /// the new column count, so the trail and ambient pulses are dropped
    /// rather than migrated, and the spawn timer restarts from zero.
    pub fn configure(&mut self, width: f32, height: f32) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.columns = (self.width / CELL_SIZE).ceil() as usize;
        self.rows = (self.height / CELL_SIZE).ceil() as usize;
        self.trail.clear();
        self.ambient.clear();
        self.fade = None;
        self.ambient_spawn.reset();
        self.revision += 1;
    }

    pub const fn columns(&self) -> usize {
        self.columns
    }

    pub const fn rows(&self) -> usize {
        self.rows
    }

    pub const fn cell_count(&self) -> usize {
        self.columns * self.rows
    }

    pub fn trail(&self) -> &[usize] {
        &self.trail
    }

    pub fn ambient(&self) -> &[AmbientCell] {
        &self.ambient
    }

    pub const fn is_interacting(&self) -> bool {
        self.interacting
    }

    pub const fn touch_capable(&self) -> bool {
        self.touch_capable
    }

    pub const fn set_touch_capable(&mut self, touch_capable: bool) {
        self.touch_capable = touch_capable;
    }

    /// Bumped whenever the visible state (trail or ambient set) changes.
    /// Renderers compare it to skip frames where nothing moved.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Maps a viewport position to a cell index, or `None` when the position
    /// lies outside the viewport. A column or row that lands past the grid
    /// because of rounding at the viewport edge is rejected the same way.
    pub fn cell_index(&self, x: f32, y: f32) -> Option<usize> {
        if x < 0.0 || y < 0.0 || x >= self.width || y >= self.height {
            return None;
        }
        let col = (x / CELL_SIZE).floor() as usize;
        let row = (y / CELL_SIZE).floor() as usize;
        if col >= self.columns || row >= self.rows {
            return None;
        }
        Some(row * self.columns + col)
    }

    pub const fn cell_col_row(&self, index: usize) -> (usize, usize) {
        (index % self.columns, index / self.columns)
    }

    /// Records a pointer/touch position. Out-of-viewport positions are
    /// ignored; a repeat of the current head cell is sub-cell jitter and is
    /// also ignored. A cell already elsewhere in the trail is promoted to the
    /// front instead of duplicated. New input always cancels an in-progress
    /// fade-out.
    ///
    /// Callers are expected to throttle high-frequency pointer events to
    /// roughly one update per 16 ms; the engine does not rate-limit.
    pub fn update(&mut self, x: f32, y: f32) {
        let Some(index) = self.cell_index(x, y) else {
            return;
        };
        self.fade = None;
        if self.trail.first() == Some(&index) {
            return;
        }
        self.trail.retain(|&cell| cell != index);
        self.trail.insert(0, index);
        self.trail.truncate(TRAIL_LENGTH);
        // A cell joining the trail extinguishes any ambient pulse on it.
        self.ambient.retain(|cell| cell.index != index);
        self.revision += 1;
    }

    /// Starts dropping the tail one cell per fade interval, producing a
    /// decaying tail instead of an abrupt clear. Used on pointer-leave and
    /// touch-end. The timer stops itself once the trail is empty.
    pub fn begin_fade(&mut self) {
        if !self.trail.is_empty() && self.fade.is_none() {
            self.fade = Some(Timer::new(FADE_INTERVAL, TimerMode::Repeating));
        }
    }

    /// Interaction takes visual priority over the ambient animation: touching
    /// the screen clears every pulse immediately, and after release the
    /// spawner stays quiet for a fixed delay.
    pub fn set_interacting(&mut self, interacting: bool) {
        if self.interacting == interacting {
            return;
        }
        self.interacting = interacting;
        if interacting {
            self.ambient.clear();
            self.ambient_resume = None;
            self.revision += 1;
        } else {
            self.ambient_resume = Some(Timer::new(AMBIENT_RESUME_DELAY, TimerMode::Once));
        }
    }

    /// Advances every owned timer by `delta`: fade-out pops, ambient expiry,
    /// the post-interaction resume delay, and the ambient spawn cadence.
    pub fn tick(&mut self, delta: Duration) {
        if let Some(fade) = &mut self.fade {
            fade.tick(delta);
            let pops = (fade.times_finished_this_tick() as usize).min(self.trail.len());
            if pops > 0 {
                self.trail.truncate(self.trail.len() - pops);
                self.revision += 1;
            }
            if self.trail.is_empty() {
                self.fade = None;
            }
        }

        let before = self.ambient.len();
        for cell in &mut self.ambient {
            cell.life.tick(delta);
        }
        self.ambient.retain(|cell| !cell.life.finished());
        if self.ambient.len() != before {
            self.revision += 1;
        }

        if let Some(resume) = &mut self.ambient_resume {
            resume.tick(delta);
            if resume.finished() {
                self.ambient_resume = None;
            }
        }

        // The ambient animation only exists on touch-capable hosts.
        if self.touch_capable {
            self.ambient_spawn.tick(delta);
            if self.ambient_spawn.just_finished() && self.can_spawn_ambient() {
                self.spawn_ambient_wave();
                self.revision += 1;
            }
        }
    }

    fn can_spawn_ambient(&self) -> bool {
        !self.interacting && self.ambient_resume.is_none() && self.cell_count() > 0
    }

    fn spawn_ambient_wave(&mut self) {
        let count = fastrand::usize(AMBIENT_WAVE_MIN..=AMBIENT_WAVE_MAX);
        for _ in 0..count {
            let life_ms = fastrand::u64(AMBIENT_LIFE_MIN_MS..=AMBIENT_LIFE_MAX_MS);
            self.ambient.push(AmbientCell {
                index: fastrand::usize(0..self.cell_count()),
                life: Timer::new(Duration::from_millis(life_ms), TimerMode::Once),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_10x10() -> TrailEngine {
        // 120x120 viewport at 12px cells
        TrailEngine::new(120.0, 120.0)
    }

    /// Feeds a position at the center of the given cell.
    fn touch_cell(engine: &mut TrailEngine, col: usize, row: usize) {
        engine.update(
            (col as f32).mul_add(CELL_SIZE, CELL_SIZE / 2.0),
            (row as f32).mul_add(CELL_SIZE, CELL_SIZE / 2.0),
        );
    }

    #[test]
    fn grid_is_derived_by_ceiling_division() {
        let engine = engine_10x10();
        assert_eq!(engine.columns(), 10, "120 / 12 columns");
        assert_eq!(engine.rows(), 10, "120 / 12 rows");

        let engine = TrailEngine::new(125.0, 130.0);
        assert_eq!(engine.columns(), 11, "partial column still counts");
        assert_eq!(engine.rows(), 11, "partial row still counts");
    }

    #[test]
    fn position_maps_to_row_major_index() {
        let mut engine = engine_10x10();
        engine.update(15.0, 25.0);
        // col 1, row 2 on a 10-wide grid
        assert_eq!(engine.trail(), &[21], "index is row * columns + col");
    }

    #[test]
    fn positions_outside_the_viewport_are_ignored() {
        let mut engine = engine_10x10();
        engine.update(-1.0, 5.0);
        engine.update(5.0, -0.1);
        engine.update(120.0, 5.0);
        engine.update(5.0, 400.0);
        assert!(engine.trail().is_empty(), "no out-of-viewport cell recorded");
    }

    #[test]
    fn edge_positions_past_the_last_column_are_rejected() {
        // 115px viewport: 10 columns, but x in [108, 115) is column 9 and
        // anything at or past 115 is outside even though ceil-rounding would
        // admit a tenth column worth of positions.
        let mut engine = TrailEngine::new(115.0, 115.0);
        engine.update(114.9, 0.0);
        assert_eq!(engine.trail().len(), 1, "inside the final partial cell");
        engine.update(115.0, 0.0);
        assert_eq!(engine.trail().len(), 1, "viewport edge itself is outside");
    }

    #[test]
    fn repeating_the_head_cell_is_a_no_op() {
        let mut engine = engine_10x10();
        touch_cell(&mut engine, 3, 3);
        let revision = engine.revision();
        // sub-cell jitter: different positions, same cell
        engine.update(37.0, 38.0);
        engine.update(40.0, 41.0);
        assert_eq!(engine.trail().len(), 1, "head repeat does not grow the trail");
        assert_eq!(engine.revision(), revision, "head repeat is not a state change");
    }

    #[test]
    fn trail_never_exceeds_capacity_and_never_duplicates() {
        let mut engine = engine_10x10();
        for i in 0..30 {
            touch_cell(&mut engine, i % 10, (i / 10) % 10);
        }
        assert_eq!(engine.trail().len(), TRAIL_LENGTH, "length is capped");

        let mut seen = engine.trail().to_vec();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), TRAIL_LENGTH, "no index appears twice");
    }

    #[test]
    fn revisiting_a_cell_promotes_it_to_the_head() {
        let mut engine = engine_10x10();
        touch_cell(&mut engine, 0, 0);
        touch_cell(&mut engine, 1, 0);
        touch_cell(&mut engine, 2, 0);
        assert_eq!(engine.trail(), &[2, 1, 0], "most recent first");

        touch_cell(&mut engine, 0, 0);
        assert_eq!(engine.trail(), &[0, 2, 1], "old occurrence removed, length unchanged");
    }

    #[test]
    fn configure_discards_trail_and_ambient_state() {
        let mut engine = engine_10x10();
        engine.set_touch_capable(true);
        touch_cell(&mut engine, 4, 4);
        engine.tick(AMBIENT_SPAWN_INTERVAL);
        assert!(!engine.ambient().is_empty(), "idle spawner produced pulses");

        engine.configure(240.0, 240.0);
        assert!(engine.trail().is_empty(), "trail cleared on reconfigure");
        assert!(engine.ambient().is_empty(), "ambient cleared on reconfigure");
    }

    #[test]
    fn fade_drains_the_trail_one_cell_per_interval() {
        let mut engine = engine_10x10();
        for col in 0..5 {
            touch_cell(&mut engine, col, 0);
        }
        engine.begin_fade();

        engine.tick(FADE_INTERVAL);
        assert_eq!(engine.trail().len(), 4, "one pop per interval");
        engine.tick(FADE_INTERVAL * 2);
        assert_eq!(engine.trail().len(), 2, "elapsed intervals pop together");

        // Over-running the timer must never underflow.
        engine.tick(FADE_INTERVAL * 20);
        assert!(engine.trail().is_empty(), "fade runs to empty");
        engine.tick(FADE_INTERVAL);
        assert!(engine.trail().is_empty(), "fade stops itself once empty");
    }

    #[test]
    fn new_input_cancels_an_active_fade() {
        let mut engine = engine_10x10();
        for col in 0..4 {
            touch_cell(&mut engine, col, 0);
        }
        engine.begin_fade();
        engine.tick(FADE_INTERVAL);
        assert_eq!(engine.trail().len(), 3, "fade started popping");

        touch_cell(&mut engine, 7, 7);
        engine.tick(FADE_INTERVAL * 4);
        assert_eq!(engine.trail().len(), 4, "fade no longer pops after new input");
    }

    #[test]
    fn interaction_clears_ambient_and_blocks_spawning() {
        let mut engine = engine_10x10();
        engine.set_touch_capable(true);
        engine.tick(AMBIENT_SPAWN_INTERVAL);
        assert!(!engine.ambient().is_empty(), "idle spawner produced pulses");

        engine.set_interacting(true);
        assert!(engine.ambient().is_empty(), "interaction clears pulses immediately");

        engine.tick(AMBIENT_SPAWN_INTERVAL * 3);
        assert!(engine.ambient().is_empty(), "no spawning while interacting");
    }

    #[test]
    fn ambient_resumes_between_one_and_1800_ms_after_touch_end() {
        let mut engine = engine_10x10();
        engine.set_touch_capable(true);
        engine.update(0.0, 0.0);
        engine.set_interacting(true);
        engine.set_interacting(false);

        let step = Duration::from_millis(100);
        let mut elapsed = Duration::ZERO;
        while engine.ambient().is_empty() && elapsed < Duration::from_millis(3000) {
            engine.tick(step);
            elapsed += step;
            if elapsed <= AMBIENT_RESUME_DELAY {
                assert!(
                    engine.ambient().is_empty(),
                    "spawning stays suppressed through the resume delay"
                );
            }
        }
        assert!(
            !engine.ambient().is_empty() && elapsed <= Duration::from_millis(1800),
            "a pulse appears within 1000-1800 ms of release"
        );
    }

    #[test]
    fn ambient_pulses_expire_on_their_own() {
        let mut engine = engine_10x10();
        engine.set_touch_capable(true);
        engine.tick(AMBIENT_SPAWN_INTERVAL);
        assert!(!engine.ambient().is_empty(), "idle spawner produced pulses");
        for cell in engine.ambient() {
            let fraction = cell.life_fraction();
            assert!(fraction > 0.0 && fraction <= 1.0, "fresh pulse has life left");
        }

        // Stop the spawner so only expiry remains.
        engine.set_touch_capable(false);
        engine.tick(Duration::from_millis(AMBIENT_LIFE_MAX_MS));
        assert!(engine.ambient().is_empty(), "every pulse expired");
    }
}
