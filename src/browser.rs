//! Keyboard-driven browsing of a fixed list of region proposals.
//!
//! The browser never changes the list it was given. All it tracks is how many
//! of the leading regions are drawn, and whether the user has asked to quit.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use log::debug;

use crate::{
    colors::{OVERLAY_GREEN, generate_contrasting_colors},
    error::{Error, Result},
    region::Region,
};

/// Regions shown when the browser opens.
pub const DEFAULT_VISIBLE_COUNT: i64 = 100;
/// Regions added or removed per key press.
pub const DEFAULT_STEP: i64 = 50;

/// A key press, reduced to what the browser cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    More,
    Less,
    Quit,
    Other,
}

impl KeyCommand {
    pub const MORE_CODE: u32 = 109;
    pub const LESS_CODE: u32 = 108;
    pub const QUIT_CODE: u32 = 113;

    /// Maps a raw key code to a command. Only the low byte is significant.
    pub fn from_code(code: u32) -> Self {
        match code & 0xFF {
            Self::MORE_CODE => KeyCommand::More,
            Self::LESS_CODE => KeyCommand::Less,
            Self::QUIT_CODE => KeyCommand::Quit,
            _ => KeyCommand::Other,
        }
    }

    /// Maps the text a key produced to a command. Anything but a single
    /// ASCII character is `Other`.
    pub fn from_text(text: &str) -> Self {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii() => Self::from_code(u32::from(c)),
            _ => KeyCommand::Other,
        }
    }
}

/// Whether the browse loop is still accepting input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Stopped,
}

/// Browser parameters as given by the user.
///
/// Kept signed so that a negative count coming from the command line is
/// rejected by [`ViewState::initialize`] instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrowserConfig {
    pub initial_count: i64,
    pub step: i64,
}

impl BrowserConfig {
    /// Rejects a negative initial count or a step that is not positive.
    pub fn validate(&self) -> Result<()> {
        if self.initial_count < 0 {
            return Err(Error::InvalidConfiguration(format!(
                "initial region count must not be negative, got {}",
                self.initial_count
            )));
        }
        if self.step <= 0 {
            return Err(Error::InvalidConfiguration(format!(
                "step must be positive, got {}",
                self.step
            )));
        }
        Ok(())
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            initial_count: DEFAULT_VISIBLE_COUNT,
            step: DEFAULT_STEP,
        }
    }
}

/// How many regions are visible, out of how many.
///
/// `visible_count` is always within `0..=total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    visible_count: usize,
    step: usize,
    total: usize,
}

impl ViewState {
    /// Creates the state for browsing `regions`.
    ///
    /// Fails if `default_count` is negative or `step` is not positive. A
    /// `default_count` larger than the list is clamped to the list length.
    pub fn initialize(regions: &[Region], default_count: i64, step: i64) -> Result<Self> {
        BrowserConfig {
            initial_count: default_count,
            step,
        }
        .validate()?;
        let total = regions.len();
        let visible_count = usize::try_from(default_count).map_or(total, |c| c.min(total));
        let step = usize::try_from(step).unwrap_or(usize::MAX);
        Ok(Self {
            visible_count,
            step,
            total,
        })
    }

    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Applies one key press. The flag is `false` once the user quits.
    pub fn handle_key(self, key: KeyCommand) -> (ViewState, bool) {
        match key {
            KeyCommand::More => (
                ViewState {
                    visible_count: self.visible_count.saturating_add(self.step).min(self.total),
                    ..self
                },
                true,
            ),
            KeyCommand::Less => (
                ViewState {
                    visible_count: self.visible_count.saturating_sub(self.step),
                    ..self
                },
                true,
            ),
            KeyCommand::Quit => (self, false),
            KeyCommand::Other => (self, true),
        }
    }
}

/// Colours used to outline regions.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayStyle {
    /// Every region in the same colour.
    Uniform(Rgb<u8>),
    /// One colour per region index, cycling if there are more regions.
    Distinct(Vec<Rgb<u8>>),
}

impl Default for OverlayStyle {
    fn default() -> Self {
        OverlayStyle::Uniform(OVERLAY_GREEN)
    }
}

impl OverlayStyle {
    /// A distinct colour for each of `n` regions.
    pub fn distinct(n: usize) -> Self {
        if n == 0 {
            return OverlayStyle::default();
        }
        OverlayStyle::Distinct(generate_contrasting_colors(n))
    }

    fn color(&self, index: usize) -> Rgb<u8> {
        match self {
            OverlayStyle::Uniform(color) => *color,
            OverlayStyle::Distinct(colors) => colors[index % colors.len()],
        }
    }
}

/// Draws the first `visible_count` regions over a copy of `base`.
pub fn render(base: &RgbImage, regions: &[Region], visible_count: usize) -> RgbImage {
    render_with(base, regions, visible_count, &OverlayStyle::default())
}

/// Like [`render`], with the outline colours taken from `style`.
pub fn render_with(
    base: &RgbImage,
    regions: &[Region],
    visible_count: usize,
    style: &OverlayStyle,
) -> RgbImage {
    let mut frame = base.clone();
    for (index, region) in regions.iter().take(visible_count).enumerate() {
        draw_hollow_rect_mut(&mut frame, region.outline(), style.color(index));
    }
    frame
}

/// The interactive part of the program: a base image, its proposals, and the
/// current view over them.
#[derive(Debug, Clone)]
pub struct RegionBrowser {
    base: RgbImage,
    regions: Vec<Region>,
    style: OverlayStyle,
    state: ViewState,
    run_state: RunState,
}

impl RegionBrowser {
    pub fn new(
        base: RgbImage,
        regions: Vec<Region>,
        config: BrowserConfig,
        style: OverlayStyle,
    ) -> Result<Self> {
        let state = ViewState::initialize(&regions, config.initial_count, config.step)?;
        Ok(Self {
            base,
            regions,
            style,
            state,
            run_state: RunState::Running,
        })
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn base(&self) -> &RgbImage {
        &self.base
    }

    /// The regions currently drawn.
    pub fn visible(&self) -> &[Region] {
        &self.regions[..self.state.visible_count]
    }

    /// Renders the current view.
    pub fn frame(&self) -> RgbImage {
        render_with(
            &self.base,
            &self.regions,
            self.state.visible_count,
            &self.style,
        )
    }

    /// Feeds one key press to the browser. Input after quitting is ignored.
    pub fn press(&mut self, key: KeyCommand) -> RunState {
        if self.run_state == RunState::Stopped {
            return RunState::Stopped;
        }
        let (state, keep_going) = self.state.handle_key(key);
        if state != self.state {
            debug!(
                "Showing {} of {} regions",
                state.visible_count, state.total
            );
        }
        self.state = state;
        if !keep_going {
            self.run_state = RunState::Stopped;
        }
        self.run_state
    }
}
