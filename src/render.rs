use crate::sequence::Symbol;

/// How long a consumed/missed tile stays highlighted, in ticks.
const EFFECT_FLASH_TICKS: u8 = 5;

/// Visual surface driven by the session engine. All methods are cosmetic
/// hints; the engine never reads anything back through this trait.
pub trait Renderer {
    /// Draw a freshly generated sequence at its initial layout positions,
    /// one spacing unit per index.
    fn render_sequence(&mut self, symbols: &[Symbol]);
    /// Move every item from `from` onward one spacing unit toward the
    /// consumed side.
    fn shift_from(&mut self, from: usize);
    /// Feedback for a matched symbol.
    fn consumed_effect(&mut self, position: usize);
    /// Feedback for an expired symbol.
    fn missed_effect(&mut self, position: usize);
    /// Warning blink phase for a symbol: toggled repeatedly while the
    /// warning is live, switched off when it ends.
    fn warning(&mut self, position: usize, on: bool);
}

/// Fate of a single tile on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileState {
    Pending,
    Consumed,
    Missed,
}

/// One symbol as the UI sees it.
#[derive(Debug, Clone)]
pub struct Tile {
    pub symbol: Symbol,
    /// Lane position in spacing units; decremented by shift hints.
    pub unit: usize,
    pub state: TileState,
    pub warning_on: bool,
    /// Remaining highlight ticks after a consumed/missed effect.
    pub flash: u8,
}

/// Presentation model the terminal UI draws from. Implements `Renderer`
/// by recording the engine's hints as per-tile state; `decay` is called
/// once per tick to age effect highlights.
#[derive(Debug, Default)]
pub struct Playfield {
    tiles: Vec<Tile>,
}

impl Playfield {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Age effect flashes by one tick.
    pub fn decay(&mut self) {
        for tile in &mut self.tiles {
            tile.flash = tile.flash.saturating_sub(1);
        }
    }

    fn settle(&mut self, position: usize, state: TileState) {
        if let Some(tile) = self.tiles.get_mut(position) {
            tile.state = state;
            tile.warning_on = false;
            tile.flash = EFFECT_FLASH_TICKS;
        }
    }
}

impl Renderer for Playfield {
    fn render_sequence(&mut self, symbols: &[Symbol]) {
        self.tiles = symbols
            .iter()
            .enumerate()
            .map(|(i, &symbol)| Tile {
                symbol,
                unit: i,
                state: TileState::Pending,
                warning_on: false,
                flash: 0,
            })
            .collect();
    }

    fn shift_from(&mut self, from: usize) {
        for tile in self.tiles.iter_mut().skip(from) {
            tile.unit = tile.unit.saturating_sub(1);
        }
    }

    fn consumed_effect(&mut self, position: usize) {
        self.settle(position, TileState::Consumed);
    }

    fn missed_effect(&mut self, position: usize) {
        self.settle(position, TileState::Missed);
    }

    fn warning(&mut self, position: usize, on: bool) {
        if let Some(tile) = self.tiles.get_mut(position) {
            tile.warning_on = on;
        }
    }
}

/// Everything a renderer can be asked to do, as recorded calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderCall {
    Sequence(Vec<Symbol>),
    Shift(usize),
    Consumed(usize),
    Missed(usize),
    Warning(usize, bool),
}

/// Renderer test double: records calls in order for assertions.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub calls: Vec<RenderCall>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, matcher: impl Fn(&RenderCall) -> bool) -> usize {
        self.calls.iter().filter(|call| matcher(call)).count()
    }
}

impl Renderer for RecordingRenderer {
    fn render_sequence(&mut self, symbols: &[Symbol]) {
        self.calls.push(RenderCall::Sequence(symbols.to_vec()));
    }

    fn shift_from(&mut self, from: usize) {
        self.calls.push(RenderCall::Shift(from));
    }

    fn consumed_effect(&mut self, position: usize) {
        self.calls.push(RenderCall::Consumed(position));
    }

    fn missed_effect(&mut self, position: usize) {
        self.calls.push(RenderCall::Missed(position));
    }

    fn warning(&mut self, position: usize, on: bool) {
        self.calls.push(RenderCall::Warning(position, on));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::Alphabet;

    fn three_tiles() -> Playfield {
        let mut field = Playfield::new();
        field.render_sequence(&Alphabet::from_keys("abc").sample(3));
        field
    }

    #[test]
    fn render_sequence_lays_tiles_at_index_units() {
        let field = three_tiles();
        let units: Vec<usize> = field.tiles().iter().map(|t| t.unit).collect();
        assert_eq!(units, vec![0, 1, 2]);
        assert!(field
            .tiles()
            .iter()
            .all(|t| t.state == TileState::Pending && !t.warning_on));
    }

    #[test]
    fn render_sequence_replaces_previous_board() {
        let mut field = three_tiles();
        field.consumed_effect(0);
        field.render_sequence(&Alphabet::from_keys("xy").sample(2));
        assert_eq!(field.tiles().len(), 2);
        assert!(field.tiles().iter().all(|t| t.state == TileState::Pending));
    }

    #[test]
    fn shift_moves_only_tiles_from_position_onward() {
        let mut field = three_tiles();
        field.shift_from(1);
        let units: Vec<usize> = field.tiles().iter().map(|t| t.unit).collect();
        assert_eq!(units, vec![0, 0, 1]);
    }

    #[test]
    fn shift_saturates_at_zero() {
        let mut field = three_tiles();
        field.shift_from(0);
        field.shift_from(0);
        assert_eq!(field.tiles()[0].unit, 0);
    }

    #[test]
    fn effects_settle_tile_and_start_flash() {
        let mut field = three_tiles();
        field.warning(0, true);
        field.consumed_effect(0);
        assert_eq!(field.tiles()[0].state, TileState::Consumed);
        assert!(!field.tiles()[0].warning_on);
        assert!(field.tiles()[0].flash > 0);

        field.missed_effect(1);
        assert_eq!(field.tiles()[1].state, TileState::Missed);
    }

    #[test]
    fn decay_ages_flash_to_zero() {
        let mut field = three_tiles();
        field.missed_effect(2);
        for _ in 0..EFFECT_FLASH_TICKS {
            field.decay();
        }
        assert_eq!(field.tiles()[2].flash, 0);
        field.decay();
        assert_eq!(field.tiles()[2].flash, 0);
    }

    #[test]
    fn out_of_range_positions_are_ignored() {
        let mut field = three_tiles();
        field.consumed_effect(99);
        field.warning(99, true);
        assert!(field.tiles().iter().all(|t| t.state == TileState::Pending));
    }

    #[test]
    fn recording_renderer_keeps_call_order() {
        let mut rec = RecordingRenderer::new();
        let seq = Alphabet::from_keys("xy").sample(2);
        rec.render_sequence(&seq);
        rec.warning(0, true);
        rec.consumed_effect(0);
        rec.shift_from(1);

        assert_eq!(rec.calls.len(), 4);
        assert_eq!(rec.calls[1], RenderCall::Warning(0, true));
        assert_eq!(rec.count(|c| matches!(c, RenderCall::Shift(_))), 1);
    }
}
