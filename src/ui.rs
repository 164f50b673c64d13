use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use time_humanize::{Accuracy, HumanTime, Tense};

use crate::clock::Clock;
use crate::engine::SessionPhase;
use crate::render::TileState;
use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
/// Columns per spacing unit in the lane.
const LANE_UNIT_WIDTH: usize = 4;

impl<C: Clock> Widget for &App<C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // styles
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_bold_style = Style::default()
            .patch(bold_style)
            .add_modifier(Modifier::DIM);
        let underlined_bold_style = Style::default()
            .patch(bold_style)
            .add_modifier(Modifier::UNDERLINED);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);
        let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
        let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
        let magenta_bold_style = Style::default().patch(bold_style).fg(Color::Magenta);

        match self.engine.phase() {
            SessionPhase::Idle => {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .horizontal_margin(HORIZONTAL_MARGIN)
                    .constraints([
                        Constraint::Length(area.height.saturating_sub(7) / 2),
                        Constraint::Length(2),
                        Constraint::Length(1),
                        Constraint::Length(1),
                        Constraint::Length(1),
                        Constraint::Length(1),
                        Constraint::Length(1),
                        Constraint::Min(0),
                    ])
                    .split(area);

                Paragraph::new(Span::styled("b l i x t", magenta_bold_style))
                    .alignment(Alignment::Center)
                    .render(chunks[1], buf);

                let keys = self
                    .engine
                    .alphabet()
                    .symbols()
                    .iter()
                    .map(|s| s.to_string())
                    .join(" ");
                Paragraph::new(Span::styled(keys, dim_bold_style))
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true })
                    .render(chunks[2], buf);

                Paragraph::new(Span::styled(
                    format!("{} points all time", self.engine.cumulative_score()),
                    bold_style,
                ))
                .alignment(Alignment::Center)
                .render(chunks[3], buf);

                if let Some(last) = self.last_played {
                    let elapsed = (chrono::Local::now() - last).to_std().unwrap_or_default();
                    let when = HumanTime::from(elapsed).to_text_en(Accuracy::Rough, Tense::Past);
                    Paragraph::new(Span::styled(format!("last played {}", when), italic_style))
                        .alignment(Alignment::Center)
                        .render(chunks[4], buf);
                }

                Paragraph::new(Span::styled("(enter) play / (esc)ape", italic_style))
                    .alignment(Alignment::Center)
                    .render(chunks[6], buf);
            }
            SessionPhase::Active => {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .horizontal_margin(HORIZONTAL_MARGIN)
                    .constraints([
                        Constraint::Length(area.height.saturating_sub(5) / 2),
                        Constraint::Length(2),
                        Constraint::Length(1),
                        Constraint::Length(2),
                        Constraint::Min(0),
                    ])
                    .split(area);

                let warning_live = self.playfield.tiles().iter().any(|t| t.warning_on);
                if let Some(ms) = self.engine.time_remaining_ms() {
                    let countdown_style = if warning_live {
                        red_bold_style
                    } else {
                        dim_bold_style
                    };
                    Paragraph::new(Span::styled(
                        format!("{:.1}", ms as f64 / 1000.0),
                        countdown_style,
                    ))
                    .alignment(Alignment::Center)
                    .render(chunks[1], buf);
                }

                // consumed/missed trail, in the order the symbols settled
                let trail = self
                    .playfield
                    .tiles()
                    .iter()
                    .filter(|t| t.state != TileState::Pending)
                    .map(|t| {
                        let mut style = match t.state {
                            TileState::Consumed => green_bold_style,
                            _ => red_bold_style,
                        };
                        if t.flash > 0 {
                            style = style.add_modifier(Modifier::REVERSED);
                        }
                        Span::styled(format!("{} ", t.symbol), style)
                    })
                    .collect::<Vec<Span>>();
                Paragraph::new(Line::from(trail)).render(chunks[2], buf);

                // the lane: pending symbols at their unit offsets, head first
                let mut spans: Vec<Span> = vec![];
                let mut col = 0usize;
                for (idx, tile) in self
                    .playfield
                    .tiles()
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.state == TileState::Pending)
                {
                    let target = tile.unit * LANE_UNIT_WIDTH;
                    if target > col {
                        spans.push(Span::raw(" ".repeat(target - col)));
                        col = target;
                    }
                    let style = if tile.warning_on {
                        red_bold_style
                    } else if idx == self.engine.cursor() {
                        underlined_bold_style
                    } else {
                        dim_bold_style
                    };
                    spans.push(Span::styled(tile.symbol.to_string(), style));
                    col += 1;
                }
                Paragraph::new(Line::from(spans)).render(chunks[3], buf);
            }
            SessionPhase::Ended => {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .horizontal_margin(HORIZONTAL_MARGIN)
                    .constraints([
                        Constraint::Length(area.height.saturating_sub(7) / 2),
                        Constraint::Length(2),
                        Constraint::Length(1),
                        Constraint::Length(1),
                        Constraint::Length(1),
                        Constraint::Length(1),
                        Constraint::Length(1),
                        Constraint::Min(0),
                    ])
                    .split(area);

                Paragraph::new(Span::styled("time!", magenta_bold_style))
                    .alignment(Alignment::Center)
                    .render(chunks[1], buf);

                Paragraph::new(Span::styled(
                    format!("{} points this session", self.engine.session_score()),
                    bold_style,
                ))
                .alignment(Alignment::Center)
                .render(chunks[2], buf);

                Paragraph::new(Span::styled(
                    format!("{} hit / {} missed", self.engine.hits(), self.engine.misses()),
                    dim_bold_style,
                ))
                .alignment(Alignment::Center)
                .render(chunks[3], buf);

                Paragraph::new(Span::styled(
                    format!("{} points all time", self.engine.cumulative_score()),
                    dim_bold_style,
                ))
                .alignment(Alignment::Center)
                .render(chunks[4], buf);

                Paragraph::new(Span::styled("(r)estart / (esc)ape", italic_style))
                    .alignment(Alignment::Center)
                    .render(chunks[6], buf);
            }
        }
    }
}
