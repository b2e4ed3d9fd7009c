//! Terminal rendering of the loading, error, and game screens.

mod celebration;

pub use celebration::Celebration;

use std::time::Instant;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::Line,
    widgets::{Block, BorderType, Paragraph},
};

use crate::game::{Game, Mark, Phase};
use crate::round::CHOICES;

const LETTER_BOX_WIDTH: u16 = 11;
const LETTER_BOX_HEIGHT: u16 = 5;

pub const LOADING_TEXT: &str = "Loading sounds...";
pub const ERROR_TEXT: &str = "Error loading audio files. Please restart the game.";

fn prompt(phase: Phase) -> &'static str {
    match phase {
        Phase::AwaitingAnswer => "Which letter did you hear?",
        Phase::CorrectFeedback => "Well done!",
        Phase::WrongFeedback => "Not quite, try again!",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Loading,
    Error,
    Playing,
}

/// Where the letter boxes were drawn, for mouse hit-testing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LetterSlots([Rect; CHOICES]);

impl LetterSlots {
    pub fn hit(&self, column: u16, row: u16) -> Option<usize> {
        self.0.iter().position(|r| {
            column >= r.x
                && column < r.x.saturating_add(r.width)
                && row >= r.y
                && row < r.y.saturating_add(r.height)
        })
    }
}

pub fn draw(
    frame: &mut Frame,
    screen: Screen,
    game: &Game,
    celebration: &Celebration,
    now: Instant,
) -> LetterSlots {
    match screen {
        Screen::Loading => {
            draw_notice(frame, LOADING_TEXT, Style::default().fg(Color::Cyan));
            LetterSlots::default()
        }
        Screen::Error => {
            draw_notice(frame, ERROR_TEXT, Style::default().fg(Color::Red).bold());
            LetterSlots::default()
        }
        Screen::Playing => draw_game(frame, game, celebration, now),
    }
}

fn draw_notice(frame: &mut Frame, text: &str, style: Style) {
    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(frame.area());
    frame.render_widget(
        Paragraph::new(text).style(style).alignment(Alignment::Center),
        middle,
    );
}

fn draw_game(frame: &mut Frame, game: &Game, celebration: &Celebration, now: Instant) -> LetterSlots {
    let [title, score, _, letters_row, _, hint, sparks] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(LETTER_BOX_HEIGHT),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(frame.area());

    frame.render_widget(
        Paragraph::new(prompt(game.phase()))
            .bold()
            .alignment(Alignment::Center),
        title,
    );
    frame.render_widget(
        Paragraph::new(format!("Score: {}", game.score())).alignment(Alignment::Center),
        score,
    );

    let slots: [Rect; CHOICES] = Layout::horizontal([Constraint::Length(LETTER_BOX_WIDTH); CHOICES])
        .flex(Flex::Center)
        .spacing(4)
        .areas(letters_row);

    let letters = game.round().letters();
    let marks = game.marks();
    for (i, area) in slots.iter().enumerate() {
        draw_letter(frame, *area, i + 1, letters[i], marks[i]);
    }

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            "Space".bold(),
            " play sound   ".into(),
            "1-3 / letter / click".bold(),
            " choose   ".into(),
            "Esc".bold(),
            " quit".into(),
        ]))
        .alignment(Alignment::Center)
        .dim(),
        hint,
    );

    if celebration.is_active() {
        frame.render_widget(celebration.widget(now), sparks);
    }

    LetterSlots(slots)
}

fn draw_letter(frame: &mut Frame, area: Rect, number: usize, letter: char, mark: Mark) {
    let border = match mark {
        Mark::Unmarked => Style::default().fg(Color::White),
        Mark::Correct => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        Mark::Wrong => Style::default().fg(Color::Red),
    };
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(border)
        .title(format!(" {} ", number));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // 字母放在框内正中
    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(inner);
    frame.render_widget(
        Paragraph::new(letter.to_string())
            .style(border.add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        middle,
    );
}
