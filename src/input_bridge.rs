use std::thread::{self, JoinHandle};

use ratatui::crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};
use tokio::sync::mpsc;

use crate::round::CHOICES;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    PlaySound,
    SelectPosition(usize),
    SelectLetter(char),
    Click { column: u16, row: u16 },
    Quit,
}

/// 终端输入在独立线程中阻塞读取，转成 InputEvent 发给主循环
pub struct InputBridge {
    tx: mpsc::Sender<InputEvent>,
}

impl InputBridge {
    pub fn new(tx: mpsc::Sender<InputEvent>) -> Self {
        Self { tx }
    }

    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new().name("input".into()).spawn(move || {
            loop {
                let event = match event::read() {
                    Ok(event) => event,
                    Err(e) => {
                        log::error!("Terminal input error: {}", e);
                        let _ = self.tx.blocking_send(InputEvent::Quit);
                        break;
                    }
                };
                if let Some(input) = map_event(&event) {
                    if self.tx.blocking_send(input).is_err() {
                        // 主循环已退出
                        break;
                    }
                }
            }
        })
    }
}

pub fn map_event(event: &Event) -> Option<InputEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => map_key(key),
        Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
            Some(InputEvent::Click {
                column: mouse.column,
                row: mouse.row,
            })
        }
        _ => None,
    }
}

fn map_key(key: &KeyEvent) -> Option<InputEvent> {
    match key.code {
        KeyCode::Esc => Some(InputEvent::Quit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(InputEvent::Quit)
        }
        KeyCode::Char(' ') | KeyCode::Enter => Some(InputEvent::PlaySound),
        KeyCode::Char(c) if c.is_ascii_digit() => {
            // 数字键从 1 开始编号
            (c.to_digit(10)? as usize)
                .checked_sub(1)
                .filter(|p| *p < CHOICES)
                .map(InputEvent::SelectPosition)
        }
        KeyCode::Char(c) if c.is_ascii_alphabetic() => {
            Some(InputEvent::SelectLetter(c.to_ascii_uppercase()))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use ratatui::crossterm::event::{KeyEventState, MouseEvent};

    use super::*;

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn keys() {
        assert_eq!(map_event(&press(KeyCode::Char(' '))), Some(InputEvent::PlaySound));
        assert_eq!(map_event(&press(KeyCode::Enter)), Some(InputEvent::PlaySound));
        assert_eq!(map_event(&press(KeyCode::Esc)), Some(InputEvent::Quit));
        assert_eq!(map_event(&press(KeyCode::Char('1'))), Some(InputEvent::SelectPosition(0)));
        assert_eq!(map_event(&press(KeyCode::Char('3'))), Some(InputEvent::SelectPosition(2)));
        assert_eq!(map_event(&press(KeyCode::Char('4'))), None);
        assert_eq!(map_event(&press(KeyCode::Char('0'))), None);
        assert_eq!(map_event(&press(KeyCode::Char('m'))), Some(InputEvent::SelectLetter('M')));
        assert_eq!(map_event(&press(KeyCode::Char('Q'))), Some(InputEvent::SelectLetter('Q')));
        assert_eq!(map_event(&press(KeyCode::Tab)), None);
    }

    #[test]
    fn out_of_range_digits_select_nothing() {
        for d in ['0', '4', '9'] {
            assert_eq!(map_event(&press(KeyCode::Char(d))), None, "{d}");
        }
    }

    #[test]
    fn ctrl_c_quits_instead_of_selecting() {
        let event = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(map_event(&event), Some(InputEvent::Quit));
    }

    #[test]
    fn key_release_is_ignored() {
        let event = Event::Key(KeyEvent {
            code: KeyCode::Char('a'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });
        assert_eq!(map_event(&event), None);
    }

    #[test]
    fn left_click() {
        let down = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 12,
            row: 4,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(map_event(&down), Some(InputEvent::Click { column: 12, row: 4 }));

        let right = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Right),
            column: 12,
            row: 4,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(map_event(&right), None);
    }
}
