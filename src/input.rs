use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Quit,
    PauseToggle,
    StepOnce,
    ForceStrike,
    CycleTheme,
    ParticlesToggle,
    ReseedParticles,
    HelpToggle,
}

pub(crate) fn collect_actions() -> anyhow::Result<Vec<Action>> {
    let mut out = Vec::new();
    while event::poll(Duration::from_millis(0))? {
        if let Event::Key(k) = event::read()? {
            if k.kind != KeyEventKind::Press && k.kind != KeyEventKind::Repeat {
                continue;
            }
            if let Some(action) = map_key(k.code) {
                out.push(action);
                if out.len() >= 32 {
                    break;
                }
            }
        }
    }
    Ok(out)
}

fn map_key(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char(' ') => Some(Action::PauseToggle),
        KeyCode::Char('n') | KeyCode::Char('N') => Some(Action::StepOnce),
        KeyCode::Char('l') | KeyCode::Char('L') => Some(Action::ForceStrike),
        KeyCode::Char('c') | KeyCode::Char('C') => Some(Action::CycleTheme),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(Action::ParticlesToggle),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Action::ReseedParticles),
        KeyCode::Char('h') | KeyCode::Char('H') => Some(Action::HelpToggle),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quit_maps_from_q_and_esc() {
        assert_eq!(map_key(KeyCode::Char('q')), Some(Action::Quit));
        assert_eq!(map_key(KeyCode::Esc), Some(Action::Quit));
    }

    #[test]
    fn unbound_keys_map_to_nothing() {
        assert_eq!(map_key(KeyCode::Char('x')), None);
        assert_eq!(map_key(KeyCode::Tab), None);
    }
}
