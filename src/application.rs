use std::io::Write;

use chime::core::alarm::{confirmation, parse_alarm_input};
use chime::core::clock::{Clock, format_clock};
use chime::error::AlarmError;
use chime::scheduler::{Notifier, Scheduler};
use chime::state::AppState;
use chime::storage::KeyValueStore;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::components::alarm_banner::AlarmBanner;
use crate::message::{CommandError, HELP, Message};
use crate::pages;

const PROMPT: &str = "chime> ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// What a scheduler tick wants on screen.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TickOutput {
    pub lines: Vec<String>,
    pub bell: Option<char>,
}

/// Terminal front end: turns input lines into state changes and renders the result.
pub struct Chime<S, C> {
    state: AppState<S, C>,
    scheduler: Scheduler,
    banner: AlarmBanner,
}

impl<S: KeyValueStore, C: Clock> Chime<S, C> {
    pub fn new(state: AppState<S, C>, scheduler: Scheduler) -> Self {
        Self {
            state,
            scheduler,
            banner: AlarmBanner::new(),
        }
    }

    /// Clock, note list and the open note, as shown on launch.
    pub fn startup(&self) -> Vec<String> {
        let mut lines = vec![format_clock(self.state.now())];
        lines.extend(self.list_view());
        lines.push(String::new());
        lines.extend(self.editor_view());
        lines
    }

    pub fn handle_line(&mut self, line: &str) -> (Flow, Vec<String>) {
        match Message::parse(line) {
            Ok(Some(message)) => self.update(message),
            Ok(None) => (Flow::Continue, Vec::new()),
            Err(e) => (Flow::Continue, vec![e.to_string()]),
        }
    }

    pub fn update(&mut self, message: Message) -> (Flow, Vec<String>) {
        log::debug!("Handling {:?}", message);
        if message == Message::Quit {
            return (Flow::Quit, Vec::new());
        }
        let lines = match self.apply(message) {
            Ok(lines) => lines,
            Err(e) => vec![e.to_string()],
        };
        (Flow::Continue, lines)
    }

    fn apply(&mut self, message: Message) -> Result<Vec<String>, CommandError> {
        let Some(active) = self.state.active_id() else {
            // Unreachable after load; the state always keeps a note open.
            return Ok(vec!["No note is open.".to_string()]);
        };

        let lines = match message {
            Message::NewNote => {
                self.state.create_note();
                self.editor_view()
            }
            Message::ShowList => self.list_view(),
            Message::OpenNote(prefix) => {
                let id = {
                    let matches = self.state.notes().find_by_prefix(&prefix);
                    match matches.as_slice() {
                        [] => return Err(CommandError::UnknownNote(prefix)),
                        [note] => note.id,
                        _ => return Err(CommandError::AmbiguousNote(prefix)),
                    }
                };
                self.state.activate(id);
                self.editor_view()
            }
            Message::ShowNote => self.editor_view(),
            Message::SetTitle(title) => {
                self.state.update_note(active, Some(title), None);
                self.list_view()
            }
            Message::SetContent(content) => {
                self.state.update_note(active, None, Some(content));
                self.editor_view()
            }
            Message::AppendContent(line) => {
                let mut content = self
                    .state
                    .get_note(active)
                    .map(|n| n.content.clone())
                    .unwrap_or_default();
                if !content.is_empty() {
                    content.push('\n');
                }
                content.push_str(&line);
                self.state.update_note(active, None, Some(content));
                self.editor_view()
            }
            Message::DeleteNote => {
                self.state.delete_note(active);
                let mut lines = self.list_view();
                lines.push(String::new());
                lines.extend(self.editor_view());
                lines
            }
            Message::SetAlarm(input) => {
                let at = parse_alarm_input(&input).ok_or(CommandError::InvalidTime(input))?;
                let title = self
                    .state
                    .get_note(active)
                    .map(|n| n.title.clone())
                    .unwrap_or_default();
                match self.state.set_alarm(active, at, &title) {
                    Ok(alarm) => vec![confirmation(alarm.trigger_time)],
                    Err(AlarmError::InvalidSchedule { .. }) => {
                        vec!["Please select a future time for the alarm.".to_string()]
                    }
                    Err(e) => vec![e.to_string()],
                }
            }
            Message::ClearAlarm => match self.state.clear_alarm(active) {
                Some(_) => vec!["Alarm cleared.".to_string()],
                None => vec!["This note has no alarm.".to_string()],
            },
            Message::DismissAlarm => {
                self.banner.dismiss();
                Vec::new()
            }
            Message::ShowTime => vec![format_clock(self.state.now())],
            Message::Help => HELP.iter().map(|l| l.to_string()).collect(),
            Message::Quit => Vec::new(),
        };
        Ok(lines)
    }

    pub fn on_tick(&mut self) -> TickOutput {
        self.scheduler.tick(&mut self.state, &mut self.banner);
        TickOutput {
            lines: self.banner.take_pending(),
            bell: self.banner.bell(),
        }
    }

    fn list_view(&self) -> Vec<String> {
        pages::list::view(&self.state.list_notes(), self.state.active_id())
    }

    fn editor_view(&self) -> Vec<String> {
        self.state
            .active_note()
            .map(pages::editor::view)
            .unwrap_or_default()
    }

    /// Multiplex stdin and the scheduler ticker until `quit` or end of input.
    pub async fn run(mut self) -> std::io::Result<()> {
        let mut input = BufReader::new(tokio::io::stdin()).lines();
        let mut ticker = self.scheduler.ticker();
        let mut stdout = std::io::stdout();

        print_lines(&mut stdout, &self.startup())?;
        write!(stdout, "{}", PROMPT)?;
        stdout.flush()?;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let out = self.on_tick();
                    if let Some(bell) = out.bell {
                        write!(stdout, "{}", bell)?;
                    }
                    if !out.lines.is_empty() {
                        writeln!(stdout)?;
                        print_lines(&mut stdout, &out.lines)?;
                        write!(stdout, "{}", PROMPT)?;
                    }
                    stdout.flush()?;
                }
                line = input.next_line() => {
                    let Some(line) = line? else {
                        break;
                    };
                    let (flow, lines) = self.handle_line(&line);
                    print_lines(&mut stdout, &lines)?;
                    if flow == Flow::Quit {
                        break;
                    }
                    write!(stdout, "{}", PROMPT)?;
                    stdout.flush()?;
                }
            }
        }

        log::info!("Leaving");
        Ok(())
    }
}

fn print_lines(out: &mut impl Write, lines: &[String]) -> std::io::Result<()> {
    for line in lines {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}
