use chime::scheduler::Notifier;

const BELL: char = '\u{7}';

/// Terminal side of a fired alarm: a banner that stays up and a bell that
/// rings on every tick until dismissed. A newer alarm replaces the one on screen.
#[derive(Debug, Default)]
pub struct AlarmBanner {
    message: Option<String>,
    pending: Vec<String>,
}

impl AlarmBanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.message.is_some()
    }

    /// Banner lines produced since the last call.
    pub fn take_pending(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending)
    }

    /// What to emit for the audible alert this tick, if anything.
    pub fn bell(&self) -> Option<char> {
        self.is_visible().then_some(BELL)
    }
}

impl Notifier for AlarmBanner {
    fn notify(&mut self, message: &str) {
        self.pending.push(banner(message));
        self.message = Some(message.to_string());
    }

    fn dismiss(&mut self) {
        self.message = None;
    }
}

pub fn banner(message: &str) -> String {
    format!("*** {} *** (type `dismiss` to silence)", message)
}
