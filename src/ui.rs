//! Screen selection and menu key routing
//!
//! Pure logic behind the DOM overlays, so it can be tested natively. The
//! options panel is the only piece of UI state the simulation doesn't own.

use crate::consts::TICKS_PER_SECOND;
use crate::sim::{BorderWarning, GamePhase};

/// Which overlay the page should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Title screen
    Start,
    /// Volume/music panel (opened from the title screen)
    Options,
    /// In-game HUD only
    Hud,
    /// HUD with the pause overlay
    Paused,
    GameOver,
    Victory,
}

impl Screen {
    /// DOM id of the overlay element (`None` for the bare HUD)
    pub fn element_id(self) -> Option<&'static str> {
        match self {
            Screen::Start => Some("startScreen"),
            Screen::Options => Some("optionsScreen"),
            Screen::Hud => None,
            Screen::Paused => Some("pauseOverlay"),
            Screen::GameOver => Some("gameOverScreen"),
            Screen::Victory => Some("victoryScreen"),
        }
    }

    /// Whether the HUD bar is visible on this screen
    pub fn shows_hud(self) -> bool {
        matches!(self, Screen::Hud | Screen::Paused)
    }

    /// The mobile pause button only shows during unpaused play
    pub fn shows_pause_button(self) -> bool {
        self == Screen::Hud
    }

    pub const ALL: [Screen; 6] = [
        Screen::Start,
        Screen::Options,
        Screen::Hud,
        Screen::Paused,
        Screen::GameOver,
        Screen::Victory,
    ];
}

/// Screen for the current game phase
pub fn visible_screen(phase: GamePhase, paused: bool, options_open: bool) -> Screen {
    match phase {
        GamePhase::Playing if paused => Screen::Paused,
        GamePhase::Playing => Screen::Hud,
        GamePhase::GameOver => Screen::GameOver,
        GamePhase::Victory => Screen::Victory,
        GamePhase::Menu if options_open => Screen::Options,
        GamePhase::Menu => Screen::Start,
    }
}

/// What Escape (or the mobile pause button) does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeAction {
    TogglePause,
    CloseOptions,
    OpenOptions,
    ReturnToMenu,
}

/// Route an Escape press for the current screen
pub fn escape_action(phase: GamePhase, options_open: bool) -> EscapeAction {
    match phase {
        GamePhase::Playing => EscapeAction::TogglePause,
        _ if options_open => EscapeAction::CloseOptions,
        GamePhase::GameOver | GamePhase::Victory => EscapeAction::ReturnToMenu,
        GamePhase::Menu => EscapeAction::OpenOptions,
    }
}

/// Label for both music toggle buttons
pub fn music_button_label(playing: bool) -> &'static str {
    if playing {
        "🎵 PAUSE MUSIC"
    } else {
        "🎵 PLAY MUSIC"
    }
}

/// CSS background for both music toggle buttons
pub fn music_button_background(playing: bool) -> &'static str {
    if playing {
        "linear-gradient(45deg, #ff6600, #ff8800)"
    } else {
        "linear-gradient(45deg, #00ffcc, #00ff88)"
    }
}

/// "1234m"
pub fn meters(value: u32) -> String {
    format!("{value}m")
}

/// Headline and countdown for the out-of-bounds overlay
pub fn border_warning_text(warning: &BorderWarning) -> (&'static str, String) {
    if warning.out_of_fuel {
        (
            "NO FUEL - FIND FUEL!",
            format!("Freefall to collect fuel! {}s left!", warning.seconds_left),
        )
    } else {
        (
            "OUT OF BOUNDS!",
            format!("Return in {} seconds!", warning.seconds_left),
        )
    }
}

/// "Boost" hint shown at the start of each run
///
/// Counts down in simulation ticks, so it holds still while paused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tutorial {
    ticks_left: u32,
}

impl Tutorial {
    /// How long the hint stays up if the player never thrusts
    pub const SHOW_TICKS: u32 = 5 * TICKS_PER_SECOND;

    pub fn text(mobile: bool) -> &'static str {
        if mobile {
            "TAP TO BOOST"
        } else {
            "CLICK OR TAP TO BOOST"
        }
    }

    pub fn show(&mut self) {
        self.ticks_left = Self::SHOW_TICKS;
    }

    /// Count down one tick; the first thrust dismisses the hint
    pub fn advance(&mut self, thrust: bool) {
        if thrust {
            self.ticks_left = 0;
        } else {
            self.ticks_left = self.ticks_left.saturating_sub(1);
        }
    }

    pub fn is_visible(&self) -> bool {
        self.ticks_left > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_screen() {
        assert_eq!(visible_screen(GamePhase::Menu, false, false), Screen::Start);
        assert_eq!(visible_screen(GamePhase::Menu, false, true), Screen::Options);
        assert_eq!(visible_screen(GamePhase::Playing, false, false), Screen::Hud);
        assert_eq!(visible_screen(GamePhase::Playing, true, false), Screen::Paused);
        assert_eq!(visible_screen(GamePhase::GameOver, false, false), Screen::GameOver);
        assert_eq!(visible_screen(GamePhase::Victory, false, true), Screen::Victory);
    }

    #[test]
    fn test_escape_routing() {
        assert_eq!(escape_action(GamePhase::Playing, false), EscapeAction::TogglePause);
        assert_eq!(escape_action(GamePhase::Menu, true), EscapeAction::CloseOptions);
        assert_eq!(escape_action(GamePhase::Menu, false), EscapeAction::OpenOptions);
        assert_eq!(escape_action(GamePhase::GameOver, false), EscapeAction::ReturnToMenu);
        assert_eq!(escape_action(GamePhase::Victory, false), EscapeAction::ReturnToMenu);
    }

    #[test]
    fn test_hud_only_in_run() {
        let with_hud: Vec<_> = Screen::ALL.iter().filter(|s| s.shows_hud()).collect();
        assert_eq!(with_hud, vec![&Screen::Hud, &Screen::Paused]);
        assert!(Screen::Hud.element_id().is_none());
        assert!(Screen::Hud.shows_pause_button());
        assert!(!Screen::Paused.shows_pause_button());
    }

    #[test]
    fn test_music_button() {
        assert_eq!(music_button_label(true), "🎵 PAUSE MUSIC");
        assert_eq!(music_button_label(false), "🎵 PLAY MUSIC");
        assert_ne!(music_button_background(true), music_button_background(false));
    }

    #[test]
    fn test_warning_text() {
        let (headline, countdown) = border_warning_text(&BorderWarning {
            seconds_left: 2,
            out_of_fuel: false,
        });
        assert_eq!(headline, "OUT OF BOUNDS!");
        assert_eq!(countdown, "Return in 2 seconds!");

        let (headline, countdown) = border_warning_text(&BorderWarning {
            seconds_left: 1,
            out_of_fuel: true,
        });
        assert_eq!(headline, "NO FUEL - FIND FUEL!");
        assert_eq!(countdown, "Freefall to collect fuel! 1s left!");
        assert_eq!(meters(42), "42m");
    }

    #[test]
    fn test_tutorial_hides_on_thrust_or_timeout() {
        let mut tutorial = Tutorial::default();
        assert!(!tutorial.is_visible());

        tutorial.show();
        for _ in 1..Tutorial::SHOW_TICKS {
            tutorial.advance(false);
        }
        assert!(tutorial.is_visible());
        tutorial.advance(false);
        assert!(!tutorial.is_visible());

        tutorial.show();
        tutorial.advance(true);
        assert!(!tutorial.is_visible());

        assert_eq!(Tutorial::text(true), "TAP TO BOOST");
        assert_eq!(Tutorial::text(false), "CLICK OR TAP TO BOOST");
    }
}
