//! Screen entry: open the editor for a subject or send the user back.

use badgeink_core::{EditorConfig, LoadTicket, Subject};

use crate::editor::{BadgeEditor, EditorError};

/// Where navigation lands for the given state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Edit(Subject),
    /// No subject was supplied; go to this route instead.
    Redirect(String),
}

/// Decide between editing and redirecting.
pub fn resolve_route(state: Option<Subject>, config: &EditorConfig) -> Route {
    match state {
        Some(subject) => Route::Edit(subject),
        None => {
            log::info!("No subject supplied, redirecting to {}", config.redirect_route);
            Route::Redirect(config.redirect_route.clone())
        }
    }
}

/// An opened screen.
pub enum Screen {
    /// Editor with the subject selected. Drive `ticket` through the loads.
    Editor {
        editor: Box<BadgeEditor>,
        ticket: LoadTicket,
    },
    Redirect(String),
}

/// Open the editor screen for the navigation state.
///
/// No editor is built when redirecting.
pub fn open_editor(state: Option<Subject>, config: EditorConfig) -> Result<Screen, EditorError> {
    match resolve_route(state, &config) {
        Route::Edit(subject) => {
            let mut editor = Box::new(BadgeEditor::new(config)?);
            let ticket = editor.select_subject(subject);
            Ok(Screen::Editor { editor, ticket })
        }
        Route::Redirect(route) => Ok(Screen::Redirect(route)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use badgeink_core::LoadPhase;

    #[test]
    fn test_missing_subject_redirects() {
        let screen = open_editor(None, EditorConfig::default()).unwrap();
        assert!(matches!(screen, Screen::Redirect(route) if route == "/restaurants"));
    }

    #[test]
    fn test_custom_redirect_route() {
        let config = EditorConfig {
            redirect_route: "/home".to_string(),
            ..EditorConfig::default()
        };
        assert_eq!(resolve_route(None, &config), Route::Redirect("/home".to_string()));
    }

    #[test]
    fn test_subject_opens_editor() {
        let subject = Subject::new("3", "Diner", "diner.jpg");
        let screen = open_editor(Some(subject.clone()), EditorConfig::default()).unwrap();
        let Screen::Editor { editor, ticket } = screen else {
            panic!("expected editor screen");
        };
        assert_eq!(editor.subject(), Some(&subject));
        assert_eq!(editor.load_phase(), LoadPhase::Subject);
        assert!(!editor.is_ready());
        assert_eq!(ticket.generation(), 1);
    }
}
