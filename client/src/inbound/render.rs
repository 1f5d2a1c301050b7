//! Plain-text rendering of views for the terminal.

use crate::domain::{BrowseView, EndOutcome, Session, SessionId, Snapshot};
use crate::inbound::forms::{FieldSpec, Notice, NoticeKind};
use crate::inbound::navigation::{Route, SessionNavigation};

/// Top-level menu with the current identity.
#[must_use]
pub fn home(identity: Option<&str>) -> String {
    let mut lines = vec![match identity {
        Some(id) => format!("Signed in as {id}"),
        None => "No user registered on this client".to_owned(),
    }];
    lines.extend(
        Route::MENU
            .iter()
            .map(|(route, label)| format!("  {label:<16} {route}")),
    );
    lines.join("\n")
}

/// Session summary followed by the links this client may follow.
#[must_use]
pub fn session_menu(session: &Session, navigation: &SessionNavigation) -> String {
    let mut lines = vec![
        format!("Session {}", session.id()),
        format!("  creator   {}", session.creator_id()),
        format!("  status    {}", status(session)),
        format!("  candidates {}", session.restaurants().len()),
    ];
    if navigation.is_owner() {
        lines.push("  you created this session".to_owned());
    }
    lines.extend(
        navigation
            .links()
            .into_iter()
            .map(|link| format!("  {:<28} {}", link.view.label(), link.route)),
    );
    lines.join("\n")
}

/// Numbered session listing. Row numbers feed `SessionBrowser::end_row`.
#[must_use]
pub fn browse(view: &BrowseView) -> String {
    if view.rows.is_empty() {
        return "No sessions yet".to_owned();
    }
    view.rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let owner = if row.is_owner { "  (yours)" } else { "" };
            format!(
                "[{index}] {}  creator {}  {} candidate(s)  {}{owner}",
                row.session.id(),
                row.session.creator_id(),
                row.session.restaurants().len(),
                status(&row.session),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Candidate list from the latest poll, with the last error if any.
#[must_use]
pub fn candidates(snapshot: &Snapshot<Session>) -> String {
    let mut lines = Vec::new();
    match snapshot.value() {
        None => lines.push("Loading restaurants...".to_owned()),
        Some(session) if session.restaurants().is_empty() => {
            lines.push("No restaurants submitted yet".to_owned());
        }
        Some(session) => {
            lines.extend(session.restaurants().iter().map(|restaurant| {
                restaurant.submitted_by().map_or_else(
                    || format!("  - {}", restaurant.name()),
                    |user| format!("  - {}  (by {user})", restaurant.name()),
                )
            }));
        }
    }
    if let Some(session) = snapshot.value().filter(|session| session.ended()) {
        lines.push(format!("Voting closed. {}", winner_line(session.winner())));
    }
    if let Some(err) = snapshot.last_error() {
        lines.push(format!("Last refresh failed: {}", err.message()));
    }
    lines.join("\n")
}

/// Notice left by a form submission.
#[must_use]
pub fn notice(notice: &Notice) -> String {
    let tag = match notice.kind {
        NoticeKind::Success => "ok",
        NoticeKind::Error => "error",
    };
    format!("[{tag}] {}", notice.message)
}

/// Field list of a form opened without values.
#[must_use]
pub fn form(title: &str, fields: &[FieldSpec]) -> String {
    let mut lines = vec![title.to_owned()];
    lines.extend(fields.iter().map(|field| {
        let marker = if field.required { " (required)" } else { "" };
        format!("  {}={}{marker}", field.name, field.label)
    }));
    lines.join("\n")
}

/// Result of ending a session.
#[must_use]
pub fn end_outcome(session_id: SessionId, outcome: &EndOutcome) -> String {
    format!(
        "Session {session_id} ended. {}",
        winner_line(outcome.winner.as_ref())
    )
}

fn status(session: &Session) -> String {
    if session.ended() {
        format!("ended, {}", winner_line(session.winner()).to_lowercase())
    } else {
        "open".to_owned()
    }
}

fn winner_line(winner: Option<&impl std::fmt::Display>) -> String {
    winner.map_or_else(
        || "No winner was picked".to_owned(),
        |name| format!("Winner: {name}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClientError, PollableResource, Restaurant, RestaurantName, UserId};

    fn session_with(names: &[&str]) -> Session {
        let restaurants = names
            .iter()
            .map(|name| Restaurant::new(None, RestaurantName::new(name).expect("name"), None))
            .collect();
        Session::new(SessionId::random(), UserId::random(), restaurants)
    }

    #[test]
    fn the_home_menu_lists_every_top_level_route() {
        let text = home(None);
        assert!(text.starts_with("No user registered"));
        for (route, label) in Route::MENU {
            assert!(text.contains(label));
            assert!(text.contains(&route.to_string()));
        }
    }

    #[test]
    fn candidates_show_the_winner_and_the_last_error() {
        let resource = PollableResource::new();
        let ended = session_with(&["Pizza Place"])
            .end(Some(RestaurantName::new("Pizza Place").expect("name")))
            .expect("end");
        let first = resource.issue();
        assert!(resource.apply(first, Ok(ended)));
        let second = resource.issue();
        assert!(resource.apply(second, Err(ClientError::transport("connection reset"))));

        let text = candidates(&resource.latest());
        assert!(text.contains("  - Pizza Place"));
        assert!(text.contains("Voting closed. Winner: Pizza Place"));
        assert!(text.contains("Last refresh failed: connection reset"));
    }

    #[test]
    fn empty_lists_say_so() {
        let resource = PollableResource::new();
        assert_eq!(candidates(&resource.latest()), "Loading restaurants...");
        let ticket = resource.issue();
        assert!(resource.apply(ticket, Ok(session_with(&[]))));
        assert_eq!(candidates(&resource.latest()), "No restaurants submitted yet");
        assert_eq!(browse(&BrowseView::default()), "No sessions yet");
    }

    #[test]
    fn outcomes_without_a_winner_are_explicit() {
        let id = SessionId::random();
        assert_eq!(
            end_outcome(id, &EndOutcome { winner: None }),
            format!("Session {id} ended. No winner was picked")
        );
    }
}
