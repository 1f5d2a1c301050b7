//! Command-line surface of the `lunch` binary.
//!
//! Every subcommand is sugar for a [`Route`] plus form field values; the
//! [`Shell`] resolves both the same way regardless of how they were given.

mod shell;

pub use shell::{Outcome, Shell};

use clap::{Parser, Subcommand};

use crate::domain::{ClientError, SessionId};
use crate::inbound::navigation::{Route, SessionView};

/// `lunch` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "lunch",
    about = "Pick a lunch spot with your group: register, open a session, invite, submit, end",
    version
)]
pub struct Cli {
    /// Backend root URL. Overrides `LUNCH_BASE_URL`.
    #[arg(long = "base-url", value_name = "url", global = true)]
    pub base_url: Option<String>,
    /// Directory holding the client state file. Overrides `LUNCH_STATE_DIR`.
    #[arg(long = "state-dir", value_name = "path", global = true)]
    pub state_dir: Option<String>,
    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands, one per view of the client.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Register a user and remember it as this client's identity.
    Register {
        /// Display name, used by others to invite you.
        #[arg(long)]
        name: String,
        /// Optional contact address.
        #[arg(long)]
        email: Option<String>,
    },
    /// Create a session owned by the stored identity.
    Create {
        /// Create on behalf of another user id.
        #[arg(long, value_name = "user-id")]
        creator: Option<String>,
    },
    /// Check that a session exists and open its menu.
    Join {
        /// Session id.
        session: String,
    },
    /// Invite a user into a session by display name.
    Invite {
        /// Session id.
        session: SessionId,
        /// Display name of the invitee.
        name: String,
    },
    /// Submit a restaurant candidate.
    Submit {
        /// Session id.
        session: SessionId,
        /// Restaurant name.
        restaurant: String,
    },
    /// Follow the candidate list until the session ends or Ctrl-C.
    Watch {
        /// Session id.
        session: SessionId,
    },
    /// End a session and reveal the winner.
    End {
        /// Session id.
        session: SessionId,
    },
    /// List sessions, optionally ending the one at a listed position.
    Sessions {
        /// Position from the listing to end.
        #[arg(long, value_name = "index")]
        end: Option<usize>,
    },
    /// Open any client path, such as `/session/{id}/invite`.
    Open {
        /// Path to open.
        path: String,
        /// Form values as `field=value`.
        #[arg(value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
    /// Show the stored identity and the main menu.
    Whoami,
}

/// A route with the field values to submit on it.
pub type Request = (Route, Vec<(String, String)>);

impl Command {
    /// Translate the subcommand into a route and field values.
    ///
    /// # Errors
    ///
    /// Returns the routing error of an `open` path.
    pub fn into_request(self) -> Result<Request, ClientError> {
        let request = match self {
            Self::Register { name, email } => {
                let mut fields = vec![field("name", name)];
                fields.extend(email.map(|email| field("email", email)));
                (Route::AddUser, fields)
            }
            Self::Create { creator } => (
                Route::CreateSession,
                creator.map(|id| field("creator", id)).into_iter().collect(),
            ),
            Self::Join { session } => (Route::JoinSession, vec![field("session", session)]),
            Self::Invite { session, name } => (
                session_route(session, SessionView::Invite),
                vec![field("invitee", name)],
            ),
            Self::Submit {
                session,
                restaurant,
            } => (
                session_route(session, SessionView::SubmitRestaurant),
                vec![field("restaurant", restaurant)],
            ),
            Self::Watch { session } => (session_route(session, SessionView::Restaurants), Vec::new()),
            Self::End { session } => (session_route(session, SessionView::End), Vec::new()),
            Self::Sessions { end } => (
                Route::ViewSessions,
                end.map(|index| field("end", index.to_string()))
                    .into_iter()
                    .collect(),
            ),
            Self::Open { path, fields } => (Route::parse(&path)?, fields),
            Self::Whoami => (Route::Home, Vec::new()),
        };
        Ok(request)
    }
}

fn field(name: &str, value: String) -> (String, String) {
    (name.to_owned(), value)
}

const fn session_route(id: SessionId, view: SessionView) -> Route {
    Route::Session {
        id,
        view: Some(view),
    }
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got {raw:?}"))?;
    let key = name.trim();
    if key.is_empty() {
        return Err(format!("missing field name in {raw:?}"));
    }
    Ok((key.to_owned(), value.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    fn parse(args: &[&str]) -> Request {
        let cli = Cli::try_parse_from(std::iter::once("lunch").chain(args.iter().copied()))
            .expect("arguments parse");
        cli.command.into_request().expect("routes")
    }

    #[test]
    fn register_carries_both_fields() {
        let (route, fields) = parse(&["register", "--name", "Ada", "--email", "ada@example.com"]);
        assert_eq!(route, Route::AddUser);
        assert_eq!(
            fields,
            vec![
                ("name".to_owned(), "Ada".to_owned()),
                ("email".to_owned(), "ada@example.com".to_owned()),
            ]
        );
    }

    #[rstest]
    #[case(&["invite", ID, "Bob"], SessionView::Invite, Some("invitee"))]
    #[case(&["submit", ID, "Pizza Place"], SessionView::SubmitRestaurant, Some("restaurant"))]
    #[case(&["watch", ID], SessionView::Restaurants, None)]
    #[case(&["end", ID], SessionView::End, None)]
    fn session_commands_target_session_views(
        #[case] args: &[&str],
        #[case] view: SessionView,
        #[case] field_name: Option<&str>,
    ) {
        let (route, fields) = parse(args);
        assert_eq!(
            route,
            Route::Session {
                id: SessionId::new(ID).expect("id"),
                view: Some(view),
            }
        );
        assert_eq!(
            fields.first().map(|(name, _)| name.as_str()),
            field_name
        );
    }

    #[test]
    fn open_parses_paths_and_fields() {
        let path = format!("/session/{ID}/invite");
        let (route, fields) = parse(&["open", &path, "invitee=Bob = B"]);
        assert_eq!(route.to_string(), path);
        assert_eq!(fields, vec![("invitee".to_owned(), "Bob = B".to_owned())]);
    }

    #[rstest]
    #[case("novalue")]
    #[case("=value")]
    fn malformed_fields_are_rejected(#[case] raw: &str) {
        assert!(parse_field(raw).is_err());
    }

    #[test]
    fn invalid_session_ids_fail_at_parse_time() {
        let result = Cli::try_parse_from(["lunch", "end", "not-a-uuid"]);
        assert!(result.is_err());
    }
}
