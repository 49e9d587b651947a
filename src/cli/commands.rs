use anyhow::{anyhow, Result};
use chrono::Local;
use colored::Colorize;

use crate::app::{init_config, AppState};
use crate::constants::NETWORK_ERROR_MSG;
use crate::events::{filter_events, DateFilter, Event, EventDraft, EventQuery, PageItem, Pagination};
use crate::session::{Notice, Route, SessionState, Shell};
use crate::utils::{ApiError, SessionError};

use super::args::{EventCommands, EventFields, EventUpdate};
use super::Commands;

/// Write the default configuration files; needs no session
pub fn run_init() -> Result<()> {
    let path = init_config()?;
    println!("Configuration initialized at {}", path.display());
    Ok(())
}

/// Handle a CLI command against an initialized application state
pub async fn handle_command(command: &Commands, state: &AppState, shell: &dyn Shell) -> Result<()> {
    match command {
        Commands::Init => run_init(),
        Commands::Login { email, password } => {
            state
                .session
                .login(email, password)
                .await
                .map(|_| ())
                .map_err(session_failure)
        }
        Commands::Register {
            name,
            email,
            password,
            photo_url,
        } => state
            .session
            .register(name, email, password, photo_url.as_deref())
            .await
            .map(|_| ())
            .map_err(session_failure),
        Commands::Logout => {
            let was_logged_in = state.session.is_authenticated();
            state.session.logout();
            if !was_logged_in {
                println!("Not logged in");
            }
            Ok(())
        }
        Commands::Whoami => {
            show_identity(state);
            Ok(())
        }
        Commands::Events(cmd) => handle_event_command(cmd, state, shell).await,
    }
}

fn show_identity(state: &AppState) {
    match state.session.state() {
        SessionState::Authenticated(session) => {
            println!("{} <{}>", session.user.name.bold(), session.user.email);
            println!("  id: {}", session.user.id);
            if let Some(photo) = &session.user.photo_url {
                println!("  photo: {}", photo);
            }
        }
        SessionState::Anonymous | SessionState::Uninitialized => println!("Not logged in"),
    }
}

async fn handle_event_command(
    command: &EventCommands,
    state: &AppState,
    shell: &dyn Shell,
) -> Result<()> {
    let user_id = state.session.current_user().map(|u| u.id);

    match command {
        EventCommands::List {
            page,
            limit,
            search,
            filter,
        } => {
            let page_size = limit.unwrap_or(state.config.listing.page_size);
            let mut query = EventQuery::default()
                .page(*page)
                .limit(page_size)
                .filter(*filter);
            if let Some(term) = search {
                query = query.search(term.as_str());
            }

            let listing = state.events.list(&query).await.map_err(api_failure)?;

            // Narrow again locally in case the backend ignored the parameters
            let today = Local::now().date_naive();
            let shown = filter_events(
                &listing.events,
                search.as_deref().unwrap_or(""),
                *filter,
                today,
            );
            if shown.is_empty() {
                let filtered = search.is_some() || *filter != DateFilter::All;
                if filtered {
                    println!("No events found. Try adjusting your search or filter criteria.");
                } else {
                    println!("No events yet.");
                }
                return Ok(());
            }

            for event in &shown {
                print_event_line(event, user_id.as_deref());
            }
            print_pager(&Pagination::from_page(&listing, page_size));
            Ok(())
        }
        EventCommands::Show { id } => match state.events.get(id).await {
            Ok(event) => {
                print_event_details(&event, user_id.as_deref());
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                // Dead end: send the user back to the listing
                shell.notify(Notice::error("Event not found"));
                shell.navigate(Route::Events);
                Ok(())
            }
            Err(e) => Err(api_failure(e)),
        },
        EventCommands::Create(fields) => {
            let event = state
                .events
                .create(&draft_from_fields(fields))
                .await
                .map_err(api_failure)?;
            shell.notify(Notice::success(format!("Event '{}' created", event.title)));
            println!("  id: {}", event.id);
            Ok(())
        }
        EventCommands::Update { id, fields } => {
            let current = state.events.get(id).await.map_err(api_failure)?;
            let draft = apply_update(EventDraft::from_event(&current), fields);
            let event = state.events.update(id, &draft).await.map_err(api_failure)?;
            shell.notify(Notice::success(format!("Event '{}' updated", event.title)));
            Ok(())
        }
        EventCommands::Delete { id } => {
            state.events.delete(id).await.map_err(api_failure)?;
            shell.notify(Notice::success("Event deleted"));
            Ok(())
        }
        EventCommands::Join { id } => {
            let Some(user_id) = user_id else {
                return Err(anyhow!("Log in to join events"));
            };
            let current = state.events.get(id).await.map_err(api_failure)?;
            if current.has_joined(&user_id) {
                shell.notify(Notice::info("You have already joined this event"));
                return Ok(());
            }
            let event = state.events.join(id).await.map_err(api_failure)?;
            shell.notify(Notice::success(format!(
                "Joined '{}' ({} attendees)",
                event.title,
                event.attendees()
            )));
            Ok(())
        }
        EventCommands::Mine => {
            let events = state.events.mine().await.map_err(api_failure)?;
            if events.is_empty() {
                println!("You haven't created any events yet.");
            }
            for event in &events {
                print_event_line(event, user_id.as_deref());
            }
            Ok(())
        }
    }
}

fn draft_from_fields(fields: &EventFields) -> EventDraft {
    EventDraft {
        title: fields.title.clone(),
        organizer: fields.organizer.clone(),
        date: fields.date.clone(),
        time: fields.time.clone(),
        location: fields.location.clone(),
        description: fields.description.clone(),
    }
}

fn apply_update(mut draft: EventDraft, update: &EventUpdate) -> EventDraft {
    let slots = [
        (&mut draft.title, &update.title),
        (&mut draft.organizer, &update.organizer),
        (&mut draft.date, &update.date),
        (&mut draft.time, &update.time),
        (&mut draft.location, &update.location),
        (&mut draft.description, &update.description),
    ];
    for (slot, value) in slots {
        if let Some(value) = value {
            *slot = value.clone();
        }
    }
    draft
}

fn print_event_line(event: &Event, user_id: Option<&str>) {
    let joined = user_id.is_some_and(|id| event.has_joined(id));
    let marker = if joined { "joined".green().to_string() } else { String::new() };
    println!(
        "{}  {} {}  {}  {} attendees  {}",
        event.id.dimmed(),
        event.date.get(..10).unwrap_or(&event.date),
        event.time,
        event.title.bold(),
        event.attendees(),
        marker
    );
}

fn print_event_details(event: &Event, user_id: Option<&str>) {
    println!("{}", event.title.bold());
    println!("  organizer: {}", event.organizer);
    println!(
        "  when:      {} {}",
        event.date.get(..10).unwrap_or(&event.date),
        event.time
    );
    println!("  where:     {}", event.location);
    println!("  attendees: {}", event.attendees());
    if let Some(id) = user_id {
        if event.is_created_by(id) {
            println!("  {}", "You created this event".cyan());
        } else if event.has_joined(id) {
            println!("  {}", "You have joined this event".green());
        }
    }
    println!();
    println!("{}", event.description);
}

fn print_pager(pager: &Pagination) {
    if !pager.is_needed() {
        return;
    }
    let slots: Vec<String> = pager
        .items()
        .into_iter()
        .map(|item| match item {
            PageItem::Page(n) if n == pager.current_page => format!("[{}]", n).bold().to_string(),
            PageItem::Page(n) => n.to_string(),
            PageItem::Ellipsis => "...".to_string(),
        })
        .collect();
    println!();
    println!("{}", pager.summary().dimmed());
    println!(
        "{} {} {}",
        if pager.has_previous() { "<" } else { " " },
        slots.join(" "),
        if pager.has_next() { ">" } else { " " }
    );
}

// Notices were already shown by the session layer
fn session_failure(error: SessionError) -> anyhow::Error {
    anyhow!(error.message())
}

fn api_failure(error: ApiError) -> anyhow::Error {
    match error {
        ApiError::SessionExpired => anyhow!("Session expired"),
        ApiError::Network(detail) => {
            anyhow!("{} ({}). Check the server and retry.", NETWORK_ERROR_MSG, detail)
        }
        other => anyhow!(other.message()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_apply_update_only_touches_given_fields() {
        let draft = EventDraft {
            title: "Old".into(),
            organizer: "Org".into(),
            date: "2026-10-19".into(),
            time: "10:00".into(),
            location: "Here".into(),
            description: "Desc".into(),
        };
        let update = EventUpdate {
            title: Some("New".into()),
            time: Some("11:30".into()),
            ..EventUpdate::default()
        };

        let updated = apply_update(draft.clone(), &update);

        assert_eq!(updated.title, "New");
        assert_eq!(updated.time, "11:30");
        assert_eq!(updated.location, draft.location);
        assert_eq!(updated.date, draft.date);
    }
}
