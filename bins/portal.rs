//! `portal`: command-line client for the campus event portal.
//!
//! Terminal stand-in for the browser frontend: "navigation" means printing
//! the destination page, and external handoffs print the URL to open.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use client::backend::{HttpBackend, PortalBackend};
use client::faculty::FacultyApi;
use client::login::{LoginFlow, LoginPolicy};
use client::student::{submission_lines, StudentApi};
use client::workflow::{ConsentGate, FormOutcome, RecoveryOutcome, RegistrationWorkflow};
use client::{Fetched, Gateway};
use models::{Destination, EventDraft, FormData, RegistrationLink, RegistrationStatus};
use session::{JsonSessionStore, SessionStore};

#[derive(Debug, Parser)]
#[command(name = "portal", version, about = "Campus event portal client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sign in and replay any pending registration intent.
    Login {
        email: String,
        password: String,
    },
    /// Register for an event; the link is an URL or "club_form_link".
    Register {
        event_id: i64,
        link: String,
    },
    /// Replay a registration intent saved before login.
    Recover,
    /// Submit the internal club form as `name=value` pairs.
    SubmitForm {
        #[arg(required = true, value_name = "NAME=VALUE")]
        fields: Vec<String>,
    },
    /// List the signed-in user's registrations.
    MyRegistrations,
    /// Clear the stored session.
    Logout,
    /// Faculty dashboard operations.
    Faculty {
        #[command(subcommand)]
        command: FacultyCommands,
    },
}

#[derive(Debug, Subcommand)]
enum FacultyCommands {
    /// List the club's events.
    Events,
    AddEvent(EventArgs),
    UpdateEvent {
        event_id: i64,
        #[command(flatten)]
        event: EventArgs,
    },
    DeleteEvent {
        event_id: i64,
    },
    /// Look an event up by name.
    FindEvent {
        event_name: String,
    },
    /// List submissions for the club.
    Submissions,
    Approve {
        reg_id: i64,
    },
    Reject {
        reg_id: i64,
    },
}

#[derive(Debug, Args)]
struct EventArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long)]
    venue: Option<String>,
    /// Event date, YYYY-MM-DD.
    #[arg(long)]
    date: Option<chrono::NaiveDate>,
    /// Event time, HH:MM:SS.
    #[arg(long)]
    time: Option<chrono::NaiveTime>,
    /// Registration deadline, YYYY-MM-DD.
    #[arg(long)]
    deadline: Option<chrono::NaiveDate>,
    /// Registration link; empty means the internal club form.
    #[arg(long, default_value = "")]
    link: String,
}

impl EventArgs {
    fn into_draft(self) -> EventDraft {
        EventDraft {
            club_id: String::new(), // filled in from the session
            event_name: self.name,
            description: self.description,
            venue_id: self.venue,
            event_date: self.date,
            event_time: self.time,
            deadline: self.deadline,
            registration_form_link: self.link,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_add_event_dates_and_times() {
        let cli = Cli::try_parse_from([
            "portal",
            "faculty",
            "add-event",
            "--name",
            "Robotics Demo",
            "--date",
            "2026-09-01",
            "--time",
            "10:30:00",
            "--deadline",
            "2026-08-20",
        ])
        .unwrap();
        let Commands::Faculty { command: FacultyCommands::AddEvent(args) } = cli.command else {
            panic!("expected add-event");
        };
        let draft = args.into_draft();
        assert_eq!(draft.event_name, "Robotics Demo");
        assert_eq!(draft.event_date, Some("2026-09-01".parse().unwrap()));
        assert_eq!(draft.event_time, Some("10:30:00".parse().unwrap()));
        assert_eq!(draft.deadline, Some("2026-08-20".parse().unwrap()));
        assert_eq!(draft.registration_form_link, "");
    }

    #[test]
    fn rejects_malformed_event_date() {
        let res = Cli::try_parse_from([
            "portal", "faculty", "add-event", "--name", "X", "--date", "tomorrow",
        ]);
        assert!(res.is_err());
    }
}

/// Blocking stdin consent prompt, mirroring the browser confirm dialog.
struct StdinGate;

impl ConsentGate for StdinGate {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{prompt} ");
        let _ = io::stdout().flush();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        answer.trim().eq_ignore_ascii_case("confirm")
    }
}

fn go(destination: Destination) {
    println!("-> {}", destination.page());
}

fn report_recovery(outcome: &RecoveryOutcome) {
    match outcome {
        RecoveryOutcome::DidNotAct => println!("nothing to recover"),
        RecoveryOutcome::RedirectToLogin => {
            println!("please login to register");
            go(Destination::Login);
        }
        RecoveryOutcome::Declined => println!("registration cancelled"),
        RecoveryOutcome::InternalForm { reg_id } => {
            println!("registration #{reg_id} created; fill in the club form");
            go(Destination::ClubForm);
        }
        RecoveryOutcome::ExternalHandoff { link } => {
            println!("registered; open the external form: {link}");
            go(Destination::StudentDashboard);
        }
        RecoveryOutcome::SessionExpired => {
            println!("session expired or unauthorized access");
            go(Destination::Login);
        }
    }
}

fn expired() {
    println!("session expired or unauthorized access");
    go(Destination::Login);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    common::utils::logging::init_logging_default();

    let cli = Cli::parse();
    let cfg = configs::AppConfig::load_and_validate()?;
    common::env::ensure_env(&cfg.session.path).await?;
    debug!(base_url = %cfg.api.base_url, "configuration loaded");

    let store: Arc<dyn SessionStore> = Arc::new(
        JsonSessionStore::open(&cfg.session.path)
            .await
            .with_context(|| format!("cannot open session file {}", cfg.session.path))?,
    );
    let gateway = Gateway::new(&cfg.api.base_url, Duration::from_secs(cfg.api.timeout_secs))?;
    let backend: Arc<dyn PortalBackend> = Arc::new(HttpBackend::new(gateway));
    let workflow =
        RegistrationWorkflow::new(store.clone(), backend.clone(), Arc::new(StdinGate));

    match cli.command {
        Commands::Login { email, password } => {
            let policy = LoginPolicy::new(cfg.auth.allowed_email_domains.clone());
            let flow = LoginFlow::new(store.clone(), backend.clone(), policy);
            match flow.login(&email, &password, &workflow).await {
                Ok(outcome) => {
                    println!("welcome, {}", outcome.auth.first_name);
                    if outcome.recovery.acted() {
                        report_recovery(&outcome.recovery);
                    } else {
                        go(outcome.destination);
                    }
                }
                Err(e) => println!("Login failed: {e}"),
            }
        }
        Commands::Register { event_id, link } => {
            let link = RegistrationLink::parse(&link);
            let outcome = workflow.handle_register_click(event_id, &link).await?;
            report_recovery(&outcome);
        }
        Commands::Recover => {
            let outcome = workflow.recover().await?;
            report_recovery(&outcome);
        }
        Commands::SubmitForm { fields } => {
            let form: FormData = fields
                .iter()
                .map(|raw| match raw.split_once('=') {
                    Some((name, value)) => Ok((name.to_string(), value.to_string())),
                    None => Err(anyhow::anyhow!("field '{raw}' is not NAME=VALUE")),
                })
                .collect::<anyhow::Result<Vec<_>>>()?
                .into_iter()
                .collect();
            match workflow.submit_form(&form).await? {
                FormOutcome::Submitted => {
                    println!("Registration successful!");
                    go(Destination::StudentDashboard);
                }
                FormOutcome::MissingRegistration => {
                    println!("Registration ID not found. Please try registering again.");
                    go(Destination::StudentDashboard);
                }
                FormOutcome::SessionExpired => expired(),
            }
        }
        Commands::MyRegistrations => {
            let students = StudentApi::new(store.clone(), backend.clone());
            match students.my_registrations().await? {
                Fetched::SessionExpired => expired(),
                Fetched::Ok(regs) if regs.is_empty() => println!("No registrations found."),
                Fetched::Ok(regs) => {
                    for reg in &regs {
                        let date = reg
                            .submission_date
                            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or_else(|| "N/A".into());
                        println!("Event #{}  {}  {}", reg.event_id, date, reg.status.as_str());
                        for line in submission_lines(reg) {
                            println!("    {line}");
                        }
                    }
                }
            }
        }
        Commands::Logout => {
            store.clear().await?;
            go(Destination::Login);
        }
        Commands::Faculty { command } => {
            let faculty = FacultyApi::new(store.clone(), backend.clone());
            match command {
                FacultyCommands::Events => match faculty.my_events().await? {
                    Fetched::SessionExpired => expired(),
                    Fetched::Ok(events) if events.is_empty() => {
                        println!("No events found for your club.")
                    }
                    Fetched::Ok(events) => {
                        for e in events {
                            println!(
                                "#{}  {}  date={}  deadline={}  link={}",
                                e.event_id,
                                e.event_name,
                                e.event_date.map(|d| d.to_string()).unwrap_or_else(|| "N/A".into()),
                                e.deadline.map(|d| d.to_string()).unwrap_or_else(|| "N/A".into()),
                                e.registration_form_link,
                            );
                        }
                    }
                },
                FacultyCommands::AddEvent(args) => {
                    match faculty.add_event(&args.into_draft()).await? {
                        Fetched::SessionExpired => expired(),
                        Fetched::Ok(()) => println!("Event added successfully!"),
                    }
                }
                FacultyCommands::UpdateEvent { event_id, event } => {
                    match faculty.update_event(event_id, &event.into_draft()).await? {
                        Fetched::SessionExpired => expired(),
                        Fetched::Ok(()) => println!("Event updated successfully!"),
                    }
                }
                FacultyCommands::DeleteEvent { event_id } => {
                    match faculty.delete_event(event_id).await? {
                        Fetched::SessionExpired => expired(),
                        Fetched::Ok(()) => println!("Event deleted successfully!"),
                    }
                }
                FacultyCommands::FindEvent { event_name } => {
                    match faculty.find_event(&event_name).await? {
                        Fetched::SessionExpired => expired(),
                        Fetched::Ok(e) => {
                            println!("#{}  {}", e.event_id, e.event_name);
                            if let Some(desc) = &e.description {
                                if !desc.is_empty() {
                                    println!("    {desc}");
                                }
                            }
                            println!("    link: {}", e.registration_form_link);
                        }
                    }
                }
                FacultyCommands::Submissions => match faculty.submissions().await? {
                    Fetched::SessionExpired => expired(),
                    Fetched::Ok(subs) if subs.is_empty() => println!("No submissions found."),
                    Fetched::Ok(subs) => {
                        for reg in &subs {
                            println!(
                                "reg #{}  user {}  event {}  {}",
                                reg.reg_id, reg.user_id, reg.event_id, reg.status.as_str()
                            );
                            for line in submission_lines(reg) {
                                println!("    {line}");
                            }
                        }
                    }
                },
                FacultyCommands::Approve { reg_id } => {
                    match faculty.set_status(reg_id, RegistrationStatus::Approved).await? {
                        Fetched::SessionExpired => expired(),
                        Fetched::Ok(()) => println!("Application APPROVED"),
                    }
                }
                FacultyCommands::Reject { reg_id } => {
                    match faculty.set_status(reg_id, RegistrationStatus::Rejected).await? {
                        Fetched::SessionExpired => expired(),
                        Fetched::Ok(()) => println!("Application REJECTED"),
                    }
                }
            }
        }
    }
    Ok(())
}
