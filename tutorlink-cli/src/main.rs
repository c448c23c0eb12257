//! tutorlink-cli — operator CLI for the Tutorlink dispatch engine
//!
//! Talks to the dispatch server's HTTP API. Meant for operators and local
//! development, not for end users.
//!
//! # Subcommands
//! - `request <student_id> <subject_id>`     — create a pending help request
//! - `claim <session_id> <tutor_id>`         — claim a pending request
//! - `cancel <session_id> <actor_id>`        — cancel as a participant
//! - `join <session_id> <role>`              — record a join (student|tutor)
//! - `start <session_id>`                    — mark the session in progress
//! - `complete <session_id>`                 — mark the session completed
//! - `show <session_id>`                     — session detail with profiles
//! - `pending [--subject <id>]`              — the claimable queue
//! - `history <participant_id>`              — everything a user took part in
//! - `status`                                — server health

use clap::{Parser, Subcommand};
use serde::Deserialize;
use uuid::Uuid;

const DEFAULT_SERVER: &str = "http://127.0.0.1:8780";

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "tutorlink-cli",
    version,
    about = "Tutorlink instant session dispatch — operator CLI"
)]
struct Cli {
    /// Dispatch server URL (overrides TUTORLINK_HTTP_URL env var)
    #[arg(long, env = "TUTORLINK_HTTP_URL", default_value = DEFAULT_SERVER)]
    server: String,

    /// Print raw JSON responses instead of the human-readable form
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create a pending help request for a student
    Request {
        student_id: Uuid,
        subject_id: Uuid,
    },

    /// Claim a pending request for a tutor
    Claim {
        session_id: Uuid,
        tutor_id: Uuid,
    },

    /// Cancel a session as one of its participants
    Cancel {
        session_id: Uuid,
        actor_id: Uuid,

        /// Optional free-text reason
        #[arg(long)]
        reason: Option<String>,
    },

    /// Record that a participant joined the meeting
    Join {
        session_id: Uuid,

        /// "student" or "tutor"
        role: String,
    },

    /// Mark an accepted session as in progress
    Start { session_id: Uuid },

    /// Mark a session as completed
    Complete { session_id: Uuid },

    /// Show one session, rendered with profile and subject lookups
    Show { session_id: Uuid },

    /// List the claimable queue, oldest first
    Pending {
        /// Restrict to one subject
        #[arg(long)]
        subject: Option<Uuid>,
    },

    /// List every session a user took part in, newest first
    History { participant_id: Uuid },

    /// Show dispatch server status
    Status,
}

// ============================================================================
// API Response Types
// ============================================================================

/// The session shape returned by every mutating endpoint.
#[derive(Debug, Deserialize)]
struct SessionView {
    id: Uuid,
    student_id: Uuid,
    tutor_id: Option<Uuid>,
    subject_id: Uuid,
    status: String,
    duration_minutes: i32,
    meeting_url: Option<String>,
    requested_at: String,
}

#[derive(Debug, Deserialize)]
struct SessionEnvelope {
    session: SessionView,
}

#[derive(Debug, Deserialize)]
struct SessionListEnvelope {
    sessions: Vec<SessionView>,
    count: usize,
}

// ============================================================================
// HTTP helpers
// ============================================================================

fn client() -> anyhow::Result<reqwest::blocking::Client> {
    Ok(reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?)
}

/// Send a request, exiting with the server's error message on failure.
/// Returns the raw JSON body on success.
fn send(req: reqwest::blocking::RequestBuilder) -> serde_json::Value {
    let resp = match req.send() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("tutorlink-cli: connection failed: {}", e);
            std::process::exit(1);
        }
    };

    let status = resp.status();
    let body: serde_json::Value = resp.json().unwrap_or_default();

    if !status.is_success() {
        let message = body["error"].as_str().unwrap_or("unknown error");
        eprintln!("tutorlink-cli: server returned {}: {}", status, message);
        std::process::exit(1);
    }

    body
}

fn print_session(s: &SessionView) {
    println!("Session:   {}", s.id);
    println!("Status:    {}", s.status);
    println!("Student:   {}", s.student_id);
    match s.tutor_id {
        Some(tutor) => println!("Tutor:     {}", tutor),
        None => println!("Tutor:     (unclaimed)"),
    }
    println!("Subject:   {}", s.subject_id);
    println!("Length:    {} min", s.duration_minutes);
    if let Some(url) = &s.meeting_url {
        println!("Meeting:   {}", url);
    }
    println!("Requested: {}", s.requested_at);
}

fn print_session_body(body: serde_json::Value, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }
    let envelope: SessionEnvelope = serde_json::from_value(body)?;
    print_session(&envelope.session);
    Ok(())
}

fn print_session_list(body: serde_json::Value, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }
    let envelope: SessionListEnvelope = serde_json::from_value(body)?;
    if envelope.sessions.is_empty() {
        println!("No sessions.");
        return Ok(());
    }
    for s in &envelope.sessions {
        let tutor = s
            .tutor_id
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}  {:<11}  student={}  tutor={}  subject={}",
            s.id, s.status, s.student_id, tutor, s.subject_id
        );
    }
    println!("({} total)", envelope.count);
    Ok(())
}

// ============================================================================
// Commands
// ============================================================================

fn do_status(server: &str, json: bool) -> anyhow::Result<()> {
    let body = send(client()?.get(format!("{}/health", server)));
    if json {
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }
    println!(
        "Tutorlink server: {}",
        body["status"].as_str().unwrap_or("unknown")
    );
    println!("Version:    {}", body["version"].as_str().unwrap_or("?"));
    println!("PostgreSQL: {}", body["postgresql"].as_str().unwrap_or("?"));
    println!("Socket:     {}", body["socket"].as_str().unwrap_or("?"));
    Ok(())
}

fn do_show(server: &str, session_id: Uuid, json: bool) -> anyhow::Result<()> {
    let body = send(client()?.get(format!("{}/sessions/{}", server, session_id)));
    if json {
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    let session: SessionView = serde_json::from_value(body["session"].clone())?;
    print_session(&session);
    if let Some(name) = body["student"]["displayName"].as_str() {
        println!("Student name: {}", name);
    }
    if let Some(name) = body["tutor"]["displayName"].as_str() {
        println!("Tutor name:   {}", name);
    }
    if let Some(name) = body["subject"]["name"].as_str() {
        println!("Subject name: {}", name);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let server = cli.server.trim_end_matches('/').to_string();
    let json = cli.json;

    match cli.command {
        Commands::Request {
            student_id,
            subject_id,
        } => {
            let body = send(
                client()?
                    .post(format!("{}/sessions", server))
                    .json(&serde_json::json!({
                        "studentId": student_id,
                        "subjectId": subject_id,
                    })),
            );
            print_session_body(body, json)
        }

        Commands::Claim {
            session_id,
            tutor_id,
        } => {
            let body = send(
                client()?
                    .post(format!("{}/sessions/{}/claim", server, session_id))
                    .json(&serde_json::json!({ "tutorId": tutor_id })),
            );
            print_session_body(body, json)
        }

        Commands::Cancel {
            session_id,
            actor_id,
            reason,
        } => {
            let body = send(
                client()?
                    .post(format!("{}/sessions/{}/cancel", server, session_id))
                    .json(&serde_json::json!({
                        "actorId": actor_id,
                        "reason": reason,
                    })),
            );
            print_session_body(body, json)
        }

        Commands::Join { session_id, role } => {
            let body = send(
                client()?
                    .post(format!("{}/sessions/{}/join", server, session_id))
                    .json(&serde_json::json!({ "role": role })),
            );
            print_session_body(body, json)
        }

        Commands::Start { session_id } => {
            let body = send(client()?.post(format!("{}/sessions/{}/start", server, session_id)));
            print_session_body(body, json)
        }

        Commands::Complete { session_id } => {
            let body = send(client()?.post(format!(
                "{}/sessions/{}/complete",
                server, session_id
            )));
            print_session_body(body, json)
        }

        Commands::Show { session_id } => do_show(&server, session_id, json),

        Commands::Pending { subject } => {
            let mut url = format!("{}/sessions/pending", server);
            if let Some(subject) = subject {
                url = format!("{}?subjectId={}", url, subject);
            }
            let body = send(client()?.get(url));
            print_session_list(body, json)
        }

        Commands::History { participant_id } => {
            let body = send(client()?.get(format!("{}/history/{}", server, participant_id)));
            print_session_list(body, json)
        }

        Commands::Status => do_status(&server, json),
    }
}

// ============================================================================
// Tests
// ============================================================================
