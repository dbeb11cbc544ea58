mod command;
mod render;

use std::sync::Arc;

use colored::*;
use common::config::AppConfig;
use common::logger::init_logging;
use services::AttendanceApp;
use services::anomaly_service::AnomalyService;
use services::auth::DbAuthProvider;
use services::router::Page;
use services::ui::UiSink;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use command::{Command, HELP};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{} {e}", "error:".red().bold());
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = AppConfig::global().clone();
    let _log_guard = init_logging(&cfg.log_file, &cfg.log_level, cfg.log_to_stdout);

    let db = db::connect().await?;
    db::migrate(&db).await?;
    let store = db::open_store(&db);
    let auth = Arc::new(DbAuthProvider::new(db));

    let (ui, mut effects) = UiSink::channel();
    let mut app = AttendanceApp::new(auth, store, AnomalyService::from_config(), ui, Page::Entry);
    let mut events = app.subscribe();

    tracing::info!(
        env = %cfg.env,
        store = %cfg.store_backend,
        anomaly_service = %cfg.anomaly_service_url,
        "client started"
    );
    println!(
        "{} ({} store, anomaly service at {})",
        cfg.project_name.bold(),
        cfg.store_backend,
        cfg.anomaly_service_url
    );
    println!("{}", "Type 'help' for commands.".dimmed());

    // Prints each effect as soon as it is emitted, mid-command included.
    let renderer = tokio::spawn(async move {
        while let Some(effect) = effects.recv().await {
            render::render(&effect);
        }
    });

    app.open(Page::Entry);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(cmd) => dispatch(&mut app, cmd).await,
                    Err(msg) if msg.is_empty() => {}
                    Err(msg) => println!("{}", msg.red()),
                }
            }
            event = events.recv() => match event {
                Ok(event) => app.on_auth_event(event).await,
                Err(RecvError::Lagged(n)) => tracing::warn!(skipped = n, "auth events dropped"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    drop(events);
    drop(app);
    renderer.await.ok();
    tracing::info!("client stopped");
    Ok(())
}

async fn dispatch(app: &mut AttendanceApp, cmd: Command) {
    match cmd {
        Command::SignUp {
            email,
            password,
            role,
        } => app.sign_up(&email, &password, role).await,
        Command::SignIn { email, password } => app.sign_in(&email, &password).await,
        Command::SignOut => app.sign_out().await,
        Command::Open(page) => app.open(page),
        Command::CreateSession(lecture) => {
            app.create_session(&lecture).await;
        }
        Command::Scan(raw) => {
            app.check_in(&raw).await;
        }
        Command::Anomalies(session_id) => app.detect_anomalies(session_id.as_deref()).await,
        Command::Records(session_id) => {
            let records = app.list_records(&session_id).await;
            if records.is_empty() {
                println!("{}", "No check-ins recorded.".dimmed());
            }
            for r in records {
                println!(
                    "  {} {} {} {}",
                    r.student_id.bold(),
                    r.student_name,
                    r.lecture.as_deref().unwrap_or("-"),
                    db::timestamp::format(&r.timestamp).dimmed()
                );
            }
        }
        Command::Probe => app.probe().await,
        Command::Health => app.health().await,
        Command::Status => println!(
            "{} on {}",
            app.context().login_status(),
            app.page().to_string().bold()
        ),
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
}
