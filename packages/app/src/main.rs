#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident map client application.
//!
//! Wires the pieces together the way the map page did: restore the
//! stored preferences and admin session, load the boundary, render the
//! initial incident list, then hand control to the real-time client,
//! which re-refreshes the views on every push event until the channel
//! closes.

use std::path::PathBuf;
use std::sync::{Arc, Mutex as StdMutex};

use clap::Parser;
use incident_map_boundary::BoundaryGate;
use incident_map_client::ApiClient;
use incident_map_prefs::PrefsStore;
use incident_map_realtime::RealtimeClient;
use incident_map_session::{
    AdminSession, EXPIRY_CHECK_INTERVAL_SECS, ExpiryCheck, now_ms,
};
use incident_map_ui::ThemeState;
use incident_map_view::form::{self, ReportForm};
use incident_map_view::table::IncidentTable;
use incident_map_view::{MapView, Refresh as _};
use tokio::sync::Mutex;

/// Client for the municipal incident-reporting map.
#[derive(Debug, Parser)]
#[command(name = "incident_map", version)]
struct Args {
    /// Base URL of the incident API server.
    #[arg(long, default_value = "http://localhost:5000")]
    api_url: String,

    /// URL of the real-time push channel.
    #[arg(long, default_value = "ws://localhost:8001/ws")]
    ws_url: String,

    /// URL of the boundary GeoJSON document.
    #[arg(long, default_value = "http://localhost:5000/static/data/canmore_boundary.geojson")]
    boundary_url: String,

    /// Path of the local preference file.
    #[arg(long, default_value = "data/prefs.json")]
    prefs: PathBuf,

    /// URL of the dark stylesheet recorded by the theme state.
    #[arg(long, default_value = "/static/css/dark.css")]
    dark_css: String,

    /// Prompt for the admin password at startup.
    #[arg(long)]
    admin: bool,

    /// Toggle dark mode on or off before starting, persisting the
    /// preference locally and server-side.
    #[arg(long, value_name = "BOOL")]
    set_dark: Option<bool>,

    /// Report an incident at --lat/--lng before entering the update
    /// loop. Prompts for subject, detail, and comment.
    #[arg(long, requires = "lat", requires = "lng")]
    report: bool,

    /// Latitude of the report location.
    #[arg(long)]
    lat: Option<f64>,

    /// Longitude of the report location.
    #[arg(long)]
    lng: Option<f64>,
}

/// Session state shared with the periodic expiry check.
struct SessionCtx {
    prefs: PrefsStore,
    session: AdminSession,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let args = Args::parse();

    let mut prefs = PrefsStore::open(&args.prefs);
    let mut session = AdminSession::restore(&mut prefs, now_ms());

    if args.admin && !session.is_admin() {
        let password = dialoguer::Password::new()
            .with_prompt("Mot de passe administrateur")
            .interact()?;
        if session.login(&mut prefs, &password, now_ms()) {
            println!("Mode administrateur activé pour 10 minutes.");
        } else {
            println!("Mot de passe incorrect.");
        }
    }
    if let Some(countdown) = session.format_remaining(now_ms()) {
        log::info!("Admin session active, {countdown} remaining");
    }

    let api = Arc::new(ApiClient::new(&args.api_url));

    let mut theme = ThemeState::restore(&args.dark_css, &prefs);
    if let Some(dark) = args.set_dark {
        theme.set_dark(dark, &mut prefs, api.as_ref()).await;
    }
    log::info!(
        "Theme: {}",
        if theme.is_dark() { "dark" } else { "light" }
    );

    let mut gate = BoundaryGate::new();
    match api.fetch_text(&args.boundary_url).await {
        Ok(geojson) => gate.install(&geojson),
        Err(e) => log::error!("Failed to fetch boundary: {e}"),
    }

    let mut map = MapView::new(api.clone());
    map.set_admin(session.is_admin());
    if let Err(e) = map.refresh().await {
        log::error!("Initial incident fetch failed: {e}");
    }

    if let (true, Some(lat), Some(lng)) = (args.report, args.lat, args.lng) {
        report_flow(api.clone(), &gate, &mut map, lat, lng).await?;
    }

    let map = Arc::new(Mutex::new(map));

    let table = Arc::new(Mutex::new(IncidentTable::new(api.clone())));

    let ctx = Arc::new(StdMutex::new(SessionCtx { prefs, session }));
    spawn_expiry_check(ctx.clone(), map.clone());

    let mut realtime = RealtimeClient::new(&args.ws_url);
    realtime.subscribe(map.clone());
    realtime.subscribe(table.clone());
    realtime.on_notice(|notice| println!("{}", notice.text()));

    realtime.run().await?;
    Ok(())
}

/// Interactive report flow: boundary check, cascading subject/detail
/// prompts, comment, submit. An out-of-bounds location gets the same
/// notice the map popup showed instead of a form.
async fn report_flow(
    api: Arc<ApiClient>,
    gate: &BoundaryGate,
    map: &mut MapView,
    lat: f64,
    lng: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    if !gate.is_inside(lng, lat) {
        println!("Vous ne pouvez signaler un incident qu'à l'intérieur de Canmore.");
        return Ok(());
    }

    let mut form = ReportForm::open(api, lat, lng).await?;

    let subjects: Vec<String> = form.subjects().iter().map(ToString::to_string).collect();
    let subject_idx = dialoguer::Select::new()
        .with_prompt("Sujet")
        .items(&subjects)
        .interact()?;
    form.select_subject(subject_idx);

    let details: Vec<String> = form.details().iter().map(ToString::to_string).collect();
    let detail_idx = dialoguer::Select::new()
        .with_prompt("Détail")
        .items(&details)
        .interact()?;
    form.select_detail(detail_idx);

    let comment: String = dialoguer::Input::new()
        .with_prompt("Commentaires")
        .allow_empty(true)
        .interact_text()?;
    println!("{}", form::word_count_text(&comment));

    match form.submit(map, &comment, chrono::Utc::now()).await {
        Ok(_) => println!("Incident signalé."),
        Err(e) => println!("{e}"),
    }
    Ok(())
}

/// Runs the 60-second admin expiry check. On expiry the map drops its
/// admin controls and re-renders — the headless analog of the page
/// reload the browser client performed.
fn spawn_expiry_check(ctx: Arc<StdMutex<SessionCtx>>, map: Arc<Mutex<MapView>>) {
    tokio::spawn(async move {
        let mut tick =
            tokio::time::interval(std::time::Duration::from_secs(EXPIRY_CHECK_INTERVAL_SECS));
        tick.tick().await; // first tick fires immediately
        loop {
            tick.tick().await;
            let check = {
                let mut ctx = ctx.lock().expect("session context poisoned");
                let SessionCtx { prefs, session } = &mut *ctx;
                let check = session.check_expiry(prefs, now_ms());
                if check == ExpiryCheck::Active
                    && let Some(countdown) = session.format_remaining(now_ms())
                {
                    log::info!("Admin session: {countdown} remaining");
                }
                check
            };
            if check == ExpiryCheck::Expired {
                println!("Session administrateur expirée.");
                let mut map = map.lock().await;
                map.set_admin(false);
                if let Err(e) = map.refresh().await {
                    log::error!("Refresh after session expiry failed: {e}");
                }
            }
        }
    });
}
