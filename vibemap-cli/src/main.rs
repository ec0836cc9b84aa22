use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use vibemap_core::classify::{
    activity_label, category_icon, category_label, format_time_ago, format_wait_interval, format_wait_time,
    marker_kind, MarkerKind,
};
use vibemap_core::{
    aggregate_vibe, current_events, filter_venues, recommend, search_by_name, submit_comment, trending,
    venue_feed, ActivityLevel, AppEvent, CategoryFilter, CommentDraft, EventBus, LocationProvider, ReviewDesk,
    ReviewDraft, Session, Span, Venue, VenueFilter, Vibe, VibeError,
};
use vibemap_ingest::{builtin_catalog, load_catalog, Catalog};

mod config;
mod live;
mod location;
mod state;

use config::Config;
use location::CliLocation;
use state::FileStore;

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("VIBEMAP_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "vibemap", version, long_version = LONG_VERSION, about = "Find a place that matches your vibe")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List venues through the filter pipeline
    Venues {
        /// all | bar | restaurant | salon | coffee | club
        #[arg(long, default_value = "all")]
        category: CategoryFilter,

        /// Minimum capacity percentage (inclusive)
        #[arg(long, default_value_t = 0)]
        min: u8,

        /// Maximum capacity percentage (inclusive)
        #[arg(long, default_value_t = 100)]
        max: u8,

        /// Minimum vibe (0-5) for bars and clubs
        #[arg(long)]
        min_vibe: Option<f64>,

        /// Hide an activity level (repeatable)
        #[arg(long)]
        exclude: Vec<ActivityLevel>,
    },

    /// Case-insensitive name search
    Search { text: String },

    /// Busiest venues right now
    Trending {
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },

    /// Venue details, summary and comments
    Show { id: String },

    /// Describe what you want ("quiet coffee shop with wifi") and get picks
    Lucky {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    Review {
        #[command(subcommand)]
        command: ReviewCommand,
    },

    /// Post a live comment as the signed-in user
    Comment {
        id: String,
        text: String,

        /// Your vibe rating, 0-5 (legacy 1-10 values are converted)
        #[arg(long)]
        vibe: Option<f64>,

        /// Wait estimate in minutes, e.g. 10-20
        #[arg(long)]
        wait: Option<String>,
    },

    /// Watch a venue's live feed for a while
    Live {
        id: String,

        #[arg(long, default_value_t = 30)]
        seconds: u64,
    },

    /// City events with their live status
    Events,

    Account {
        #[command(subcommand)]
        command: AccountCommand,
    },

    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ReviewCommand {
    /// Submit a review; you must be at the venue unless you spend your one override
    Add {
        id: String,

        #[arg(long)]
        rating: u8,

        #[arg(long)]
        comment: String,

        /// Time spent at the venue
        #[arg(long)]
        minutes: u32,

        #[arg(long, requires = "lng")]
        lat: Option<f64>,

        #[arg(long, requires = "lat")]
        lng: Option<f64>,

        /// Confirm the one-time "not at venue" override
        #[arg(long)]
        allow_once: bool,
    },

    /// Reviews for a venue, newest first
    List { id: String },
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    Whoami,
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        password: String,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        password: String,
    },
    Logout,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write ~/.vibemap/config.toml with defaults
    Init,
}

/// Everything a command needs, resolved once per invocation.
struct App {
    cfg: Config,
    tz: Tz,
    catalog: Catalog,
    now: DateTime<Utc>,
}

impl App {
    fn load() -> Result<Self> {
        let cfg = config::load_config()?;
        let tz = cfg.timezone()?;
        let now = Utc::now();
        let catalog = match &cfg.display.catalog {
            Some(path) => load_catalog(path, now)?,
            None => builtin_catalog(now)?,
        };
        debug!(venues = catalog.venues.len(), tz = %tz, "app loaded");
        Ok(Self { cfg, tz, catalog, now })
    }

    fn local_now(&self) -> NaiveDateTime {
        self.now.with_timezone(&self.tz).naive_local()
    }

    fn venue(&self, id: &str) -> Result<&Venue> {
        self.catalog
            .venue(id)
            .ok_or_else(|| VibeError::VenueNotFound(id.to_string()).into())
    }

    fn session(&self) -> Result<Session<FileStore>> {
        Ok(Session::open(FileStore::open_default()?, self.now)?)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vibemap=info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let app = App::load()?;

    match cli.command {
        Command::Venues { category, min, max, min_vibe, exclude } => {
            let mut filter = VenueFilter::default().with_category(category).with_capacity(min, max);
            for level in exclude {
                filter = filter.excluding(level);
            }
            if let Some(v) = min_vibe {
                filter = filter.with_min_vibe(v);
            }
            let hits = filter_venues(&app.catalog.venues, &filter);
            print_venue_list(&hits, app.local_now());
            println!("\n{} of {} venues", hits.len(), app.catalog.venues.len());
        }

        Command::Search { text } => {
            let hits = search_by_name(&app.catalog.venues, &text);
            if hits.is_empty() {
                println!("No venues match {text:?}");
            } else {
                print_venue_list(&hits, app.local_now());
            }
        }

        Command::Trending { limit } => {
            print_venue_list(&trending(&app.catalog.venues, limit), app.local_now());
        }

        Command::Show { id } => {
            let session = app.session()?;
            show_venue(&app, &session, &id)?;
        }

        Command::Lucky { text } => {
            lucky(&app, &text.join(" "));
        }

        Command::Review { command } => {
            let mut session = app.session()?;
            match command {
                ReviewCommand::Add { id, rating, comment, minutes, lat, lng, allow_once } => {
                    let draft = ReviewDraft { rating, comment, time_spent_minutes: minutes };
                    add_review(&app, &mut session, &id, draft, CliLocation::resolve(lat, lng), allow_once)?;
                }
                ReviewCommand::List { id } => {
                    list_reviews(&app, &session, &id)?;
                }
            }
        }

        Command::Comment { id, text, vibe, wait } => {
            let mut session = app.session()?;
            let venue = app.venue(&id)?;
            let draft = CommentDraft {
                body: text,
                vibe: vibe.map(Vibe::from_raw),
                wait_range: wait.as_deref().map(parse_wait).transpose()?,
                images: Vec::new(),
            };

            let comment = submit_comment(&mut session, &venue.id, draft, app.now)?;
            let karma = session.user().map(|u| u.karma_label()).unwrap_or_default();
            println!("Posted to {} as {} ({karma})", venue.name, comment.author);
        }

        Command::Live { id, seconds } => {
            let session = app.session()?;
            watch_live(&app, &session, &id, seconds).await?;
        }

        Command::Events => {
            print_events(&app);
        }

        Command::Account { command } => {
            let mut session = app.session()?;
            account(&mut session, command, app.now)?;
        }

        Command::Config { command: ConfigCommand::Init } => {
            config::init_config()?;
        }
    }

    Ok(())
}

fn parse_wait(s: &str) -> Result<Span> {
    let (lo, hi) = s.split_once('-').unwrap_or((s, s));
    let lo: u32 = lo.trim().parse().with_context(|| format!("bad wait range {s:?}"))?;
    let hi: u32 = hi.trim().parse().with_context(|| format!("bad wait range {s:?}"))?;
    Ok(Span::new(lo, hi))
}

fn marker(venue: &Venue, vibe: Option<f64>) -> &'static str {
    match marker_kind(venue.category, vibe, venue.featured) {
        MarkerKind::Star => "★",
        MarkerKind::Fire => "🔥",
        MarkerKind::Dot => "•",
    }
}

fn vibe_text(vibe: Option<f64>) -> String {
    match vibe {
        Some(v) => format!("vibe {:.1}", Vibe::normalized(v).display()),
        None => "no vibe yet".to_string(),
    }
}

fn wait_text(venue: &Venue) -> Option<String> {
    venue
        .wait_interval
        .map(format_wait_interval)
        .or_else(|| venue.wait_time.map(format_wait_time))
}

fn print_venue_list(venues: &[&Venue], local_now: NaiveDateTime) {
    for v in venues {
        let vibe = aggregate_vibe(v);
        let open = match &v.opening_hours {
            Some(h) if h.is_open_at(local_now) => " open",
            Some(_) => " closed",
            None => "",
        };
        let mut line = format!(
            "{} [{:>2}] {} {} · {} · {}% {} · {}{}",
            marker(v, vibe),
            v.id,
            category_icon(v.category),
            v.name,
            category_label(v.category),
            v.capacity,
            activity_label(v.activity_level()),
            vibe_text(vibe),
            open,
        );
        if let Some(w) = wait_text(v) {
            line.push_str(&format!(" · wait {w}"));
        }
        println!("{line}");
    }
}

fn show_venue(app: &App, session: &Session<FileStore>, id: &str) -> Result<()> {
    let venue = app.venue(id)?;
    let vibe = aggregate_vibe(venue);

    println!("{} {} {}", marker(venue, vibe), category_icon(venue.category), venue.name);
    if !venue.address.is_empty() {
        println!("{}", venue.address);
    }
    println!(
        "{} · {}% full ({}) · {}",
        category_label(venue.category),
        venue.capacity,
        activity_label(venue.activity_level()),
        vibe_text(vibe)
    );
    if let Some(w) = wait_text(venue) {
        println!("Wait: {w}");
    }
    if let Some(c) = venue.crowd_range {
        println!("Crowd: {}-{} people", c.lo, c.hi);
    }
    if venue.special_event {
        println!("Special: {}", venue.special_event_description.as_deref().unwrap_or("special event tonight"));
    }
    if let Some(hours) = &venue.opening_hours {
        let today = app.local_now();
        match hours.get(today.weekday()) {
            Some(w) => println!(
                "Today: {}-{} ({})",
                w.open.format("%H:%M"),
                w.close.format("%H:%M"),
                if hours.is_open_at(today) { "open now" } else { "closed now" }
            ),
            None => println!("Today: closed"),
        }
    }
    if let Some(d) = &venue.description {
        println!("\n{d}");
    }

    let reviews = all_reviews(app, session, &venue.id)?;
    println!("\n{}", vibemap_core::venue_summary(venue, &reviews));

    let feed = venue_feed(session.store(), venue, app.cfg.live.feed_cap)?;
    if !feed.is_empty() {
        println!("\nLive comments:");
        for c in feed.snapshot().iter().rev() {
            print_comment(c, app.now);
        }
    }
    Ok(())
}

fn print_comment(c: &vibemap_core::LiveComment, now: DateTime<Utc>) {
    let mut meta = format!("{} · rep {:.1} · {}", c.author, c.reputation, format_time_ago(c.timestamp, now));
    if let Some(v) = c.vibe {
        meta.push_str(&format!(" · vibe {:.1}", v.display()));
    }
    if let Some(w) = c.wait_range {
        meta.push_str(&format!(" · wait {}", format_wait_interval(w)));
    }
    println!("  {meta}\n    {}", c.body);
}

fn lucky(app: &App, text: &str) {
    let outcome = recommend(text, &app.catalog.venues, app.local_now(), &app.cfg.match_config());
    if outcome.picks.is_empty() {
        println!("Tell me what you're in the mood for.");
        return;
    }
    if outcome.fallback {
        println!("Nothing matched {text:?} closely; here's what's popular:");
    } else {
        println!("Best matches for {text:?}:");
    }
    for (i, pick) in outcome.picks.iter().enumerate() {
        let v = pick.venue;
        println!(
            "{}. {} {} ({}, score {})",
            i + 1,
            category_icon(v.category),
            v.name,
            category_label(v.category),
            pick.score
        );
    }
    info!(query = text, picks = outcome.picks.len(), fallback = outcome.fallback, "recommendation served");
}

fn all_reviews(app: &App, session: &Session<FileStore>, id: &str) -> Result<Vec<vibemap_core::Review>> {
    let mut reviews = vibemap_core::reviews_for_venue(session.store(), id)?;
    reviews.extend(app.catalog.seed_reviews_for(id));
    reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(reviews)
}

fn list_reviews(app: &App, session: &Session<FileStore>, id: &str) -> Result<()> {
    let venue = app.venue(id)?;
    let reviews = all_reviews(app, session, &venue.id)?;
    if reviews.is_empty() {
        println!("No reviews for {} yet.", venue.name);
        return Ok(());
    }
    println!("{} reviews for {}:", reviews.len(), venue.name);
    for r in &reviews {
        let badge = if r.is_verified() { " ✓" } else { "" };
        println!(
            "  {}{} · {}/5 · rep {:.1} · {} · {} min\n    {}",
            r.author.user_name,
            badge,
            r.rating,
            r.author.reputation,
            format_time_ago(r.created_at, app.now),
            r.time_spent_minutes,
            r.comment
        );
    }
    Ok(())
}

fn add_review(
    app: &App,
    session: &mut Session<FileStore>,
    id: &str,
    draft: ReviewDraft,
    location: CliLocation,
    allow_once: bool,
) -> Result<()> {
    let venue = app.venue(id)?;
    let desk = ReviewDesk::new(app.cfg.review_policy());
    match desk.submit(session, venue, draft, location.current_position(), allow_once, app.now) {
        Ok(review) => {
            println!("Review saved for {} ({:?})", venue.name, review.verification);
            if let Some(user) = session.user() {
                println!("Reputation {:.1} · {}", user.reputation, user.karma_label());
            }
            Ok(())
        }
        Err(VibeError::OverrideAvailable) => {
            bail!(
                "you don't appear to be at {}. Re-run with --allow-once to post anyway (one time only)",
                venue.name
            )
        }
        Err(e) => Err(e.into()),
    }
}

async fn watch_live(app: &App, session: &Session<FileStore>, id: &str, seconds: u64) -> Result<()> {
    let venue = app.venue(id)?.clone();
    let feed = venue_feed(session.store(), &venue, app.cfg.live.feed_cap)?;

    let mut bus = EventBus::new();
    let rx = bus.subscribe();
    bus.publish(AppEvent::VenueSelected { venue_id: venue.id.clone() });

    println!("Watching {} for {seconds}s (Ctrl-C to stop)", venue.name);
    let handle = live::spawn_feed(venue, feed, app.cfg.feed_schedule(), bus);

    let printer = std::thread::spawn(move || {
        for event in rx {
            match event {
                AppEvent::CommentsUpdated { comments, .. } => {
                    if let Some(latest) = comments.last() {
                        print_comment(latest, Utc::now());
                    }
                }
                AppEvent::VenueSelected { venue_id } => debug!(venue = %venue_id, "view opened"),
                _ => {}
            }
        }
    });

    tokio::time::sleep(std::time::Duration::from_secs(seconds)).await;
    handle.abort();
    let _ = handle.await;
    printer.join().map_err(|_| anyhow!("live printer thread panicked"))?;
    Ok(())
}

fn print_events(app: &App) {
    let live = current_events(&app.catalog.events, app.now);
    println!("Live now: {}", live.len());
    for e in &app.catalog.events {
        let status = match e.status_at(app.now) {
            vibemap_core::EventStatus::Live => "LIVE".to_string(),
            vibemap_core::EventStatus::Upcoming => {
                format!("starts {}", e.start.with_timezone(&app.tz).format("%a %H:%M"))
            }
            vibemap_core::EventStatus::Ended => "ended".to_string(),
        };
        println!("  {} {} · {status}\n    {}", e.category.icon(), e.name, e.description);
    }
}

fn account(session: &mut Session<FileStore>, command: AccountCommand, now: DateTime<Utc>) -> Result<()> {
    match command {
        AccountCommand::Whoami => match session.user() {
            Some(u) => println!(
                "{} <{}> · reputation {:.1} · {} · {} reviews",
                u.name,
                u.email,
                u.reputation,
                u.karma_label(),
                u.total_reviews
            ),
            None => println!("Not signed in."),
        },
        AccountCommand::Signup { email, name, password } => {
            let u = session.signup(&email, &password, &name, now)?;
            println!("Welcome, {}!", u.name);
        }
        AccountCommand::Login { email, password } => {
            let u = session.login(&email, &password)?;
            println!("Signed in as {}", u.name);
        }
        AccountCommand::Logout => {
            session.logout()?;
            println!("Signed out.");
        }
    }
    Ok(())
}
