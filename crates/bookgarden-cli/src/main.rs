use std::time::Instant;

use anyhow::Result;
use chrono::{Datelike, Utc};
use clap::{Parser, Subcommand};

use bookgarden_core::{
    AppConfig, BookPlant, ExitCode, Garden, GardenError, GrowthStage, PreferenceStore,
    TomlPreferences,
};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "bookgarden",
    about = "Grow a garden by reading books",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format (for scripts).
    /// Also enabled by setting BOOKGARDEN_JSON=1.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Plant a new book — it becomes the one currently growing.
    Plant {
        title: String,
        #[arg(long)]
        pages: u32,
        #[arg(long, default_value = "")]
        author: String,
        #[arg(long)]
        cover: Option<String>,
    },

    /// Water the growing plant: move the bookmark to PAGE.
    Water { page: u32 },

    /// Harvest the growing plant, finishing the book early.
    Harvest,

    /// Show the plant currently in the pot.
    Status,

    /// Show the garden of harvested books.
    Garden {
        #[arg(long, default_value = "50")]
        limit: usize,
    },

    /// Yearly reading goal.
    Goal {
        #[command(subcommand)]
        action: GoalAction,
    },

    /// Show garden statistics.
    Stats,

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run diagnostics.
    Doctor,

    /// Show version information.
    Version,
}

#[derive(Subcommand)]
enum GoalAction {
    /// Show the yearly goal.
    Get,
    /// Set the yearly goal (1-100 books).
    Set { goal: u32 },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show all config values.
    List,
    /// Get a specific config key.
    Get { key: String },
}

// ─── Main ────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();

    // ── Env var overrides ──────────────────────────────────────────────────
    let json_output = cli.json || std::env::var("BOOKGARDEN_JSON").as_deref() == Ok("1");

    let mut config = AppConfig::load()?;
    if let Ok(garden_path) = std::env::var("BOOKGARDEN_GARDEN_PATH") {
        config.set_garden_path(garden_path.into());
    }

    match cli.command {
        // ── Plant ──────────────────────────────────────────────────────────

        Commands::Plant { title, pages, author, cover } => {
            let title = title.trim().to_string();
            if title.is_empty() {
                eprintln!("Title must not be empty.");
                std::process::exit(ExitCode::InvalidArgs as i32);
            }
            if pages == 0 {
                eprintln!("Total pages must be positive.");
                std::process::exit(ExitCode::InvalidArgs as i32);
            }

            let garden = open_garden(&config)?;
            let mut plant = BookPlant::new(title, pages);
            plant.author = author;
            plant.cover_url = cover;

            match garden.plant(&plant) {
                Ok(()) => {}
                Err(GardenError::AlreadyGrowing(current)) => {
                    eprintln!("'{current}' is still growing. Harvest it before planting another.");
                    std::process::exit(ExitCode::Conflict as i32);
                }
                Err(e) => return Err(e.into()),
            }
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":plant,"meta":{"duration_ms":dur}}))?;
            } else {
                println!("Planted: {} ({} pages)", plant.title, plant.total_pages);
            }
        }

        // ── Water ──────────────────────────────────────────────────────────

        Commands::Water { page } => {
            let garden = open_garden(&config)?;
            let current = match garden.current_plant()? {
                Some(plant) => plant,
                None => {
                    eprintln!("No book is growing. Plant one with `bookgarden plant`.");
                    std::process::exit(ExitCode::NotFound as i32);
                }
            };

            // Watering only moves the bookmark forward; the model itself
            // clamps, the strictness lives at this submission boundary.
            if page <= current.current_page {
                eprintln!(
                    "New page must be greater than the current page ({}).",
                    current.current_page
                );
                std::process::exit(ExitCode::InvalidArgs as i32);
            }
            if page > current.total_pages {
                eprintln!("Page exceeds total pages ({}).", current.total_pages);
                std::process::exit(ExitCode::InvalidArgs as i32);
            }

            let plant = garden.water(i64::from(page))?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": {
                        "plant": &plant,
                        "progress_percent": plant.progress_percent(),
                        "stage": plant.growth_stage(),
                        "harvested": plant.harvested_at.is_some(),
                    },
                    "meta": { "duration_ms": dur }
                }))?;
            } else if plant.is_completed() {
                println!("{} You finished '{}' — it joins the garden!", GrowthStage::Mature.glyph(), plant.title);
            } else {
                println!(
                    "{} {}  {}%  page {}/{}",
                    stage_glyph(&config, plant.growth_stage()),
                    render_bar(&config, plant.progress_percent()),
                    plant.progress_percent(),
                    plant.current_page,
                    plant.total_pages,
                );
            }
        }

        // ── Harvest ────────────────────────────────────────────────────────

        Commands::Harvest => {
            let garden = open_garden(&config)?;
            let plant = match garden.harvest() {
                Ok(plant) => plant,
                Err(GardenError::NoGrowingPlant) => {
                    eprintln!("No book is growing.");
                    std::process::exit(ExitCode::NotFound as i32);
                }
                Err(e) => return Err(e.into()),
            };
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":plant,"meta":{"duration_ms":dur}}))?;
            } else {
                println!("Harvested: {}", plant.title);
            }
        }

        // ── Status ─────────────────────────────────────────────────────────

        Commands::Status => {
            let garden = open_garden(&config)?;
            let dur = start.elapsed().as_millis();

            match garden.current_plant()? {
                Some(plant) => {
                    if json_output {
                        print_json(&serde_json::json!({
                            "status": "ok",
                            "data": {
                                "plant": &plant,
                                "progress_percent": plant.progress_percent(),
                                "stage": plant.growth_stage(),
                                "pages_remaining": plant.pages_remaining(),
                            },
                            "meta": { "duration_ms": dur }
                        }))?;
                    } else {
                        let stage = plant.growth_stage();
                        println!("{} {}", stage_glyph(&config, stage), plant.title);
                        if !plant.author.is_empty() {
                            println!("   by {}", plant.author);
                        }
                        println!(
                            "   {}  {}%  ({} pages left, stage: {stage})",
                            render_bar(&config, plant.progress_percent()),
                            plant.progress_percent(),
                            plant.pages_remaining(),
                        );
                    }
                }
                None => {
                    if json_output {
                        print_json(&serde_json::json!({
                            "status": "ok",
                            "data": { "plant": null, "stage": GrowthStage::Empty },
                            "meta": { "duration_ms": dur }
                        }))?;
                    } else {
                        println!(
                            "{} The pot is empty. Plant a book with `bookgarden plant`.",
                            stage_glyph(&config, GrowthStage::Empty)
                        );
                    }
                }
            }
        }

        // ── Garden ─────────────────────────────────────────────────────────

        Commands::Garden { limit } => {
            let garden = open_garden(&config)?;
            let prefs = TomlPreferences::open(config.preferences_path());
            let harvested = garden.list_harvested(limit)?;
            let this_year = garden.stats(Utc::now().year())?.harvested_this_year;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": {
                        "items": harvested,
                        "harvested_this_year": this_year,
                        "yearly_goal": prefs.yearly_goal(),
                    },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                println!("Harvested {this_year} of {} books this year.", prefs.yearly_goal());
                if harvested.is_empty() {
                    println!("The garden is empty — finish a book to grow it.");
                } else {
                    for plant in &harvested {
                        let date = plant
                            .harvested_at
                            .map(|d| d.format("%b %d, %Y").to_string())
                            .unwrap_or_default();
                        println!(
                            "  {} {:<40} {}",
                            stage_glyph(&config, GrowthStage::Mature),
                            plant.title,
                            date,
                        );
                    }
                }
            }
        }

        // ── Goal ───────────────────────────────────────────────────────────

        Commands::Goal { action } => {
            let mut prefs = TomlPreferences::open(config.preferences_path());
            match action {
                GoalAction::Get => {
                    let dur = start.elapsed().as_millis();
                    if json_output {
                        print_json(&serde_json::json!({
                            "status": "ok",
                            "data": { "yearly_goal": prefs.yearly_goal() },
                            "meta": { "duration_ms": dur }
                        }))?;
                    } else {
                        println!("{}", prefs.yearly_goal());
                    }
                }
                GoalAction::Set { goal } => {
                    if !(1..=100).contains(&goal) {
                        eprintln!("Goal must be between 1 and 100 books.");
                        std::process::exit(ExitCode::InvalidArgs as i32);
                    }

                    prefs.set_yearly_goal(goal)?;
                    let first_time = !prefs.onboarding_completed();
                    if first_time {
                        prefs.set_onboarding_completed(true)?;
                    }
                    let dur = start.elapsed().as_millis();

                    if json_output {
                        print_json(&serde_json::json!({
                            "status": "ok",
                            "data": { "yearly_goal": goal, "onboarding_completed": true },
                            "meta": { "duration_ms": dur }
                        }))?;
                    } else if first_time {
                        println!("Welcome to your reading garden! Goal set to {goal} books per year.");
                    } else {
                        println!("Goal set to {goal} books per year.");
                    }
                }
            }
        }

        // ── Stats ──────────────────────────────────────────────────────────

        Commands::Stats => {
            let garden = open_garden(&config)?;
            let prefs = TomlPreferences::open(config.preferences_path());
            let stats = garden.stats(Utc::now().year())?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "stats": stats, "yearly_goal": prefs.yearly_goal() },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                println!("Garden statistics:");
                println!("  Growing:             {}", stats.growing);
                println!("  Harvested:           {}", stats.harvested);
                println!(
                    "  Harvested this year: {} / {}",
                    stats.harvested_this_year,
                    prefs.yearly_goal()
                );
                println!("  Pages read:          {}", stats.pages_read);
            }
        }

        // ── Config ─────────────────────────────────────────────────────────

        Commands::Config { action } => {
            let dur = start.elapsed().as_millis();
            match action {
                ConfigAction::List => {
                    let kv = config_key_values(&config);
                    if json_output {
                        print_json(&serde_json::json!({"status":"ok","data":kv,"meta":{"duration_ms":dur}}))?;
                    } else {
                        for (k, v) in &kv {
                            println!("{k} = {v}");
                        }
                    }
                }
                ConfigAction::Get { key } => {
                    let kv = config_key_values(&config);
                    match kv.iter().find(|(k, _)| *k == key.as_str()) {
                        Some((_, val)) => {
                            if json_output {
                                print_json(&serde_json::json!({"status":"ok","data":{"key":key,"value":val},"meta":{"duration_ms":dur}}))?;
                            } else {
                                println!("{val}");
                            }
                        }
                        None => {
                            eprintln!("Unknown config key: {key}");
                            std::process::exit(ExitCode::NotFound as i32);
                        }
                    }
                }
            }
        }

        // ── Doctor ─────────────────────────────────────────────────────────

        Commands::Doctor => {
            let config_path = AppConfig::config_path();
            if config_path.exists() {
                println!("✓ Config: {}", config_path.display());
            } else {
                println!("○ Config: not found (using defaults)");
            }

            let mut issues = 0;
            match open_garden(&config) {
                Ok(garden) => {
                    let count = garden.count_plants().unwrap_or(0);
                    println!("✓ Garden: {} ({count} plants)", config.database_path().display());
                }
                Err(e) => {
                    issues += 1;
                    println!("✗ Garden: {e}");
                }
            }

            let prefs_path = config.preferences_path();
            if prefs_path.exists() {
                let prefs = TomlPreferences::open(&prefs_path);
                println!(
                    "✓ Preferences: {} (goal {}, onboarded: {})",
                    prefs_path.display(),
                    prefs.yearly_goal(),
                    prefs.onboarding_completed(),
                );
            } else {
                println!("○ Preferences: not set yet (defaults apply)");
            }

            if issues == 0 {
                println!("\nAll checks passed ✓");
            } else {
                println!("\n{issues} issues found");
                std::process::exit(ExitCode::GeneralError as i32);
            }
        }

        // ── Version ────────────────────────────────────────────────────────

        Commands::Version => {
            let version = env!("CARGO_PKG_VERSION");
            let dur = start.elapsed().as_millis();
            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":{"version":version},"meta":{"duration_ms":dur}}))?;
            } else {
                println!("bookgarden v{version}");
            }
        }
    }

    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

fn open_garden(config: &AppConfig) -> Result<Garden> {
    let db_path = config.database_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(Garden::open(&db_path)?)
}

fn stage_glyph(config: &AppConfig, stage: GrowthStage) -> &'static str {
    if config.ui.show_glyphs { stage.glyph() } else { "-" }
}

fn render_bar(config: &AppConfig, percent: u8) -> String {
    let width = usize::from(config.ui.progress_width);
    let filled = usize::from(percent).min(100) * width / 100;
    let mut bar = String::with_capacity(width);
    for i in 0..width {
        bar.push(if i < filled { '█' } else { '░' });
    }
    bar
}

fn config_key_values(config: &AppConfig) -> Vec<(&'static str, String)> {
    vec![
        ("garden_path", config.core.garden_path.clone()),
        ("database_path", config.database_path().to_string_lossy().to_string()),
        ("preferences_path", config.preferences_path().to_string_lossy().to_string()),
        ("progress_width", config.ui.progress_width.to_string()),
        ("show_glyphs", config.ui.show_glyphs.to_string()),
    ]
}
