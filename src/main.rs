mod cli;
mod config;
mod datasources;
mod db;
mod error;
mod logic;
mod models;

use chrono::{Local, Offset, Utc};
use clap::Parser;
use cli::{Cli, Commands, LocationCommands, RuleCommands};
use config::Config;
use datasources::WundergroundClient;
use db::queries::ZIP_CODE_KEY;
use db::{Database, KeyValueStore};
use error::{Result, RunGearError};
use logic::normalizer::{self, TargetInstant};
use logic::RuleEngine;
use models::{ClothingRule, FeelBound, WeatherSnapshot, ZipCode};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    let default_filter = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let command = cli.command.unwrap_or(Commands::Now { zip: None });

    if let Commands::Init = command {
        Config::setup_interactive()?;
        return Ok(());
    }

    // First run: walk through setup instead of failing on a missing file
    let config = if Config::exists(cli.config.as_ref()) {
        Config::load(cli.config)?
    } else {
        Config::setup_interactive()?.0
    };

    let db = Database::open(cli.data_dir.as_ref())?;

    match command {
        Commands::Now { zip } => recommend(&config, &db, zip, None).await,
        Commands::Forecast { hours, zip } => recommend(&config, &db, zip, Some(hours)).await,
        Commands::Location { command } => handle_location(&db, command),
        Commands::Rules { command } => handle_rules(&db, command),
        Commands::Check => check(&config, &db).await,
        Commands::Init => Ok(()),
    }
}

/// Fetch weather for the resolved zip code and print what to wear,
/// either for current conditions or `hours_ahead` whole hours out.
async fn recommend(
    config: &Config,
    db: &Database,
    zip_flag: Option<String>,
    hours_ahead: Option<u32>,
) -> Result<()> {
    let zip = resolve_zip(config, db, zip_flag)?;
    let client = WundergroundClient::new(config.wunderground.clone());
    let payload = client.fetch_by_zip(&zip).await?;

    let now = Utc::now();
    let target = match hours_ahead {
        None => TargetInstant::Now,
        Some(hours) => {
            let upcoming = normalizer::next_24_hours(now);
            TargetInstant::At(upcoming[(hours - 1) as usize])
        }
    };
    let caller_offset = Local::now().offset().fix();
    let weather = normalizer::snapshot_at(&payload, target, caller_offset, now)?;

    let engine = RuleEngine::load(db.clone());
    let clothes = engine.evaluate(&weather);
    print_recommendation(&weather, &clothes);

    Ok(())
}

/// Zip precedence: command-line flag, then the saved location, then the
/// config default.
fn resolve_zip(config: &Config, db: &Database, zip_flag: Option<String>) -> Result<ZipCode> {
    if let Some(zip) = zip_flag {
        return ZipCode::parse(&zip);
    }

    if let Some(saved) = db.get(ZIP_CODE_KEY)? {
        match ZipCode::parse(&saved) {
            Ok(zip) => return Ok(zip),
            Err(_) => {
                tracing::warn!(zip = %saved, "Ignoring invalid saved zip code");
            }
        }
    }

    if let Some(ref zip) = config.location.default_zip {
        return ZipCode::parse(zip);
    }

    Err(RunGearError::Config(
        "No location set. Run `rungear location set <zip>` or pass --zip.".to_string(),
    ))
}

fn print_recommendation(weather: &WeatherSnapshot, clothes: &[String]) {
    println!("Running in {}", weather.city);
    let condition = weather
        .condition
        .map(|c| c.as_str())
        .unwrap_or("-");
    println!(
        "  {:.0}°F (feels like {:.0}°F)  {}  wind {:.0} mph",
        weather.temp_f, weather.feels_like_f, condition, weather.wind_mph
    );
    println!("  {}", weather.time);
    println!();
    println!("You should wear:");
    if clothes.is_empty() {
        println!("  (no rules matched)");
    } else {
        for item in clothes {
            println!("  - {}", item);
        }
    }
}

fn handle_location(db: &Database, command: LocationCommands) -> Result<()> {
    match command {
        LocationCommands::Set { zip } => {
            let zip = ZipCode::parse(&zip)?;
            db.set(ZIP_CODE_KEY, zip.as_str())?;
            println!("Saved location {}", zip);
        }
        LocationCommands::Show => match db.get(ZIP_CODE_KEY)? {
            Some(zip) => println!("{}", zip),
            None => println!("No saved location"),
        },
        LocationCommands::Clear => {
            db.remove(ZIP_CODE_KEY)?;
            println!("Saved location cleared");
        }
    }
    Ok(())
}

fn handle_rules(db: &Database, command: RuleCommands) -> Result<()> {
    let mut engine = RuleEngine::load(db.clone());
    match command {
        RuleCommands::List => {
            for rule in engine.committed_rules() {
                println!("  {}", describe_rule(rule));
            }
            Ok(())
        }
        RuleCommands::Edit => edit_rules(&mut engine),
        RuleCommands::Reset => {
            engine.reset_to_defaults()?;
            println!("Rules reset to defaults");
            Ok(())
        }
    }
}

fn describe_rule(rule: &ClothingRule) -> String {
    let mut when = Vec::new();
    if rule.day {
        when.push("day");
    }
    if rule.night {
        when.push("night");
    }
    let mut conditions = Vec::new();
    if rule.clear {
        conditions.push("clear");
    }
    if rule.cloudy {
        conditions.push("cloudy");
    }
    if rule.raining {
        conditions.push("raining");
    }
    if rule.snowing {
        conditions.push("snowing");
    }

    let when = if when.is_empty() {
        "never".to_string()
    } else {
        when.join("/")
    };
    let conditions = if conditions.is_empty() {
        "no conditions".to_string()
    } else {
        conditions.join(", ")
    };

    let marker = if rule.is_live() { "" } else { "  (never matches)" };

    format!(
        "{:<20} [{}°F, {}°F)  {}  {}{}",
        rule.name,
        rule.min_feel.text(),
        rule.max_feel.text(),
        when,
        conditions,
        marker
    )
}

/// Interactive draft editor. Nothing is persisted until "Save and exit";
/// "Reset to defaults" persists immediately and closes the editor.
fn edit_rules<S: KeyValueStore>(engine: &mut RuleEngine<S>) -> Result<()> {
    use dialoguer::Select;

    loop {
        println!();
        if engine.list_draft().is_empty() {
            println!("  (no rules)");
        } else {
            for (i, entry) in engine.list_draft().iter().enumerate() {
                println!("  {:2}. {}", i + 1, describe_rule(&entry.rule));
            }
        }
        println!();

        let actions = [
            "Add rule",
            "Edit rule",
            "Delete rule",
            "Save and exit",
            "Discard changes",
            "Reset to defaults",
        ];
        let choice = Select::new()
            .with_prompt("Rules")
            .items(&actions)
            .default(0)
            .interact()
            .map_err(input_err)?;

        match choice {
            0 => {
                let id = engine.add_draft_rule("new item");
                let rule = prompt_rule_fields(&ClothingRule::new("new item"))?;
                engine.update_draft_rule(id, rule)?;
            }
            1 => {
                if let Some(index) = pick_rule(engine)? {
                    let (id, current) = {
                        let entry = &engine.list_draft()[index];
                        (entry.id, entry.rule.clone())
                    };
                    let rule = prompt_rule_fields(&current)?;
                    engine.update_draft_rule(id, rule)?;
                }
            }
            2 => {
                if let Some(index) = pick_rule(engine)? {
                    let id = engine.list_draft()[index].id;
                    engine.delete_draft_rule(id)?;
                }
            }
            3 => {
                engine.commit()?;
                println!("Rules saved");
                return Ok(());
            }
            4 => {
                engine.discard_draft();
                println!("Changes discarded");
                return Ok(());
            }
            _ => {
                engine.reset_to_defaults()?;
                println!("Rules reset to defaults");
                return Ok(());
            }
        }
    }
}

fn pick_rule<S: KeyValueStore>(engine: &RuleEngine<S>) -> Result<Option<usize>> {
    use dialoguer::Select;

    if engine.list_draft().is_empty() {
        println!("  (no rules)");
        return Ok(None);
    }

    let labels: Vec<String> = engine
        .list_draft()
        .iter()
        .map(|entry| entry.rule.name.clone())
        .collect();
    let index = Select::new()
        .with_prompt("Which rule")
        .items(&labels)
        .default(0)
        .interact()
        .map_err(input_err)?;
    Ok(Some(index))
}

fn prompt_rule_fields(current: &ClothingRule) -> Result<ClothingRule> {
    use dialoguer::Input;

    let name: String = Input::new()
        .with_prompt("Wear")
        .default(current.name.clone())
        .interact_text()
        .map_err(input_err)?;

    let min_feel: String = Input::new()
        .with_prompt("when it feels warmer than or equal to (°F)")
        .default(current.min_feel.text().to_string())
        .allow_empty(true)
        .interact_text()
        .map_err(input_err)?;

    let max_feel: String = Input::new()
        .with_prompt("and it feels cooler than (°F)")
        .default(current.max_feel.text().to_string())
        .allow_empty(true)
        .interact_text()
        .map_err(input_err)?;

    let day = confirm("Wear during the day?", current.day)?;
    let night = confirm("Wear at night?", current.night)?;
    let clear = confirm("Wear when clear?", current.clear)?;
    let cloudy = confirm("Wear when cloudy?", current.cloudy)?;
    let raining = confirm("Wear when raining?", current.raining)?;
    let snowing = confirm("Wear when snowing?", current.snowing)?;

    Ok(ClothingRule {
        name,
        min_feel: FeelBound::new(min_feel),
        max_feel: FeelBound::new(max_feel),
        day,
        night,
        clear,
        cloudy,
        raining,
        snowing,
    })
}

fn confirm(prompt: &str, default: bool) -> Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(input_err)
}

fn input_err(e: dialoguer::Error) -> RunGearError {
    RunGearError::Config(format!("Input error: {}", e))
}

async fn check(config: &Config, db: &Database) -> Result<()> {
    if config.wunderground.api_key.is_empty() {
        println!("Config: missing Weather Underground API key");
    } else {
        println!("Config: OK");
    }

    let zip = resolve_zip(config, db, None)?;
    let client = WundergroundClient::new(config.wunderground.clone());
    match client.test_connection(&zip).await {
        Ok(true) => println!("Weather Underground: OK ({})", zip),
        Ok(false) => println!("Weather Underground: FAILED"),
        Err(e) => println!("Weather Underground: {}", e),
    }

    Ok(())
}
