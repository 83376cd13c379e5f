use clap::{Args, Subcommand};
use colored::Colorize;
use healthlog_lib::{
    Repository,
    metrics::{self, DEFAULT_ACTIVITY_LEVEL, DEFAULT_GOAL},
    records::{Choice, Gender, Profile},
};
use sysexits::ExitCode as SysExit;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show the current profile
    Show,
    /// Create the profile, or update the given fields of the existing one
    Set(SetArgs),
    /// Delete the current profile
    Delete,
}

#[derive(Args, Debug, Clone)]
pub struct SetArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    age: Option<u32>,
    /// male or female
    #[arg(long)]
    gender: Option<String>,
    /// Height in centimetres
    #[arg(long)]
    height: Option<f64>,
    /// Weight in kilograms
    #[arg(long)]
    weight: Option<f64>,
    /// sedentary, light, moderate, active or very_active
    #[arg(long)]
    activity: Option<String>,
    /// maintain, lose, gain, build_muscle or health
    #[arg(long)]
    goal: Option<String>,
}

pub fn handle(repo: &Repository, cmd: &Command) -> healthlog_lib::Result<SysExit> {
    match cmd {
        Command::Show => {
            let Some(profile) = repo.load_profile()? else {
                return Ok(no_profile());
            };
            print_profile(&profile);
        }
        Command::Set(args) => {
            let profile = match repo.load_profile()? {
                Some(existing) => update(repo, existing, args)?,
                None => match create(repo, args)? {
                    Some(profile) => profile,
                    None => {
                        eprintln!(
                            "{} a new profile needs --name, --age, --gender, --height and --weight",
                            "error:".red().bold()
                        );
                        return Ok(SysExit::Usage);
                    }
                },
            };

            let saved = repo.save_profile(&profile)?;
            println!("{} {}", "Saved profile".green(), saved.name().bold());
        }
        Command::Delete => {
            if repo.delete_profile()? {
                println!("{}", "Profile deleted".green());
            } else {
                return Ok(no_profile());
            }
        }
    }

    Ok(SysExit::Ok)
}

pub fn no_profile() -> SysExit {
    eprintln!(
        "{} no profile yet, create one with `healthlog profile set`",
        "warning:".yellow().bold()
    );
    SysExit::NoInput
}

fn create(repo: &Repository, args: &SetArgs) -> healthlog_lib::Result<Option<Profile>> {
    let (Some(name), Some(age), Some(gender), Some(height), Some(weight)) = (
        args.name.as_deref(),
        args.age,
        args.gender.as_deref(),
        args.height,
        args.weight,
    ) else {
        return Ok(None);
    };

    let activity_level = match args.activity.as_deref() {
        Some(key) => lookup(repo, key, DEFAULT_ACTIVITY_LEVEL)?,
        None => DEFAULT_ACTIVITY_LEVEL,
    };
    let goal = match args.goal.as_deref() {
        Some(key) => lookup(repo, key, DEFAULT_GOAL)?,
        None => DEFAULT_GOAL,
    };

    Ok(Some(Profile::with_limits(
        &repo.limits(),
        name,
        age,
        Gender::parse(gender)?,
        height,
        weight,
        activity_level,
        goal,
    )?))
}

fn update(
    repo: &Repository,
    mut profile: Profile,
    args: &SetArgs,
) -> healthlog_lib::Result<Profile> {
    if let Some(name) = &args.name {
        profile.set_name(name);
    }
    if let Some(age) = args.age {
        profile.set_age(age);
    }
    if let Some(key) = &args.gender {
        profile.set_gender(Gender::parse(key)?);
    }
    if let Some(height) = args.height {
        profile.set_height_cm(height);
    }
    if let Some(weight) = args.weight {
        profile.set_weight_kg(weight);
    }
    if let Some(key) = &args.activity {
        profile.set_activity_level(lookup(repo, key, profile.activity_level())?);
    }
    if let Some(key) = &args.goal {
        profile.set_goal(lookup(repo, key, profile.goal())?);
    }

    Ok(profile)
}

/// Resolve an activity level or goal key with the configured lookup mode.
fn lookup<T: Choice>(repo: &Repository, key: &str, fallback: T) -> healthlog_lib::Result<T> {
    let mode = repo.config().read().lookup;

    Ok(metrics::resolve(key, mode, fallback)?)
}

fn print_profile(profile: &Profile) {
    println!("{}", profile.name().bold());
    println!("  age:            {}", profile.age());
    println!("  gender:         {}", profile.gender());
    println!("  height:         {} cm", profile.height_cm());
    println!("  weight:         {} kg", profile.weight_kg());
    println!("  activity level: {}", profile.activity_level());
    println!("  goal:           {}", profile.goal());
    println!(
        "  updated:        {}",
        profile.updated_at().format("%Y-%m-%d %H:%M")
    );
}
