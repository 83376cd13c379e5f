use chrono::NaiveDateTime;
use clap::Subcommand;
use colored::Colorize;
use healthlog_lib::{
    Repository,
    metrics::{self, WorkoutSummary, cutoff_days_ago, daily_calories_burned},
    records::{Choice, Intensity, WorkoutRecord},
};
use sysexits::ExitCode as SysExit;
use tracing::debug;

use crate::{now, parse_date};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List workouts, oldest first
    List,
    /// Log a workout
    Add {
        exercise: String,
        /// Duration in minutes
        #[arg(short, long)]
        minutes: u32,
        /// Calories burned, estimated from the profile weight when omitted
        #[arg(short, long)]
        calories: Option<u32>,
        /// low, medium or high
        #[arg(short, long, default_value = "medium")]
        intensity: String,
        /// When the workout happened, defaults to now
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDateTime>,
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Delete the workout at INDEX, as shown by `list`
    Delete { index: usize },
    /// Summarize recent training
    Summary {
        /// Number of days to include
        #[arg(short = 'n', long, default_value_t = 7)]
        days: u32,
    },
}

pub fn handle(repo: &Repository, cmd: &Command) -> healthlog_lib::Result<SysExit> {
    match cmd {
        Command::List => {
            let workouts = repo.load_workouts()?;
            if workouts.is_empty() {
                println!("No workouts logged");
            }
            for (index, workout) in workouts.iter().enumerate() {
                println!(
                    "{:>3}  {}  {:<20} {:>4} min {:>5} kcal  {}",
                    index.to_string().dimmed(),
                    workout.date().format("%Y-%m-%d %H:%M"),
                    workout.exercise().bold(),
                    workout.duration_minutes(),
                    workout.calories(),
                    workout.intensity()
                );
            }
        }
        Command::Add {
            exercise,
            minutes,
            calories,
            intensity,
            date,
            notes,
        } => {
            let calories = match calories {
                Some(calories) => *calories,
                None => estimate(repo, exercise, *minutes)?,
            };
            let record = WorkoutRecord::with_limits(
                &repo.limits(),
                date.unwrap_or_else(now),
                exercise,
                *minutes,
                calories,
                Intensity::parse(intensity)?,
                notes.as_deref(),
            )?;

            repo.save_workout(&record)?;
            println!(
                "{} {} ({} kcal)",
                "Logged".green(),
                record.exercise().bold(),
                record.calories()
            );
        }
        Command::Delete { index } => {
            repo.delete_workout(*index)?;
            println!("{} workout {index}", "Deleted".green());
        }
        Command::Summary { days } => {
            let workouts = repo.load_workouts()?;
            let cutoff = cutoff_days_ago(*days);
            let summary = WorkoutSummary::since(&workouts, cutoff);

            println!("{}", format!("Last {days} days").bold());
            println!("  sessions:       {}", summary.sessions);
            println!("  minutes:        {}", summary.total_minutes);
            println!("  calories:       {}", summary.total_calories);
            if let Some(intensity) = summary.most_common_intensity {
                println!("  usual intensity: {intensity}");
            }
            for (day, calories) in daily_calories_burned(&workouts)
                .range(cutoff.date()..)
            {
                println!("  {day}  {calories:>5} kcal");
            }
        }
    }

    Ok(SysExit::Ok)
}

/// Estimate from the exercise's MET value, or zero without a profile to take the weight from.
fn estimate(repo: &Repository, exercise: &str, minutes: u32) -> healthlog_lib::Result<u32> {
    let Some(profile) = repo.load_profile()? else {
        debug!("No profile, not estimating calories for {exercise}");
        return Ok(0);
    };

    let estimate = metrics::estimate_calories_burned(exercise, profile.weight_kg(), minutes)?;

    // `as` saturates, an absurd estimate turns into u32::MAX and fails the calorie limit
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let calories = estimate.round().max(0.0) as u32;

    Ok(calories)
}
