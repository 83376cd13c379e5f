use chrono::NaiveDateTime;
use clap::Subcommand;
use colored::Colorize;
use healthlog_lib::{
    Repository,
    metrics::{NutritionSummary, cutoff_days_ago},
    records::{Choice, FoodItem, MealType, NutritionRecord},
};
use sysexits::ExitCode as SysExit;

use crate::{now, parse_date};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List meals, oldest first
    List,
    /// Log a meal
    Add {
        /// breakfast, lunch, dinner, snack or late-snack
        meal_type: String,
        /// A food as name:calories:protein:carbs:fat, missing numbers count as zero
        #[arg(short, long = "food", value_parser = parse_food, required = true)]
        foods: Vec<FoodItem>,
        /// Total calories, the sum of the foods when omitted
        #[arg(short, long)]
        total: Option<f64>,
        /// When the meal was eaten, defaults to now
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDateTime>,
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Delete the meal at INDEX, as shown by `list`
    Delete { index: usize },
    /// Summarize recent eating
    Summary {
        /// Number of days to include
        #[arg(short = 'n', long, default_value_t = 7)]
        days: u32,
    },
}

pub fn handle(repo: &Repository, cmd: &Command) -> healthlog_lib::Result<SysExit> {
    match cmd {
        Command::List => {
            let meals = repo.load_nutrition()?;
            if meals.is_empty() {
                println!("No meals logged");
            }
            for (index, meal) in meals.iter().enumerate() {
                let foods: Vec<&str> = meal.foods().iter().map(|f| f.name().as_str()).collect();
                println!(
                    "{:>3}  {}  {:<10} {:>7.0} kcal  {}",
                    index.to_string().dimmed(),
                    meal.date().format("%Y-%m-%d %H:%M"),
                    meal.meal_type().to_string().bold(),
                    meal.total_calories(),
                    foods.join(", ")
                );
            }
        }
        Command::Add {
            meal_type,
            foods,
            total,
            date,
            notes,
        } => {
            let total = total.unwrap_or_else(|| foods.iter().map(FoodItem::calories).sum());
            let record = NutritionRecord::new(
                date.unwrap_or_else(now),
                MealType::parse(meal_type)?,
                foods.clone(),
                total,
                notes.as_deref(),
            )?;

            repo.save_nutrition(&record)?;
            println!(
                "{} {} ({:.0} kcal)",
                "Logged".green(),
                record.meal_type().to_string().bold(),
                record.total_calories()
            );
        }
        Command::Delete { index } => {
            repo.delete_nutrition(*index)?;
            println!("{} meal {index}", "Deleted".green());
        }
        Command::Summary { days } => {
            let meals = repo.load_nutrition()?;
            let summary = NutritionSummary::since(&meals, cutoff_days_ago(*days));

            println!("{}", format!("Last {days} days").bold());
            println!("  meals:    {}", summary.meals);
            println!("  calories: {:.0}", summary.total_calories);
            println!(
                "  protein {:.1} g, carbs {:.1} g, fat {:.1} g",
                summary.foods.protein, summary.foods.carbs, summary.foods.fat
            );
            for (day, calories) in &summary.daily_calories {
                println!("  {day}  {calories:>7.0} kcal");
            }
        }
    }

    Ok(SysExit::Ok)
}

fn parse_food(value: &str) -> Result<FoodItem, String> {
    let mut parts = value.split(':');
    let name = parts.next().unwrap_or_default();

    let mut numbers = [0.0; 4];
    for (slot, part) in numbers.iter_mut().zip(parts.by_ref()) {
        *slot = part
            .trim()
            .parse()
            .map_err(|_| format!("`{part}` is not a number"))?;
    }
    if parts.next().is_some() {
        return Err("expected name:calories:protein:carbs:fat".to_string());
    }

    let [calories, protein, carbs, fat] = numbers;
    FoodItem::new(name.trim(), calories, protein, carbs, fat).map_err(|err| err.to_string())
}
