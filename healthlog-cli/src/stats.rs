use colored::Colorize;
use healthlog_lib::{
    Repository,
    metrics::{BmiCategory, HealthStats},
};
use sysexits::ExitCode as SysExit;

use crate::profile::no_profile;

pub fn handle(repo: &Repository) -> healthlog_lib::Result<SysExit> {
    let Some(stats) = repo.health_stats()? else {
        return Ok(no_profile());
    };

    print_stats(&stats);

    Ok(SysExit::Ok)
}

fn print_stats(stats: &HealthStats) {
    let category = stats.bmi_category.label();
    let category = match stats.bmi_category {
        BmiCategory::Normal => category.green(),
        BmiCategory::Underweight | BmiCategory::Overweight => category.yellow(),
        BmiCategory::Obese => category.red(),
    };

    println!(
        "BMI             {:.1} {} {category}",
        stats.bmi,
        stats.bmi_category.indicator()
    );
    println!(
        "Ideal weight    {:.1}-{:.1} kg",
        stats.ideal_weight_kg.0, stats.ideal_weight_kg.1
    );
    println!("BMR             {:.0} kcal", stats.bmr);
    println!("TDEE            {:.0} kcal", stats.tdee);
    println!("Daily target    {:.0} kcal", stats.target_calories);
    println!("Protein         {:.0} g", stats.protein_requirement_g);
    println!(
        "Macros          protein {:.0} g, carbs {:.0} g, fat {:.0} g",
        stats.macros.protein.grams, stats.macros.carbs.grams, stats.macros.fat.grams
    );
}
