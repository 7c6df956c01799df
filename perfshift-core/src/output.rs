use crate::changepoint::ChangePoint;
use colored::*;
use std::fmt::Display;

/// Format a relative change as a signed percentage
pub fn format_relative_change(relative_change: f64) -> String {
    if relative_change.is_infinite() {
        return if relative_change > 0.0 { "+inf%".to_string() } else { "-inf%".to_string() };
    }
    format!("{:+.1}%", relative_change * 100.0)
}

/// One-line summary of a detected change
///
/// An increase in the measured value is reported as a regression.
pub fn format_change_point<X: Display>(series_name: &str, change: &ChangePoint<X>) -> String {
    let change_symbol = if change.is_increase() { "↗" } else { "↘" };
    let percentage_str = format_relative_change(change.relative_change);
    let medians = format!("median: {:.4} -> {:.4}", change.median_before, change.median_after);

    if change.is_increase() {
        format!(
            "{} {} {} {} at {} ({})",
            "REGRESS".red().bold(),
            series_name.cyan(),
            change_symbol,
            percentage_str.red().bold(),
            change.x_value.to_string().bright_white(),
            medians.dimmed()
        )
    } else {
        format!(
            "{} {} {} {} at {} ({})",
            "IMPROVE".green().bold(),
            series_name.cyan(),
            change_symbol,
            percentage_str.green(),
            change.x_value.to_string().bright_white(),
            medians.dimmed()
        )
    }
}

/// Detail lines describing the window and the t-test behind a change
pub fn format_change_point_details<X: Display>(change: &ChangePoint<X>) -> Vec<String> {
    vec![
        format!(
            "        {} {} .. {} ({} before, {} after)",
            "Window:".dimmed(),
            change.window_start,
            change.window_end,
            change.size_before,
            change.size_after
        ),
        format!(
            "        {} {:.4}",
            "Std dev before:".dimmed(),
            change.std_dev_before
        ),
        format!(
            "        {} t = {:.3}, df = {:.1}, p = {:.4}",
            "Welch's t-test:".dimmed(),
            change.t_statistic,
            change.degrees_of_freedom,
            change.p_value
        ),
    ]
}

/// Print the detection report for one series
pub fn print_report<X: Display>(series_name: &str, points: usize, changes: &[ChangePoint<X>]) {
    println!(
        "   {} {} ({} points)",
        "Analyzed".cyan().bold(),
        series_name,
        points
    );

    match changes.first() {
        Some(change) => {
            println!("{}", format_change_point(series_name, change));
            for line in format_change_point_details(change) {
                println!("{}", line);
            }
        }
        None => println!(
            "        {} {} (no significant change)",
            "STABLE".cyan(),
            series_name.bright_white()
        ),
    }
}
