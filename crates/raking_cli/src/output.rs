use colored::*;
use raking_core::{DiagnosticEvent, FitResult, Summary};
use raking_engine::WeightingSession;
use serde_json::json;

pub fn print_check_report(session: &WeightingSession, events: &[DiagnosticEvent], format: &str) {
    match format {
        "json" => print_check_json(session, events),
        _ => print_check_text(session),
    }
}

pub fn print_fit_report(
    fit: &FitResult,
    summary: &Summary,
    events: &[DiagnosticEvent],
    format: &str,
) {
    match format {
        "json" => print_fit_json(fit, summary, events),
        _ => print_fit_text(fit, summary, events),
    }
}

fn print_check_text(session: &WeightingSession) {
    print_success("Targets are valid");

    println!("\nTarget Summary:");
    println!("  Rows:        {}", session.dataset().len());
    println!("  Variables:   {}", session.targets().len());
    println!("  Categories:  {}", session.targets().cell_count());

    for variable in session.targets().variables() {
        let missing = session.audit().missing_in(&variable.column).unwrap_or(0);
        println!("\n  {}", variable.column.bold());
        for target in &variable.categories {
            println!("    {:<20} {:>7.2}%", target.category, target.percentage);
        }
        if missing > 0 {
            println!(
                "    {}",
                format!("{} missing value(s)", missing).yellow()
            );
        }
    }
}

fn print_check_json(session: &WeightingSession, events: &[DiagnosticEvent]) {
    let output = json!({
        "valid": true,
        "rows": session.dataset().len(),
        "targets": session.targets(),
        "missing": session.audit(),
        "diagnostics": events,
    });

    print_json(&output);
}

fn print_fit_text(fit: &FitResult, summary: &Summary, events: &[DiagnosticEvent]) {
    println!("\n{}", "═".repeat(72));
    println!("{}", "  RAKING REPORT".bold());
    println!("{}", "═".repeat(72));

    if fit.converged {
        println!(
            "\n{} {}",
            "✓".green().bold(),
            format!("Converged after {} iterations", fit.iterations)
                .green()
                .bold()
        );
    } else {
        println!(
            "\n{} {}",
            "✗".yellow().bold(),
            format!(
                "Did not converge after {} iterations (max difference {:.4})",
                fit.iterations, fit.max_difference
            )
            .yellow()
            .bold()
        );
    }

    let warnings: Vec<&DiagnosticEvent> = events.iter().filter(|e| e.is_warning()).collect();
    if !warnings.is_empty() {
        println!("\n{}", "Warnings:".yellow().bold());
        for (i, warning) in warnings.iter().enumerate() {
            println!("  {}. {}", i + 1, warning.message.yellow());
        }
    }

    println!("\n{}", "Weights:".bold());
    println!("  Count:            {}", fit.weights.len());
    println!("  Mean:             {:.4}", fit.mean_weight());
    if let (Some(min), Some(max)) = (fit.min_weight(), fit.max_weight()) {
        println!("  Min / Max:        {:.4} / {:.4}", min, max);
    }
    println!("  Effective n:      {:.1}", fit.effective_sample_size());
    println!("  Design effect:    {:.4}", fit.design_effect());

    println!(
        "\n  {:<16} {:<16} {:>12} {:>10} {:>10}",
        "Variable".bold(),
        "Category".bold(),
        "Unweighted %".bold(),
        "Target %".bold(),
        "Weighted %".bold()
    );
    for row in &summary.rows {
        println!(
            "  {:<16} {:<16} {:>12.2} {:>10.2} {:>10.2}",
            row.variable,
            row.category,
            row.unweighted_percentage,
            row.target_percentage,
            row.weighted_percentage
        );
    }
    println!("{}", "═".repeat(72));
}

fn print_fit_json(fit: &FitResult, summary: &Summary, events: &[DiagnosticEvent]) {
    let output = json!({
        "converged": fit.converged,
        "iterations": fit.iterations,
        "max_difference": fit.max_difference,
        "weights": {
            "count": fit.weights.len(),
            "mean": fit.mean_weight(),
            "min": fit.min_weight(),
            "max": fit.max_weight(),
            "effective_sample_size": fit.effective_sample_size(),
            "design_effect": fit.design_effect(),
        },
        "summary": summary.rows,
        "diagnostics": events,
    });

    print_json(&output);
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => print_error(&format!("Failed to render JSON report: {}", e)),
    }
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}
