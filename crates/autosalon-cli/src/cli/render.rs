//! # Rendering
//!
//! Builds terminal lines for cars and messages. The `format_*` functions return
//! plain strings (testable); the `print_*` functions add color and write to stdout.
//!
//! ## Car List Layout
//!
//! - pin marker (2 cols)
//! - id (`COL_ID` cols, truncated)
//! - name (fill, truncated)
//! - price (`COL_PRICE` cols, right-aligned)
//! - year and mileage (right-aligned)

use autosalon::messages::ContactMessage;
use autosalon::model::{group_digits, Car};
use autosalon::repository::{LoadReport, LoadSource};
use autosalon::store::LoadOutcome;
use chrono::{DateTime, Utc};
use colored::Colorize;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const LINE_WIDTH: usize = 100;
pub const PIN_MARKER: &str = "⚲";
pub const FEATURED_MARKER: &str = "★";

const COL_ID: usize = 14;
const COL_PRICE: usize = 16;
const COL_YEAR: usize = 6;
const COL_MILEAGE: usize = 12;
const TIME_WIDTH: usize = 14;

pub fn format_car_row(car: &Car) -> String {
    let marker = if car.pinned {
        format!("{} ", PIN_MARKER)
    } else {
        "  ".to_string()
    };
    let id = pad_to(&truncate_to_width(&car.id, COL_ID), COL_ID);

    let mut name = car.name.clone();
    if car.featured {
        name = format!("{} {}", name, FEATURED_MARKER);
    }
    let fixed = 2 + COL_ID + COL_PRICE + COL_YEAR + COL_MILEAGE;
    let available = LINE_WIDTH.saturating_sub(fixed);
    let name = pad_to(&truncate_to_width(&name, available), available);

    format!(
        "{}{}{}{:>price$}{:>year$}{:>mileage$}",
        marker,
        id,
        name,
        car.display_price(),
        car.year,
        format!("{} km", group_digits(car.mileage)),
        price = COL_PRICE,
        year = COL_YEAR,
        mileage = COL_MILEAGE,
    )
}

pub fn print_cars(cars: &[Car]) {
    if cars.is_empty() {
        println!("No cars found.");
        return;
    }
    for car in cars {
        let row = format_car_row(car);
        if car.pinned {
            println!("{}", row.yellow());
        } else {
            println!("{}", row);
        }
    }
}

pub fn format_car_details(car: &Car) -> Vec<String> {
    let mut lines = vec![
        format!("{} ({})", car.name, car.brand),
        "--------------------------------".to_string(),
        format!("Id:           {}", car.id),
        format!("Price:        {}", car.display_price()),
        format!("Year:         {}", car.year),
        format!("Mileage:      {} km", group_digits(car.mileage)),
        format!("Fuel:         {}", car.fuel),
        format!("Transmission: {}", car.transmission),
    ];
    if let Some(v) = &car.engine_volume {
        lines.push(format!("Engine:       {}", v));
    }
    if let Some(p) = &car.power {
        lines.push(format!("Power:        {}", p));
    }
    let mut flags = Vec::new();
    if car.featured {
        flags.push("featured");
    }
    if car.pinned {
        flags.push("pinned");
    }
    if !flags.is_empty() {
        lines.push(format!("Flags:        {}", flags.join(", ")));
    }
    if !car.feature_tags().is_empty() {
        lines.push(format!("Features:     {}", car.feature_tags().join(", ")));
    }
    for (i, url) in car.images().iter().enumerate() {
        lines.push(format!("Image {}:      {}", i + 1, url));
    }
    if !car.description.is_empty() {
        lines.push(String::new());
        lines.push(car.description.clone());
    }
    lines
}

pub fn print_car(car: &Car) {
    for (i, line) in format_car_details(car).into_iter().enumerate() {
        if i == 0 {
            println!("{}", line.bold());
        } else {
            println!("{}", line);
        }
    }
}

/// One line describing where the data came from, or None when nothing noteworthy happened.
pub fn format_load_report(report: &LoadReport) -> Option<String> {
    match &report.source {
        LoadSource::Remote { .. } | LoadSource::Local(LoadOutcome::Stored) => None,
        LoadSource::Local(LoadOutcome::Seeded) => {
            Some("Local storage was empty, demo cars added.".to_string())
        }
        LoadSource::Local(LoadOutcome::Repaired { reason }) => Some(format!(
            "Local storage was corrupt ({}), reset to demo cars.",
            reason
        )),
        LoadSource::Degraded { reason } => Some(format!(
            "Provider unavailable ({}), showing local data.",
            reason
        )),
        LoadSource::SeedOnly { reason } => Some(format!(
            "Local storage unusable ({}), showing demo cars read-only until `autosalon reset`.",
            reason
        )),
    }
}

pub fn print_load_report(report: &LoadReport) {
    if let Some(line) = format_load_report(report) {
        eprintln!("{}", line.yellow());
    }
}

pub fn print_success(msg: &str) {
    println!("{}", msg.green());
}

pub fn print_info(msg: &str) {
    println!("{}", msg.dimmed());
}

pub fn format_message_row(message: &ContactMessage) -> String {
    let marker = if message.read { "  " } else { "● " };
    let id = pad_to(&truncate_to_width(&message.id, 10), 10);
    let time = message
        .created_at
        .map(format_time_ago)
        .unwrap_or_else(|| " ".repeat(TIME_WIDTH));
    let fixed = 2 + 10 + TIME_WIDTH;
    let available = LINE_WIDTH.saturating_sub(fixed);
    let summary = format!("{}: {}", message.name, message.subject);
    let summary = pad_to(&truncate_to_width(&summary, available), available);
    format!("{}{}{}{}", marker, id, summary, time)
}

pub fn print_messages(messages: &[ContactMessage], unread: u64) {
    if messages.is_empty() {
        println!("No messages.");
        return;
    }
    println!("{}", format!("{} unread", unread).dimmed());
    for message in messages {
        let row = format_message_row(message);
        if message.read {
            println!("{}", row);
        } else {
            println!("{}", row.bold());
        }
    }
}

pub fn print_message(message: &ContactMessage) {
    println!("{}", message.subject.bold());
    println!("--------------------------------");
    println!("From:  {} <{}>", message.name, message.email);
    if let Some(phone) = &message.phone {
        println!("Phone: {}", phone);
    }
    if let Some(at) = message.created_at {
        println!("Sent:  {}", at.format("%d.%m.%Y %H:%M"));
    }
    println!();
    println!("{}", message.message);
}

fn pad_to(s: &str, width: usize) -> String {
    let padding = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(padding))
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
