use autosalon::model::{format_price, CarPatch, FuelType, NewCar, Transmission};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "autosalon",
    bin_name = "autosalon",
    version,
    disable_help_subcommand = true
)]
#[command(about = "Manage the dealership car inventory", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file (defaults to ./autosalon.toml when present)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all cars, pinned first
    #[command(alias = "ls")]
    List {
        /// Keep storage order (newest first) instead of pinning
        #[arg(long)]
        newest: bool,
    },

    /// List the cars shown on the homepage
    Featured,

    /// Show a car in full
    #[command(alias = "view")]
    Show { id: String },

    /// Add a car
    #[command(alias = "new")]
    Add(AddArgs),

    /// Change some fields of a car
    Update {
        id: String,
        #[command(flatten)]
        fields: UpdateArgs,
    },

    /// Delete a car
    #[command(alias = "rm")]
    Delete { id: String },

    /// Check whether a user created a car
    Owner { id: String, user: String },

    /// Overwrite local storage with the demo cars
    Reset,

    /// Remove the local car storage
    Clear,

    /// Contact-form inbox
    #[command(subcommand)]
    Messages(MessageCommands),

    /// Show which backend is in use
    Status,
}

#[derive(Subcommand, Debug)]
pub enum MessageCommands {
    /// List messages, newest first
    List,
    /// Show a message and mark it read
    Open { id: String },
    /// Delete a message
    Delete { id: String },
    /// Total and unread counts
    Count,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub brand: String,
    #[arg(long)]
    pub year: i32,
    /// Price in whole crowns
    #[arg(long)]
    pub price: u64,
    /// Display price (derived from --price when omitted)
    #[arg(long)]
    pub price_formatted: Option<String>,
    #[arg(long, default_value_t = 0)]
    pub mileage: u64,
    #[arg(long)]
    pub fuel: FuelType,
    #[arg(long)]
    pub transmission: Transmission,
    #[arg(long)]
    pub engine_volume: Option<String>,
    #[arg(long)]
    pub power: Option<String>,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long, default_value = "")]
    pub image_url: String,
    /// Gallery image (repeatable)
    #[arg(long = "image")]
    pub images: Vec<String>,
    /// Feature tag (repeatable)
    #[arg(long = "feature")]
    pub features: Vec<String>,
    #[arg(long)]
    pub featured: bool,
    #[arg(long)]
    pub pinned: bool,
    /// Creator uid stored with the car (remote providers only)
    #[arg(long)]
    pub owner: Option<String>,
}

impl AddArgs {
    pub fn to_new_car(&self) -> NewCar {
        NewCar {
            name: self.name.clone(),
            brand: self.brand.clone(),
            year: self.year,
            price: self.price,
            price_formatted: self.price_formatted.clone(),
            mileage: self.mileage,
            fuel: self.fuel,
            transmission: self.transmission,
            engine_volume: self.engine_volume.clone(),
            power: self.power.clone(),
            description: self.description.clone(),
            image_url: self.image_url.clone(),
            image_urls: non_empty(&self.images),
            featured: self.featured,
            pinned: self.pinned,
            features: non_empty(&self.features),
        }
        .with_derived_price()
    }
}

#[derive(Args, Debug, Default)]
pub struct UpdateArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub brand: Option<String>,
    #[arg(long)]
    pub year: Option<i32>,
    #[arg(long)]
    pub price: Option<u64>,
    #[arg(long)]
    pub price_formatted: Option<String>,
    #[arg(long)]
    pub mileage: Option<u64>,
    #[arg(long)]
    pub fuel: Option<FuelType>,
    #[arg(long)]
    pub transmission: Option<Transmission>,
    #[arg(long)]
    pub engine_volume: Option<String>,
    #[arg(long)]
    pub power: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub image_url: Option<String>,
    /// Replace the gallery (repeatable)
    #[arg(long = "image")]
    pub images: Vec<String>,
    /// Replace the feature tags (repeatable)
    #[arg(long = "feature")]
    pub features: Vec<String>,
    #[arg(long)]
    pub featured: Option<bool>,
    #[arg(long)]
    pub pinned: Option<bool>,
}

impl UpdateArgs {
    /// A new price without a display string re-derives the display string.
    pub fn to_patch(&self) -> CarPatch {
        let price_formatted = match (&self.price_formatted, self.price) {
            (Some(text), _) => Some(text.clone()),
            (None, Some(price)) => Some(format_price(price)),
            (None, None) => None,
        };
        CarPatch {
            name: self.name.clone(),
            brand: self.brand.clone(),
            year: self.year,
            price: self.price,
            price_formatted,
            mileage: self.mileage,
            fuel: self.fuel,
            transmission: self.transmission,
            engine_volume: self.engine_volume.clone(),
            power: self.power.clone(),
            description: self.description.clone(),
            image_url: self.image_url.clone(),
            image_urls: non_empty(&self.images),
            featured: self.featured,
            pinned: self.pinned,
            features: non_empty(&self.features),
        }
    }
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("autosalon").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_no_subcommand_parses() {
        assert!(parse(&[]).command.is_none());
    }

    #[test]
    fn test_add_builds_new_car() {
        let cli = parse(&[
            "add",
            "--name",
            "2022 Škoda Octavia",
            "--brand",
            "Škoda",
            "--year",
            "2022",
            "--price",
            "500000",
            "--fuel",
            "diesel",
            "--transmission",
            "manual",
            "--image-url",
            "https://example.com/o.jpg",
            "--feature",
            "LED",
            "--feature",
            "Navigace",
        ]);
        let Some(Commands::Add(args)) = cli.command else {
            panic!("Expected add");
        };
        let car = args.to_new_car();
        assert_eq!(car.fuel, FuelType::Diesel);
        assert_eq!(car.price_formatted.as_deref(), Some("500 000 Kč"));
        assert_eq!(car.features, Some(vec!["LED".into(), "Navigace".into()]));
        assert_eq!(car.image_urls, None);
        assert!(!car.featured);
    }

    #[test]
    fn test_update_builds_sparse_patch() {
        let cli = parse(&["update", "2", "--price", "700000", "--pinned", "true"]);
        let Some(Commands::Update { id, fields }) = cli.command else {
            panic!("Expected update");
        };
        assert_eq!(id, "2");
        let patch = fields.to_patch();
        assert_eq!(patch.price, Some(700000));
        assert_eq!(patch.price_formatted.as_deref(), Some("700 000 Kč"));
        assert_eq!(patch.pinned, Some(true));
        assert_eq!(patch.name, None);
        assert_eq!(patch.features, None);
    }

    #[test]
    fn test_bad_fuel_is_rejected() {
        let result = Cli::try_parse_from([
            "autosalon", "add", "--name", "x", "--brand", "y", "--year", "2020", "--price", "1",
            "--fuel", "steam", "--transmission", "manual",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_messages_subcommand() {
        let cli = parse(&["messages", "open", "1"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Messages(MessageCommands::Open { .. }))
        ));
    }
}
