use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "waqt", version, author, about = "Prayer times in your terminal, and the prayers you missed")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Set location and calculation options (only the given flags change)
    Setup {
        /// Place name shown in the header
        #[arg(long)]
        name: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        lng: Option<f64>,
        /// Calculation method (MuslimWorldLeague, Karachi, UmmAlQura, ...)
        #[arg(long)]
        method: Option<String>,
        /// Hanafi or Shafi
        #[arg(long)]
        madhab: Option<String>,
        /// UTC offset, e.g. "+5", "5:30", "-4"
        #[arg(long, allow_hyphen_values = true)]
        tz: Option<String>,
        /// Days to shift the Hijri date for local moon sighting
        #[arg(long, allow_hyphen_values = true)]
        hijri_offset: Option<i32>,
    },
    /// Show today's prayer times and countdown to next prayer
    Times,
    /// Mark a prayer as prayed today
    Mark {
        /// Prayer name (fajr, dhuhr/jummah, asr, maghrib, isha)
        prayer: String,
    },
    /// Remove today's mark from a prayer
    Unmark {
        /// Prayer name
        prayer: String,
    },
    /// Show today's progress
    Status {
        /// Print the full board as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show missed prayers over the retention window
    Missed,
}
