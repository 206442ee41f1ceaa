pub mod calculator;
pub mod classifier;
pub mod table;

pub use calculator::{
    schedule_or_fallback, DaySchedule, FixedSchedule, PrayerCalculator, SalahProvider,
    ScheduleProvider,
};
pub use classifier::{NextPrayer, WindowClassifier};
pub use table::PrayerTimeTable;
