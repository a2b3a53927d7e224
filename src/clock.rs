use chrono::Utc;

pub trait Clock {
    fn now_millis(&self) -> i64;
    /// Today's date as `YYYY-MM-DD`.
    fn today(&self) -> String;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn today(&self) -> String {
        Utc::now().format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
pub use fixed::FixedClock;
