/// Calendar date in local civil time. Months and days are 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct CivilDate {
    pub year: i32,
    pub month: u8,
    pub day: u8,
}

impl CivilDate {
    pub const fn new(year: i32, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }
}

/// One reading of the wall clock, refreshed by the session timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockStamp {
    pub date: CivilDate,
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

/// `DD.MM.YYYY`
pub fn format_date(date: CivilDate) -> String {
    format!("{:02}.{:02}.{}", date.day, date.month, date.year)
}

/// `H:MM`, 24-hour clock, hour not zero-padded.
pub fn format_clock(stamp: &ClockStamp) -> String {
    format!("{}:{:02}", stamp.hours, stamp.minutes)
}

/// `DD.MM.YYYY at H:MM`
pub fn format_updated(stamp: &ClockStamp) -> String {
    format!("{} at {}", format_date(stamp.date), format_clock(stamp))
}

/// Whole completed years between `birth` and `today`.
pub fn age_on(birth: CivilDate, today: CivilDate) -> i32 {
    let before_birthday = (today.month, today.day) < (birth.month, birth.day);
    today.year - birth.year - i32::from(before_birthday)
}
