pub mod date;
pub mod flash;
pub mod identity;

pub use date::{age_on, format_clock, format_date, format_updated, CivilDate, ClockStamp};
pub use flash::{FlashPhase, VerifyFlash};
pub use identity::{BIRTH_DATE, CARD_HOLDER, INSTITUTION, STUDENT_NUMBER};
