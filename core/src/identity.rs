use crate::date::CivilDate;

// Static card identity. The mock card renders one fixed holder; nothing here
// is user-editable.
pub const CARD_HOLDER: &str = "Ola Nordmann";
pub const STUDENT_NUMBER: &str = "552901";
pub const INSTITUTION: &str = "Universitetet i Oslo";
pub const BIRTH_DATE: CivilDate = CivilDate::new(2001, 9, 20);
