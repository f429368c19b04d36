use js_sys::{Date, Reflect};
use wasm_bindgen::JsValue;

use studentkort_core::{CivilDate, ClockStamp};

pub(crate) fn now_stamp() -> ClockStamp {
    let now = Date::new_0();
    ClockStamp {
        date: CivilDate::new(
            now.get_full_year() as i32,
            now.get_month() as u8 + 1,
            now.get_date() as u8,
        ),
        hours: now.get_hours() as u8,
        minutes: now.get_minutes() as u8,
        seconds: now.get_seconds() as u8,
    }
}

/// Resolved IANA timezone name, e.g. "Europe/Oslo".
pub(crate) fn local_timezone_name() -> String {
    let format = js_sys::Intl::DateTimeFormat::new(&js_sys::Array::new(), &js_sys::Object::new());
    Reflect::get(&format.resolved_options(), &JsValue::from_str("timeZone"))
        .ok()
        .and_then(|value| value.as_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "UTC".to_string())
}
