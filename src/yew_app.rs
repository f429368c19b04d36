use gloo::render::{request_animation_frame, AnimationFrame};
use wasm_bindgen_futures::spawn_local;
use web_sys::{AnimationEvent, Event, HtmlInputElement, KeyboardEvent, MouseEvent};
use yew::prelude::*;

use crate::avatar;
use crate::avatar_store;
use crate::clock;
use crate::session::ClockSession;
use studentkort_core::{
    age_on, format_date, format_updated, VerifyFlash, BIRTH_DATE, CARD_HOLDER, INSTITUTION,
    STUDENT_NUMBER,
};

#[function_component(App)]
pub(crate) fn app() -> Html {
    let avatar_src = use_state(avatar_store::load_initial);
    let now = use_state(clock::now_stamp);
    let flash = use_state(VerifyFlash::new);
    let file_input_ref = use_node_ref();
    let flash_frame = use_mut_ref(|| None::<AnimationFrame>);

    {
        let now = now.clone();
        use_effect_with((), move |_| {
            let mut session = ClockSession::start(move || now.set(clock::now_stamp()));
            move || session.stop()
        });
    }

    let on_avatar_click = {
        let file_input_ref = file_input_ref.clone();
        Callback::from(move |_: MouseEvent| open_file_picker(&file_input_ref))
    };

    let on_avatar_keydown = {
        let file_input_ref = file_input_ref.clone();
        Callback::from(move |event: KeyboardEvent| {
            let key = event.key();
            if key == "Enter" || key == " " {
                event.prevent_default();
                open_file_picker(&file_input_ref);
            }
        })
    };

    let on_file_change = {
        let avatar_src = avatar_src.clone();
        Callback::from(move |event: Event| {
            let input: HtmlInputElement = event.target_unchecked_into();
            let Some(file) = input.files().and_then(|files| files.get(0)) else {
                return;
            };
            let avatar_src = avatar_src.clone();
            spawn_local(async move {
                match avatar::ingest_file(file).await {
                    Ok(data_url) => {
                        avatar_store::set_avatar(Some(&data_url));
                        avatar_src.set(Some(data_url));
                    }
                    Err(err) => {
                        gloo::console::warn!("avatar unchanged, file read failed", err);
                    }
                }
            });
        })
    };

    let on_verify = {
        let flash = flash.clone();
        let flash_frame = flash_frame.clone();
        Callback::from(move |_: MouseEvent| {
            // Drop to idle first, then re-enter flashing on the next frame so
            // the animation restarts even when one is mid-flight.
            let mut reset = *flash;
            reset.finish();
            flash.set(reset);
            let flash = flash.clone();
            let handle = request_animation_frame(move |_| {
                let mut next = reset;
                next.trigger();
                flash.set(next);
            });
            // A pending frame from an earlier click is superseded, not stacked.
            *flash_frame.borrow_mut() = Some(handle);
        })
    };

    let on_flash_end = {
        let flash = flash.clone();
        Callback::from(move |_: AnimationEvent| {
            let mut next = *flash;
            next.finish();
            flash.set(next);
        })
    };

    let stamp = *now;
    let age = age_on(BIRTH_DATE, stamp.date);
    let timezone = clock::local_timezone_name();
    let avatar_label = if avatar_src.is_some() {
        "Change profile photo"
    } else {
        "Add profile photo"
    };
    let flash_class = if flash.is_flashing() {
        "card-verify-flash flashing"
    } else {
        "card-verify-flash"
    };

    html! {
        <div class="card-page">
            <div class="card">
                <div
                    class="card-avatar"
                    role="button"
                    tabindex="0"
                    aria-label={avatar_label}
                    onclick={on_avatar_click}
                    onkeydown={on_avatar_keydown}
                >
                {
                    match (*avatar_src).as_ref() {
                        Some(src) => html! { <img src={src.clone()} alt="Profile" /> },
                        None => html! { <span class="card-avatar-fallback">{ "👤" }</span> },
                    }
                }
                </div>
                <input
                    ref={file_input_ref}
                    type="file"
                    accept="image/*"
                    style="display: none;"
                    onchange={on_file_change}
                />
                <div class="card-identity">
                    <h1 class="card-holder">{ CARD_HOLDER }</h1>
                    <p class="card-institution">{ INSTITUTION }</p>
                    <p class="card-number">{ STUDENT_NUMBER }</p>
                </div>
                <dl class="card-details">
                    <dt>{ "Born" }</dt>
                    <dd>{ format!("{} ({} years)", format_date(BIRTH_DATE), age) }</dd>
                    <dt>{ "Last updated" }</dt>
                    <dd>{ format!("{} {}", format_updated(&stamp), timezone) }</dd>
                </dl>
                <button class="card-verify" onclick={on_verify}>{ "Verify" }</button>
                <div class={flash_class} onanimationend={on_flash_end}></div>
            </div>
        </div>
    }
}

fn open_file_picker(input_ref: &NodeRef) {
    if let Some(input) = input_ref.cast::<HtmlInputElement>() {
        input.click();
    }
}
