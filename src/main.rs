mod avatar;
mod avatar_store;
mod clock;
mod session;
mod yew_app;

use yew_app::App;

fn main() {
    console_error_panic_hook::set_once();
    yew::Renderer::<App>::new().render();
}
