use rocket::launch;

#[launch]
fn rocket() -> _ {
    visibility_ui::init_logging();
    visibility_ui::build(visibility_ui::config::figment())
}
